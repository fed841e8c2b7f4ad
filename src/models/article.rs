use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{comment::CommentResponse, user::PublicUser};

/// Represents the 'articles' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub comments_count: i32,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Flat row for an article joined with its author's email.
#[derive(Debug, FromRow)]
pub struct ArticleWithAuthorRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub comments_count: i32,
    pub author_email: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Client-facing article with the author reference resolved.
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: PublicUser,
    pub comments_count: i32,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<ArticleWithAuthorRow> for ArticleResponse {
    fn from(row: ArticleWithAuthorRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author: PublicUser {
                id: row.user_id,
                email: row.author_email,
            },
            comments_count: row.comments_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Article {
    pub fn into_response(self, author: PublicUser) -> ArticleResponse {
        ArticleResponse {
            id: self.id,
            title: self.title,
            content: self.content,
            author,
            comments_count: self.comments_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Single article view: the article plus its comments, newest first.
#[derive(Debug, Serialize)]
pub struct ArticleDetailResponse {
    #[serde(flatten)]
    pub article: ArticleResponse,
    pub comments: Vec<CommentResponse>,
}

/// DTO for creating a new article.
/// Fields are optional so missing values produce a proper 400 instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,
}

/// DTO for editing an article. Absent or empty fields leave the stored
/// value unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    pub content: Option<String>,
}

/// Query parameters for the paginated article listing.
#[derive(Debug, Deserialize)]
pub struct ArticleListQuery {
    /// 1-based page number (default: 1).
    pub page: Option<i64>,

    /// Page size (default: 10, max: 100).
    pub limit: Option<i64>,
}

/// Paginated listing payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleResponse>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_articles: i64,
}
