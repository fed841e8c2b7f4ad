use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::user::PublicUser;

/// Represents the 'comments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Flat row for a comment joined with its author's email.
#[derive(Debug, FromRow)]
pub struct CommentWithAuthorRow {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub text: String,
    pub author_email: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Client-facing comment with the author reference resolved.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub article_id: i64,
    pub text: String,
    pub author: PublicUser,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<CommentWithAuthorRow> for CommentResponse {
    fn from(row: CommentWithAuthorRow) -> Self {
        Self {
            id: row.id,
            article_id: row.article_id,
            text: row.text,
            author: PublicUser {
                id: row.user_id,
                email: row.author_email,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Comment {
    pub fn into_response(self, author: PublicUser) -> CommentResponse {
        CommentResponse {
            id: self.id,
            article_id: self.article_id,
            text: self.text,
            author,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DTO for creating a new comment.
/// `article_id` stays a raw JSON value so a malformed id yields a proper 400
/// from the handler instead of a deserialization rejection.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub text: Option<String>,

    pub article_id: Option<serde_json::Value>,
}

/// DTO for editing a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub text: Option<String>,
}
