use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::parse_id,
    models::{
        article::{
            Article, ArticleDetailResponse, ArticleListQuery, ArticleListResponse,
            ArticleWithAuthorRow, CreateArticleRequest, UpdateArticleRequest,
        },
        comment::CommentWithAuthorRow,
        user::PublicUser,
    },
    utils::jwt::CurrentUser,
};

/// List articles, newest first, with pagination.
pub async fn list_articles(
    State(pool): State<PgPool>,
    Query(params): Query<ArticleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let page = params.page.unwrap_or(1).max(1);

    let total_articles = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
        .fetch_one(&pool)
        .await?;

    // Pages beyond the end simply come back empty.
    let rows = sqlx::query_as::<_, ArticleWithAuthorRow>(
        r#"
        SELECT
            a.id, a.user_id, a.title, a.content, a.comments_count,
            u.email AS author_email,
            a.created_at, a.updated_at
        FROM articles a
        JOIN users u ON a.user_id = u.id
        ORDER BY a.created_at DESC, a.id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind((page - 1) * limit)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list articles: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(ArticleListResponse {
        articles: rows.into_iter().map(Into::into).collect(),
        current_page: page,
        total_pages: total_pages(total_articles, limit),
        total_articles,
    }))
}

/// ceil(total / limit) in integer arithmetic.
fn total_pages(total: i64, limit: i64) -> i64 {
    if total == 0 { 0 } else { (total + limit - 1) / limit }
}

/// Get a single article by ID, with its author and comments resolved.
pub async fn get_article(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "article")?;

    let article = sqlx::query_as::<_, ArticleWithAuthorRow>(
        r#"
        SELECT
            a.id, a.user_id, a.title, a.content, a.comments_count,
            u.email AS author_email,
            a.created_at, a.updated_at
        FROM articles a
        JOIN users u ON a.user_id = u.id
        WHERE a.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Article not found".to_string()))?;

    // Second fetch resolves the comment references for display, newest first.
    let comments = sqlx::query_as::<_, CommentWithAuthorRow>(
        r#"
        SELECT
            c.id, c.article_id, c.user_id, c.text,
            u.email AS author_email,
            c.created_at, c.updated_at
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.article_id = $1
        ORDER BY c.created_at DESC, c.id DESC
        "#,
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(ArticleDetailResponse {
        article: article.into(),
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

/// Create a new article owned by the current user.
pub async fn create_article(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(title), Some(content)) = (&payload.title, &payload.content) else {
        return Err(AppError::BadRequest(
            "Please provide title and content".to_string(),
        ));
    };

    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please provide title and content".to_string(),
        ));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let article = sqlx::query_as::<_, Article>(
        r#"
        INSERT INTO articles (user_id, title, content)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, title, content, comments_count, created_at, updated_at
        "#,
    )
    .bind(current_user.id)
    .bind(title)
    .bind(content)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create article: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let author = PublicUser {
        id: current_user.id,
        email: current_user.email,
    };

    Ok((StatusCode::CREATED, Json(article.into_response(author))))
}

/// Update an article. Owner only; blank fields keep their stored values.
pub async fn update_article(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "article")?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let owner_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM articles WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    if owner_id != current_user.id {
        return Err(AppError::Forbidden(
            "User not authorized to update this article".to_string(),
        ));
    }

    let title = payload.title.filter(|t| !t.trim().is_empty());
    let content = payload.content.filter(|c| !c.trim().is_empty());

    let article = sqlx::query_as::<_, Article>(
        r#"
        UPDATE articles
        SET title = COALESCE($1, title),
            content = COALESCE($2, content),
            updated_at = now()
        WHERE id = $3
        RETURNING id, user_id, title, content, comments_count, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    let author = PublicUser {
        id: current_user.id,
        email: current_user.email,
    };

    Ok(Json(article.into_response(author)))
}

/// Delete an article. Owner only.
/// Removes the article's comments and the article itself in one transaction,
/// dependent rows first, so no comment can outlive its article.
pub async fn delete_article(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "article")?;

    let owner_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM articles WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    if owner_id != current_user.id {
        return Err(AppError::Forbidden(
            "User not authorized to delete this article".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM comments WHERE article_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete article: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    tx.commit().await?;

    Ok(Json(
        serde_json::json!({ "message": "Article removed successfully" }),
    ))
}
