use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::parse_id,
    models::{
        comment::{Comment, CreateCommentRequest, UpdateCommentRequest},
        user::PublicUser,
    },
    utils::jwt::CurrentUser,
};

/// Create a new comment on an existing article.
/// The comment insert and the article's comment-count bump commit together.
pub async fn create_comment(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(text), Some(raw_article_id)) = (&payload.text, &payload.article_id) else {
        return Err(AppError::BadRequest(
            "Please provide text and articleId".to_string(),
        ));
    };

    if text.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please provide text and articleId".to_string(),
        ));
    }

    let article_id = match raw_article_id {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| AppError::BadRequest("Invalid article ID format".to_string()))?,
        serde_json::Value::String(s) => parse_id(s, "article")?,
        _ => {
            return Err(AppError::BadRequest(
                "Invalid article ID format".to_string(),
            ));
        }
    };

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut tx = pool.begin().await?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM articles WHERE id = $1")
        .bind(article_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Article not found".to_string()))?;

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (article_id, user_id, text)
        VALUES ($1, $2, $3)
        RETURNING id, article_id, user_id, text, created_at, updated_at
        "#,
    )
    .bind(article_id)
    .bind(current_user.id)
    .bind(text)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create comment: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    sqlx::query("UPDATE articles SET comments_count = comments_count + 1 WHERE id = $1")
        .bind(article_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let author = PublicUser {
        id: current_user.id,
        email: current_user.email,
    };

    Ok((StatusCode::CREATED, Json(comment.into_response(author))))
}

/// Update a comment's text. Comment owner only; owning the article grants
/// no editing rights over other users' comments.
pub async fn update_comment(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "comment")?;

    let Some(text) = payload.text.as_ref().filter(|t| !t.trim().is_empty()) else {
        return Err(AppError::BadRequest(
            "Please provide text for the comment".to_string(),
        ));
    };

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let owner_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM comments WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    if owner_id != current_user.id {
        return Err(AppError::Forbidden(
            "User not authorized to update this comment".to_string(),
        ));
    }

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET text = $1, updated_at = now()
        WHERE id = $2
        RETURNING id, article_id, user_id, text, created_at, updated_at
        "#,
    )
    .bind(text)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    let author = PublicUser {
        id: current_user.id,
        email: current_user.email,
    };

    Ok(Json(comment.into_response(author)))
}

/// Delete a comment. Comment owner only.
/// Unlinks it from the article's comment count first, then drops the row,
/// both inside one transaction.
pub async fn delete_comment(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "comment")?;

    let (owner_id, article_id) =
        sqlx::query_as::<_, (i64, i64)>("SELECT user_id, article_id FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    if owner_id != current_user.id {
        return Err(AppError::Forbidden(
            "User not authorized to delete this comment".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE articles SET comments_count = GREATEST(0, comments_count - 1) WHERE id = $1")
        .bind(article_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete comment: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    tx.commit().await?;

    Ok(Json(
        serde_json::json!({ "message": "Comment removed successfully" }),
    ))
}
