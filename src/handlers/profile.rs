use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{error::AppError, models::user::MeResponse, utils::jwt::CurrentUser};

/// Get current user's profile and statistics.
pub async fn get_me(
    State(pool): State<PgPool>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let me = sqlx::query_as::<_, MeResponse>(
        r#"
        SELECT
            u.id, u.email, u.created_at,
            (SELECT COUNT(*) FROM articles WHERE user_id = u.id) AS articles_count
        FROM users u
        WHERE u.id = $1
        "#,
    )
    .bind(current_user.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(me))
}
