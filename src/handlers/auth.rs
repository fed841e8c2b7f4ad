// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use validator::{Validate, ValidateEmail};

use crate::{
    config::Config,
    error::AppError,
    models::user::{AuthResponse, LoginRequest, RegisterRequest, User, normalize_email},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created with a fresh token and the user (excluding password).
pub async fn register(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(email), Some(password), Some(confirm_password)) =
        (&payload.email, &payload.password, &payload.confirm_password)
    else {
        return Err(AppError::BadRequest(
            "Please provide email, password, and confirm password".to_string(),
        ));
    };

    if email.trim().is_empty() || password.is_empty() || confirm_password.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide email, password, and confirm password".to_string(),
        ));
    }

    // Reject the mismatch before touching the store.
    if password != confirm_password {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = normalize_email(email);

    if !email.validate_email() {
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let hashed_password = hash_password(password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password)
        VALUES ($1, $2)
        RETURNING id, email, password, created_at, updated_at
        "#,
    )
    .bind(&email)
    .bind(&hashed_password)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        // The unique index can still race the pre-check; Postgres reports 23505.
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict("User already exists".to_string())
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    let token = sign_jwt(user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Authenticates a user and returns a JWT token.
///
/// Unknown email and wrong password produce the same response, so the
/// endpoint never reveals whether an account exists.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(email), Some(password)) = (&payload.email, &payload.password) else {
        return Err(AppError::BadRequest(
            "Please provide email and password".to_string(),
        ));
    };

    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide email and password".to_string(),
        ));
    }

    let email = normalize_email(email);

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password, created_at, updated_at FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = user.ok_or(AppError::AuthError(
        "Invalid email or password".to_string(),
    ))?;

    let is_valid = verify_password(password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    let token = sign_jwt(user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
