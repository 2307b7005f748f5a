//! Signup and login handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::errors::AppError;
use crate::models::user::{PublicUser, UserRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /signup
///
/// Uniqueness is the store's job: the insert races cleanly and the unique
/// index reports the loser, so there is no check-then-insert window.
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    for (field, value) in [
        ("first_name", &request.first_name),
        ("last_name", &request.last_name),
        ("email", &request.email),
        ("password", &request.password),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    let password_hash = hash_password(&request.password)?;

    sqlx::query(
        "INSERT INTO users (email, password_hash, first_name, last_name) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(&request.email)
    .bind(&password_hash)
    .bind(&request.first_name)
    .bind(&request.last_name)
    .execute(&state.db)
    .await
    .map_err(|err| match &err {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            AppError::DuplicateEmail
        }
        _ => AppError::Database(err),
    })?;

    info!("User registered: {}", request.email);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully".to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: PublicUser,
}

/// POST /login
///
/// Failure is one generic 401 whether the email is unknown or the password
/// is wrong, so the endpoint cannot be used to enumerate accounts.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(&request.email)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let role = resolve_role(&user.email, &user.role, &state.config.admin_email);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: PublicUser {
            uid: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role,
        },
    }))
}

/// The sentinel address outranks the stored role; an empty stored role
/// falls back to "student".
fn resolve_role(email: &str, stored_role: &str, admin_email: &str) -> String {
    if email == admin_email {
        "admin".to_string()
    } else if stored_role.is_empty() {
        "student".to_string()
    } else {
        stored_role.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_email_resolves_to_admin() {
        assert_eq!(resolve_role("admin", "student", "admin"), "admin");
        assert_eq!(
            resolve_role("boss@example.com", "student", "boss@example.com"),
            "admin"
        );
    }

    #[test]
    fn test_non_sentinel_keeps_stored_role() {
        assert_eq!(resolve_role("ada@example.com", "student", "admin"), "student");
        assert_eq!(resolve_role("ada@example.com", "mentor", "admin"), "mentor");
    }

    #[test]
    fn test_empty_stored_role_defaults_to_student() {
        assert_eq!(resolve_role("ada@example.com", "", "admin"), "student");
    }
}
