//! User profile CRUD and the admin listing/export endpoints.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::handlers::MessageResponse;
use crate::errors::AppError;
use crate::models::user::{UserProfile, UserRow, UserSummary};
use crate::state::AppState;
use crate::users::admin_view::{self, ExportFormat, SortKey, SortOrder};

async fn fetch_all_summaries(db: &PgPool) -> Result<Vec<UserSummary>, AppError> {
    let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at")
        .fetch_all(db)
        .await?;
    Ok(rows.into_iter().map(UserSummary::from).collect())
}

async fn fetch_user(db: &PgPool, id: Uuid) -> Result<UserRow, AppError> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

/// GET /users
pub async fn handle_list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    Ok(Json(fetch_all_summaries(&state.db).await?))
}

/// GET /users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    let row = fetch_user(&state.db, id).await?;
    Ok(Json(row.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub job_role: Option<String>,
    pub gender: Option<String>,
    pub skills: Option<Vec<String>>,
    pub ats_score: Option<i32>,
    pub resume_strength: Option<Vec<String>>,
    pub resume_weakness: Option<Vec<String>>,
}

/// PUT /users/:id
///
/// Partial update: omitted fields keep their stored value. Email is not
/// updatable here. Analysis fields are accepted so the client can persist
/// results after an explicit save.
pub async fn handle_update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let updated = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users SET
            first_name      = COALESCE($1, first_name),
            last_name       = COALESCE($2, last_name),
            contact         = COALESCE($3, contact),
            address         = COALESCE($4, address),
            job_role        = COALESCE($5, job_role),
            gender          = COALESCE($6, gender),
            skills          = COALESCE($7, skills),
            ats_score       = COALESCE($8, ats_score),
            resume_strength = COALESCE($9, resume_strength),
            resume_weakness = COALESCE($10, resume_weakness),
            updated_at      = now()
        WHERE id = $11
        RETURNING *
        "#,
    )
    .bind(&request.first_name)
    .bind(&request.last_name)
    .bind(&request.contact)
    .bind(&request.address)
    .bind(&request.job_role)
    .bind(&request.gender)
    .bind(&request.skills)
    .bind(request.ats_score)
    .bind(&request.resume_strength)
    .bind(&request.resume_weakness)
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    Ok(Json(updated.into()))
}

/// DELETE /users/:id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }

    Ok(Json(MessageResponse {
        message: "User removed".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<ExportFormat>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<SortKey>,
    pub order: Option<SortOrder>,
}

/// GET /users/export
///
/// Server-side rendition of the dashboard's derived view: filter →
/// stable sort → CSV or JSON of exactly that view.
pub async fn handle_export_users(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let summaries = fetch_all_summaries(&state.db).await?;

    let mut view = admin_view::filter_users(
        summaries,
        query.search.as_deref().unwrap_or(""),
        query.status.as_deref(),
    );
    admin_view::sort_users(
        &mut view,
        query.sort_by.unwrap_or(SortKey::Name),
        query.order.unwrap_or(SortOrder::Asc),
    );

    let response = match query.format.unwrap_or(ExportFormat::Json) {
        ExportFormat::Csv => (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"students_data.csv\"",
                ),
            ],
            admin_view::to_csv(&view),
        )
            .into_response(),
        ExportFormat::Json => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"students_data.json\"",
                ),
            ],
            serde_json::to_string_pretty(&view).map_err(anyhow::Error::from)?,
        )
            .into_response(),
    };
    Ok(response)
}
