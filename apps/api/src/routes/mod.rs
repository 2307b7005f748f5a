pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::auth::handlers as auth;
use crate::courses;
use crate::state::AppState;
use crate::users::handlers as users;

/// Resume uploads arrive inline in the multipart body; this caps them well
/// above any plausible resume.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/signup", post(auth::handle_signup))
        .route("/login", post(auth::handle_login))
        // Profiles + admin listing
        .route("/users", get(users::handle_list_users))
        .route("/users/export", get(users::handle_export_users))
        .route(
            "/users/:id",
            get(users::handle_get_user)
                .put(users::handle_update_user)
                .delete(users::handle_delete_user),
        )
        // Resume analysis
        .route("/analyze", post(analysis::handle_analyze))
        .route("/analyze-auto", post(analysis::handle_analyze_auto))
        .route("/suggest-skills", post(analysis::handle_suggest_skills))
        // Course suggestions
        .route("/courses", get(courses::handle_suggest_courses))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
