pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::career::handlers;
use crate::config::MAX_UPLOAD_SIZE;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Course-grade import pipeline
        .route(
            "/api/v1/career/import-course-grades",
            post(handlers::handle_import_course_grades),
        )
        .route(
            "/api/v1/career/import-course-grades-pdf",
            post(handlers::handle_import_course_grades_pdf),
        )
        .route(
            "/api/v1/career/extract-courses",
            post(handlers::handle_extract_courses),
        )
        .route(
            "/api/v1/career/extract-resume-pdf",
            post(handlers::handle_extract_resume_pdf),
        )
        .route(
            "/api/v1/career/import-project-files",
            post(handlers::handle_import_project_files),
        )
        // Aggregation
        .route(
            "/api/v1/career/analyze-coursework",
            post(handlers::handle_analyze_coursework),
        )
        .route(
            "/api/v1/career/extract-profile",
            post(handlers::handle_extract_profile),
        )
        .route(
            "/api/v1/career/company-suggestions",
            post(handlers::handle_company_suggestions),
        )
        // Profile persistence
        .route(
            "/api/v1/career/save-profile",
            post(handlers::handle_save_profile),
        )
        .route("/api/v1/career/profile", get(handlers::handle_get_profile))
        .route(
            "/api/v1/career/related-jobs",
            get(handlers::handle_related_jobs),
        )
        // Multipart uploads are size-checked again in the handler; this
        // raises Axum's default 2 MB body cap to the documented 15 MB
        // (plus headroom for multipart framing).
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024))
        .with_state(state)
}
