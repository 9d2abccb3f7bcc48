pub mod health;
pub mod jobs;
pub mod recommendations;

use axum::{
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/recommendations",
            post(recommendations::handle_recommendations),
        )
        .route(
            "/api/v1/recommendations/seen",
            delete(recommendations::handle_clear_seen),
        )
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub has_more: bool,
}

/// Slices one page out of the full result set. Page and limit are clamped
/// to at least 1, and the offset math saturates so hostile query values
/// cannot overflow.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> (Vec<T>, Pagination) {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = items.len();

    let start = (page - 1).saturating_mul(limit);
    let paged: Vec<T> = items.into_iter().skip(start).take(limit).collect();

    let pagination = Pagination {
        page,
        limit,
        total,
        has_more: start.saturating_add(limit) < total,
    };
    (paged, pagination)
}
