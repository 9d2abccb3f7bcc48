//! GET /api/v1/jobs — live aggregated posting list, without touching the
//! seen-jobs registry. Browsing here never consumes freshness on the
//! recommendation side.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{paginate, Pagination};
use crate::dedup;
use crate::errors::AppError;
use crate::models::JobPosting;
use crate::state::AppState;

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobsQuery {
    keyword: Option<String>,
    experience_level: Option<String>,
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobsResponse {
    jobs: Vec<JobPosting>,
    pagination: Pagination,
}

pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> Result<Json<JobsResponse>, AppError> {
    let jobs = match &query.keyword {
        Some(keyword) if !keyword.is_empty() => {
            let merged = state
                .aggregator
                .fetch_by_keywords(std::slice::from_ref(keyword), None)
                .await;
            dedup::dedupe_batch(merged)
        }
        _ => {
            state
                .aggregator
                .fetch_jobs(None, &state.seen_jobs, true)
                .await
        }
    };

    let filtered = filter_by_experience(jobs, query.experience_level.as_deref());
    let (page, pagination) = paginate(filtered, query.page, query.limit);
    Ok(Json(JobsResponse {
        jobs: page,
        pagination,
    }))
}

/// Case-insensitive substring filter on the free-text experience field.
fn filter_by_experience(jobs: Vec<JobPosting>, needle: Option<&str>) -> Vec<JobPosting> {
    let Some(needle) = needle.filter(|n| !n.is_empty()) else {
        return jobs;
    };
    let needle = needle.to_lowercase();
    jobs.into_iter()
        .filter(|job| job.experience_level.to_lowercase().contains(&needle))
        .collect()
}
