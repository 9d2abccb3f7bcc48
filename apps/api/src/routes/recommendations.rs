//! POST /api/v1/recommendations and the seen-registry reset.
//!
//! The recommendation path never 5xxes on pipeline trouble: sources degrade
//! to the sample catalog and LLM failures degrade to the rule-based ranking,
//! so by the time this handler runs it always has something to return.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{paginate, Pagination};
use crate::errors::AppError;
use crate::models::{FeedbackData, RatingWithJobInfo, Recommendation, UserProfile};
use crate::scoring;
use crate::state::AppState;

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    5
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsRequest {
    profile: Option<UserProfile>,
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    refresh: bool,
    #[serde(default)]
    ratings: Vec<RatingWithJobInfo>,
    #[serde(rename = "useAILearning", default)]
    use_ai_learning: bool,
    #[serde(default)]
    user_feedback: Option<FeedbackData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    recommendations: Vec<Recommendation>,
    pagination: Pagination,
    meta: Meta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    crawled_count: usize,
    /// Source names in first-appearance order.
    sources: Vec<String>,
    ai_learning_applied: bool,
    ratings_used: usize,
    feedback_applied: bool,
}

pub async fn handle_recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationsRequest>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let Some(profile) = request.profile else {
        return Err(AppError::Validation("profile is required".to_string()));
    };

    let jobs = state
        .aggregator
        .fetch_jobs(Some(&profile), &state.seen_jobs, false)
        .await;

    let use_ai = (request.refresh || request.use_ai_learning) && state.llm.is_some();

    // Ratings and feedback only flow into the prompt in AI-learning mode.
    let ratings_for_ai: &[RatingWithJobInfo] = if request.use_ai_learning {
        &request.ratings
    } else {
        &[]
    };
    let feedback = request
        .user_feedback
        .as_ref()
        .filter(|_| request.use_ai_learning)
        .cloned()
        .unwrap_or_default();

    let recommendations = scoring::recommend(
        &profile,
        &jobs,
        use_ai,
        ratings_for_ai,
        &feedback,
        state.llm.as_ref(),
    )
    .await;

    info!(
        "recommendations: {} scored, use_ai={use_ai}, page={}",
        recommendations.len(),
        request.page
    );

    let meta = Meta {
        crawled_count: jobs.len(),
        sources: unique_sources(&recommendations),
        ai_learning_applied: request.use_ai_learning && use_ai,
        ratings_used: if request.use_ai_learning {
            request.ratings.len()
        } else {
            0
        },
        feedback_applied: request.use_ai_learning && !feedback.is_empty(),
    };

    let (page, pagination) = paginate(recommendations, request.page, request.limit);
    Ok(Json(RecommendationsResponse {
        recommendations: page,
        pagination,
        meta,
    }))
}

/// DELETE /api/v1/recommendations/seen
/// Resets the seen-jobs registry so every posting is fresh again.
pub async fn handle_clear_seen(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.seen_jobs.clear()?;
    Ok(Json(json!({ "success": true })))
}

fn unique_sources(recommendations: &[Recommendation]) -> Vec<String> {
    let mut sources = Vec::new();
    for rec in recommendations {
        if !sources.contains(&rec.job_posting.source) {
            sources.push(rec.job_posting.source.clone());
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_and_ai_learning_rename() {
        let request: RecommendationsRequest = serde_json::from_str(
            r#"{"profile": null, "useAILearning": true}"#,
        )
        .unwrap();
        assert!(request.profile.is_none());
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 5);
        assert!(!request.refresh);
        assert!(request.use_ai_learning);
        assert!(request.ratings.is_empty());
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let meta = Meta {
            crawled_count: 3,
            sources: vec!["saramin".to_string()],
            ai_learning_applied: false,
            ratings_used: 0,
            feedback_applied: false,
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["crawledCount"], 3);
        assert_eq!(value["aiLearningApplied"], false);
    }
}
