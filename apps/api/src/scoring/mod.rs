//! Recommendation scoring. The rule-based scorer is the baseline and the
//! fallback; the LLM re-ranker layers on top when AI learning is enabled and
//! a client is configured.

pub mod llm;
pub mod prompts;
pub mod rule;

use tracing::warn;

use crate::llm_client::LlmClient;
use crate::models::{FeedbackData, JobPosting, RatingWithJobInfo, Recommendation, UserProfile};

/// Scores and sorts a batch of postings for the given profile.
///
/// When `use_ai` is set and a client is available the LLM ranks the batch;
/// any LLM failure degrades to the rule-based ranking rather than failing
/// the request.
pub async fn recommend(
    profile: &UserProfile,
    jobs: &[JobPosting],
    use_ai: bool,
    ratings: &[RatingWithJobInfo],
    feedback: &FeedbackData,
    llm: Option<&LlmClient>,
) -> Vec<Recommendation> {
    if use_ai {
        if let Some(client) = llm {
            match llm::rank_with_llm(client, profile, jobs, ratings, feedback).await {
                Ok(recommendations) => return recommendations,
                Err(e) => {
                    warn!("LLM ranking failed, falling back to rule-based: {e:#}");
                }
            }
        }
    }

    rule::rank_jobs(profile, jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::sample_jobs;
    use crate::models::ExperienceTier;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            experience_level: ExperienceTier::Junior,
            is_four_year_univ: true,
            university_region: None,
            university_name: None,
            major: "컴퓨터공학".to_string(),
            certifications: vec![],
            career_history: None,
        }
    }

    #[tokio::test]
    async fn test_fallback_equals_rule_based_ranking_exactly() {
        // AI requested but no client configured: the result must be the
        // rule-based ranking, element for element.
        let jobs = sample_jobs();
        let recommended = recommend(
            &profile(),
            &jobs,
            true,
            &[],
            &FeedbackData::default(),
            None,
        )
        .await;
        let ruled = rule::rank_jobs(&profile(), &jobs);

        assert_eq!(recommended.len(), ruled.len());
        for (got, want) in recommended.iter().zip(&ruled) {
            assert_eq!(got.job_posting.id, want.job_posting.id);
            assert_eq!(got.match_score, want.match_score);
            assert_eq!(got.match_reasons, want.match_reasons);
        }
    }
}
