//! LLM re-ranker. Builds a prompt from the profile, prior ratings and
//! feedback, asks the model to order the batch, and maps its answer back onto
//! the postings. The model's output is untrusted: rankings for unknown ids
//! are dropped, scores are clamped, and any posting the model omits falls
//! back to its rule-based score.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::debug;

use super::prompts::{RECOMMEND_SYSTEM, RESPONSE_FORMAT};
use super::rule;
use crate::llm_client::LlmClient;
use crate::models::profile::format_career_duration;
use crate::models::{FeedbackData, JobPosting, RatingWithJobInfo, Recommendation, UserProfile};

/// At most this many postings go into a single prompt.
const MAX_PROMPT_JOBS: usize = 20;

#[derive(Debug, Deserialize)]
struct LlmRanking {
    id: String,
    score: i64,
    #[serde(default)]
    reasons: Vec<String>,
}

/// Ranks `jobs` with the LLM. Any failure (HTTP, empty answer, unparseable
/// JSON) is returned as an error; the caller decides whether to fall back.
pub async fn rank_with_llm(
    client: &LlmClient,
    profile: &UserProfile,
    jobs: &[JobPosting],
    ratings: &[RatingWithJobInfo],
    feedback: &FeedbackData,
) -> Result<Vec<Recommendation>> {
    let prompt = build_prompt(profile, jobs, ratings, feedback);
    let answer = client
        .complete(&prompt, RECOMMEND_SYSTEM)
        .await
        .context("LLM ranking call failed")?;

    rank_from_answer(profile, jobs, &answer)
}

/// Everything after the network call, separated so the untrusted-answer
/// handling is testable without a client.
fn rank_from_answer(
    profile: &UserProfile,
    jobs: &[JobPosting],
    answer: &str,
) -> Result<Vec<Recommendation>> {
    let rankings = parse_rankings(answer)?;
    debug!("LLM ranked {} of {} postings", rankings.len(), jobs.len());
    Ok(apply_rankings(profile, jobs, rankings))
}

fn build_prompt(
    profile: &UserProfile,
    jobs: &[JobPosting],
    ratings: &[RatingWithJobInfo],
    feedback: &FeedbackData,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("## 사용자 프로필\n");
    prompt.push_str(&format!(
        "- 구분: {}\n",
        match profile.experience_level {
            crate::models::ExperienceTier::Junior => "신입",
            crate::models::ExperienceTier::Experienced => "경력",
        }
    ));
    prompt.push_str(&format!(
        "- 총 경력: {}\n",
        format_career_duration(profile.total_career_months())
    ));
    prompt.push_str(&format!("- 전공: {}\n", profile.major));
    if !profile.certifications.is_empty() {
        prompt.push_str(&format!("- 자격증: {}\n", profile.certifications.join(", ")));
    }
    prompt.push_str(&format!("- 경력사항: {}\n", profile.career_summary()));

    let rating_context = build_rating_context(ratings, feedback);
    if !rating_context.is_empty() {
        prompt.push_str("\n## 사용자 선호 데이터\n");
        prompt.push_str(&rating_context);
    }

    prompt.push_str("\n## 채용 공고 목록\n");
    for job in jobs.iter().take(MAX_PROMPT_JOBS) {
        prompt.push_str(&format!(
            "- id: {} | {} | {} | {} | {} | 기술: {}\n",
            job.id,
            job.company,
            job.title,
            job.experience_level,
            job.education,
            job.skills.join(", ")
        ));
    }

    prompt.push('\n');
    prompt.push_str(RESPONSE_FORMAT);
    prompt
}

/// Summarizes prior ratings and free-form feedback for the prompt. Empty
/// string when the user has given neither.
fn build_rating_context(ratings: &[RatingWithJobInfo], feedback: &FeedbackData) -> String {
    let mut context = String::new();

    let liked: Vec<&RatingWithJobInfo> = ratings.iter().filter(|r| r.rating >= 4).collect();
    let disliked: Vec<&RatingWithJobInfo> = ratings.iter().filter(|r| r.rating <= 2).collect();

    if !liked.is_empty() {
        context.push_str("높게 평가한 공고:\n");
        for r in liked {
            context.push_str(&format!(
                "- {} / {} ({}점, 기술: {})\n",
                r.company,
                r.job_title,
                r.rating,
                r.skills.join(", ")
            ));
        }
    }
    if !disliked.is_empty() {
        context.push_str("낮게 평가한 공고:\n");
        for r in disliked {
            context.push_str(&format!("- {} / {} ({}점)\n", r.company, r.job_title, r.rating));
        }
    }

    if !feedback.is_empty() {
        if !feedback.general_feedback.is_empty() {
            context.push_str(&format!("피드백: {}\n", feedback.general_feedback));
        }
        if !feedback.selected_tags.is_empty() {
            context.push_str(&format!("선호 태그: {}\n", feedback.selected_tags.join(", ")));
        }
        if !feedback.preference_keywords.is_empty() {
            context.push_str(&format!(
                "선호 키워드: {}\n",
                feedback.preference_keywords.join(", ")
            ));
        }
        if !feedback.avoid_keywords.is_empty() {
            context.push_str(&format!(
                "기피 키워드: {}\n",
                feedback.avoid_keywords.join(", ")
            ));
        }
    }

    context
}

/// Pulls the first JSON array out of the model's answer. Models pad their
/// output with prose and markdown fences no matter how firmly told not to.
fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

fn parse_rankings(answer: &str) -> Result<Vec<LlmRanking>> {
    let json = extract_json_array(answer)
        .ok_or_else(|| anyhow!("no JSON array in LLM answer: {answer:.200}"))?;
    serde_json::from_str(json).context("malformed ranking array")
}

/// Maps rankings back onto postings. Unknown ids are dropped; postings the
/// model skipped are appended with their rule-based score, so the answer
/// always covers the full batch.
fn apply_rankings(
    profile: &UserProfile,
    jobs: &[JobPosting],
    rankings: Vec<LlmRanking>,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::with_capacity(jobs.len());
    let mut covered: Vec<&str> = Vec::new();

    for ranking in &rankings {
        let Some(job) = jobs.iter().find(|j| j.id == ranking.id) else {
            debug!("LLM ranked unknown posting id {}", ranking.id);
            continue;
        };
        if covered.contains(&job.id.as_str()) {
            continue;
        }
        covered.push(&job.id);

        let reasons = if ranking.reasons.is_empty() {
            rule::match_reasons(profile, job)
        } else {
            ranking.reasons.clone()
        };
        recommendations.push(Recommendation {
            job_posting: job.clone(),
            match_score: ranking.score.clamp(0, 100) as u8,
            match_reasons: reasons,
        });
    }

    let mut omitted: Vec<Recommendation> = jobs
        .iter()
        .filter(|j| !covered.contains(&j.id.as_str()))
        .map(|job| Recommendation {
            match_score: rule::calculate_match_score(profile, job),
            match_reasons: rule::match_reasons(profile, job),
            job_posting: job.clone(),
        })
        .collect();
    omitted.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    recommendations.extend(omitted);

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExperienceTier;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            experience_level: ExperienceTier::Junior,
            is_four_year_univ: false,
            university_region: None,
            university_name: None,
            major: "컴퓨터공학".to_string(),
            certifications: vec![],
            career_history: None,
        }
    }

    fn job(id: &str, experience_level: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            title: "개발자".to_string(),
            company: "회사".to_string(),
            location: "서울".to_string(),
            experience_level: experience_level.to_string(),
            education: String::new(),
            skills: vec![],
            salary: String::new(),
            deadline: String::new(),
            url: String::new(),
            source: "test".to_string(),
            summary: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_extract_json_array_from_fenced_answer() {
        let answer = "다음과 같습니다:\n```json\n[{\"id\": \"a\", \"score\": 90}]\n```";
        assert_eq!(
            extract_json_array(answer),
            Some(r#"[{"id": "a", "score": 90}]"#)
        );
    }

    #[test]
    fn test_extract_json_array_rejects_proseless_answer() {
        assert_eq!(extract_json_array("죄송합니다, 순위를 매길 수 없습니다."), None);
        assert_eq!(extract_json_array("] 앞에 [ 없음"), None);
    }

    #[test]
    fn test_parse_rankings_rejects_malformed_json() {
        assert!(parse_rankings("[{\"id\": }]").is_err());
        assert!(parse_rankings("no array here").is_err());
    }

    #[test]
    fn test_rank_from_answer_errors_on_malformed_reply() {
        let jobs = vec![job("a", "신입")];
        assert!(rank_from_answer(&profile(), &jobs, "순위를 매길 수 없습니다.").is_err());
        assert!(rank_from_answer(&profile(), &jobs, "```json\n[{\"id\":]\n```").is_err());
    }

    #[test]
    fn test_rank_from_answer_maps_a_valid_reply() {
        let jobs = vec![job("a", "신입"), job("b", "경력")];
        let recs = rank_from_answer(
            &profile(),
            &jobs,
            r#"[{"id": "b", "score": 95, "reasons": ["적합"]}, {"id": "a", "score": 60}]"#,
        )
        .unwrap();
        assert_eq!(recs[0].job_posting.id, "b");
        assert_eq!(recs[0].match_score, 95);
        assert_eq!(recs[1].job_posting.id, "a");
    }

    #[test]
    fn test_parse_rankings_defaults_missing_reasons() {
        let rankings = parse_rankings(r#"[{"id": "a", "score": 70}]"#).unwrap();
        assert_eq!(rankings[0].id, "a");
        assert!(rankings[0].reasons.is_empty());
    }

    #[test]
    fn test_apply_rankings_clamps_and_drops_unknown_ids() {
        let jobs = vec![job("a", "신입"), job("b", "경력")];
        let rankings = vec![
            LlmRanking {
                id: "a".to_string(),
                score: 250,
                reasons: vec!["적합".to_string()],
            },
            LlmRanking {
                id: "ghost".to_string(),
                score: 99,
                reasons: vec![],
            },
        ];
        let recs = apply_rankings(&profile(), &jobs, rankings);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].job_posting.id, "a");
        assert_eq!(recs[0].match_score, 100);
        // "b" was omitted by the model and filled rule-based.
        assert_eq!(recs[1].job_posting.id, "b");
    }

    #[test]
    fn test_apply_rankings_fills_omissions_sorted() {
        let jobs = vec![job("a", "경력 5년"), job("b", "신입"), job("c", "경력 5년")];
        let rankings = vec![LlmRanking {
            id: "a".to_string(),
            score: 80,
            reasons: vec![],
        }];
        let recs = apply_rankings(&profile(), &jobs, rankings);
        assert_eq!(recs.len(), 3);
        // junior profile scores "b" above "c"
        assert_eq!(recs[1].job_posting.id, "b");
        assert_eq!(recs[2].job_posting.id, "c");
    }

    #[test]
    fn test_build_prompt_caps_posting_count() {
        let jobs: Vec<JobPosting> = (0..30).map(|i| job(&format!("j{i}"), "신입")).collect();
        let prompt = build_prompt(&profile(), &jobs, &[], &FeedbackData::default());
        assert!(prompt.contains("id: j19"));
        assert!(!prompt.contains("id: j20"));
    }

    #[test]
    fn test_build_rating_context_splits_liked_and_disliked() {
        let ratings = vec![
            RatingWithJobInfo {
                job_id: "a".to_string(),
                rating: 5,
                job_title: "백엔드".to_string(),
                company: "좋은회사".to_string(),
                skills: vec!["Rust".to_string()],
                experience_level: "신입".to_string(),
            },
            RatingWithJobInfo {
                job_id: "b".to_string(),
                rating: 1,
                job_title: "영업".to_string(),
                company: "싫은회사".to_string(),
                skills: vec![],
                experience_level: String::new(),
            },
        ];
        let context = build_rating_context(&ratings, &FeedbackData::default());
        assert!(context.contains("높게 평가한 공고"));
        assert!(context.contains("좋은회사"));
        assert!(context.contains("낮게 평가한 공고"));
        assert!(context.contains("싫은회사"));
    }

    #[test]
    fn test_build_rating_context_empty_when_no_signal() {
        assert!(build_rating_context(&[], &FeedbackData::default()).is_empty());
    }
}
