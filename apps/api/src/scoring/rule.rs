//! Rule-based match scoring: a deterministic weighted sum over
//! (profile, posting). Pure functions of their inputs — same profile and
//! posting always produce the same score.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::profile::format_career_duration;
use crate::models::{ExperienceTier, JobPosting, Recommendation, UserProfile};

const BASE_SCORE: i32 = 50;

/// "경력 N년 이상" style requirements in the posting's free-text field.
static REQUIRED_YEARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)년").unwrap());

/// Majors treated as technical for the +10 heuristic.
const TECH_MAJOR_KEYWORDS: &[&str] = &["컴퓨터", "소프트웨어", "정보", "it", "전산", "데이터"];

/// Keywords counted for career/posting overlap, +5 each.
const CAREER_RELEVANCE_KEYWORDS: &[&str] =
    &["개발", "엔지니어", "프론트", "백엔드", "풀스택", "데이터", "ai", "ml"];

/// Weighted match score in 0..=100.
pub fn calculate_match_score(profile: &UserProfile, job: &JobPosting) -> u8 {
    let mut score = BASE_SCORE;

    let is_junior_job =
        job.experience_level.contains("신입") || job.experience_level.contains("무관");
    let is_experienced_job = job.experience_level.contains("경력");
    let career_years = profile.total_career_months() as f64 / 12.0;

    if profile.experience_level == ExperienceTier::Junior && is_junior_job {
        score += 20;
    } else if profile.experience_level == ExperienceTier::Experienced && is_experienced_job {
        score += 15;

        match required_years(&job.experience_level) {
            Some(required) => {
                if career_years >= required {
                    score += 10;
                } else if career_years >= required * 0.7 {
                    score += 5;
                }
            }
            // No explicit year requirement stated.
            None => score += 5,
        }
    } else if job.experience_level.contains("신입/경력") {
        score += 15;
    }

    let requires_four_year =
        job.education.contains("4년") || job.education.contains("대졸");
    let education_flexible =
        job.education.contains("무관") || job.education.contains("2~3년");
    if profile.is_four_year_univ && requires_four_year {
        score += 10;
    } else if education_flexible {
        score += 10;
    }

    score += matched_certifications(profile, job).len() as i32 * 10;

    let major_lower = profile.major.to_lowercase();
    if TECH_MAJOR_KEYWORDS.iter().any(|kw| major_lower.contains(kw)) {
        score += 10;
    }

    score += career_keyword_overlap(profile, job) as i32 * 5;

    score.clamp(0, 100) as u8
}

/// Human-readable reasons matching the score components.
pub fn match_reasons(profile: &UserProfile, job: &JobPosting) -> Vec<String> {
    let mut reasons = Vec::new();

    let is_junior_job =
        job.experience_level.contains("신입") || job.experience_level.contains("무관");
    let career_months = profile.total_career_months();

    if profile.experience_level == ExperienceTier::Junior && is_junior_job {
        reasons.push("신입 지원 가능".to_string());
    } else if profile.experience_level == ExperienceTier::Experienced && career_months > 0 {
        reasons.push(format!("경력 {}", format_career_duration(career_months)));
    }

    if profile.is_four_year_univ
        && (job.education.contains("4년") || job.education.contains("대졸"))
    {
        reasons.push("학력 조건 충족".to_string());
    }

    if let Some(name) = &profile.university_name {
        reasons.push(name.clone());
    }

    let certs = matched_certifications(profile, job);
    if !certs.is_empty() {
        reasons.push(format!("자격증 일치: {}", certs.join(", ")));
    }

    if let Some(company) = related_prior_company(profile, job) {
        reasons.push(format!("관련 경력: {company}"));
    }

    reasons
}

/// Scores and sorts the whole batch, highest first. Sort is stable, so
/// equal scores keep their aggregation order.
pub fn rank_jobs(profile: &UserProfile, jobs: &[JobPosting]) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = jobs
        .iter()
        .map(|job| Recommendation {
            match_score: calculate_match_score(profile, job),
            match_reasons: match_reasons(profile, job),
            job_posting: job.clone(),
        })
        .collect();

    recommendations.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    recommendations
}

fn required_years(experience_level: &str) -> Option<f64> {
    REQUIRED_YEARS_RE
        .captures(experience_level)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// Certifications fuzzy-matched against posting skills: bidirectional
/// case-insensitive substring.
fn matched_certifications<'a>(profile: &'a UserProfile, job: &JobPosting) -> Vec<&'a str> {
    profile
        .certifications
        .iter()
        .filter(|cert| {
            let cert_lower = cert.to_lowercase();
            job.skills.iter().any(|skill| {
                let skill_lower = skill.to_lowercase();
                skill_lower.contains(&cert_lower) || cert_lower.contains(&skill_lower)
            })
        })
        .map(String::as_str)
        .collect()
}

fn career_keyword_overlap(profile: &UserProfile, job: &JobPosting) -> usize {
    let Some(history) = &profile.career_history else {
        return 0;
    };
    if history.is_empty() {
        return 0;
    }

    let career_text = history
        .iter()
        .map(|c| {
            format!("{} {}", c.position, c.description.as_deref().unwrap_or(""))
                .to_lowercase()
        })
        .collect::<Vec<_>>()
        .join(" ");
    let job_text = format!("{} {}", job.title, job.summary).to_lowercase();

    CAREER_RELEVANCE_KEYWORDS
        .iter()
        .filter(|kw| career_text.contains(*kw) && job_text.contains(*kw))
        .count()
}

/// First prior company whose position shares a word with the posting title.
fn related_prior_company(profile: &UserProfile, job: &JobPosting) -> Option<String> {
    let history = profile.career_history.as_ref()?;
    let title_lower = job.title.to_lowercase();

    history
        .iter()
        .find(|c| {
            c.position
                .to_lowercase()
                .split_whitespace()
                .any(|word| title_lower.contains(word))
        })
        .map(|c| c.company.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CareerHistory;

    fn junior_profile() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            experience_level: ExperienceTier::Junior,
            is_four_year_univ: false,
            university_region: None,
            university_name: None,
            major: "점성술학".to_string(),
            certifications: vec![],
            career_history: None,
        }
    }

    fn experienced_profile(years: u32) -> UserProfile {
        let start_year = 2024 - years as i32;
        UserProfile {
            id: "u2".to_string(),
            experience_level: ExperienceTier::Experienced,
            is_four_year_univ: true,
            university_region: None,
            university_name: None,
            major: "컴퓨터공학".to_string(),
            certifications: vec!["정보처리기사".to_string()],
            career_history: Some(vec![CareerHistory {
                company: "이전회사".to_string(),
                position: "백엔드 개발자".to_string(),
                start_date: format!("{start_year}-01"),
                end_date: "2024-01".to_string(),
                description: None,
            }]),
        }
    }

    fn posting(experience_level: &str, education: &str, skills: &[&str]) -> JobPosting {
        JobPosting {
            id: "p1".to_string(),
            title: "백엔드 개발자".to_string(),
            company: "회사".to_string(),
            location: "서울".to_string(),
            experience_level: experience_level.to_string(),
            education: education.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            salary: String::new(),
            deadline: String::new(),
            url: String::new(),
            source: "test".to_string(),
            summary: "서버 개발".to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_junior_vs_newcomer_posting_scores_at_least_70() {
        // 50 base + 20 tier match, independent of every other field.
        let score = calculate_match_score(&junior_profile(), &posting("신입", "", &[]));
        assert!(score >= 70, "expected >= 70, got {score}");
    }

    #[test]
    fn test_score_clamped_to_100() {
        let mut profile = experienced_profile(10);
        profile.certifications = vec![
            "정보처리기사".to_string(),
            "SQLD".to_string(),
            "리눅스마스터".to_string(),
        ];
        let job = posting(
            "경력 3년 이상",
            "대졸(4년) 이상",
            &["정보처리기사", "SQLD", "리눅스마스터", "AWS"],
        );
        assert_eq!(calculate_match_score(&profile, &job), 100);
    }

    #[test]
    fn test_score_is_deterministic() {
        let profile = experienced_profile(5);
        let job = posting("경력 3년 이상", "대졸(4년) 이상", &["정보처리기사"]);
        assert_eq!(
            calculate_match_score(&profile, &job),
            calculate_match_score(&profile, &job)
        );
    }

    #[test]
    fn test_experienced_year_requirement_met_adds_ten() {
        let met = calculate_match_score(&experienced_profile(5), &posting("경력 3년 이상", "", &[]));
        let unmet =
            calculate_match_score(&experienced_profile(1), &posting("경력 3년 이상", "", &[]));
        assert_eq!(met - unmet, 10);
    }

    #[test]
    fn test_experienced_year_requirement_close_adds_five() {
        // 2.5 of 3 required years is within the 70% proximity band.
        let mut close = experienced_profile(0);
        close.career_history = Some(vec![CareerHistory {
            company: "이전회사".to_string(),
            position: "백엔드 개발자".to_string(),
            start_date: "2021-07".to_string(),
            end_date: "2024-01".to_string(),
            description: None,
        }]);
        let unmet =
            calculate_match_score(&experienced_profile(1), &posting("경력 3년 이상", "", &[]));
        let near = calculate_match_score(&close, &posting("경력 3년 이상", "", &[]));
        assert_eq!(near - unmet, 5);
    }

    #[test]
    fn test_open_tier_posting_scores_higher() {
        let without = calculate_match_score(&junior_profile(), &posting("경력 5년", "", &[]));
        let with = calculate_match_score(&junior_profile(), &posting("신입/경력", "", &[]));
        // 신입/경력 also matches the junior branch (+20), which dominates.
        assert!(with > without);
    }

    #[test]
    fn test_flexible_education_adds_ten() {
        let strict = calculate_match_score(&junior_profile(), &posting("신입", "석사 이상", &[]));
        let flexible =
            calculate_match_score(&junior_profile(), &posting("신입", "학력무관", &[]));
        assert_eq!(flexible - strict, 10);
    }

    #[test]
    fn test_certification_match_adds_ten_each() {
        let profile = junior_profile();
        let mut with_certs = profile.clone();
        with_certs.certifications = vec!["SQLD".to_string(), "정보처리기사".to_string()];
        let job = posting("신입", "", &["SQLD", "정보처리기사"]);
        assert_eq!(
            calculate_match_score(&with_certs, &job) - calculate_match_score(&profile, &job),
            20
        );
    }

    #[test]
    fn test_tech_major_adds_ten() {
        let mut tech = junior_profile();
        tech.major = "컴퓨터공학".to_string();
        let job = posting("신입", "", &[]);
        assert_eq!(
            calculate_match_score(&tech, &job) - calculate_match_score(&junior_profile(), &job),
            10
        );
    }

    #[test]
    fn test_reasons_for_junior_match() {
        let reasons = match_reasons(&junior_profile(), &posting("신입", "", &[]));
        assert!(reasons.contains(&"신입 지원 가능".to_string()));
    }

    #[test]
    fn test_reasons_include_career_duration_and_related_company() {
        let reasons = match_reasons(&experienced_profile(3), &posting("경력 3년", "", &[]));
        assert!(reasons.iter().any(|r| r.starts_with("경력 ")));
        assert!(reasons.contains(&"관련 경력: 이전회사".to_string()));
    }

    #[test]
    fn test_rank_jobs_sorts_descending() {
        let jobs = vec![posting("경력 5년", "석사 이상", &[]), posting("신입", "학력무관", &[])];
        let ranked = rank_jobs(&junior_profile(), &jobs);
        assert!(ranked[0].match_score >= ranked[1].match_score);
        assert_eq!(ranked[0].job_posting.experience_level, "신입");
    }
}
