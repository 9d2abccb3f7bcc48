use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel end date for a position the user still holds.
pub const CURRENT_POSITION: &str = "재직중";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceTier {
    Junior,
    Experienced,
}

/// One prior position in the user's career history, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerHistory {
    pub company: String,
    pub position: String,
    /// Start month as "YYYY-MM".
    pub start_date: String,
    /// End month as "YYYY-MM", or [`CURRENT_POSITION`].
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The user-supplied profile every recommendation is ranked against.
/// Created and edited client-side; the server only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub experience_level: ExperienceTier,
    pub is_four_year_univ: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university_name: Option<String>,
    pub major: String,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_history: Option<Vec<CareerHistory>>,
}

/// A prior star rating with enough posting context for the LLM prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingWithJobInfo {
    pub job_id: String,
    /// 1-5 stars.
    pub rating: u8,
    pub job_title: String,
    pub company: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_level: String,
}

/// Free-form preference feedback the user typed into the AI feedback form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackData {
    #[serde(default)]
    pub general_feedback: String,
    #[serde(default)]
    pub selected_tags: Vec<String>,
    #[serde(default)]
    pub preference_keywords: Vec<String>,
    #[serde(default)]
    pub avoid_keywords: Vec<String>,
}

impl FeedbackData {
    pub fn is_empty(&self) -> bool {
        self.general_feedback.is_empty()
            && self.selected_tags.is_empty()
            && self.preference_keywords.is_empty()
            && self.avoid_keywords.is_empty()
    }
}

impl UserProfile {
    /// Total career length in months, summed across all history entries.
    /// Unparseable dates count as zero rather than failing the whole profile.
    pub fn total_career_months(&self) -> u32 {
        let Some(history) = &self.career_history else {
            return 0;
        };

        history
            .iter()
            .map(|career| {
                let Some(start) = parse_month(&career.start_date) else {
                    return 0;
                };
                let end = if career.end_date == CURRENT_POSITION {
                    Utc::now().date_naive()
                } else {
                    match parse_month(&career.end_date) {
                        Some(d) => d,
                        None => return 0,
                    }
                };
                let months = (end.year() - start.year()) * 12
                    + (end.month() as i32 - start.month() as i32);
                months.max(0) as u32
            })
            .sum()
    }

    /// One-line career summary for the LLM prompt, e.g.
    /// "회사(직무, 2021-03~재직중)".
    pub fn career_summary(&self) -> String {
        match &self.career_history {
            Some(history) if !history.is_empty() => history
                .iter()
                .map(|c| format!("{}({}, {}~{})", c.company, c.position, c.start_date, c.end_date))
                .collect::<Vec<_>>()
                .join(", "),
            _ => "없음".to_string(),
        }
    }
}

/// Human-readable career duration, e.g. "2년 3개월".
pub fn format_career_duration(months: u32) -> String {
    let years = months / 12;
    let rest = months % 12;
    match (years, rest) {
        (0, m) => format!("{m}개월"),
        (y, 0) => format!("{y}년"),
        (y, m) => format!("{y}년 {m}개월"),
    }
}

fn parse_month(yyyy_mm: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{yyyy_mm}-01"), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_history(history: Vec<CareerHistory>) -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            experience_level: ExperienceTier::Experienced,
            is_four_year_univ: true,
            university_region: None,
            university_name: None,
            major: "컴퓨터공학".to_string(),
            certifications: vec![],
            career_history: Some(history),
        }
    }

    #[test]
    fn test_total_career_months_sums_entries() {
        let profile = profile_with_history(vec![
            CareerHistory {
                company: "A".to_string(),
                position: "백엔드 개발자".to_string(),
                start_date: "2020-01".to_string(),
                end_date: "2021-01".to_string(),
                description: None,
            },
            CareerHistory {
                company: "B".to_string(),
                position: "백엔드 개발자".to_string(),
                start_date: "2021-01".to_string(),
                end_date: "2021-07".to_string(),
                description: None,
            },
        ]);
        assert_eq!(profile.total_career_months(), 18);
    }

    #[test]
    fn test_total_career_months_ignores_unparseable_dates() {
        let profile = profile_with_history(vec![CareerHistory {
            company: "A".to_string(),
            position: "개발자".to_string(),
            start_date: "invalid".to_string(),
            end_date: "2021-01".to_string(),
            description: None,
        }]);
        assert_eq!(profile.total_career_months(), 0);
    }

    #[test]
    fn test_current_position_counts_to_today() {
        let profile = profile_with_history(vec![CareerHistory {
            company: "A".to_string(),
            position: "개발자".to_string(),
            start_date: "2020-01".to_string(),
            end_date: CURRENT_POSITION.to_string(),
            description: None,
        }]);
        assert!(profile.total_career_months() >= 12);
    }

    #[test]
    fn test_format_career_duration() {
        assert_eq!(format_career_duration(27), "2년 3개월");
        assert_eq!(format_career_duration(24), "2년");
        assert_eq!(format_career_duration(5), "5개월");
    }

    #[test]
    fn test_experience_tier_serde_lowercase() {
        let tier: ExperienceTier = serde_json::from_str(r#""junior""#).unwrap();
        assert_eq!(tier, ExperienceTier::Junior);
        assert_eq!(serde_json::to_string(&ExperienceTier::Experienced).unwrap(), r#""experienced""#);
    }
}
