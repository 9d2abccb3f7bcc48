use serde::{Deserialize, Serialize};

/// A normalized job posting, the common shape every source adapter produces.
///
/// `id` embeds the source name and the source's native identifier. Sources
/// without a stable native id fall back to a timestamp suffix, so the
/// `(company, title)` posting key — not the id — is authoritative for dedup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    /// Free-text experience requirement, e.g. "신입", "경력 3년 이상".
    pub experience_level: String,
    /// Free-text education requirement, e.g. "대졸(4년) 이상", "학력무관".
    pub education: String,
    pub skills: Vec<String>,
    pub salary: String,
    /// ISO date or the sentinel "상시채용" for open-ended postings.
    pub deadline: String,
    pub url: String,
    pub source: String,
    pub summary: String,
    pub created_at: String,
}

/// A scored posting. Ephemeral — recomputed per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub job_posting: JobPosting,
    /// Match score in 0..=100.
    pub match_score: u8,
    pub match_reasons: Vec<String>,
}
