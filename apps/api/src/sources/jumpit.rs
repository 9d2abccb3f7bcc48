//! Jumpit adapter — JSON API client (`/api/positions`). The payload is
//! loosely shaped: locations may be a string or an array, tech stacks may be
//! plain strings or `{name}` objects.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{crawl_timestamp, http_client, id_suffix, JobSource, SourceError, DESKTOP_UA};
use crate::models::{ExperienceTier, JobPosting};

const BASE_URL: &str = "https://www.jumpit.co.kr";
const API_URL: &str = "https://api.jumpit.co.kr/api/positions";

#[derive(Debug, Deserialize)]
struct JumpitResponse {
    #[serde(default)]
    result: JumpitResult,
}

#[derive(Debug, Default, Deserialize)]
struct JumpitResult {
    #[serde(default)]
    positions: Vec<JumpitPosition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JumpitPosition {
    id: Option<i64>,
    title: Option<String>,
    company_name: Option<String>,
    #[serde(default)]
    locations: Option<OneOrMany>,
    #[serde(default)]
    tech_stacks: Vec<TechStack>,
    min_career: Option<i32>,
    max_career: Option<i32>,
    newcomer: Option<bool>,
    celebration: Option<i64>,
    closed_at: Option<String>,
    job_category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<String>),
    One(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TechStack {
    Plain(String),
    Named { name: String },
}

impl TechStack {
    fn into_name(self) -> String {
        match self {
            TechStack::Plain(name) => name,
            TechStack::Named { name } => name,
        }
    }
}

pub struct Jumpit {
    client: Client,
}

impl Jumpit {
    pub fn new() -> Self {
        Self {
            client: http_client(DESKTOP_UA),
        }
    }
}

impl Default for Jumpit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobSource for Jumpit {
    fn name(&self) -> &'static str {
        "jumpit"
    }

    async fn fetch(
        &self,
        _keyword: &str,
        tier: Option<ExperienceTier>,
    ) -> Result<Vec<JobPosting>, SourceError> {
        let mut query = vec![("page", "1".to_string()), ("sort", "rsp_rate".to_string())];
        match tier {
            Some(ExperienceTier::Junior) => query.push(("career", "0".to_string())),
            Some(ExperienceTier::Experienced) => query.push(("career", "1,2,3,4,5".to_string())),
            None => {}
        }

        let response = self
            .client
            .get(API_URL)
            .query(&query)
            .header("Accept", "application/json")
            .header("Accept-Language", "ko-KR,ko;q=0.9")
            .header("Referer", "https://www.jumpit.co.kr/positions")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let body: JumpitResponse = response.json().await?;
        let jobs = map_positions(body);
        debug!("jumpit: {} jobs", jobs.len());
        Ok(jobs)
    }
}

fn map_positions(body: JumpitResponse) -> Vec<JobPosting> {
    body.result
        .positions
        .into_iter()
        .filter_map(|item| {
            let job_id = item.id?;
            let title = item.title.filter(|t| !t.is_empty())?;
            let company = item.company_name.filter(|c| !c.is_empty())?;

            let location = match item.locations {
                Some(OneOrMany::Many(list)) if !list.is_empty() => list.join(", "),
                Some(OneOrMany::One(loc)) if !loc.is_empty() => loc,
                _ => "미정".to_string(),
            };

            let skills: Vec<String> = item
                .tech_stacks
                .into_iter()
                .map(TechStack::into_name)
                .filter(|s| !s.is_empty())
                .collect();

            let salary = item
                .celebration
                .filter(|won| *won > 0)
                .map(|won| format!("입사축하금 {won}만원"))
                .unwrap_or_default();

            Some(JobPosting {
                id: format!("jumpit_{job_id}_{}", id_suffix()),
                summary: item.job_category.unwrap_or_else(|| title.clone()),
                title,
                company,
                location,
                experience_level: format_experience(item.min_career, item.max_career, item.newcomer),
                education: "학력무관".to_string(),
                skills,
                salary,
                deadline: item
                    .closed_at
                    .map(|d| normalize_deadline(&d))
                    .unwrap_or_else(|| "상시채용".to_string()),
                url: format!("{BASE_URL}/position/{job_id}"),
                source: "jumpit".to_string(),
                created_at: crawl_timestamp(),
            })
        })
        .collect()
}

fn format_experience(min: Option<i32>, max: Option<i32>, newcomer: Option<bool>) -> String {
    if newcomer == Some(true) {
        return "신입".to_string();
    }
    match (min, max) {
        (None, _) => "경력무관".to_string(),
        (Some(0), None | Some(0)) => "신입".to_string(),
        (Some(0), Some(max)) => format!("신입~{max}년"),
        (Some(min), Some(max)) => format!("경력 {min}~{max}년"),
        (Some(min), None) => format!("경력 {min}년 이상"),
    }
}

/// Keeps just the date portion of an ISO datetime.
fn normalize_deadline(raw: &str) -> String {
    raw.split('T').next().unwrap_or(raw).to_string()
}
