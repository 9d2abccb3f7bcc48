//! Wanted adapter — JSON API client (`/api/v4/jobs`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{crawl_timestamp, http_client, id_suffix, JobSource, SourceError, DESKTOP_UA};
use crate::models::{ExperienceTier, JobPosting};

const BASE_URL: &str = "https://www.wanted.co.kr";
const API_URL: &str = "https://www.wanted.co.kr/api/v4/jobs";

#[derive(Debug, Deserialize)]
struct WantedResponse {
    #[serde(default)]
    data: Vec<WantedJob>,
}

#[derive(Debug, Deserialize)]
struct WantedJob {
    id: Option<i64>,
    position: Option<String>,
    company: Option<WantedCompany>,
    address: Option<WantedAddress>,
    annual_from: Option<i32>,
    annual_to: Option<i32>,
    reward: Option<WantedReward>,
    due_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WantedCompany {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WantedAddress {
    full_location: Option<String>,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WantedReward {
    formatted_total: Option<String>,
}

pub struct Wanted {
    client: Client,
}

impl Wanted {
    pub fn new() -> Self {
        Self {
            client: http_client(DESKTOP_UA),
        }
    }
}

impl Default for Wanted {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobSource for Wanted {
    fn name(&self) -> &'static str {
        "wanted"
    }

    async fn fetch(
        &self,
        _keyword: &str,
        tier: Option<ExperienceTier>,
    ) -> Result<Vec<JobPosting>, SourceError> {
        // years: -1 all, 0 newcomers, 1+ experienced
        let years = match tier {
            Some(ExperienceTier::Junior) => "0",
            Some(ExperienceTier::Experienced) => "1",
            None => "-1",
        };
        let query = [
            ("country", "kr"),
            ("job_sort", "job.latest_order"),
            ("locations", "all"),
            ("limit", "20"),
            ("years", years),
        ];

        let response = self
            .client
            .get(API_URL)
            .query(&query)
            .header("Accept", "application/json")
            .header("Accept-Language", "ko-KR,ko;q=0.9")
            .header("Referer", "https://www.wanted.co.kr/")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let body: WantedResponse = response.json().await?;
        let jobs = map_jobs(body);
        debug!("wanted: {} jobs", jobs.len());
        Ok(jobs)
    }
}

fn map_jobs(body: WantedResponse) -> Vec<JobPosting> {
    body.data
        .into_iter()
        .filter_map(|item| {
            let job_id = item.id?;
            let title = item.position.filter(|t| !t.is_empty())?;
            let company = item.company.and_then(|c| c.name).filter(|c| !c.is_empty())?;

            let location = item
                .address
                .and_then(|a| a.full_location.or(a.location))
                .unwrap_or_else(|| "미정".to_string());
            let salary = item
                .reward
                .and_then(|r| r.formatted_total)
                .map(|total| format!("추천보상금 {total}"))
                .unwrap_or_default();

            Some(JobPosting {
                id: format!("wanted_{job_id}_{}", id_suffix()),
                summary: title.clone(),
                title,
                company,
                location,
                experience_level: format_experience(item.annual_from, item.annual_to),
                education: "학력무관".to_string(),
                // Skills only appear on the detail page the adapter never visits.
                skills: Vec::new(),
                salary,
                deadline: item.due_time.unwrap_or_else(|| "상시채용".to_string()),
                url: format!("{BASE_URL}/wd/{job_id}"),
                source: "wanted".to_string(),
                created_at: crawl_timestamp(),
            })
        })
        .collect()
}

fn format_experience(from: Option<i32>, to: Option<i32>) -> String {
    match (from, to) {
        (None, _) => "경력무관".to_string(),
        (Some(0), None | Some(0)) => "신입".to_string(),
        (Some(0), Some(to)) => format!("신입~{to}년"),
        (Some(from), Some(to)) => format!("경력 {from}~{to}년"),
        (Some(from), None) => format!("경력 {from}년 이상"),
    }
}
