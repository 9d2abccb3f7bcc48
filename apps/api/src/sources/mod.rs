//! Source adapters. One adapter per external job-listing origin, all
//! normalizing into [`JobPosting`] behind the [`JobSource`] trait so sources
//! can be swapped independently of the pipeline.

pub mod incruit;
pub mod jobkorea;
pub mod jumpit;
pub mod saramin;
pub mod wanted;
pub mod worknet;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use crate::models::{ExperienceTier, JobPosting};

pub(crate) const DESKTOP_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub(crate) const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Mobile/15E148 Safari/604.1";

const FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Parse(String),
}

/// Contract every adapter fulfills: given a free-text keyword and an
/// optional experience tier, produce a best-effort posting list. The
/// aggregator treats any `Err` as zero results for that source.
#[async_trait]
pub trait JobSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(
        &self,
        keyword: &str,
        tier: Option<ExperienceTier>,
    ) -> Result<Vec<JobPosting>, SourceError>;
}

pub(crate) fn http_client(user_agent: &str) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
}

/// RFC3339 crawl timestamp stamped onto every posting.
pub(crate) fn crawl_timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Millisecond suffix for sources without a stable native id. Two fetches of
/// the same posting therefore get different ids; the company+title posting
/// key is what keeps dedup working.
pub(crate) fn id_suffix() -> i64 {
    Utc::now().timestamp_millis()
}
