//! Batch crawl tool: fetches a keyword list across every source, dedupes the
//! merged batch, and writes a JSON snapshot under the data directory. The
//! sleep between keyword batches is the rate limit; the live API path has
//! none because its fan-out is already bounded by the 3-keyword cap.
//!
//! Usage: `crawl [keyword ...]` — defaults to a small IT keyword list.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobscout::aggregator::Aggregator;
use jobscout::config::Config;
use jobscout::dedup;
use jobscout::models::JobPosting;
use jobscout::sources::{
    incruit::Incruit, jobkorea::JobKorea, jumpit::Jumpit, saramin::Saramin, wanted::Wanted,
    worknet::Worknet, JobSource,
};

const DEFAULT_KEYWORDS: &[&str] = &["신입 개발자", "백엔드 개발자", "프론트엔드 개발자"];

const BATCH_DELAY: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let keywords: Vec<String> = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
        } else {
            args
        }
    };
    info!("crawling {} keywords: {keywords:?}", keywords.len());

    let mut sources: Vec<Arc<dyn JobSource>> = vec![
        Arc::new(Saramin::new()),
        Arc::new(JobKorea::new()),
        Arc::new(Wanted::new()),
        Arc::new(Jumpit::new()),
        Arc::new(Incruit::new()),
    ];
    if let Some(key) = &config.worknet_api_key {
        sources.push(Arc::new(Worknet::new(key.clone())));
    }
    let aggregator = Aggregator::new(sources);

    let mut merged: Vec<JobPosting> = Vec::new();
    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(BATCH_DELAY).await;
        }
        let batch = aggregator
            .fetch_by_keywords(std::slice::from_ref(keyword), None)
            .await;
        info!("'{keyword}': {} postings", batch.len());
        merged.extend(batch);
    }

    let unique = dedup::dedupe_batch(merged);
    info!("{} unique postings after dedup", unique.len());

    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
    let snapshot = config
        .data_dir
        .join(format!("crawl_{}.json", Utc::now().format("%Y%m%d_%H%M%S")));
    fs::write(&snapshot, serde_json::to_string_pretty(&unique)?)
        .with_context(|| format!("failed to write {}", snapshot.display()))?;
    info!("snapshot written to {}", snapshot.display());

    Ok(())
}
