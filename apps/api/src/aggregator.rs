//! Fan-out aggregation: every derived keyword against every registered
//! source, concurrently, merged in a deterministic order (keyword-major,
//! then source registration order). Source failures never fail the batch.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::dedup::{self, seen_store::SeenJobsStore};
use crate::keywords::generate_search_keywords;
use crate::models::{ExperienceTier, JobPosting, UserProfile};
use crate::sources::JobSource;

/// Below this many fresh postings the seen filter is bypassed: a stale but
/// full page beats a fresh but empty one.
const MIN_FRESH_RESULTS: usize = 5;
/// Cap on a bypassed batch.
const BYPASS_LIMIT: usize = 20;

pub struct Aggregator {
    sources: Vec<Arc<dyn JobSource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn JobSource>>) -> Self {
        Self { sources }
    }

    /// Full pipeline: derive keywords, fan out, merge, dedupe within the
    /// batch, then apply the cross-session seen filter (unless skipped).
    pub async fn fetch_jobs(
        &self,
        profile: Option<&UserProfile>,
        store: &SeenJobsStore,
        skip_seen_filter: bool,
    ) -> Vec<JobPosting> {
        let keywords = generate_search_keywords(profile);
        let tier = profile.map(|p| p.experience_level);

        let merged = self.fetch_by_keywords(&keywords, tier).await;
        if merged.is_empty() {
            // Served as-is: synthetic postings must never enter the seen
            // registry or they would be filtered out on the next request.
            warn!("all sources returned nothing, serving the sample catalog");
            return sample_jobs();
        }

        let unique = dedup::dedupe_batch(merged);
        info!("aggregated {} unique postings for {keywords:?}", unique.len());

        if skip_seen_filter {
            return unique;
        }

        // Keys for fresh postings are committed before the bypass decision,
        // so a bypassed batch still advances the registry.
        let fresh = dedup::filter_and_mark_seen(store, unique.clone());
        if fresh.len() < MIN_FRESH_RESULTS && unique.len() >= MIN_FRESH_RESULTS {
            info!(
                "only {} fresh postings, bypassing seen filter ({} unique)",
                fresh.len(),
                unique.len()
            );
            let mut bypassed = unique;
            bypassed.truncate(BYPASS_LIMIT);
            return bypassed;
        }
        fresh
    }

    /// Runs every (keyword, source) pair concurrently and merges the results
    /// keyword-major, then in source registration order. A failing pair
    /// contributes zero postings.
    pub async fn fetch_by_keywords(
        &self,
        keywords: &[String],
        tier: Option<ExperienceTier>,
    ) -> Vec<JobPosting> {
        let source_count = self.sources.len();
        let mut set = JoinSet::new();

        for (ki, keyword) in keywords.iter().enumerate() {
            for (si, source) in self.sources.iter().enumerate() {
                let source = Arc::clone(source);
                let keyword = keyword.clone();
                set.spawn(async move {
                    let jobs = match source.fetch(&keyword, tier).await {
                        Ok(jobs) => jobs,
                        Err(e) => {
                            warn!("{} failed for '{keyword}': {e}", source.name());
                            Vec::new()
                        }
                    };
                    (ki * source_count + si, jobs)
                });
            }
        }

        let mut buckets: Vec<Vec<JobPosting>> = (0..keywords.len() * source_count)
            .map(|_| Vec::new())
            .collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((slot, jobs)) => buckets[slot] = jobs,
                Err(e) => warn!("source task panicked: {e}"),
            }
        }

        buckets.into_iter().flatten().collect()
    }
}

/// Static catalog served when every source comes back empty, so the client
/// always has something to render.
pub fn sample_jobs() -> Vec<JobPosting> {
    let samples = [
        (
            "네이버",
            "백엔드 개발자 (신입/경력)",
            "경기 성남시",
            "신입/경력",
            "대졸(4년) 이상",
            &["Java", "Spring", "MySQL"][..],
            "네이버 서비스 백엔드 개발",
        ),
        (
            "카카오",
            "프론트엔드 개발자",
            "제주/판교",
            "신입",
            "학력무관",
            &["JavaScript", "React", "TypeScript"][..],
            "카카오 서비스 프론트엔드 개발",
        ),
        (
            "삼성전자",
            "SW 개발 신입사원 채용",
            "경기 수원시",
            "신입",
            "대졸(4년) 이상",
            &["C++", "알고리즘", "임베디드"][..],
            "가전/모바일 소프트웨어 개발",
        ),
        (
            "쿠팡",
            "데이터 엔지니어",
            "서울 송파구",
            "경력 2년 이상",
            "학력무관",
            &["Python", "Spark", "AWS"][..],
            "커머스 데이터 파이프라인 구축",
        ),
        (
            "토스",
            "서버 개발자",
            "서울 강남구",
            "경력 3년 이상",
            "학력무관",
            &["Kotlin", "Spring", "Kubernetes"][..],
            "금융 서비스 서버 개발",
        ),
    ];

    samples
        .into_iter()
        .enumerate()
        .map(
            |(i, (company, title, location, experience, education, skills, summary))| JobPosting {
                id: format!("sample_{}", i + 1),
                title: title.to_string(),
                company: company.to_string(),
                location: location.to_string(),
                experience_level: experience.to_string(),
                education: education.to_string(),
                skills: skills.iter().map(|s| s.to_string()).collect(),
                salary: String::new(),
                deadline: "상시채용".to_string(),
                url: "https://example.com".to_string(),
                source: "sample".to_string(),
                summary: summary.to_string(),
                created_at: "2025-01-01T00:00:00Z".to_string(),
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::posting_key;
    use crate::sources::SourceError;
    use async_trait::async_trait;

    struct StubSource {
        name: &'static str,
        jobs: Vec<JobPosting>,
    }

    #[async_trait]
    impl JobSource for StubSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(
            &self,
            _keyword: &str,
            _tier: Option<ExperienceTier>,
        ) -> Result<Vec<JobPosting>, SourceError> {
            Ok(self.jobs.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl JobSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch(
            &self,
            _keyword: &str,
            _tier: Option<ExperienceTier>,
        ) -> Result<Vec<JobPosting>, SourceError> {
            Err(SourceError::Parse("boom".to_string()))
        }
    }

    fn job(company: &str, title: &str) -> JobPosting {
        let mut sample = sample_jobs().remove(0);
        sample.id = format!("stub_{company}_{title}");
        sample.company = company.to_string();
        sample.title = title.to_string();
        sample
    }

    #[test]
    fn test_sample_catalog_has_five_distinct_postings() {
        let samples = sample_jobs();
        assert_eq!(samples.len(), 5);
        assert_eq!(dedup::dedupe_batch(samples).len(), 5);
    }

    #[tokio::test]
    async fn test_empty_sources_fall_back_to_samples() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenJobsStore::new(dir.path());
        let aggregator = Aggregator::new(vec![]);

        let jobs = aggregator.fetch_jobs(None, &store, true).await;
        assert_eq!(jobs.len(), 5);
        assert!(jobs.iter().all(|j| j.source == "sample"));
    }

    #[tokio::test]
    async fn test_sample_catalog_never_enters_seen_registry() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenJobsStore::new(dir.path());
        let aggregator = Aggregator::new(vec![]);

        // Two rounds with the seen filter active: the samples come back in
        // full both times and leave no keys behind.
        for _ in 0..2 {
            let jobs = aggregator.fetch_jobs(None, &store, false).await;
            assert_eq!(jobs.len(), 5);
        }
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn test_failing_source_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenJobsStore::new(dir.path());
        let aggregator = Aggregator::new(vec![
            Arc::new(FailingSource),
            Arc::new(StubSource {
                name: "stub",
                jobs: vec![job("회사", "개발자")],
            }),
        ]);

        let jobs = aggregator.fetch_jobs(None, &store, true).await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company, "회사");
    }

    #[tokio::test]
    async fn test_merge_order_is_source_registration_order() {
        let first = Arc::new(StubSource {
            name: "first",
            jobs: vec![job("첫째", "개발자")],
        });
        let second = Arc::new(StubSource {
            name: "second",
            jobs: vec![job("둘째", "개발자")],
        });
        let aggregator = Aggregator::new(vec![first, second]);

        let jobs = aggregator
            .fetch_by_keywords(&["키워드".to_string()], None)
            .await;
        assert_eq!(jobs[0].company, "첫째");
        assert_eq!(jobs[1].company, "둘째");
    }

    #[tokio::test]
    async fn test_cross_source_duplicates_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenJobsStore::new(dir.path());
        let aggregator = Aggregator::new(vec![
            Arc::new(StubSource {
                name: "a",
                jobs: vec![job("회사", "개발자")],
            }),
            Arc::new(StubSource {
                name: "b",
                jobs: vec![job("회사", "개발자")],
            }),
        ]);

        let jobs = aggregator.fetch_jobs(None, &store, true).await;
        assert_eq!(jobs.len(), 1);
    }

    #[tokio::test]
    async fn test_seen_filter_bypassed_when_nearly_everything_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenJobsStore::new(dir.path());

        let batch: Vec<JobPosting> = (0..20)
            .map(|i| job(&format!("회사{i}"), "개발자"))
            .collect();
        // 18 of 20 already seen leaves only 2 fresh, below the threshold.
        let stale_keys: Vec<String> = batch
            .iter()
            .take(18)
            .map(|j| posting_key(&j.company, &j.title))
            .collect();
        store.commit(&stale_keys).unwrap();

        let aggregator = Aggregator::new(vec![Arc::new(StubSource {
            name: "stub",
            jobs: batch,
        })]);
        let jobs = aggregator.fetch_jobs(None, &store, false).await;
        assert_eq!(jobs.len(), 20);
    }

    #[tokio::test]
    async fn test_seen_filter_applies_when_enough_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenJobsStore::new(dir.path());

        let batch: Vec<JobPosting> = (0..10)
            .map(|i| job(&format!("회사{i}"), "개발자"))
            .collect();
        let stale_keys: Vec<String> = batch
            .iter()
            .take(2)
            .map(|j| posting_key(&j.company, &j.title))
            .collect();
        store.commit(&stale_keys).unwrap();

        let aggregator = Aggregator::new(vec![Arc::new(StubSource {
            name: "stub",
            jobs: batch,
        })]);
        let jobs = aggregator.fetch_jobs(None, &store, false).await;
        assert_eq!(jobs.len(), 8);
    }
}
