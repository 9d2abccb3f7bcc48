//! Two-layer deduplication: intra-batch by normalized posting key, and a
//! cross-session "seen before" filter backed by [`SeenJobsStore`].

pub mod seen_store;

use std::collections::HashSet;

use tracing::{error, info};

use crate::models::JobPosting;
use seen_store::SeenJobsStore;

/// Normalized dedup key: lowercase company + title with whitespace and
/// punctuation stripped, capped at 100 chars. Deliberately ignores the
/// source so the same real-world posting listed on two sites collapses;
/// two distinct postings sharing company+title text collapse too (accepted
/// false-positive tradeoff).
pub fn posting_key(company: &str, title: &str) -> String {
    format!("{company}_{title}")
        .to_lowercase()
        .chars()
        .filter(|c| {
            matches!(c, 'a'..='z' | '0'..='9' | '_') || ('가'..='힣').contains(c)
        })
        .take(100)
        .collect()
}

/// Intra-batch dedup: first occurrence of a posting key wins, later ones
/// are dropped. Surviving postings are returned unmodified.
pub fn dedupe_batch(jobs: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| seen.insert(posting_key(&job.company, &job.title)))
        .collect()
}

/// Cross-session filter: drops postings already in the seen registry, then
/// marks only the survivors as seen and persists. Store failures degrade to
/// "no dedup state" — the batch passes through unfiltered rather than erroring.
pub fn filter_and_mark_seen(store: &SeenJobsStore, jobs: Vec<JobPosting>) -> Vec<JobPosting> {
    let seen: HashSet<String> = store.load_all().into_iter().collect();
    let before = jobs.len();

    let fresh: Vec<JobPosting> = jobs
        .into_iter()
        .filter(|job| !seen.contains(&posting_key(&job.company, &job.title)))
        .collect();

    let new_keys: Vec<String> = fresh
        .iter()
        .map(|job| posting_key(&job.company, &job.title))
        .collect();
    if let Err(e) = store.commit(&new_keys) {
        error!("failed to persist seen-jobs registry: {e}");
    }

    info!(
        "seen filter: {before} -> {} ({} already shown)",
        fresh.len(),
        before - fresh.len()
    );
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn posting(company: &str, title: &str) -> JobPosting {
        JobPosting {
            id: format!("test_{company}_{title}"),
            title: title.to_string(),
            company: company.to_string(),
            location: "서울".to_string(),
            experience_level: "신입".to_string(),
            education: "학력무관".to_string(),
            skills: vec!["Rust".to_string()],
            salary: String::new(),
            deadline: "상시채용".to_string(),
            url: "https://example.com".to_string(),
            source: "test".to_string(),
            summary: title.to_string(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_posting_key_normalizes_case_and_whitespace() {
        assert_eq!(
            posting_key("Acme Corp", "Backend Dev"),
            posting_key("ACME CORP", "backend dev")
        );
    }

    #[test]
    fn test_posting_key_strips_punctuation_keeps_hangul() {
        let key = posting_key("네이버(주)", "백엔드 개발자!");
        assert_eq!(key, "네이버주_백엔드개발자");
    }

    #[test]
    fn test_posting_key_capped_at_100_chars() {
        let long = "a".repeat(300);
        assert_eq!(posting_key(&long, &long).chars().count(), 100);
    }

    #[test]
    fn test_dedupe_batch_first_occurrence_wins() {
        let jobs = vec![
            {
                let mut j = posting("Acme", "Backend Dev");
                j.source = "saramin".to_string();
                j
            },
            {
                let mut j = posting("Acme", "Backend Dev");
                j.source = "wanted".to_string();
                j
            },
        ];
        let unique = dedupe_batch(jobs);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].source, "saramin");
    }

    #[test]
    fn test_dedupe_batch_does_not_mutate_fields() {
        let original = posting("Acme", "Backend Dev");
        let unique = dedupe_batch(vec![original.clone()]);
        assert_eq!(serde_json::to_value(&unique[0]).unwrap(), serde_json::to_value(&original).unwrap());
    }

    #[test]
    fn test_dedupe_batch_keeps_distinct_keys() {
        let jobs = vec![posting("Acme", "Backend Dev"), posting("Acme", "Frontend Dev")];
        assert_eq!(dedupe_batch(jobs).len(), 2);
    }

    #[test]
    fn test_filter_and_mark_seen_drops_known_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenJobsStore::new(dir.path());

        let first = filter_and_mark_seen(&store, vec![posting("Acme", "Backend Dev")]);
        assert_eq!(first.len(), 1);

        let second = filter_and_mark_seen(
            &store,
            vec![posting("Acme", "Backend Dev"), posting("Acme", "Frontend Dev")],
        );
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "Frontend Dev");
    }

    #[test]
    fn test_filter_marks_only_survivors() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenJobsStore::new(dir.path());

        store
            .commit(&[posting_key("Acme", "Backend Dev")])
            .unwrap();
        filter_and_mark_seen(&store, vec![posting("Acme", "Backend Dev")]);

        // Filtered-out postings must not be re-added; only survivors are new.
        assert_eq!(store.load_all().len(), 1);
    }
}
