//! Incruit adapter — scrapes the search page. The site still serves EUC-KR,
//! so the body is decoded with an explicit charset fallback instead of
//! `text()`'s UTF-8 default.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{crawl_timestamp, http_client, id_suffix, JobSource, SourceError, DESKTOP_UA};
use crate::models::{ExperienceTier, JobPosting};

const JOB_URL: &str = "https://job.incruit.com/jobdb_info/jobpost.asp";
const SEARCH_URL: &str = "https://search.incruit.com/list/search.asp";

static DEADLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~?(\d{1,2})[./](\d{1,2})").unwrap());
static D_DAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)D-?(\d+)").unwrap());

pub struct Incruit {
    client: Client,
}

impl Incruit {
    pub fn new() -> Self {
        Self {
            client: http_client(DESKTOP_UA),
        }
    }
}

impl Default for Incruit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobSource for Incruit {
    fn name(&self) -> &'static str {
        "incruit"
    }

    async fn fetch(
        &self,
        keyword: &str,
        _tier: Option<ExperienceTier>,
    ) -> Result<Vec<JobPosting>, SourceError> {
        // The search page has no experience-tier parameter; tier is applied
        // downstream by the scorer.
        let query = [("col", "job"), ("kw", keyword), ("startno", "0")];

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&query)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7")
            .header("Accept-Charset", "euc-kr,utf-8;q=0.7,*;q=0.3")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let html = response.text_with_charset("euc-kr").await?;
        let jobs = parse_search_page(&html);
        debug!("incruit: {} jobs for '{keyword}'", jobs.len());
        Ok(jobs)
    }
}

/// Parses one search page. Each posting is a `ul.c_row` carrying its job
/// number in a `jobno` attribute; rows without one are skipped.
pub(crate) fn parse_search_page(html: &str) -> Vec<JobPosting> {
    let document = Html::parse_document(html);
    let mut jobs = Vec::new();

    let Ok(row_sel) = Selector::parse("ul.c_row") else {
        return jobs;
    };

    for row in document.select(&row_sel) {
        let Some(job_no) = row.value().attr("jobno") else {
            continue;
        };

        let title = select_text(&row, ".cell_mid .cl_top a").unwrap_or_default();
        let company = select_text(&row, ".cell_first .cl_top a").unwrap_or_default();
        if title.is_empty() || company.is_empty() {
            continue;
        }

        let relative_url = select_attr(&row, ".cell_mid .cl_top a", "href").unwrap_or_default();
        let url = if relative_url.starts_with("http") {
            relative_url
        } else {
            format!("{JOB_URL}?job={job_no}")
        };

        let mut location = "미정".to_string();
        let mut experience_level = "경력무관".to_string();
        let mut education = "학력무관".to_string();
        for text in select_all_text(&row, ".cell_mid .cl_md span") {
            if text == "|" {
                continue;
            }
            if text.contains("신입") || text.contains("경력") {
                experience_level = text;
            } else if text.contains("대졸")
                || text.contains("고졸")
                || text.contains("석사")
                || text.contains("학력")
            {
                education = text;
            } else if text.contains('시') || text.contains('도') || text.contains('구') {
                location = text;
            }
        }

        let deadline =
            parse_deadline(&select_text(&row, ".cell_last .cl_btm").unwrap_or_default());

        jobs.push(JobPosting {
            id: format!("incruit_{job_no}_{}", id_suffix()),
            summary: title.clone(),
            title,
            company,
            location,
            experience_level,
            education,
            skills: Vec::new(),
            salary: String::new(),
            deadline,
            url,
            source: "incruit".to_string(),
            created_at: crawl_timestamp(),
        });
    }

    jobs
}

/// Handles "~01/31", "01.31", "D-7" and open-ended markers.
fn parse_deadline(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    if let Some(caps) = DEADLINE_RE.captures(text) {
        let year = chrono::Utc::now().format("%Y");
        return format!("{year}-{:0>2}-{:0>2}", &caps[1], &caps[2]);
    }
    if let Some(caps) = D_DAY_RE.captures(text) {
        if let Ok(days) = caps[1].parse::<u64>() {
            if let Some(date) = chrono::Utc::now()
                .date_naive()
                .checked_add_days(chrono::Days::new(days))
            {
                return date.format("%Y-%m-%d").to_string();
            }
        }
    }
    if text.contains("상시") || text.contains("채용시") {
        return "상시채용".to_string();
    }
    text.to_string()
}

fn select_text(item: &ElementRef, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let element = item.select(&sel).next()?;
    let text = element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn select_attr(item: &ElementRef, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    item.select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.to_string())
}

fn select_all_text(item: &ElementRef, selector: &str) -> Vec<String> {
    let Ok(sel) = Selector::parse(selector) else {
        return Vec::new();
    };
    item.select(&sel)
        .map(|el| {
            el.text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|t| !t.is_empty())
        .collect()
}
