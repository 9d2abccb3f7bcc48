//! JobKorea adapter — scrapes the mobile search page, which ships three
//! different list markups depending on the section. The same posting can
//! appear in more than one section, so results are de-duplicated by posting
//! number before they leave the adapter.

use async_trait::async_trait;
use chrono::{Days, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{crawl_timestamp, http_client, id_suffix, JobSource, SourceError, MOBILE_UA};
use crate::models::{ExperienceTier, JobPosting};

const BASE_URL: &str = "https://www.jobkorea.co.kr";
const MOBILE_SEARCH_URL: &str = "https://m.jobkorea.co.kr/Search/Adv";

static POSTING_NO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d+)").unwrap());
static DEADLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~?(\d{1,2})/(\d{1,2})").unwrap());
static D_DAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)D-(\d+)").unwrap());

pub struct JobKorea {
    client: Client,
}

impl JobKorea {
    pub fn new() -> Self {
        Self {
            client: http_client(MOBILE_UA),
        }
    }
}

impl Default for JobKorea {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobSource for JobKorea {
    fn name(&self) -> &'static str {
        "jobkorea"
    }

    async fn fetch(
        &self,
        keyword: &str,
        tier: Option<ExperienceTier>,
    ) -> Result<Vec<JobPosting>, SourceError> {
        let mut query = vec![("Keyword", keyword.to_string())];
        match tier {
            Some(ExperienceTier::Junior) => query.push(("CareerType", "1".to_string())),
            Some(ExperienceTier::Experienced) => query.push(("CareerType", "2".to_string())),
            None => {}
        }

        let response = self
            .client
            .get(MOBILE_SEARCH_URL)
            .query(&query)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "ko-KR,ko;q=0.9")
            .header("Referer", "https://m.jobkorea.co.kr/")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let html = response.text().await?;
        let jobs = parse_mobile_page(&html);
        debug!("jobkorea: {} jobs for '{keyword}'", jobs.len());
        Ok(jobs)
    }
}

pub(crate) fn parse_mobile_page(html: &str) -> Vec<JobPosting> {
    let document = Html::parse_document(html);
    let mut jobs = Vec::new();

    parse_onepick_section(&document, &mut jobs);
    parse_list_section(&document, &mut jobs);
    parse_search_section(&document, &mut jobs);

    dedupe_by_posting_no(jobs)
}

/// OnePick section: `li.section-item[data-gino]` with a cash-bonus badge.
fn parse_onepick_section(document: &Html, jobs: &mut Vec<JobPosting>) {
    let Ok(item_sel) = Selector::parse("li.section-item[data-gino]") else {
        return;
    };

    for item in document.select(&item_sel) {
        let Some(gi_no) = item.value().attr("data-gino") else {
            continue;
        };
        let Some(g_no) = item.value().attr("data-gno") else {
            continue;
        };

        let company = select_text(&item, ".item-corp_name").unwrap_or_default();
        let title = select_text(&item, ".item-title").unwrap_or_default();
        if title.is_empty() || company.is_empty() {
            continue;
        }

        let celebrate = select_text(&item, ".celebrate-badge em").unwrap_or_default();
        let salary = if celebrate.is_empty() {
            String::new()
        } else {
            format!("합격축하금 {celebrate}")
        };

        jobs.push(base_posting(
            format!("jobkorea_{gi_no}_{}", id_suffix()),
            title,
            company,
            "미정".to_string(),
            "경력무관".to_string(),
            "학력무관".to_string(),
            salary,
            String::new(),
            format!("{BASE_URL}/Recruit/GI_Read/{g_no}"),
        ));
    }
}

/// Regular list items: `article.list-item` / `li.list-item` with condition spans
/// classified by their text content.
fn parse_list_section(document: &Html, jobs: &mut Vec<JobPosting>) {
    let Ok(item_sel) = Selector::parse("article.list-item, li.list-item") else {
        return;
    };

    for item in document.select(&item_sel) {
        let href = select_attr(&item, "a", "href").unwrap_or_default();
        let Some(g_no) = extract_posting_no(&href) else {
            continue;
        };

        let company = select_text(&item, ".list-item_corp, .corp-name").unwrap_or_default();
        let title = select_text(&item, ".list-item_title, .recruit-title").unwrap_or_default();
        if title.is_empty() || company.is_empty() {
            continue;
        }

        let mut location = "미정".to_string();
        let mut experience_level = "경력무관".to_string();
        let mut education = "학력무관".to_string();
        for text in select_all_text(&item, ".list-item_condition span, .recruit-condition span") {
            if text.contains("신입") || text.contains("경력") {
                experience_level = text;
            } else if text.contains("대졸")
                || text.contains("고졸")
                || text.contains("석사")
                || text.contains("학력")
            {
                education = text;
            } else if text.contains('시') || text.contains('구') || text.contains('도') {
                location = text;
            }
        }

        let deadline =
            parse_deadline(&select_text(&item, ".list-item_date, .recruit-date").unwrap_or_default());

        jobs.push(base_posting(
            format!("jobkorea_{g_no}_{}", id_suffix()),
            title,
            company,
            location,
            experience_level,
            education,
            String::new(),
            deadline,
            format!("{BASE_URL}/Recruit/GI_Read/{g_no}"),
        ));
    }
}

/// Search-results list: `div.list-section ul.list li` with an
/// `a.list-item_link` anchor.
fn parse_search_section(document: &Html, jobs: &mut Vec<JobPosting>) {
    let Ok(item_sel) = Selector::parse("div.list-section ul.list li") else {
        return;
    };

    for (index, item) in document.select(&item_sel).enumerate() {
        let Some(href) = select_attr(&item, "a.list-item_link", "href") else {
            continue;
        };
        let g_no = extract_posting_no(&href).unwrap_or_else(|| format!("gen_{index}"));

        let company = select_text(&item, ".list-item_corp").unwrap_or_default();
        let title = select_text(&item, ".list-item_title").unwrap_or_default();
        if title.is_empty() || company.is_empty() {
            continue;
        }

        let location =
            select_text(&item, ".list-item_loc").unwrap_or_else(|| "미정".to_string());
        let experience_level =
            select_text(&item, ".list-item_career").unwrap_or_else(|| "경력무관".to_string());
        let deadline =
            parse_deadline(&select_text(&item, ".list-item_date").unwrap_or_default());

        let url = if href.starts_with("http") {
            href
        } else {
            format!("{BASE_URL}{href}")
        };

        jobs.push(base_posting(
            format!("jobkorea_{g_no}_{}", id_suffix()),
            title,
            company,
            location,
            experience_level,
            "학력무관".to_string(),
            String::new(),
            deadline,
            url,
        ));
    }
}

#[allow(clippy::too_many_arguments)]
fn base_posting(
    id: String,
    title: String,
    company: String,
    location: String,
    experience_level: String,
    education: String,
    salary: String,
    deadline: String,
    url: String,
) -> JobPosting {
    JobPosting {
        id,
        summary: title.clone(),
        title,
        company,
        location,
        experience_level,
        education,
        skills: Vec::new(),
        salary,
        deadline,
        url,
        source: "jobkorea".to_string(),
        created_at: crawl_timestamp(),
    }
}

fn extract_posting_no(href: &str) -> Option<String> {
    POSTING_NO_RE
        .captures(href)
        .map(|caps| caps[1].to_string())
}

/// Same posting may appear in several sections; keyed by the posting number
/// embedded in the URL, falling back to company+title.
fn dedupe_by_posting_no(jobs: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen = std::collections::HashSet::new();
    jobs.into_iter()
        .filter(|job| {
            let key = extract_posting_no(&job.url)
                .unwrap_or_else(|| format!("{}_{}", job.company, job.title));
            seen.insert(key)
        })
        .collect()
}

/// Handles "~01/31(금)", "D-7" and open-ended markers.
fn parse_deadline(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    if let Some(caps) = DEADLINE_RE.captures(text) {
        let year = Utc::now().format("%Y");
        return format!("{year}-{:0>2}-{:0>2}", &caps[1], &caps[2]);
    }
    if let Some(caps) = D_DAY_RE.captures(text) {
        if let Ok(days) = caps[1].parse::<u64>() {
            if let Some(date) = Utc::now().date_naive().checked_add_days(Days::new(days)) {
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
