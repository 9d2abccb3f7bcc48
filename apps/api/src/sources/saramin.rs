//! Saramin adapter — scrapes the desktop search-results page.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{crawl_timestamp, http_client, id_suffix, JobSource, SourceError, DESKTOP_UA};
use crate::models::{ExperienceTier, JobPosting};

const BASE_URL: &str = "https://www.saramin.co.kr";
const SEARCH_URL: &str = "https://www.saramin.co.kr/zf_user/search/recruit";

static DEADLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~?(\d{1,2})/(\d{1,2})").unwrap());

pub struct Saramin {
    client: Client,
}

impl Saramin {
    pub fn new() -> Self {
        Self {
            client: http_client(DESKTOP_UA),
        }
    }
}

impl Default for Saramin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobSource for Saramin {
    fn name(&self) -> &'static str {
        "saramin"
    }

    async fn fetch(
        &self,
        keyword: &str,
        tier: Option<ExperienceTier>,
    ) -> Result<Vec<JobPosting>, SourceError> {
        let mut query = vec![
            ("searchType", "search".to_string()),
            ("searchword", keyword.to_string()),
            ("recruitPage", "1".to_string()),
            ("recruitSort", "relation".to_string()),
            ("recruitPageCount", "40".to_string()),
        ];
        match tier {
            Some(ExperienceTier::Junior) => query.push(("exp_cd", "1".to_string())),
            Some(ExperienceTier::Experienced) => query.push(("exp_cd", "2".to_string())),
            None => {}
        }

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&query)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let html = response.text().await?;
        let jobs = parse_search_page(&html);
        debug!("saramin: {} jobs for '{keyword}'", jobs.len());
        Ok(jobs)
    }
}

/// Parses one search-results page. Items that fail to yield a title and
/// company are skipped individually; the page never fails as a whole.
pub(crate) fn parse_search_page(html: &str) -> Vec<JobPosting> {
    let document = Html::parse_document(html);
    let mut jobs = Vec::new();

    let Ok(item_sel) = Selector::parse(".item_recruit") else {
        return jobs;
    };

    for (index, item) in document.select(&item_sel).enumerate() {
        let title = select_text(&item, ".job_tit a").unwrap_or_default();
        let company = select_text(&item, ".corp_name a").unwrap_or_default();
        if title.is_empty() || company.is_empty() {
            continue;
        }

        let relative_url = select_attr(&item, ".job_tit a", "href").unwrap_or_default();
        let url = if relative_url.starts_with("http") {
            relative_url
        } else {
            format!("{BASE_URL}{relative_url}")
        };

        let conditions = select_all_text(&item, ".job_condition span");
        let location = conditions.first().cloned().unwrap_or_else(|| "미정".to_string());
        let experience_level = conditions.get(1).cloned().unwrap_or_else(|| "무관".to_string());
        let education = conditions.get(2).cloned().unwrap_or_else(|| "학력무관".to_string());

        let deadline = parse_deadline(&select_text(&item, ".job_date .date").unwrap_or_default());

        let sector = select_text(&item, ".job_sector").unwrap_or_default();
        let skills: Vec<String> = sector
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let summary = if sector.is_empty() { title.clone() } else { sector };

        jobs.push(JobPosting {
            // No stable native id on the results page; index + timestamp suffix.
            id: format!("saramin_{index}_{}", id_suffix()),
            title,
            company,
            location,
            experience_level,
            education,
            skills,
            salary: String::new(),
            deadline,
            url,
            source: "saramin".to_string(),
            summary,
            created_at: crawl_timestamp(),
        });
    }

    jobs
}

/// "~03/15(토)" style deadlines; "상시" markers map to the open-ended sentinel.
fn parse_deadline(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    if let Some(caps) = DEADLINE_RE.captures(text) {
        let year = chrono::Utc::now().format("%Y");
        return format!("{year}-{:0>2}-{:0>2}", &caps[1], &caps[2]);
    }
    if text.contains("상시") {
        return "상시채용".to_string();
    }
    text.to_string()
}

fn select_text(item: &ElementRef, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let element = item.select(&sel).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
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

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <div class="content">
          <div class="item_recruit">
            <h2 class="job_tit"><a href="/zf_user/jobs/relay/view?rec_idx=1234">백엔드 개발자 채용</a></h2>
            <div class="area_corp"><strong class="corp_name"><a href="/company/1">테스트컴퍼니</a></strong></div>
            <div class="job_condition">
              <span>서울 강남구</span><span>신입</span><span>대졸(4년) 이상</span><span>정규직</span>
            </div>
            <div class="job_date"><span class="date">~03/15(토)</span></div>
            <div class="job_sector">Java, Spring, MySQL</div>
          </div>
          <div class="item_recruit">
            <h2 class="job_tit"><a href="https://www.saramin.co.kr/view/5678">데이터 엔지니어</a></h2>
            <div class="area_corp"><strong class="corp_name"><a href="/company/2">데이터회사</a></strong></div>
            <div class="job_condition"><span>판교</span><span>경력 3년 이상</span></div>
            <div class="job_date"><span class="date">상시채용</span></div>
            <div class="job_sector"></div>
          </div>
          <div class="item_recruit">
            <h2 class="job_tit"><a href="/broken">무제</a></h2>
          </div>
        </div>
    "#;

    #[test]
    fn test_parse_search_page_extracts_fields() {
        let jobs = parse_search_page(FIXTURE);
        assert_eq!(jobs.len(), 2);

        let first = &jobs[0];
        assert_eq!(first.title, "백엔드 개발자 채용");
        assert_eq!(first.company, "테스트컴퍼니");
        assert_eq!(first.location, "서울 강남구");
        assert_eq!(first.experience_level, "신입");
        assert_eq!(first.education, "대졸(4년) 이상");
        assert_eq!(first.skills, vec!["Java", "Spring", "MySQL"]);
        assert!(first.url.starts_with("https://www.saramin.co.kr/zf_user/jobs"));
        assert!(first.id.starts_with("saramin_0_"));
        assert_eq!(first.source, "saramin");
    }

    #[test]
    fn test_missing_conditions_fall_back_to_defaults() {
        let jobs = parse_search_page(FIXTURE);
        assert_eq!(jobs[1].education, "학력무관");
        assert_eq!(jobs[1].deadline, "상시채용");
        assert_eq!(jobs[1].summary, "데이터 엔지니어");
    }

    #[test]
    fn test_item_without_company_is_skipped() {
        // The third fixture item has no corp_name; it must not abort the page.
        assert_eq!(parse_search_page(FIXTURE).len(), 2);
    }

    #[test]
    fn test_parse_deadline_month_day() {
        let year = chrono::Utc::now().format("%Y").to_string();
        assert_eq!(parse_deadline("~3/5(수)"), format!("{year}-03-05"));
        assert_eq!(parse_deadline("~12/31"), format!("{year}-12-31"));
    }

    #[test]
    fn test_parse_deadline_open_ended() {
        assert_eq!(parse_deadline("상시"), "상시채용");
        assert_eq!(parse_deadline(""), "");
    }

    #[test]
    fn test_absolute_url_kept_as_is() {
        let jobs = parse_search_page(FIXTURE);
        assert_eq!(jobs[1].url, "https://www.saramin.co.kr/view/5678");
    }
}
