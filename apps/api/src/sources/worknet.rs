//! Public-institution recruitment adapter (data.go.kr OpenAPI). The API
//! answers in XML; the response is walked with a quick-xml event reader
//! rather than a typed deserializer because the feed omits elements freely.
//!
//! Requires a service key; the adapter is only registered when
//! `WORKNET_API_KEY` is configured.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use tracing::debug;

use super::{crawl_timestamp, http_client, JobSource, SourceError, DESKTOP_UA};
use crate::models::{ExperienceTier, JobPosting};

const API_URL: &str = "https://apis.data.go.kr/1051000/recruitment/list";

#[derive(Debug, Default)]
struct RecruitmentItem {
    serial_no: String,
    institution: String,
    title: String,
    regions: String,
    recruit_type: String,
    ncs_categories: String,
    education: String,
    end_date: String,
    src_url: String,
    preferred: String,
}

pub struct Worknet {
    client: Client,
    service_key: String,
}

impl Worknet {
    pub fn new(service_key: String) -> Self {
        Self {
            client: http_client(DESKTOP_UA),
            service_key,
        }
    }
}

#[async_trait]
impl JobSource for Worknet {
    fn name(&self) -> &'static str {
        "worknet"
    }

    async fn fetch(
        &self,
        keyword: &str,
        _tier: Option<ExperienceTier>,
    ) -> Result<Vec<JobPosting>, SourceError> {
        // The feed has no experience-tier filter; tier is applied downstream
        // by the scorer.
        let query = [
            ("serviceKey", self.service_key.as_str()),
            ("pageNo", "1"),
            ("numOfRows", "100"),
            ("ongoingYn", "Y"),
            ("recrutPbancTtl", keyword),
        ];

        let response = self
            .client
            .get(API_URL)
            .query(&query)
            .header("Accept", "application/xml")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let xml = response.text().await?;
        let jobs = parse_response(&xml)?;
        debug!("worknet: {} jobs for '{keyword}'", jobs.len());
        Ok(jobs)
    }
}

pub(crate) fn parse_response(xml: &str) -> Result<Vec<JobPosting>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut jobs = Vec::new();
    let mut result_code = String::new();
    let mut current: Option<RecruitmentItem> = None;
    let mut tag = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                tag = start.name().as_ref().to_vec();
                if tag == b"item" {
                    current = Some(RecruitmentItem::default());
                }
            }
            Ok(Event::Text(text)) => {
                let value = text
                    .unescape()
                    .map_err(|e| SourceError::Parse(e.to_string()))?
                    .into_owned();
                match &mut current {
                    Some(item) => match tag.as_slice() {
                        b"recrutPblntSn" => item.serial_no = value,
                        b"instNm" => item.institution = value,
                        b"recrutPbancTtl" => item.title = value,
                        b"workRgnNmLst" => item.regions = value,
                        b"recrutSeNm" => item.recruit_type = value,
                        b"ncsCdNmLst" => item.ncs_categories = value,
                        b"acbgCondNmLst" => item.education = value,
                        b"pbancEndYmd" => item.end_date = value,
                        b"srcUrl" => item.src_url = value,
                        b"prefCondCn" => item.preferred = value,
                        _ => {}
                    },
                    None => {
                        if tag == b"resultCode" {
                            result_code = value;
                        }
                    }
                }
            }
            Ok(Event::End(end)) => {
                if end.name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        if let Some(job) = map_item(item) {
                            jobs.push(job);
                        }
                    }
                }
                tag.clear();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(SourceError::Parse(e.to_string())),
        }
    }

    if !result_code.is_empty() && result_code != "200" && result_code != "00" {
        return Err(SourceError::Parse(format!("API result code {result_code}")));
    }
    Ok(jobs)
}

fn map_item(item: RecruitmentItem) -> Option<JobPosting> {
    if item.serial_no.is_empty() || item.title.is_empty() || item.institution.is_empty() {
        return None;
    }

    let skills: Vec<String> = item
        .ncs_categories
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let location = if item.regions.is_empty() {
        "미정".to_string()
    } else {
        item.regions
    };
    let experience_level = if item.recruit_type.is_empty() {
        "미정".to_string()
    } else {
        item.recruit_type
    };

    let url = if item.src_url.starts_with("http") {
        item.src_url
    } else {
        format!("https://{}", item.src_url)
    };

    Some(JobPosting {
        // The feed carries a stable serial number, so no timestamp suffix here.
        id: format!("worknet_{}", item.serial_no),
        title: item.title,
        company: item.institution,
        location,
        experience_level,
        education: item.education,
        skills,
        salary: String::new(),
        deadline: format_yyyymmdd(&item.end_date),
        url,
        source: "worknet".to_string(),
        summary: item.preferred,
        created_at: crawl_timestamp(),
    })
}

fn format_yyyymmdd(raw: &str) -> String {
    if raw.len() != 8 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return raw.to_string();
    }
    format!("{}-{}-{}", &raw[..4], &raw[4..6], &raw[6..8])
}
