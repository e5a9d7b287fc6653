//! Paginated fetch of blocked skylinks from the Airtable REST API.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::{ display_body, SyncError };

/// Airtable allows 5 requests per second per base; with 1-10s of jitter per
/// retry this bounds a rate-limited run to roughly ten minutes.
pub const MAX_RETRIES: u32 = 100;

const REQUEST_TIMEOUT: u64 = 30;

/// One page of the table, as returned by the records endpoint. A missing
/// `offset` means this was the final page.
#[derive(Debug, Deserialize)]
pub struct Page {
    pub records: Vec<Record>,
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Raw page response before JSON decoding; the status is kept so the fetch
/// loop can react to rate limiting before parsing anything.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

/// Source of table pages, keyed by pagination offset.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, offset: Option<&str>) -> Result<PageResponse, SyncError>;
}

/// Production `PageSource` backed by the Airtable records endpoint.
pub struct AirtableClient {
    client: Client,
    url: String,
    api_key: String,
    field: String,
}

impl AirtableClient {
    pub fn new(config: &Config) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT))
            .build()?;

        Ok(AirtableClient {
            client,
            url: format!("https://api.airtable.com/v0/{}/{}", config.base, config.table),
            api_key: config.api_key.clone(),
            field: config.field.clone(),
        })
    }
}

#[async_trait]
impl PageSource for AirtableClient {
    async fn fetch_page(&self, offset: Option<&str>) -> Result<PageResponse, SyncError> {
        let mut query: Vec<(&str, &str)> = vec![("fields[]", self.field.as_str())];
        if let Some(offset) = offset {
            query.push(("offset", offset));
        }

        let response = self.client
            .get(&self.url)
            .bearer_auth(&self.api_key)
            .query(&query)
            .send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(PageResponse { status, body })
    }
}

/// Result of draining the table.
#[derive(Debug, PartialEq)]
pub enum Fetched {
    Links(Vec<String>),
    /// The very first page had zero records - almost certainly a
    /// misconfigured base/table/field rather than an empty blocklist.
    EmptyFirstPage,
}

/// Accumulates field values across pages, retrying rate-limited requests.
pub struct Fetcher {
    field: String,
    max_retries: u32,
}

impl Fetcher {
    pub fn new(field: String) -> Self {
        Fetcher {
            field,
            max_retries: MAX_RETRIES,
        }
    }

    /// Requests pages until a response carries no offset, collecting the
    /// configured field from every record.
    ///
    /// A 429 puts the loop to sleep for a random 1-10 seconds and retries
    /// the same page; the retry counter resets on any non-429 response and
    /// exceeding `max_retries` consecutive retries aborts the run. Any
    /// other non-200 status aborts immediately.
    pub async fn fetch_all(&self, source: &impl PageSource) -> Result<Fetched, SyncError> {
        let mut skylinks: Vec<String> = Vec::new();
        let mut offset: Option<String> = None;
        let mut retry = 0u32;
        let mut first_page = true;

        loop {
            println!(
                "Requesting a batch of records from Airtable with {} offset{}",
                offset.as_deref().unwrap_or("empty"),
                if retry > 0 { format!(" (retry {})", retry) } else { String::new() }
            );

            let response = source.fetch_page(offset.as_deref()).await?;

            if response.status == 429 {
                if retry >= self.max_retries {
                    return Err(SyncError::RetriesExhausted);
                }
                retry += 1;
                let secs = rand::thread_rng().gen_range(1..=10);
                tokio::time::sleep(Duration::from_secs(secs)).await;
                continue;
            }
            retry = 0;

            if response.status != 200 {
                return Err(SyncError::UnexpectedStatus {
                    status: response.status,
                    body: display_body(response.body),
                });
            }

            let page: Page = serde_json::from_str(&response.body)?;

            if first_page && page.records.is_empty() {
                return Ok(Fetched::EmptyFirstPage);
            }
            first_page = false;

            skylinks.extend(extract_links(&page, &self.field));

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(Fetched::Links(skylinks))
    }
}

/// Pulls `field` out of every record, trimming whitespace and dropping
/// empty values (most likely empty rows). Record order is preserved.
pub fn extract_links(page: &Page, field: &str) -> Vec<String> {
    page.records
        .iter()
        .filter_map(|record| record.fields.get(field).and_then(|value| value.as_str()))
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(String::from)
        .collect()
}
