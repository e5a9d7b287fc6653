//! Submission of the skylink list to skyd's blocklist endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{ Deserialize, Serialize };

use crate::{ credentials, display_body, SyncError };

pub const SKYD_API_PORT: u16 = 9980;

/// skyd rejects requests without this agent string.
const USER_AGENT: &str = "Sia-Agent";

#[derive(Debug, Serialize)]
struct BlocklistRequest<'a> {
    add: &'a [String],
}

#[derive(Debug, Deserialize)]
struct BlocklistResponse {
    #[serde(default)]
    invalids: Option<Vec<String>>,
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    AllAccepted,
    /// skyd accepted the request but rejected these entries.
    Rejected(Vec<String>),
}

/// Sink for the assembled skylink list.
#[async_trait]
pub trait BlocklistTarget: Send + Sync {
    async fn submit(&self, skylinks: &[String]) -> Result<Outcome, SyncError>;
}

/// Production target: the blocklist endpoint of the local skyd node.
pub struct SkydClient {
    client: Client,
    url: String,
}

impl SkydClient {
    pub fn new(ip: &str) -> Self {
        SkydClient {
            client: Client::new(),
            url: format!("http://{}:{}/skynet/blocklist", ip, SKYD_API_PORT),
        }
    }
}

#[async_trait]
impl BlocklistTarget for SkydClient {
    /// POSTs the full skylink list to the node in one request,
    /// authenticated with an empty username and the skyd API password.
    async fn submit(&self, skylinks: &[String]) -> Result<Outcome, SyncError> {
        let password = credentials::get_api_password()?;

        let response = self.client
            .post(&self.url)
            .header("User-Agent", USER_AGENT)
            .basic_auth("", Some(&password))
            .json(&BlocklistRequest { add: skylinks })
            .send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        interpret_response(status, body)
    }
}

/// Maps a raw response onto an outcome: a null or absent `invalids` list
/// means every skylink was accepted.
pub fn interpret_response(status: u16, body: String) -> Result<Outcome, SyncError> {
    if status != 200 {
        return Err(SyncError::UnexpectedStatus {
            status,
            body: display_body(body),
        });
    }

    let parsed: BlocklistResponse = serde_json::from_str(&body)?;

    match parsed.invalids {
        None => Ok(Outcome::AllAccepted),
        Some(invalids) => Ok(Outcome::Rejected(invalids)),
    }
}
