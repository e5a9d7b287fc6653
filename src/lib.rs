//! Single-run sync of an Airtable blocklist table into a local skyd node.

pub mod airtable;
pub mod blocklist;
pub mod config;
pub mod credentials;
pub mod notify;
pub mod target;

use thiserror::Error;

use airtable::{ AirtableClient, Fetched, Fetcher, PageSource };
use blocklist::{ BlocklistTarget, Outcome, SkydClient };
use config::Config;
use notify::Notifier;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("unexpected response code {status}: {body}")]
    UnexpectedStatus {
        status: u16,
        body: String,
    },

    #[error("rate limited: retry budget exhausted")]
    RetriesExhausted,

    #[error("skyd API password not found")]
    MissingPassword,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Substitutes a placeholder for empty response bodies so notification
/// messages never trail off after the colon.
pub(crate) fn display_body(body: String) -> String {
    if body.is_empty() { "empty response".to_string() } else { body }
}

/// Runs the whole pipeline once: resolve the skyd address, pull every
/// skylink marked for blocking out of Airtable, push the list to skyd and
/// report the outcome.
pub async fn run(config: &Config, notifier: &dyn Notifier) -> anyhow::Result<()> {
    // Get the skyd IP before doing anything else. If this step fails there
    // is no point continuing with the rest of the run.
    let ipaddress = target::resolve_container_ip(&config.container).await?;

    let source = AirtableClient::new(config)?;
    let skyd = SkydClient::new(&ipaddress);

    run_with(&ipaddress, &config.field, &source, &skyd, notifier).await
}

/// Pipeline body behind the collaborator seams: fetch from `source`,
/// extract, submit to `skyd`, report through `notifier`.
///
/// An empty `ip` aborts before the first request. Expected failure classes
/// (rate-limit exhaustion, non-200 responses, partially rejected
/// submissions) are reported through `notifier` and resolve to `Ok(())` -
/// the run is over and the operator was told. Only genuinely unexpected
/// errors propagate as `Err`, for the caller's catch-all notification.
pub async fn run_with(
    ip: &str,
    field: &str,
    source: &impl PageSource,
    skyd: &impl BlocklistTarget,
    notifier: &dyn Notifier
) -> anyhow::Result<()> {
    if ip.is_empty() {
        println!("Skyd IP could not be detected. Exiting.");
        return Ok(());
    }

    println!("Pulling blocked skylinks from Airtable via api integration");

    let fetcher = Fetcher::new(field.to_string());

    let skylinks = match fetcher.fetch_all(source).await {
        Ok(Fetched::Links(links)) => links,
        Ok(Fetched::EmptyFirstPage) => {
            println!("Airtable returned 0 records - make sure your configuration is correct");
            return Ok(());
        }
        Err(SyncError::RetriesExhausted) => {
            notifier.send("Airtable: too many retries, aborting!", true).await?;
            return Ok(());
        }
        Err(SyncError::UnexpectedStatus { status, body }) => {
            let message = format!(
                "Airtable blocklist integration responded with code {}: {}",
                status, body
            );
            notifier.send(&message, false).await?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!(
        "Sending /skynet/blocklist request with {} skylinks to siad",
        skylinks.len()
    );

    match skyd.submit(&skylinks).await {
        Ok(Outcome::AllAccepted) => {
            notifier.send("Blocklist successfully updated all skylinks", false).await?;
        }
        Ok(Outcome::Rejected(invalids)) => {
            let message = format!(
                "Blocklist responded ok but failed to update {} skylinks: {}",
                invalids.len(),
                serde_json::to_string(&invalids)?
            );
            notifier.send(&message, false).await?;
        }
        Err(SyncError::UnexpectedStatus { status, body }) => {
            let message = format!(
                "Airtable blocklist request responded with code {}: {}",
                status, body
            );
            notifier.send(&message, false).await?;
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
