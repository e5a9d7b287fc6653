use std::process::ExitCode;

use blocklist_sync::config::Config;
use blocklist_sync::notify::{ DiscordNotifier, Notifier, StdoutNotifier };

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {}.", err);
            return ExitCode::FAILURE;
        }
    };

    let notifier: Box<dyn Notifier> = match &config.webhook_url {
        Some(url) => Box::new(DiscordNotifier::new(url.clone())),
        None => Box::new(StdoutNotifier),
    };

    if let Err(err) = blocklist_sync::run(&config, notifier.as_ref()).await {
        // Anything unexpected gets pushed to the channel with a ping; a
        // line in the cron log is too easy to miss.
        let message = format!("```\n{:?}\n```", err);
        if let Err(send_err) = notifier.send(&message, true).await {
            eprintln!("failed to deliver failure notification: {}", send_err);
            eprintln!("{:?}", err);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
