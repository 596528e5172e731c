use anyhow::Result;
use dita_core::config::DitaConfig;
use dita_core::protocol::WorkerMessage;
use owo_colors::OwoColorize;
use tracing::debug;

use crate::client::WorkerClient;

/// Ask the worker to arm the daily notification, starting it if needed.
pub async fn send(config: &DitaConfig) -> Result<()> {
    let client = WorkerClient::connect(config.worker.port).await?;
    client.send(WorkerMessage::ScheduleNotification).await
}

/// Sent once per app start. Silent when permission is missing or the
/// worker cannot be reached.
pub async fn on_load(config: &DitaConfig) {
    if !config.notifications.permission.is_granted() {
        return;
    }
    if let Err(e) = send(config).await {
        debug!("Could not schedule notifications: {e:#}");
    }
}

pub async fn run(config: &DitaConfig) -> Result<()> {
    if !config.notifications.permission.is_granted() {
        println!(
            "{}",
            "Notifications are not enabled. Run `dita notifications enable` first.".yellow()
        );
        return Ok(());
    }

    send(config).await?;
    println!("{}", "Daily notification scheduled.".green());
    Ok(())
}
