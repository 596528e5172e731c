use anyhow::Result;
use dita_core::config::{DitaConfig, Permission};
use dita_core::protocol::{WorkerMessage, WorkerState};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::client::WorkerClient;
use crate::commands::schedule;

/// Grant notification permission and schedule the daily notification.
pub async fn enable(mut config: DitaConfig, periodic_wake: bool) -> Result<()> {
    config.notifications.permission = Permission::Granted;
    if periodic_wake {
        config.notifications.periodic_wake = Permission::Granted;
    }
    config.save()?;

    schedule::send(&config).await?;

    let time = config.notifications.time()?;
    println!(
        "{} {}",
        "Notifications enabled.".green(),
        format!("A daily notification fires at {}.", time.format("%H:%M")).dimmed()
    );
    Ok(())
}

/// Revoke both permissions and cancel the schedule of a running worker.
pub async fn disable(mut config: DitaConfig) -> Result<()> {
    config.notifications.permission = Permission::Denied;
    config.notifications.periodic_wake = Permission::Denied;
    config.save()?;

    // A stopped worker reads the revoked permission when it next starts.
    let client = WorkerClient::new(config.worker.port);
    if let Err(e) = client.send(WorkerMessage::CancelNotifications).await {
        debug!("No running worker to cancel: {e:#}");
    }

    println!("{}", "Notifications disabled.".yellow());
    Ok(())
}

pub async fn status(config: &DitaConfig) -> Result<()> {
    println!("Notifications:  {}", render_permission(config.notifications.permission));
    println!("Periodic wake:  {}", render_permission(config.notifications.periodic_wake));

    // Only report on a running worker, never start one here.
    match WorkerClient::new(config.worker.port).status().await {
        Ok(status) => {
            println!("Worker:         {}", render_state(status.state));
            if let Some(next) = status.next_fire {
                println!("Next fire:      {}", next.format("%Y-%m-%d %H:%M"));
            }
            match status.cache {
                Some(cache) => println!("Shell cache:    {cache}"),
                None => println!("Shell cache:    {}", "not installed".dimmed()),
            }
        }
        Err(_) => println!("Worker:         {}", "not running".dimmed()),
    }

    Ok(())
}

fn render_permission(permission: Permission) -> String {
    match permission {
        Permission::Granted => "granted".green().to_string(),
        Permission::Denied => "denied".red().to_string(),
        Permission::Prompt => "not asked".dimmed().to_string(),
    }
}

fn render_state(state: WorkerState) -> String {
    match state {
        WorkerState::Installing => "installing".yellow().to_string(),
        WorkerState::Idle => "idle".to_string(),
        WorkerState::TimerArmed => "timer armed".green().to_string(),
        WorkerState::Firing => "firing".green().to_string(),
    }
}
