//! HTTP client for communicating with dita-worker

use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use std::time::Duration;

use dita_core::protocol::{WorkerMessage, WorkerStatus};

const MAX_RETRIES: u32 = 10;
const RETRY_DELAY_MS: u64 = 200;
const REQUEST_TIMEOUT_SECS: u64 = 2;

/// HTTP client for dita-worker
pub struct WorkerClient {
    http: reqwest::Client,
    base_url: String,
}

impl WorkerClient {
    pub fn new(port: u16) -> Self {
        WorkerClient {
            http: reqwest::Client::new(),
            base_url: format!("http://127.0.0.1:{port}"),
        }
    }

    /// Connect to a running worker or start one
    pub async fn connect(port: u16) -> Result<Self> {
        let client = Self::new(port);

        if client.status().await.is_ok() {
            return Ok(client);
        }

        // Worker not running - start it
        start_worker()?;

        for _ in 0..MAX_RETRIES {
            tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
            if client.status().await.is_ok() {
                return Ok(client);
            }
        }

        anyhow::bail!("Failed to connect to dita-worker after starting it")
    }

    /// GET /status
    pub async fn status(&self) -> Result<WorkerStatus> {
        let resp = self
            .http
            .get(format!("{}/status", self.base_url))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .context("Failed to connect to dita-worker")?;

        if !resp.status().is_success() {
            anyhow::bail!("dita-worker returned {}", resp.status());
        }

        Ok(resp.json().await?)
    }

    /// POST /messages
    pub async fn send(&self, message: WorkerMessage) -> Result<()> {
        let resp = self
            .http
            .post(format!("{}/messages", self.base_url))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&message)
            .send()
            .await
            .context("Failed to connect to dita-worker")?;

        if !resp.status().is_success() {
            anyhow::bail!("dita-worker rejected message: {}", resp.status());
        }

        Ok(())
    }
}

/// Start the dita-worker process, detached from this terminal
fn start_worker() -> Result<()> {
    Command::new("dita-worker")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Failed to start dita-worker. Is it installed?")?;
    Ok(())
}
