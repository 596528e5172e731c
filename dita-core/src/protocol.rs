//! JSON messages exchanged between the dita CLI and dita-worker.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Foreground to background message. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// Arm the daily notification timer. Idempotent on the worker side.
    ScheduleNotification,
    /// Disarm the timer and drop the periodic wake after permission is
    /// revoked.
    CancelNotifications,
}

/// Lifecycle of the background worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Installing,
    Idle,
    TimerArmed,
    Firing,
}

/// Response of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub state: WorkerState,
    /// Local time the armed timer fires next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_fire: Option<NaiveDateTime>,
    /// Name of the installed shell cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
    pub periodic_wake: bool,
}
