//! Shared constants for the dita workspace.

/// Current shell cache name. Bumping the version abandons the old store.
pub const CACHE_NAME: &str = "dita-v1";

/// Cache key holding the dataset snapshot read by the daily notification.
pub const DATASET_CACHE_KEY: &str = "historical-events-cache";

/// Shell assets cached at install time.
pub const SHELL_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    "/icon-192.png",
    "/icon-512.png",
];

/// Loopback port the worker listens on.
pub const DEFAULT_WORKER_PORT: u16 = 4097;

/// Local wall-clock time of the daily notification.
pub const DEFAULT_NOTIFY_HOUR: u32 = 12;
pub const DEFAULT_NOTIFY_MINUTE: u32 = 0;

pub const NOTIFICATION_TITLE: &str = "Today in History";
pub const NOTIFICATION_ICON: &str = "/icon-192.png";

/// De-duplication tag: a second same-day notification replaces the first.
pub const NOTIFICATION_TAG: &str = "daily-event";

/// Tag of the periodic wake registration.
pub const PERIODIC_WAKE_TAG: &str = "daily-notification";

/// Minimum interval between periodic wakes, in seconds.
pub const PERIODIC_WAKE_INTERVAL_SECS: u64 = 24 * 60 * 60;
