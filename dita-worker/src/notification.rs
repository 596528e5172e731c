//! The daily "today in history" notification.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use dita_core::cache::CacheStorage;
use dita_core::constants::{
    DATASET_CACHE_KEY, NOTIFICATION_ICON, NOTIFICATION_TAG, NOTIFICATION_TITLE,
};
use dita_core::dataset::{Dataset, HistoricalEvent};
use dita_core::error::{DitaError, DitaResult};
use dita_core::event_date::MonthDay;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::permissions::Permissions;

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Notifications with the same tag replace each other.
    pub tag: String,
}

impl DailyNotification {
    pub fn for_event(event: &HistoricalEvent) -> Self {
        DailyNotification {
            title: NOTIFICATION_TITLE.to_string(),
            body: event.text.clone(),
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_ICON.to_string(),
            tag: NOTIFICATION_TAG.to_string(),
        }
    }
}

/// Notification surface.
pub trait Notifier: Send + Sync + 'static {
    fn show(&self, notification: &DailyNotification) -> DitaResult<()>;
}

/// Desktop notifications through the OS notification server.
pub struct DesktopNotifier {
    storage: Arc<CacheStorage>,
    cache_name: String,
}

impl DesktopNotifier {
    pub fn new(storage: Arc<CacheStorage>, cache_name: impl Into<String>) -> Self {
        DesktopNotifier {
            storage,
            cache_name: cache_name.into(),
        }
    }

    /// On-disk path of a cached icon asset.
    fn icon_path(&self, icon: &str) -> Option<PathBuf> {
        self.storage.open(&self.cache_name).ok()?.entry_path(icon)
    }
}

impl Notifier for DesktopNotifier {
    fn show(&self, notification: &DailyNotification) -> DitaResult<()> {
        let mut desktop = notify_rust::Notification::new();
        desktop
            .appname("dita")
            .summary(&notification.title)
            .body(&notification.body);

        if let Some(path) = self.icon_path(&notification.icon) {
            desktop.icon(&path.to_string_lossy());
        }

        #[cfg(all(unix, not(target_os = "macos")))]
        desktop.id(tag_id(&notification.tag));

        desktop
            .show()
            .map_err(|e| DitaError::Notification(e.to_string()))?;
        Ok(())
    }
}

/// Stable notification id for a tag (FNV-1a), so a re-fire replaces the
/// previous notification instead of stacking.
pub fn tag_id(tag: &str) -> u32 {
    tag.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}

/// Today's notification from the cached dataset snapshot, if any event
/// recurs on `today`.
pub fn todays_notification(
    storage: &CacheStorage,
    cache_name: &str,
    today: NaiveDate,
) -> DitaResult<Option<DailyNotification>> {
    let cache = storage.open(cache_name)?;
    let Some(snapshot) = cache.get(DATASET_CACHE_KEY)? else {
        return Ok(None);
    };
    let dataset = Dataset::from_json(&snapshot)?;

    Ok(dataset
        .holiday_on(MonthDay::of(&today))
        .map(DailyNotification::for_event))
}

/// Raises the daily notification. Never fails: the worker runs unattended.
pub struct DailyNotifier {
    storage: Arc<CacheStorage>,
    cache_name: String,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    permissions: Arc<dyn Permissions>,
}

impl DailyNotifier {
    pub fn new(
        storage: Arc<CacheStorage>,
        cache_name: impl Into<String>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        permissions: Arc<dyn Permissions>,
    ) -> Self {
        DailyNotifier {
            storage,
            cache_name: cache_name.into(),
            clock,
            notifier,
            permissions,
        }
    }

    /// Show today's notification. Returns what was shown.
    pub fn fire(&self) -> Option<DailyNotification> {
        if !self.permissions.notifications().is_granted() {
            info!("notification permission not granted, skipping daily notification");
            return None;
        }

        let today = self.clock.now().date();
        let notification = match todays_notification(&self.storage, &self.cache_name, today) {
            Ok(Some(notification)) => notification,
            Ok(None) => {
                debug!(%today, "no event for today");
                return None;
            }
            Err(e) => {
                warn!("Could not read today's event from cache: {e}");
                return None;
            }
        };

        match self.notifier.show(&notification) {
            Ok(()) => {
                info!(body = %notification.body, "daily notification shown");
                Some(notification)
            }
            Err(e) => {
                error!("Could not show daily notification: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records notifications, replacing by tag like a real surface.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub shown: Mutex<Vec<DailyNotification>>,
        pub fail: bool,
    }

    impl RecordingNotifier {
        pub fn visible(&self) -> Vec<DailyNotification> {
            self.shown.lock().unwrap().clone()
        }

        pub fn failing() -> Self {
            RecordingNotifier {
                fail: true,
                ..Default::default()
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn show(&self, notification: &DailyNotification) -> DitaResult<()> {
            if self.fail {
                return Err(DitaError::Notification("no notification server".into()));
            }
            let mut shown = self.shown.lock().unwrap();
            shown.retain(|n| n.tag != notification.tag);
            shown.push(notification.clone());
            Ok(())
        }
    }
}
