//! The background worker: shell cache, cache-first fetch and the daily
//! notification schedule.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::NaiveTime;
use dita_core::cache::{Cache, CacheStorage};
use dita_core::config::DitaConfig;
use dita_core::constants::{DATASET_CACHE_KEY, PERIODIC_WAKE_INTERVAL_SECS, PERIODIC_WAKE_TAG};
use dita_core::dataset::Dataset;
use dita_core::error::{DitaError, DitaResult};
use dita_core::protocol::{WorkerMessage, WorkerState, WorkerStatus};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::notification::{DailyNotifier, DesktopNotifier, Notifier};
use crate::origin::Origin;
use crate::periodic::PeriodicWake;
use crate::permissions::{ConfigPermissions, Permissions};
use crate::scheduler::{DailyJob, DailyScheduler};

const INSTALL_RETRY_INITIAL_SECS: u64 = 5;
const INSTALL_RETRY_MAX_SECS: u64 = 600;

/// Everything a [`Worker`] is built from.
pub struct WorkerParts {
    pub storage: Arc<CacheStorage>,
    pub cache_name: String,
    pub assets: Vec<String>,
    pub origin: Origin,
    pub dataset: Dataset,
    pub notify_at: NaiveTime,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn Notifier>,
    pub permissions: Arc<dyn Permissions>,
}

pub struct Worker {
    storage: Arc<CacheStorage>,
    cache_name: String,
    assets: Vec<String>,
    origin: Origin,
    dataset: Dataset,
    permissions: Arc<dyn Permissions>,
    job: DailyJob,
    scheduler: DailyScheduler,
    periodic: PeriodicWake,
    installed: AtomicBool,
}

impl Worker {
    pub fn new(parts: WorkerParts) -> Self {
        let daily = Arc::new(DailyNotifier::new(
            Arc::clone(&parts.storage),
            parts.cache_name.clone(),
            Arc::clone(&parts.clock),
            parts.notifier,
            Arc::clone(&parts.permissions),
        ));
        let job: DailyJob = Arc::new(move || {
            daily.fire();
        });

        let installed = parts.storage.has(&parts.cache_name);

        Worker {
            scheduler: DailyScheduler::new(parts.clock, parts.notify_at, Arc::clone(&job)),
            storage: parts.storage,
            cache_name: parts.cache_name,
            assets: parts.assets,
            origin: parts.origin,
            dataset: parts.dataset,
            permissions: parts.permissions,
            job,
            periodic: PeriodicWake::new(),
            installed: AtomicBool::new(installed),
        }
    }

    /// Worker over `storage`, wired to the real clock, desktop notifications
    /// and the permissions in the config file.
    pub fn from_config(config: &DitaConfig, storage: CacheStorage) -> DitaResult<Self> {
        let storage = Arc::new(storage);
        let cache_name = config.worker.cache_name.clone();

        Ok(Worker::new(WorkerParts {
            notifier: Arc::new(DesktopNotifier::new(Arc::clone(&storage), cache_name.clone())),
            storage,
            cache_name,
            assets: config.worker.assets.clone(),
            origin: Origin::from_config(config)?,
            dataset: config.dataset()?,
            notify_at: config.notifications.time()?,
            clock: Arc::new(SystemClock),
            permissions: Arc::new(ConfigPermissions),
        }))
    }

    /// Fetch every shell asset and commit them, with the dataset snapshot,
    /// as one cache. Nothing is committed if any asset fails.
    pub async fn install(&self) -> DitaResult<Cache> {
        let mut entries = Vec::with_capacity(self.assets.len() + 1);

        for asset in &self.assets {
            let body = self
                .origin
                .fetch(asset)
                .await
                .map_err(|e| DitaError::Install {
                    asset: asset.clone(),
                    reason: e.to_string(),
                })?
                .ok_or_else(|| DitaError::Install {
                    asset: asset.clone(),
                    reason: "not found at origin".to_string(),
                })?;
            entries.push((asset.clone(), body));
        }
        entries.push((DATASET_CACHE_KEY.to_string(), self.dataset.to_json()?));

        let cache = self.storage.put_all(&self.cache_name, &entries)?;
        for abandoned in self.storage.prune_except(&self.cache_name)? {
            info!(cache = %abandoned, "removed old cache");
        }

        self.installed.store(true, Ordering::SeqCst);
        info!(cache = %self.cache_name, entries = entries.len(), "shell cache installed");
        Ok(cache)
    }

    /// Retry [`Worker::install`] with exponential backoff until it succeeds.
    pub async fn install_until_done(&self) {
        let mut delay = INSTALL_RETRY_INITIAL_SECS;
        loop {
            match self.install().await {
                Ok(_) => return,
                Err(e) => {
                    warn!("Install failed, retrying in {delay}s: {e}");
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                    delay = (delay * 2).min(INSTALL_RETRY_MAX_SECS);
                }
            }
        }
    }

    /// Serve `key` from the cache, falling back to the origin. Origin
    /// responses are not cached.
    pub async fn handle_fetch(&self, key: &str) -> DitaResult<Option<Vec<u8>>> {
        match self.storage.open(&self.cache_name).and_then(|cache| cache.get(key)) {
            Ok(Some(body)) => {
                debug!(key, "served from cache");
                return Ok(Some(body));
            }
            Ok(None) => {}
            Err(e) => debug!(key, "cache miss: {e}"),
        }
        self.origin.fetch(key).await
    }

    pub fn handle_message(&self, message: WorkerMessage) {
        match message {
            WorkerMessage::ScheduleNotification => {
                self.handle_schedule_message();
            }
            WorkerMessage::CancelNotifications => self.handle_cancel_message(),
        }
    }

    /// Arm the daily timer and, if allowed, the periodic wake. Both are
    /// idempotent. Returns whether the daily timer is armed afterwards.
    pub fn handle_schedule_message(&self) -> bool {
        if !self.permissions.notifications().is_granted() {
            info!("notification permission not granted, not scheduling");
            return false;
        }

        if self.scheduler.arm() {
            info!("daily notification scheduled");
        }

        if self.permissions.periodic_wake().is_granted() {
            self.periodic.register(
                PERIODIC_WAKE_TAG,
                Duration::from_secs(PERIODIC_WAKE_INTERVAL_SECS),
                Arc::clone(&self.job),
            );
        } else if self.periodic.unregister(PERIODIC_WAKE_TAG) {
            info!("periodic wake permission revoked, wake removed");
        }

        self.scheduler.is_armed()
    }

    /// Disarm the daily timer and drop the periodic wake.
    pub fn handle_cancel_message(&self) {
        if self.scheduler.disarm() {
            info!("daily notification cancelled");
        }
        if self.periodic.unregister(PERIODIC_WAKE_TAG) {
            info!("periodic wake removed");
        }
    }

    pub fn status(&self) -> WorkerStatus {
        let installed = self.installed.load(Ordering::SeqCst);
        WorkerStatus {
            state: if installed {
                self.scheduler.state()
            } else {
                WorkerState::Installing
            },
            next_fire: self.scheduler.next_fire(),
            cache: installed.then(|| self.cache_name.clone()),
            periodic_wake: self.periodic.is_registered(PERIODIC_WAKE_TAG),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::path::Path;

    use chrono::NaiveDateTime;
    use dita_core::config::Permission;

    use super::*;
    use crate::clock::testing::TokioClock;
    use crate::notification::testing::RecordingNotifier;
    use crate::permissions::testing::FixedPermissions;

    pub struct Harness {
        pub worker: Worker,
        pub surface: Arc<RecordingNotifier>,
        pub permissions: Arc<FixedPermissions>,
        pub storage: Arc<CacheStorage>,
    }

    /// A worker whose origin is `public` and whose cache lives in `cache`.
    pub fn harness(public: &Path, cache: &Path, now: NaiveDateTime) -> Harness {
        let storage = Arc::new(CacheStorage::new(cache));
        let surface = Arc::new(RecordingNotifier::default());
        let permissions = Arc::new(FixedPermissions::new(Permission::Granted, Permission::Denied));

        let worker = Worker::new(WorkerParts {
            storage: Arc::clone(&storage),
            cache_name: "dita-v1".to_string(),
            assets: vec!["/".to_string(), "/manifest.json".to_string()],
            origin: Origin::Dir(public.to_path_buf()),
            dataset: Dataset::builtin().unwrap(),
            notify_at: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            clock: Arc::new(TokioClock::starting_at(now)),
            notifier: surface.clone(),
            permissions: permissions.clone(),
        });

        Harness {
            worker,
            surface,
            permissions,
            storage,
        }
    }

    pub fn write_shell(public: &Path) {
        std::fs::write(public.join("index.html"), "<html>dita</html>").unwrap();
        std::fs::write(public.join("manifest.json"), "{}").unwrap();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use dita_core::config::Permission;

    use super::testing::{harness, write_shell};
    use super::*;

    fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_install_caches_shell_and_snapshot() {
        let public = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write_shell(public.path());
        let h = harness(public.path(), cache.path(), at(2, 17, 8));

        assert_eq!(h.worker.status().state, WorkerState::Installing);

        let installed = h.worker.install().await.unwrap();
        assert_eq!(
            installed.keys().unwrap(),
            vec!["/", "/manifest.json", DATASET_CACHE_KEY]
        );
        assert_eq!(h.worker.status().state, WorkerState::Idle);
        assert_eq!(h.worker.status().cache.as_deref(), Some("dita-v1"));
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let public = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        std::fs::write(public.path().join("index.html"), "<html>").unwrap();
        let h = harness(public.path(), cache.path(), at(2, 17, 8));

        let err = h.worker.install().await.unwrap_err();
        assert!(matches!(err, DitaError::Install { ref asset, .. } if asset == "/manifest.json"));
        assert!(!h.storage.has("dita-v1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_install_retries_until_assets_arrive() {
        let public = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        std::fs::write(public.path().join("index.html"), "<html>dita</html>").unwrap();
        let h = harness(public.path(), cache.path(), at(2, 17, 8));
        let worker = Arc::new(h.worker);

        let installer = Arc::clone(&worker);
        let install = tokio::spawn(async move { installer.install_until_done().await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(worker.status().state, WorkerState::Installing);
        assert!(!h.storage.has("dita-v1"));

        std::fs::write(public.path().join("manifest.json"), "{}").unwrap();
        tokio::time::timeout(Duration::from_secs(60), install)
            .await
            .expect("Install should finish after the asset appears")
            .unwrap();

        assert_eq!(worker.status().state, WorkerState::Idle);
        assert!(h.storage.has("dita-v1"));
    }

    #[tokio::test]
    async fn test_install_abandons_old_cache_versions() {
        let public = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write_shell(public.path());
        let h = harness(public.path(), cache.path(), at(2, 17, 8));
        h.storage.put_all("dita-v0", &[("/", "stale")]).unwrap();

        h.worker.install().await.unwrap();
        assert!(!h.storage.has("dita-v0"));
    }

    #[tokio::test]
    async fn test_fetch_is_cache_first_without_runtime_caching() {
        let public = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write_shell(public.path());
        let h = harness(public.path(), cache.path(), at(2, 17, 8));
        h.worker.install().await.unwrap();

        // Origin changes after install: the cached shell still wins.
        std::fs::write(public.path().join("index.html"), "<html>new</html>").unwrap();
        std::fs::write(public.path().join("app.js"), "console.log(1)").unwrap();

        let root = h.worker.handle_fetch("/").await.unwrap().unwrap();
        assert_eq!(root, b"<html>dita</html>");

        let script = h.worker.handle_fetch("/app.js").await.unwrap().unwrap();
        assert_eq!(script, b"console.log(1)");
        assert!(!h.storage.open("dita-v1").unwrap().contains("/app.js"));

        assert_eq!(h.worker.handle_fetch("/missing.css").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_requires_permission() {
        let public = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let h = harness(public.path(), cache.path(), at(2, 17, 8));
        *h.permissions.notifications.lock().unwrap() = Permission::Denied;

        assert!(!h.worker.handle_schedule_message());
        assert_eq!(h.worker.status().next_fire, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_message_twice_arms_one_timer() {
        let public = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write_shell(public.path());
        let h = harness(public.path(), cache.path(), at(2, 17, 8));
        h.worker.install().await.unwrap();

        h.worker.handle_message(WorkerMessage::ScheduleNotification);
        h.worker.handle_message(WorkerMessage::ScheduleNotification);
        tokio::task::yield_now().await;
        assert_eq!(h.worker.status().state, WorkerState::TimerArmed);
        assert_eq!(h.worker.status().next_fire, Some(at(2, 17, 12)));

        tokio::time::sleep(Duration::from_secs(5 * 3600)).await;
        let shown = h.surface.visible();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].body, "Independence Day (Kosovo)");
        assert!(!h.worker.status().periodic_wake);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_message_disarms_everything() {
        let public = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write_shell(public.path());
        let h = harness(public.path(), cache.path(), at(2, 17, 8));
        *h.permissions.periodic_wake.lock().unwrap() = Permission::Granted;
        h.worker.install().await.unwrap();

        h.worker.handle_message(WorkerMessage::ScheduleNotification);
        tokio::task::yield_now().await;
        assert_eq!(h.worker.status().state, WorkerState::TimerArmed);

        *h.permissions.notifications.lock().unwrap() = Permission::Denied;
        h.worker.handle_message(WorkerMessage::CancelNotifications);

        let status = h.worker.status();
        assert_eq!(status.state, WorkerState::Idle);
        assert_eq!(status.next_fire, None);
        assert!(!status.periodic_wake);

        tokio::time::sleep(Duration::from_secs(48 * 3600)).await;
        assert!(h.surface.visible().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_wake_registered_when_granted() {
        let public = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let h = harness(public.path(), cache.path(), at(2, 17, 8));
        *h.permissions.periodic_wake.lock().unwrap() = Permission::Granted;

        assert!(h.worker.handle_schedule_message());
        assert!(h.worker.status().periodic_wake);
    }
}
