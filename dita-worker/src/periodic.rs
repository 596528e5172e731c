//! Periodic wake registrations.
//!
//! A second path to the daily notification, independent of the self-arming
//! timer: a fixed-interval wake keyed by tag. Registering a live tag again
//! is a no-op.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::scheduler::{DailyJob, run_job};

#[derive(Default)]
pub struct PeriodicWake {
    registrations: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl PeriodicWake {
    pub fn new() -> Self {
        Self::default()
    }

    fn registrations(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `job` every `min_interval`, first one interval from now.
    /// Returns false if `tag` is already registered.
    pub fn register(&self, tag: &str, min_interval: Duration, job: DailyJob) -> bool {
        let mut registrations = self.registrations();
        if registrations
            .get(tag)
            .is_some_and(|handle| !handle.is_finished())
        {
            debug!(tag, "periodic wake already registered");
            return false;
        }

        let task_tag = tag.to_string();
        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + min_interval, min_interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                debug!(tag = %task_tag, "periodic wake");
                run_job(&job).await;
            }
        });

        info!(tag, interval_secs = min_interval.as_secs(), "periodic wake registered");
        registrations.insert(tag.to_string(), handle);
        true
    }

    pub fn unregister(&self, tag: &str) -> bool {
        match self.registrations().remove(tag) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.registrations()
            .get(tag)
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for PeriodicWake {
    fn drop(&mut self) {
        for (_, handle) in self.registrations().drain() {
            handle.abort();
        }
    }
}
