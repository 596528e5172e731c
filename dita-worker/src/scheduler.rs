//! Daily notification timer.
//!
//! One-shot timers that re-arm themselves after each fire instead of a fixed
//! period: every wake recomputes the next target from the wall clock, so a
//! delayed or dropped wake never accumulates drift. At most one timer task
//! exists per scheduler; arming an armed scheduler is a no-op.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Days, Duration, NaiveDateTime, NaiveTime};
use dita_core::protocol::WorkerState;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::Clock;

/// Work run at each daily target.
pub type DailyJob = Arc<dyn Fn() + Send + Sync>;

/// Next occurrence of `target` at or after `now`. A target already passed
/// today rolls to tomorrow.
pub fn next_fire_at(now: NaiveDateTime, target: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(target);
    if now > today {
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    } else {
        today
    }
}

pub fn delay_until(now: NaiveDateTime, at: NaiveDateTime) -> std::time::Duration {
    (at - now).to_std().unwrap_or_default()
}

struct Shared {
    clock: Arc<dyn Clock>,
    target: NaiveTime,
    job: DailyJob,
    timer: Mutex<TimerState>,
}

impl Shared {
    fn timer(&self) -> MutexGuard<'_, TimerState> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
struct TimerState {
    handle: Option<JoinHandle<()>>,
    next_fire: Option<NaiveDateTime>,
    last_fired: Option<NaiveDateTime>,
    firing: bool,
}

impl TimerState {
    fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

pub struct DailyScheduler {
    shared: Arc<Shared>,
}

impl DailyScheduler {
    pub fn new(clock: Arc<dyn Clock>, target: NaiveTime, job: DailyJob) -> Self {
        DailyScheduler {
            shared: Arc::new(Shared {
                clock,
                target,
                job,
                timer: Mutex::new(TimerState::default()),
            }),
        }
    }

    /// Start the timer task. Returns false if it was already armed.
    pub fn arm(&self) -> bool {
        let mut timer = self.shared.timer();
        if timer.is_armed() {
            debug!("daily timer already armed");
            return false;
        }

        let shared = Arc::clone(&self.shared);
        timer.handle = Some(tokio::spawn(run(shared)));
        true
    }

    /// Cancel the timer task. Returns false if nothing was armed.
    pub fn disarm(&self) -> bool {
        let mut timer = self.shared.timer();
        timer.next_fire = None;
        match timer.handle.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.shared.timer().is_armed()
    }

    pub fn next_fire(&self) -> Option<NaiveDateTime> {
        let timer = self.shared.timer();
        if timer.is_armed() { timer.next_fire } else { None }
    }

    pub fn state(&self) -> WorkerState {
        let timer = self.shared.timer();
        match (timer.is_armed(), timer.firing) {
            (false, _) => WorkerState::Idle,
            (true, true) => WorkerState::Firing,
            (true, false) => WorkerState::TimerArmed,
        }
    }
}

impl Drop for DailyScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}

async fn run(shared: Arc<Shared>) {
    loop {
        let now = shared.clock.now();
        let next = {
            let mut timer = shared.timer();
            let mut next = next_fire_at(now, shared.target);
            // A target is fired at most once, even if the clock moved back.
            if let Some(last) = timer.last_fired {
                if next <= last {
                    next = next_fire_at(last + Duration::seconds(1), shared.target);
                }
            }
            timer.next_fire = Some(next);
            next
        };

        info!(next_fire = %next, "daily notification timer armed");
        tokio::time::sleep(delay_until(now, next)).await;

        let now = shared.clock.now();
        if now < next {
            debug!(now = %now, next_fire = %next, "woke before target, re-arming");
            continue;
        }

        shared.timer().firing = true;
        debug!(target_time = %next, now = %now, "daily timer firing");
        run_job(&shared.job).await;

        let mut timer = shared.timer();
        timer.firing = false;
        timer.last_fired = Some(next);
    }
}

/// Run `job` on the blocking pool; notification and config I/O are
/// synchronous.
pub async fn run_job(job: &DailyJob) {
    let job = Arc::clone(job);
    if let Err(e) = tokio::task::spawn_blocking(move || job()).await {
        warn!("Daily job did not complete: {e}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::NaiveDate;

    use super::*;
    use crate::clock::testing::{FixedClock, TokioClock};

    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    fn counting_scheduler(clock: Arc<TokioClock>) -> (DailyScheduler, Arc<AtomicUsize>) {
        let fires = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fires);
        let job: DailyJob = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (DailyScheduler::new(clock, noon(), job), fires)
    }

    async fn sleep_hours(hours: u64) {
        tokio::time::sleep(std::time::Duration::from_secs(hours * 3600)).await;
    }

    #[test]
    fn test_delay_after_target_rolls_to_tomorrow() {
        let now = at(17, 13, 0);
        let next = next_fire_at(now, noon());
        assert_eq!(next, at(18, 12, 0));
        assert_eq!(delay_until(now, next), std::time::Duration::from_secs(23 * 3600));
    }

    #[test]
    fn test_delay_before_target_is_today() {
        let now = at(17, 8, 0);
        let next = next_fire_at(now, noon());
        assert_eq!(next, at(17, 12, 0));
        assert_eq!(delay_until(now, next), std::time::Duration::from_secs(4 * 3600));
    }

    #[test]
    fn test_exactly_at_target_fires_now() {
        let now = at(17, 12, 0);
        assert_eq!(next_fire_at(now, noon()), now);
        assert_eq!(delay_until(now, now), std::time::Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_at_noon_and_rearms_for_next_day() {
        let clock = Arc::new(TokioClock::starting_at(at(17, 8, 0)));
        let (scheduler, fires) = counting_scheduler(clock);

        assert!(scheduler.arm());
        tokio::task::yield_now().await;
        assert_eq!(scheduler.next_fire(), Some(at(17, 12, 0)));
        assert_eq!(scheduler.state(), WorkerState::TimerArmed);

        sleep_hours(3).await;
        assert_eq!(fires.load(Ordering::SeqCst), 0);

        sleep_hours(2).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.next_fire(), Some(at(18, 12, 0)));

        sleep_hours(48).await;
        assert_eq!(fires.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arming_twice_keeps_one_timer() {
        let clock = Arc::new(TokioClock::starting_at(at(17, 13, 0)));
        let (scheduler, fires) = counting_scheduler(clock);

        assert!(scheduler.arm());
        assert!(!scheduler.arm());

        sleep_hours(24).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_wake_fires_once_and_recomputes_from_clock() {
        let clock = Arc::new(TokioClock::starting_at(at(17, 8, 0)));
        let (scheduler, fires) = counting_scheduler(Arc::clone(&clock));

        scheduler.arm();
        tokio::task::yield_now().await;

        // Host suspends the process for 30 wall-clock hours.
        clock.jump(Duration::hours(30));
        sleep_hours(5).await;

        // Woke on the 18th at 18:00: one late fire, next target from the clock.
        assert_eq!(fires.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.next_fire(), Some(at(19, 12, 0)));
    }

    #[tokio::test]
    async fn test_slow_job_does_not_block_runtime() {
        let clock = Arc::new(FixedClock(at(17, 12, 0)));
        let fires = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fires);
        let job: DailyJob = Arc::new(move || {
            std::thread::sleep(std::time::Duration::from_millis(500));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let scheduler = DailyScheduler::new(clock, noon(), job);

        scheduler.arm();
        tokio::task::yield_now().await;

        let started = std::time::Instant::now();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(started.elapsed() < std::time::Duration::from_millis(300));
        assert_eq!(fires.load(Ordering::SeqCst), 0);

        tokio::time::sleep(std::time::Duration::from_millis(800)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.next_fire(), Some(at(18, 12, 0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_cancels_timer() {
        let clock = Arc::new(TokioClock::starting_at(at(17, 8, 0)));
        let (scheduler, fires) = counting_scheduler(clock);

        scheduler.arm();
        assert!(scheduler.disarm());
        assert_eq!(scheduler.state(), WorkerState::Idle);

        sleep_hours(24).await;
        assert_eq!(fires.load(Ordering::SeqCst), 0);

        assert!(scheduler.arm());
    }
}
