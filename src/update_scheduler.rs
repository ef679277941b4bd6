use std::{sync::Arc, time::Duration};

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    update_coordinator::{CheckTrigger, UpdateCoordinator},
    UPDATE_CHECK_INTERVAL, UPDATE_INITIAL_DELAY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CheckSchedule {
    pub(crate) initial_delay: Duration,
    pub(crate) interval: Duration,
}

impl Default for CheckSchedule {
    fn default() -> Self {
        Self {
            initial_delay: UPDATE_INITIAL_DELAY,
            interval: UPDATE_CHECK_INTERVAL,
        }
    }
}

/// Owns the periodic update-check task; cancelled once when the app quits.
#[derive(Debug, Default)]
pub(crate) struct CheckScheduler {
    token: CancellationToken,
}

impl CheckScheduler {
    pub(crate) fn start(&self, coordinator: Arc<UpdateCoordinator>, schedule: CheckSchedule) {
        let token = self.token.child_token();
        tauri::async_runtime::spawn(run_check_loop(schedule, token, move || {
            coordinator.check_now(CheckTrigger::Scheduled);
        }));
        tracing::info!(
            initial_delay_ms = schedule.initial_delay.as_millis() as u64,
            interval_secs = schedule.interval.as_secs(),
            "update check schedule started"
        );
    }

    pub(crate) fn cancel(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("cancelling scheduled update checks");
            self.token.cancel();
        }
    }
}

/// Fires `tick` at `initial_delay`, then every `interval`, until cancelled.
///
/// `tick` must not block; a slow check never delays the next tick.
pub(crate) async fn run_check_loop<F>(schedule: CheckSchedule, token: CancellationToken, tick: F)
where
    F: Fn() + Send + 'static,
{
    let mut ticker = time::interval_at(Instant::now() + schedule.initial_delay, schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("update check loop cancelled");
                break;
            }
            _ = ticker.tick() => tick(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn recording_tick(start: Instant) -> (Arc<Mutex<Vec<Duration>>>, impl Fn() + Send + 'static) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = fired.clone();
        (fired, move || {
            sink.lock()
                .expect("fired lock")
                .push(Instant::now().duration_since(start));
        })
    }

    #[tokio::test(start_paused = true)]
    async fn check_loop_fires_after_initial_delay_then_every_interval() {
        let start = Instant::now();
        let (fired, tick) = recording_tick(start);
        let token = CancellationToken::new();
        let task = tokio::spawn(run_check_loop(CheckSchedule::default(), token.clone(), tick));

        time::sleep(Duration::from_secs(3 + 2 * 3600 + 1)).await;
        token.cancel();
        task.await.expect("check loop");

        assert_eq!(
            *fired.lock().expect("fired lock"),
            vec![
                Duration::from_secs(3),
                Duration::from_secs(3 + 3600),
                Duration::from_secs(3 + 7200),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn check_loop_does_not_fire_before_initial_delay() {
        let start = Instant::now();
        let (fired, tick) = recording_tick(start);
        let token = CancellationToken::new();
        let task = tokio::spawn(run_check_loop(CheckSchedule::default(), token.clone(), tick));

        time::sleep(Duration::from_millis(2_999)).await;
        token.cancel();
        task.await.expect("check loop");

        assert!(fired.lock().expect("fired lock").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_check_loop_stops_firing() {
        let start = Instant::now();
        let (fired, tick) = recording_tick(start);
        let token = CancellationToken::new();
        let schedule = CheckSchedule {
            initial_delay: Duration::from_secs(1),
            interval: Duration::from_secs(10),
        };
        let task = tokio::spawn(run_check_loop(schedule, token.clone(), tick));

        time::sleep(Duration::from_secs(2)).await;
        token.cancel();
        task.await.expect("check loop");
        time::sleep(Duration::from_secs(60)).await;

        assert_eq!(
            *fired.lock().expect("fired lock"),
            vec![Duration::from_secs(1)]
        );
    }

    #[test]
    fn scheduler_cancel_is_idempotent() {
        let scheduler = CheckScheduler::default();
        scheduler.cancel();
        scheduler.cancel();
        assert!(scheduler.token.is_cancelled());
    }
}
