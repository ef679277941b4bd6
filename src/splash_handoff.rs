use std::time::Duration;

use tauri::{AppHandle, Manager};

use crate::{
    shell_error::ShellError,
    window_lifecycle::{WindowLifecycle, WindowLifecycleState},
    MAIN_WINDOW_LABEL, SPLASH_FADE_DURATION, SPLASH_FADE_GRACE, SPLASH_SETTLE_DELAY,
    SPLASH_WINDOW_LABEL,
};

/// Window operations the splash-to-main handoff drives.
pub(crate) trait HandoffWindows: Send + Sync {
    fn start_splash_fade(&self, duration: Duration) -> Result<(), ShellError>;
    fn close_splash(&self) -> Result<(), ShellError>;
    fn show_main(&self) -> Result<(), ShellError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HandoffTiming {
    pub(crate) settle_delay: Duration,
    pub(crate) fade_duration: Duration,
    pub(crate) max_fade_wait: Duration,
}

impl Default for HandoffTiming {
    fn default() -> Self {
        Self {
            settle_delay: SPLASH_SETTLE_DELAY,
            fade_duration: SPLASH_FADE_DURATION,
            max_fade_wait: SPLASH_FADE_DURATION + SPLASH_FADE_GRACE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HandoffOutcome {
    /// The splash reported the end of its fade transition.
    Faded,
    /// No fade-complete signal arrived in time; the splash was closed anyway.
    FallbackClosed,
    /// The window pair went away or was replaced before the handoff finished.
    Superseded,
}

/// Settle, fade the splash, then close it and reveal the main window.
///
/// The main window is only shown after the splash has been closed.
pub(crate) async fn run_handoff<W>(
    windows: &W,
    state: &WindowLifecycleState,
    generation: u64,
    timing: HandoffTiming,
) -> HandoffOutcome
where
    W: HandoffWindows + ?Sized,
{
    tokio::time::sleep(timing.settle_delay).await;
    if !state.with(|lifecycle| lifecycle.settle_elapsed(generation)) {
        return HandoffOutcome::Superseded;
    }

    let fade_complete = state.arm_fade_signal();
    let faded = match windows.start_splash_fade(timing.fade_duration) {
        Ok(()) => matches!(
            tokio::time::timeout(timing.max_fade_wait, fade_complete).await,
            Ok(Ok(()))
        ),
        Err(error) => {
            tracing::warn!("splash fade could not start: {error}");
            false
        }
    };

    if !state.with(|lifecycle| lifecycle.fade_finished(generation)) {
        return HandoffOutcome::Superseded;
    }

    if let Err(error) = windows.close_splash() {
        tracing::warn!("failed to close splash window: {error}");
    }
    if let Err(error) = windows.show_main() {
        tracing::error!("failed to reveal main window: {error}");
    }

    if faded {
        HandoffOutcome::Faded
    } else {
        tracing::warn!(
            waited_ms = timing.max_fade_wait.as_millis() as u64,
            "splash fade did not report completion; closed splash window"
        );
        HandoffOutcome::FallbackClosed
    }
}

pub(crate) fn fade_script(duration: Duration) -> String {
    let duration_ms = duration.as_millis();
    format!(
        r#"(() => {{
  const body = document.body;
  if (!body) {{
    window.__TAURI_INTERNALS__.invoke('splash_transition_complete');
    return;
  }}
  body.addEventListener('transitionend', () => {{
    window.__TAURI_INTERNALS__.invoke('splash_transition_complete');
  }}, {{ once: true }});
  body.style.transition = 'opacity {duration_ms}ms ease-in-out';
  requestAnimationFrame(() => {{ body.style.opacity = '0'; }});
}})();"#
    )
}

struct TauriHandoffWindows {
    app_handle: AppHandle,
}

impl HandoffWindows for TauriHandoffWindows {
    fn start_splash_fade(&self, duration: Duration) -> Result<(), ShellError> {
        let splash = self
            .app_handle
            .get_webview_window(SPLASH_WINDOW_LABEL)
            .ok_or(ShellError::WindowMissing {
                label: SPLASH_WINDOW_LABEL,
            })?;
        splash
            .eval(&fade_script(duration))
            .map_err(|error| ShellError::WindowAction {
                label: SPLASH_WINDOW_LABEL,
                action: "fade",
                reason: error.to_string(),
            })
    }

    fn close_splash(&self) -> Result<(), ShellError> {
        let Some(splash) = self.app_handle.get_webview_window(SPLASH_WINDOW_LABEL) else {
            return Ok(());
        };
        splash.destroy().map_err(|error| ShellError::WindowAction {
            label: SPLASH_WINDOW_LABEL,
            action: "close",
            reason: error.to_string(),
        })
    }

    fn show_main(&self) -> Result<(), ShellError> {
        let main = self
            .app_handle
            .get_webview_window(MAIN_WINDOW_LABEL)
            .ok_or(ShellError::WindowMissing {
                label: MAIN_WINDOW_LABEL,
            })?;
        main.show().map_err(|error| ShellError::WindowAction {
            label: MAIN_WINDOW_LABEL,
            action: "show",
            reason: error.to_string(),
        })?;
        if let Err(error) = main.set_focus() {
            tracing::debug!("failed to focus main window after handoff: {error}");
        }
        Ok(())
    }
}

/// Starts the handoff the first time the main window finishes loading.
pub(crate) fn on_main_first_load(app_handle: &AppHandle) {
    let state = app_handle.state::<WindowLifecycleState>();
    let Some(generation) = state.with(WindowLifecycle::main_first_load) else {
        return;
    };

    tracing::info!(generation, "main window loaded; starting splash handoff");
    let app_handle = app_handle.clone();
    tauri::async_runtime::spawn(async move {
        let windows = TauriHandoffWindows {
            app_handle: app_handle.clone(),
        };
        let state = app_handle.state::<WindowLifecycleState>();
        let outcome =
            run_handoff(&windows, state.inner(), generation, HandoffTiming::default()).await;
        tracing::info!(?outcome, generation, "splash handoff finished");
    });
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::time::Instant;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Fade,
        CloseSplash,
        ShowMain,
    }

    struct FakeWindows {
        state: Arc<WindowLifecycleState>,
        started: Instant,
        calls: Mutex<Vec<(Call, Duration)>>,
        report_fade_end: bool,
    }

    impl FakeWindows {
        fn new(state: Arc<WindowLifecycleState>, report_fade_end: bool) -> Self {
            Self {
                state,
                started: Instant::now(),
                calls: Mutex::new(Vec::new()),
                report_fade_end,
            }
        }

        fn record(&self, call: Call) {
            self.calls
                .lock()
                .expect("calls lock")
                .push((call, Instant::now().duration_since(self.started)));
        }

        fn calls(&self) -> Vec<(Call, Duration)> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl HandoffWindows for FakeWindows {
        fn start_splash_fade(&self, duration: Duration) -> Result<(), ShellError> {
            self.record(Call::Fade);
            if self.report_fade_end {
                let state = self.state.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(duration).await;
                    state.signal_fade_complete();
                });
            }
            Ok(())
        }

        fn close_splash(&self) -> Result<(), ShellError> {
            self.record(Call::CloseSplash);
            Ok(())
        }

        fn show_main(&self) -> Result<(), ShellError> {
            self.record(Call::ShowMain);
            Ok(())
        }
    }

    fn loaded_state() -> (Arc<WindowLifecycleState>, u64) {
        let state = Arc::new(WindowLifecycleState::default());
        state.with(|lifecycle| lifecycle.begin_create()).expect("pair");
        let generation = state
            .with(WindowLifecycle::main_first_load)
            .expect("first load");
        (state, generation)
    }

    #[tokio::test(start_paused = true)]
    async fn handoff_fades_then_closes_splash_before_showing_main() {
        let (state, generation) = loaded_state();
        let windows = Arc::new(FakeWindows::new(state.clone(), true));

        let outcome = run_handoff(
            windows.as_ref(),
            &state,
            generation,
            HandoffTiming::default(),
        )
        .await;

        assert_eq!(outcome, HandoffOutcome::Faded);
        assert_eq!(
            windows.calls(),
            vec![
                (Call::Fade, Duration::from_millis(500)),
                (Call::CloseSplash, Duration::from_millis(1_500)),
                (Call::ShowMain, Duration::from_millis(1_500)),
            ]
        );
        state.with(|lifecycle| {
            assert!(!lifecycle.splash_open());
            assert!(lifecycle.main_visible());
        });
    }

    #[tokio::test(start_paused = true)]
    async fn fade_signal_before_the_fade_starts_is_ignored() {
        let (state, generation) = loaded_state();
        let windows = Arc::new(FakeWindows::new(state.clone(), false));
        assert!(!state.signal_fade_complete());

        let task = {
            let state = state.clone();
            let windows = windows.clone();
            tokio::spawn(async move {
                run_handoff(
                    windows.as_ref(),
                    &state,
                    generation,
                    HandoffTiming::default(),
                )
                .await
            })
        };

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(windows.calls(), vec![(Call::Fade, Duration::from_millis(500))]);
        state.with(|lifecycle| assert!(!lifecycle.main_visible()));

        assert_eq!(task.await.expect("handoff"), HandoffOutcome::FallbackClosed);
        assert_eq!(
            windows.calls(),
            vec![
                (Call::Fade, Duration::from_millis(500)),
                (Call::CloseSplash, Duration::from_millis(6_500)),
                (Call::ShowMain, Duration::from_millis(6_500)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn handoff_for_a_destroyed_pair_touches_no_windows() {
        let (state, generation) = loaded_state();
        let windows = Arc::new(FakeWindows::new(state.clone(), true));
        state.with(|lifecycle| {
            lifecycle.window_destroyed(MAIN_WINDOW_LABEL);
            lifecycle.window_destroyed(SPLASH_WINDOW_LABEL);
        });

        let outcome = run_handoff(
            windows.as_ref(),
            &state,
            generation,
            HandoffTiming::default(),
        )
        .await;

        assert_eq!(outcome, HandoffOutcome::Superseded);
        assert!(windows.calls().is_empty());
    }

    #[test]
    fn fade_script_uses_requested_duration_and_reports_completion() {
        let script = fade_script(Duration::from_secs(1));
        assert!(script.contains("opacity 1000ms ease-in-out"));
        assert!(script.contains("'transitionend'"));
        assert!(script.contains("invoke('splash_transition_complete')"));
    }
}
