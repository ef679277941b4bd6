use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use crate::{
    bridge_router::{BridgeRouter, ForwardOutcome},
    shell_error::UpdaterError,
    update_events::{UpdateEvent, UpdateEventReceiver, UpdatePhase},
    update_reaction::{self, LogLevel, UpdatePrompt},
    UPDATE_SESSION_STALE_AFTER,
};

pub(crate) const CHECK_STARTED_ACK: &str = "Checking for updates...";
pub(crate) const CHECK_IN_PROGRESS_ACK: &str = "Update check already in progress";
pub(crate) const CHECK_FAILED_ACK: &str = "Update check could not be started";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UpdaterOptions {
    pub(crate) auto_download: bool,
    pub(crate) auto_install_on_quit: bool,
}

/// The external service that talks to the update server.
///
/// `check_for_updates` performs only the synchronous part of a check; the rest of
/// the session is reported as [`UpdateEvent`]s on the channel the implementation
/// was built with.
pub(crate) trait UpdaterCapability: Send + Sync {
    fn configure(&self, options: UpdaterOptions) -> Result<(), UpdaterError>;
    fn check_for_updates(&self) -> Result<(), UpdaterError>;
    fn quit_and_install(&self, silent: bool, force_run_after: bool) -> Result<(), UpdaterError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RestartChoice {
    RestartNow,
    Later,
}

/// Modal prompts shown at key update transitions. Every call blocks until the
/// user dismisses the dialog.
pub(crate) trait UpdatePrompts: Send + Sync {
    fn update_available(&self, version: &str);
    fn update_downloaded(&self, version: &str) -> RestartChoice;
    fn update_failed(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CheckTrigger {
    Scheduled,
    Manual,
}

impl CheckTrigger {
    fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CheckOutcome {
    Issued,
    SkippedInFlight,
    Failed(String),
}

impl CheckOutcome {
    pub(crate) fn acknowledgement(&self) -> &'static str {
        match self {
            Self::Issued => CHECK_STARTED_ACK,
            Self::SkippedInFlight => CHECK_IN_PROGRESS_ACK,
            Self::Failed(_) => CHECK_FAILED_ACK,
        }
    }
}

#[derive(Debug, Default)]
struct Session {
    phase: UpdatePhase,
    started_at: Option<Instant>,
}

impl Session {
    /// In flight and younger than `stale_after`.
    fn is_live(&self, now: Instant, stale_after: Duration) -> bool {
        self.phase.is_in_flight()
            && self
                .started_at
                .is_some_and(|started| now.saturating_duration_since(started) < stale_after)
    }
}

pub(crate) struct UpdateCoordinator {
    updater: Arc<dyn UpdaterCapability>,
    prompts: Arc<dyn UpdatePrompts>,
    bridge: Arc<BridgeRouter>,
    session: Mutex<Session>,
    stale_after: Duration,
}

impl UpdateCoordinator {
    pub(crate) fn new(
        updater: Arc<dyn UpdaterCapability>,
        prompts: Arc<dyn UpdatePrompts>,
        bridge: Arc<BridgeRouter>,
    ) -> Self {
        Self {
            updater,
            prompts,
            bridge,
            session: Mutex::new(Session::default()),
            stale_after: UPDATE_SESSION_STALE_AFTER,
        }
    }

    pub(crate) fn phase(&self) -> UpdatePhase {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .phase
    }

    fn set_phase(&self, phase: UpdatePhase) {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .phase = phase;
    }

    /// Issues one check and returns without waiting for it to resolve.
    ///
    /// Immediate failures are logged and swallowed so a scheduler loop calling
    /// this never observes them.
    pub(crate) fn check_now(&self, trigger: CheckTrigger) -> CheckOutcome {
        self.check_now_at(trigger, Instant::now())
    }

    /// A session still in flight after `stale_after` is abandoned and replaced.
    pub(crate) fn check_now_at(&self, trigger: CheckTrigger, now: Instant) -> CheckOutcome {
        {
            let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            if session.is_live(now, self.stale_after) {
                tracing::info!(
                    trigger = trigger.as_str(),
                    phase = session.phase.as_str(),
                    "skipping update check: previous check still in flight"
                );
                return CheckOutcome::SkippedInFlight;
            }
            if session.phase.is_in_flight() {
                tracing::warn!(
                    trigger = trigger.as_str(),
                    phase = session.phase.as_str(),
                    stale_after_secs = self.stale_after.as_secs(),
                    "previous update check never finished; starting a new one"
                );
            }
            *session = Session {
                phase: UpdatePhase::Checking,
                started_at: Some(now),
            };
        }

        tracing::info!(trigger = trigger.as_str(), "issuing update check");
        match self.issue_check() {
            Ok(()) => CheckOutcome::Issued,
            Err(error) => {
                tracing::error!(
                    trigger = trigger.as_str(),
                    "failed to start update check: {error}"
                );
                *self.session.lock().unwrap_or_else(PoisonError::into_inner) =
                    Session::default();
                CheckOutcome::Failed(error.to_string())
            }
        }
    }

    fn issue_check(&self) -> Result<(), UpdaterError> {
        self.updater.configure(UpdaterOptions {
            auto_download: true,
            auto_install_on_quit: true,
        })?;
        self.updater.check_for_updates()
    }

    /// Applies the reaction for one updater event: log, advance the session,
    /// prompt, forward to the window, then act on the user's choice.
    pub(crate) fn handle_event(&self, event: UpdateEvent) {
        let reaction = update_reaction::react(&event);
        match reaction.log_level {
            LogLevel::Info => tracing::info!("{}", reaction.log_message),
            LogLevel::Error => tracing::error!("{}", reaction.log_message),
        }

        let previous = self.phase();
        if !update_reaction::is_expected_transition(previous, &event) {
            tracing::warn!(
                from = previous.as_str(),
                to = reaction.next_phase.as_str(),
                "unexpected update session transition"
            );
        }
        self.set_phase(reaction.next_phase);

        let restart_choice = match &reaction.prompt {
            Some(UpdatePrompt::Available { version }) => {
                self.prompts.update_available(version);
                None
            }
            Some(UpdatePrompt::Downloaded { version }) => {
                let choice = self.prompts.update_downloaded(version);
                tracing::info!(?choice, "update downloaded prompt answered");
                Some(choice)
            }
            Some(UpdatePrompt::Failed) => {
                self.prompts.update_failed();
                None
            }
            None => None,
        };

        match self.bridge.forward(reaction.channel, event.payload()) {
            ForwardOutcome::Delivered => {}
            ForwardOutcome::NoSubscribers => tracing::debug!(
                channel = reaction.channel.event_name(),
                "no window subscribers for update event"
            ),
            ForwardOutcome::Failed(error) => tracing::warn!("{error}"),
        }

        if restart_choice == Some(RestartChoice::RestartNow) {
            tracing::info!("user requested restart to install update");
            if let Err(error) = self.updater.quit_and_install(false, true) {
                tracing::error!("failed to quit and install update: {error}");
            }
        }
    }
}

/// Drains updater events in publication order until every sender is gone.
///
/// Each reaction may block on a modal prompt, so it runs on the blocking pool.
pub(crate) async fn run_event_loop(
    coordinator: Arc<UpdateCoordinator>,
    mut events: UpdateEventReceiver,
) {
    while let Some(event) = events.recv().await {
        let coordinator = coordinator.clone();
        if let Err(error) =
            tokio::task::spawn_blocking(move || coordinator.handle_event(event)).await
        {
            tracing::error!("update event reaction panicked: {error}");
        }
    }
    tracing::debug!("update event loop finished");
}
