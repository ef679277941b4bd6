use crate::{
    bridge_router::BridgeChannel,
    update_events::{UpdateEvent, UpdatePhase},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UpdatePrompt {
    Available { version: String },
    Downloaded { version: String },
    Failed,
}

/// What the coordinator does in response to one updater event.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UpdateReaction {
    pub(crate) log_level: LogLevel,
    pub(crate) log_message: String,
    pub(crate) prompt: Option<UpdatePrompt>,
    pub(crate) channel: BridgeChannel,
    pub(crate) next_phase: UpdatePhase,
}

pub(crate) fn react(event: &UpdateEvent) -> UpdateReaction {
    let (log_level, log_message, prompt) = match event {
        UpdateEvent::Checking => (LogLevel::Info, "Checking for update...".to_string(), None),
        UpdateEvent::Available(info) => (
            LogLevel::Info,
            format!(
                "Update available: {} (current {})",
                info.version, info.current_version
            ),
            Some(UpdatePrompt::Available {
                version: info.version.clone(),
            }),
        ),
        UpdateEvent::NotAvailable(info) => (
            LogLevel::Info,
            format!("Update not available; running {}", info.current_version),
            None,
        ),
        UpdateEvent::Progress(progress) => {
            let total = progress
                .total
                .map(|total| total.to_string())
                .unwrap_or_else(|| "?".to_string());
            (
                LogLevel::Info,
                format!(
                    "Download speed: {} B/s - Downloaded {:.1}% ({}/{})",
                    progress.bytes_per_second, progress.percent, progress.transferred, total
                ),
                None,
            )
        }
        UpdateEvent::Downloaded(info) => (
            LogLevel::Info,
            format!("Update downloaded: {}", info.version),
            Some(UpdatePrompt::Downloaded {
                version: info.version.clone(),
            }),
        ),
        UpdateEvent::Error(message) => (
            LogLevel::Error,
            format!("Error in auto-updater: {message}"),
            Some(UpdatePrompt::Failed),
        ),
    };

    UpdateReaction {
        log_level,
        log_message,
        prompt,
        channel: event.channel(),
        next_phase: phase_after(event),
    }
}

pub(crate) fn phase_after(event: &UpdateEvent) -> UpdatePhase {
    match event {
        UpdateEvent::Checking => UpdatePhase::Checking,
        UpdateEvent::Available(_) => UpdatePhase::Available,
        UpdateEvent::NotAvailable(_) => UpdatePhase::NotAvailable,
        UpdateEvent::Progress(_) => UpdatePhase::Downloading,
        UpdateEvent::Downloaded(_) => UpdatePhase::Downloaded,
        UpdateEvent::Error(_) => UpdatePhase::Errored,
    }
}

/// Whether `event` is a legal step from `current` in a single check cycle.
pub(crate) fn is_expected_transition(current: UpdatePhase, event: &UpdateEvent) -> bool {
    match event {
        // A fresh cycle may start from any resting phase; the coordinator
        // already moves into `Checking` when it issues the request.
        UpdateEvent::Checking => !matches!(
            current,
            UpdatePhase::Available | UpdatePhase::Downloading
        ),
        UpdateEvent::Available(_) | UpdateEvent::NotAvailable(_) => {
            current == UpdatePhase::Checking
        }
        UpdateEvent::Progress(_) => {
            matches!(current, UpdatePhase::Available | UpdatePhase::Downloading)
        }
        UpdateEvent::Downloaded(_) => {
            matches!(current, UpdatePhase::Available | UpdatePhase::Downloading)
        }
        UpdateEvent::Error(_) => current.is_in_flight(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update_events::{DownloadProgress, UpdateInfo};

    fn info(version: &str) -> UpdateInfo {
        UpdateInfo {
            version: version.to_string(),
            current_version: "1.0.0".to_string(),
            release_date: None,
            release_notes: None,
        }
    }

    fn progress() -> DownloadProgress {
        DownloadProgress {
            transferred: 512,
            total: Some(1_024),
            percent: 50.0,
            bytes_per_second: 256,
            delta: 512,
        }
    }

    #[test]
    fn react_prompts_only_for_available_downloaded_and_error() {
        assert_eq!(react(&UpdateEvent::Checking).prompt, None);
        assert_eq!(react(&UpdateEvent::NotAvailable(info("1.0.0"))).prompt, None);
        assert_eq!(react(&UpdateEvent::Progress(progress())).prompt, None);
        assert_eq!(
            react(&UpdateEvent::Available(info("1.1.0"))).prompt,
            Some(UpdatePrompt::Available {
                version: "1.1.0".to_string()
            })
        );
        assert_eq!(
            react(&UpdateEvent::Downloaded(info("1.1.0"))).prompt,
            Some(UpdatePrompt::Downloaded {
                version: "1.1.0".to_string()
            })
        );
        assert_eq!(
            react(&UpdateEvent::Error("boom".to_string())).prompt,
            Some(UpdatePrompt::Failed)
        );
    }

    #[test]
    fn react_logs_errors_at_error_level_with_detail() {
        let reaction = react(&UpdateEvent::Error("signature mismatch".to_string()));
        assert_eq!(reaction.log_level, LogLevel::Error);
        assert!(reaction.log_message.contains("signature mismatch"));
        assert_eq!(reaction.channel, BridgeChannel::Error);
        assert_eq!(reaction.next_phase, UpdatePhase::Errored);
    }

    #[test]
    fn react_formats_progress_with_unknown_total() {
        let mut unknown = progress();
        unknown.total = None;
        let reaction = react(&UpdateEvent::Progress(unknown));
        assert_eq!(reaction.log_level, LogLevel::Info);
        assert!(reaction.log_message.contains("(512/?)"));
        assert_eq!(reaction.next_phase, UpdatePhase::Downloading);
    }

    #[test]
    fn expected_transitions_follow_the_session_state_machine() {
        assert!(is_expected_transition(
            UpdatePhase::Idle,
            &UpdateEvent::Checking
        ));
        assert!(is_expected_transition(
            UpdatePhase::Checking,
            &UpdateEvent::Available(info("1.1.0"))
        ));
        assert!(is_expected_transition(
            UpdatePhase::Available,
            &UpdateEvent::Progress(progress())
        ));
        assert!(is_expected_transition(
            UpdatePhase::Downloading,
            &UpdateEvent::Downloaded(info("1.1.0"))
        ));
        assert!(is_expected_transition(
            UpdatePhase::Downloaded,
            &UpdateEvent::Checking
        ));

        assert!(!is_expected_transition(
            UpdatePhase::Idle,
            &UpdateEvent::Downloaded(info("1.1.0"))
        ));
        assert!(!is_expected_transition(
            UpdatePhase::NotAvailable,
            &UpdateEvent::Error("late".to_string())
        ));
        assert!(!is_expected_transition(
            UpdatePhase::Downloading,
            &UpdateEvent::Checking
        ));
    }
}
