use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ShellError {
    #[error("windows are already open (main: {main_open}, splash: {splash_open})")]
    WindowsAlreadyOpen { main_open: bool, splash_open: bool },
    #[error("failed to create {label} window: {reason}")]
    WindowCreation { label: &'static str, reason: String },
    #[error("{label} window not found")]
    WindowMissing { label: &'static str },
    #[error("failed to {action} {label} window: {reason}")]
    WindowAction {
        label: &'static str,
        action: &'static str,
        reason: String,
    },
    #[error("failed to register shortcut {shortcut}: {reason}")]
    Shortcut {
        shortcut: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub(crate) enum UpdaterError {
    #[error("updater is unavailable: {0}")]
    Unavailable(String),
    #[error("invalid updater configuration: {0}")]
    Configuration(String),
    #[error("failed to install update: {0}")]
    Install(String),
    #[error("no downloaded update is pending installation")]
    NoPendingUpdate,
}
