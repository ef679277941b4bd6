use std::{
    env,
    sync::atomic::{AtomicBool, Ordering},
};
use tauri::WebviewUrl;
use url::Url;

use crate::{DESKTOP_ENV_VAR, DEVELOPMENT_ENV_VALUE, DEV_SERVER_URL, MAIN_PAGE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ContentSource {
    DevServer(Url),
    Packaged,
}

/// Resolved once at startup from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShellConfig {
    pub(crate) content_source: ContentSource,
}

impl ShellConfig {
    pub(crate) fn from_env() -> Self {
        Self::from_env_value(env::var(DESKTOP_ENV_VAR).ok().as_deref())
    }

    pub(crate) fn from_env_value(value: Option<&str>) -> Self {
        let development = value
            .map(str::trim)
            .is_some_and(|value| value.eq_ignore_ascii_case(DEVELOPMENT_ENV_VALUE));
        if !development {
            return Self {
                content_source: ContentSource::Packaged,
            };
        }

        match Url::parse(DEV_SERVER_URL) {
            Ok(url) => Self {
                content_source: ContentSource::DevServer(url),
            },
            Err(error) => {
                tracing::warn!(
                    "invalid development server url {DEV_SERVER_URL}: {error}; using packaged content"
                );
                Self {
                    content_source: ContentSource::Packaged,
                }
            }
        }
    }

    pub(crate) fn is_development(&self) -> bool {
        matches!(self.content_source, ContentSource::DevServer(_))
    }

    pub(crate) fn dev_server_url(&self) -> Option<&Url> {
        match &self.content_source {
            ContentSource::DevServer(url) => Some(url),
            ContentSource::Packaged => None,
        }
    }

    pub(crate) fn main_window_url(&self) -> WebviewUrl {
        match &self.content_source {
            ContentSource::DevServer(url) => WebviewUrl::External(url.clone()),
            ContentSource::Packaged => WebviewUrl::App(MAIN_PAGE.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RuntimeVersions {
    pub(crate) app: String,
    pub(crate) tauri: String,
    pub(crate) webview: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct ShutdownState {
    quitting: AtomicBool,
}

impl ShutdownState {
    /// Returns `true` only for the call that moved the process into quitting.
    pub(crate) fn begin_quit(&self) -> bool {
        !self.quitting.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_config_selects_dev_server_for_development_flag() {
        let config = ShellConfig::from_env_value(Some("development"));
        assert!(config.is_development());
        assert_eq!(
            config.dev_server_url().map(Url::as_str),
            Some("http://localhost:3000/")
        );
    }

    #[test]
    fn shell_config_accepts_padded_and_mixed_case_flag() {
        assert!(ShellConfig::from_env_value(Some("  Development ")).is_development());
    }

    #[test]
    fn shell_config_falls_back_to_packaged_content() {
        assert_eq!(
            ShellConfig::from_env_value(None).content_source,
            ContentSource::Packaged
        );
        assert_eq!(
            ShellConfig::from_env_value(Some("production")).content_source,
            ContentSource::Packaged
        );
        assert!(matches!(
            ShellConfig::from_env_value(Some("")).main_window_url(),
            WebviewUrl::App(path) if path.to_str() == Some("index.html")
        ));
    }

    #[test]
    fn shutdown_state_begins_quit_once() {
        let state = ShutdownState::default();
        assert!(!state.is_quitting());
        assert!(state.begin_quit());
        assert!(state.is_quitting());
        assert!(!state.begin_quit());
    }

    #[test]
    fn runtime_versions_serialize_in_camel_case() {
        let versions = RuntimeVersions {
            app: "1.2.3".to_string(),
            tauri: "2.1.0".to_string(),
            webview: None,
        };
        let value = serde_json::to_value(versions).expect("serialize versions");
        assert_eq!(value["app"], "1.2.3");
        assert_eq!(value["tauri"], "2.1.0");
        assert!(value["webview"].is_null());
    }
}
