use serde_json::{json, Map, Value};
use url::Url;

use crate::{
    app_types::ShellConfig, bridge_router::BridgeChannel, MAIN_WINDOW_LABEL, SPLASH_WINDOW_LABEL,
};

const PACKAGED_ORIGINS: [&str; 3] = [
    "tauri://localhost",
    "http://tauri.localhost",
    "https://tauri.localhost",
];

fn subscribe_method(channel: BridgeChannel) -> &'static str {
    match channel {
        BridgeChannel::Checking => "onUpdateChecking",
        BridgeChannel::Available => "onUpdateAvailable",
        BridgeChannel::NotAvailable => "onUpdateNotAvailable",
        BridgeChannel::Progress => "onUpdateProgress",
        BridgeChannel::Downloaded => "onUpdateDownloaded",
        BridgeChannel::Error => "onUpdateError",
    }
}

pub(crate) fn is_trusted_content_url(url: &Url, config: &ShellConfig) -> bool {
    match (url.scheme(), url.host_str()) {
        ("tauri", Some("localhost")) => true,
        ("http" | "https", Some("tauri.localhost")) => true,
        _ => config
            .dev_server_url()
            .is_some_and(|dev_server| dev_server.origin() == url.origin()),
    }
}

pub(crate) fn trusted_origins(config: &ShellConfig) -> Vec<String> {
    let mut origins: Vec<String> = PACKAGED_ORIGINS.iter().map(ToString::to_string).collect();
    if let Some(dev_server) = config.dev_server_url() {
        origins.push(dev_server.origin().ascii_serialization());
    }
    origins
}

pub(crate) fn bridge_caller_allowed(
    label: &str,
    url: &Url,
    config: &ShellConfig,
) -> Result<(), String> {
    if label != MAIN_WINDOW_LABEL {
        return Err(format!(
            "Desktop bridge is not available to window '{label}'."
        ));
    }
    if !is_trusted_content_url(url, config) {
        return Err(format!(
            "Desktop bridge is not available to content from '{}'.",
            url.origin().ascii_serialization()
        ));
    }
    Ok(())
}

pub(crate) fn splash_caller_allowed(label: &str) -> Result<(), String> {
    if label == SPLASH_WINDOW_LABEL {
        Ok(())
    } else {
        Err(format!(
            "Splash transition signal is not accepted from window '{label}'."
        ))
    }
}

/// Initialization script defining `window.desktopAPI` in the main window.
///
/// Tauri globals are resolved at call time because they may be installed after
/// this script runs.
pub(crate) fn bridge_init_script(config: &ShellConfig) -> String {
    let channels: Map<String, Value> = BridgeChannel::ALL
        .into_iter()
        .map(|channel| {
            (
                subscribe_method(channel).to_string(),
                json!({
                    "event": channel.event_name(),
                    "withPayload": channel != BridgeChannel::Checking,
                }),
            )
        })
        .collect();
    let channels_json = Value::Object(channels).to_string();
    let origins_json = json!(trusted_origins(config)).to_string();

    format!(
        r#"(() => {{
  if (window.desktopAPI) return;
  if (!{origins_json}.includes(window.location.origin)) return;

  const channels = {channels_json};
  const unlisteners = [];
  const invoke = (command, args) => window.__TAURI_INTERNALS__.invoke(command, args);
  const listen = (event, handler) => {{
    const tauri = window.__TAURI__;
    if (!tauri || !tauri.event) {{
      return Promise.reject(new Error('Tauri event API is unavailable.'));
    }}
    return tauri.event.listen(event, handler);
  }};

  const api = {{
    getVersion: () => invoke('get_version'),
    checkForUpdates: () => invoke('check_for_updates'),
    versions: {{ app: null, tauri: null, webview: null }},
    removeUpdateListeners: () => {{
      const pending = unlisteners.splice(0);
      return Promise.all(
        pending.map((registration) => registration.then((unlisten) => unlisten(), () => {{}}))
      ).then(() => invoke('bridge_remove_update_listeners'));
    }},
  }};

  for (const [method, channel] of Object.entries(channels)) {{
    api[method] = (callback) => {{
      const registration = listen(channel.event, (event) => {{
        if (channel.withPayload) {{
          callback(event.payload);
        }} else {{
          callback();
        }}
      }});
      unlisteners.push(registration);
      return registration.then(() => invoke('bridge_subscribe', {{ channel: channel.event }}));
    }};
  }}

  invoke('get_runtime_versions').then(
    (versions) => Object.assign(api.versions, versions),
    () => {{}}
  );

  Object.defineProperty(window, 'desktopAPI', {{
    value: Object.freeze(api),
    writable: false,
    configurable: false,
  }});
}})();"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packaged() -> ShellConfig {
        ShellConfig::from_env_value(None)
    }

    fn development() -> ShellConfig {
        ShellConfig::from_env_value(Some("development"))
    }

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("valid url")
    }

    #[test]
    fn is_trusted_content_url_accepts_packaged_origins() {
        let config = packaged();
        assert!(is_trusted_content_url(&url("tauri://localhost/index.html"), &config));
        assert!(is_trusted_content_url(&url("http://tauri.localhost/index.html"), &config));
        assert!(is_trusted_content_url(&url("https://tauri.localhost/"), &config));
    }

    #[test]
    fn is_trusted_content_url_accepts_dev_server_only_in_development() {
        let dev_page = url("http://localhost:3000/dashboard");
        assert!(is_trusted_content_url(&dev_page, &development()));
        assert!(!is_trusted_content_url(&dev_page, &packaged()));
        assert!(!is_trusted_content_url(&url("http://localhost:3001/"), &development()));
    }

    #[test]
    fn is_trusted_content_url_rejects_remote_origins() {
        let config = development();
        assert!(!is_trusted_content_url(&url("https://example.com/"), &config));
        assert!(!is_trusted_content_url(&url("https://tauri.localhost.example.com/"), &config));
        assert!(!is_trusted_content_url(&url("file:///tmp/index.html"), &config));
    }

    #[test]
    fn bridge_caller_allowed_requires_main_window_and_trusted_origin() {
        let config = packaged();
        let trusted = url("tauri://localhost/index.html");
        assert!(bridge_caller_allowed(MAIN_WINDOW_LABEL, &trusted, &config).is_ok());

        let from_splash = bridge_caller_allowed(SPLASH_WINDOW_LABEL, &trusted, &config)
            .expect_err("splash must be rejected");
        assert!(from_splash.contains("'splash'"));

        let remote = bridge_caller_allowed(MAIN_WINDOW_LABEL, &url("https://example.com/"), &config)
            .expect_err("remote content must be rejected");
        assert!(remote.contains("https://example.com"));
    }

    #[test]
    fn splash_caller_allowed_accepts_only_splash_window() {
        assert!(splash_caller_allowed(SPLASH_WINDOW_LABEL).is_ok());
        assert!(splash_caller_allowed(MAIN_WINDOW_LABEL).is_err());
    }

    #[test]
    fn bridge_init_script_registers_every_update_channel() {
        let script = bridge_init_script(&packaged());
        for channel in BridgeChannel::ALL {
            assert!(script.contains(subscribe_method(channel)));
            assert!(script.contains(channel.event_name()));
        }
        assert!(script.contains("removeUpdateListeners"));
        assert!(script.contains("'bridge_remove_update_listeners'"));
        assert!(script.contains("'get_runtime_versions'"));
    }

    #[test]
    fn bridge_init_script_only_trusts_dev_server_in_development() {
        assert!(!bridge_init_script(&packaged()).contains("http://localhost:3000"));
        assert!(bridge_init_script(&development()).contains("\"http://localhost:3000\""));
    }
}
