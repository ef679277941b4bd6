use std::sync::Arc;

use tauri::{Manager, WebviewWindow};

use crate::{
    app_types::{RuntimeVersions, ShellConfig},
    bridge_router::BridgeRouter,
    desktop_bridge,
    update_coordinator::{CheckTrigger, UpdateCoordinator},
    window_lifecycle::WindowLifecycleState,
};

fn ensure_bridge_caller(window: &WebviewWindow) -> Result<(), String> {
    let url = window
        .url()
        .map_err(|error| format!("Failed to read caller URL: {error}"))?;
    let config = window.state::<ShellConfig>();
    desktop_bridge::bridge_caller_allowed(window.label(), &url, &config).inspect_err(|reason| {
        tracing::warn!("rejected desktop bridge call: {reason}");
    })
}

#[tauri::command]
pub(crate) fn get_version(window: WebviewWindow) -> Result<String, String> {
    ensure_bridge_caller(&window)?;
    Ok(window.package_info().version.to_string())
}

#[tauri::command]
pub(crate) fn check_for_updates(window: WebviewWindow) -> Result<String, String> {
    ensure_bridge_caller(&window)?;
    let coordinator = window.state::<Arc<UpdateCoordinator>>();
    let outcome = coordinator.check_now(CheckTrigger::Manual);
    Ok(outcome.acknowledgement().to_string())
}

#[tauri::command]
pub(crate) fn get_runtime_versions(window: WebviewWindow) -> Result<RuntimeVersions, String> {
    ensure_bridge_caller(&window)?;
    let webview = tauri::webview_version()
        .inspect_err(|error| tracing::debug!("webview version unavailable: {error}"))
        .ok();
    Ok(RuntimeVersions {
        app: window.package_info().version.to_string(),
        tauri: tauri::VERSION.to_string(),
        webview,
    })
}

#[tauri::command]
pub(crate) fn bridge_subscribe(window: WebviewWindow, channel: String) -> Result<(), String> {
    ensure_bridge_caller(&window)?;
    let router = window.state::<Arc<BridgeRouter>>();
    let channel = router.subscribe(&channel)?;
    tracing::debug!(
        channel = channel.event_name(),
        subscribers = router.subscriber_count(channel),
        "update channel subscribed"
    );
    Ok(())
}

#[tauri::command]
pub(crate) fn bridge_remove_update_listeners(window: WebviewWindow) -> Result<(), String> {
    ensure_bridge_caller(&window)?;
    let removed = window
        .state::<Arc<BridgeRouter>>()
        .remove_update_listeners();
    tracing::debug!(removed, "update channel subscriptions cleared");
    Ok(())
}

#[tauri::command]
pub(crate) fn splash_transition_complete(window: WebviewWindow) -> Result<(), String> {
    desktop_bridge::splash_caller_allowed(window.label())?;
    if !window
        .state::<WindowLifecycleState>()
        .signal_fade_complete()
    {
        tracing::debug!("splash transition signal arrived with no fade in progress");
    }
    Ok(())
}
