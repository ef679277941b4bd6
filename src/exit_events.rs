use std::sync::Arc;

use tauri::{AppHandle, ExitRequestApi, Manager};

use crate::{
    app_types::{ShellConfig, ShutdownState},
    devtools_shortcut::{self, InspectorShortcut},
    main_window,
    tauri_updater::TauriUpdater,
    update_scheduler::CheckScheduler,
    window_lifecycle::WindowLifecycleState,
};

/// What the shell does when the event loop asks to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitDecision {
    /// Last window closed on macOS: stay resident until quit or reopened.
    StayResident,
    Quit,
}

pub(crate) fn exit_decision(code: Option<i32>, keep_running_without_windows: bool) -> ExitDecision {
    if code.is_none() && keep_running_without_windows {
        ExitDecision::StayResident
    } else {
        ExitDecision::Quit
    }
}

pub(crate) fn handle_exit_requested(app_handle: &AppHandle, code: Option<i32>, api: &ExitRequestApi) {
    match exit_decision(code, cfg!(target_os = "macos")) {
        ExitDecision::StayResident => {
            tracing::info!("all windows closed; staying resident until reopened");
            api.prevent_exit();
        }
        ExitDecision::Quit => begin_quit(app_handle),
    }
}

/// Releases process-wide bindings and background schedules; later calls are no-ops.
pub(crate) fn begin_quit(app_handle: &AppHandle) {
    let shutdown = app_handle.state::<ShutdownState>();
    if !shutdown.begin_quit() {
        return;
    }

    tracing::info!("application quitting; releasing shortcut and update schedule");
    devtools_shortcut::release(app_handle, &app_handle.state::<InspectorShortcut>());
    app_handle.state::<CheckScheduler>().cancel();
}

pub(crate) fn handle_exit_event(app_handle: &AppHandle) {
    begin_quit(app_handle);
    if let Some(updater) = app_handle.try_state::<Arc<TauriUpdater>>() {
        updater.install_pending_on_quit();
    }
    tracing::info!("application exit");
}

pub(crate) fn should_recreate_windows(
    has_visible_windows: bool,
    windows_open: bool,
    quitting: bool,
) -> bool {
    !has_visible_windows && !windows_open && !quitting
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub(crate) fn handle_reopen(app_handle: &AppHandle, has_visible_windows: bool) {
    let windows_open = app_handle
        .state::<WindowLifecycleState>()
        .with(|lifecycle| lifecycle.main_open() || lifecycle.splash_open());
    let quitting = app_handle.state::<ShutdownState>().is_quitting();
    if !should_recreate_windows(has_visible_windows, windows_open, quitting) {
        if quitting {
            tracing::debug!("reactivation ignored: application is quitting");
        }
        return;
    }

    tracing::info!("application reactivated without windows; recreating them");
    let config = app_handle.state::<ShellConfig>();
    if let Err(error) = main_window::create_windows(app_handle, &config) {
        tracing::error!("failed to recreate windows on reactivation: {error}");
    }
}
