use tauri::{AppHandle, Manager};

use crate::{
    main_window,
    window_lifecycle::{HandoffStage, WindowLifecycle, WindowLifecycleState},
    MAIN_WINDOW_LABEL, SPLASH_WINDOW_LABEL,
};

/// Label of the window a second launch should bring forward.
pub(crate) fn focus_target(lifecycle: &WindowLifecycle) -> Option<&'static str> {
    if lifecycle.main_visible() {
        return Some(MAIN_WINDOW_LABEL);
    }
    match lifecycle.stage() {
        HandoffStage::NoWindows | HandoffStage::Complete => None,
        HandoffStage::AwaitingFirstLoad | HandoffStage::Settling | HandoffStage::Fading => {
            lifecycle.splash_open().then_some(SPLASH_WINDOW_LABEL)
        }
    }
}

pub(crate) fn focus_existing_window(app_handle: &AppHandle) {
    let target = app_handle
        .state::<WindowLifecycleState>()
        .with(|lifecycle| focus_target(lifecycle));
    let Some(label) = target else {
        tracing::debug!("focus request skipped: no windows are open");
        return;
    };
    let Some(window) = app_handle.get_webview_window(label) else {
        tracing::debug!("focus request skipped: {label} window not found");
        return;
    };

    if label == MAIN_WINDOW_LABEL {
        if let Err(error) = window.unminimize() {
            tracing::warn!("failed to unminimize main window: {error}");
        }
        if let Err(error) = window.show() {
            tracing::warn!("failed to show main window: {error}");
        }
    }
    if let Err(error) = window.set_focus() {
        tracing::warn!("failed to focus {label} window: {error}");
    }
}

pub(crate) fn open_main_inspector(app_handle: &AppHandle) {
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        tracing::debug!("open_main_inspector skipped: main window not found");
        return;
    };
    main_window::open_inspector(&window);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_target_is_none_without_windows() {
        assert_eq!(focus_target(&WindowLifecycle::default()), None);
    }

    #[test]
    fn focus_target_keeps_main_hidden_until_handoff_completes() {
        let mut lifecycle = WindowLifecycle::default();
        let generation = lifecycle.begin_create().expect("pair");
        assert_eq!(focus_target(&lifecycle), Some(SPLASH_WINDOW_LABEL));

        lifecycle.main_first_load();
        assert_eq!(focus_target(&lifecycle), Some(SPLASH_WINDOW_LABEL));
        lifecycle.settle_elapsed(generation);
        assert_eq!(focus_target(&lifecycle), Some(SPLASH_WINDOW_LABEL));

        lifecycle.fade_finished(generation);
        assert_eq!(focus_target(&lifecycle), Some(MAIN_WINDOW_LABEL));
    }

    #[test]
    fn focus_target_is_none_once_main_window_is_gone() {
        let mut lifecycle = WindowLifecycle::default();
        let generation = lifecycle.begin_create().expect("pair");
        lifecycle.main_first_load();
        lifecycle.settle_elapsed(generation);
        lifecycle.fade_finished(generation);

        lifecycle.window_destroyed(MAIN_WINDOW_LABEL);
        assert_eq!(focus_target(&lifecycle), None);
    }
}
