use std::sync::atomic::{AtomicBool, Ordering};

use tauri::AppHandle;
use tauri_plugin_global_shortcut::{
    Code, GlobalShortcutExt, Modifiers, Shortcut, ShortcutEvent, ShortcutState,
};

use crate::{shell_error::ShellError, window_actions, INSPECTOR_SHORTCUT};

/// Tracks the process-wide inspector key binding so it is released once.
#[derive(Debug, Default)]
pub(crate) struct InspectorShortcut {
    registered: AtomicBool,
}

impl InspectorShortcut {
    pub(crate) fn mark_registered(&self) {
        self.registered.store(true, Ordering::Release);
    }

    #[cfg(test)]
    pub(crate) fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    /// Runs `release` only if the binding is still registered.
    pub(crate) fn release_with<F>(&self, release: F) -> bool
    where
        F: FnOnce(),
    {
        if !self.registered.swap(false, Ordering::AcqRel) {
            return false;
        }
        release();
        true
    }
}

pub(crate) fn inspector_shortcut() -> Shortcut {
    Shortcut::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyI)
}

pub(crate) fn handle_shortcut(app_handle: &AppHandle, shortcut: &Shortcut, event: ShortcutEvent) {
    if event.state() != ShortcutState::Pressed || *shortcut != inspector_shortcut() {
        return;
    }
    tracing::debug!("{INSPECTOR_SHORTCUT} pressed; opening main window inspector");
    window_actions::open_main_inspector(app_handle);
}

pub(crate) fn register(app_handle: &AppHandle, state: &InspectorShortcut) -> Result<(), ShellError> {
    app_handle
        .global_shortcut()
        .register(inspector_shortcut())
        .map_err(|error| ShellError::Shortcut {
            shortcut: INSPECTOR_SHORTCUT,
            reason: error.to_string(),
        })?;
    state.mark_registered();
    tracing::info!("registered {INSPECTOR_SHORTCUT} inspector shortcut");
    Ok(())
}

pub(crate) fn release(app_handle: &AppHandle, state: &InspectorShortcut) {
    state.release_with(|| match app_handle.global_shortcut().unregister_all() {
        Ok(()) => tracing::info!("released {INSPECTOR_SHORTCUT} inspector shortcut"),
        Err(error) => tracing::warn!("failed to release inspector shortcut: {error}"),
    });
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn release_with_runs_once_after_registration() {
        let state = InspectorShortcut::default();
        state.mark_registered();
        let releases = AtomicUsize::new(0);

        assert!(state.release_with(|| {
            releases.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(!state.release_with(|| {
            releases.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(!state.is_registered());
    }

    #[test]
    fn release_with_is_noop_when_never_registered() {
        let state = InspectorShortcut::default();
        assert!(!state.release_with(|| panic!("must not release an unregistered shortcut")));
    }

    #[test]
    fn inspector_shortcut_is_ctrl_shift_i() {
        let shortcut = inspector_shortcut();
        assert!(shortcut.matches(Modifiers::CONTROL | Modifiers::SHIFT, Code::KeyI));
        assert!(!shortcut.matches(Modifiers::CONTROL, Code::KeyI));
    }
}
