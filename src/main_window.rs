use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder};

use crate::{
    app_types::ShellConfig, desktop_bridge, shell_error::ShellError,
    window_lifecycle::WindowLifecycleState, MAIN_WINDOW_HEIGHT, MAIN_WINDOW_LABEL,
    MAIN_WINDOW_TITLE, MAIN_WINDOW_WIDTH, SPLASH_PAGE, SPLASH_WINDOW_HEIGHT, SPLASH_WINDOW_LABEL,
    SPLASH_WINDOW_WIDTH,
};

/// Builds the hidden main window and the splash window shown in front of it.
///
/// Fails with [`ShellError::WindowsAlreadyOpen`] while either window of the
/// previous pair is still alive.
pub(crate) fn create_windows(app_handle: &AppHandle, config: &ShellConfig) -> Result<(), ShellError> {
    let lifecycle = app_handle.state::<WindowLifecycleState>();
    let generation = lifecycle.with(|lifecycle| lifecycle.begin_create())?;

    if let Err(error) = build_windows(app_handle, config) {
        lifecycle.with(|lifecycle| lifecycle.abort_create(generation));
        for label in [SPLASH_WINDOW_LABEL, MAIN_WINDOW_LABEL] {
            if let Some(window) = app_handle.get_webview_window(label) {
                if let Err(destroy_error) = window.destroy() {
                    tracing::debug!(
                        "failed to destroy {label} window after creation error: {destroy_error}"
                    );
                }
            }
        }
        return Err(error);
    }

    tracing::info!(
        generation,
        development = config.is_development(),
        "created main and splash windows"
    );
    Ok(())
}

fn build_windows(app_handle: &AppHandle, config: &ShellConfig) -> Result<(), ShellError> {
    let main = WebviewWindowBuilder::new(app_handle, MAIN_WINDOW_LABEL, config.main_window_url())
        .title(MAIN_WINDOW_TITLE)
        .inner_size(MAIN_WINDOW_WIDTH, MAIN_WINDOW_HEIGHT)
        .visible(false)
        .initialization_script(&desktop_bridge::bridge_init_script(config))
        .build()
        .map_err(|error| ShellError::WindowCreation {
            label: MAIN_WINDOW_LABEL,
            reason: error.to_string(),
        })?;

    let splash = WebviewWindowBuilder::new(
        app_handle,
        SPLASH_WINDOW_LABEL,
        WebviewUrl::App(SPLASH_PAGE.into()),
    )
    .title(MAIN_WINDOW_TITLE)
    .inner_size(SPLASH_WINDOW_WIDTH, SPLASH_WINDOW_HEIGHT)
    .decorations(false)
    .transparent(true)
    .always_on_top(true)
    .resizable(false)
    .skip_taskbar(true)
    .center()
    .build()
    .map_err(|error| ShellError::WindowCreation {
        label: SPLASH_WINDOW_LABEL,
        reason: error.to_string(),
    })?;

    if let Err(error) = splash.set_focus() {
        tracing::debug!("failed to focus splash window: {error}");
    }

    if config.is_development() {
        open_inspector(&main);
    }
    Ok(())
}

#[cfg(any(debug_assertions, feature = "devtools"))]
pub(crate) fn open_inspector(window: &tauri::WebviewWindow) {
    window.open_devtools();
}

#[cfg(not(any(debug_assertions, feature = "devtools")))]
pub(crate) fn open_inspector(window: &tauri::WebviewWindow) {
    tracing::warn!(
        label = window.label(),
        "webview inspector is not compiled into this build"
    );
}
