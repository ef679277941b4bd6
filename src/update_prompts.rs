use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogBuilder, MessageDialogButtons, MessageDialogKind};

use crate::{
    update_coordinator::{RestartChoice, UpdatePrompts},
    MAIN_WINDOW_LABEL,
};

const RESTART_NOW_LABEL: &str = "Restart Now";
const LATER_LABEL: &str = "Later";

/// Blocking native message dialogs, parented to the main window when it exists.
pub(crate) struct DialogUpdatePrompts {
    app_handle: AppHandle,
}

impl DialogUpdatePrompts {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }

    fn message(&self, title: &str, body: String) -> MessageDialogBuilder<tauri::Wry> {
        let builder = self.app_handle.dialog().message(body).title(title);
        match self.app_handle.get_webview_window(MAIN_WINDOW_LABEL) {
            Some(window) => builder.parent(&window),
            None => builder,
        }
    }
}

impl UpdatePrompts for DialogUpdatePrompts {
    fn update_available(&self, version: &str) {
        self.message(
            "Update Available",
            format!(
                "A new version ({version}) is available and is being downloaded in the background."
            ),
        )
        .kind(MessageDialogKind::Info)
        .buttons(MessageDialogButtons::Ok)
        .blocking_show();
    }

    fn update_downloaded(&self, version: &str) -> RestartChoice {
        let restart = self
            .message(
                "Update Ready",
                format!(
                    "Version {version} has been downloaded. Restart the application now to install it?"
                ),
            )
            .kind(MessageDialogKind::Info)
            .buttons(MessageDialogButtons::OkCancelCustom(
                RESTART_NOW_LABEL.to_string(),
                LATER_LABEL.to_string(),
            ))
            .blocking_show();

        if restart {
            RestartChoice::RestartNow
        } else {
            RestartChoice::Later
        }
    }

    fn update_failed(&self) {
        self.message(
            "Update Error",
            "Something went wrong while updating the application. Please try again later."
                .to_string(),
        )
        .kind(MessageDialogKind::Error)
        .buttons(MessageDialogButtons::Ok)
        .blocking_show();
    }
}
