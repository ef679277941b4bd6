use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use tauri::AppHandle;
use tauri_plugin_updater::{Update, UpdaterExt};

use crate::{
    shell_error::UpdaterError,
    update_coordinator::{UpdaterCapability, UpdaterOptions},
    update_events::{ProgressTracker, UpdateEvent, UpdateEventSender, UpdateInfo},
    UPDATE_PROGRESS_MIN_INTERVAL, UPDATE_REQUEST_TIMEOUT,
};

struct PendingUpdate {
    update: Update,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DownloadPlan {
    /// The same version was already downloaded and is waiting to be installed.
    ReusePending,
    Download,
}

fn download_plan(pending_version: Option<&str>, available_version: &str) -> DownloadPlan {
    if pending_version == Some(available_version) {
        DownloadPlan::ReusePending
    } else {
        DownloadPlan::Download
    }
}

/// `tauri-plugin-updater` exposed as an event-publishing updater capability.
pub(crate) struct TauriUpdater {
    app_handle: AppHandle,
    events: UpdateEventSender,
    options: Mutex<UpdaterOptions>,
    pending: Arc<Mutex<Option<PendingUpdate>>>,
}

impl TauriUpdater {
    pub(crate) fn new(app_handle: AppHandle, events: UpdateEventSender) -> Self {
        Self {
            app_handle,
            events,
            options: Mutex::new(UpdaterOptions {
                auto_download: true,
                auto_install_on_quit: true,
            }),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    fn options(&self) -> UpdaterOptions {
        *self.options.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_pending(&self) -> Option<PendingUpdate> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Installs a downloaded update while the process exits, when configured to.
    pub(crate) fn install_pending_on_quit(&self) {
        if !self.options().auto_install_on_quit {
            return;
        }
        let Some(pending) = self.take_pending() else {
            return;
        };

        tracing::info!(
            version = %pending.update.version,
            "installing downloaded update on quit"
        );
        if let Err(error) = pending.update.install(&pending.bytes) {
            tracing::error!("failed to install update on quit: {error}");
        }
    }
}

impl UpdaterCapability for TauriUpdater {
    fn configure(&self, options: UpdaterOptions) -> Result<(), UpdaterError> {
        if options.auto_install_on_quit && !options.auto_download {
            return Err(UpdaterError::Configuration(
                "install-on-quit requires automatic download".to_string(),
            ));
        }
        *self.options.lock().unwrap_or_else(PoisonError::into_inner) = options;
        Ok(())
    }

    fn check_for_updates(&self) -> Result<(), UpdaterError> {
        let updater = self
            .app_handle
            .updater_builder()
            .timeout(UPDATE_REQUEST_TIMEOUT)
            .build()
            .map_err(|error| UpdaterError::Unavailable(error.to_string()))?;
        let current_version = self.app_handle.package_info().version.to_string();
        let options = self.options();
        let events = self.events.clone();
        let pending = self.pending.clone();

        tauri::async_runtime::spawn(async move {
            publish(&events, UpdateEvent::Checking);
            let check_started = Instant::now();
            let update = match updater.check().await {
                Ok(Some(update)) => update,
                Ok(None) => {
                    tracing::debug!(
                        elapsed_ms = check_started.elapsed().as_millis() as u64,
                        "update check finished without a newer version"
                    );
                    publish(
                        &events,
                        UpdateEvent::NotAvailable(UpdateInfo::current(&current_version)),
                    );
                    return;
                }
                Err(error) => {
                    publish(&events, UpdateEvent::Error(error.to_string()));
                    return;
                }
            };

            let info = update_info(&update);
            publish(&events, UpdateEvent::Available(info.clone()));
            if !options.auto_download {
                return;
            }

            let plan = {
                let pending = pending.lock().unwrap_or_else(PoisonError::into_inner);
                download_plan(
                    pending.as_ref().map(|pending| pending.update.version.as_str()),
                    &update.version,
                )
            };
            if plan == DownloadPlan::ReusePending {
                tracing::info!(
                    version = %update.version,
                    "update already downloaded; skipping download"
                );
                publish(&events, UpdateEvent::Downloaded(info));
                return;
            }

            let mut tracker = ProgressTracker::new(Instant::now(), UPDATE_PROGRESS_MIN_INTERVAL);
            let progress_events = events.clone();
            let downloaded = update
                .download(
                    move |chunk_length, content_length| {
                        if let Some(progress) =
                            tracker.record_chunk(chunk_length, content_length, Instant::now())
                        {
                            publish(&progress_events, UpdateEvent::Progress(progress));
                        }
                    },
                    || tracing::debug!("update download finished"),
                )
                .await;

            match downloaded {
                Ok(bytes) => {
                    *pending.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some(PendingUpdate { update, bytes });
                    publish(&events, UpdateEvent::Downloaded(info));
                }
                Err(error) => publish(&events, UpdateEvent::Error(error.to_string())),
            }
        });

        Ok(())
    }

    fn quit_and_install(&self, silent: bool, force_run_after: bool) -> Result<(), UpdaterError> {
        let pending = self.take_pending().ok_or(UpdaterError::NoPendingUpdate)?;
        // Installer UI mode is fixed by `plugins.updater.windows.installMode`.
        tracing::info!(
            version = %pending.update.version,
            silent,
            force_run_after,
            "installing update before quit"
        );
        pending
            .update
            .install(&pending.bytes)
            .map_err(|error| UpdaterError::Install(error.to_string()))?;

        if force_run_after {
            self.app_handle.request_restart();
        } else {
            self.app_handle.exit(0);
        }
        Ok(())
    }
}

fn update_info(update: &Update) -> UpdateInfo {
    UpdateInfo {
        version: update.version.clone(),
        current_version: update.current_version.clone(),
        release_date: update.date.map(|date| date.to_string()),
        release_notes: update.body.clone(),
    }
}

fn publish(events: &UpdateEventSender, event: UpdateEvent) {
    if events.send(event).is_err() {
        tracing::warn!("update event dropped: coordinator event loop is gone");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_plan_reuses_pending_update_of_same_version() {
        assert_eq!(download_plan(Some("1.2.0"), "1.2.0"), DownloadPlan::ReusePending);
    }

    #[test]
    fn download_plan_downloads_when_nothing_or_older_is_pending() {
        assert_eq!(download_plan(None, "1.2.0"), DownloadPlan::Download);
        assert_eq!(download_plan(Some("1.1.0"), "1.2.0"), DownloadPlan::Download);
    }
}
