use std::sync::Arc;

use tauri::{webview::PageLoadEvent, Manager, RunEvent, WindowEvent};

use crate::{
    app_types::{ShellConfig, ShutdownState},
    bridge_router::{BridgeRouter, TauriBridgeEmitter},
    devtools_shortcut::{self, InspectorShortcut},
    exit_events,
    logging::{self, LogGuardState},
    main_window, splash_handoff,
    tauri_updater::TauriUpdater,
    update_coordinator::{self, UpdateCoordinator},
    update_events::update_event_channel,
    update_prompts::DialogUpdatePrompts,
    update_scheduler::{CheckSchedule, CheckScheduler},
    window_actions,
    window_lifecycle::WindowLifecycleState,
    MAIN_WINDOW_LABEL,
};

pub(crate) fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app_handle, argv, _cwd| {
            tracing::info!(?argv, "second instance launched; focusing existing window");
            window_actions::focus_existing_window(app_handle);
        }))
        .plugin(tauri_plugin_dialog::init())
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(devtools_shortcut::handle_shortcut)
                .build(),
        )
        .enable_macos_default_menu(false)
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::get_version,
            crate::desktop_bridge_commands::check_for_updates,
            crate::desktop_bridge_commands::get_runtime_versions,
            crate::desktop_bridge_commands::bridge_subscribe,
            crate::desktop_bridge_commands::bridge_remove_update_listeners,
            crate::desktop_bridge_commands::splash_transition_complete,
        ])
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                tracing::debug!(label = window.label(), "window destroyed");
                window
                    .state::<WindowLifecycleState>()
                    .with(|lifecycle| lifecycle.window_destroyed(window.label()));
            }
        })
        .on_page_load(|webview, payload| {
            if webview.label() != MAIN_WINDOW_LABEL {
                return;
            }

            match payload.event() {
                PageLoadEvent::Started => {
                    tracing::debug!("main window page-load started: {}", payload.url());
                    let removed = webview
                        .state::<Arc<BridgeRouter>>()
                        .remove_update_listeners();
                    if removed > 0 {
                        tracing::debug!(removed, "cleared update subscriptions for new page");
                    }
                }
                PageLoadEvent::Finished => {
                    tracing::debug!("main window page-load finished: {}", payload.url());
                    splash_handoff::on_main_first_load(webview.app_handle());
                }
            }
        })
        .setup(|app| {
            let app_handle = app.handle().clone();

            let log_dir = logging::resolve_log_dir(app_handle.path().app_log_dir().ok());
            let log_guard = LogGuardState::default();
            match logging::init_logging(&log_dir) {
                Ok(guard) => log_guard.set(guard),
                Err(error) => eprintln!("failed to initialize desktop logging: {error}"),
            }
            app.manage(log_guard);
            tracing::info!(
                version = %app.package_info().version,
                log_dir = %log_dir.display(),
                "desktop shell starting"
            );

            if let Err(error) = app_handle.plugin(tauri_plugin_updater::Builder::new().build()) {
                tracing::error!("failed to initialize updater plugin: {error}");
            }

            let config = ShellConfig::from_env();
            let (events, event_receiver) = update_event_channel();
            let router = Arc::new(BridgeRouter::new(Arc::new(TauriBridgeEmitter::new(
                app_handle.clone(),
            ))));
            let updater = Arc::new(TauriUpdater::new(app_handle.clone(), events));
            let coordinator = Arc::new(UpdateCoordinator::new(
                updater.clone(),
                Arc::new(DialogUpdatePrompts::new(app_handle.clone())),
                router.clone(),
            ));

            app.manage(config.clone());
            app.manage(ShutdownState::default());
            app.manage(WindowLifecycleState::default());
            app.manage(router);
            app.manage(coordinator.clone());
            app.manage(updater);
            app.manage(CheckScheduler::default());
            app.manage(InspectorShortcut::default());

            tauri::async_runtime::spawn(update_coordinator::run_event_loop(
                coordinator.clone(),
                event_receiver,
            ));

            main_window::create_windows(&app_handle, &config)?;

            if config.is_development() {
                if let Err(error) =
                    devtools_shortcut::register(&app_handle, &app.state::<InspectorShortcut>())
                {
                    tracing::warn!("{error}");
                }
            }

            app.state::<CheckScheduler>()
                .start(coordinator, CheckSchedule::default());

            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { code, api, .. } => {
                exit_events::handle_exit_requested(app_handle, code, &api);
            }
            RunEvent::Exit => {
                exit_events::handle_exit_event(app_handle);
            }
            #[cfg(target_os = "macos")]
            RunEvent::Reopen {
                has_visible_windows,
                ..
            } => {
                exit_events::handle_reopen(app_handle, has_visible_windows);
            }
            _ => {}
        });
}
