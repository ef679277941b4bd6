#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_runtime;
mod app_types;
mod bridge_router;
mod desktop_bridge;
mod desktop_bridge_commands;
mod devtools_shortcut;
mod exit_events;
mod logging;
mod main_window;
mod shell_error;
mod splash_handoff;
mod tauri_updater;
mod update_coordinator;
mod update_events;
mod update_prompts;
mod update_reaction;
mod update_scheduler;
mod window_actions;
mod window_lifecycle;

pub(crate) use app_constants::*;

fn main() {
    app_runtime::run();
}
