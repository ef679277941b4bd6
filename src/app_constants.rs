use std::time::Duration;

pub const MAIN_WINDOW_LABEL: &str = "main";
pub const SPLASH_WINDOW_LABEL: &str = "splash";

pub const MAIN_WINDOW_TITLE: &str = "Bizonance Admin Panel";
pub const MAIN_WINDOW_WIDTH: f64 = 800.0;
pub const MAIN_WINDOW_HEIGHT: f64 = 600.0;
pub const SPLASH_WINDOW_WIDTH: f64 = 600.0;
pub const SPLASH_WINDOW_HEIGHT: f64 = 600.0;

pub const SPLASH_PAGE: &str = "splash.html";
pub const MAIN_PAGE: &str = "index.html";
pub const DEV_SERVER_URL: &str = "http://localhost:3000";

pub const DESKTOP_ENV_VAR: &str = "BIZONANCE_DESKTOP_ENV";
pub const DEVELOPMENT_ENV_VALUE: &str = "development";

pub const SPLASH_SETTLE_DELAY: Duration = Duration::from_millis(500);
pub const SPLASH_FADE_DURATION: Duration = Duration::from_secs(1);
pub const SPLASH_FADE_GRACE: Duration = Duration::from_secs(5);

pub const UPDATE_INITIAL_DELAY: Duration = Duration::from_secs(3);
pub const UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const UPDATE_PROGRESS_MIN_INTERVAL: Duration = Duration::from_millis(250);
pub const UPDATE_REQUEST_TIMEOUT: Duration = Duration::from_secs(20 * 60);
pub const UPDATE_SESSION_STALE_AFTER: Duration = Duration::from_secs(30 * 60);

pub const UPDATE_CHECKING_EVENT: &str = "update-checking";
pub const UPDATE_AVAILABLE_EVENT: &str = "update-available";
pub const UPDATE_NOT_AVAILABLE_EVENT: &str = "update-not-available";
pub const UPDATE_PROGRESS_EVENT: &str = "update-progress";
pub const UPDATE_DOWNLOADED_EVENT: &str = "update-downloaded";
pub const UPDATE_ERROR_EVENT: &str = "update-error";

pub const INSPECTOR_SHORTCUT: &str = "Ctrl+Shift+I";

pub const DESKTOP_LOG_FILE: &str = "desktop.log";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
pub const LOG_DIR_FALLBACK: &str = "bizonance-admin-desktop";
