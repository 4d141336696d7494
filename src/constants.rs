//! Application constants and default values for duskr.
//!
//! Configuration defaults, validation limits and fixed identifiers used
//! throughout the application.

// ═══ Scheduling Defaults ═══

pub const DEFAULT_LOCATION: &str = "London";
pub const DEFAULT_LOOP_DELAY: u64 = 60; // seconds between phase checks while data is fresh
pub const DEFAULT_CHECK_INTERVAL: u64 = 20; // seconds between retries after a failed refresh
pub const DEFAULT_SUNRISE_OFFSET: &str = "+00:00";
pub const DEFAULT_SUNSET_OFFSET: &str = "+00:00";

// ═══ Network Defaults ═══

pub const DEFAULT_HTTP_TIMEOUT: u64 = 10; // seconds
pub const DEFAULT_PROBE_HOST: &str = "1.1.1.1:53";
pub const DEFAULT_PROBE_RETRIES: u32 = 3;
pub const DEFAULT_PROBE_RETRY_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1500;
pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_SOLAR_URL: &str = "https://api.sunrise-sunset.org";
pub const HTTP_USER_AGENT: &str = concat!("duskr/", env!("CARGO_PKG_VERSION"));

// ═══ Validation Limits ═══

pub const MINIMUM_LOOP_DELAY: u64 = 5;
pub const MAXIMUM_LOOP_DELAY: u64 = 3600;
pub const MINIMUM_CHECK_INTERVAL: u64 = 1;
pub const MAXIMUM_CHECK_INTERVAL: u64 = 600;
pub const MINIMUM_HTTP_TIMEOUT: u64 = 1;
pub const MAXIMUM_HTTP_TIMEOUT: u64 = 120;
pub const MINIMUM_PROBE_RETRIES: u32 = 1;
pub const MAXIMUM_PROBE_RETRIES: u32 = 20;
pub const MAXIMUM_PROBE_RETRY_INTERVAL_MS: u64 = 60_000;
pub const MINIMUM_PROBE_TIMEOUT_MS: u64 = 100;
pub const MAXIMUM_PROBE_TIMEOUT_MS: u64 = 10_000;
pub const MAXIMUM_OFFSET_MINUTES: i64 = 12 * 60; // offsets beyond half a day make no sense

// ═══ Theme Backends ═══

pub const GNOME_INTERFACE_SCHEMA: &str = "org.gnome.desktop.interface";
pub const GNOME_COLOR_SCHEME_KEY: &str = "color-scheme";
pub const GNOME_GTK_THEME_KEY: &str = "gtk-theme";
pub const GNOME_LIGHT_SCHEME: &str = "prefer-light";
pub const GNOME_DARK_SCHEME: &str = "prefer-dark";
pub const GNOME_LIGHT_GTK_THEME: &str = "Adwaita";
pub const GNOME_DARK_GTK_THEME: &str = "Adwaita-dark";

pub const WINDOWS_PERSONALIZE_KEY: &str =
    r"HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize";
pub const WINDOWS_APPS_VALUE: &str = "AppsUseLightTheme";
pub const WINDOWS_SYSTEM_VALUE: &str = "SystemUsesLightTheme";

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1;

#[cfg(test)]
pub mod test_constants {
    pub const TEST_LOCATION: &str = "Amsterdam";
    pub const TEST_LATITUDE: f64 = 52.3676;
    pub const TEST_LONGITUDE: f64 = 4.9041;
    pub const TEST_SUNRISE_OFFSET: &str = "+00:30";
    pub const TEST_SUNSET_OFFSET: &str = "-01:00";
}
