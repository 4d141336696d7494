//! GNOME backend driving `gsettings`.
//!
//! Two keys under `org.gnome.desktop.interface` are kept in sync:
//! - `color-scheme` (`prefer-light` / `prefer-dark`), read by libadwaita apps
//! - `gtk-theme` (e.g. `Adwaita` / `Adwaita-dark`), used by the shell and legacy
//!   GTK applications

use super::{ApplyOutcome, ThemeApplier, needs_write, run_settings_command};
use crate::constants::*;
use crate::error::ThemeError;
use crate::solar::Phase;

pub struct GnomeTheme {
    light_gtk_theme: String,
    dark_gtk_theme: String,
    debug_enabled: bool,
}

impl GnomeTheme {
    pub fn new(light_gtk_theme: &str, dark_gtk_theme: &str, debug_enabled: bool) -> Self {
        Self {
            light_gtk_theme: light_gtk_theme.to_string(),
            dark_gtk_theme: dark_gtk_theme.to_string(),
            debug_enabled,
        }
    }

    fn read_key(&self, key: &str) -> Result<String, ThemeError> {
        run_settings_command("gsettings", &["get", GNOME_INTERFACE_SCHEMA, key])
            .map(|raw| unquote(&raw).to_string())
    }

    fn write_key(&self, key: &str, value: &str) -> Result<(), ThemeError> {
        if self.debug_enabled {
            log_indented!("gsettings set {GNOME_INTERFACE_SCHEMA} {key} {value}");
        }
        run_settings_command("gsettings", &["set", GNOME_INTERFACE_SCHEMA, key, value]).map(|_| ())
    }
}

impl ThemeApplier for GnomeTheme {
    fn apply(&mut self, phase: Phase, force: bool) -> Result<ApplyOutcome, ThemeError> {
        let app_light = self
            .read_key(GNOME_COLOR_SCHEME_KEY)
            .ok()
            .map(|scheme| scheme_is_light(&scheme));
        let system_light = self
            .read_key(GNOME_GTK_THEME_KEY)
            .ok()
            .and_then(|theme| {
                classify_gtk_theme(&theme, &self.light_gtk_theme, &self.dark_gtk_theme)
            });

        if !needs_write(app_light, system_light, phase, force) {
            return Ok(ApplyOutcome::Unchanged);
        }

        let (scheme, gtk_theme) = match phase {
            Phase::Light => (GNOME_LIGHT_SCHEME, self.light_gtk_theme.as_str()),
            Phase::Dark => (GNOME_DARK_SCHEME, self.dark_gtk_theme.as_str()),
        };
        self.write_key(GNOME_COLOR_SCHEME_KEY, scheme)?;
        self.write_key(GNOME_GTK_THEME_KEY, gtk_theme)?;

        Ok(ApplyOutcome::Changed)
    }

    fn backend_name(&self) -> &'static str {
        "GNOME"
    }
}

/// Whether `gsettings` can be executed and knows the interface schema.
pub fn gsettings_available() -> bool {
    run_settings_command("gsettings", &["list-keys", GNOME_INTERFACE_SCHEMA])
        .map(|keys| keys.lines().any(|key| key.trim() == GNOME_COLOR_SCHEME_KEY))
        .unwrap_or(false)
}

/// `gsettings get` prints GVariant strings: `'prefer-dark'`.
fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches('\'')
}

/// `default` and `prefer-light` both render light.
fn scheme_is_light(scheme: &str) -> bool {
    scheme != GNOME_DARK_SCHEME
}

/// Light or dark by the configured theme names; `None` for any other theme,
/// which then gets overwritten.
fn classify_gtk_theme(theme: &str, light_theme: &str, dark_theme: &str) -> Option<bool> {
    if theme == light_theme {
        Some(true)
    } else if theme == dark_theme {
        Some(false)
    } else {
        None
    }
}
