//! Windows backend writing the personalisation registry values with `reg`.
//!
//! `AppsUseLightTheme` controls application windows, `SystemUsesLightTheme` the
//! taskbar and start menu. Both are `REG_DWORD` values under
//! `HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize`.

use super::{ApplyOutcome, ThemeApplier, needs_write, run_settings_command};
use crate::constants::*;
use crate::error::ThemeError;
use crate::solar::Phase;

pub struct WindowsTheme {
    debug_enabled: bool,
}

impl WindowsTheme {
    pub fn new(debug_enabled: bool) -> Self {
        Self { debug_enabled }
    }

    fn read_value(&self, name: &str) -> Option<bool> {
        run_settings_command("reg", &["query", WINDOWS_PERSONALIZE_KEY, "/v", name])
            .ok()
            .and_then(|stdout| parse_reg_dword(&stdout, name))
            .map(|value| value != 0)
    }

    fn write_value(&self, name: &str, light: bool) -> Result<(), ThemeError> {
        let data = if light { "1" } else { "0" };
        if self.debug_enabled {
            log_indented!("reg add {WINDOWS_PERSONALIZE_KEY} /v {name} /d {data}");
        }
        run_settings_command(
            "reg",
            &[
                "add",
                WINDOWS_PERSONALIZE_KEY,
                "/v",
                name,
                "/t",
                "REG_DWORD",
                "/d",
                data,
                "/f",
            ],
        )
        .map(|_| ())
    }
}

impl ThemeApplier for WindowsTheme {
    fn apply(&mut self, phase: Phase, force: bool) -> Result<ApplyOutcome, ThemeError> {
        let app_light = self.read_value(WINDOWS_APPS_VALUE);
        let system_light = self.read_value(WINDOWS_SYSTEM_VALUE);

        if !needs_write(app_light, system_light, phase, force) {
            return Ok(ApplyOutcome::Unchanged);
        }

        self.write_value(WINDOWS_APPS_VALUE, phase.is_light())?;
        self.write_value(WINDOWS_SYSTEM_VALUE, phase.is_light())?;

        Ok(ApplyOutcome::Changed)
    }

    fn backend_name(&self) -> &'static str {
        "Windows"
    }
}

/// Extract a DWORD from `reg query` output:
///
/// ```text
/// HKEY_CURRENT_USER\Software\...\Personalize
///     AppsUseLightTheme    REG_DWORD    0x1
/// ```
fn parse_reg_dword(stdout: &str, name: &str) -> Option<u32> {
    stdout.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        if fields.next()? != name || fields.next()? != "REG_DWORD" {
            return None;
        }
        let raw = fields.next()?;
        u32::from_str_radix(raw.trim_start_matches("0x"), 16).ok()
    })
}
