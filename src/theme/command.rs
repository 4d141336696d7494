//! Backend running user-supplied shell commands.
//!
//! For desktops without a supported settings store:
//!
//! ```toml
//! backend = "command"
//! light_command = "plasma-apply-colorscheme BreezeLight"
//! dark_command = "plasma-apply-colorscheme BreezeDark"
//! ```
//!
//! There is nothing to query, so the backend remembers the last phase it
//! applied successfully and treats a repeat as unchanged.

use std::process::Command;

use super::{ApplyOutcome, ThemeApplier};
use crate::error::ThemeError;
use crate::solar::Phase;

pub struct CommandTheme {
    light_command: String,
    dark_command: String,
    last_applied: Option<Phase>,
    debug_enabled: bool,
}

impl CommandTheme {
    pub fn new(light_command: &str, dark_command: &str, debug_enabled: bool) -> Self {
        Self {
            light_command: light_command.to_string(),
            dark_command: dark_command.to_string(),
            last_applied: None,
            debug_enabled,
        }
    }

    fn run(&self, command_line: &str) -> Result<(), ThemeError> {
        if self.debug_enabled {
            log_indented!("Running: {command_line}");
        }

        let mut command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.args(["/C", command_line]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command_line]);
            c
        };

        let output = command
            .output()
            .map_err(|e| ThemeError::StoreUnavailable(format!("{command_line}: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ThemeError::from_command_failure(command_line, &stderr))
        }
    }
}

impl ThemeApplier for CommandTheme {
    fn apply(&mut self, phase: Phase, force: bool) -> Result<ApplyOutcome, ThemeError> {
        if !force && self.last_applied == Some(phase) {
            return Ok(ApplyOutcome::Unchanged);
        }

        let command_line = match phase {
            Phase::Light => self.light_command.clone(),
            Phase::Dark => self.dark_command.clone(),
        };
        self.run(&command_line)?;
        self.last_applied = Some(phase);

        Ok(ApplyOutcome::Changed)
    }

    fn backend_name(&self) -> &'static str {
        "Command"
    }
}
