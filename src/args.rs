//! Command-line argument parsing and processing.
//!
//! Hand-rolled parsing into a [`CliAction`]. Global flags (`--debug`,
//! `--config`) may appear before or after a subcommand.

use crate::solar::Phase;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the scheduler loop
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Print today's window and the current phase without applying anything
    Status {
        debug_enabled: bool,
        json: bool,
        config_dir: Option<String>,
    },
    /// Apply a theme once
    Set {
        debug_enabled: bool,
        phase: Phase,
        force: bool,
        config_dir: Option<String>,
    },
    /// Run the scheduler against a simulated clock
    Simulate {
        debug_enabled: bool,
        start_time: String,
        end_time: String,
        multiplier: f64,
        log_to_file: bool,
        config_dir: Option<String>,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut config_dir: Option<String> = None;
        let mut positionals: Vec<String> = Vec::new();
        let mut force = false;
        let mut log_to_file = false;
        let mut json = false;
        let mut invalid = false;

        let mut iter = args.into_iter().skip(1).map(|s| s.as_ref().to_string());
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--force" | "-f" => force = true,
                "--log" => log_to_file = true,
                "--json" => json = true,
                "--config" | "-c" => match iter.next() {
                    Some(dir) if !dir.starts_with('-') => config_dir = Some(dir),
                    _ => invalid = true,
                },
                other if other.starts_with('-') && other.len() > 1 && !is_negative_number(other) => {
                    invalid = true
                }
                _ => positionals.push(arg),
            }
        }

        // Version takes precedence over help, help over everything else
        let action = if display_version {
            CliAction::ShowVersion
        } else if display_help {
            CliAction::ShowHelp
        } else if invalid {
            CliAction::ShowHelpDueToError
        } else {
            Self::action_for(
                positionals,
                Flags {
                    debug_enabled,
                    force,
                    log_to_file,
                    json,
                },
                config_dir,
            )
        };

        ParsedArgs { action }
    }

    fn action_for(positionals: Vec<String>, flags: Flags, config_dir: Option<String>) -> CliAction {
        let Flags {
            debug_enabled,
            force,
            log_to_file,
            json,
        } = flags;

        let mut words = positionals.into_iter();
        let Some(command) = words.next() else {
            if force || log_to_file || json {
                return CliAction::ShowHelpDueToError;
            }
            return CliAction::Run {
                debug_enabled,
                config_dir,
            };
        };
        let rest: Vec<String> = words.collect();

        match command.as_str() {
            "status" if rest.is_empty() && !force && !log_to_file => CliAction::Status {
                debug_enabled,
                json,
                config_dir,
            },
            "set" if rest.len() == 1 && !log_to_file && !json => {
                let phase = match rest[0].to_lowercase().as_str() {
                    "light" => Phase::Light,
                    "dark" => Phase::Dark,
                    _ => return CliAction::ShowHelpDueToError,
                };
                CliAction::Set {
                    debug_enabled,
                    phase,
                    force,
                    config_dir,
                }
            }
            "simulate" if (2..=3).contains(&rest.len()) && !force && !json => {
                let multiplier = match rest.get(2) {
                    Some(raw) => match raw.parse::<f64>() {
                        Ok(m) if m >= 0.0 && m.is_finite() => m,
                        _ => return CliAction::ShowHelpDueToError,
                    },
                    None => 0.0,
                };
                CliAction::Simulate {
                    debug_enabled,
                    start_time: rest[0].clone(),
                    end_time: rest[1].clone(),
                    multiplier,
                    log_to_file,
                    config_dir,
                }
            }
            _ => CliAction::ShowHelpDueToError,
        }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Boolean switches collected before the subcommand is known.
struct Flags {
    debug_enabled: bool,
    force: bool,
    log_to_file: bool,
    json: bool,
}

fn is_negative_number(arg: &str) -> bool {
    arg.parse::<f64>().is_ok()
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!("{}", env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("duskr [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("status [--json]        Show today's sunrise/sunset and the current phase");
    log_indented!("set <light|dark>       Apply a theme once (--force rewrites matching settings)");
    log_indented!("simulate <start> <end> [multiplier] [--log]");
    log_indented!("                       Run against a simulated clock");
    log_indented!("                       Times are \"YYYY-MM-DD HH:MM:SS\", multiplier 0 = fast-forward");
    log_end!();
}
