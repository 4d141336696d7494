//! Main application entry point and CLI dispatch.
//!
//! Parses arguments, applies `--config`, and hands each action to the library:
//! the scheduler loop through [`Duskr`], one-shot commands through
//! `duskr::commands`.

use anyhow::Result;

use duskr::args::{self, CliAction, ParsedArgs};
use duskr::constants::EXIT_FAILURE;
use duskr::{Duskr, apply_config_dir, commands, log_end, log_error_exit, log_pipe};

fn main() -> Result<()> {
    let parsed_args = ParsedArgs::from_env();

    match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
        } => {
            apply_config_dir(config_dir)?;
            exit_on_error(Duskr::new(debug_enabled).run())
        }
        CliAction::Status {
            debug_enabled,
            json,
            config_dir,
        } => {
            apply_config_dir(config_dir)?;
            exit_on_error(commands::status::handle_status_command(json, debug_enabled))
        }
        CliAction::Set {
            debug_enabled,
            phase,
            force,
            config_dir,
        } => {
            apply_config_dir(config_dir)?;
            // The command logs its own failure
            if commands::set::handle_set_command(phase, force, debug_enabled).is_err() {
                std::process::exit(EXIT_FAILURE);
            }
            Ok(())
        }
        CliAction::Simulate {
            debug_enabled,
            start_time,
            end_time,
            multiplier,
            log_to_file,
            config_dir,
        } => {
            apply_config_dir(config_dir)?;
            // Keep the guard alive for the duration of the simulation
            let log_guard = commands::simulate::handle_simulate_command(
                &start_time,
                &end_time,
                multiplier,
                log_to_file,
                debug_enabled,
            )?;
            let result = Duskr::new(debug_enabled).without_headers().run();
            if let Err(e) = &result {
                log_fatal(e);
            }
            // Flush the log file before a possible exit
            drop(log_guard);
            if result.is_err() {
                std::process::exit(EXIT_FAILURE);
            }
            Ok(())
        }
    }
}

/// Print a fatal error in the log style.
fn log_fatal(e: &anyhow::Error) {
    log_pipe!();
    log_error_exit!("{e:#}");
    log_end!();
}

/// Report a fatal error and exit non-zero.
fn exit_on_error(result: Result<()>) -> Result<()> {
    if let Err(e) = result {
        log_fatal(&e);
        std::process::exit(EXIT_FAILURE);
    }
    Ok(())
}
