//! # duskr library
//!
//! Internal library for the duskr binary.
//!
//! This library exists to enable testing of the scheduler and its collaborators
//! and to keep CLI dispatch (main.rs) separate from application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: [`Duskr`] loads configuration, builds the collaborators and
//!   runs the loop
//! - **Core Logic**: `scheduler` holds the tick algorithm and its state
//! - **Collaborators**: `net` (connectivity probe), `geo` (location lookup),
//!   `solar` (sunrise/sunset windows), `theme` (desktop theme backends)
//! - **Configuration**: `config` for TOML settings with validation
//! - **Commands**: `commands` for the one-shot CLI subcommands
//! - **Infrastructure**: signal handling, the time source and logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod net;
pub mod scheduler;
pub mod signals;
pub mod solar;
pub mod theme;
pub mod time_source;

mod duskr;

pub use duskr::{Duskr, apply_config_dir, build_scheduler};
