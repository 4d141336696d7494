//! Command-line command handlers for duskr.
//!
//! One-shot commands that share the scheduler's collaborators without running
//! its loop. Each command lives in its own submodule.

pub mod set;
pub mod simulate;
pub mod status;
