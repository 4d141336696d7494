//! Structured logging with box-drawing output.
//!
//! Every line duskr prints goes through the macros in this module so that the
//! daemon's output reads as one continuous tree:
//!
//! ```text
//! ┏ duskr v0.3.0 ━━╸
//! ┃
//! ┣ Loaded configuration
//! ┃   Location: Amsterdam
//! ┃
//! ┣ Switched to dark theme
//! ╹
//! ```
//!
//! ## Conventions
//!
//! - **`log_block_start!`** opens a new conceptual block (a refresh cycle, a
//!   theme switch). It prints a spacer pipe first.
//! - **`log_decorated!`** continues the current block with `┣ message`.
//! - **`log_indented!`** lists details that belong to the line above.
//! - **`log_pipe!`** inserts an empty `┃` line, typically right before a semantic
//!   `log_warning!`/`log_error!`/`log_debug!`.
//! - **`log_version!`** and **`log_end!`** frame the whole run.
//!
//! Output can be silenced with [`Log::set_enabled`] and redirected to a file with
//! [`Log::start_file_logging`], which `duskr simulate --log` uses.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Line(String),
    Shutdown,
}

/// Process-wide logging switches.
pub struct Log;

impl Log {
    /// Enable or disable all output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Route all further output to `file_path` instead of stdout.
    ///
    /// Lines are handed to a writer thread over a channel. The returned guard
    /// flushes and joins that thread when dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Line(text)) => file.write_all(text.as_bytes())?,
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix shown while running against a simulated clock.
    ///
    /// Empty in normal operation; the real clock is already visible to whoever
    /// reads the journal.
    pub fn timestamp_prefix() -> String {
        if crate::time_source::is_initialized() && crate::time_source::is_simulated() {
            format!("[{}] ", crate::time_source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Keeps the file writer alive; flushes on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remove `ESC [ ... m` colour sequences so log files stay readable.
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Write one already formatted chunk to the active sink. Used by the macros.
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Line(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Shared body of every logging macro: `$template` receives the timestamp
/// prefix and the formatted message.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($template:literal, $($arg:tt)+) => {{
        if $crate::logger::Log::is_enabled() {
            let prefix = $crate::logger::Log::timestamp_prefix();
            let message = format!($($arg)+);
            $crate::logger::write_output(&format!($template, prefix = prefix, message = message));
        }
    }};
}

/// Continue the current block: `┣ message`.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => {
        $crate::__log_line!("{prefix}┣ {message}\n", $($arg)+)
    };
}

/// Detail line under the previous message: `┃   message`.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => {
        $crate::__log_line!("{prefix}┃   {message}\n", $($arg)+)
    };
}

/// Empty spacer line.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::__log_line!("{prefix}┃{message}\n", "")
    };
}

/// Open a new block: spacer pipe followed by `┣ message`.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => {
        $crate::__log_line!("{prefix}┃\n{prefix}┣ {message}\n", $($arg)+)
    };
}

/// Startup header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::__log_line!(
            "{prefix}┏ duskr v{message} ━━╸\n",
            "{}",
            env!("CARGO_PKG_VERSION")
        )
    };
}

/// Final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::__log_line!("{prefix}╹{message}\n", "")
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::__log_line!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n", $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::__log_line!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n", $($arg)+)
    };
}

/// Error that ends the run: closes the tree with `┗`.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => {
        $crate::__log_line!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n", $($arg)+)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::__log_line!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {message}\n", $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes_removes_colours() {
        let coloured = "┣[\x1b[33mWARNING\x1b[0m] offline";
        assert_eq!(strip_ansi_codes(coloured), "┣[WARNING] offline");
    }

    #[test]
    fn test_strip_ansi_codes_keeps_plain_escape() {
        assert_eq!(strip_ansi_codes("a\x1bb"), "a\x1bb");
    }

    #[test]
    fn test_file_log_is_flushed_when_guard_drops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simulation.log");

        let guard = Log::start_file_logging(path.to_string_lossy().into_owned()).unwrap();
        write_output("┗[\x1b[31mERROR\x1b[0m] simulation failed\n");
        drop(guard);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("┗[ERROR] simulation failed"));
    }
}
