//! Signal handling for duskr.
//!
//! A background thread listens for SIGINT, SIGTERM and SIGHUP, clears the shared
//! `running` flag and wakes the scheduler through a channel so that a long
//! sleep ends immediately instead of at the next tick.

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, SendError, Sender};

/// Messages delivered from the signal thread to the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Shutdown signal (SIGTERM, SIGINT, SIGHUP)
    Shutdown,
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Atomic flag indicating if the application should keep running
    pub running: Arc<AtomicBool>,
    /// Channel receiver for signal messages
    pub signal_receiver: Receiver<SignalMessage>,
    /// Kept so the channel stays open on platforms without a listener thread
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// State with no listener attached, for one-shot commands and tests.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = std::sync::mpsc::channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }
}

/// Clear the running flag and wake the loop. Fails once the receiver is gone.
#[cfg(unix)]
fn notify_shutdown(
    running: &AtomicBool,
    sender: &Sender<SignalMessage>,
) -> Result<(), SendError<SignalMessage>> {
    running.store(false, Ordering::SeqCst);
    sender.send(SignalMessage::Shutdown)
}

/// Set up signal handling for the application.
///
/// Returns a SignalState containing the running flag and signal receiver channel.
#[cfg(unix)]
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    use anyhow::Context;
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let state = SignalState::detached();

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    let running = state.running.clone();
    let sender = state.signal_sender.clone();

    std::thread::spawn(move || {
        for sig in signals.forever() {
            if debug_enabled {
                log_pipe!();
                log_debug!("Received signal {sig}");
            }

            if notify_shutdown(&running, &sender).is_err() {
                // Receiver gone: the main loop has already exited
                break;
            }
        }
    });

    Ok(state)
}

#[cfg(not(unix))]
pub fn setup_signal_handler(_debug_enabled: bool) -> Result<SignalState> {
    Ok(SignalState::detached())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_shutdown_clears_flag_and_wakes_receiver() {
        let state = SignalState::detached();
        assert!(state.running.load(Ordering::SeqCst));

        notify_shutdown(&state.running, &state.signal_sender).unwrap();

        assert!(!state.running.load(Ordering::SeqCst));
        assert_eq!(
            state.signal_receiver.recv_timeout(Duration::from_millis(100)),
            Ok(SignalMessage::Shutdown)
        );
    }

    #[test]
    fn test_shutdown_reports_closed_channel() {
        let SignalState {
            running,
            signal_receiver,
            signal_sender,
        } = SignalState::detached();
        drop(signal_receiver);

        assert!(notify_shutdown(&running, &signal_sender).is_err());
        assert!(!running.load(Ordering::SeqCst));
    }
}
