//! Clock abstraction shared by the scheduler, the logger and `duskr simulate`.
//!
//! The scheduler never calls `Local::now()` or `thread::sleep` directly; it asks a
//! [`TimeSource`]. Production uses [`RealTimeSource`], `duskr simulate` installs a
//! [`SimulatedTimeSource`], and tests substitute their own recording clocks.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex};
use std::time::{Duration as StdDuration, Instant};

/// Process-wide source, read by the logger for simulation timestamps.
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

pub trait TimeSource: Send + Sync {
    /// Current local time.
    fn now(&self) -> DateTime<Local>;

    /// Block for `duration` (or advance simulated time by it).
    fn sleep(&self, duration: StdDuration);

    fn is_simulated(&self) -> bool;

    /// Whether a simulation has reached its end. Always false for real time.
    fn is_ended(&self) -> bool {
        false
    }
}

pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Accelerated clock running from `start` to `end`.
///
/// With a positive multiplier, simulated time advances `multiplier` times faster
/// than real time while sleeping. A multiplier of `0.0` selects fast-forward: every
/// sleep jumps the clock instantly.
pub struct SimulatedTimeSource {
    start: DateTime<Local>,
    end: DateTime<Local>,
    multiplier: f64,
    /// Simulated time consumed by completed sleeps.
    elapsed: Mutex<ChronoDuration>,
    /// Sleep in progress: real start instant and simulated length.
    in_flight: Mutex<Option<(Instant, ChronoDuration)>>,
}

impl SimulatedTimeSource {
    pub fn new(start: DateTime<Local>, end: DateTime<Local>, multiplier: f64) -> Self {
        Self {
            start,
            end,
            multiplier: if multiplier < 0.0 { 0.0 } else { multiplier },
            elapsed: Mutex::new(ChronoDuration::zero()),
            in_flight: Mutex::new(None),
        }
    }

    pub fn is_fast_forward(&self) -> bool {
        self.multiplier == 0.0
    }

    fn current(&self) -> DateTime<Local> {
        let mut elapsed = *self.elapsed.lock().unwrap_or_else(|e| e.into_inner());

        if !self.is_fast_forward()
            && let Some((started, length)) = *self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
        {
            let real = started.elapsed().as_secs_f64() * self.multiplier;
            let progressed = ChronoDuration::milliseconds((real * 1000.0) as i64);
            elapsed += progressed.min(length);
        }

        (self.start + elapsed).min(self.end)
    }

    fn remaining(&self) -> ChronoDuration {
        self.end - self.current()
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        self.current()
    }

    fn sleep(&self, duration: StdDuration) {
        let requested = ChronoDuration::from_std(duration).unwrap_or_else(|_| self.end - self.start);
        let step = requested.min(self.remaining());
        if step <= ChronoDuration::zero() {
            return;
        }

        if self.is_fast_forward() {
            // Yield briefly so log output keeps up with the jumping clock
            std::thread::sleep(StdDuration::from_millis(1));
        } else {
            *self.in_flight.lock().unwrap_or_else(|e| e.into_inner()) =
                Some((Instant::now(), step));
            let real_secs = step.num_milliseconds() as f64 / 1000.0 / self.multiplier;
            std::thread::sleep(StdDuration::from_secs_f64(real_secs));
            *self.in_flight.lock().unwrap_or_else(|e| e.into_inner()) = None;
        }

        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner()) += step;
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.current() >= self.end
    }
}

/// Install the process-wide source. Only the first call has an effect.
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// The installed source, defaulting to real time.
pub fn global() -> Arc<dyn TimeSource> {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .clone()
}

pub fn now() -> DateTime<Local> {
    global().now()
}

pub fn is_simulated() -> bool {
    global().is_simulated()
}

/// Parse `YYYY-MM-DD HH:MM:SS` as a local time.
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?;

    Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| format!("Ambiguous or invalid local time: {s}"))
}
