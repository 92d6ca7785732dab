//! Relay-feedback PID auto-tuning for `no_std` control loops.
//!
//! The tuner drives a two-level relay output into a process, watches the
//! process variable oscillate around the setpoint, measures the ultimate
//! gain and period of that oscillation and turns them into PID gains.
//!
//! ```ignore
//! let temperature = Cell::new(read_thermocouple());
//! let heater = Cell::new(0.0);
//! let mut tuner = RelayTuner::new(&temperature, &heater, TunerConfig::default(), now_ms());
//!
//! loop {
//!     temperature.set(read_thermocouple());
//!     if tuner.step(now_ms()) {
//!         break;
//!     }
//!     drive_heater(heater.get());
//! }
//! let gains = tuner.gains();
//! ```

#![no_std]

#[cfg(feature = "defmt")]
pub use defmt as log;

#[cfg(not(feature = "defmt"))]
pub use log;

pub mod clock;
pub mod config;
pub mod gains;
pub mod peaks;
pub mod report;
pub mod slot;
pub mod tuner;
pub mod window;

pub use clock::MonotonicClock;
pub use config::{ConfigError, TunerConfig};
pub use gains::{PidGains, TuningRule, UltimateParameters};
pub use report::{ReportError, TuningReport};
pub use slot::{ActuatorOutput, ProcessInput, SharedSlot};
pub use tuner::{RelayTuner, Termination, TunerState};

/// Number of process samples the extremum window holds.
pub const WINDOW_LEN: usize = 100;

/// Number of peaks recorded before the tuner gives up waiting for a stable
/// oscillation.
pub const PEAK_CAPACITY: usize = 10;
