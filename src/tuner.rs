//! Relay-feedback auto-tuner.
//!
//! Poll driven and allocation free: the caller feeds the clock, the tuner
//! samples the process slot at most once per sample period, drives the
//! relay and tracks the resulting oscillation until it either settles or
//! the peak record fills up.

use serde::{Deserialize, Serialize};

use crate::clock::{elapsed_ms, MonotonicClock};
use crate::config::TunerConfig;
use crate::gains::{ultimate_gain, PidGains, UltimateParameters};
use crate::log::*;
use crate::peaks::{PeakKind, PeakTracker};
use crate::report::TuningReport;
use crate::slot::{ActuatorOutput, ProcessInput};
use crate::window::{Extremum, ExtremumWindow};

/// Peaks closer together than this fraction of the peak-to-peak swing count
/// as a stable oscillation.
const STABLE_SEPARATION: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TunerState {
    /// Filling the extremum window.
    Accumulating,
    /// Tracking peaks.
    Oscillating,
    Converged,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Termination {
    /// The last three peaks agreed.
    Stable,
    /// The peak record filled up first.
    PeakLimit,
}

pub struct RelayTuner<I, O> {
    input: I,
    output: O,
    config: TunerConfig,
    last_sample_ms: u32,
    input_min: f32,
    input_max: f32,
    window: ExtremumWindow,
    peaks: PeakTracker,
    ultimate: UltimateParameters,
    termination: Option<Termination>,
}

impl<I, O> RelayTuner<I, O>
where
    I: ProcessInput,
    O: ActuatorOutput,
{
    /// Bind the tuner to its slots and start a run at `now_ms`.
    pub fn new(input: I, output: O, config: TunerConfig, now_ms: u32) -> Self {
        let mut tuner = Self {
            input,
            output,
            config,
            last_sample_ms: now_ms,
            input_min: 0.0,
            input_max: 0.0,
            window: ExtremumWindow::new(),
            peaks: PeakTracker::new(),
            ultimate: UltimateParameters::default(),
            termination: None,
        };
        tuner.reset(now_ms);
        tuner
    }

    /// Discard any run in progress and start over at `now_ms`.
    ///
    /// The relay output is left wherever it currently is.
    pub fn reset(&mut self, now_ms: u32) {
        self.last_sample_ms = now_ms;
        self.termination = None;
        self.peaks.reset();
        self.window.clear();
        let current = self.input.read();
        self.input_min = current;
        self.input_max = current;
        self.ultimate = UltimateParameters::default();
        debug!("Tuner reset, process value {}", current);
    }

    /// Replace the configuration and restart.
    pub fn reconfigure(&mut self, config: TunerConfig, now_ms: u32) {
        self.config = config;
        self.reset(now_ms);
    }

    /// [`reset`](Self::reset) using the time of `clock`.
    pub fn reset_with<C: MonotonicClock>(&mut self, clock: &C) {
        self.reset(clock.now_ms());
    }

    /// [`step`](Self::step) using the time of `clock`.
    pub fn poll<C: MonotonicClock>(&mut self, clock: &C) -> bool {
        self.step(clock.now_ms())
    }

    /// Advance the tuner. Returns `true` once tuning has finished.
    ///
    /// Calls closer together than the sample period are no-ops.
    pub fn step(&mut self, now_ms: u32) -> bool {
        if self.termination.is_some() {
            return true;
        }
        if elapsed_ms(now_ms, self.last_sample_ms) < self.config.sample_period_ms {
            return false;
        }
        self.last_sample_ms = now_ms;

        let current = self.input.read();
        if current > self.input_max {
            self.input_max = current;
        }
        if current < self.input_min {
            self.input_min = current;
        }

        self.drive_relay(current);

        let was_valid = self.window.is_valid();
        let extremum = self.window.push(current);
        if !self.window.is_valid() {
            return false;
        }
        if !was_valid {
            info!("Extremum window filled, tracking oscillation");
        }

        if let Some(extremum) = extremum {
            self.on_extremum(extremum, current, now_ms);
        }

        if self.termination.is_none() && self.peaks.is_full() {
            warn!(
                "No stable oscillation after {} cycles, stopping",
                self.peaks.cycles()
            );
            self.finish(Termination::PeakLimit);
        }

        self.termination.is_some()
    }

    /// Bang-bang with hysteresis: inside the band the relay holds its level.
    fn drive_relay(&mut self, current: f32) {
        if current > self.config.upper_threshold() {
            self.output.write(self.config.output_low);
        } else if current < self.config.lower_threshold() {
            self.output.write(self.config.output_high);
        }
    }

    fn on_extremum(&mut self, extremum: Extremum, current: f32, now_ms: u32) {
        match extremum {
            Extremum::Maximum => {
                self.peaks.on_maximum(current, now_ms);
                debug!("Maximum {} at {} ms", current, now_ms);
            }
            Extremum::Minimum => {
                self.peaks.on_minimum(current);
                debug!(
                    "Minimum {}, {} cycles complete",
                    current,
                    self.peaks.cycles()
                );
            }
        }

        let amplitude = self.amplitude();
        if let Some(ku) = ultimate_gain(self.config.relay_amplitude(), amplitude) {
            self.ultimate.ku = ku;
        }

        if let Some(period_ms) = self.peaks.period_ms() {
            self.ultimate.pu = period_ms as f32 / 1000.0;
        }

        if let Some(separation) = self.peaks.separation() {
            if separation < STABLE_SEPARATION * amplitude {
                self.finish(Termination::Stable);
            }
        }
    }

    fn finish(&mut self, termination: Termination) {
        self.termination = Some(termination);
        let gains = self.gains();
        info!(
            "Tuning finished: Ku={} Pu={}s Kp={} Ki={} Kd={}",
            self.ultimate.ku, self.ultimate.pu, gains.kp, gains.ki, gains.kd
        );
    }

    /// Proportional gain. Meaningful once [`step`](Self::step) returned `true`.
    pub fn kp(&self) -> f32 {
        self.gains().kp
    }

    /// Integral gain.
    pub fn ki(&self) -> f32 {
        self.gains().ki
    }

    /// Derivative gain.
    pub fn kd(&self) -> f32 {
        self.gains().kd
    }

    pub fn gains(&self) -> PidGains {
        PidGains::from_ultimate(self.config.rule, self.ultimate)
    }

    pub fn ultimate(&self) -> UltimateParameters {
        self.ultimate
    }

    pub fn state(&self) -> TunerState {
        if self.termination.is_some() {
            TunerState::Converged
        } else if self.window.is_valid() {
            TunerState::Oscillating
        } else {
            TunerState::Accumulating
        }
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn is_finished(&self) -> bool {
        self.termination.is_some()
    }

    pub fn cycle_count(&self) -> usize {
        self.peaks.cycles()
    }

    pub fn peak_kind(&self) -> PeakKind {
        self.peaks.kind()
    }

    pub fn peaks(&self) -> &[f32] {
        self.peaks.peaks()
    }

    /// Number of samples currently held by the extremum window.
    pub fn samples_held(&self) -> usize {
        self.window.len()
    }

    /// Lowest and highest process value since the last reset.
    pub fn extrema(&self) -> (f32, f32) {
        (self.input_min, self.input_max)
    }

    /// Peak-to-peak swing of the process value since the last reset.
    pub fn amplitude(&self) -> f32 {
        self.input_max - self.input_min
    }

    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    pub fn report(&self) -> TuningReport {
        TuningReport {
            state: self.state(),
            termination: self.termination,
            ultimate: self.ultimate,
            gains: self.gains(),
            cycles: self.peaks.cycles() as u32,
            amplitude: self.amplitude(),
        }
    }
}
