//! Peak bookkeeping for the relay oscillation.
//!
//! Peaks are written at the slot of the current cycle count: every window
//! maximum of a cycle overwrites the slot, so once a cycle completes its
//! slot holds the highest sample of that cycle. A window minimum after a
//! maximum closes the cycle.

use heapless::Vec;

use crate::clock::elapsed_ms;
use crate::log::*;
use crate::PEAK_CAPACITY;

/// Kind of the last extremum seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeakKind {
    None,
    Maximum,
    Minimum,
}

pub struct PeakTracker {
    kind: PeakKind,
    cycles: usize,
    peaks: Vec<f32, PEAK_CAPACITY>,
    ultimate_ms: u32,
    penultimate_ms: u32,
}

impl PeakTracker {
    pub const fn new() -> Self {
        Self {
            kind: PeakKind::None,
            cycles: 0,
            peaks: Vec::new(),
            ultimate_ms: 0,
            penultimate_ms: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Record a window maximum observed at `now_ms`.
    pub fn on_maximum(&mut self, value: f32, now_ms: u32) {
        if self.kind == PeakKind::Minimum {
            // First maximum of a new cycle.
            self.penultimate_ms = self.ultimate_ms;
        }
        self.kind = PeakKind::Maximum;
        self.ultimate_ms = now_ms;
        self.store(self.cycles, value);
    }

    /// Record a window minimum.
    pub fn on_minimum(&mut self, value: f32) {
        if self.kind == PeakKind::Maximum {
            self.cycles += 1;
        }
        self.kind = PeakKind::Minimum;
        self.store(self.cycles, value);
    }

    fn store(&mut self, slot: usize, value: f32) -> bool {
        if slot >= PEAK_CAPACITY {
            warn!("Peak record full, dropping peak for cycle {}", slot);
            return false;
        }
        if let Some(peak) = self.peaks.get_mut(slot) {
            *peak = value;
            return true;
        }
        if slot == self.peaks.len() {
            return self.peaks.push(value).is_ok();
        }
        false
    }

    pub fn kind(&self) -> PeakKind {
        self.kind
    }

    /// Completed maximum to minimum transitions.
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }

    pub fn is_full(&self) -> bool {
        self.cycles >= PEAK_CAPACITY
    }

    /// Mean distance between the last three completed cycle peaks.
    pub fn separation(&self) -> Option<f32> {
        if self.cycles <= 2 {
            return None;
        }
        let n = self.cycles;
        let last = *self.peaks.get(n - 1)?;
        let previous = *self.peaks.get(n - 2)?;
        let before = *self.peaks.get(n - 3)?;
        Some(((last - previous).abs() + (previous - before).abs()) / 2.0)
    }

    /// Time between the two most recent cycle maxima.
    pub fn period_ms(&self) -> Option<u32> {
        if self.cycles <= 2 {
            return None;
        }
        Some(elapsed_ms(self.ultimate_ms, self.penultimate_ms))
    }
}

impl Default for PeakTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One full cycle: rising maxima then a falling minimum.
    fn cycle(tracker: &mut PeakTracker, peak: f32, trough: f32, peak_ms: u32) {
        tracker.on_maximum(peak - 0.5, peak_ms - 1000);
        tracker.on_maximum(peak, peak_ms);
        tracker.on_minimum(trough);
        tracker.on_minimum(trough - 0.5);
    }

    #[test]
    fn minimum_after_maximum_closes_a_cycle() {
        let mut tracker = PeakTracker::new();
        tracker.on_minimum(1.0);
        assert_eq!(tracker.cycles(), 0);
        assert_eq!(tracker.kind(), PeakKind::Minimum);

        tracker.on_maximum(5.0, 1000);
        assert_eq!(tracker.cycles(), 0);
        tracker.on_minimum(2.0);
        assert_eq!(tracker.cycles(), 1);
        tracker.on_minimum(1.5);
        assert_eq!(tracker.cycles(), 1);
        assert_eq!(tracker.peaks(), &[5.0, 1.5]);
    }

    #[test]
    fn completed_slots_hold_cycle_maxima() {
        let mut tracker = PeakTracker::new();
        cycle(&mut tracker, 10.0, 0.0, 100_000);
        cycle(&mut tracker, 11.0, 0.0, 300_000);
        cycle(&mut tracker, 12.0, 0.0, 500_000);
        assert_eq!(tracker.cycles(), 3);
        assert_eq!(&tracker.peaks()[..3], &[10.0, 11.0, 12.0]);
        assert_eq!(tracker.separation(), Some(1.0));
        assert_eq!(tracker.period_ms(), Some(200_000));
    }

    #[test]
    fn no_separation_before_three_cycles() {
        let mut tracker = PeakTracker::new();
        cycle(&mut tracker, 10.0, 0.0, 100_000);
        cycle(&mut tracker, 10.0, 0.0, 300_000);
        assert_eq!(tracker.separation(), None);
        assert_eq!(tracker.period_ms(), None);
    }

    #[test]
    fn period_survives_counter_wrap() {
        let mut tracker = PeakTracker::new();
        let start = u32::MAX - 250_000;
        cycle(&mut tracker, 10.0, 0.0, start);
        cycle(&mut tracker, 10.0, 0.0, start.wrapping_add(200_000));
        cycle(&mut tracker, 10.0, 0.0, start.wrapping_add(400_000));
        assert_eq!(tracker.period_ms(), Some(200_000));
    }

    #[test]
    fn record_stops_at_capacity() {
        let mut tracker = PeakTracker::new();
        for i in 0..PEAK_CAPACITY as u32 + 2 {
            cycle(&mut tracker, 10.0 + i as f32, 0.0, (i + 1) * 200_000);
        }
        assert_eq!(tracker.cycles(), PEAK_CAPACITY + 2);
        assert!(tracker.is_full());
        assert_eq!(tracker.peaks().len(), PEAK_CAPACITY);
    }
}
