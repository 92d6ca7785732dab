use heapless::HistoryBuffer;

use crate::WINDOW_LEN;

/// Classification of a sample against the window that precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Extremum {
    Maximum,
    Minimum,
}

/// Sliding window over the last [`WINDOW_LEN`] process samples.
///
/// A sample is a window maximum when it is strictly above every stored
/// sample and a window minimum when strictly below all of them. Nothing is
/// classified until the window has been filled once.
pub struct ExtremumWindow {
    samples: HistoryBuffer<f32, WINDOW_LEN>,
}

impl ExtremumWindow {
    pub fn new() -> Self {
        Self {
            samples: HistoryBuffer::new(),
        }
    }

    /// Classify `value` against the current window, then store it.
    pub fn push(&mut self, value: f32) -> Option<Extremum> {
        let extremum = self.classify(value);
        self.samples.write(value);
        extremum
    }

    fn classify(&self, value: f32) -> Option<Extremum> {
        if !self.is_valid() {
            return None;
        }
        let samples = self.samples.as_slice();
        if samples.iter().all(|&s| value > s) {
            Some(Extremum::Maximum)
        } else if samples.iter().all(|&s| value < s) {
            Some(Extremum::Minimum)
        } else {
            None
        }
    }

    /// True once the window has wrapped at least once.
    pub fn is_valid(&self) -> bool {
        self.samples.len() == self.samples.capacity()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }

    /// Most recently stored sample.
    pub fn latest(&self) -> Option<f32> {
        self.samples.recent().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for ExtremumWindow {
    fn default() -> Self {
        Self::new()
    }
}
