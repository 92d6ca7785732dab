//! Millisecond time source for the tuner.
//!
//! Times are plain `u32` millisecond counters that are allowed to wrap, the
//! same shape as an Arduino style `millis()` or a truncated
//! `embassy_time::Instant`. Every comparison goes through [`elapsed_ms`].

/// Source of a wrapping millisecond counter.
pub trait MonotonicClock {
    fn now_ms(&self) -> u32;
}

impl<F> MonotonicClock for F
where
    F: Fn() -> u32,
{
    fn now_ms(&self) -> u32 {
        self()
    }
}

/// Milliseconds from `since` to `now`, correct across one counter wrap.
#[inline]
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Clock backed by the embassy time driver.
#[cfg(feature = "embassy")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy")]
impl MonotonicClock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation keeps the wrapping semantics of the rate gate.
        embassy_time::Instant::now().as_millis() as u32
    }
}
