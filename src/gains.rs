//! Ultimate gain estimation and Ziegler–Nichols style gain rules.
//!
//! - Ku from the relay describing function: `4·d / (π·a)`
//! - PID gains as fixed multiples of Ku and Pu

use core::f32::consts::PI;
use serde::{Deserialize, Serialize};

/// Ultimate gain and period measured from a relay oscillation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UltimateParameters {
    pub ku: f32,
    /// Seconds.
    pub pu: f32,
}

impl Default for UltimateParameters {
    /// Unity fallbacks used before anything has been measured.
    fn default() -> Self {
        Self { ku: 1.0, pu: 1.0 }
    }
}

/// Ultimate gain for a relay swinging `relay_amplitude` between its levels
/// while the process swings `oscillation_amplitude` peak to peak.
///
/// Returns `None` for a flat signal instead of a non-finite gain.
pub fn ultimate_gain(relay_amplitude: f32, oscillation_amplitude: f32) -> Option<f32> {
    if oscillation_amplitude <= 0.0 {
        return None;
    }
    let ku = 4.0 * relay_amplitude / (PI * oscillation_amplitude);
    if ku.is_finite() {
        Some(ku)
    } else {
        None
    }
}

/// Closed-loop tuning rule applied to the ultimate parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TuningRule {
    /// Classic Ziegler–Nichols PID.
    #[default]
    ClassicPid,
    PessenIntegral,
    SomeOvershoot,
    NoOvershoot,
}

impl TuningRule {
    /// `(a, b, c)` multipliers: `Kp = a·Ku`, `Ki = b·Ku/Pu`, `Kd = c·Ku·Pu`.
    fn factors(self) -> (f32, f32, f32) {
        match self {
            TuningRule::ClassicPid => (0.6, 1.2, 0.075),
            TuningRule::PessenIntegral => (0.7, 1.75, 0.105),
            TuningRule::SomeOvershoot => (0.33, 0.66, 0.11),
            TuningRule::NoOvershoot => (0.2, 0.4, 0.066),
        }
    }
}

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl PidGains {
    pub fn from_ultimate(rule: TuningRule, ultimate: UltimateParameters) -> Self {
        let (p, i, d) = rule.factors();
        let UltimateParameters { ku, pu } = ultimate;
        Self {
            kp: p * ku,
            ki: i * ku / pu,
            kd: d * ku * pu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        let diff = if a > b { a - b } else { b - a };
        let scale = if b > 1.0 { b } else { 1.0 };
        diff <= 1e-5 * scale
    }

    #[test]
    fn classic_rule_gains() {
        let gains = PidGains::from_ultimate(
            TuningRule::ClassicPid,
            UltimateParameters { ku: 2.0, pu: 4.0 },
        );
        assert!(close(gains.kp, 1.2));
        assert!(close(gains.ki, 0.6));
        assert!(close(gains.kd, 0.6));
    }

    #[test]
    fn no_overshoot_rule_is_softer() {
        let ultimate = UltimateParameters { ku: 10.0, pu: 20.0 };
        let classic = PidGains::from_ultimate(TuningRule::ClassicPid, ultimate);
        let soft = PidGains::from_ultimate(TuningRule::NoOvershoot, ultimate);
        assert!(soft.kp < classic.kp);
        assert!(soft.ki < classic.ki);
        assert!(close(soft.kp, 2.0));
        assert!(close(soft.ki, 0.2));
        assert!(close(soft.kd, 13.2));
    }

    #[test]
    fn pessen_and_some_overshoot_factors() {
        let ultimate = UltimateParameters { ku: 10.0, pu: 20.0 };
        let pessen = PidGains::from_ultimate(TuningRule::PessenIntegral, ultimate);
        assert!(close(pessen.kp, 7.0));
        assert!(close(pessen.ki, 0.875));
        assert!(close(pessen.kd, 21.0));

        let some = PidGains::from_ultimate(TuningRule::SomeOvershoot, ultimate);
        assert!(close(some.kp, 3.3));
        assert!(close(some.ki, 0.33));
        assert!(close(some.kd, 22.0));
    }

    #[test]
    fn ultimate_gain_from_relay_swing() {
        let ku = ultimate_gain(500.0, 2.0).unwrap();
        assert!(close(ku, 1000.0 / PI));
    }

    #[test]
    fn flat_signal_has_no_ultimate_gain() {
        assert_eq!(ultimate_gain(500.0, 0.0), None);
        assert_eq!(ultimate_gain(500.0, -1.0), None);
    }

    #[test]
    fn unmeasured_defaults_are_unity() {
        let ultimate = UltimateParameters::default();
        assert_eq!(ultimate.ku, 1.0);
        assert_eq!(ultimate.pu, 1.0);
    }
}
