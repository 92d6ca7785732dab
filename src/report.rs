use core::fmt;
use serde::{Deserialize, Serialize};

use crate::gains::{PidGains, UltimateParameters};
use crate::tuner::{Termination, TunerState};

/// Snapshot of a tuning run, suitable for sending to a host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TuningReport {
    pub state: TunerState,
    pub termination: Option<Termination>,
    pub ultimate: UltimateParameters,
    pub gains: PidGains,
    pub cycles: u32,
    /// Peak-to-peak swing of the process value.
    pub amplitude: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    BufferTooSmall,
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::BufferTooSmall => write!(f, "Report buffer too small"),
        }
    }
}

impl TuningReport {
    /// Serialize as JSON into `buf`, returning the number of bytes written.
    pub fn to_json(&self, buf: &mut [u8]) -> Result<usize, ReportError> {
        serde_json_core::to_slice(self, buf).map_err(|_| ReportError::BufferTooSmall)
    }

    /// Whether the measured gains can be trusted.
    pub fn is_usable(&self) -> bool {
        self.termination == Some(Termination::Stable)
            && self.ultimate.ku.is_finite()
            && self.ultimate.pu > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TuningRule;

    fn converged() -> TuningReport {
        let ultimate = UltimateParameters { ku: 2.0, pu: 4.0 };
        TuningReport {
            state: TunerState::Converged,
            termination: Some(Termination::Stable),
            ultimate,
            gains: PidGains::from_ultimate(TuningRule::ClassicPid, ultimate),
            cycles: 3,
            amplitude: 2.0,
        }
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = converged();
        let mut buf = [0u8; 256];
        let len = report.to_json(&mut buf).unwrap();
        let json = core::str::from_utf8(&buf[..len]).unwrap();
        assert!(json.starts_with(r#"{"state":"Converged","termination":"Stable""#));

        let (decoded, _) = serde_json_core::from_slice::<TuningReport>(&buf[..len]).unwrap();
        assert_eq!(decoded.state, TunerState::Converged);
        assert_eq!(decoded.cycles, 3);
        assert_eq!(decoded.ultimate.ku, 2.0);
    }

    #[test]
    fn small_buffer_is_an_error() {
        let mut buf = [0u8; 8];
        assert_eq!(converged().to_json(&mut buf), Err(ReportError::BufferTooSmall));
    }

    #[test]
    fn only_stable_runs_are_usable() {
        let mut report = converged();
        assert!(report.is_usable());
        report.termination = Some(Termination::PeakLimit);
        assert!(!report.is_usable());
    }
}
