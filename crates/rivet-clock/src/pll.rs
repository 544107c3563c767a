//! Phase-locked loop abstraction.
//!
//! Models a single hardware PLL: one input reference, one VCO, and a set
//! of output clocks each produced by an integer divider. A requested
//! output is accepted only if some multiplier/divider assignment
//! satisfies every output jointly; two outputs can never silently
//! conflict on the shared VCO.

use crate::error::{ClockConfigError, Result};

/// Multiplier search range for the VCO.
const MULT_RANGE: std::ops::RangeInclusive<u32> = 1..=64;
/// Divider search range per output.
const DIV_RANGE: std::ops::RangeInclusive<u32> = 1..=128;
/// Relative frequency tolerance for a divider match.
const FREQ_TOLERANCE: f64 = 1e-3;

/// The PLL's input reference clock.
#[derive(Debug, Clone)]
pub struct PllInput {
    /// Name of the clock domain feeding the PLL.
    pub source_domain: String,
    /// Input frequency in Hz.
    pub frequency_hz: f64,
}

/// One requested PLL output.
#[derive(Debug, Clone)]
pub struct PllOutput {
    /// Name of the output clock domain.
    pub domain: String,
    /// Requested frequency in Hz.
    pub frequency_hz: f64,
    /// Requested phase offset in degrees.
    pub phase_deg: f64,
}

/// A single PLL with speed-grade-dependent VCO limits.
#[derive(Debug, Clone)]
pub struct Pll {
    speedgrade: i8,
    input: Option<PllInput>,
    outputs: Vec<PllOutput>,
}

impl Pll {
    /// Create a PLL for the given device speed grade (e.g., -1).
    pub fn new(speedgrade: i8) -> Self {
        Self {
            speedgrade,
            input: None,
            outputs: Vec::new(),
        }
    }

    /// Register the input reference. A PLL has exactly one.
    pub fn register_clkin(
        &mut self,
        source_domain: impl Into<String>,
        frequency_hz: f64,
    ) -> Result<()> {
        if self.input.is_some() {
            return Err(ClockConfigError::PllInputAlreadyRegistered);
        }
        self.input = Some(PllInput {
            source_domain: source_domain.into(),
            frequency_hz,
        });
        Ok(())
    }

    /// The registered input reference, if any.
    pub fn input(&self) -> Option<&PllInput> {
        self.input.as_ref()
    }

    /// Outputs accepted so far.
    pub fn outputs(&self) -> &[PllOutput] {
        &self.outputs
    }

    /// VCO frequency range for this speed grade, in Hz.
    pub fn vco_range(&self) -> (f64, f64) {
        match self.speedgrade {
            -3 => (800e6, 2133e6),
            -2 => (800e6, 1866e6),
            _ => (800e6, 1600e6),
        }
    }

    /// Request a new output, checking it against all existing outputs.
    ///
    /// Fails with [`ClockConfigError::UnsupportedPhase`] if the phase is
    /// outside the supported 45-degree steps, and with
    /// [`ClockConfigError::Unsatisfiable`] if no single multiplier/divider
    /// assignment covers every output including the new one.
    pub fn add_output(
        &mut self,
        domain: impl Into<String>,
        frequency_hz: f64,
        phase_deg: f64,
    ) -> Result<()> {
        let domain = domain.into();
        if self.input.is_none() {
            return Err(ClockConfigError::MissingPllInput);
        }
        if !phase_supported(phase_deg) {
            return Err(ClockConfigError::UnsupportedPhase {
                domain,
                phase: phase_deg,
            });
        }

        let candidate = PllOutput {
            domain,
            frequency_hz,
            phase_deg,
        };
        self.check_feasible(&candidate)?;
        self.outputs.push(candidate);
        Ok(())
    }

    /// Joint feasibility check over existing outputs plus a candidate.
    fn check_feasible(&self, candidate: &PllOutput) -> Result<()> {
        let input = self
            .input
            .as_ref()
            .ok_or(ClockConfigError::MissingPllInput)?;
        let (vco_min, vco_max) = self.vco_range();

        let mut requests: Vec<f64> = self.outputs.iter().map(|o| o.frequency_hz).collect();
        requests.push(candidate.frequency_hz);

        for mult in MULT_RANGE {
            let vco = input.frequency_hz * f64::from(mult);
            if vco < vco_min || vco > vco_max {
                continue;
            }
            if requests.iter().all(|&target| divider_exists(vco, target)) {
                return Ok(());
            }
        }

        Err(ClockConfigError::Unsatisfiable {
            input_hz: input.frequency_hz,
            requests,
        })
    }
}

/// Whether some integer divider maps the VCO onto the target frequency.
fn divider_exists(vco: f64, target: f64) -> bool {
    if target <= 0.0 {
        return false;
    }
    DIV_RANGE
        .map(|div| vco / f64::from(div))
        .any(|f| (f - target).abs() <= target * FREQ_TOLERANCE)
}

/// Phase offsets are supported in 45-degree steps within [0, 360).
fn phase_supported(phase_deg: f64) -> bool {
    if !(0.0..360.0).contains(&phase_deg) {
        return false;
    }
    let steps = phase_deg / 45.0;
    (steps - steps.round()).abs() < 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pll_with_100mhz_input() -> Pll {
        let mut pll = Pll::new(-1);
        pll.register_clkin("clk100", 100e6).unwrap();
        pll
    }

    #[test]
    fn arty_clkout_set_is_feasible() {
        // sys, sys4x, sys4x_dqs (phase 90), clk200: the original target's set.
        let mut pll = pll_with_100mhz_input();
        pll.add_output("sys", 100e6, 0.0).unwrap();
        pll.add_output("sys4x", 400e6, 0.0).unwrap();
        pll.add_output("sys4x_dqs", 400e6, 90.0).unwrap();
        pll.add_output("clk200", 200e6, 0.0).unwrap();
        assert_eq!(pll.outputs().len(), 4);
    }

    #[test]
    fn output_without_input_fails() {
        let mut pll = Pll::new(-1);
        let err = pll.add_output("sys", 100e6, 0.0).unwrap_err();
        assert!(matches!(err, ClockConfigError::MissingPllInput));
    }

    #[test]
    fn double_clkin_fails() {
        let mut pll = pll_with_100mhz_input();
        let err = pll.register_clkin("clk100", 100e6).unwrap_err();
        assert!(matches!(err, ClockConfigError::PllInputAlreadyRegistered));
    }

    #[test]
    fn unsupported_phase_is_rejected() {
        let mut pll = pll_with_100mhz_input();
        let err = pll.add_output("sys", 100e6, 17.0).unwrap_err();
        assert!(matches!(err, ClockConfigError::UnsupportedPhase { .. }));
    }

    #[test]
    fn irrational_ratio_is_unsatisfiable() {
        let mut pll = pll_with_100mhz_input();
        // 107 MHz has no integer mult/div from 100 MHz within VCO limits.
        let err = pll.add_output("odd", 107e6, 0.0).unwrap_err();
        assert!(matches!(err, ClockConfigError::Unsatisfiable { .. }));
    }

    #[test]
    fn joint_conflict_is_detected() {
        // Each frequency is reachable alone, but no single VCO covers both.
        let mut pll = pll_with_100mhz_input();
        pll.add_output("a", 1600e6 / 3.0, 0.0).unwrap();
        let err = pll.add_output("b", 1400e6 / 3.0, 0.0).unwrap_err();
        assert!(matches!(err, ClockConfigError::Unsatisfiable { .. }));
    }
}
