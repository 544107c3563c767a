//! Clock domain data model.

use serde::{Deserialize, Serialize};

/// Reset behavior of a clock domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetPolicy {
    /// The domain participates in reset distribution.
    Resettable,
    /// The domain carries no reset signal (e.g., 4x DDR sampling clocks).
    ResetLess,
}

/// Where a domain's clock comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClockSource {
    /// Declared but not yet driven. Invalid in a finished graph.
    Unbound,
    /// Root domain fed directly by a physical oscillator pin.
    Reference {
        /// Name of the external pin (e.g., "clk100").
        pin: String,
    },
    /// Derived from a PLL whose input reference sits in another domain.
    PllOutput {
        /// Name of the PLL's input domain.
        input_domain: String,
    },
}

/// A named signal-timing context in the clock graph.
///
/// Every domain except a root oscillator has exactly one upstream source;
/// the graph enforces this at validation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClockDomain {
    /// Domain name (e.g., "sys", "sys4x_dqs", "clk200").
    pub name: String,
    /// Frequency in Hz; 0.0 while unbound.
    pub frequency_hz: f64,
    /// Phase offset in degrees relative to the PLL input.
    pub phase_deg: f64,
    /// Reset behavior.
    pub reset_policy: ResetPolicy,
    /// Upstream source.
    pub source: ClockSource,
}

impl ClockDomain {
    /// Clock period in nanoseconds, if the domain is bound.
    pub fn period_ns(&self) -> Option<f64> {
        if self.frequency_hz > 0.0 {
            Some(1e9 / self.frequency_hz)
        } else {
            None
        }
    }

    /// Whether the domain has received an upstream source.
    pub fn is_bound(&self) -> bool {
        !matches!(self.source, ClockSource::Unbound)
    }
}

/// Opaque handle to a domain in a [`ClockDomainGraph`](crate::ClockDomainGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainHandle(pub(crate) usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_of_bound_domain() {
        let d = ClockDomain {
            name: "sys".into(),
            frequency_hz: 100e6,
            phase_deg: 0.0,
            reset_policy: ResetPolicy::Resettable,
            source: ClockSource::Reference { pin: "clk100".into() },
        };
        let ns = d.period_ns().unwrap();
        assert!((ns - 10.0).abs() < 1e-9);
        assert!(d.is_bound());
    }

    #[test]
    fn unbound_domain_has_no_period() {
        let d = ClockDomain {
            name: "sys".into(),
            frequency_hz: 0.0,
            phase_deg: 0.0,
            reset_policy: ResetPolicy::Resettable,
            source: ClockSource::Unbound,
        };
        assert!(d.period_ns().is_none());
        assert!(!d.is_bound());
    }
}
