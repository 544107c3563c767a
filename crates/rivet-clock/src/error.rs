//! Error types for clock domain configuration.

use thiserror::Error;

/// Errors that can occur while building the clock domain graph.
///
/// All of these are fatal: an unsatisfiable clock derivation aborts the
/// SoC build before any peripheral is touched.
#[derive(Debug, Error)]
pub enum ClockConfigError {
    /// A domain with this name already exists in the graph.
    #[error("clock domain already defined: {0}")]
    DuplicateDomain(String),

    /// A domain was referenced before it was created (no forward references).
    #[error("unknown clock domain: {0}")]
    UnknownDomain(String),

    /// A non-root domain never received an upstream source.
    #[error("clock domain '{0}' has no upstream source")]
    UndrivenDomain(String),

    /// A domain that already has an upstream source was driven again.
    #[error("clock domain '{0}' is already driven")]
    AlreadyDriven(String),

    /// A derivation was requested from a PLL with no input reference.
    #[error("PLL has no registered input reference")]
    MissingPllInput,

    /// A PLL input reference was registered twice.
    #[error("PLL input reference already registered")]
    PllInputAlreadyRegistered,

    /// The requested phase offset is outside the PLL's capability.
    #[error("unsupported phase {phase} deg for output '{domain}' (supported: multiples of 45)")]
    UnsupportedPhase { domain: String, phase: f64 },

    /// No single multiplier/divider assignment satisfies all requested outputs.
    #[error(
        "no feasible PLL configuration: input {input_hz} Hz cannot jointly produce {requests:?} Hz"
    )]
    Unsatisfiable { input_hz: f64, requests: Vec<f64> },

    /// A derivation chain loops back on itself.
    #[error("cyclic clock derivation involving '{0}'")]
    CyclicDerivation(String),
}

/// Result type for clock configuration operations.
pub type Result<T> = std::result::Result<T, ClockConfigError>;
