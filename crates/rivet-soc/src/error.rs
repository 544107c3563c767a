//! SoC composition errors.
//!
//! All composition-time errors abort the build immediately: a half-built
//! resource map cannot be made safe to use, so no partial SoC is ever
//! returned.

use thiserror::Error;

use rivet_board::BoardError;
use rivet_clock::ClockConfigError;
use rivet_resmap::MapError;

/// Errors that can occur during SoC composition.
#[derive(Debug, Error)]
pub enum SocError {
    /// Unsatisfiable clock derivation; fatal before any peripheral is touched.
    #[error("clock configuration error: {0}")]
    Clock(#[from] ClockConfigError),

    /// Resource map layer conflict or unknown resolve.
    #[error("resource map error: {0}")]
    Map(#[from] MapError),

    /// Board descriptor rejected a pin request.
    #[error("board error: {0}")]
    Board(#[from] BoardError),

    /// Two memory regions intersect in the physical address space.
    #[error(
        "memory region '{a}' (0x{a_base:08X}..0x{a_end:08X}) overlaps '{b}' (0x{b_base:08X}..0x{b_end:08X})"
    )]
    AddressOverlap {
        a: String,
        a_base: u64,
        a_end: u64,
        b: String,
        b_base: u64,
        b_end: u64,
    },

    /// Registration was attempted on a finalized composer.
    #[error("SoC is already finalized")]
    AlreadyFinalized,

    /// A peripheral was registered before clock setup ran.
    #[error("clock setup has not run yet")]
    ClockNotReady,

    /// The composer was consumed before being finalized.
    #[error("SoC is not finalized")]
    NotFinalized,
}

/// Result type for SoC composition.
pub type Result<T> = std::result::Result<T, SocError>;
