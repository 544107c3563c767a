//! Clock domain graph construction for Rivet SoCs.
//!
//! Builds a directed graph of clock domains rooted at physical oscillator
//! inputs. Derived domains are produced through a PLL abstraction that
//! checks multiplier/divider feasibility and phase capability before any
//! peripheral is allowed to reference the domain. The graph also carries
//! cross-domain classifications (false-path, same-group) consumed by
//! timing-constraint generation for the external toolchain.

pub mod constraint;
pub mod domain;
pub mod error;
pub mod graph;
pub mod pll;

pub use constraint::{timing_constraints, TimingConstraint};
pub use domain::{ClockDomain, ClockSource, DomainHandle, ResetPolicy};
pub use error::{ClockConfigError, Result};
pub use graph::{ClockDomainGraph, ClockRelation, DomainRelation};
pub use pll::{Pll, PllInput, PllOutput};
