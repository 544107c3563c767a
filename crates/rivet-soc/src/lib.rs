//! SoC composition engine for Rivet.
//!
//! [`SocComposer`] drives a deterministic, single-pass build: the clock
//! domain graph first, then peripherals in a fixed registration order,
//! each merging its resource-map layer into the running CSR, interrupt,
//! and memory maps and claiming its memory region. Once finalized the
//! result is a read-only [`Soc`] safe to share with downstream consumers
//! (constraint generators, address decoders).
//!
//! A derived SoC variant (Ethernet) wraps a completed base: its composer
//! starts from the base's frozen maps and only adds layers and regions on
//! top, never mutating the base.

pub mod composer;
pub mod config;
pub mod error;
pub mod memory;
pub mod peripheral;

pub use composer::{compose, ComposerState, Soc, SocComposer};
pub use config::SocConfig;
pub use error::{Result, SocError};
pub use memory::{MemoryRegion, MemoryRegionSet, SHADOW_BASE};
pub use peripheral::{
    DdrPhy, EthMac, EthPhy, GpioIn, GpioOut, Peripheral, PinRequest, RegionRequest,
    ResourceRequests, Uart,
};
