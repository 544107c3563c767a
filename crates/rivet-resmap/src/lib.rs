//! Layered resource maps for Rivet SoC composition.
//!
//! A SoC claims slots in three independent namespaces: CSR index space,
//! interrupt line space, and physical memory address space. Each SoC
//! variant in an inheritance chain declares a partial [`MapLayer`]; the
//! effective [`ResourceMap`] for a variant is built by merging its layer
//! over its base's effective map. Merging is additive and
//! override-if-present: a derived layer may add new names or redefine a
//! base name's slot, but two distinct names may never share one slot.

pub mod error;
pub mod layer;
pub mod map;

pub use error::{MapError, Result};
pub use layer::{MapLayer, SlotRequest};
pub use map::ResourceMap;
