//! Memory regions and the shadow aliasing scheme.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SocError};

/// OR-ed onto a region's base address to form its shadow alias. The alias
/// selects a different caching behavior for the same underlying storage.
pub const SHADOW_BASE: u64 = 0x8000_0000;

/// A named window in the physical address space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MemoryRegion {
    /// Region name, matching its memory-map entry.
    pub name: String,
    /// Primary base address.
    pub base: u64,
    /// Size in bytes.
    pub size: u64,
    /// Whether the region also answers at its shadow alias.
    pub shadowed: bool,
}

impl MemoryRegion {
    /// Create a region without a shadow alias.
    pub fn new(name: impl Into<String>, base: u64, size: u64) -> Self {
        Self {
            name: name.into(),
            base,
            size,
            shadowed: false,
        }
    }

    /// Create a region that also answers at `base | SHADOW_BASE`.
    pub fn shadowed(name: impl Into<String>, base: u64, size: u64) -> Self {
        Self {
            name: name.into(),
            base,
            size,
            shadowed: true,
        }
    }

    /// The shadow alias address, if the region has one.
    pub fn shadow_alias(&self) -> Option<u64> {
        self.shadowed.then_some(self.base | SHADOW_BASE)
    }

    /// End of the primary range (exclusive).
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }

    /// Whether an address falls in the primary range or the shadow range.
    pub fn contains(&self, addr: u64) -> bool {
        if addr >= self.base && addr < self.end() {
            return true;
        }
        match self.shadow_alias() {
            Some(alias) => addr >= alias && addr < alias.saturating_add(self.size),
            None => false,
        }
    }
}

/// The set of regions registered so far, overlap-checked on insert.
///
/// Only primary ranges are checked for overlap: a shadow alias maps to
/// the same storage as its primary, so two regions with colliding aliases
/// but disjoint primaries are legal.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegionSet {
    regions: Vec<MemoryRegion>,
}

impl MemoryRegionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a region, rejecting any primary-range intersection with a
    /// previously registered region.
    pub fn register(&mut self, region: MemoryRegion) -> Result<()> {
        for existing in &self.regions {
            if region.base < existing.end() && existing.base < region.end() {
                return Err(SocError::AddressOverlap {
                    a: existing.name.clone(),
                    a_base: existing.base,
                    a_end: existing.end(),
                    b: region.name.clone(),
                    b_base: region.base,
                    b_end: region.end(),
                });
            }
        }
        self.regions.push(region);
        Ok(())
    }

    /// Find the region answering at an address (primary or shadow).
    pub fn locate(&self, addr: u64) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.contains(addr))
    }

    /// Look up a region by name.
    pub fn get(&self, name: &str) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Iterate regions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &MemoryRegion> {
        self.regions.iter()
    }

    /// Number of registered regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no regions are registered.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
