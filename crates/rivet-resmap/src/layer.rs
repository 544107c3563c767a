//! One SoC variant's partial slot declarations for a single namespace.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// A requested slot: pinned to an explicit index, or assigned at merge time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotRequest {
    /// The caller pins a specific slot index.
    Explicit(u64),
    /// The lowest unused slot is assigned when the layer is merged.
    Auto,
}

impl fmt::Display for SlotRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRequest::Explicit(slot) => write!(f, "slot {slot}"),
            SlotRequest::Auto => write!(f, "auto"),
        }
    }
}

/// An ordered set of slot declarations made by one SoC variant.
///
/// A layer is a declaration of intent, not an effective map: names are
/// checked for conflicts within the layer as they are declared, and the
/// layer is later merged over a base [`ResourceMap`](crate::ResourceMap)
/// to produce the effective mapping.
#[derive(Debug, Clone)]
pub struct MapLayer {
    namespace: String,
    entries: Vec<(String, SlotRequest)>,
    index: HashMap<String, usize>,
}

impl MapLayer {
    /// Create an empty layer for the given namespace label.
    ///
    /// The label ("csr", "interrupt", "mem") appears in diagnostics only.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Namespace label this layer belongs to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Declare a name in this layer.
    ///
    /// Redeclaring a name with the identical request is idempotent.
    /// Redeclaring it with a different request is a [`MapError::DuplicateName`]
    /// (conflicting intent within one layer, not an override). Declaring a
    /// distinct name on an explicit slot already claimed in this layer is a
    /// [`MapError::SlotCollision`].
    pub fn declare(&mut self, name: impl Into<String>, request: SlotRequest) -> Result<()> {
        let name = name.into();

        if let Some(&pos) = self.index.get(&name) {
            let existing = self.entries[pos].1;
            if existing == request {
                return Ok(());
            }
            return Err(MapError::DuplicateName {
                namespace: self.namespace.clone(),
                name,
                existing: existing.to_string(),
                new: request.to_string(),
            });
        }

        if let SlotRequest::Explicit(slot) = request {
            if let Some((other, _)) = self
                .entries
                .iter()
                .find(|(_, r)| *r == SlotRequest::Explicit(slot))
            {
                return Err(MapError::SlotCollision {
                    namespace: self.namespace.clone(),
                    name,
                    other: other.clone(),
                    slot,
                });
            }
        }

        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, request));
        Ok(())
    }

    /// Whether the layer declares the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of names declared in this layer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the layer declares nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate declarations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SlotRequest)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), *r))
    }
}
