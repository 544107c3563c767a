//! The effective name-to-slot mapping for one namespace.

use std::collections::HashMap;

use crate::error::{MapError, Result};
use crate::layer::{MapLayer, SlotRequest};

/// An effective, merged resource map.
///
/// Built by folding [`MapLayer`]s over a base map, one per SoC variant in
/// the inheritance chain. Once built it is never mutated; a derived
/// variant clones it and merges its own layer on top.
#[derive(Debug, Clone, Default)]
pub struct ResourceMap {
    namespace: String,
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl ResourceMap {
    /// Create an empty map for the given namespace label.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build an effective map from a single layer (no base).
    pub fn from_layer(layer: &MapLayer) -> Result<Self> {
        Self::merge_layer(&Self::new(layer.namespace()), layer)
    }

    /// Merge a derived layer over a base map, producing a new effective map.
    ///
    /// The layer's entries take precedence: a name present in both resolves
    /// to the layer's slot (override wins, no error). Base entries whose
    /// names the layer does not declare are carried forward unchanged. A
    /// slot claimed by two distinct names — including a conflict introduced
    /// only by the merge itself — is a [`MapError::SlotCollision`]. `Auto`
    /// requests are assigned the lowest unused slot after every explicit
    /// slot of both layers is placed.
    pub fn merge_layer(base: &ResourceMap, layer: &MapLayer) -> Result<Self> {
        let namespace = layer.namespace().to_string();

        // Derived entries first, then inherited base entries.
        let mut pending: Vec<(String, Option<u64>)> = Vec::new();
        for (name, request) in layer.iter() {
            match request {
                SlotRequest::Explicit(slot) => pending.push((name.to_string(), Some(slot))),
                SlotRequest::Auto => pending.push((name.to_string(), None)),
            }
        }
        for (name, slot) in base.iter() {
            if !layer.contains(name) {
                pending.push((name.to_string(), Some(slot)));
            }
        }

        // Place explicit slots, detecting collisions across the whole merge.
        let mut used: HashMap<u64, String> = HashMap::new();
        for (name, slot) in pending.iter().filter_map(|(n, s)| s.map(|s| (n, s))) {
            if let Some(other) = used.insert(slot, name.clone()) {
                return Err(MapError::SlotCollision {
                    namespace,
                    name: name.clone(),
                    other,
                    slot,
                });
            }
        }

        // Assign auto slots: lowest unused, in declaration order.
        let mut next = 0u64;
        let mut entries = Vec::with_capacity(pending.len());
        for (name, slot) in pending {
            let slot = match slot {
                Some(slot) => slot,
                None => {
                    while used.contains_key(&next) {
                        next += 1;
                    }
                    used.insert(next, name.clone());
                    next
                }
            };
            entries.push((name, slot));
        }

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (n, _))| (n.clone(), i))
            .collect();

        Ok(Self {
            namespace,
            entries,
            index,
        })
    }

    /// Namespace label of this map.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Resolve a name to its slot.
    pub fn resolve(&self, name: &str) -> Result<u64> {
        self.get(name).ok_or_else(|| MapError::UnknownResource {
            namespace: self.namespace.clone(),
            name: name.to_string(),
        })
    }

    /// Look up a name, returning `None` if it was never declared.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.index.get(name).map(|&i| self.entries[i].1)
    }

    /// Number of effective entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, slot)` pairs in merge order (derived before inherited).
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), *s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(namespace: &str, entries: &[(&str, SlotRequest)]) -> MapLayer {
        let mut l = MapLayer::new(namespace);
        for (name, request) in entries {
            l.declare(*name, *request).unwrap();
        }
        l
    }

    #[test]
    fn disjoint_merge_keeps_both_layers() {
        let base = ResourceMap::from_layer(&layer(
            "csr",
            &[
                ("ddrphy", SlotRequest::Explicit(16)),
                ("uart0", SlotRequest::Explicit(18)),
            ],
        ))
        .unwrap();
        let derived = layer(
            "csr",
            &[
                ("ethphy", SlotRequest::Explicit(22)),
                ("ethmac", SlotRequest::Explicit(23)),
            ],
        );

        let merged = ResourceMap::merge_layer(&base, &derived).unwrap();
        assert_eq!(merged.len(), base.len() + derived.len());
        assert_eq!(merged.resolve("ddrphy").unwrap(), 16);
        assert_eq!(merged.resolve("uart0").unwrap(), 18);
        assert_eq!(merged.resolve("ethphy").unwrap(), 22);
        assert_eq!(merged.resolve("ethmac").unwrap(), 23);
    }

    #[test]
    fn override_wins_without_error() {
        let base =
            ResourceMap::from_layer(&layer("csr", &[("uart0", SlotRequest::Explicit(18))])).unwrap();
        let derived = layer("csr", &[("uart0", SlotRequest::Explicit(24))]);

        let merged = ResourceMap::merge_layer(&base, &derived).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.resolve("uart0").unwrap(), 24);
    }

    #[test]
    fn merge_introduced_collision_is_detected() {
        // Neither layer is inconsistent alone: the derived layer pins a new
        // name onto a slot it inherits from the base under another name.
        let base = ResourceMap::from_layer(&layer(
            "csr",
            &[
                ("ddrphy", SlotRequest::Explicit(16)),
                ("uart0", SlotRequest::Explicit(18)),
            ],
        ))
        .unwrap();
        let derived = layer("csr", &[("ethmac", SlotRequest::Explicit(18))]);

        let err = ResourceMap::merge_layer(&base, &derived).unwrap_err();
        match err {
            MapError::SlotCollision { slot, .. } => assert_eq!(slot, 18),
            other => panic!("expected SlotCollision, got {other:?}"),
        }
    }

    #[test]
    fn auto_slots_fill_lowest_unused() {
        let base = ResourceMap::from_layer(&layer(
            "csr",
            &[
                ("ctrl", SlotRequest::Explicit(0)),
                ("timer0", SlotRequest::Explicit(2)),
            ],
        ))
        .unwrap();
        let derived = layer(
            "csr",
            &[
                ("leds", SlotRequest::Auto),
                ("buttons", SlotRequest::Auto),
            ],
        );

        let merged = ResourceMap::merge_layer(&base, &derived).unwrap();
        assert_eq!(merged.resolve("leds").unwrap(), 1);
        assert_eq!(merged.resolve("buttons").unwrap(), 3);
    }

    #[test]
    fn resolve_unknown_name_fails() {
        let map = ResourceMap::from_layer(&layer("interrupt", &[])).unwrap();
        let err = map.resolve("uart0").unwrap_err();
        assert!(matches!(err, MapError::UnknownResource { .. }));
    }

    #[test]
    fn iteration_orders_derived_before_inherited() {
        let base =
            ResourceMap::from_layer(&layer("csr", &[("uart0", SlotRequest::Explicit(18))])).unwrap();
        let derived = layer("csr", &[("ethmac", SlotRequest::Explicit(23))]);

        let merged = ResourceMap::merge_layer(&base, &derived).unwrap();
        let names: Vec<_> = merged.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, vec!["ethmac", "uart0"]);
    }
}
