//! The clock domain graph container.

use std::collections::{HashMap, HashSet};

use crate::domain::{ClockDomain, ClockSource, DomainHandle, ResetPolicy};
use crate::error::{ClockConfigError, Result};
use crate::pll::Pll;

/// Timing relationship between two clock domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockRelation {
    /// Asynchronous: no timing relationship is enforced across the pair.
    FalsePath,
    /// Phase-related (e.g., a domain and its 4x multiple).
    SameGroup,
}

/// A classified pair of domains, consumed by constraint generation.
#[derive(Debug, Clone)]
pub struct DomainRelation {
    pub a: String,
    pub b: String,
    pub relation: ClockRelation,
}

/// Directed graph of clock domains rooted at physical oscillator inputs.
///
/// The graph is a declarative description: it validates consistency
/// (single upstream per domain, no cycles, no forward references) but
/// emits no hardware itself.
#[derive(Debug, Clone, Default)]
pub struct ClockDomainGraph {
    domains: Vec<ClockDomain>,
    index: HashMap<String, usize>,
    relations: Vec<DomainRelation>,
}

impl ClockDomainGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an undriven domain. Duplicate names are rejected.
    pub fn create_domain(
        &mut self,
        name: impl Into<String>,
        reset_policy: ResetPolicy,
    ) -> Result<DomainHandle> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(ClockConfigError::DuplicateDomain(name));
        }
        let handle = DomainHandle(self.domains.len());
        self.index.insert(name.clone(), handle.0);
        self.domains.push(ClockDomain {
            name,
            frequency_hz: 0.0,
            phase_deg: 0.0,
            reset_policy,
            source: ClockSource::Unbound,
        });
        Ok(handle)
    }

    /// Bind a root domain directly to a physical oscillator pin.
    pub fn register_reference(
        &mut self,
        handle: DomainHandle,
        external_source: impl Into<String>,
        frequency_hz: f64,
    ) -> Result<()> {
        let domain = &mut self.domains[handle.0];
        if domain.is_bound() {
            return Err(ClockConfigError::AlreadyDriven(domain.name.clone()));
        }
        domain.frequency_hz = frequency_hz;
        domain.source = ClockSource::Reference {
            pin: external_source.into(),
        };
        Ok(())
    }

    /// Derive an output domain from a PLL.
    ///
    /// The PLL's input domain must already exist and be driven (no forward
    /// references), the output must still be undriven, and the requested
    /// frequency/phase must be jointly satisfiable with the PLL's existing
    /// outputs.
    pub fn derive(
        &mut self,
        pll: &mut Pll,
        output: DomainHandle,
        target_hz: f64,
        phase_deg: f64,
    ) -> Result<()> {
        let input_domain = pll
            .input()
            .ok_or(ClockConfigError::MissingPllInput)?
            .source_domain
            .clone();

        let upstream = match self.index.get(&input_domain) {
            Some(&i) => &self.domains[i],
            None => return Err(ClockConfigError::UnknownDomain(input_domain)),
        };
        if !upstream.is_bound() {
            return Err(ClockConfigError::UndrivenDomain(input_domain));
        }

        let output_name = self.domains[output.0].name.clone();
        if self.domains[output.0].is_bound() {
            return Err(ClockConfigError::AlreadyDriven(output_name));
        }
        if self.upstream_chain(&input_domain).contains(&output_name) {
            return Err(ClockConfigError::CyclicDerivation(output_name));
        }

        pll.add_output(output_name, target_hz, phase_deg)?;

        let domain = &mut self.domains[output.0];
        domain.frequency_hz = target_hz;
        domain.phase_deg = phase_deg;
        domain.source = ClockSource::PllOutput { input_domain };
        Ok(())
    }

    /// Mark two domains as asynchronous (no enforced timing relationship).
    pub fn mark_false_path(&mut self, a: DomainHandle, b: DomainHandle) {
        self.push_relation(a, b, ClockRelation::FalsePath);
    }

    /// Mark two domains as phase-related.
    pub fn mark_same_group(&mut self, a: DomainHandle, b: DomainHandle) {
        self.push_relation(a, b, ClockRelation::SameGroup);
    }

    fn push_relation(&mut self, a: DomainHandle, b: DomainHandle, relation: ClockRelation) {
        let a = self.domains[a.0].name.clone();
        let b = self.domains[b.0].name.clone();
        let exists = self
            .relations
            .iter()
            .any(|r| r.relation == relation && ((r.a == a && r.b == b) || (r.a == b && r.b == a)));
        if !exists {
            self.relations.push(DomainRelation { a, b, relation });
        }
    }

    /// Handle for a domain name, if it exists.
    pub fn handle(&self, name: &str) -> Option<DomainHandle> {
        self.index.get(name).map(|&i| DomainHandle(i))
    }

    /// The domain behind a handle.
    pub fn domain(&self, handle: DomainHandle) -> &ClockDomain {
        &self.domains[handle.0]
    }

    /// Resolve a domain by name.
    pub fn resolve(&self, name: &str) -> Result<&ClockDomain> {
        self.index
            .get(name)
            .map(|&i| &self.domains[i])
            .ok_or_else(|| ClockConfigError::UnknownDomain(name.to_string()))
    }

    /// Iterate domains in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ClockDomain> {
        self.domains.iter()
    }

    /// Classified domain pairs.
    pub fn relations(&self) -> &[DomainRelation] {
        &self.relations
    }

    /// Check global consistency: every domain driven, no derivation cycles.
    pub fn validate(&self) -> Result<()> {
        for domain in &self.domains {
            if !domain.is_bound() {
                return Err(ClockConfigError::UndrivenDomain(domain.name.clone()));
            }
            let chain = self.upstream_chain(&domain.name);
            if chain.len() > self.domains.len() {
                return Err(ClockConfigError::CyclicDerivation(domain.name.clone()));
            }
        }
        Ok(())
    }

    /// Names on the upstream path from `name` (inclusive), stopping at a
    /// root reference or at a repeated name.
    fn upstream_chain(&self, name: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut current = name.to_string();
        loop {
            if !seen.insert(current.clone()) {
                break;
            }
            let Some(&i) = self.index.get(&current) else {
                break;
            };
            match &self.domains[i].source {
                ClockSource::PllOutput { input_domain } => current = input_domain.clone(),
                _ => break,
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_root() -> (ClockDomainGraph, DomainHandle, Pll) {
        let mut graph = ClockDomainGraph::new();
        let clk100 = graph
            .create_domain("clk100", ResetPolicy::Resettable)
            .unwrap();
        graph.register_reference(clk100, "clk100", 100e6).unwrap();
        let mut pll = Pll::new(-1);
        pll.register_clkin("clk100", 100e6).unwrap();
        (graph, clk100, pll)
    }

    #[test]
    fn root_reference_needs_no_upstream() {
        let (graph, clk100, _) = graph_with_root();
        assert!(graph.domain(clk100).is_bound());
        graph.validate().unwrap();
    }

    #[test]
    fn derive_from_missing_domain_fails() {
        let mut graph = ClockDomainGraph::new();
        let sys = graph.create_domain("sys", ResetPolicy::Resettable).unwrap();
        let mut pll = Pll::new(-1);
        pll.register_clkin("clk100", 100e6).unwrap();

        // clk100 was never created: forward references are rejected.
        let err = graph.derive(&mut pll, sys, 100e6, 0.0).unwrap_err();
        assert!(matches!(err, ClockConfigError::UnknownDomain(_)));
    }

    #[test]
    fn derive_from_undriven_domain_fails() {
        let mut graph = ClockDomainGraph::new();
        graph
            .create_domain("clk100", ResetPolicy::Resettable)
            .unwrap();
        let sys = graph.create_domain("sys", ResetPolicy::Resettable).unwrap();
        let mut pll = Pll::new(-1);
        pll.register_clkin("clk100", 100e6).unwrap();

        let err = graph.derive(&mut pll, sys, 100e6, 0.0).unwrap_err();
        assert!(matches!(err, ClockConfigError::UndrivenDomain(_)));
    }

    #[test]
    fn derive_phase_related_outputs() {
        let (mut graph, _, mut pll) = graph_with_root();
        let sys = graph.create_domain("sys", ResetPolicy::Resettable).unwrap();
        let sys4x = graph.create_domain("sys4x", ResetPolicy::ResetLess).unwrap();
        let sys4x_dqs = graph
            .create_domain("sys4x_dqs", ResetPolicy::ResetLess)
            .unwrap();

        graph.derive(&mut pll, sys, 100e6, 0.0).unwrap();
        graph.derive(&mut pll, sys4x, 400e6, 0.0).unwrap();
        graph.derive(&mut pll, sys4x_dqs, 400e6, 90.0).unwrap();
        graph.mark_same_group(sys, sys4x);
        graph.mark_same_group(sys, sys4x_dqs);

        graph.validate().unwrap();
        assert_eq!(graph.resolve("sys4x_dqs").unwrap().phase_deg, 90.0);
        assert_eq!(graph.relations().len(), 2);
    }

    #[test]
    fn duplicate_domain_name_fails() {
        let mut graph = ClockDomainGraph::new();
        graph.create_domain("sys", ResetPolicy::Resettable).unwrap();
        let err = graph
            .create_domain("sys", ResetPolicy::ResetLess)
            .unwrap_err();
        assert!(matches!(err, ClockConfigError::DuplicateDomain(_)));
    }

    #[test]
    fn deriving_an_already_driven_domain_fails() {
        let (mut graph, clk100, mut pll) = graph_with_root();
        let err = graph.derive(&mut pll, clk100, 200e6, 0.0).unwrap_err();
        assert!(matches!(err, ClockConfigError::AlreadyDriven(_)));
    }

    #[test]
    fn validate_rejects_undriven_domain() {
        let mut graph = ClockDomainGraph::new();
        graph.create_domain("sys", ResetPolicy::Resettable).unwrap();
        let err = graph.validate().unwrap_err();
        assert!(matches!(err, ClockConfigError::UndrivenDomain(_)));
    }

    #[test]
    fn false_path_relations_deduplicate() {
        let (mut graph, clk100, _) = graph_with_root();
        let eth = graph.create_domain("eth_rx", ResetPolicy::Resettable).unwrap();
        graph.register_reference(eth, "eth_clocks", 12.5e6).unwrap();

        graph.mark_false_path(clk100, eth);
        graph.mark_false_path(eth, clk100);
        assert_eq!(graph.relations().len(), 1);
    }
}
