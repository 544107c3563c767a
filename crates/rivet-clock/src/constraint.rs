//! Timing-constraint declarations for the external toolchain.
//!
//! Rivet does not model signal-level timing; it only emits declarative
//! period and false-path constraints derived from the clock graph, in a
//! form the synthesis toolchain consumes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::{ClockDomainGraph, ClockRelation};

/// One constraint declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimingConstraint {
    /// Clock period constraint in nanoseconds.
    Period { domain: String, ns: f64 },
    /// Asynchronous pair: timing paths between the domains are ignored.
    FalsePath { a: String, b: String },
}

impl fmt::Display for TimingConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingConstraint::Period { domain, ns } => {
                write!(f, "create_clock -name {domain} -period {ns:.3}")
            }
            TimingConstraint::FalsePath { a, b } => {
                write!(f, "set_false_path -from [get_clocks {a}] -to [get_clocks {b}]")
            }
        }
    }
}

/// Derive the full constraint set from a clock graph: one period
/// constraint per driven domain, one false-path declaration per
/// asynchronous pair. Same-group pairs produce no declaration (the
/// toolchain times them together by default).
pub fn timing_constraints(graph: &ClockDomainGraph) -> Vec<TimingConstraint> {
    let mut constraints = Vec::new();
    for domain in graph.iter() {
        if let Some(ns) = domain.period_ns() {
            constraints.push(TimingConstraint::Period {
                domain: domain.name.clone(),
                ns,
            });
        }
    }
    for rel in graph.relations() {
        if rel.relation == ClockRelation::FalsePath {
            constraints.push(TimingConstraint::FalsePath {
                a: rel.a.clone(),
                b: rel.b.clone(),
            });
        }
    }
    constraints
}
