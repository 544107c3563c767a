//! `rivet build` — compose a SoC and report its resource assignment.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use rivet_board::BoardPlatform;
use rivet_clock::ResetPolicy;
use rivet_soc::{compose, Soc, SocConfig};

/// Compose the SoC and print the report; optionally write the timing
/// constraints to a file for the external toolchain.
pub fn run(board: &str, config: SocConfig, constraints_out: Option<&Path>) -> Result<()> {
    let platform = BoardPlatform::builtin(board)
        .with_context(|| format!("unknown board '{board}' (see `rivet boards list`)"))?;
    let soc = compose(platform, config)?;

    print!("{}", report(&soc));

    if let Some(path) = constraints_out {
        std::fs::write(path, constraint_text(&soc))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!();
        println!("constraints written to {}", path.display());
    }
    Ok(())
}

/// Human-readable resource report: CSR, interrupt, and memory maps,
/// regions, clock domains, and timing constraints.
pub fn report(soc: &Soc) -> String {
    let mut out = String::new();
    let platform = soc.platform();

    let _ = writeln!(out, "SoC: {} ({})", platform.name, platform.device);
    let _ = writeln!(
        out,
        "System clock: {:.3} MHz",
        soc.config().clk_freq_hz as f64 / 1e6
    );
    let _ = writeln!(out, "Peripherals: {}", soc.peripherals().join(", "));

    let _ = writeln!(out);
    let _ = writeln!(out, "--- CSR map ---");
    for (name, slot) in sorted_by_slot(soc.csr_map().iter()) {
        let _ = writeln!(out, "  {name:<16} {slot}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Interrupt map ---");
    for (name, line) in sorted_by_slot(soc.interrupt_map().iter()) {
        let _ = writeln!(out, "  {name:<16} {line}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Memory map ---");
    for (name, base) in sorted_by_slot(soc.memory_map().iter()) {
        let _ = writeln!(out, "  {name:<16} 0x{base:08x}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Regions ---");
    for region in soc.regions().iter() {
        let shadow = match region.shadow_alias() {
            Some(alias) => format!("  (shadow 0x{alias:08x})"),
            None => String::new(),
        };
        let _ = writeln!(
            out,
            "  {:<16} 0x{:08x}  {} bytes{shadow}",
            region.name, region.base, region.size
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Clock domains ---");
    for domain in soc.clocks().iter() {
        let reset = match domain.reset_policy {
            ResetPolicy::Resettable => "resettable",
            ResetPolicy::ResetLess => "reset-less",
        };
        let _ = writeln!(
            out,
            "  {:<12} {:>9.3} MHz  phase {:>5.1}  {reset}",
            domain.name,
            domain.frequency_hz / 1e6,
            domain.phase_deg
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Timing constraints ---");
    for constraint in soc.constraints() {
        let _ = writeln!(out, "  {constraint}");
    }

    out
}

/// Constraint declarations, one per line, as written to `--constraints-out`.
pub fn constraint_text(soc: &Soc) -> String {
    let mut out = String::new();
    for constraint in soc.constraints() {
        let _ = writeln!(out, "{constraint}");
    }
    out
}

fn sorted_by_slot<'a>(iter: impl Iterator<Item = (&'a str, u64)>) -> Vec<(String, u64)> {
    let mut entries: Vec<_> = iter.map(|(n, s)| (n.to_string(), s)).collect();
    entries.sort_by_key(|(_, slot)| *slot);
    entries
}
