//! `rivet boards` — inspect board descriptors.

use std::fmt::Write as _;

use anyhow::{Context, Result};

use rivet_board::{board_to_toml, BoardPlatform};

/// List built-in boards.
pub fn list() -> Result<()> {
    for name in BoardPlatform::builtin_names() {
        println!("{name}");
    }
    Ok(())
}

/// Show one board descriptor.
pub fn describe(name: &str, format: Option<&str>) -> Result<()> {
    let board = BoardPlatform::builtin(name)
        .with_context(|| format!("unknown board '{name}' (see `rivet boards list`)"))?;

    match format {
        Some("toml") => print!("{}", board_to_toml(&board)?),
        Some("json") => println!("{}", serde_json::to_string_pretty(&board)?),
        Some(other) => anyhow::bail!("unknown format '{other}' (expected toml or json)"),
        None => print!("{}", describe_text(&board)),
    }
    Ok(())
}

/// Human-readable descriptor summary.
pub fn describe_text(board: &BoardPlatform) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Board:  {}", board.name);
    let _ = writeln!(out, "Device: {}", board.device);
    let _ = writeln!(out, "Speed grade: {}", board.speedgrade);
    if let Some(reset) = &board.reset_pin {
        let _ = writeln!(out, "Reset pin: {reset}");
    }
    let _ = writeln!(out, "Reference clocks:");
    for clock in &board.reference_clocks {
        let _ = writeln!(
            out,
            "  {:<12} {:.3} MHz",
            clock.pin,
            clock.frequency_hz / 1e6
        );
    }
    let _ = writeln!(out, "Pin groups:");
    for pin in &board.pins {
        let _ = writeln!(out, "  {:<12} x{}", pin.name, pin.count);
    }
    out
}
