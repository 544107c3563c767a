//! `rivet load` — send a bitstream to the attached board.

use std::path::Path;

use anyhow::{Context, Result};

use rivet_program::for_board;

/// Dispatch the bitstream to the board's programmer backend. A programmer
/// failure is terminal; the tool's own output goes to the terminal.
pub fn run(board: &str, bitstream: &Path, cable_suffix: &str) -> Result<()> {
    let programmer = for_board(board)
        .with_context(|| format!("no programmer backend for board '{board}'"))?;
    println!(
        "loading {} via {}",
        bitstream.display(),
        programmer.name()
    );
    programmer.load_bitstream(bitstream, cable_suffix)?;
    Ok(())
}
