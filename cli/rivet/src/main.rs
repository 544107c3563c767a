//! Rivet CLI — compose SoCs, inspect boards, load bitstreams.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use rivet_soc::SocConfig;

#[derive(Parser)]
#[command(name = "rivet", version, about = "SoC generator for FPGA development boards")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a SoC and print its resource report
    Build {
        /// Board identity (e.g., arty-a7-35)
        #[arg(long, default_value = "arty-a7-35")]
        board: String,
        /// System clock frequency in Hz
        #[arg(long, default_value_t = 100_000_000)]
        clk_freq: u64,
        /// Integrated ROM size in bytes
        #[arg(long, default_value_t = 0x8000)]
        rom_size: u64,
        /// Integrated SRAM size in bytes
        #[arg(long, default_value_t = 0x8000)]
        sram_size: u64,
        /// Build the Ethernet-extended variant
        #[arg(long)]
        with_ethernet: bool,
        /// Write timing constraint declarations to a file
        #[arg(long)]
        constraints_out: Option<PathBuf>,
    },
    /// Inspect board descriptors
    Boards {
        #[command(subcommand)]
        action: BoardsAction,
    },
    /// Load a bitstream onto a board
    Load {
        /// Bitstream file
        bitstream: PathBuf,
        /// Board identity
        #[arg(long, default_value = "arty-a7-35")]
        board: String,
        /// Cable suffix when several cables are attached (e.g., " [1-2]")
        #[arg(long, default_value = "")]
        cable_suffix: String,
    },
}

#[derive(Subcommand)]
enum BoardsAction {
    /// List built-in boards
    List,
    /// Show details of a board
    Describe {
        /// Board identity
        name: String,
        /// Output format (default: human-readable, "toml" or "json")
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Build {
            board,
            clk_freq,
            rom_size,
            sram_size,
            with_ethernet,
            constraints_out,
        } => {
            let config = SocConfig {
                clk_freq_hz: clk_freq,
                integrated_rom_size: rom_size,
                integrated_sram_size: sram_size,
                with_ethernet,
            };
            commands::build::run(&board, config, constraints_out.as_deref())
        }

        Commands::Boards { action } => match action {
            BoardsAction::List => commands::boards::list(),
            BoardsAction::Describe { name, format } => {
                commands::boards::describe(&name, format.as_deref())
            }
        },

        Commands::Load {
            bitstream,
            board,
            cable_suffix,
        } => commands::load::run(&board, &bitstream, &cable_suffix),
    }
}
