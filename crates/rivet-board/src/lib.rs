//! Board platform descriptors for Rivet SoCs.
//!
//! A board descriptor names the physical resources a SoC composition may
//! request: reference oscillators with their frequencies, the reset pin,
//! and named pin groups (UARTs, LEDs, Ethernet). Descriptors are either
//! built in or loaded from `.board.toml` files.

pub mod error;
pub mod parse;
pub mod platform;

pub use error::{BoardError, Result};
pub use parse::{board_to_toml, load_board_toml, parse_board_toml, validate_board, ValidationIssue};
pub use platform::{BoardPlatform, PinDef, ReferenceClock};
