//! TOML parsing, serialization, and validation for board descriptors.
//!
//! Board descriptors are stored as `.board.toml` files. This module
//! provides load, parse, serialize, and validate entry points.

use std::path::Path;

use crate::error::{BoardError, Result};
use crate::platform::BoardPlatform;

/// A validation issue found in a board definition.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// Load a board descriptor from a `.board.toml` file.
pub fn load_board_toml(path: &Path) -> Result<BoardPlatform> {
    if !path.exists() {
        return Err(BoardError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_board_toml(&content)
}

/// Parse a board descriptor from a TOML string.
pub fn parse_board_toml(toml_str: &str) -> Result<BoardPlatform> {
    let board: BoardPlatform = toml::from_str(toml_str)?;
    Ok(board)
}

/// Serialize a board descriptor to pretty TOML.
pub fn board_to_toml(board: &BoardPlatform) -> Result<String> {
    let toml_str = toml::to_string_pretty(board)?;
    Ok(toml_str)
}

/// Validate a board definition for structural correctness.
///
/// Returns `Ok(())` if valid, or `Err(issues)` with a list of problems.
pub fn validate_board(board: &BoardPlatform) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if board.name.is_empty() {
        issues.push(ValidationIssue {
            severity: "error",
            message: "board name is empty".into(),
        });
    }

    if board.reference_clocks.is_empty() {
        issues.push(ValidationIssue {
            severity: "error",
            message: "board declares no reference clock".into(),
        });
    }
    for clk in &board.reference_clocks {
        if clk.frequency_hz <= 0.0 {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!(
                    "reference clock '{}' has non-positive frequency {} Hz",
                    clk.pin, clk.frequency_hz
                ),
            });
        }
    }

    // Duplicate pin group names (pairwise check)
    for i in 0..board.pins.len() {
        for j in (i + 1)..board.pins.len() {
            if board.pins[i].name == board.pins[j].name {
                issues.push(ValidationIssue {
                    severity: "error",
                    message: format!("pin group '{}' defined twice", board.pins[i].name),
                });
            }
        }
    }

    for pin in &board.pins {
        if pin.count == 0 {
            issues.push(ValidationIssue {
                severity: "warning",
                message: format!("pin group '{}' has zero instances", pin.name),
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PinDef, ReferenceClock};

    #[test]
    fn toml_round_trip() {
        let board = BoardPlatform::arty_a7_35();
        let toml_str = board_to_toml(&board).unwrap();
        let parsed = parse_board_toml(&toml_str).unwrap();
        assert_eq!(parsed, board);
    }

    #[test]
    fn load_missing_file_fails() {
        let err = load_board_toml(Path::new("/nonexistent/foo.board.toml")).unwrap_err();
        assert!(matches!(err, BoardError::NotFound { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arty.board.toml");
        let board = BoardPlatform::arty_a7_35();
        std::fs::write(&path, board_to_toml(&board).unwrap()).unwrap();

        let loaded = load_board_toml(&path).unwrap();
        assert_eq!(loaded.name, "arty-a7-35");
    }

    #[test]
    fn builtin_board_validates_clean() {
        validate_board(&BoardPlatform::arty_a7_35()).unwrap();
    }

    #[test]
    fn validation_flags_problems() {
        let board = BoardPlatform {
            name: "".into(),
            device: "x".into(),
            speedgrade: -1,
            reference_clocks: vec![ReferenceClock {
                pin: "clk".into(),
                frequency_hz: -5.0,
            }],
            reset_pin: None,
            pins: vec![
                PinDef { name: "uart".into(), count: 1 },
                PinDef { name: "uart".into(), count: 2 },
            ],
        };
        let issues = validate_board(&board).unwrap_err();
        assert!(issues.len() >= 3);
        assert!(issues.iter().any(|i| i.message.contains("name is empty")));
        assert!(issues.iter().any(|i| i.message.contains("defined twice")));
    }
}
