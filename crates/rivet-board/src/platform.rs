//! Board platform model.

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};

/// A reference oscillator input on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReferenceClock {
    /// Pin name (e.g., "clk100").
    pub pin: String,
    /// Oscillator frequency in Hz.
    pub frequency_hz: f64,
}

/// A named group of physical pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PinDef {
    /// Group name (e.g., "uart", "user_led").
    pub name: String,
    /// Number of instances available (e.g., 4 user LEDs).
    pub count: u32,
}

/// A complete board platform descriptor.
///
/// Named after and shaped like the original board files: the SoC
/// composition requests resources by name and index, and the descriptor
/// either satisfies the request or fails it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BoardPlatform {
    /// Board identity (e.g., "arty-a7-35").
    pub name: String,
    /// Device part identifier handed to the external toolchain.
    pub device: String,
    /// Device speed grade.
    pub speedgrade: i8,
    /// Reference oscillators.
    pub reference_clocks: Vec<ReferenceClock>,
    /// Reset pin name, if the board has one.
    pub reset_pin: Option<String>,
    /// Named pin groups.
    pub pins: Vec<PinDef>,
}

impl BoardPlatform {
    /// Request a pin group instance by name and index.
    ///
    /// Returns the canonical request string (name or "name:index") used to
    /// tie a peripheral to its physical resource, or [`BoardError::UnknownPin`]
    /// if the board lacks the group or the index is out of range.
    pub fn request(&self, name: &str, index: u32) -> Result<String> {
        let found = self.pins.iter().find(|p| p.name == name);
        match found {
            Some(def) if index < def.count => {
                if def.count == 1 {
                    Ok(name.to_string())
                } else {
                    Ok(format!("{name}:{index}"))
                }
            }
            _ => Err(BoardError::UnknownPin {
                board: self.name.clone(),
                pin: if index == 0 {
                    name.to_string()
                } else {
                    format!("{name}:{index}")
                },
            }),
        }
    }

    /// Whether the board provides a pin group.
    pub fn has_pin(&self, name: &str) -> bool {
        self.pins.iter().any(|p| p.name == name)
    }

    /// Look up a reference clock by pin name.
    pub fn reference_clock(&self, pin: &str) -> Option<&ReferenceClock> {
        self.reference_clocks.iter().find(|c| c.pin == pin)
    }

    /// The board's primary reference oscillator.
    pub fn primary_clock(&self) -> Result<&ReferenceClock> {
        self.reference_clocks
            .first()
            .ok_or_else(|| BoardError::Validation {
                detail: format!("board '{}' declares no reference clock", self.name),
            })
    }

    /// The Digilent Arty A7-35 development board.
    pub fn arty_a7_35() -> Self {
        Self {
            name: "arty-a7-35".into(),
            device: "xc7a35ticsg324-1L".into(),
            speedgrade: -1,
            reference_clocks: vec![ReferenceClock {
                pin: "clk100".into(),
                frequency_hz: 100e6,
            }],
            reset_pin: Some("cpu_reset".into()),
            pins: vec![
                PinDef { name: "ddram".into(), count: 1 },
                PinDef { name: "uart".into(), count: 2 },
                PinDef { name: "user_led".into(), count: 4 },
                PinDef { name: "user_sw".into(), count: 4 },
                PinDef { name: "user_btn".into(), count: 4 },
                PinDef { name: "eth".into(), count: 1 },
                PinDef { name: "eth_clocks".into(), count: 1 },
                PinDef { name: "eth_ref_clk".into(), count: 1 },
            ],
        }
    }

    /// Built-in board descriptors, by identity.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "arty-a7-35" => Some(Self::arty_a7_35()),
            _ => None,
        }
    }

    /// Names of all built-in boards.
    pub fn builtin_names() -> &'static [&'static str] {
        &["arty-a7-35"]
    }
}
