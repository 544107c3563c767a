//! Build-time SoC configuration.

use serde::{Deserialize, Serialize};

/// Options recognized by the composer, parsed externally (CLI) and passed
/// in as one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SocConfig {
    /// System clock frequency in Hz.
    pub clk_freq_hz: u64,
    /// Integrated ROM size in bytes.
    pub integrated_rom_size: u64,
    /// Integrated SRAM size in bytes.
    pub integrated_sram_size: u64,
    /// Whether to build the Ethernet-extended variant.
    pub with_ethernet: bool,
}

impl Default for SocConfig {
    fn default() -> Self {
        Self {
            clk_freq_hz: 100_000_000,
            integrated_rom_size: 0x8000,
            integrated_sram_size: 0x8000,
            with_ethernet: false,
        }
    }
}
