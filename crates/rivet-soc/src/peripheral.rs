//! Peripheral components and their resource claims.
//!
//! A peripheral does not touch the maps itself: it describes what it
//! needs (CSR slots, interrupt lines, memory-map entries, clock domains,
//! physical pins, memory regions) and the composer registers the claims.
//! After registration a peripheral reads its assignment from the frozen
//! maps; it never mutates them.

use std::fmt;

use rivet_resmap::SlotRequest;

use crate::config::SocConfig;

/// A request for a memory region owned by a peripheral.
///
/// The base address is not part of the request: it is resolved from the
/// merged memory map at registration time, so a derived variant can
/// relocate a region by overriding the map entry alone.
#[derive(Debug, Clone)]
pub struct RegionRequest {
    /// Region name; must resolve in the memory map.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Whether the region answers at its shadow alias too.
    pub shadowed: bool,
}

/// A physical pin group request.
#[derive(Debug, Clone)]
pub struct PinRequest {
    /// Pin group name on the board.
    pub group: String,
    /// Instance index within the group.
    pub index: u32,
}

/// Everything one peripheral claims from the composition.
#[derive(Debug, Clone, Default)]
pub struct ResourceRequests {
    /// CSR namespace declarations.
    pub csr: Vec<(String, SlotRequest)>,
    /// Interrupt namespace declarations.
    pub interrupts: Vec<(String, SlotRequest)>,
    /// Memory-map namespace declarations (name -> base address).
    pub mem: Vec<(String, SlotRequest)>,
    /// Clock domains that must already exist in the graph.
    pub clock_domains: Vec<String>,
    /// Physical pins the board must provide.
    pub pins: Vec<PinRequest>,
    /// Memory regions owned by this peripheral.
    pub regions: Vec<RegionRequest>,
}

/// A component instantiated once per SoC and owned by the composition.
///
/// Object-safe so peripherals can be registered as `Box<dyn Peripheral>`.
pub trait Peripheral: fmt::Debug {
    /// Instance name (e.g., "uart0", "ethmac").
    fn name(&self) -> &str;

    /// The resources this peripheral claims.
    fn requests(&self, config: &SocConfig) -> ResourceRequests;
}

/// DDR memory controller PHY.
///
/// Claims the main RAM window and the full 4x/DQS clocking set.
#[derive(Debug)]
pub struct DdrPhy;

/// Main RAM size behind the DDR PHY (MT41K128M16: 2 Gbit).
const MAIN_RAM_SIZE: u64 = 0x1000_0000;

impl Peripheral for DdrPhy {
    fn name(&self) -> &str {
        "ddrphy"
    }

    fn requests(&self, _config: &SocConfig) -> ResourceRequests {
        ResourceRequests {
            csr: vec![("ddrphy".into(), SlotRequest::Explicit(16))],
            clock_domains: vec![
                "sys".into(),
                "sys4x".into(),
                "sys4x_dqs".into(),
                "clk200".into(),
            ],
            pins: vec![PinRequest {
                group: "ddram".into(),
                index: 0,
            }],
            regions: vec![RegionRequest {
                name: "main_ram".into(),
                size: MAIN_RAM_SIZE,
                shadowed: false,
            }],
            ..ResourceRequests::default()
        }
    }
}

/// RS232 UART (PHY + core pair).
#[derive(Debug)]
pub struct Uart {
    index: u32,
    name: String,
}

impl Uart {
    /// UART instance `index` on the board's `uart` pin group.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            name: format!("uart{index}"),
        }
    }
}

impl Peripheral for Uart {
    fn name(&self) -> &str {
        &self.name
    }

    fn requests(&self, _config: &SocConfig) -> ResourceRequests {
        let i = u64::from(self.index);
        ResourceRequests {
            csr: vec![
                (format!("uart_phy{}", self.index), SlotRequest::Explicit(17 + 2 * i)),
                (self.name.clone(), SlotRequest::Explicit(18 + 2 * i)),
            ],
            interrupts: vec![(self.name.clone(), SlotRequest::Explicit(3 + i))],
            clock_domains: vec!["sys".into()],
            pins: vec![PinRequest {
                group: "uart".into(),
                index: self.index,
            }],
            ..ResourceRequests::default()
        }
    }
}

/// Output-only GPIO bank (LEDs).
#[derive(Debug)]
pub struct GpioOut {
    name: String,
    pin_group: String,
    width: u32,
    csr: SlotRequest,
}

impl GpioOut {
    pub fn new(name: impl Into<String>, pin_group: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            pin_group: pin_group.into(),
            width,
            csr: SlotRequest::Auto,
        }
    }
}

impl Peripheral for GpioOut {
    fn name(&self) -> &str {
        &self.name
    }

    fn requests(&self, _config: &SocConfig) -> ResourceRequests {
        ResourceRequests {
            csr: vec![(self.name.clone(), self.csr)],
            clock_domains: vec!["sys".into()],
            pins: (0..self.width)
                .map(|i| PinRequest {
                    group: self.pin_group.clone(),
                    index: i,
                })
                .collect(),
            ..ResourceRequests::default()
        }
    }
}

/// Input-only GPIO bank (switches, buttons).
#[derive(Debug)]
pub struct GpioIn {
    name: String,
    pin_group: String,
    width: u32,
    csr: SlotRequest,
}

impl GpioIn {
    pub fn new(name: impl Into<String>, pin_group: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            pin_group: pin_group.into(),
            width,
            csr: SlotRequest::Auto,
        }
    }

    /// Pin the CSR slot instead of taking the next free one.
    pub fn with_csr_slot(mut self, slot: u64) -> Self {
        self.csr = SlotRequest::Explicit(slot);
        self
    }
}

impl Peripheral for GpioIn {
    fn name(&self) -> &str {
        &self.name
    }

    fn requests(&self, _config: &SocConfig) -> ResourceRequests {
        ResourceRequests {
            csr: vec![(self.name.clone(), self.csr)],
            clock_domains: vec!["sys".into()],
            pins: (0..self.width)
                .map(|i| PinRequest {
                    group: self.pin_group.clone(),
                    index: i,
                })
                .collect(),
            ..ResourceRequests::default()
        }
    }
}

/// Ethernet PHY (MII). Depends on the rx/tx clock domains existing.
#[derive(Debug)]
pub struct EthPhy;

impl Peripheral for EthPhy {
    fn name(&self) -> &str {
        "ethphy"
    }

    fn requests(&self, _config: &SocConfig) -> ResourceRequests {
        ResourceRequests {
            csr: vec![("ethphy".into(), SlotRequest::Explicit(22))],
            clock_domains: vec!["eth_rx".into(), "eth_tx".into()],
            pins: vec![
                PinRequest {
                    group: "eth_clocks".into(),
                    index: 0,
                },
                PinRequest {
                    group: "eth".into(),
                    index: 0,
                },
            ],
            ..ResourceRequests::default()
        }
    }
}

/// Ethernet MAC with a memory-mapped (and shadow-aliased) buffer window.
#[derive(Debug)]
pub struct EthMac;

/// MAC buffer window size.
const ETHMAC_REGION_SIZE: u64 = 0x2000;

impl Peripheral for EthMac {
    fn name(&self) -> &str {
        "ethmac"
    }

    fn requests(&self, _config: &SocConfig) -> ResourceRequests {
        ResourceRequests {
            csr: vec![("ethmac".into(), SlotRequest::Explicit(23))],
            interrupts: vec![("ethmac".into(), SlotRequest::Explicit(5))],
            mem: vec![("ethmac".into(), SlotRequest::Explicit(0x3000_0000))],
            clock_domains: vec!["sys".into(), "eth_rx".into(), "eth_tx".into()],
            regions: vec![RegionRequest {
                name: "ethmac".into(),
                size: ETHMAC_REGION_SIZE,
                shadowed: true,
            }],
            ..ResourceRequests::default()
        }
    }
}
