//! The SoC composer state machine.

use rivet_board::BoardPlatform;
use rivet_clock::{timing_constraints, ClockDomainGraph, DomainHandle, Pll, ResetPolicy, TimingConstraint};
use rivet_resmap::{MapLayer, ResourceMap, SlotRequest};

use crate::config::SocConfig;
use crate::error::{Result, SocError};
use crate::memory::{MemoryRegion, MemoryRegionSet};
use crate::peripheral::{DdrPhy, EthMac, EthPhy, GpioIn, GpioOut, Peripheral, Uart};

/// Progress of a composition, terminal once finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    /// Platform resolved, base layers seeded.
    Init,
    /// Clock graph under construction.
    ClockSetup,
    /// Peripherals may register.
    PeripheralRegistration,
    /// Maps and regions are frozen.
    Finalized,
}

/// Size of the CSR bus window.
const CSR_WINDOW_SIZE: u64 = 0x1_0000;
/// MII reference clock frequency (80 ns period).
const ETH_CLK_HZ: f64 = 12.5e6;

/// Builds one SoC in a single deterministic pass.
///
/// Owns the three resource maps, the memory region set, and the clock
/// graph exclusively while composition is in progress; nothing outside
/// the composer may mutate them.
#[derive(Debug)]
pub struct SocComposer {
    platform: BoardPlatform,
    config: SocConfig,
    clocks: ClockDomainGraph,
    csr: ResourceMap,
    interrupts: ResourceMap,
    memory: ResourceMap,
    regions: MemoryRegionSet,
    peripherals: Vec<String>,
    state: ComposerState,
}

impl SocComposer {
    /// Start a composition: resolve the platform and seed the base layers
    /// (system CSRs, timer interrupt, rom/sram/main_ram/csr windows).
    pub fn new(platform: BoardPlatform, config: SocConfig) -> Result<Self> {
        let mut csr_layer = MapLayer::new("csr");
        csr_layer.declare("ctrl", SlotRequest::Explicit(0))?;
        csr_layer.declare("crg", SlotRequest::Explicit(1))?;
        csr_layer.declare("identifier_mem", SlotRequest::Explicit(2))?;
        csr_layer.declare("timer0", SlotRequest::Explicit(3))?;

        let mut irq_layer = MapLayer::new("interrupt");
        irq_layer.declare("timer0", SlotRequest::Explicit(1))?;

        let mut mem_layer = MapLayer::new("mem");
        mem_layer.declare("rom", SlotRequest::Explicit(0x0000_0000))?;
        mem_layer.declare("sram", SlotRequest::Explicit(0x1000_0000))?;
        mem_layer.declare("main_ram", SlotRequest::Explicit(0x4000_0000))?;
        mem_layer.declare("csr", SlotRequest::Explicit(0x6000_0000))?;

        let mut regions = MemoryRegionSet::new();
        regions.register(MemoryRegion::new("rom", 0x0000_0000, config.integrated_rom_size))?;
        regions.register(MemoryRegion::new(
            "sram",
            0x1000_0000,
            config.integrated_sram_size,
        ))?;
        regions.register(MemoryRegion::new("csr", 0x6000_0000, CSR_WINDOW_SIZE))?;

        Ok(Self {
            platform,
            config,
            clocks: ClockDomainGraph::new(),
            csr: ResourceMap::from_layer(&csr_layer)?,
            interrupts: ResourceMap::from_layer(&irq_layer)?,
            memory: ResourceMap::from_layer(&mem_layer)?,
            regions,
            peripherals: Vec::new(),
            state: ComposerState::Init,
        })
    }

    /// Start a derived composition over a completed base SoC.
    ///
    /// The base's frozen maps, regions, and clock graph become the new
    /// composer's starting layers; the base itself is never mutated.
    pub fn extend(base: &Soc) -> Self {
        Self {
            platform: base.platform.clone(),
            config: base.config.clone(),
            clocks: base.clocks.clone(),
            csr: base.csr.clone(),
            interrupts: base.interrupts.clone(),
            memory: base.memory.clone(),
            regions: base.regions.clone(),
            peripherals: base.peripherals.clone(),
            state: ComposerState::PeripheralRegistration,
        }
    }

    /// Build the clock reset generator: one PLL fed by the board's primary
    /// oscillator, producing sys, sys4x, sys4x_dqs (90 deg), and clk200.
    ///
    /// Failure here is fatal; no peripheral can register without its clock
    /// domain existing.
    pub fn setup_clocks(&mut self) -> Result<()> {
        if self.state == ComposerState::Finalized {
            return Err(SocError::AlreadyFinalized);
        }
        self.state = ComposerState::ClockSetup;

        let refclk = self.platform.primary_clock()?.clone();
        let root = self
            .clocks
            .create_domain(&refclk.pin, ResetPolicy::Resettable)?;
        self.clocks
            .register_reference(root, &refclk.pin, refclk.frequency_hz)?;

        let sys = self.clocks.create_domain("sys", ResetPolicy::Resettable)?;
        let sys4x = self.clocks.create_domain("sys4x", ResetPolicy::ResetLess)?;
        let sys4x_dqs = self
            .clocks
            .create_domain("sys4x_dqs", ResetPolicy::ResetLess)?;
        let clk200 = self.clocks.create_domain("clk200", ResetPolicy::Resettable)?;

        let mut pll = Pll::new(self.platform.speedgrade);
        pll.register_clkin(&refclk.pin, refclk.frequency_hz)?;

        let sys_hz = self.config.clk_freq_hz as f64;
        self.clocks.derive(&mut pll, sys, sys_hz, 0.0)?;
        self.clocks.derive(&mut pll, sys4x, 4.0 * sys_hz, 0.0)?;
        self.clocks.derive(&mut pll, sys4x_dqs, 4.0 * sys_hz, 90.0)?;
        self.clocks.derive(&mut pll, clk200, 200e6, 0.0)?;

        self.clocks.mark_same_group(sys, sys4x);
        self.clocks.mark_same_group(sys, sys4x_dqs);

        self.state = ComposerState::PeripheralRegistration;
        Ok(())
    }

    /// Add a root clock domain fed directly by a board pin.
    pub fn add_reference_domain(
        &mut self,
        name: &str,
        pin: &str,
        frequency_hz: f64,
        reset_policy: ResetPolicy,
    ) -> Result<DomainHandle> {
        if self.state == ComposerState::Finalized {
            return Err(SocError::AlreadyFinalized);
        }
        if self.state == ComposerState::Init {
            return Err(SocError::ClockNotReady);
        }
        self.platform.request(pin, 0)?;
        let handle = self.clocks.create_domain(name, reset_policy)?;
        self.clocks.register_reference(handle, pin, frequency_hz)?;
        Ok(handle)
    }

    /// Declare two domains asynchronous (no timing relationship enforced).
    pub fn mark_async(&mut self, a: &str, b: &str) -> Result<()> {
        if self.state == ComposerState::Finalized {
            return Err(SocError::AlreadyFinalized);
        }
        let a = self
            .clocks
            .handle(a)
            .ok_or_else(|| rivet_clock::ClockConfigError::UnknownDomain(a.to_string()))?;
        let b = self
            .clocks
            .handle(b)
            .ok_or_else(|| rivet_clock::ClockConfigError::UnknownDomain(b.to_string()))?;
        self.clocks.mark_false_path(a, b);
        Ok(())
    }

    /// Register one peripheral: merge its resource-map layers, verify its
    /// clock domains and pins, and claim its memory regions.
    pub fn register_peripheral(&mut self, peripheral: Box<dyn Peripheral>) -> Result<()> {
        match self.state {
            ComposerState::Finalized => return Err(SocError::AlreadyFinalized),
            ComposerState::Init | ComposerState::ClockSetup => {
                return Err(SocError::ClockNotReady)
            }
            ComposerState::PeripheralRegistration => {}
        }

        let requests = peripheral.requests(&self.config);

        for pin in &requests.pins {
            self.platform.request(&pin.group, pin.index)?;
        }
        for domain in &requests.clock_domains {
            self.clocks.resolve(domain)?;
        }

        self.csr = merge_requests(&self.csr, "csr", &requests.csr)?;
        self.interrupts = merge_requests(&self.interrupts, "interrupt", &requests.interrupts)?;
        self.memory = merge_requests(&self.memory, "mem", &requests.mem)?;

        for request in &requests.regions {
            let base = self.memory.resolve(&request.name)?;
            let region = if request.shadowed {
                MemoryRegion::shadowed(&request.name, base, request.size)
            } else {
                MemoryRegion::new(&request.name, base, request.size)
            };
            self.regions.register(region)?;
        }

        self.peripherals.push(peripheral.name().to_string());
        Ok(())
    }

    /// Freeze the composition. Further registration fails with
    /// [`SocError::AlreadyFinalized`].
    pub fn finalize(&mut self) -> Result<()> {
        match self.state {
            ComposerState::Finalized => return Err(SocError::AlreadyFinalized),
            ComposerState::Init | ComposerState::ClockSetup => {
                return Err(SocError::ClockNotReady)
            }
            ComposerState::PeripheralRegistration => {}
        }
        self.clocks.validate()?;
        self.state = ComposerState::Finalized;
        Ok(())
    }

    /// Consume the finalized composer, yielding the read-only SoC.
    pub fn into_soc(self) -> Result<Soc> {
        if self.state != ComposerState::Finalized {
            return Err(SocError::NotFinalized);
        }
        Ok(Soc {
            platform: self.platform,
            config: self.config,
            clocks: self.clocks,
            csr: self.csr,
            interrupts: self.interrupts,
            memory: self.memory,
            regions: self.regions,
            peripherals: self.peripherals,
        })
    }

    /// Current state, for diagnostics.
    pub fn state(&self) -> ComposerState {
        self.state
    }
}

fn merge_requests(
    base: &ResourceMap,
    namespace: &str,
    entries: &[(String, SlotRequest)],
) -> Result<ResourceMap> {
    if entries.is_empty() {
        return Ok(base.clone());
    }
    let mut layer = MapLayer::new(namespace);
    for (name, request) in entries {
        layer.declare(name.clone(), *request)?;
    }
    Ok(ResourceMap::merge_layer(base, &layer)?)
}

/// A completed, immutable SoC description.
///
/// Safe to share read-only with any number of downstream consumers.
#[derive(Debug, Clone)]
pub struct Soc {
    platform: BoardPlatform,
    config: SocConfig,
    clocks: ClockDomainGraph,
    csr: ResourceMap,
    interrupts: ResourceMap,
    memory: ResourceMap,
    regions: MemoryRegionSet,
    peripherals: Vec<String>,
}

impl Soc {
    /// Effective CSR map.
    pub fn csr_map(&self) -> &ResourceMap {
        &self.csr
    }

    /// Effective interrupt map.
    pub fn interrupt_map(&self) -> &ResourceMap {
        &self.interrupts
    }

    /// Effective memory map (name -> base address).
    pub fn memory_map(&self) -> &ResourceMap {
        &self.memory
    }

    /// Registered memory regions.
    pub fn regions(&self) -> &MemoryRegionSet {
        &self.regions
    }

    /// The clock domain graph.
    pub fn clocks(&self) -> &ClockDomainGraph {
        &self.clocks
    }

    /// Peripheral instance names, in registration order.
    pub fn peripherals(&self) -> &[String] {
        &self.peripherals
    }

    /// The board this SoC targets.
    pub fn platform(&self) -> &BoardPlatform {
        &self.platform
    }

    /// The configuration the SoC was built with.
    pub fn config(&self) -> &SocConfig {
        &self.config
    }

    /// Timing-constraint declarations for the external toolchain.
    pub fn constraints(&self) -> Vec<TimingConstraint> {
        timing_constraints(&self.clocks)
    }
}

/// Compose a SoC for a board in the documented deterministic order:
/// memory controller, then communication peripherals, then GPIO, then the
/// Ethernet extension when requested.
pub fn compose(platform: BoardPlatform, config: SocConfig) -> Result<Soc> {
    let with_ethernet = config.with_ethernet;

    let mut composer = SocComposer::new(platform, config)?;
    composer.setup_clocks()?;

    composer.register_peripheral(Box::new(DdrPhy))?;
    composer.register_peripheral(Box::new(Uart::new(0)))?;
    composer.register_peripheral(Box::new(Uart::new(1)))?;
    composer.register_peripheral(Box::new(GpioOut::new("leds", "user_led", 4)))?;
    composer.register_peripheral(Box::new(
        GpioIn::new("switches", "user_sw", 4).with_csr_slot(21),
    ))?;
    composer.register_peripheral(Box::new(GpioIn::new("buttons", "user_btn", 4)))?;

    composer.finalize()?;
    let base = composer.into_soc()?;

    if with_ethernet {
        extend_ethernet(&base)
    } else {
        Ok(base)
    }
}

/// Re-enter registration over a completed base, adding the Ethernet
/// clocking, PHY, and MAC, then re-finalize.
fn extend_ethernet(base: &Soc) -> Result<Soc> {
    let mut composer = SocComposer::extend(base);

    composer.add_reference_domain("eth_rx", "eth_clocks", ETH_CLK_HZ, ResetPolicy::Resettable)?;
    composer.add_reference_domain("eth_tx", "eth_clocks", ETH_CLK_HZ, ResetPolicy::Resettable)?;
    composer.mark_async("sys", "eth_rx")?;
    composer.mark_async("sys", "eth_tx")?;

    composer.register_peripheral(Box::new(EthPhy))?;
    composer.register_peripheral(Box::new(EthMac))?;

    composer.finalize()?;
    composer.into_soc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SHADOW_BASE;
    use rivet_clock::TimingConstraint;

    fn base_soc() -> Soc {
        compose(BoardPlatform::arty_a7_35(), SocConfig::default()).unwrap()
    }

    fn ethernet_soc() -> Soc {
        let config = SocConfig {
            with_ethernet: true,
            ..SocConfig::default()
        };
        compose(BoardPlatform::arty_a7_35(), config).unwrap()
    }

    #[test]
    fn base_csr_assignments() {
        // Scenario A: the base configuration's pinned CSR slots.
        let soc = base_soc();
        assert_eq!(soc.csr_map().resolve("ddrphy").unwrap(), 16);
        assert_eq!(soc.csr_map().resolve("uart_phy0").unwrap(), 17);
        assert_eq!(soc.csr_map().resolve("uart0").unwrap(), 18);
        assert_eq!(soc.csr_map().resolve("uart_phy1").unwrap(), 19);
        assert_eq!(soc.csr_map().resolve("uart1").unwrap(), 20);
        assert_eq!(soc.csr_map().resolve("switches").unwrap(), 21);
    }

    #[test]
    fn base_interrupts_and_registration_order() {
        let soc = base_soc();
        assert_eq!(soc.interrupt_map().resolve("uart0").unwrap(), 3);
        assert_eq!(soc.interrupt_map().resolve("uart1").unwrap(), 4);
        assert_eq!(
            soc.peripherals(),
            &["ddrphy", "uart0", "uart1", "leds", "switches", "buttons"]
        );
    }

    #[test]
    fn auto_csr_slots_fill_gaps_deterministically() {
        let soc = base_soc();
        // Base layer pins 0..=3; leds takes the next free slot, buttons the one after.
        assert_eq!(soc.csr_map().resolve("leds").unwrap(), 4);
        assert_eq!(soc.csr_map().resolve("buttons").unwrap(), 5);
    }

    #[test]
    fn ethernet_extends_without_touching_base() {
        // Scenario B: derived slots resolve, inherited slots are untouched.
        let soc = ethernet_soc();
        assert_eq!(soc.csr_map().resolve("ethphy").unwrap(), 22);
        assert_eq!(soc.csr_map().resolve("ethmac").unwrap(), 23);
        assert_eq!(soc.csr_map().resolve("uart0").unwrap(), 18);
        assert_eq!(soc.interrupt_map().resolve("ethmac").unwrap(), 5);
    }

    #[test]
    fn ethmac_shadow_alias_maps_to_one_region() {
        // Scenario C: primary and shadow addresses resolve to the same region.
        let soc = ethernet_soc();
        assert_eq!(soc.memory_map().resolve("ethmac").unwrap(), 0x3000_0000);

        let primary = soc.regions().locate(0x3000_0000).unwrap();
        let shadow = soc.regions().locate(0x3000_0000 | SHADOW_BASE).unwrap();
        assert_eq!(primary.name, "ethmac");
        assert!(std::ptr::eq(primary, shadow));
    }

    #[test]
    fn registration_after_finalize_fails() {
        let mut composer =
            SocComposer::new(BoardPlatform::arty_a7_35(), SocConfig::default()).unwrap();
        composer.setup_clocks().unwrap();
        composer.finalize().unwrap();

        let err = composer
            .register_peripheral(Box::new(Uart::new(0)))
            .unwrap_err();
        assert!(matches!(err, SocError::AlreadyFinalized));
    }

    #[test]
    fn registration_before_clock_setup_fails() {
        let mut composer =
            SocComposer::new(BoardPlatform::arty_a7_35(), SocConfig::default()).unwrap();
        let err = composer
            .register_peripheral(Box::new(Uart::new(0)))
            .unwrap_err();
        assert!(matches!(err, SocError::ClockNotReady));
    }

    #[test]
    fn peripheral_with_missing_clock_domain_fails() {
        // EthPhy needs eth_rx/eth_tx, which only the extension creates.
        let mut composer =
            SocComposer::new(BoardPlatform::arty_a7_35(), SocConfig::default()).unwrap();
        composer.setup_clocks().unwrap();
        let err = composer.register_peripheral(Box::new(EthPhy)).unwrap_err();
        assert!(matches!(err, SocError::Clock(_)));
    }

    #[test]
    fn double_region_claim_overlaps() {
        let soc = base_soc();
        let mut composer = SocComposer::extend(&soc);
        composer
            .add_reference_domain("eth_rx", "eth_clocks", ETH_CLK_HZ, ResetPolicy::Resettable)
            .unwrap();
        composer
            .add_reference_domain("eth_tx", "eth_clocks", ETH_CLK_HZ, ResetPolicy::Resettable)
            .unwrap();
        composer.register_peripheral(Box::new(EthMac)).unwrap();
        let err = composer.register_peripheral(Box::new(EthMac)).unwrap_err();
        assert!(matches!(err, SocError::AddressOverlap { .. }));
    }

    #[test]
    fn into_soc_requires_finalize() {
        let composer =
            SocComposer::new(BoardPlatform::arty_a7_35(), SocConfig::default()).unwrap();
        let err = composer.into_soc().unwrap_err();
        assert!(matches!(err, SocError::NotFinalized));
    }

    #[test]
    fn ethernet_constraints_include_false_paths() {
        let soc = ethernet_soc();
        let constraints = soc.constraints();

        let has_sys_period = constraints.iter().any(
            |c| matches!(c, TimingConstraint::Period { domain, ns } if domain == "sys" && (*ns - 10.0).abs() < 1e-9),
        );
        let has_eth_period = constraints.iter().any(
            |c| matches!(c, TimingConstraint::Period { domain, ns } if domain == "eth_rx" && (*ns - 80.0).abs() < 1e-9),
        );
        let false_paths = constraints
            .iter()
            .filter(|c| matches!(c, TimingConstraint::FalsePath { .. }))
            .count();

        assert!(has_sys_period);
        assert!(has_eth_period);
        assert_eq!(false_paths, 2);
    }

    #[test]
    fn base_soc_has_no_ethernet_names() {
        let soc = base_soc();
        assert!(soc.csr_map().get("ethmac").is_none());
        assert!(soc.regions().get("ethmac").is_none());
        assert!(soc.clocks().handle("eth_rx").is_none());
    }

    #[test]
    fn rom_and_sram_sizes_follow_config() {
        let config = SocConfig {
            integrated_rom_size: 0x4000,
            integrated_sram_size: 0x2000,
            ..SocConfig::default()
        };
        let soc = compose(BoardPlatform::arty_a7_35(), config).unwrap();
        assert_eq!(soc.regions().get("rom").unwrap().size, 0x4000);
        assert_eq!(soc.regions().get("sram").unwrap().size, 0x2000);
        assert_eq!(soc.memory_map().resolve("rom").unwrap(), 0x0);
        assert_eq!(soc.memory_map().resolve("sram").unwrap(), 0x1000_0000);
    }
}
