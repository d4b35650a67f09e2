//! Driver configuration
//!
//! [`EthConfig`] gathers everything `init` needs: the PHY interface and
//! address, the station MAC address, HCLK (for the MDC divider), DMA burst
//! sizing, and the nested checksum, flow-control and link policies. All
//! builders are `const fn` so a board configuration can live in a `const`.

use crate::hal::mdio::MAX_HCLK_HZ;
use crate::internal::constants::{
    AUTONEG_TIMEOUT_MS, DEFAULT_FLOW_HIGH_WATER, DEFAULT_FLOW_LOW_WATER, DEFAULT_MAC_ADDR,
    LINK_UP_TIMEOUT_MS, PAUSE_TIME_MAX, PHY_CONFIG_DELAY_MS, SOFT_RESET_TIMEOUT_MS,
};

/// Ethernet link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    /// 10 Mbps
    Mbps10,
    /// 100 Mbps
    #[default]
    Mbps100,
}

/// Ethernet duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex
    Half,
    /// Full duplex
    #[default]
    Full,
}

/// MII or RMII attach to the PHY.
///
/// Latched into SYSCFG while the MAC is held in reset; the matching
/// alternate-function pins are the application's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhyInterface {
    /// Media Independent Interface
    Mii,
    /// Reduced MII, clocked by the PHY's 50 MHz REF_CLK
    #[default]
    Rmii,
}

/// AHB burst length for descriptor and buffer transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DmaBurstLen {
    /// Single-beat bursts
    Burst1 = 1,
    /// 2-beat bursts
    Burst2 = 2,
    /// 4-beat bursts
    Burst4 = 4,
    /// 8-beat bursts
    Burst8 = 8,
    /// 16-beat bursts
    Burst16 = 16,
    /// 32-beat bursts, the default
    #[default]
    Burst32 = 32,
}

impl DmaBurstLen {
    /// The PBL field value this burst length programs
    #[must_use]
    pub const fn to_pbl(self) -> u32 {
        self as u32
    }
}

/// Perfect-filter slots available beyond the station address
pub const MAC_FILTER_SLOTS: usize = 3;

/// Which address a perfect-filter slot compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacFilterType {
    /// Match the destination address
    #[default]
    Destination,
    /// Match the source address
    Source,
}

/// One perfect-filter entry.
///
/// `byte_mask` wildcards address bytes: bit `n` set means byte `n` of
/// `address` is skipped in the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddressFilter {
    /// Address to compare
    pub address: [u8; 6],
    /// Destination or source comparison
    pub filter_type: MacFilterType,
    /// Per-byte wildcard mask (bit 0 = `address[0]`)
    pub byte_mask: u8,
}

impl MacAddressFilter {
    const fn entry(address: [u8; 6], filter_type: MacFilterType, byte_mask: u8) -> Self {
        Self {
            address,
            filter_type,
            byte_mask,
        }
    }

    /// Exact destination-address match
    #[must_use]
    pub const fn new(address: [u8; 6]) -> Self {
        Self::entry(address, MacFilterType::Destination, 0)
    }

    /// Exact source-address match
    #[must_use]
    pub const fn source(address: [u8; 6]) -> Self {
        Self::entry(address, MacFilterType::Source, 0)
    }

    /// Destination match with wildcarded bytes, for address ranges
    #[must_use]
    pub const fn with_mask(address: [u8; 6], byte_mask: u8) -> Self {
        Self::entry(address, MacFilterType::Destination, byte_mask)
    }
}

// =============================================================================
// Link Negotiation Policy
// =============================================================================

/// How the driver brings the link up.
///
/// With `auto_negotiation` set the PHY negotiates with its partner and
/// `speed`/`duplex` only apply as the forced fallback once `an_timeout_ms`
/// runs out. With it clear the PHY is forced immediately. The fallback is
/// one-way within a bring-up: negotiation is tried first, never retried
/// after forcing until the link drops and comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Try auto-negotiation before any forced configuration
    pub auto_negotiation: bool,
    /// Forced (or fallback) speed
    pub speed: Speed,
    /// Forced (or fallback) duplex
    pub duplex: Duplex,
    /// Milliseconds to let a forced configuration settle
    pub settle_delay_ms: u32,
    /// Milliseconds to wait for link-up
    pub link_timeout_ms: u32,
    /// Milliseconds to wait for negotiation to complete
    pub an_timeout_ms: u32,
    /// Milliseconds between status polls while waiting
    pub poll_interval_ms: u32,
}

impl LinkConfig {
    const fn with_policy(auto_negotiation: bool, speed: Speed, duplex: Duplex) -> Self {
        Self {
            auto_negotiation,
            speed,
            duplex,
            settle_delay_ms: PHY_CONFIG_DELAY_MS,
            link_timeout_ms: LINK_UP_TIMEOUT_MS,
            an_timeout_ms: AUTONEG_TIMEOUT_MS,
            poll_interval_ms: 1,
        }
    }

    /// Negotiate, with 100 Mbps full duplex as the fallback
    #[must_use]
    pub const fn auto() -> Self {
        Self::with_policy(true, Speed::Mbps100, Duplex::Full)
    }

    /// Force `speed`/`duplex` without negotiating
    #[must_use]
    pub const fn manual(speed: Speed, duplex: Duplex) -> Self {
        Self::with_policy(false, speed, duplex)
    }

    /// Override the link-up wait budget
    #[must_use]
    pub const fn with_link_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.link_timeout_ms = timeout_ms;
        self
    }

    /// Override the negotiation wait budget
    #[must_use]
    pub const fn with_an_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.an_timeout_ms = timeout_ms;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::auto()
    }
}

/// Checksum offload selection for both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChecksumConfig {
    /// Verify IP/TCP/UDP checksums on receive
    pub rx_checksum: bool,
    /// What the transmit path inserts
    pub tx_checksum: TxChecksumMode,
}

impl ChecksumConfig {
    const DISABLED: Self = Self {
        rx_checksum: false,
        tx_checksum: TxChecksumMode::Disabled,
    };
}

/// IEEE 802.3 PAUSE-based flow control.
///
/// The driver sends PAUSE when free RX descriptors fall to
/// `low_water_mark` and a zero-quanta resume once they recover past
/// `high_water_mark`. Whether PAUSE is honored at all also depends on
/// what auto-negotiation agreed with the partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlowControlConfig {
    /// Whether the driver exercises flow control at all
    pub enabled: bool,
    /// Free-descriptor count that triggers a PAUSE
    pub low_water_mark: usize,
    /// Free-descriptor count that triggers the resume
    pub high_water_mark: usize,
    /// PAUSE duration in slot times of 512 bit times
    pub pause_time: u16,
    /// When the hardware refreshes an outstanding PAUSE
    pub pause_low_threshold: PauseLowThreshold,
    /// Also detect PAUSE frames addressed to the station address
    pub unicast_pause_detect: bool,
}

impl FlowControlConfig {
    const DISABLED: Self = Self {
        enabled: false,
        low_water_mark: DEFAULT_FLOW_LOW_WATER,
        high_water_mark: DEFAULT_FLOW_HIGH_WATER,
        pause_time: PAUSE_TIME_MAX,
        pause_low_threshold: PauseLowThreshold::Minus4,
        unicast_pause_detect: false,
    };

    /// Enabled flow control with the given descriptor thresholds
    #[must_use]
    pub const fn with_water_marks(low: usize, high: usize) -> Self {
        Self {
            enabled: true,
            low_water_mark: low,
            high_water_mark: high,
            ..Self::DISABLED
        }
    }
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// PLT field: how far the PAUSE timer runs down before a refresh PAUSE
/// goes out, relative to `pause_time`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PauseLowThreshold {
    /// 4 slot times before expiry
    #[default]
    Minus4 = 0,
    /// 28 slot times before expiry
    Minus28 = 1,
    /// 144 slot times before expiry
    Minus144 = 2,
    /// 256 slot times before expiry
    Minus256 = 3,
}

/// CIC field: how much checksum the transmit engine inserts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TxChecksumMode {
    /// No insertion
    #[default]
    Disabled = 0,
    /// IP header checksum only
    IpHeaderOnly = 1,
    /// IP header plus payload, without the pseudo-header
    IpAndPayload = 2,
    /// IP header plus payload including the pseudo-header
    Full = 3,
}

// =============================================================================
// Pin Assignments
// =============================================================================

// The ETH signals are alternate-function mapped (AF11) and the application
// configures them before `init`, together with the RCC GPIO clocks. The
// common RMII layout on Nucleo-144 boards:
//
// | Signal   | Pin  | Direction | Description                     |
// |----------|------|-----------|---------------------------------|
// | REF_CLK  | PA1  | Input     | 50 MHz Reference Clock          |
// | MDIO     | PA2  | Bidir     | Management Data                 |
// | CRS_DV   | PA7  | Input     | Carrier Sense / Data Valid      |
// | MDC      | PC1  | Output    | Management Clock                |
// | RXD0     | PC4  | Input     | Receive Data 0                  |
// | RXD1     | PC5  | Input     | Receive Data 1                  |
// | TX_EN    | PG11 | Output    | Transmit Enable                 |
// | TXD0     | PG13 | Output    | Transmit Data 0                 |
// | TXD1     | PB13 | Output    | Transmit Data 1                 |
//
// See the board modules for per-board pin tables.

/// Everything `init` needs, with builder-style setters
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EthConfig {
    /// MII or RMII
    pub phy_interface: PhyInterface,
    /// Station MAC address
    pub mac_address: [u8; 6],
    /// PHY address on the MDIO bus (0-31)
    pub phy_addr: u8,
    /// AHB clock in Hz, from which the MDC divider is derived.
    ///
    /// The default is the device maximum, which picks the slowest divider
    /// and is therefore always safe; set the real HCLK for faster
    /// management access.
    pub hclk_hz: u32,
    /// AHB burst length for the DMA
    pub dma_burst_len: DmaBurstLen,
    /// Budget for the DMA soft reset, in milliseconds
    pub sw_reset_timeout_ms: u32,
    /// Receive everything, bypassing all filters
    pub promiscuous: bool,
    /// Checksum offload selection
    pub checksum: ChecksumConfig,
    /// PAUSE flow control policy
    pub flow_control: FlowControlConfig,
    /// Link bring-up policy
    pub link: LinkConfig,
}

impl Default for EthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EthConfig {
    /// RMII at PHY address 0, locally administered MAC, offloads off
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phy_interface: PhyInterface::Rmii,
            mac_address: DEFAULT_MAC_ADDR,
            phy_addr: 0,
            hclk_hz: MAX_HCLK_HZ,
            dma_burst_len: DmaBurstLen::Burst32,
            sw_reset_timeout_ms: SOFT_RESET_TIMEOUT_MS,
            promiscuous: false,
            checksum: ChecksumConfig::DISABLED,
            flow_control: FlowControlConfig::DISABLED,
            link: LinkConfig::auto(),
        }
    }

    /// Configuration for the Nucleo-144 boards.
    ///
    /// The ST reference designs strap the LAN8742A to PHY address 0 on
    /// RMII, which is exactly the [`Self::new`] default.
    #[must_use]
    pub const fn nucleo_default() -> Self {
        Self::new()
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Select MII or RMII
    #[must_use]
    pub const fn with_phy_interface(mut self, interface: PhyInterface) -> Self {
        self.phy_interface = interface;
        self
    }

    /// Set the station MAC address.
    ///
    /// Left unset, the locally administered 02:00:00:00:00:01 is used.
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; 6]) -> Self {
        self.mac_address = addr;
        self
    }

    /// Set the PHY's MDIO bus address
    #[must_use]
    pub const fn with_phy_addr(mut self, addr: u8) -> Self {
        self.phy_addr = addr;
        self
    }

    /// Tell the driver the real AHB clock for MDC divider selection
    #[must_use]
    pub const fn with_hclk_hz(mut self, hclk_hz: u32) -> Self {
        self.hclk_hz = hclk_hz;
        self
    }

    /// Select the DMA burst length
    #[must_use]
    pub const fn with_dma_burst_len(mut self, burst_len: DmaBurstLen) -> Self {
        self.dma_burst_len = burst_len;
        self
    }

    /// Override the soft-reset budget
    #[must_use]
    pub const fn with_reset_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.sw_reset_timeout_ms = timeout_ms;
        self
    }

    /// Receive all frames regardless of address
    #[must_use]
    pub const fn with_promiscuous(mut self, enabled: bool) -> Self {
        self.promiscuous = enabled;
        self
    }

    /// Replace the whole checksum policy
    #[must_use]
    pub const fn with_checksum(mut self, checksum: ChecksumConfig) -> Self {
        self.checksum = checksum;
        self
    }

    /// Toggle receive checksum verification
    #[must_use]
    pub const fn with_rx_checksum(mut self, enabled: bool) -> Self {
        self.checksum.rx_checksum = enabled;
        self
    }

    /// Select the transmit checksum insertion mode
    #[must_use]
    pub const fn with_tx_checksum(mut self, mode: TxChecksumMode) -> Self {
        self.checksum.tx_checksum = mode;
        self
    }

    /// Replace the whole flow control policy
    #[must_use]
    pub const fn with_flow_control(mut self, flow_control: FlowControlConfig) -> Self {
        self.flow_control = flow_control;
        self
    }

    /// Toggle flow control, keeping the threshold defaults
    #[must_use]
    pub const fn with_flow_control_enabled(mut self, enabled: bool) -> Self {
        self.flow_control.enabled = enabled;
        self
    }

    /// Replace the link bring-up policy
    #[must_use]
    pub const fn with_link(mut self, link: LinkConfig) -> Self {
        self.link = link;
        self
    }

    /// Toggle auto-negotiation, keeping the rest of the link policy
    #[must_use]
    pub const fn with_auto_negotiation(mut self, enabled: bool) -> Self {
        self.link.auto_negotiation = enabled;
        self
    }

    /// Force a fixed speed/duplex, replacing the link policy wholesale
    #[must_use]
    pub const fn with_forced_link(mut self, speed: Speed, duplex: Duplex) -> Self {
        self.link = LinkConfig::manual(speed, duplex);
        self
    }
}

/// Driver lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// `init` has not run
    #[default]
    Uninitialized,
    /// Initialized, TX/RX not yet enabled
    Initialized,
    /// TX/RX enabled
    Running,
    /// TX/RX disabled again after running
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::constants::DEFAULT_MAC_ADDR;

    #[test]
    fn new_config_is_safe_rmii_baseline() {
        let cfg = EthConfig::new();

        assert_eq!(cfg.phy_interface, PhyInterface::Rmii);
        assert_eq!(cfg.phy_addr, 0);
        assert_eq!(cfg.mac_address, DEFAULT_MAC_ADDR);
        assert_eq!(cfg.hclk_hz, MAX_HCLK_HZ);
        assert_eq!(cfg.dma_burst_len, DmaBurstLen::Burst32);
        assert!(!cfg.promiscuous);

        // All offloads and flow control start disabled
        assert_eq!(cfg.checksum, ChecksumConfig::DISABLED);
        assert!(!cfg.flow_control.enabled);
        assert!(cfg.link.auto_negotiation);
    }

    #[test]
    fn default_and_nucleo_are_the_baseline() {
        for cfg in [EthConfig::default(), EthConfig::nucleo_default()] {
            let base = EthConfig::new();
            assert_eq!(cfg.phy_interface, base.phy_interface);
            assert_eq!(cfg.phy_addr, base.phy_addr);
            assert_eq!(cfg.mac_address, base.mac_address);
            assert_eq!(cfg.dma_burst_len, base.dma_burst_len);
        }
    }

    #[test]
    fn builders_compose() {
        let station = [0x02, 0xF0, 0x0D, 0xCA, 0xFE, 0x01];
        let cfg = EthConfig::new()
            .with_mac_address(station)
            .with_phy_interface(PhyInterface::Mii)
            .with_phy_addr(3)
            .with_hclk_hz(168_000_000)
            .with_dma_burst_len(DmaBurstLen::Burst8)
            .with_reset_timeout_ms(50)
            .with_promiscuous(true)
            .with_rx_checksum(true)
            .with_tx_checksum(TxChecksumMode::Full)
            .with_flow_control_enabled(true);

        assert_eq!(cfg.mac_address, station);
        assert_eq!(cfg.phy_interface, PhyInterface::Mii);
        assert_eq!(cfg.phy_addr, 3);
        assert_eq!(cfg.hclk_hz, 168_000_000);
        assert_eq!(cfg.dma_burst_len, DmaBurstLen::Burst8);
        assert_eq!(cfg.sw_reset_timeout_ms, 50);
        assert!(cfg.promiscuous);
        assert!(cfg.checksum.rx_checksum);
        assert_eq!(cfg.checksum.tx_checksum, TxChecksumMode::Full);
        assert!(cfg.flow_control.enabled);
    }

    #[test]
    fn checksum_builder_leaves_other_direction_alone() {
        let cfg = EthConfig::new().with_tx_checksum(TxChecksumMode::IpHeaderOnly);
        assert!(!cfg.checksum.rx_checksum);

        let cfg = cfg.with_rx_checksum(true);
        assert_eq!(cfg.checksum.tx_checksum, TxChecksumMode::IpHeaderOnly);
    }

    #[test]
    fn auto_link_policy_negotiates_with_100_full_fallback() {
        let link = LinkConfig::auto();

        assert!(link.auto_negotiation);
        assert_eq!((link.speed, link.duplex), (Speed::Mbps100, Duplex::Full));
        assert_eq!(link.settle_delay_ms, PHY_CONFIG_DELAY_MS);
        assert_eq!(link.link_timeout_ms, LINK_UP_TIMEOUT_MS);
        assert_eq!(link.an_timeout_ms, AUTONEG_TIMEOUT_MS);
    }

    #[test]
    fn manual_link_policy_skips_negotiation() {
        let link = LinkConfig::manual(Speed::Mbps10, Duplex::Half);

        assert!(!link.auto_negotiation);
        assert_eq!((link.speed, link.duplex), (Speed::Mbps10, Duplex::Half));
    }

    #[test]
    fn link_timeout_builders_only_touch_their_budget() {
        let link = LinkConfig::auto()
            .with_link_timeout_ms(750)
            .with_an_timeout_ms(1_500);

        assert_eq!(link.link_timeout_ms, 750);
        assert_eq!(link.an_timeout_ms, 1_500);
        assert_eq!(link.settle_delay_ms, PHY_CONFIG_DELAY_MS);
    }

    #[test]
    fn forced_link_builder_replaces_the_policy() {
        let cfg = EthConfig::new()
            .with_link(LinkConfig::auto().with_an_timeout_ms(9))
            .with_forced_link(Speed::Mbps10, Duplex::Half);

        assert!(!cfg.link.auto_negotiation);
        assert_eq!(cfg.link.speed, Speed::Mbps10);
        assert_eq!(cfg.link.duplex, Duplex::Half);
        // wholesale replacement, not a field tweak
        assert_eq!(cfg.link.an_timeout_ms, AUTONEG_TIMEOUT_MS);
    }

    #[test]
    fn auto_negotiation_toggle_keeps_fallback() {
        let cfg = EthConfig::new().with_auto_negotiation(false);

        assert!(!cfg.link.auto_negotiation);
        assert_eq!(cfg.link.speed, Speed::Mbps100);
    }

    #[test]
    fn burst_variants_encode_their_beat_count() {
        let table = [
            (DmaBurstLen::Burst1, 1),
            (DmaBurstLen::Burst2, 2),
            (DmaBurstLen::Burst4, 4),
            (DmaBurstLen::Burst8, 8),
            (DmaBurstLen::Burst16, 16),
            (DmaBurstLen::Burst32, 32),
        ];
        for (burst, beats) in table {
            assert_eq!(burst.to_pbl(), beats);
        }
    }

    #[test]
    fn enum_defaults_pick_the_common_case() {
        assert_eq!(Speed::default(), Speed::Mbps100);
        assert_eq!(Duplex::default(), Duplex::Full);
        assert_eq!(PhyInterface::default(), PhyInterface::Rmii);
        assert_eq!(State::default(), State::Uninitialized);
        assert_eq!(TxChecksumMode::default(), TxChecksumMode::Disabled);
        assert_eq!(PauseLowThreshold::default(), PauseLowThreshold::Minus4);
    }

    #[test]
    fn filter_constructors_set_type_and_mask() {
        let uni = [0x02, 0x11, 0x22, 0x33, 0x44, 0x55];

        let dst = MacAddressFilter::new(uni);
        assert_eq!(dst.filter_type, MacFilterType::Destination);
        assert_eq!(dst.byte_mask, 0);

        let src = MacAddressFilter::source(uni);
        assert_eq!(src.filter_type, MacFilterType::Source);
        assert_eq!(src.address, uni);
    }

    #[test]
    fn masked_filter_wildcards_the_low_bytes() {
        // IPv4 multicast OUI prefix; last three bytes wildcarded
        let prefix = [0x01, 0x00, 0x5E, 0x00, 0x00, 0x00];
        let filter = MacAddressFilter::with_mask(prefix, 0b11_1000);

        assert_eq!(filter.filter_type, MacFilterType::Destination);
        assert_eq!(filter.byte_mask, 0b11_1000);
    }

    #[test]
    fn flow_control_defaults_are_off_but_configured() {
        let fc = FlowControlConfig::default();

        assert!(!fc.enabled);
        assert_eq!(fc.low_water_mark, DEFAULT_FLOW_LOW_WATER);
        assert_eq!(fc.high_water_mark, DEFAULT_FLOW_HIGH_WATER);
        assert_eq!(fc.pause_time, PAUSE_TIME_MAX);
        assert!(!fc.unicast_pause_detect);
    }

    #[test]
    fn water_mark_constructor_enables_flow_control() {
        let fc = FlowControlConfig::with_water_marks(2, 8);

        assert!(fc.enabled);
        assert_eq!(fc.low_water_mark, 2);
        assert_eq!(fc.high_water_mark, 8);
        assert_eq!(fc.pause_time, PAUSE_TIME_MAX);
    }
}
