//! MDIO (Management Data Input/Output) HAL
//!
//! Station Management Interface access to the external PHY through
//! `MACMIIAR`/`MACMIIDR`, plus the IEEE 802.3 Clause 22 register and bit
//! definitions every 10/100 PHY shares.

use embedded_hal::delay::DelayNs;

use crate::driver::error::{ConfigError, IoError, Result};
use crate::internal::constants::MII_BUSY_TIMEOUT;
use crate::internal::register::mac::{
    MACMIIAR_CR_MASK, MACMIIAR_CR_SHIFT, MACMIIAR_MB, MACMIIAR_MR_MASK, MACMIIAR_MR_SHIFT,
    MACMIIAR_MW, MACMIIAR_PA_MASK, MACMIIAR_PA_SHIFT, MacRegs,
};

// =============================================================================
// MDIO Constants
// =============================================================================

/// Default MDIO operation timeout in microseconds
pub const MDIO_TIMEOUT_US: u32 = 1_000;

/// Largest PHY address the 5-bit PA field can carry
pub const MAX_PHY_ADDR: u8 = 31;

/// Largest register address the 5-bit MR field can carry
pub const MAX_REG_ADDR: u8 = 31;

/// Highest AHB clock the MDC divider table covers.
///
/// HCLK above this is out of range for the part; the divider saturates
/// at /102.
#[cfg(feature = "stm32f7")]
pub const MAX_HCLK_HZ: u32 = 216_000_000;
/// Highest AHB clock the MDC divider table covers.
///
/// HCLK above this is out of range for the part; the divider saturates
/// at /102.
#[cfg(not(feature = "stm32f7"))]
pub const MAX_HCLK_HZ: u32 = 180_000_000;

/// MDC clock divider selection for the MACMIIAR CR field.
///
/// The discriminants are the CR encodings from the reference manual, which
/// is why the numeric order does not follow the divider order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MdcClockDivider {
    /// HCLK/42, for HCLK in 60-100 MHz
    Div42 = 0,
    /// HCLK/62, for HCLK in 100-150 MHz
    Div62 = 1,
    /// HCLK/16, for HCLK in 20-35 MHz
    Div16 = 2,
    /// HCLK/26, for HCLK in 35-60 MHz
    Div26 = 3,
    /// HCLK/102, for HCLK of 150 MHz and up
    #[default]
    Div102 = 4,
}

impl MdcClockDivider {
    /// Pick the divider for an AHB frequency, keeping MDC at or below the
    /// 2.5 MHz ceiling IEEE 802.3 allows.
    pub const fn from_hclk_hz(hclk_hz: u32) -> Self {
        match hclk_hz {
            0..35_000_000 => Self::Div16,
            35_000_000..60_000_000 => Self::Div26,
            60_000_000..100_000_000 => Self::Div42,
            100_000_000..150_000_000 => Self::Div62,
            _ => Self::Div102,
        }
    }

    /// Encoding for the MACMIIAR CR field
    pub const fn to_reg_value(self) -> u32 {
        self as u32
    }
}

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// A serialized MDIO transaction channel.
///
/// Backends range from the MAC's own SMI port to test doubles. Methods take
/// `&mut self` because the bus carries exactly one transaction at a time;
/// whoever owns the bus owns the serialization.
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;

    /// Check if the MDIO bus is busy
    fn is_busy(&self) -> bool;
}

/// Reject 6-bit-or-wider values before they get truncated into MACMIIAR.
fn check_addrs(phy_addr: u8, reg_addr: u8) -> Result<()> {
    if phy_addr > MAX_PHY_ADDR {
        return Err(ConfigError::InvalidPhyAddress.into());
    }
    if reg_addr > MAX_REG_ADDR {
        return Err(ConfigError::InvalidConfig.into());
    }
    Ok(())
}

/// Assemble the MACMIIAR word that starts a transaction once MB is set.
fn mii_address_word(phy_addr: u8, reg_addr: u8, divider: MdcClockDivider, write: bool) -> u32 {
    let pa = ((phy_addr as u32) << MACMIIAR_PA_SHIFT) & MACMIIAR_PA_MASK;
    let mr = ((reg_addr as u32) << MACMIIAR_MR_SHIFT) & MACMIIAR_MR_MASK;
    let cr = (divider.to_reg_value() << MACMIIAR_CR_SHIFT) & MACMIIAR_CR_MASK;
    let mw = if write { MACMIIAR_MW } else { 0 };
    pa | mr | cr | mw | MACMIIAR_MB
}

// =============================================================================
// MDIO Controller
// =============================================================================

/// Timer-paced MDIO controller.
///
/// Owns a [`DelayNs`] provider and polls the MII busy flag in 10 µs steps
/// up to a configurable budget. Suited to callers that already carry a
/// delay source; the driver's embedded port is the spin-bounded
/// [`SmiPort`] instead.
#[derive(Debug)]
pub struct MdioController<D: DelayNs> {
    /// Delay provider pacing the busy polls
    delay: D,
    /// MACMIIAR CR selection
    clock_divider: MdcClockDivider,
    /// Busy-wait budget in microseconds
    timeout_us: u32,
}

impl<D: DelayNs> MdioController<D> {
    /// Controller with the slowest, always-legal MDC divider
    pub fn new(delay: D) -> Self {
        Self::with_clock_divider(delay, MdcClockDivider::Div102)
    }

    /// Controller with an explicit MDC divider
    pub fn with_clock_divider(delay: D, divider: MdcClockDivider) -> Self {
        Self {
            delay,
            clock_divider: divider,
            timeout_us: MDIO_TIMEOUT_US,
        }
    }

    /// Derive the MDC divider from the AHB clock
    pub fn configure_for_hclk(&mut self, hclk_hz: u32) {
        self.clock_divider = MdcClockDivider::from_hclk_hz(hclk_hz);
    }

    /// Change the busy-wait budget
    pub fn set_timeout_us(&mut self, timeout_us: u32) {
        self.timeout_us = timeout_us;
    }

    /// Poll MB until it clears or the budget runs out.
    fn wait_not_busy(&mut self) -> Result<()> {
        let mut remaining = self.timeout_us;
        while MacRegs::is_mii_busy() {
            if remaining == 0 {
                return Err(IoError::PhyTimeout.into());
            }
            self.delay.delay_us(10);
            remaining = remaining.saturating_sub(10);
        }
        Ok(())
    }
}

impl<D: DelayNs> MdioBus for MdioController<D> {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        check_addrs(phy_addr, reg_addr)?;

        self.wait_not_busy()?;
        MacRegs::set_mii_address(mii_address_word(phy_addr, reg_addr, self.clock_divider, false));
        self.wait_not_busy()?;

        Ok((MacRegs::mii_data() & 0xFFFF) as u16)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        check_addrs(phy_addr, reg_addr)?;

        self.wait_not_busy()?;
        // MACMIIDR must hold the value before MB starts the cycle
        MacRegs::set_mii_data(value as u32);
        MacRegs::set_mii_address(mii_address_word(phy_addr, reg_addr, self.clock_divider, true));

        self.wait_not_busy()
    }

    fn is_busy(&self) -> bool {
        MacRegs::is_mii_busy()
    }
}

// =============================================================================
// SMI Port
// =============================================================================

/// SMI port without a delay provider.
///
/// The same bus as [`MdioController`], but the busy-flag wait is a bounded
/// spin loop instead of a timer, which makes the port const-constructible
/// and lets the driver own one as a plain field. The spin budget covers
/// the slowest MDC clock at any supported HCLK; a PHY that never releases
/// the busy flag still produces `PhyTimeout`.
#[derive(Debug)]
pub struct SmiPort {
    divider: MdcClockDivider,
}

impl SmiPort {
    /// Port with the slowest, always-legal MDC divider
    #[must_use]
    pub const fn new() -> Self {
        Self {
            divider: MdcClockDivider::Div102,
        }
    }

    /// Port with an explicit MDC divider
    #[must_use]
    pub const fn with_divider(divider: MdcClockDivider) -> Self {
        Self { divider }
    }

    /// Derive the MDC divider from the AHB clock
    pub fn configure_for_hclk(&mut self, hclk_hz: u32) {
        self.divider = MdcClockDivider::from_hclk_hz(hclk_hz);
    }

    /// Change the MDC divider
    pub fn set_divider(&mut self, divider: MdcClockDivider) {
        self.divider = divider;
    }

    /// Current MDC divider
    pub fn divider(&self) -> MdcClockDivider {
        self.divider
    }

    fn wait_not_busy(&self) -> Result<()> {
        for _ in 0..MII_BUSY_TIMEOUT {
            if !MacRegs::is_mii_busy() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(IoError::PhyTimeout.into())
    }
}

impl Default for SmiPort {
    fn default() -> Self {
        Self::new()
    }
}

impl MdioBus for SmiPort {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        check_addrs(phy_addr, reg_addr)?;

        self.wait_not_busy()?;
        MacRegs::set_mii_address(mii_address_word(phy_addr, reg_addr, self.divider, false));
        self.wait_not_busy()?;

        Ok((MacRegs::mii_data() & 0xFFFF) as u16)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        check_addrs(phy_addr, reg_addr)?;

        self.wait_not_busy()?;
        // MACMIIDR must hold the value before MB starts the cycle
        MacRegs::set_mii_data(value as u32);
        MacRegs::set_mii_address(mii_address_word(phy_addr, reg_addr, self.divider, true));

        self.wait_not_busy()
    }

    fn is_busy(&self) -> bool {
        MacRegs::is_mii_busy()
    }
}

// =============================================================================
// PHY Register Definitions (IEEE 802.3 standard registers)
// =============================================================================

/// Register addresses from IEEE 802.3 Clause 22
pub mod phy_reg {
    /// Basic Mode Control Register
    pub const BMCR: u8 = 0;
    /// Basic Mode Status Register
    pub const BMSR: u8 = 1;
    /// PHY Identifier 1 (OUI bits 3:18)
    pub const PHYIDR1: u8 = 2;
    /// PHY Identifier 2 (OUI tail, model, revision)
    pub const PHYIDR2: u8 = 3;
    /// Auto-Negotiation Advertisement Register
    pub const ANAR: u8 = 4;
    /// Auto-Negotiation Link Partner Ability Register
    pub const ANLPAR: u8 = 5;
    /// Auto-Negotiation Expansion Register
    pub const ANER: u8 = 6;
    /// Auto-Negotiation Next Page Transmit Register
    pub const ANNPTR: u8 = 7;
    /// Auto-Negotiation Next Page Receive Register
    pub const ANNPRR: u8 = 8;
    /// MMD Access Control Register
    pub const MMD_CTRL: u8 = 13;
    /// MMD Access Data Register
    pub const MMD_DATA: u8 = 14;
    /// Extended Status Register
    pub const ESTATUS: u8 = 15;
}

/// Bits of register 0, Basic Mode Control
pub mod bmcr {
    /// Soft reset, self-clearing when the PHY is done
    pub const RESET: u16 = 1 << 15;
    /// Digital loopback
    pub const LOOPBACK: u16 = 1 << 14;
    /// Forced speed: set for 100 Mbps (ignored while AN is enabled)
    pub const SPEED_100: u16 = 1 << 13;
    /// Auto-negotiation enable
    pub const AN_ENABLE: u16 = 1 << 12;
    /// Power down
    pub const POWER_DOWN: u16 = 1 << 11;
    /// Electrically isolate the MII
    pub const ISOLATE: u16 = 1 << 10;
    /// Restart auto-negotiation, self-clearing
    pub const AN_RESTART: u16 = 1 << 9;
    /// Forced duplex: set for full (ignored while AN is enabled)
    pub const DUPLEX_FULL: u16 = 1 << 8;
}

/// Bits of register 1, Basic Mode Status
pub mod bmsr {
    /// 100BASE-T4 capable
    pub const T4_CAPABLE: u16 = 1 << 15;
    /// 100BASE-TX full-duplex capable
    pub const TX_FD_CAPABLE: u16 = 1 << 14;
    /// 100BASE-TX half-duplex capable
    pub const TX_HD_CAPABLE: u16 = 1 << 13;
    /// 10BASE-T full-duplex capable
    pub const T10_FD_CAPABLE: u16 = 1 << 12;
    /// 10BASE-T half-duplex capable
    pub const T10_HD_CAPABLE: u16 = 1 << 11;
    /// Extended status available in register 15
    pub const ESTATUS: u16 = 1 << 8;
    /// Management frames accepted with suppressed preamble
    pub const MF_PREAMBLE_SUPP: u16 = 1 << 6;
    /// Auto-negotiation has finished
    pub const AN_COMPLETE: u16 = 1 << 5;
    /// Partner signalled remote fault
    pub const REMOTE_FAULT: u16 = 1 << 4;
    /// PHY can auto-negotiate
    pub const AN_ABILITY: u16 = 1 << 3;
    /// Link is up. Latching-low: one read after a drop still shows 0
    pub const LINK_STATUS: u16 = 1 << 2;
    /// Jabber condition seen
    pub const JABBER_DETECT: u16 = 1 << 1;
    /// Extended register set present
    pub const EXT_CAPABLE: u16 = 1 << 0;
}

/// Bits of register 4, Auto-Negotiation Advertisement
pub mod anar {
    /// More pages to follow
    pub const NEXT_PAGE: u16 = 1 << 15;
    /// Base page received (read side)
    pub const ACK: u16 = 1 << 14;
    /// Advertise a remote fault
    pub const REMOTE_FAULT: u16 = 1 << 13;
    /// Advertise symmetric PAUSE
    pub const PAUSE: u16 = 1 << 10;
    /// Advertise 100BASE-T4
    pub const T4: u16 = 1 << 9;
    /// Advertise 100BASE-TX full duplex
    pub const TX_FD: u16 = 1 << 8;
    /// Advertise 100BASE-TX half duplex
    pub const TX_HD: u16 = 1 << 7;
    /// Advertise 10BASE-T full duplex
    pub const T10_FD: u16 = 1 << 6;
    /// Advertise 10BASE-T half duplex
    pub const T10_HD: u16 = 1 << 5;
    /// Protocol selector field
    pub const SELECTOR_MASK: u16 = 0x001F;
    /// Selector value for IEEE 802.3
    pub const SELECTOR_802_3: u16 = 0x0001;
}

/// Bits of register 5, Link Partner Ability.
///
/// Mirrors the ANAR layout; the values describe what the partner put in
/// its base page.
pub mod anlpar {
    /// Partner has more pages
    pub const NEXT_PAGE: u16 = 1 << 15;
    /// Partner received our base page
    pub const ACK: u16 = 1 << 14;
    /// Partner signals remote fault
    pub const REMOTE_FAULT: u16 = 1 << 13;
    /// Partner supports asymmetric PAUSE
    pub const PAUSE_ASYM: u16 = 1 << 11;
    /// Partner supports symmetric PAUSE
    pub const PAUSE: u16 = 1 << 10;
    /// Partner offers 100BASE-T4
    pub const CAN_100_T4: u16 = 1 << 9;
    /// Partner offers 100BASE-TX full duplex
    pub const CAN_100_FD: u16 = 1 << 8;
    /// Partner offers 100BASE-TX half duplex
    pub const CAN_100_HD: u16 = 1 << 7;
    /// Partner offers 10BASE-T full duplex
    pub const CAN_10_FD: u16 = 1 << 6;
    /// Partner offers 10BASE-T half duplex
    pub const CAN_10_HD: u16 = 1 << 5;
    /// Protocol selector field
    pub const SELECTOR_MASK: u16 = 0x001F;
    /// Selector value for IEEE 802.3
    pub const SELECTOR_802_3: u16 = 0x0001;
}

// =============================================================================
// PHY Helper Functions
// =============================================================================

/// Snapshot of the standard control/status registers
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyStatus {
    /// Link is up
    pub link_up: bool,
    /// Auto-negotiation complete
    pub an_complete: bool,
    /// Speed (true = 100 Mbps, false = 10 Mbps)
    pub speed_100: bool,
    /// Duplex (true = full, false = half)
    pub full_duplex: bool,
}

/// Snapshot BMSR/BMCR into a [`PhyStatus`].
///
/// Speed and duplex come from BMCR, so they reflect forced configuration,
/// not a negotiated result.
pub fn read_phy_status<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<PhyStatus> {
    let bmsr = mdio.read(phy_addr, phy_reg::BMSR)?;
    let bmcr = mdio.read(phy_addr, phy_reg::BMCR)?;

    Ok(PhyStatus {
        link_up: bmsr & bmsr::LINK_STATUS != 0,
        an_complete: bmsr & bmsr::AN_COMPLETE != 0,
        speed_100: bmcr & bmcr::SPEED_100 != 0,
        full_duplex: bmcr & bmcr::DUPLEX_FULL != 0,
    })
}

/// Kick off a PHY soft reset; callers poll BMCR for the self-clear.
pub fn reset_phy<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<()> {
    mdio.write(phy_addr, phy_reg::BMCR, bmcr::RESET)
}

/// Read the 32-bit PHY identifier (PHYIDR1 in the high half)
pub fn read_phy_id<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<u32> {
    let hi = mdio.read(phy_addr, phy_reg::PHYIDR1)? as u32;
    let lo = mdio.read(phy_addr, phy_reg::PHYIDR2)? as u32;
    Ok((hi << 16) | lo)
}

/// Turn auto-negotiation on and restart it, dropping ISOLATE if set.
pub fn enable_auto_negotiation<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<()> {
    let bmcr = mdio.read(phy_addr, phy_reg::BMCR)?;
    mdio.write(
        phy_addr,
        phy_reg::BMCR,
        (bmcr | bmcr::AN_ENABLE | bmcr::AN_RESTART) & !bmcr::ISOLATE,
    )
}

/// Force the PHY to a fixed speed/duplex with auto-negotiation off.
pub fn force_speed_duplex<M: MdioBus>(
    mdio: &mut M,
    phy_addr: u8,
    speed_100: bool,
    full_duplex: bool,
) -> Result<()> {
    let mut bmcr = mdio.read(phy_addr, phy_reg::BMCR)?;

    bmcr &= !(bmcr::AN_ENABLE | bmcr::ISOLATE | bmcr::SPEED_100 | bmcr::DUPLEX_FULL);
    if speed_100 {
        bmcr |= bmcr::SPEED_100;
    }
    if full_duplex {
        bmcr |= bmcr::DUPLEX_FULL;
    }

    mdio.write(phy_addr, phy_reg::BMCR, bmcr)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Clock Divider Tests
    // =========================================================================

    #[test]
    fn divider_table_covers_the_clock_tree() {
        let table = [
            (16_000_000, MdcClockDivider::Div16),   // HSI, no PLL
            (48_000_000, MdcClockDivider::Div26),   // USB-friendly mid range
            (84_000_000, MdcClockDivider::Div42),   // F401 class
            (120_000_000, MdcClockDivider::Div62),  // F2 class
            (168_000_000, MdcClockDivider::Div102), // F407 full speed
            (MAX_HCLK_HZ, MdcClockDivider::Div102), // table top saturates
        ];
        for (hclk, expected) in table {
            assert_eq!(MdcClockDivider::from_hclk_hz(hclk), expected, "hclk={hclk}");
        }
    }

    #[test]
    fn divider_boundaries_round_down() {
        // Each boundary frequency belongs to the next (slower-MDC) band.
        assert_eq!(MdcClockDivider::from_hclk_hz(35_000_000), MdcClockDivider::Div26);
        assert_eq!(MdcClockDivider::from_hclk_hz(60_000_000), MdcClockDivider::Div42);
        assert_eq!(MdcClockDivider::from_hclk_hz(100_000_000), MdcClockDivider::Div62);
        assert_eq!(MdcClockDivider::from_hclk_hz(150_000_000), MdcClockDivider::Div102);
    }

    #[test]
    fn divider_cr_encodings_match_the_manual() {
        // CR is 3 bits; the encodings are fixed by the reference manual.
        let encodings = [
            (MdcClockDivider::Div42, 0),
            (MdcClockDivider::Div62, 1),
            (MdcClockDivider::Div16, 2),
            (MdcClockDivider::Div26, 3),
            (MdcClockDivider::Div102, 4),
        ];
        for (div, enc) in encodings {
            assert_eq!(div.to_reg_value(), enc);
            assert!(div.to_reg_value() <= 0x7);
        }
    }

    #[test]
    fn divider_default_is_the_safe_one() {
        assert_eq!(MdcClockDivider::default(), MdcClockDivider::Div102);
    }

    // =========================================================================
    // SMI Port Tests
    // =========================================================================

    #[test]
    fn smi_port_starts_with_safe_divider() {
        assert_eq!(SmiPort::new().divider(), MdcClockDivider::Div102);
    }

    #[test]
    fn smi_port_divider_tracks_hclk() {
        let mut port = SmiPort::with_divider(MdcClockDivider::Div16);
        assert_eq!(port.divider(), MdcClockDivider::Div16);

        port.configure_for_hclk(180_000_000);
        assert_eq!(port.divider(), MdcClockDivider::Div102);

        port.configure_for_hclk(48_000_000);
        assert_eq!(port.divider(), MdcClockDivider::Div26);

        port.set_divider(MdcClockDivider::Div42);
        assert_eq!(port.divider(), MdcClockDivider::Div42);
    }

    // =========================================================================
    // Address Word Tests
    // =========================================================================

    #[test]
    fn address_word_places_every_field() {
        let word = mii_address_word(0x1F, 0x1F, MdcClockDivider::Div102, false);
        assert_eq!(word & MACMIIAR_PA_MASK, 0x1F << MACMIIAR_PA_SHIFT);
        assert_eq!(word & MACMIIAR_MR_MASK, 0x1F << MACMIIAR_MR_SHIFT);
        assert_eq!(word & MACMIIAR_CR_MASK, 4 << MACMIIAR_CR_SHIFT);
        assert_eq!(word & MACMIIAR_MW, 0);
        assert_ne!(word & MACMIIAR_MB, 0, "MB must start the cycle");
    }

    #[test]
    fn address_word_write_flag() {
        let rd = mii_address_word(1, 2, MdcClockDivider::Div16, false);
        let wr = mii_address_word(1, 2, MdcClockDivider::Div16, true);
        assert_eq!(rd | MACMIIAR_MW, wr);
    }

    // =========================================================================
    // Standard-Register Bit Tests
    // =========================================================================

    #[test]
    fn bmsr_link_and_an_bits() {
        let up_and_done = bmsr::LINK_STATUS | bmsr::AN_COMPLETE;
        assert!(up_and_done & bmsr::LINK_STATUS != 0);
        assert!(up_and_done & bmsr::AN_COMPLETE != 0);

        let idle: u16 = bmsr::AN_ABILITY | bmsr::EXT_CAPABLE;
        assert!(idle & bmsr::LINK_STATUS == 0);
        assert!(idle & bmsr::AN_COMPLETE == 0);
    }

    #[test]
    fn bmsr_capability_bits_are_distinct() {
        let caps = [
            bmsr::TX_FD_CAPABLE,
            bmsr::TX_HD_CAPABLE,
            bmsr::T10_FD_CAPABLE,
            bmsr::T10_HD_CAPABLE,
            bmsr::AN_ABILITY,
        ];
        let mut acc = 0u16;
        for cap in caps {
            assert_eq!(acc & cap, 0, "overlapping capability bit");
            acc |= cap;
        }
    }

    #[test]
    fn anlpar_partner_ability_decode() {
        let fast_partner = anlpar::CAN_100_FD | anlpar::SELECTOR_802_3;
        assert!(fast_partner & anlpar::CAN_100_FD != 0);
        assert!(fast_partner & anlpar::CAN_100_HD == 0);

        let slow_partner = anlpar::CAN_10_HD | anlpar::SELECTOR_802_3;
        assert!(slow_partner & anlpar::CAN_10_HD != 0);
        assert!(slow_partner & (anlpar::CAN_100_FD | anlpar::CAN_100_HD | anlpar::CAN_10_FD) == 0);
    }

    #[test]
    fn anlpar_pause_bit() {
        assert!((anlpar::PAUSE | anlpar::SELECTOR_802_3) & anlpar::PAUSE != 0);
        assert!(anlpar::SELECTOR_802_3 & anlpar::PAUSE == 0);
    }

    #[test]
    fn bmcr_bit_positions() {
        assert_eq!(bmcr::RESET, 0x8000);
        assert_eq!(bmcr::AN_ENABLE, 0x1000);
        assert_eq!(bmcr::SPEED_100 | bmcr::DUPLEX_FULL, 0x2100);
    }

    #[test]
    fn bmcr_an_restart_combination() {
        let word = bmcr::AN_ENABLE | bmcr::AN_RESTART;
        assert!(word & bmcr::AN_ENABLE != 0);
        assert!(word & bmcr::AN_RESTART != 0);
        assert!(word & bmcr::RESET == 0);
    }

    // =========================================================================
    // PhyStatus Tests
    // =========================================================================

    #[test]
    fn phy_status_default_is_all_down() {
        let status = PhyStatus::default();
        assert!(!status.link_up && !status.an_complete);
        assert!(!status.speed_100 && !status.full_duplex);
    }
}
