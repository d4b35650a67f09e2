//! LAN8742A PHY Driver
//!
//! Driver for the Microchip (SMSC) LAN8742A 10/100 Ethernet PHY, the
//! transceiver fitted to the ST Nucleo-144 boards (F429ZI, F746ZG, F767ZI)
//! and many other STM32 designs. The PHY is wired for RMII with a 50 MHz
//! reference clock supplied on REF_CLK.
//!
//! # Wiring (Nucleo-144 boards)
//!
//! | Signal  | MCU pin | Notes                        |
//! |---------|---------|------------------------------|
//! | REF_CLK | PA1     | 50 MHz RMII reference clock  |
//! | MDIO    | PA2     | Management data              |
//! | MDC     | PC1     | Management clock             |
//! | CRS_DV  | PA7     | Carrier sense / data valid   |
//! | RXD0    | PC4     |                              |
//! | RXD1    | PC5     |                              |
//! | TX_EN   | PG11    |                              |
//! | TXD0    | PG13    |                              |
//! | TXD1    | PB13    |                              |
//!
//! The PHY address straps to 0 on the Nucleo boards. nRST is tied to the
//! board reset line there, so [`Lan8742aWithReset`] is only needed on
//! custom hardware that routes the PHY reset to a GPIO.
//!
//! # Usage
//!
//! ```ignore
//! use ph_stm32_eth::phy::{Lan8742a, PhyDriver};
//!
//! let mut phy = Lan8742a::new(0);
//! phy.init(&mut mdio)?;
//!
//! if let Some(link) = phy.poll_link(&mut mdio)? {
//!     // link.speed / link.duplex carry the negotiated parameters
//! }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::driver::error::{ConfigError, Result};
use crate::hal::mdio::{anar, bmcr, bmsr, phy_reg, MdioBus};

use super::generic::{ieee802_3, LinkStatus, PhyCapabilities, PhyDriver};

// =============================================================================
// Chip Identification
// =============================================================================

/// LAN8742A PHY identifier (PHYIDR1 << 16 | PHYIDR2, revision masked)
pub const LAN8742A_PHY_ID: u32 = 0x0007_C130;

/// Mask for comparing PHY IDs (ignores the 4-bit revision field)
pub const LAN8742A_PHY_ID_MASK: u32 = 0xFFFF_FFF0;

/// Default PHY address on Nucleo-144 boards (strapped via RXD0/RXD1)
pub const DEFAULT_PHY_ADDR: u8 = 0;

/// Maximum MDIO read attempts while waiting for soft reset to self-clear
pub const RESET_MAX_ATTEMPTS: u32 = 1000;

/// Maximum poll attempts for auto-negotiation / link establishment helpers
pub const AN_MAX_ATTEMPTS: u32 = 5000;

/// Hardware reset pulse width in microseconds (datasheet minimum is 100)
pub const RESET_PULSE_US: u32 = 200;

/// Recovery time after releasing hardware reset, in microseconds
pub const RESET_RECOVERY_US: u32 = 1000;

// =============================================================================
// Vendor Register Definitions
// =============================================================================

/// LAN8742A vendor-specific registers (16-31)
pub mod reg {
    /// Mode Control/Status Register
    pub const MCSR: u8 = 17;
    /// Special Modes Register (strapped mode and PHY address)
    pub const SMR: u8 = 18;
    /// Symbol Error Counter Register (clears on read)
    pub const SECR: u8 = 26;
    /// Special Control/Status Indications Register
    pub const SCSIR: u8 = 27;
    /// Interrupt Source Register (clears on read)
    pub const ISR: u8 = 29;
    /// Interrupt Mask Register
    pub const IMR: u8 = 30;
    /// PHY Special Control/Status Register
    pub const PSCSR: u8 = 31;
}

/// Mode Control/Status Register bits
pub mod mcsr {
    /// Energy Detect Power-Down enable
    pub const EDPWRDOWN: u16 = 1 << 13;
    /// Energy detected on the wire (or EDPWRDOWN disabled)
    pub const ENERGYON: u16 = 1 << 1;
}

/// PHY Special Control/Status Register bits
pub mod pscsr {
    /// Auto-negotiation done indication
    pub const AUTODONE: u16 = 1 << 12;
    /// Speed indication field mask (HCDSPEED)
    pub const HCDSPEED_MASK: u16 = 0x7 << 2;
    /// 10BASE-T Half Duplex
    pub const HCDSPEED_10HD: u16 = 0x1 << 2;
    /// 100BASE-TX Half Duplex
    pub const HCDSPEED_100HD: u16 = 0x2 << 2;
    /// 10BASE-T Full Duplex
    pub const HCDSPEED_10FD: u16 = 0x5 << 2;
    /// 100BASE-TX Full Duplex
    pub const HCDSPEED_100FD: u16 = 0x6 << 2;
}

/// Interrupt Source/Mask Register bits (same layout in ISR and IMR)
pub mod isr {
    /// ENERGYON activated
    pub const ENERGYON: u16 = 1 << 7;
    /// Auto-negotiation complete
    pub const AN_COMPLETE: u16 = 1 << 6;
    /// Remote fault detected
    pub const REMOTE_FAULT: u16 = 1 << 5;
    /// Link down
    pub const LINK_DOWN: u16 = 1 << 4;
    /// Auto-negotiation LP acknowledge
    pub const AN_LP_ACK: u16 = 1 << 3;
    /// Parallel detection fault
    pub const PD_FAULT: u16 = 1 << 2;
    /// Auto-negotiation page received
    pub const AN_PAGE_RX: u16 = 1 << 1;
}

// =============================================================================
// LAN8742A Driver
// =============================================================================

/// LAN8742A PHY driver
///
/// Tracks the last observed link state so [`PhyDriver::poll_link`] can
/// report link-up transitions exactly once.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Lan8742a {
    /// PHY address on the MDIO bus (0-31)
    addr: u8,
    /// Link state seen by the previous `poll_link` call
    last_link_up: bool,
}

impl Lan8742a {
    /// Create a new LAN8742A driver for the given PHY address
    pub const fn new(addr: u8) -> Self {
        Self {
            addr,
            last_link_up: false,
        }
    }

    /// Verify the chip responds with the LAN8742A ID
    ///
    /// Returns `InvalidPhyAddress` when the ID registers read back as a
    /// different chip (or all-ones, meaning nothing answered).
    pub fn verify_id<M: MdioBus>(&self, mdio: &mut M) -> Result<()> {
        let id = ieee802_3::read_phy_id(mdio, self.addr)?;

        if (id & LAN8742A_PHY_ID_MASK) != LAN8742A_PHY_ID {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "PHY at address {} identifies as {:#010x}, expected LAN8742A",
                self.addr,
                id
            );
            return Err(ConfigError::InvalidPhyAddress.into());
        }

        Ok(())
    }

    /// Read the silicon revision (low 4 bits of PHYIDR2)
    pub fn revision<M: MdioBus>(&self, mdio: &mut M) -> Result<u8> {
        let id2 = mdio.read(self.addr, phy_reg::PHYIDR2)?;
        Ok((id2 & 0x000F) as u8)
    }

    /// Read the resolved speed/duplex from the vendor status register
    ///
    /// The HCDSPEED field is only meaningful once AUTODONE is set; before
    /// that (or on an unexpected encoding) this returns `None` and callers
    /// should fall back to the BMCR-configured values.
    pub fn read_speed_indication<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        let pscsr_val = mdio.read(self.addr, reg::PSCSR)?;

        if (pscsr_val & pscsr::AUTODONE) == 0 {
            return Ok(None);
        }

        let status = match pscsr_val & pscsr::HCDSPEED_MASK {
            pscsr::HCDSPEED_10HD => LinkStatus::slow_half(),
            pscsr::HCDSPEED_10FD => LinkStatus::slow_full(),
            pscsr::HCDSPEED_100HD => LinkStatus::fast_half(),
            pscsr::HCDSPEED_100FD => LinkStatus::fast_full(),
            _ => return Ok(None),
        };

        Ok(Some(status))
    }

    /// Write the auto-negotiation advertisement from a capability set
    ///
    /// Always advertises the IEEE 802.3 selector; speed bits and PAUSE
    /// follow `caps`.
    pub fn configure_advertisement<M: MdioBus>(
        &self,
        mdio: &mut M,
        caps: PhyCapabilities,
    ) -> Result<()> {
        let mut anar_val = anar::SELECTOR_802_3;

        if caps.speed_100_fd {
            anar_val |= anar::TX_FD;
        }
        if caps.speed_100_hd {
            anar_val |= anar::TX_HD;
        }
        if caps.speed_10_fd {
            anar_val |= anar::T10_FD;
        }
        if caps.speed_10_hd {
            anar_val |= anar::T10_HD;
        }
        if caps.pause {
            anar_val |= anar::PAUSE;
        }

        mdio.write(self.addr, phy_reg::ANAR, anar_val)
    }

    /// Enable or disable Energy Detect Power-Down mode
    ///
    /// With EDPWRDOWN set the PHY sleeps until it sees energy on the wire,
    /// cutting idle power draw. Link detection still works but takes a
    /// little longer after cable plug-in.
    pub fn set_energy_detect_powerdown<M: MdioBus>(
        &self,
        mdio: &mut M,
        enable: bool,
    ) -> Result<()> {
        let mut mcsr_val = mdio.read(self.addr, reg::MCSR)?;

        if enable {
            mcsr_val |= mcsr::EDPWRDOWN;
        } else {
            mcsr_val &= !mcsr::EDPWRDOWN;
        }

        mdio.write(self.addr, reg::MCSR, mcsr_val)
    }

    /// Check whether the PHY currently detects energy on the wire
    pub fn is_energy_on<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        let mcsr_val = mdio.read(self.addr, reg::MCSR)?;
        Ok((mcsr_val & mcsr::ENERGYON) != 0)
    }

    /// Read and clear the interrupt source register
    ///
    /// Reading ISR acknowledges all pending PHY interrupts, releasing the
    /// nINT line.
    pub fn read_interrupt_status<M: MdioBus>(&self, mdio: &mut M) -> Result<u16> {
        mdio.read(self.addr, reg::ISR)
    }

    /// Set the interrupt mask register
    ///
    /// A set bit enables the corresponding interrupt source; see [`isr`]
    /// for the bit layout.
    pub fn set_interrupt_mask<M: MdioBus>(&self, mdio: &mut M, mask: u16) -> Result<()> {
        mdio.write(self.addr, reg::IMR, mask)
    }

    /// Enable link-down and auto-negotiation-complete interrupts
    ///
    /// The usual pair for interrupt-driven link monitoring: nINT asserts
    /// when the link drops or a fresh negotiation finishes.
    pub fn enable_link_interrupt<M: MdioBus>(&self, mdio: &mut M) -> Result<()> {
        let current = mdio.read(self.addr, reg::IMR)?;
        mdio.write(
            self.addr,
            reg::IMR,
            current | isr::LINK_DOWN | isr::AN_COMPLETE,
        )
    }

    /// Read the symbol error counter (clears on read)
    pub fn symbol_error_count<M: MdioBus>(&self, mdio: &mut M) -> Result<u16> {
        mdio.read(self.addr, reg::SECR)
    }
}

impl Default for Lan8742a {
    /// LAN8742A at the Nucleo-144 strapped address
    fn default() -> Self {
        Self::new(DEFAULT_PHY_ADDR)
    }
}

// =============================================================================
// PhyDriver Implementation
// =============================================================================

impl PhyDriver for Lan8742a {
    fn address(&self) -> u8 {
        self.addr
    }

    fn init<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        // Make sure something that looks like a LAN8742A answers before
        // poking any vendor registers.
        self.verify_id(mdio)?;

        self.soft_reset(mdio)?;

        // Advertise the full 10/100 set with PAUSE, then (re)start
        // auto-negotiation with the new advertisement.
        self.configure_advertisement(mdio, PhyCapabilities::standard_10_100())?;
        ieee802_3::enable_auto_negotiation(mdio, self.addr)?;

        self.last_link_up = false;

        #[cfg(feature = "defmt")]
        defmt::debug!("LAN8742A initialized at address {}", self.addr);

        Ok(())
    }

    fn soft_reset<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        ieee802_3::soft_reset(mdio, self.addr, RESET_MAX_ATTEMPTS)
    }

    fn is_link_up<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        ieee802_3::is_link_up(mdio, self.addr)
    }

    fn link_status<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        if !ieee802_3::is_link_up(mdio, self.addr)? {
            return Ok(None);
        }

        // PSCSR carries the negotiated result.
        if let Some(status) = self.read_speed_indication(mdio)? {
            return Ok(Some(status));
        }

        // Forced modes never set AUTODONE and BMCR is authoritative there.
        // With auto-negotiation enabled, an unresolved indication means the
        // speed is not known yet; BMCR would report stale values.
        let bmcr_val = mdio.read(self.addr, phy_reg::BMCR)?;
        if (bmcr_val & bmcr::AN_ENABLE) != 0 {
            return Ok(None);
        }

        ieee802_3::link_status_from_bmcr(mdio, self.addr).map(Some)
    }

    fn poll_link<M: MdioBus>(&mut self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        let up = ieee802_3::is_link_up(mdio, self.addr)?;
        let was_up = self.last_link_up;
        self.last_link_up = up;

        if up && !was_up {
            // Rising edge: report the freshly established link parameters.
            self.link_status(mdio)
        } else {
            Ok(None)
        }
    }

    fn enable_auto_negotiation<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        ieee802_3::enable_auto_negotiation(mdio, self.addr)
    }

    fn force_link<M: MdioBus>(&mut self, mdio: &mut M, status: LinkStatus) -> Result<()> {
        ieee802_3::force_link(mdio, self.addr, status)
    }

    fn capabilities<M: MdioBus>(&self, mdio: &mut M) -> Result<PhyCapabilities> {
        ieee802_3::read_capabilities(mdio, self.addr)
    }

    fn phy_id<M: MdioBus>(&self, mdio: &mut M) -> Result<u32> {
        ieee802_3::read_phy_id(mdio, self.addr)
    }

    fn is_auto_negotiation_complete<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        ieee802_3::is_an_complete(mdio, self.addr)
    }

    fn link_partner_abilities<M: MdioBus>(&self, mdio: &mut M) -> Result<PhyCapabilities> {
        ieee802_3::read_link_partner(mdio, self.addr)
    }
}

// =============================================================================
// Hardware Reset Wrapper
// =============================================================================

/// LAN8742A with a GPIO-controlled hardware reset line
///
/// Wraps [`Lan8742a`] together with the output pin driving nRST. Useful on
/// custom boards where the PHY reset is not tied to the MCU reset; the
/// wrapper forwards the whole [`PhyDriver`] interface to the inner driver.
pub struct Lan8742aWithReset<RST: OutputPin> {
    phy: Lan8742a,
    reset_pin: RST,
}

impl<RST: OutputPin> Lan8742aWithReset<RST> {
    /// Create a driver with a dedicated reset pin
    pub fn new(addr: u8, reset_pin: RST) -> Self {
        Self {
            phy: Lan8742a::new(addr),
            reset_pin,
        }
    }

    /// Pulse the hardware reset line
    ///
    /// Drives nRST low for [`RESET_PULSE_US`], releases it, then waits
    /// [`RESET_RECOVERY_US`] for the configuration straps to latch and the
    /// management interface to come back.
    pub fn hardware_reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<()> {
        self.reset_pin
            .set_low()
            .map_err(|_| ConfigError::GpioError)?;
        delay.delay_us(RESET_PULSE_US);

        self.reset_pin
            .set_high()
            .map_err(|_| ConfigError::GpioError)?;
        delay.delay_us(RESET_RECOVERY_US);

        #[cfg(feature = "defmt")]
        defmt::debug!("LAN8742A hardware reset complete");

        Ok(())
    }

    /// Hold the PHY in reset (drive nRST low)
    pub fn assert_reset(&mut self) -> Result<()> {
        self.reset_pin.set_low().map_err(|_| ConfigError::GpioError)?;
        Ok(())
    }

    /// Release the PHY from reset (drive nRST high)
    ///
    /// The PHY still needs [`RESET_RECOVERY_US`] before MDIO access works.
    pub fn deassert_reset(&mut self) -> Result<()> {
        self.reset_pin
            .set_high()
            .map_err(|_| ConfigError::GpioError)?;
        Ok(())
    }

    /// Hardware reset followed by the full init sequence
    pub fn init_with_hardware_reset<M: MdioBus, D: DelayNs>(
        &mut self,
        mdio: &mut M,
        delay: &mut D,
    ) -> Result<()> {
        self.hardware_reset(delay)?;
        self.phy.init(mdio)
    }

    /// Access the inner PHY driver
    pub fn phy(&self) -> &Lan8742a {
        &self.phy
    }

    /// Mutable access to the inner PHY driver
    pub fn phy_mut(&mut self) -> &mut Lan8742a {
        &mut self.phy
    }

    /// Mutable access to the reset pin
    pub fn reset_pin_mut(&mut self) -> &mut RST {
        &mut self.reset_pin
    }

    /// Consume the wrapper, returning the reset pin
    pub fn into_reset_pin(self) -> RST {
        self.reset_pin
    }
}

impl<RST: OutputPin> PhyDriver for Lan8742aWithReset<RST> {
    fn address(&self) -> u8 {
        self.phy.address()
    }

    fn init<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.phy.init(mdio)
    }

    fn soft_reset<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.phy.soft_reset(mdio)
    }

    fn is_link_up<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        self.phy.is_link_up(mdio)
    }

    fn link_status<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        self.phy.link_status(mdio)
    }

    fn poll_link<M: MdioBus>(&mut self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        self.phy.poll_link(mdio)
    }

    fn enable_auto_negotiation<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.phy.enable_auto_negotiation(mdio)
    }

    fn force_link<M: MdioBus>(&mut self, mdio: &mut M, status: LinkStatus) -> Result<()> {
        self.phy.force_link(mdio, status)
    }

    fn capabilities<M: MdioBus>(&self, mdio: &mut M) -> Result<PhyCapabilities> {
        self.phy.capabilities(mdio)
    }

    fn phy_id<M: MdioBus>(&self, mdio: &mut M) -> Result<u32> {
        self.phy.phy_id(mdio)
    }

    fn is_auto_negotiation_complete<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        self.phy.is_auto_negotiation_complete(mdio)
    }

    fn link_partner_abilities<M: MdioBus>(&self, mdio: &mut M) -> Result<PhyCapabilities> {
        self.phy.link_partner_abilities(mdio)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Poll for link establishment, up to `max_attempts` polls
///
/// Returns `Ok(Some(status))` on the link-up transition, `Ok(None)` when
/// the attempts run out with the link still down. MDIO errors propagate.
pub fn wait_for_link<P: PhyDriver, M: MdioBus>(
    phy: &mut P,
    mdio: &mut M,
    max_attempts: u32,
) -> Result<Option<LinkStatus>> {
    for _ in 0..max_attempts {
        if let Some(status) = phy.poll_link(mdio)? {
            return Ok(Some(status));
        }
        core::hint::spin_loop();
    }

    Ok(None)
}

/// Scan all 32 MDIO addresses for responding PHYs
///
/// An address is reported when its ID registers read back as something
/// other than all-zeros or all-ones. Handy for bring-up on boards with
/// unknown strapping.
pub fn scan_bus<M: MdioBus>(mdio: &mut M) -> [Option<u8>; 32] {
    let mut found = [None; 32];

    for addr in 0..32u8 {
        if let Ok(id) = ieee802_3::read_phy_id(mdio, addr) {
            if id != 0 && id != 0xFFFF_FFFF {
                found[addr as usize] = Some(addr);
            }
        }
    }

    found
}

// =============================================================================
// Tests
// =============================================================================
