//! PHY driver abstraction
//!
//! [`PhyDriver`] is the seam between the MAC driver and a concrete PHY
//! chip. The trait sticks to IEEE 802.3 Clause 22 notions; vendor
//! registers stay inside the chip drivers. The [`ieee802_3`] helpers
//! implement the Clause 22 mechanics once so chip drivers only add what
//! their silicon does differently.

use crate::driver::config::{Duplex, Speed};
use crate::driver::error::Result;
use crate::hal::mdio::MdioBus;

// =============================================================================
// Link Status
// =============================================================================

/// A resolved link: the speed and duplex actually in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStatus {
    /// Link speed
    pub speed: Speed,
    /// Duplex mode
    pub duplex: Duplex,
}

impl LinkStatus {
    /// A link status with the given speed and duplex
    pub const fn new(speed: Speed, duplex: Duplex) -> Self {
        Self { speed, duplex }
    }

    /// 100 Mbps full duplex
    pub const fn fast_full() -> Self {
        Self::new(Speed::Mbps100, Duplex::Full)
    }

    /// 100 Mbps half duplex
    pub const fn fast_half() -> Self {
        Self::new(Speed::Mbps100, Duplex::Half)
    }

    /// 10 Mbps full duplex
    pub const fn slow_full() -> Self {
        Self::new(Speed::Mbps10, Duplex::Full)
    }

    /// 10 Mbps half duplex
    pub const fn slow_half() -> Self {
        Self::new(Speed::Mbps10, Duplex::Half)
    }
}

// =============================================================================
// PHY Capabilities
// =============================================================================

/// What a PHY (or a link partner) can do.
///
/// Doubles as the decode of BMSR capability bits and of ANLPAR partner
/// ability bits.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyCapabilities {
    /// 100BASE-TX full duplex
    pub speed_100_fd: bool,
    /// 100BASE-TX half duplex
    pub speed_100_hd: bool,
    /// 10BASE-T full duplex
    pub speed_10_fd: bool,
    /// 10BASE-T half duplex
    pub speed_10_hd: bool,
    /// Clause 28 auto-negotiation
    pub auto_negotiation: bool,
    /// Symmetric PAUSE
    pub pause: bool,
    /// Asymmetric PAUSE
    pub pause_asymmetric: bool,
}

impl PhyCapabilities {
    /// Everything a garden-variety 10/100 PHY offers.
    pub const fn standard_10_100() -> Self {
        Self {
            auto_negotiation: true,
            speed_100_fd: true,
            speed_100_hd: true,
            speed_10_fd: true,
            speed_10_hd: true,
            pause: true,
            pause_asymmetric: false,
        }
    }
}

// =============================================================================
// PHY Driver Trait
// =============================================================================

/// Interface a PHY chip driver provides to the MAC layer.
///
/// Implementations own the chip-specific bring-up sequence and any
/// vendor-register reads, and otherwise lean on [`ieee802_3`]:
///
/// ```ignore
/// struct MyPhy { addr: u8 }
///
/// impl PhyDriver for MyPhy {
///     fn address(&self) -> u8 { self.addr }
///
///     fn init<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
///         self.soft_reset(mdio)?;
///         self.enable_auto_negotiation(mdio)
///     }
///     // ...
/// }
/// ```
pub trait PhyDriver {
    /// MDIO address of this PHY (0-31)
    fn address(&self) -> u8;

    /// Chip-specific bring-up, typically soft reset plus base
    /// configuration
    fn init<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()>;

    /// Soft reset through BMCR, waiting for the bit to self-clear
    fn soft_reset<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()>;

    /// Whether a valid link partner is present
    fn is_link_up<M: MdioBus>(&self, mdio: &mut M) -> Result<bool>;

    /// Speed and duplex of the current link, `None` while down
    fn link_status<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkStatus>>;

    /// Periodic poll hook: `Some` exactly when a new link has just been
    /// established, `None` while nothing changed
    fn poll_link<M: MdioBus>(&mut self, mdio: &mut M) -> Result<Option<LinkStatus>>;

    /// Turn auto-negotiation on and restart it
    fn enable_auto_negotiation<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()>;

    /// Disable negotiation and force the given speed/duplex. A partner
    /// configured differently will not link.
    fn force_link<M: MdioBus>(&mut self, mdio: &mut M, status: LinkStatus) -> Result<()>;

    /// What this PHY can do
    fn capabilities<M: MdioBus>(&self, mdio: &mut M) -> Result<PhyCapabilities>;

    /// The 32-bit identifier, `(PHYIDR1 << 16) | PHYIDR2`
    fn phy_id<M: MdioBus>(&self, mdio: &mut M) -> Result<u32>;

    /// Whether negotiation has finished
    fn is_auto_negotiation_complete<M: MdioBus>(&self, mdio: &mut M) -> Result<bool>;

    /// What the partner advertised, meaningful once negotiation is done
    fn link_partner_abilities<M: MdioBus>(&self, mdio: &mut M) -> Result<PhyCapabilities>;
}

// =============================================================================
// Default Implementations
// =============================================================================

/// Clause 22 mechanics shared by all chip drivers.
pub mod ieee802_3 {
    use super::*;
    use crate::driver::error::IoError;
    use crate::hal::mdio::{anar, bmcr, bmsr, phy_reg};

    /// Whether a BMSR bit is currently set.
    fn bmsr_flag<M: MdioBus>(mdio: &mut M, phy_addr: u8, mask: u16) -> Result<bool> {
        Ok(mdio.read(phy_addr, phy_reg::BMSR)? & mask != 0)
    }

    /// Link indication from BMSR
    pub fn is_link_up<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<bool> {
        bmsr_flag(mdio, phy_addr, bmsr::LINK_STATUS)
    }

    /// Negotiation-complete indication from BMSR
    pub fn is_an_complete<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<bool> {
        bmsr_flag(mdio, phy_addr, bmsr::AN_COMPLETE)
    }

    /// Soft reset through BMCR.
    ///
    /// `PhyTimeout` when the bit never self-clears within `max_attempts`
    /// reads; a PHY stuck like that is not answering and must not be used.
    pub fn soft_reset<M: MdioBus>(mdio: &mut M, phy_addr: u8, max_attempts: u32) -> Result<()> {
        mdio.write(phy_addr, phy_reg::BMCR, bmcr::RESET)?;

        for _ in 0..max_attempts {
            if mdio.read(phy_addr, phy_reg::BMCR)? & bmcr::RESET == 0 {
                return Ok(());
            }
        }
        Err(IoError::PhyTimeout.into())
    }

    /// Enable negotiation and kick off a fresh round. Also drops ISOLATE
    /// in case strapping left the PHY isolated.
    pub fn enable_auto_negotiation<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<()> {
        let ctrl = mdio.read(phy_addr, phy_reg::BMCR)?;
        let ctrl = (ctrl | bmcr::AN_ENABLE | bmcr::AN_RESTART) & !bmcr::ISOLATE;
        mdio.write(phy_addr, phy_reg::BMCR, ctrl)
    }

    /// Force speed and duplex, negotiation off.
    pub fn force_link<M: MdioBus>(mdio: &mut M, phy_addr: u8, status: LinkStatus) -> Result<()> {
        let keep = mdio.read(phy_addr, phy_reg::BMCR)?
            & !(bmcr::AN_ENABLE | bmcr::ISOLATE | bmcr::SPEED_100 | bmcr::DUPLEX_FULL);

        let forced = keep
            | match status.speed {
                Speed::Mbps100 => bmcr::SPEED_100,
                Speed::Mbps10 => 0,
            }
            | match status.duplex {
                Duplex::Full => bmcr::DUPLEX_FULL,
                Duplex::Half => 0,
            };

        mdio.write(phy_addr, phy_reg::BMCR, forced)
    }

    /// Assemble the 32-bit identifier from both ID registers.
    pub fn read_phy_id<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<u32> {
        let hi = mdio.read(phy_addr, phy_reg::PHYIDR1)? as u32;
        let lo = mdio.read(phy_addr, phy_reg::PHYIDR2)? as u32;
        Ok((hi << 16) | lo)
    }

    /// Decode the BMSR capability bits.
    ///
    /// PAUSE ability lives in ANAR, not BMSR, so both pause fields come
    /// back false here.
    pub fn read_capabilities<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<PhyCapabilities> {
        let status = mdio.read(phy_addr, phy_reg::BMSR)?;
        let has = |mask: u16| status & mask != 0;

        Ok(PhyCapabilities {
            speed_100_fd: has(bmsr::TX_FD_CAPABLE),
            speed_100_hd: has(bmsr::TX_HD_CAPABLE),
            speed_10_fd: has(bmsr::T10_FD_CAPABLE),
            speed_10_hd: has(bmsr::T10_HD_CAPABLE),
            auto_negotiation: has(bmsr::AN_ABILITY),
            pause: false,
            pause_asymmetric: false,
        })
    }

    /// Decode the partner's ANLPAR advertisement. A partner that filled
    /// ANLPAR at all negotiated, so `auto_negotiation` is implied.
    pub fn read_link_partner<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<PhyCapabilities> {
        let partner = mdio.read(phy_addr, phy_reg::ANLPAR)?;
        let has = |mask: u16| partner & mask != 0;

        Ok(PhyCapabilities {
            speed_100_fd: has(anar::TX_FD),
            speed_100_hd: has(anar::TX_HD),
            speed_10_fd: has(anar::T10_FD),
            speed_10_hd: has(anar::T10_HD),
            auto_negotiation: true,
            pause: has(anar::PAUSE),
            pause_asymmetric: false,
        })
    }

    /// Speed/duplex as configured in BMCR, for forced-mode links.
    pub fn link_status_from_bmcr<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<LinkStatus> {
        let ctrl = mdio.read(phy_addr, phy_reg::BMCR)?;

        Ok(LinkStatus::new(
            if ctrl & bmcr::SPEED_100 != 0 {
                Speed::Mbps100
            } else {
                Speed::Mbps10
            },
            if ctrl & bmcr::DUPLEX_FULL != 0 {
                Duplex::Full
            } else {
                Duplex::Half
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::error::{Error, IoError};
    use crate::hal::mdio::{bmcr, phy_reg};
    use crate::testing::MockMdioBus;

    #[test]
    fn soft_reset_completes_when_bit_clears() {
        let mut mdio = MockMdioBus::new();
        // the mock self-clears RESET, mimicking an instant reset
        assert!(ieee802_3::soft_reset(&mut mdio, 0, 3).is_ok());
    }

    #[test]
    fn stuck_reset_reports_phy_timeout() {
        let mut mdio = MockMdioBus::new();
        mdio.hold_bmcr_reset(true);

        let result = ieee802_3::soft_reset(&mut mdio, 0, 3);
        assert_eq!(result, Err(Error::Io(IoError::PhyTimeout)));
    }

    #[test]
    fn force_link_rewrites_the_mode_bits() {
        let mut mdio = MockMdioBus::new();
        mdio.set_register(0, phy_reg::BMCR, bmcr::AN_ENABLE | bmcr::ISOLATE);

        ieee802_3::force_link(&mut mdio, 0, LinkStatus::fast_full()).unwrap();

        let ctrl = mdio.get_register(0, phy_reg::BMCR);
        assert_eq!(ctrl & bmcr::AN_ENABLE, 0);
        assert_eq!(ctrl & bmcr::ISOLATE, 0);
        assert_ne!(ctrl & bmcr::SPEED_100, 0);
        assert_ne!(ctrl & bmcr::DUPLEX_FULL, 0);
    }

    #[test]
    fn forced_mode_reads_back_from_bmcr() {
        let mut mdio = MockMdioBus::new();

        for status in [
            LinkStatus::fast_full(),
            LinkStatus::fast_half(),
            LinkStatus::slow_full(),
            LinkStatus::slow_half(),
        ] {
            ieee802_3::force_link(&mut mdio, 0, status).unwrap();
            assert_eq!(ieee802_3::link_status_from_bmcr(&mut mdio, 0).unwrap(), status);
        }
    }

    #[test]
    fn capability_decode_tracks_the_profile() {
        let mut mdio = MockMdioBus::new();
        mdio.setup_lan8742a(0);

        let caps = ieee802_3::read_capabilities(&mut mdio, 0).unwrap();
        assert!(caps.speed_100_fd && caps.speed_100_hd);
        assert!(caps.speed_10_fd && caps.speed_10_hd);
        assert!(caps.auto_negotiation);
    }

    #[test]
    fn partner_decode_includes_pause() {
        let mut mdio = MockMdioBus::new();
        mdio.setup_lan8742a(0);
        mdio.simulate_link_up_100_fd(0);

        let partner = ieee802_3::read_link_partner(&mut mdio, 0).unwrap();
        assert!(partner.speed_100_fd);
        assert!(partner.auto_negotiation);
        // the canned partner does not advertise PAUSE
        assert!(!partner.pause);
    }

    #[test]
    fn phy_id_concatenates_both_words() {
        let mut mdio = MockMdioBus::new();
        mdio.setup_lan8742a(0);

        assert_eq!(ieee802_3::read_phy_id(&mut mdio, 0).unwrap(), 0x0007_C131);
    }
}
