//! Host-side test doubles
//!
//! Mock MDIO bus, delay provider and descriptor used by the unit tests to
//! exercise PHY and ring logic without hardware. Compiled only for
//! `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::vec::Vec;

use crate::driver::error::Result;
use crate::hal::mdio::{MdioBus, anlpar, bmcr, bmsr, phy_reg};
use crate::internal::dma::descriptor::RxSlot;
use crate::phy::lan8742a::{pscsr, reg};

// =============================================================================
// Mock MDIO Bus
// =============================================================================

/// Backing store shared by all [`MockMdioBus`] accessors
#[derive(Debug, Default)]
struct BusState {
    regs: HashMap<(u8, u8), u16>,
    writes: Vec<(u8, u8, u16)>,
    busy: bool,
    hold_bmcr_reset: bool,
}

/// In-memory MDIO bus.
///
/// Registers are a `(phy_addr, reg_addr) -> value` map that reads as zero
/// until written; every write is also logged for assertion with
/// [`assert_reg_written!`](crate::assert_reg_written).
///
/// ```ignore
/// let mut mdio = MockMdioBus::new();
/// mdio.setup_lan8742a(0);
/// mdio.simulate_link_up_100_fd(0);
///
/// let phy = Lan8742a::new(0);
/// assert!(phy.is_link_up(&mut mdio).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MockMdioBus {
    state: RefCell<BusState>,
}

impl MockMdioBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a register value without logging a write
    pub fn set_register(&self, phy_addr: u8, reg_addr: u8, value: u16) {
        self.state
            .borrow_mut()
            .regs
            .insert((phy_addr, reg_addr), value);
    }

    /// Current value of a register; never-written registers read zero
    pub fn get_register(&self, phy_addr: u8, reg_addr: u8) -> u16 {
        self.state
            .borrow()
            .regs
            .get(&(phy_addr, reg_addr))
            .copied()
            .unwrap_or(0)
    }

    /// All writes issued so far, oldest first
    pub fn get_writes(&self) -> Vec<(u8, u8, u16)> {
        self.state.borrow().writes.clone()
    }

    /// Forget the recorded writes
    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }

    /// Force the busy indicator
    pub fn set_busy(&self, busy: bool) {
        self.state.borrow_mut().busy = busy;
    }

    /// Keep BMCR self-clearing bits latched after a write.
    ///
    /// Makes a soft reset appear to never finish, which is how the
    /// reset-timeout paths get exercised.
    pub fn hold_bmcr_reset(&self, hold: bool) {
        self.state.borrow_mut().hold_bmcr_reset = hold;
    }

    /// Load the register profile of an idle LAN8742A: correct ID words,
    /// 10/100 capabilities advertised, negotiation enabled, link down.
    pub fn setup_lan8742a(&self, phy_addr: u8) {
        let caps = bmsr::EXT_CAPABLE
            | bmsr::AN_ABILITY
            | bmsr::T10_HD_CAPABLE
            | bmsr::T10_FD_CAPABLE
            | bmsr::TX_HD_CAPABLE
            | bmsr::TX_FD_CAPABLE;

        for (reg_addr, value) in [
            (phy_reg::PHYIDR1, 0x0007),
            (phy_reg::PHYIDR2, 0xC131),
            (phy_reg::BMSR, caps),
            (phy_reg::BMCR, bmcr::AN_ENABLE),
            (phy_reg::ANAR, 0x01E1),
            (phy_reg::ANLPAR, 0),
        ] {
            self.set_register(phy_addr, reg_addr, value);
        }
    }

    /// Set and clear bits in the stored BMSR
    fn merge_bmsr(&self, phy_addr: u8, set: u16, clear: u16) {
        let current = self.get_register(phy_addr, phy_reg::BMSR);
        self.set_register(phy_addr, phy_reg::BMSR, (current | set) & !clear);
    }

    /// Link up against a full-featured partner, resolved to 100BASE-TX FD
    pub fn simulate_link_up_100_fd(&self, phy_addr: u8) {
        self.merge_bmsr(phy_addr, bmsr::LINK_STATUS | bmsr::AN_COMPLETE, 0);

        let partner = anlpar::SELECTOR_802_3
            | anlpar::CAN_100_FD
            | anlpar::CAN_100_HD
            | anlpar::CAN_10_FD
            | anlpar::CAN_10_HD;
        self.set_register(phy_addr, phy_reg::ANLPAR, partner);

        self.set_register(
            phy_addr,
            reg::PSCSR,
            pscsr::AUTODONE | pscsr::HCDSPEED_100FD,
        );
    }

    /// Link up against a 10BASE-T half-duplex-only partner
    pub fn simulate_link_up_10_hd(&self, phy_addr: u8) {
        self.merge_bmsr(phy_addr, bmsr::LINK_STATUS | bmsr::AN_COMPLETE, 0);
        self.set_register(
            phy_addr,
            phy_reg::ANLPAR,
            anlpar::SELECTOR_802_3 | anlpar::CAN_10_HD,
        );
        self.set_register(phy_addr, reg::PSCSR, pscsr::AUTODONE | pscsr::HCDSPEED_10HD);
    }

    /// Drop the link and clear everything negotiation produced
    pub fn simulate_link_down(&self, phy_addr: u8) {
        self.merge_bmsr(phy_addr, 0, bmsr::LINK_STATUS | bmsr::AN_COMPLETE);
        self.set_register(phy_addr, phy_reg::ANLPAR, 0);
        self.set_register(phy_addr, reg::PSCSR, 0);
    }
}

impl MdioBus for MockMdioBus {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        Ok(self.get_register(phy_addr, reg_addr))
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.writes.push((phy_addr, reg_addr, value));

        // A real PHY finishes reset and negotiation restart on its own, so
        // the self-clearing BMCR bits read back as zero unless a test has
        // latched them with `hold_bmcr_reset`.
        let mut stored = value;
        if reg_addr == phy_reg::BMCR && !state.hold_bmcr_reset {
            stored &= !(bmcr::RESET | bmcr::AN_RESTART);
        }
        state.regs.insert((phy_addr, reg_addr), stored);

        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.state.borrow().busy
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Delay provider that only counts.
///
/// Accumulates the nanoseconds it was asked to wait so tests can assert
/// on timing budgets without sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    elapsed_ns: Cell<u64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nanoseconds requested so far
    pub fn total_ns(&self) -> u64 {
        self.elapsed_ns.get()
    }

    /// Microseconds requested so far
    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }

    /// Milliseconds requested so far
    pub fn total_ms(&self) -> u64 {
        self.total_ns() / 1_000_000
    }

    /// Zero the counter
    pub fn reset(&self) {
        self.elapsed_ns.set(0);
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns.set(self.elapsed_ns.get() + ns as u64);
    }
}

// =============================================================================
// Mock DMA Descriptor
// =============================================================================

/// Descriptor stand-in for exercising ring logic on the host.
///
/// Carries the OWN/first/last/error/length state as plain fields; the
/// `simulate_*` methods put it into the states hardware would leave
/// behind.
///
/// ```ignore
/// let mut ring: DescriptorRing<MockDescriptor, 4> =
///     DescriptorRing::from_array([MockDescriptor::new(); 4]);
///
/// ring.get_mut(0).simulate_receive(1500);
/// assert!(!ring.get(0).is_owned());
/// assert_eq!(ring.get(0).frame_length(), 1500);
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct MockDescriptor {
    /// OWN flag: held by DMA while true
    pub owned: bool,
    /// First descriptor of a frame
    pub first: bool,
    /// Last descriptor of a frame
    pub last: bool,
    /// Error summary flag
    pub has_error: bool,
    /// Frame length, meaningful on the last descriptor
    pub frame_len: usize,
}

impl MockDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Hand the descriptor to DMA
    pub fn set_owned(&mut self) {
        self.owned = true;
    }

    /// Take the descriptor back from DMA
    pub fn clear_owned(&mut self) {
        self.owned = false;
    }

    pub fn is_first(&self) -> bool {
        self.first
    }

    pub fn is_last(&self) -> bool {
        self.last
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn frame_length(&self) -> usize {
        self.frame_len
    }

    /// The state hardware leaves after finishing with a descriptor:
    /// ownership returned, flags and length as given.
    fn hand_back(&mut self, first: bool, last: bool, error: bool, len: usize) {
        self.owned = false;
        self.first = first;
        self.last = last;
        self.has_error = error;
        self.frame_len = len;
    }

    /// A complete single-descriptor frame of `len` bytes landed here
    pub fn simulate_receive(&mut self, len: usize) {
        self.hand_back(true, true, false, len);
    }

    /// An errored frame landed here (single descriptor, zero length)
    pub fn simulate_error(&mut self) {
        self.hand_back(true, true, true, 0);
    }

    /// One piece of a multi-descriptor frame landed here; `len` is only
    /// meaningful when `last` is set
    pub fn simulate_fragment(&mut self, first: bool, last: bool, len: usize) {
        self.hand_back(first, last, false, len);
    }

    /// Back to the freshly constructed state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clear frame state ahead of handing the descriptor back to DMA;
    /// ownership stays with the CPU until `set_owned`
    pub fn recycle(&mut self) {
        self.first = false;
        self.last = false;
        self.has_error = false;
        self.frame_len = 0;
    }
}

impl RxSlot for MockDescriptor {
    fn is_owned(&self) -> bool {
        self.owned
    }

    fn is_first(&self) -> bool {
        self.first
    }

    fn is_last(&self) -> bool {
        self.last
    }

    fn has_error(&self) -> bool {
        self.has_error
    }

    fn frame_length(&self) -> usize {
        self.frame_len
    }
}

// =============================================================================
// Test Assertions
// =============================================================================

/// Assert the mock bus saw a write of exactly `$value` to a register
#[macro_export]
macro_rules! assert_reg_written {
    ($mdio:expr, $phy:expr, $reg:expr, $value:expr) => {
        let writes = $mdio.get_writes();
        assert!(
            writes
                .iter()
                .any(|&(p, r, v)| p == $phy && r == $reg && v == $value),
            "PHY {} register {} never saw value 0x{:04X}; writes: {:?}",
            $phy,
            $reg,
            $value,
            writes
        );
    };
}

/// Assert some write to a register carried all of `$bits`
#[macro_export]
macro_rules! assert_reg_written_any {
    ($mdio:expr, $phy:expr, $reg:expr, $bits:expr) => {
        let writes = $mdio.get_writes();
        assert!(
            writes
                .iter()
                .any(|&(p, r, v)| p == $phy && r == $reg && (v & $bits) == $bits),
            "no write to PHY {} register {} carried bits 0x{:04X}; writes: {:?}",
            $phy,
            $reg,
            $bits,
            writes
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_registers_read_zero() {
        let mut mdio = MockMdioBus::new();
        assert_eq!(mdio.read(5, 17).unwrap(), 0);
    }

    #[test]
    fn writes_update_and_get_logged() {
        let mut mdio = MockMdioBus::new();

        mdio.set_register(0, 1, 0x7809);
        assert_eq!(mdio.read(0, 1).unwrap(), 0x7809);

        mdio.write(0, 1, 0x2100).unwrap();
        assert_eq!(mdio.read(0, 1).unwrap(), 0x2100);

        // set_register bypasses the log; only the write shows up
        assert_eq!(mdio.get_writes(), [(0, 1, 0x2100)]);

        mdio.clear_writes();
        assert!(mdio.get_writes().is_empty());
    }

    #[test]
    fn phys_have_independent_register_files() {
        let mut mdio = MockMdioBus::new();

        mdio.set_register(0, 1, 0xA001);
        mdio.set_register(1, 1, 0xA002);

        assert_eq!(mdio.read(0, 1).unwrap(), 0xA001);
        assert_eq!(mdio.read(1, 1).unwrap(), 0xA002);
    }

    #[test]
    fn bmcr_reset_completes_by_next_read() {
        let mut mdio = MockMdioBus::new();

        mdio.write(0, phy_reg::BMCR, bmcr::RESET | bmcr::SPEED_100)
            .unwrap();

        // logged verbatim
        assert_eq!(
            mdio.get_writes(),
            [(0, phy_reg::BMCR, bmcr::RESET | bmcr::SPEED_100)]
        );

        // but RESET has self-cleared while SPEED_100 stuck
        let readback = mdio.read(0, phy_reg::BMCR).unwrap();
        assert_eq!(readback & bmcr::RESET, 0);
        assert_ne!(readback & bmcr::SPEED_100, 0);
    }

    #[test]
    fn held_reset_stays_latched() {
        let mut mdio = MockMdioBus::new();
        mdio.hold_bmcr_reset(true);

        mdio.write(0, phy_reg::BMCR, bmcr::RESET).unwrap();

        assert_ne!(mdio.read(0, phy_reg::BMCR).unwrap() & bmcr::RESET, 0);
    }

    #[test]
    fn delay_accumulates_across_calls() {
        use embedded_hal::delay::DelayNs;

        let mut delay = MockDelay::new();
        delay.delay_ns(1_000);
        delay.delay_ns(2_000);

        assert_eq!(delay.total_ns(), 3_000);
        assert_eq!(delay.total_ms(), 0);

        delay.delay_ns(2_000_000);
        assert_eq!(delay.total_us(), 2_003);
        assert_eq!(delay.total_ms(), 2);

        delay.reset();
        assert_eq!(delay.total_ns(), 0);
    }

    #[test]
    fn lan8742a_profile_is_capable_but_down() {
        let mut mdio = MockMdioBus::new();
        mdio.setup_lan8742a(0);

        assert_eq!(mdio.read(0, phy_reg::PHYIDR1).unwrap(), 0x0007);
        assert_eq!(mdio.read(0, phy_reg::PHYIDR2).unwrap(), 0xC131);

        let status = mdio.read(0, phy_reg::BMSR).unwrap();
        assert_ne!(status & bmsr::TX_FD_CAPABLE, 0);
        assert_eq!(status & bmsr::LINK_STATUS, 0);
    }

    #[test]
    fn link_cycle_tracks_status_and_partner() {
        let mut mdio = MockMdioBus::new();
        mdio.setup_lan8742a(0);

        mdio.simulate_link_up_100_fd(0);

        let status = mdio.read(0, phy_reg::BMSR).unwrap();
        assert_ne!(status & bmsr::LINK_STATUS, 0);
        assert_ne!(status & bmsr::AN_COMPLETE, 0);
        assert_ne!(mdio.read(0, phy_reg::ANLPAR).unwrap() & anlpar::CAN_100_FD, 0);
        assert_ne!(mdio.read(0, reg::PSCSR).unwrap() & pscsr::AUTODONE, 0);

        mdio.simulate_link_down(0);

        let status = mdio.read(0, phy_reg::BMSR).unwrap();
        assert_eq!(status & bmsr::LINK_STATUS, 0);
        assert_eq!(mdio.read(0, phy_reg::ANLPAR).unwrap(), 0);
        assert_eq!(mdio.read(0, reg::PSCSR).unwrap(), 0);
    }

    #[test]
    fn descriptor_receive_then_recycle() {
        let mut desc = MockDescriptor::new();
        desc.set_owned();
        assert!(desc.is_owned());

        desc.simulate_receive(1360);
        assert!(!desc.is_owned());
        assert!(desc.is_first() && desc.is_last());
        assert!(!desc.has_error());
        assert_eq!(desc.frame_length(), 1360);

        desc.recycle();
        assert!(!desc.is_first());
        assert!(!desc.is_last());
        assert_eq!(desc.frame_length(), 0);
    }

    #[test]
    fn descriptor_error_and_fragment_states() {
        let mut desc = MockDescriptor::new();

        desc.simulate_error();
        assert!(desc.has_error());
        assert_eq!(desc.frame_length(), 0);

        desc.simulate_fragment(true, false, 0);
        assert!(desc.is_first());
        assert!(!desc.is_last());
        assert!(!desc.has_error());
    }
}
