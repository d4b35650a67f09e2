//! TX DMA descriptor for frame transmission.

use core::sync::atomic::{Ordering, fence};

use super::VolatileCell;
use super::bits::{tdes0, tdes1};

/// One normal-format TX descriptor, four words.
///
/// The driver runs the ring in chained mode, so the fourth word always
/// points at the next descriptor rather than a second buffer.
#[repr(C)]
#[repr(align(4))]
pub struct TxDescriptor {
    /// TDES0: Status and control bits
    tdes0: VolatileCell<u32>,
    /// TDES1: Buffer sizes
    tdes1: VolatileCell<u32>,
    /// TDES2: Buffer 1 address
    buffer1_addr: VolatileCell<u32>,
    /// TDES3: Buffer 2 / Next descriptor address (in chained mode)
    buffer2_next_desc: VolatileCell<u32>,
}

#[allow(dead_code)]
impl TxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// A zeroed descriptor, not owned by DMA.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tdes0: VolatileCell::new(0),
            tdes1: VolatileCell::new(0),
            buffer1_addr: VolatileCell::new(0),
            buffer2_next_desc: VolatileCell::new(0),
        }
    }

    /// Wire the descriptor into a chain: buffer pointer, next-descriptor
    /// pointer, chain flag, no pending frame.
    pub fn setup_chained(&self, buffer: *const u8, next_desc: *const TxDescriptor) {
        self.buffer1_addr.set(buffer as u32);
        self.buffer2_next_desc.set(next_desc as u32);
        self.tdes1.set(0);
        self.tdes0.set(tdes0::SECOND_ADDR_CHAINED);
    }

    /// DMA currently holds this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn is_owned(&self) -> bool {
        (self.tdes0.get() & tdes0::OWN) != 0
    }

    /// Hand the descriptor to DMA.
    ///
    /// Fenced on both sides: buffer and descriptor writes must land before
    /// OWN flips, and the poll-demand kick that follows must not move
    /// ahead of it.
    #[inline(always)]
    pub fn set_owned(&self) {
        fence(Ordering::SeqCst);
        self.tdes0.update(|v| v | tdes0::OWN);
        fence(Ordering::SeqCst);
    }

    /// Take the descriptor back for the CPU.
    ///
    /// Fenced like [`Self::set_owned`] so status reads after reclaim stay
    /// behind the flag write.
    #[inline(always)]
    pub fn clear_owned(&self) {
        fence(Ordering::SeqCst);
        self.tdes0.update(|v| v & !tdes0::OWN);
        fence(Ordering::SeqCst);
    }

    /// Write length and segment flags for a pending frame. OWN stays
    /// clear; hand-off is a separate step.
    pub fn prepare(&self, len: usize, first: bool, last: bool) {
        let flags = tdes0::SECOND_ADDR_CHAINED
            | if first { tdes0::FIRST_SEGMENT } else { 0 }
            | if last {
                // completion interrupt fires per frame, not per segment
                tdes0::LAST_SEGMENT | tdes0::INTERRUPT_ON_COMPLETE
            } else {
                0
            };

        self.tdes1.set((len as u32) & tdes1::BUFFER1_SIZE_MASK);
        self.tdes0.set(flags);
    }

    /// [`Self::prepare`] followed immediately by the DMA hand-off.
    pub fn prepare_and_submit(&self, len: usize, first: bool, last: bool) {
        self.prepare(len, first, last);
        self.set_owned();
    }

    /// OR extra control flags (checksum, padding, CRC) into TDES0.
    ///
    /// Only meaningful between [`Self::prepare`] and [`Self::set_owned`];
    /// OWN is filtered out so this can never hand off by accident.
    pub fn add_ctrl_flags(&self, flags: u32) {
        self.tdes0.update(|v| v | (flags & !tdes0::OWN));
    }

    /// Program the CIC field with a checksum insertion mode.
    pub fn set_checksum_mode(&self, mode: u32) {
        self.tdes0.update(|v| {
            (v & !tdes0::CHECKSUM_INSERT_MASK)
                | ((mode << tdes0::CHECKSUM_INSERT_SHIFT) & tdes0::CHECKSUM_INSERT_MASK)
        });
    }

    /// Whether this descriptor closes a frame.
    ///
    /// Completion status is written back into a frame's last descriptor
    /// only, so reclaim walks to descriptors with this flag.
    #[inline(always)]
    #[must_use]
    pub fn is_last_segment(&self) -> bool {
        (self.tdes0.get() & tdes0::LAST_SEGMENT) != 0
    }

    /// Error summary flag from the status write-back.
    #[inline(always)]
    #[must_use]
    pub fn has_error(&self) -> bool {
        (self.tdes0.get() & tdes0::ERR_SUMMARY) != 0
    }

    /// All individual error bits from TDES0.
    #[inline(always)]
    #[must_use]
    pub fn error_flags(&self) -> u32 {
        self.tdes0.get() & tdes0::ALL_ERRORS
    }

    /// Collisions suffered sending this frame (half duplex).
    #[inline(always)]
    #[must_use]
    pub fn collision_count(&self) -> u8 {
        ((self.tdes0.get() & tdes0::COLLISION_COUNT_MASK) >> tdes0::COLLISION_COUNT_SHIFT) as u8
    }

    /// The programmed buffer address.
    #[inline(always)]
    #[must_use]
    pub fn buffer_addr(&self) -> u32 {
        self.buffer1_addr.get()
    }

    /// The chain pointer.
    #[inline(always)]
    #[must_use]
    pub fn next_desc_addr(&self) -> u32 {
        self.buffer2_next_desc.get()
    }

    /// Drop any frame state. The buffer and chain pointers survive, so a
    /// reset descriptor is immediately reusable.
    pub fn reset(&self) {
        self.tdes0.set(tdes0::SECOND_ADDR_CHAINED);
        self.tdes1.set(0);
    }

    /// Raw TDES0, for logging.
    #[inline(always)]
    #[must_use]
    pub fn raw_tdes0(&self) -> u32 {
        self.tdes0.get()
    }

    /// Raw TDES1, for logging.
    #[inline(always)]
    #[must_use]
    pub fn raw_tdes1(&self) -> u32 {
        self.tdes1.get()
    }
}

#[cfg(test)]
impl TxDescriptor {
    /// Test-only: overwrite TDES0 to fabricate a DMA status write-back.
    pub(crate) fn force_tdes0(&self, value: u32) {
        self.tdes0.set(value);
    }
}

impl Default for TxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: every DMA-shared field is behind a volatile cell
unsafe impl Sync for TxDescriptor {}
unsafe impl Send for TxDescriptor {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::dma::descriptor::bits::{checksum_mode, tdes0, tdes1};

    fn length_field(desc: &TxDescriptor) -> u32 {
        desc.raw_tdes1() & tdes1::BUFFER1_SIZE_MASK
    }

    #[test]
    fn layout_is_four_aligned_words() {
        assert_eq!(core::mem::size_of::<TxDescriptor>(), TxDescriptor::SIZE);
        assert_eq!(TxDescriptor::SIZE, 16);
        assert_eq!(core::mem::align_of::<TxDescriptor>(), 4);
    }

    #[test]
    fn ownership_round_trip() {
        let desc = TxDescriptor::new();
        assert!(!desc.is_owned());

        desc.set_owned();
        assert!(desc.is_owned());

        desc.clear_owned();
        assert!(!desc.is_owned());
    }

    #[test]
    fn handoff_only_touches_the_own_bit() {
        let desc = TxDescriptor::new();
        desc.prepare(60, true, true);

        let before = desc.raw_tdes0();
        desc.set_owned();

        assert_eq!(desc.raw_tdes0(), before | tdes0::OWN);
        assert_eq!(tdes0::OWN, 1 << 31);
    }

    #[test]
    fn prepare_marks_segments() {
        for (first, last) in [(true, false), (false, true), (true, true)] {
            let desc = TxDescriptor::new();
            desc.prepare(60, first, last);
            let raw = desc.raw_tdes0();

            assert_eq!(raw & tdes0::FIRST_SEGMENT != 0, first);
            assert_eq!(raw & tdes0::LAST_SEGMENT != 0, last);
            // the completion interrupt rides on the closing segment
            assert_eq!(raw & tdes0::INTERRUPT_ON_COMPLETE != 0, last);
            // chained mode always on, hand-off never implicit
            assert_ne!(raw & tdes0::SECOND_ADDR_CHAINED, 0);
            assert_eq!(raw & tdes0::OWN, 0);
        }
    }

    #[test]
    fn prepare_encodes_the_length() {
        let desc = TxDescriptor::new();
        for len in [64_usize, 1500, 1518] {
            desc.prepare(len, true, true);
            assert_eq!(length_field(&desc), len as u32);
        }
    }

    #[test]
    fn submit_is_prepare_plus_handoff() {
        let desc = TxDescriptor::new();
        desc.prepare_and_submit(1514, true, true);

        assert!(desc.is_owned());
        assert_eq!(length_field(&desc), 1514);
        let raw = desc.raw_tdes0();
        assert_ne!(raw & tdes0::FIRST_SEGMENT, 0);
        assert_ne!(raw & tdes0::LAST_SEGMENT, 0);
    }

    #[test]
    fn ctrl_flags_cannot_hand_off() {
        let desc = TxDescriptor::new();
        desc.prepare(64, true, true);
        desc.add_ctrl_flags(tdes0::DISABLE_PAD | tdes0::OWN);

        assert_ne!(desc.raw_tdes0() & tdes0::DISABLE_PAD, 0);
        assert!(!desc.is_owned());
    }

    #[test]
    fn checksum_modes_land_in_the_cic_field() {
        for (mode, encoding) in [
            (checksum_mode::DISABLED, 0),
            (checksum_mode::IP_ONLY, 1),
            (checksum_mode::IP_AND_PAYLOAD, 2),
            (checksum_mode::FULL, 3),
        ] {
            let desc = TxDescriptor::new();
            desc.prepare(60, true, true);
            desc.set_checksum_mode(mode);

            let field =
                (desc.raw_tdes0() & tdes0::CHECKSUM_INSERT_MASK) >> tdes0::CHECKSUM_INSERT_SHIFT;
            assert_eq!(field, encoding);
        }
    }

    #[test]
    fn error_summary_gates_has_error() {
        let desc = TxDescriptor::new();
        assert!(!desc.has_error());

        desc.force_tdes0(tdes0::ERR_SUMMARY);
        assert!(desc.has_error());

        desc.force_tdes0(tdes0::UNDERFLOW_ERR);
        // individual bits without the summary do not count
        assert!(!desc.has_error());
    }

    #[test]
    fn error_flags_reports_each_cause() {
        let desc = TxDescriptor::new();
        desc.force_tdes0(tdes0::ERR_SUMMARY | tdes0::LATE_COLLISION | tdes0::UNDERFLOW_ERR);

        assert!(desc.has_error());
        let errors = desc.error_flags();
        assert_ne!(errors & tdes0::LATE_COLLISION, 0);
        assert_ne!(errors & tdes0::UNDERFLOW_ERR, 0);
    }

    #[test]
    fn collision_count_comes_from_its_field() {
        let desc = TxDescriptor::new();
        desc.force_tdes0(5 << tdes0::COLLISION_COUNT_SHIFT);
        assert_eq!(desc.collision_count(), 5);
    }

    #[test]
    fn reset_drops_frame_state_keeps_chain() {
        let desc = TxDescriptor::new();
        let fake_next = 0x1234_5678_u32;

        desc.buffer2_next_desc.set(fake_next);
        desc.prepare_and_submit(730, true, true);
        desc.set_checksum_mode(checksum_mode::IP_AND_PAYLOAD);

        desc.reset();

        assert!(!desc.is_owned());
        assert_eq!(length_field(&desc), 0);
        assert_eq!(desc.next_desc_addr(), fake_next);
        assert_ne!(desc.raw_tdes0() & tdes0::SECOND_ADDR_CHAINED, 0);
    }
}
