//! RX DMA descriptor for frame reception.

use core::sync::atomic::{Ordering, fence};

use super::VolatileCell;
use super::bits::{rdes0, rdes1};

/// One normal-format RX descriptor, four words.
///
/// Runs in chained mode like the TX ring; RDES3 is always the chain
/// pointer. The DMA writes reception status into RDES0, so nearly every
/// accessor here is a view into that word.
#[repr(C)]
#[repr(align(4))]
pub struct RxDescriptor {
    /// RDES0: Status bits
    rdes0: VolatileCell<u32>,
    /// RDES1: Control and buffer sizes
    rdes1: VolatileCell<u32>,
    /// RDES2: Buffer 1 address
    buffer1_addr: VolatileCell<u32>,
    /// RDES3: Buffer 2 / Next descriptor address (in chained mode)
    buffer2_next_desc: VolatileCell<u32>,
}

#[allow(dead_code)]
impl RxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// A zeroed descriptor; [`Self::setup_chained`] must run before the
    /// DMA sees it.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rdes0: VolatileCell::new(0),
            rdes1: VolatileCell::new(0),
            buffer1_addr: VolatileCell::new(0),
            buffer2_next_desc: VolatileCell::new(0),
        }
    }

    /// Snapshot of the status word. Callers that test several flags of
    /// one write-back should go through a single snapshot.
    #[inline(always)]
    fn status(&self) -> u32 {
        self.rdes0.get()
    }

    /// Wire the descriptor into the chain and hand it to DMA in one go.
    pub fn setup_chained(
        &self,
        buffer: *mut u8,
        buffer_size: usize,
        next_desc: *const RxDescriptor,
    ) {
        self.buffer1_addr.set(buffer as u32);
        self.buffer2_next_desc.set(next_desc as u32);
        self.rdes1
            .set(rdes1::SECOND_ADDR_CHAINED | ((buffer_size as u32) & rdes1::BUFFER1_SIZE_MASK));
        self.set_owned();
    }

    /// DMA currently holds this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.status() & rdes0::OWN != 0
    }

    /// Hand the descriptor to DMA, wiping stale status in the same write.
    ///
    /// Fenced on both sides: buffer and control writes must land before
    /// OWN flips, and the poll-demand kick that follows must not move
    /// ahead of it.
    #[inline(always)]
    pub fn set_owned(&self) {
        fence(Ordering::SeqCst);
        self.rdes0.set(rdes0::OWN);
        fence(Ordering::SeqCst);
    }

    /// Take the descriptor back for the CPU.
    ///
    /// Fenced like [`Self::set_owned`] so buffer reads stay behind the
    /// flag write.
    #[inline(always)]
    pub fn clear_owned(&self) {
        fence(Ordering::SeqCst);
        self.rdes0.update(|v| v & !rdes0::OWN);
        fence(Ordering::SeqCst);
    }

    /// Opens a frame.
    #[inline(always)]
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.status() & rdes0::FIRST_DESC != 0
    }

    /// Closes a frame.
    #[inline(always)]
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.status() & rdes0::LAST_DESC != 0
    }

    /// A whole frame landed in this one descriptor.
    #[inline(always)]
    #[must_use]
    pub fn is_complete_frame(&self) -> bool {
        const BOUNDS: u32 = rdes0::FIRST_DESC | rdes0::LAST_DESC;
        self.status() & BOUNDS == BOUNDS
    }

    /// Error summary flag from the status write-back.
    #[inline(always)]
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.status() & rdes0::ERR_SUMMARY != 0
    }

    /// All individual error bits from RDES0.
    #[inline(always)]
    #[must_use]
    pub fn error_flags(&self) -> u32 {
        self.status() & rdes0::ALL_ERRORS
    }

    /// Received length including the 4-byte FCS. Only the closing
    /// descriptor of a frame carries a meaningful value.
    #[inline(always)]
    #[must_use]
    pub fn frame_length(&self) -> usize {
        ((self.status() & rdes0::FRAME_LEN_MASK) >> rdes0::FRAME_LEN_SHIFT) as usize
    }

    /// Received length with the FCS subtracted.
    #[inline(always)]
    #[must_use]
    pub fn payload_length(&self) -> usize {
        self.frame_length().saturating_sub(4)
    }

    /// The frame carried a VLAN tag.
    #[inline(always)]
    #[must_use]
    pub fn has_vlan_tag(&self) -> bool {
        self.status() & rdes0::VLAN_TAG != 0
    }

    /// EtherType frame rather than an 802.3 length frame.
    #[inline(always)]
    #[must_use]
    pub fn is_ethernet_frame(&self) -> bool {
        self.status() & rdes0::FRAME_TYPE != 0
    }

    /// The destination address missed every filter.
    #[inline(always)]
    #[must_use]
    pub fn failed_dest_filter(&self) -> bool {
        self.status() & rdes0::DA_FILTER_FAIL != 0
    }

    /// Offload engine flagged a bad IP header checksum.
    #[inline(always)]
    #[must_use]
    pub fn has_ip_header_error(&self) -> bool {
        self.status() & rdes0::IP_HEADER_CSUM_ERR != 0
    }

    /// Offload engine flagged a bad IP payload checksum.
    #[inline(always)]
    #[must_use]
    pub fn has_ip_payload_error(&self) -> bool {
        self.status() & rdes0::PAYLOAD_CSUM_ERR != 0
    }

    /// The programmed buffer address (RDES2).
    #[inline(always)]
    #[must_use]
    pub fn buffer_addr(&self) -> u32 {
        self.buffer1_addr.get()
    }

    /// The chain pointer (RDES3).
    #[inline(always)]
    #[must_use]
    pub fn next_desc_addr(&self) -> u32 {
        self.buffer2_next_desc.get()
    }

    /// The buffer capacity programmed into RDES1.
    #[inline(always)]
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        (self.rdes1.get() & rdes1::BUFFER1_SIZE_MASK) as usize
    }

    /// Return a consumed descriptor to DMA. RDES1 keeps the buffer
    /// configuration, so the status wipe in [`Self::set_owned`] is all
    /// recycling needs.
    pub fn recycle(&self) {
        self.set_owned();
    }

    /// Raw RDES0, for logging.
    #[inline(always)]
    #[must_use]
    pub fn raw_rdes0(&self) -> u32 {
        self.rdes0.get()
    }

    /// Raw RDES1, for logging.
    #[inline(always)]
    #[must_use]
    pub fn raw_rdes1(&self) -> u32 {
        self.rdes1.get()
    }
}

#[cfg(test)]
impl RxDescriptor {
    /// Test-only: overwrite RDES0 to fabricate a DMA status write-back.
    pub(crate) fn force_rdes0(&self, value: u32) {
        self.rdes0.set(value);
    }
}

impl Default for RxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl super::RxSlot for RxDescriptor {
    #[inline(always)]
    fn is_owned(&self) -> bool {
        RxDescriptor::is_owned(self)
    }

    #[inline(always)]
    fn is_first(&self) -> bool {
        RxDescriptor::is_first(self)
    }

    #[inline(always)]
    fn is_last(&self) -> bool {
        RxDescriptor::is_last(self)
    }

    #[inline(always)]
    fn has_error(&self) -> bool {
        RxDescriptor::has_error(self)
    }

    #[inline(always)]
    fn frame_length(&self) -> usize {
        RxDescriptor::frame_length(self)
    }
}

// Safety: every DMA-shared field is behind a volatile cell
unsafe impl Sync for RxDescriptor {}
unsafe impl Send for RxDescriptor {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::dma::descriptor::bits::{rdes0, rdes1};

    fn with_length(len: u32) -> u32 {
        len << rdes0::FRAME_LEN_SHIFT
    }

    #[test]
    fn layout_is_four_aligned_words() {
        assert_eq!(core::mem::size_of::<RxDescriptor>(), RxDescriptor::SIZE);
        assert_eq!(RxDescriptor::SIZE, 16);
        assert_eq!(core::mem::align_of::<RxDescriptor>(), 4);
    }

    #[test]
    fn ownership_round_trip() {
        let desc = RxDescriptor::new();
        assert!(!desc.is_owned());

        desc.set_owned();
        assert!(desc.is_owned());

        desc.clear_owned();
        assert!(!desc.is_owned());
    }

    #[test]
    fn handoff_writes_own_alone() {
        let desc = RxDescriptor::new();
        desc.set_owned();

        assert_eq!(desc.raw_rdes0(), rdes0::OWN);
        assert_eq!(rdes0::OWN, 1 << 31);
    }

    #[test]
    fn frame_boundary_flags() {
        let desc = RxDescriptor::new();
        assert!(!desc.is_first() && !desc.is_last());

        desc.force_rdes0(rdes0::FIRST_DESC);
        assert!(desc.is_first() && !desc.is_last());
        assert!(!desc.is_complete_frame());

        desc.force_rdes0(rdes0::LAST_DESC);
        assert!(!desc.is_first() && desc.is_last());

        desc.force_rdes0(rdes0::FIRST_DESC | rdes0::LAST_DESC);
        assert!(desc.is_complete_frame());
    }

    #[test]
    fn length_field_decodes() {
        let desc = RxDescriptor::new();
        for len in [64_u32, 256, 1500, 1518] {
            desc.force_rdes0(with_length(len));
            assert_eq!(desc.frame_length(), len as usize);
        }
    }

    #[test]
    fn length_ignores_neighboring_bits() {
        let desc = RxDescriptor::new();
        desc.force_rdes0(rdes0::OWN | rdes0::FIRST_DESC | rdes0::LAST_DESC | with_length(342));

        assert_eq!(desc.frame_length(), 342);
        assert!(desc.is_owned());
        assert!(desc.is_complete_frame());
    }

    #[test]
    fn payload_length_subtracts_the_fcs() {
        let desc = RxDescriptor::new();

        // minimum wire frame: 64 bytes on the wire, 60 of payload
        desc.force_rdes0(with_length(64));
        assert_eq!(desc.payload_length(), 60);

        // degenerate lengths saturate instead of wrapping
        desc.force_rdes0(with_length(3));
        assert_eq!(desc.payload_length(), 0);
    }

    #[test]
    fn error_summary_and_causes() {
        let desc = RxDescriptor::new();
        assert!(!desc.has_error());

        desc.force_rdes0(rdes0::ERR_SUMMARY | rdes0::CRC_ERR | rdes0::OVERFLOW_ERR);
        assert!(desc.has_error());

        let errors = desc.error_flags();
        assert_ne!(errors & rdes0::CRC_ERR, 0);
        assert_ne!(errors & rdes0::OVERFLOW_ERR, 0);

        desc.force_rdes0(0);
        assert!(!desc.has_error());
    }

    #[test]
    fn classification_flags_decode() {
        let desc = RxDescriptor::new();
        desc.force_rdes0(rdes0::DA_FILTER_FAIL | rdes0::VLAN_TAG | rdes0::FRAME_TYPE);

        assert!(desc.failed_dest_filter());
        assert!(desc.has_vlan_tag());
        assert!(desc.is_ethernet_frame());
    }

    #[test]
    fn buffer_size_lives_in_rdes1() {
        let desc = RxDescriptor::new();

        for size in [512_u32, 1600] {
            desc.rdes1.set(size & rdes1::BUFFER1_SIZE_MASK);
            assert_eq!(desc.buffer_size(), size as usize);
        }
    }

    #[test]
    fn chained_setup_programs_and_hands_off() {
        let desc = RxDescriptor::new();
        let mut buffer = [0u8; 128];

        desc.setup_chained(buffer.as_mut_ptr(), buffer.len(), &desc);

        assert!(desc.is_owned());
        assert_eq!(desc.buffer_size(), 128);
        assert_eq!(desc.buffer_addr(), buffer.as_mut_ptr() as u32);
        assert_eq!(desc.next_desc_addr(), &desc as *const _ as u32);
        assert_ne!(desc.raw_rdes1() & rdes1::SECOND_ADDR_CHAINED, 0);
    }

    #[test]
    fn recycle_wipes_status_keeps_buffer_config() {
        let desc = RxDescriptor::new();
        desc.rdes1.set(1522);
        desc.force_rdes0(rdes0::ERR_SUMMARY | rdes0::CRC_ERR | rdes0::LAST_DESC | with_length(90));

        desc.recycle();

        assert!(desc.is_owned());
        assert!(!desc.has_error());
        assert!(!desc.is_last());
        assert_eq!(desc.frame_length(), 0);
        assert_eq!(desc.buffer_size(), 1522);
    }
}
