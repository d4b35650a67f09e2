//! DMA engine managing TX/RX descriptor rings and buffers.

use super::descriptor::{RxDescriptor, RxSlot, TxDescriptor};
use super::ring::DescriptorRing;
use crate::driver::error::{DmaError, IoError, Result};
use crate::driver::mac::FrameInfo;
use crate::internal::register::dma::DmaRegs;

#[cfg(feature = "defmt")]
fn log_rx_error(desc: &RxDescriptor) {
    use crate::internal::dma::descriptor::bits::rdes0;

    let raw = desc.raw_rdes0();
    let flags = raw & (rdes0::ALL_ERRORS | rdes0::SA_FILTER_FAIL | rdes0::DA_FILTER_FAIL);
    defmt::warn!("RX frame error: rdes0={=u32:#x} flags={=u32:#x}", raw, flags);
}

/// Outcome of a read-only scan of the RX ring at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameScan {
    /// Current descriptor is still owned by the DMA; nothing to process.
    None,
    /// A frame has started but its last descriptor has not arrived yet.
    Incomplete,
    /// Current descriptor is software-owned but not a frame start (stale
    /// segment left behind by an earlier discard).
    Orphan,
    /// A complete frame occupies `count` descriptors starting at ring
    /// index `first`.
    Complete {
        first: usize,
        count: usize,
        /// Frame length from the last descriptor, including the 4-byte CRC.
        length: usize,
        error: bool,
    },
}

/// Walk the RX ring from the current position without mutating anything.
///
/// Stops at the first DMA-owned descriptor; a frame start whose last
/// descriptor has not landed inside the software-owned run reports
/// [`FrameScan::Incomplete`], including the case where the walk wraps all
/// the way around the ring.
pub(crate) fn scan_rx_frame<D: RxSlot, const N: usize>(ring: &DescriptorRing<D, N>) -> FrameScan {
    let head = ring.current();
    if head.is_owned() {
        return FrameScan::None;
    }
    if !head.is_first() {
        return FrameScan::Orphan;
    }

    let mut error = false;
    for offset in 0..N {
        let desc = ring.at_offset(offset);
        if desc.is_owned() {
            return FrameScan::Incomplete;
        }
        error |= desc.has_error();
        if desc.is_last() {
            return FrameScan::Complete {
                first: ring.current_index(),
                count: offset + 1,
                length: desc.frame_length(),
                error,
            };
        }
    }

    FrameScan::Incomplete
}

/// DMA Engine with statically allocated buffers.
///
/// # Type Parameters
/// * `RX_BUFS` - Number of receive buffers/descriptors
/// * `TX_BUFS` - Number of transmit buffers/descriptors
/// * `BUF_SIZE` - Size of each buffer in bytes (>= 1600 for standard frames)
pub struct DmaEngine<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> {
    /// RX descriptor ring
    rx_ring: DescriptorRing<RxDescriptor, RX_BUFS>,
    /// TX descriptor ring
    tx_ring: DescriptorRing<TxDescriptor, TX_BUFS>,
    /// RX data buffers
    rx_buffers: [[u8; BUF_SIZE]; RX_BUFS],
    /// TX data buffers
    tx_buffers: [[u8; BUF_SIZE]; TX_BUFS],
    /// TX control flags to apply to frames
    tx_ctrl_flags: u32,
    /// Next TX descriptor to harvest completion status from
    tx_clean: usize,
    /// Submitted TX descriptors not yet harvested
    tx_pending: usize,
    /// Frames dropped by the receive path (errors and forced flushes)
    rx_dropped: u32,
    /// Frames the DMA reported transmit errors for
    tx_errors: u32,
    /// Whether the engine has been initialized
    initialized: bool,
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    DmaEngine<RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Create a new DMA engine with zeroed buffers. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        // Buffer sizes are encoded in 13-bit descriptor fields
        const { assert!(BUF_SIZE <= 0x1FFF) };
        const { assert!(RX_BUFS > 0 && TX_BUFS > 0) };

        Self {
            rx_ring: DescriptorRing {
                descriptors: [const { RxDescriptor::new() }; RX_BUFS],
                current: 0,
            },
            tx_ring: DescriptorRing {
                descriptors: [const { TxDescriptor::new() }; TX_BUFS],
                current: 0,
            },
            rx_buffers: [[0u8; BUF_SIZE]; RX_BUFS],
            tx_buffers: [[0u8; BUF_SIZE]; TX_BUFS],
            tx_ctrl_flags: 0,
            tx_clean: 0,
            tx_pending: 0,
            rx_dropped: 0,
            tx_errors: 0,
            initialized: false,
        }
    }

    /// Total memory usage in bytes.
    #[must_use]
    pub const fn memory_usage() -> usize {
        let rx_desc_size = RX_BUFS * RxDescriptor::SIZE;
        let tx_desc_size = TX_BUFS * TxDescriptor::SIZE;
        let rx_buf_size = RX_BUFS * BUF_SIZE;
        let tx_buf_size = TX_BUFS * BUF_SIZE;
        rx_desc_size + tx_desc_size + rx_buf_size + tx_buf_size
    }

    /// Initialize descriptor chains and DMA registers.
    /// Must be called before any DMA operations.
    pub fn init(&mut self) {
        for i in 0..RX_BUFS {
            let next_idx = (i + 1) % RX_BUFS;
            let buffer_ptr = self.rx_buffers[i].as_mut_ptr();
            let next_desc = &self.rx_ring.descriptors[next_idx] as *const RxDescriptor;
            self.rx_ring.descriptors[i].setup_chained(buffer_ptr, BUF_SIZE, next_desc);
        }

        for i in 0..TX_BUFS {
            let next_idx = (i + 1) % TX_BUFS;
            let buffer_ptr = self.tx_buffers[i].as_ptr();
            let next_desc = &self.tx_ring.descriptors[next_idx] as *const TxDescriptor;
            self.tx_ring.descriptors[i].setup_chained(buffer_ptr, next_desc);
        }

        self.rx_ring.reset();
        self.tx_ring.reset();
        self.tx_clean = 0;
        self.tx_pending = 0;
        DmaRegs::set_rx_desc_list_addr(self.rx_ring.base_addr_u32());
        DmaRegs::set_tx_desc_list_addr(self.tx_ring.base_addr_u32());
        self.initialized = true;
    }

    /// Reset to initial state. Caller should stop DMA first.
    pub fn reset(&mut self) {
        for i in 0..RX_BUFS {
            self.rx_ring.descriptors[i].recycle();
        }
        for i in 0..TX_BUFS {
            self.tx_ring.descriptors[i].reset();
        }
        self.rx_ring.reset();
        self.tx_ring.reset();
        self.tx_clean = 0;
        self.tx_pending = 0;
        DmaRegs::set_rx_desc_list_addr(self.rx_ring.base_addr_u32());
        DmaRegs::set_tx_desc_list_addr(self.tx_ring.base_addr_u32());
    }

    /// Check if the DMA engine has been initialized
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Set TX control flags (checksum offload, etc).
    pub fn set_tx_ctrl_flags(&mut self, flags: u32) {
        self.tx_ctrl_flags = flags;
    }

    /// Get the current TX control flags
    #[inline(always)]
    pub fn tx_ctrl_flags(&self) -> u32 {
        self.tx_ctrl_flags
    }

    /// RX descriptor list base address (as programmed into the DMA).
    #[inline(always)]
    pub fn rx_ring_addr(&self) -> u32 {
        self.rx_ring.base_addr_u32()
    }

    /// TX descriptor list base address (as programmed into the DMA).
    #[inline(always)]
    pub fn tx_ring_addr(&self) -> u32 {
        self.tx_ring.base_addr_u32()
    }

    /// Frames dropped by the receive path since initialization.
    #[inline(always)]
    pub fn rx_dropped(&self) -> u32 {
        self.rx_dropped
    }

    /// Frames the DMA reported transmit errors for since initialization.
    #[inline(always)]
    pub fn tx_error_count(&self) -> u32 {
        self.tx_errors
    }

    // =========================================================================
    // Transmit path
    // =========================================================================

    /// Count available TX descriptors (not owned by DMA).
    ///
    /// Only counts the contiguous run starting at the current slot; the DMA
    /// consumes descriptors strictly in ring order.
    pub fn tx_available(&self) -> usize {
        let mut count = 0;
        for i in 0..TX_BUFS {
            if !self.tx_ring.at_offset(i).is_owned() {
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    /// Check if enough descriptors are free for a frame of `len` bytes.
    pub fn can_transmit(&self, len: usize) -> bool {
        if len == 0 || len > BUF_SIZE * TX_BUFS {
            return false;
        }
        len.div_ceil(BUF_SIZE) <= self.tx_available()
    }

    /// Copy a frame into ring buffers and hand its descriptors to the DMA.
    ///
    /// Returns the ring index of the frame's first descriptor. Does not
    /// touch DMA registers; `transmit` adds the wakeup.
    fn stage(&mut self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Err(DmaError::InvalidLength.into());
        }
        if data.len() > BUF_SIZE * TX_BUFS {
            return Err(DmaError::FrameTooLarge.into());
        }

        let desc_count = data.len().div_ceil(BUF_SIZE);
        if self.tx_available() < desc_count {
            return Err(DmaError::RingExhausted.into());
        }

        let first_idx = self.tx_ring.current_index();

        // Fill buffers and prepare descriptors front to back
        let mut remaining = data.len();
        let mut offset = 0usize;
        for i in 0..desc_count {
            let idx = self.tx_ring.index_at_offset(i);
            let chunk = core::cmp::min(remaining, BUF_SIZE);
            self.tx_buffers[idx][..chunk].copy_from_slice(&data[offset..offset + chunk]);

            let desc = &self.tx_ring.descriptors[idx];
            desc.prepare(chunk, i == 0, i == desc_count - 1);
            if self.tx_ctrl_flags != 0 {
                desc.add_ctrl_flags(self.tx_ctrl_flags);
            }

            remaining -= chunk;
            offset += chunk;
        }

        // Hand descriptors over back to front so the first segment's OWN bit
        // is the final write; the DMA never sees a partially built frame.
        for i in (0..desc_count).rev() {
            self.tx_ring.at_offset(i).set_owned();
        }

        self.tx_ring.advance_by(desc_count);
        self.tx_pending = core::cmp::min(self.tx_pending + desc_count, TX_BUFS);
        Ok(first_idx)
    }

    /// Transmit a frame. Splits large frames across multiple descriptors.
    pub fn transmit(&mut self, data: &[u8]) -> Result<usize> {
        self.stage(data)?;
        DmaRegs::resume_tx();
        Ok(data.len())
    }

    /// Harvest completed TX descriptors. Returns (frames, errored frames).
    ///
    /// A frame has completed once the DMA clears OWN on its descriptors; the
    /// DMA writes frame status into the last descriptor, so frames are
    /// counted there. Harvested descriptors are reset for reuse.
    pub fn reclaim_transmitted(&mut self) -> (usize, usize) {
        let mut frames = 0usize;
        let mut errors = 0usize;

        while self.tx_pending > 0 {
            let desc = &self.tx_ring.descriptors[self.tx_clean];
            if desc.is_owned() {
                break;
            }

            if desc.is_last_segment() {
                frames += 1;
                if desc.has_error() {
                    errors += 1;
                    self.tx_errors = self.tx_errors.wrapping_add(1);
                    #[cfg(feature = "defmt")]
                    defmt::warn!("TX frame error: flags={=u32:#x}", desc.error_flags());
                }
            }

            desc.reset();
            self.tx_clean = (self.tx_clean + 1) % TX_BUFS;
            self.tx_pending -= 1;
        }

        (frames, errors)
    }

    // =========================================================================
    // Receive path
    // =========================================================================

    /// Count free RX descriptors (owned by DMA).
    pub fn rx_free_count(&self) -> usize {
        let mut count = 0;
        for desc in &self.rx_ring.descriptors {
            if desc.is_owned() {
                count += 1;
            }
        }
        count
    }

    /// Check if a software-owned descriptor is waiting at the ring head.
    pub fn rx_available(&self) -> bool {
        !self.rx_ring.current().is_owned()
    }

    /// Peek the next frame's payload length without consuming it.
    pub fn peek_frame_length(&self) -> Option<usize> {
        match scan_rx_frame(&self.rx_ring) {
            FrameScan::Complete {
                length,
                error: false,
                ..
            } => Some(length.saturating_sub(4)),
            _ => None,
        }
    }

    /// Count complete frames waiting in the RX ring.
    pub fn rx_frame_count(&self) -> usize {
        let mut count = 0;
        for i in 0..RX_BUFS {
            let desc = self.rx_ring.at_offset(i);
            if desc.is_owned() {
                break;
            }
            if desc.is_last() {
                count += 1;
            }
        }
        count
    }

    /// Find the next complete frame without consuming it.
    ///
    /// Error frames are recycled back to the DMA and counted, never
    /// surfaced; the scan then continues. Returns `None` when no complete,
    /// error-free frame is waiting. Repeated calls without
    /// [`Self::release_frame`] return the same frame.
    pub fn receive_frame(&mut self) -> Option<FrameInfo> {
        loop {
            match scan_rx_frame(&self.rx_ring) {
                FrameScan::None | FrameScan::Incomplete => return None,
                FrameScan::Orphan => {
                    self.rx_ring.current().recycle();
                    self.rx_ring.advance();
                    self.rx_dropped = self.rx_dropped.wrapping_add(1);
                }
                FrameScan::Complete {
                    count, error: true, ..
                } => {
                    #[cfg(feature = "defmt")]
                    log_rx_error(self.rx_ring.current());
                    for _ in 0..count {
                        self.rx_ring.current().recycle();
                        self.rx_ring.advance();
                    }
                    self.rx_dropped = self.rx_dropped.wrapping_add(1);
                }
                FrameScan::Complete {
                    first,
                    count,
                    length,
                    error: false,
                } => {
                    return Some(FrameInfo {
                        first_index: first,
                        descriptor_count: count,
                        length: length.saturating_sub(4),
                    });
                }
            }
        }
    }

    /// Copy a frame found by [`Self::receive_frame`] into `buffer`.
    ///
    /// Does not release descriptors; call [`Self::release_frame`] when done
    /// with the data.
    pub fn copy_frame(&self, info: &FrameInfo, buffer: &mut [u8]) -> Result<usize> {
        if buffer.len() < info.length {
            return Err(IoError::BufferTooSmall.into());
        }

        let mut remaining = info.length;
        let mut offset = 0usize;
        for i in 0..info.descriptor_count {
            let idx = (info.first_index + i) % RX_BUFS;
            let chunk = core::cmp::min(remaining, BUF_SIZE);
            buffer[offset..offset + chunk].copy_from_slice(&self.rx_buffers[idx][..chunk]);
            remaining -= chunk;
            offset += chunk;
        }
        Ok(info.length)
    }

    /// Return a received frame's descriptors to the DMA and resume it.
    ///
    /// `info` must be the most recent result of [`Self::receive_frame`].
    pub fn release_frame(&mut self, info: &FrameInfo) {
        for _ in 0..info.descriptor_count {
            self.rx_ring.current().recycle();
            self.rx_ring.advance();
        }
        DmaRegs::resume_rx();
    }

    /// Receive a frame into `buffer`. Returns length excluding CRC.
    ///
    /// Combines [`Self::receive_frame`], [`Self::copy_frame`] and
    /// [`Self::release_frame`]; returns `IncompleteFrame` when no complete
    /// frame is waiting.
    pub fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let Some(info) = self.receive_frame() else {
            return Err(IoError::IncompleteFrame.into());
        };

        if buffer.len() < info.length {
            self.flush_rx_frame();
            return Err(IoError::BufferTooSmall.into());
        }

        let len = self.copy_frame(&info, buffer)?;
        self.release_frame(&info);
        Ok(len)
    }

    /// Discard the frame at the current RX position, if any.
    ///
    /// Recycles descriptors up to and including the frame's last descriptor
    /// (or the end of the software-owned run), then resumes the RX DMA.
    pub fn flush_rx_frame(&mut self) {
        if self.discard_current_run() {
            DmaRegs::resume_rx();
        }
    }

    fn discard_current_run(&mut self) -> bool {
        if self.rx_ring.current().is_owned() {
            return false;
        }

        for _ in 0..RX_BUFS {
            let desc = self.rx_ring.current();
            if desc.is_owned() {
                break;
            }
            let was_last = desc.is_last();
            desc.recycle();
            self.rx_ring.advance();
            if was_last {
                break;
            }
        }

        self.rx_dropped = self.rx_dropped.wrapping_add(1);
        true
    }
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> Default
    for DmaEngine<RX_BUFS, TX_BUFS, BUF_SIZE>
{
    fn default() -> Self {
        Self::new()
    }
}

// Safety: descriptor cells are volatile and the OWN protocol serializes
// access between driver and DMA.
unsafe impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> Sync
    for DmaEngine<RX_BUFS, TX_BUFS, BUF_SIZE>
{
}
unsafe impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> Send
    for DmaEngine<RX_BUFS, TX_BUFS, BUF_SIZE>
{
}

// =============================================================================
// Tests
// =============================================================================
