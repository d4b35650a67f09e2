//! DMA Controller Register Definitions
//!
//! Offsets, bit layouts and a typed facade for the ETH DMA block: bus
//! mode, the poll-demand doorbells, descriptor list bases, status and
//! interrupt enables, and the missed-frame counters.

use super::{
    reg_bit_check_clear, reg_bit_ops, reg_ro, reg_rw,
    set_bits, write_reg, DMA_BASE,
};

// =============================================================================
// Register Offsets
// =============================================================================

/// Bus Mode Register offset
pub const DMABMR_OFFSET: usize = 0x00;
/// TX Poll Demand Register offset
pub const DMATPDR_OFFSET: usize = 0x04;
/// RX Poll Demand Register offset
pub const DMARPDR_OFFSET: usize = 0x08;
/// RX Descriptor List Address Register offset
pub const DMARDLAR_OFFSET: usize = 0x0C;
/// TX Descriptor List Address Register offset
pub const DMATDLAR_OFFSET: usize = 0x10;
/// Status Register offset
pub const DMASR_OFFSET: usize = 0x14;
/// Operation Mode Register offset
pub const DMAOMR_OFFSET: usize = 0x18;
/// Interrupt Enable Register offset
pub const DMAIER_OFFSET: usize = 0x1C;
/// Missed Frame and Buffer Overflow Counter Register offset
pub const DMAMFBOCR_OFFSET: usize = 0x20;
/// Receive Status Watchdog Timer Register offset
pub const DMARSWTR_OFFSET: usize = 0x24;
/// Current Host TX Descriptor Register offset (read-only)
pub const DMACHTDR_OFFSET: usize = 0x48;
/// Current Host RX Descriptor Register offset (read-only)
pub const DMACHRDR_OFFSET: usize = 0x4C;
/// Current Host TX Buffer Address Register offset (read-only)
pub const DMACHTBAR_OFFSET: usize = 0x50;
/// Current Host RX Buffer Address Register offset (read-only)
pub const DMACHRBAR_OFFSET: usize = 0x54;

// =============================================================================
// Bus Mode Register (DMABMR) Bits
// =============================================================================

/// Software Reset; resets MAC and DMA logic, cleared by hardware when done
pub const DMABMR_SR: u32 = 1 << 0;
/// DMA Arbitration: 0 = round-robin per RTPR, 1 = RX always wins
pub const DMABMR_DA: u32 = 1 << 1;
/// Descriptor Skip Length shift (words skipped between ring descriptors)
pub const DMABMR_DSL_SHIFT: u32 = 2;
/// Descriptor Skip Length mask
pub const DMABMR_DSL_MASK: u32 = 0x1F << 2;
/// Enhanced Descriptor Format (8-word descriptors for PTP/checksum status)
pub const DMABMR_EDFE: u32 = 1 << 7;
/// Programmable Burst Length shift (max beats per DMA transaction)
pub const DMABMR_PBL_SHIFT: u32 = 8;
/// Programmable Burst Length mask
pub const DMABMR_PBL_MASK: u32 = 0x3F << 8;
/// RX:TX Priority Ratio shift (only with DA = 0)
pub const DMABMR_RTPR_SHIFT: u32 = 14;
/// RX:TX Priority Ratio mask
pub const DMABMR_RTPR_MASK: u32 = 0x3 << 14;
/// Fixed Burst: only INCR4/8/16 and SINGLE on the bus
pub const DMABMR_FB: u32 = 1 << 16;
/// RX DMA Programmable Burst Length shift (only with USP set)
pub const DMABMR_RDP_SHIFT: u32 = 17;
/// RX DMA Programmable Burst Length mask
pub const DMABMR_RDP_MASK: u32 = 0x3F << 17;
/// Use Separate PBL: RDP drives RX bursts, PBL drives TX
pub const DMABMR_USP: u32 = 1 << 23;
/// 4xPBL Mode: PBL and RDP count in units of 4 beats
pub const DMABMR_FPM: u32 = 1 << 24;
/// Address-Aligned Beats
pub const DMABMR_AAB: u32 = 1 << 25;
/// Mixed Burst
pub const DMABMR_MB: u32 = 1 << 26;

/// RTPR field encodings (weight of RX in round-robin arbitration)
pub mod rtpr {
    /// 1:1 round-robin
    pub const RATIO_1_1: u32 = 0;
    /// 2:1 in favour of RX
    pub const RATIO_2_1: u32 = 1;
    /// 3:1 in favour of RX
    pub const RATIO_3_1: u32 = 2;
    /// 4:1 in favour of RX
    pub const RATIO_4_1: u32 = 3;
}

// =============================================================================
// Status Register (DMASR) Bits
// =============================================================================

/// Transmit Status; a frame finished transmitting
pub const DMASR_TS: u32 = 1 << 0;
/// Transmit Process Stopped
pub const DMASR_TPSS: u32 = 1 << 1;
/// Transmit Buffer Unavailable
pub const DMASR_TBUS: u32 = 1 << 2;
/// Transmit Jabber Timeout
pub const DMASR_TJTS: u32 = 1 << 3;
/// Receive Overflow
pub const DMASR_ROS: u32 = 1 << 4;
/// Transmit Underflow
pub const DMASR_TUS: u32 = 1 << 5;
/// Receive Status; a frame finished arriving
pub const DMASR_RS: u32 = 1 << 6;
/// Receive Buffer Unavailable
pub const DMASR_RBUS: u32 = 1 << 7;
/// Receive Process Stopped
pub const DMASR_RPSS: u32 = 1 << 8;
/// Receive Watchdog Timeout
pub const DMASR_RWTS: u32 = 1 << 9;
/// Early Transmit
pub const DMASR_ETS: u32 = 1 << 10;
/// Fatal Bus Error
pub const DMASR_FBES: u32 = 1 << 13;
/// Early Receive
pub const DMASR_ERS: u32 = 1 << 14;
/// Abnormal Interrupt Summary
pub const DMASR_AIS: u32 = 1 << 15;
/// Normal Interrupt Summary
pub const DMASR_NIS: u32 = 1 << 16;
/// Receive Process State shift
pub const DMASR_RPS_SHIFT: u32 = 17;
/// Receive Process State mask
pub const DMASR_RPS_MASK: u32 = 0x7 << 17;
/// Transmit Process State shift
pub const DMASR_TPS_SHIFT: u32 = 20;
/// Transmit Process State mask
pub const DMASR_TPS_MASK: u32 = 0x7 << 20;
/// Error Bits shift (which bus transaction faulted)
pub const DMASR_EBS_SHIFT: u32 = 23;
/// Error Bits mask
pub const DMASR_EBS_MASK: u32 = 0x7 << 23;

/// Every write-1-to-clear status bit at once
pub const DMASR_ALL_INTERRUPTS: u32 = DMASR_TS
    | DMASR_TPSS
    | DMASR_TBUS
    | DMASR_TJTS
    | DMASR_ROS
    | DMASR_TUS
    | DMASR_RS
    | DMASR_RBUS
    | DMASR_RPSS
    | DMASR_RWTS
    | DMASR_ETS
    | DMASR_FBES
    | DMASR_ERS
    | DMASR_AIS
    | DMASR_NIS;

// =============================================================================
// Operation Mode Register (DMAOMR) Bits
// =============================================================================

/// Start/Stop Receive
pub const DMAOMR_SR: u32 = 1 << 1;
/// Operate on Second Frame: fetch the next TX frame before the first
/// frame's status lands
pub const DMAOMR_OSF: u32 = 1 << 2;
/// Receive Threshold Control shift
pub const DMAOMR_RTC_SHIFT: u32 = 3;
/// Receive Threshold Control mask
pub const DMAOMR_RTC_MASK: u32 = 0x3 << 3;
/// Forward Undersized Good Frames
pub const DMAOMR_FUGF: u32 = 1 << 6;
/// Forward Error Frames
pub const DMAOMR_FEF: u32 = 1 << 7;
/// Start/Stop Transmission
pub const DMAOMR_ST: u32 = 1 << 13;
/// Transmit Threshold Control shift
pub const DMAOMR_TTC_SHIFT: u32 = 14;
/// Transmit Threshold Control mask
pub const DMAOMR_TTC_MASK: u32 = 0x7 << 14;
/// Flush Transmit FIFO; self-clearing
pub const DMAOMR_FTF: u32 = 1 << 20;
/// Transmit Store and Forward
pub const DMAOMR_TSF: u32 = 1 << 21;
/// Disable Flushing of Received Frames
pub const DMAOMR_DFRF: u32 = 1 << 24;
/// Receive Store and Forward
pub const DMAOMR_RSF: u32 = 1 << 25;
/// Don't drop frames the offload engine flagged as checksum-bad
pub const DMAOMR_DTCEFD: u32 = 1 << 26;

/// RTC cut-through thresholds (bytes in RX FIFO before transfer starts)
pub mod rtc {
    /// 64 bytes
    pub const RTC_64: u32 = 0;
    /// 32 bytes
    pub const RTC_32: u32 = 1;
    /// 96 bytes
    pub const RTC_96: u32 = 2;
    /// 128 bytes
    pub const RTC_128: u32 = 3;
}

/// TTC cut-through thresholds (bytes in TX FIFO before transmission)
pub mod ttc {
    /// 64 bytes
    pub const TTC_64: u32 = 0;
    /// 128 bytes
    pub const TTC_128: u32 = 1;
    /// 192 bytes
    pub const TTC_192: u32 = 2;
    /// 256 bytes
    pub const TTC_256: u32 = 3;
    /// 40 bytes
    pub const TTC_40: u32 = 4;
    /// 32 bytes
    pub const TTC_32: u32 = 5;
    /// 24 bytes
    pub const TTC_24: u32 = 6;
    /// 16 bytes
    pub const TTC_16: u32 = 7;
}

// =============================================================================
// Interrupt Enable Register (DMAIER) Bits
// =============================================================================

/// Transmit Interrupt Enable
pub const DMAIER_TIE: u32 = 1 << 0;
/// Transmit Process Stopped Interrupt Enable
pub const DMAIER_TPSIE: u32 = 1 << 1;
/// Transmit Buffer Unavailable Interrupt Enable
pub const DMAIER_TBUIE: u32 = 1 << 2;
/// Transmit Jabber Timeout Interrupt Enable
pub const DMAIER_TJTIE: u32 = 1 << 3;
/// Receive Overflow Interrupt Enable
pub const DMAIER_ROIE: u32 = 1 << 4;
/// Transmit Underflow Interrupt Enable
pub const DMAIER_TUIE: u32 = 1 << 5;
/// Receive Interrupt Enable
pub const DMAIER_RIE: u32 = 1 << 6;
/// Receive Buffer Unavailable Interrupt Enable
pub const DMAIER_RBUIE: u32 = 1 << 7;
/// Receive Process Stopped Interrupt Enable
pub const DMAIER_RPSIE: u32 = 1 << 8;
/// Receive Watchdog Timeout Interrupt Enable
pub const DMAIER_RWTIE: u32 = 1 << 9;
/// Early Transmit Interrupt Enable
pub const DMAIER_ETIE: u32 = 1 << 10;
/// Fatal Bus Error Interrupt Enable
pub const DMAIER_FBEIE: u32 = 1 << 13;
/// Early Receive Interrupt Enable
pub const DMAIER_ERIE: u32 = 1 << 14;
/// Abnormal Interrupt Summary Enable
pub const DMAIER_AISE: u32 = 1 << 15;
/// Normal Interrupt Summary Enable
pub const DMAIER_NISE: u32 = 1 << 16;

/// The working set of interrupts: completion both ways, fatal errors,
/// and the two summaries that gate everything else
pub const DMAIER_DEFAULT: u32 =
    DMAIER_TIE | DMAIER_RIE | DMAIER_FBEIE | DMAIER_AISE | DMAIER_NISE;

// =============================================================================
// Missed Frame and Buffer Overflow Counter (DMAMFBOCR) Bits
// =============================================================================

/// Frames missed by the controller, bits 15:0
pub const DMAMFBOCR_MFC_MASK: u32 = 0xFFFF;
/// Controller-missed counter overflowed
pub const DMAMFBOCR_OMFC: u32 = 1 << 16;
/// Frames missed by the application shift, bits 27:17
pub const DMAMFBOCR_MFA_SHIFT: u32 = 17;
/// Frames missed by the application mask
pub const DMAMFBOCR_MFA_MASK: u32 = 0x7FF << 17;
/// Application-missed counter overflowed
pub const DMAMFBOCR_OFOC: u32 = 1 << 28;

// =============================================================================
// DMA Register Access Functions
// =============================================================================

/// DMA Register block for type-safe access
pub struct DmaRegs;

impl DmaRegs {
    /// Get the base address
    #[inline(always)]
    pub const fn base() -> usize {
        DMA_BASE
    }

    // -------------------------------------------------------------------------
    // Register accessors (generated by macros)
    // -------------------------------------------------------------------------

    reg_rw!(bus_mode, set_bus_mode, DMA_BASE, DMABMR_OFFSET, "Bus Mode register");
    reg_rw!(status, set_status, DMA_BASE, DMASR_OFFSET, "Status register");
    reg_rw!(operation_mode, set_operation_mode, DMA_BASE, DMAOMR_OFFSET, "Operation Mode register");
    reg_rw!(interrupt_enable, set_interrupt_enable, DMA_BASE, DMAIER_OFFSET, "Interrupt Enable register");

    reg_ro!(missed_frames, DMA_BASE, DMAMFBOCR_OFFSET, "Missed Frame counter");
    reg_ro!(current_tx_desc, DMA_BASE, DMACHTDR_OFFSET, "Current TX Descriptor address");
    reg_ro!(current_rx_desc, DMA_BASE, DMACHRDR_OFFSET, "Current RX Descriptor address");
    reg_ro!(current_tx_buffer, DMA_BASE, DMACHTBAR_OFFSET, "Current TX Buffer address");
    reg_ro!(current_rx_buffer, DMA_BASE, DMACHRBAR_OFFSET, "Current RX Buffer address");

    // -------------------------------------------------------------------------
    // Bit operations (generated by macros)
    // -------------------------------------------------------------------------

    reg_bit_ops!(start_tx, stop_tx, DMA_BASE, DMAOMR_OFFSET, DMAOMR_ST, "TX DMA", "Start", "Stop");
    reg_bit_ops!(start_rx, stop_rx, DMA_BASE, DMAOMR_OFFSET, DMAOMR_SR, "RX DMA", "Start", "Stop");

    reg_bit_check_clear!(is_tx_fifo_flush_complete, DMA_BASE, DMAOMR_OFFSET, DMAOMR_FTF,
                         "Check if TX FIFO flush is complete");
    reg_bit_check_clear!(is_reset_complete, DMA_BASE, DMABMR_OFFSET, DMABMR_SR,
                         "Check if software reset is complete");

    // -------------------------------------------------------------------------
    // Doorbells and suspended-state recovery
    // -------------------------------------------------------------------------

    /// Ring the TX doorbell; any write wakes a polling TX DMA
    #[inline(always)]
    pub fn tx_poll_demand() {
        unsafe { write_reg(DMA_BASE + DMATPDR_OFFSET, 0) }
    }

    /// Ring the RX doorbell
    #[inline(always)]
    pub fn rx_poll_demand() {
        unsafe { write_reg(DMA_BASE + DMARPDR_OFFSET, 0) }
    }

    /// Bring a TX DMA out of suspend: acknowledge the buffer-unavailable
    /// status, then ring the doorbell
    #[inline(always)]
    pub fn resume_tx() {
        Self::set_status(DMASR_TBUS);
        Self::tx_poll_demand();
    }

    /// Bring an RX DMA out of suspend, same two steps as [`Self::resume_tx`]
    #[inline(always)]
    pub fn resume_rx() {
        Self::set_status(DMASR_RBUS);
        Self::rx_poll_demand();
    }

    // -------------------------------------------------------------------------
    // One-shot operations
    // -------------------------------------------------------------------------

    /// Program the RX descriptor list base
    #[inline(always)]
    pub fn set_rx_desc_list_addr(addr: u32) {
        unsafe { write_reg(DMA_BASE + DMARDLAR_OFFSET, addr) }
    }

    /// Program the TX descriptor list base
    #[inline(always)]
    pub fn set_tx_desc_list_addr(addr: u32) {
        unsafe { write_reg(DMA_BASE + DMATDLAR_OFFSET, addr) }
    }

    /// Acknowledge every pending status bit
    #[inline(always)]
    pub fn clear_all_interrupts() {
        Self::set_status(DMASR_ALL_INTERRUPTS);
    }

    /// Request a TX FIFO flush; FTF self-clears when the flush finishes
    #[inline(always)]
    pub fn flush_tx_fifo() {
        unsafe { set_bits(DMA_BASE + DMAOMR_OFFSET, DMAOMR_FTF) }
    }

    /// Enable [`DMAIER_DEFAULT`]
    #[inline(always)]
    pub fn enable_default_interrupts() {
        Self::set_interrupt_enable(DMAIER_DEFAULT);
    }

    /// Mask every DMA interrupt
    #[inline(always)]
    pub fn disable_all_interrupts() {
        Self::set_interrupt_enable(0);
    }

    /// Program the receive status watchdog
    #[inline(always)]
    pub fn set_rx_watchdog(value: u8) {
        unsafe { write_reg(DMA_BASE + DMARSWTR_OFFSET, value as u32) }
    }

    /// Kick off the software reset; poll [`Self::is_reset_complete`]
    #[inline(always)]
    pub fn software_reset() {
        Self::set_bus_mode(DMABMR_SR);
    }

    /// Read and clear the missed-frame counters.
    ///
    /// DMAMFBOCR clears on read, hence "take". Returns frames missed by
    /// the controller and by the application, in that order.
    #[inline(always)]
    pub fn take_missed_frame_counts() -> (u16, u16) {
        let raw = Self::missed_frames();
        (
            (raw & DMAMFBOCR_MFC_MASK) as u16,
            ((raw & DMAMFBOCR_MFA_MASK) >> DMAMFBOCR_MFA_SHIFT) as u16,
        )
    }
}

/// RPS field decode: where the receive engine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RxProcessState {
    /// Reset, or a stop-receive command took effect
    Stopped = 0,
    /// Fetching a descriptor
    FetchingDescriptor = 1,
    /// Reserved encoding
    Reserved2 = 2,
    /// Waiting for a packet
    WaitingForPacket = 3,
    /// Suspended, no descriptor available
    Suspended = 4,
    /// Closing a descriptor
    ClosingDescriptor = 5,
    /// Reserved encoding
    Reserved6 = 6,
    /// Transferring data to memory
    TransferringData = 7,
}

impl RxProcessState {
    const fn decode(field: u32) -> Self {
        match field {
            0 => Self::Stopped,
            1 => Self::FetchingDescriptor,
            2 => Self::Reserved2,
            3 => Self::WaitingForPacket,
            4 => Self::Suspended,
            5 => Self::ClosingDescriptor,
            6 => Self::Reserved6,
            _ => Self::TransferringData,
        }
    }
}

impl From<u32> for RxProcessState {
    /// Decode from a raw DMASR value
    fn from(value: u32) -> Self {
        Self::decode((value & DMASR_RPS_MASK) >> DMASR_RPS_SHIFT)
    }
}

/// TPS field decode: where the transmit engine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TxProcessState {
    /// Reset, or a stop-transmit command took effect
    Stopped = 0,
    /// Fetching a descriptor
    FetchingDescriptor = 1,
    /// Waiting for status
    WaitingForStatus = 2,
    /// Reading data from memory
    ReadingData = 3,
    /// Reserved encoding
    Reserved4 = 4,
    /// Reserved encoding
    Reserved5 = 5,
    /// Suspended, no descriptor available
    Suspended = 6,
    /// Closing a descriptor
    ClosingDescriptor = 7,
}

impl TxProcessState {
    const fn decode(field: u32) -> Self {
        match field {
            0 => Self::Stopped,
            1 => Self::FetchingDescriptor,
            2 => Self::WaitingForStatus,
            3 => Self::ReadingData,
            4 => Self::Reserved4,
            5 => Self::Reserved5,
            6 => Self::Suspended,
            _ => Self::ClosingDescriptor,
        }
    }
}

impl From<u32> for TxProcessState {
    /// Decode from a raw DMASR value
    fn from(value: u32) -> Self {
        Self::decode((value & DMASR_TPS_MASK) >> DMASR_TPS_SHIFT)
    }
}
