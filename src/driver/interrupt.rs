//! Decoded view of the DMA interrupt sources.
//!
//! [`InterruptStatus`] turns a raw DMASR word into named flags, and
//! back into the write-1-to-clear mask that acknowledges exactly the
//! sources that were observed.

use crate::internal::register::dma::{
    DMASR_AIS, DMASR_FBES, DMASR_NIS, DMASR_RBUS, DMASR_ROS, DMASR_RPSS, DMASR_RS, DMASR_TBUS,
    DMASR_TPSS, DMASR_TS, DMASR_TUS,
};

// =============================================================================
// Interrupt Status
// =============================================================================

/// One snapshot of the DMA status register, field per interrupt source.
///
/// ```ignore
/// let status = eth.handle_interrupt();
/// if status.rx_complete {
///     // frames are waiting in the ring
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptStatus {
    /// A frame finished transmitting
    pub tx_complete: bool,
    /// The TX DMA process stopped
    pub tx_stopped: bool,
    /// TX ran out of descriptors
    pub tx_buf_unavailable: bool,
    /// The TX FIFO underflowed mid-frame
    pub tx_underflow: bool,
    /// A frame finished arriving
    pub rx_complete: bool,
    /// The RX DMA process stopped
    pub rx_stopped: bool,
    /// RX ran out of descriptors
    pub rx_buf_unavailable: bool,
    /// The RX FIFO overflowed
    pub rx_overflow: bool,
    /// Unrecoverable bus fault; the affected engine needs a restart
    pub fatal_bus_error: bool,
    /// Normal interrupt summary (NIS)
    pub normal_summary: bool,
    /// Abnormal interrupt summary (AIS)
    pub abnormal_summary: bool,
}

impl InterruptStatus {
    /// Decode a raw DMASR value.
    #[inline]
    pub fn from_raw(status: u32) -> Self {
        let hit = |bit: u32| status & bit != 0;
        Self {
            tx_complete: hit(DMASR_TS),
            tx_stopped: hit(DMASR_TPSS),
            tx_buf_unavailable: hit(DMASR_TBUS),
            tx_underflow: hit(DMASR_TUS),
            rx_complete: hit(DMASR_RS),
            rx_stopped: hit(DMASR_RPSS),
            rx_buf_unavailable: hit(DMASR_RBUS),
            rx_overflow: hit(DMASR_ROS),
            fatal_bus_error: hit(DMASR_FBES),
            normal_summary: hit(DMASR_NIS),
            abnormal_summary: hit(DMASR_AIS),
        }
    }

    /// Rebuild the DMASR mask for the set flags; writing it back
    /// acknowledges those sources and no others.
    #[inline]
    pub fn to_raw(&self) -> u32 {
        let flags = [
            (self.tx_complete, DMASR_TS),
            (self.tx_stopped, DMASR_TPSS),
            (self.tx_buf_unavailable, DMASR_TBUS),
            (self.tx_underflow, DMASR_TUS),
            (self.rx_complete, DMASR_RS),
            (self.rx_stopped, DMASR_RPSS),
            (self.rx_buf_unavailable, DMASR_RBUS),
            (self.rx_overflow, DMASR_ROS),
            (self.fatal_bus_error, DMASR_FBES),
            (self.normal_summary, DMASR_NIS),
            (self.abnormal_summary, DMASR_AIS),
        ];
        flags
            .iter()
            .fold(0, |mask, &(set, bit)| if set { mask | bit } else { mask })
    }

    /// True when any concrete source fired. The two summary bits do not
    /// count; they only mirror the sources below them.
    #[inline]
    pub fn any(&self) -> bool {
        self.to_raw() & !(DMASR_NIS | DMASR_AIS) != 0
    }

    /// True when a FIFO fault or bus fault fired.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.tx_underflow || self.rx_overflow || self.fatal_bus_error
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EVERY_SOURCE: [u32; 11] = [
        DMASR_TS,
        DMASR_TPSS,
        DMASR_TBUS,
        DMASR_TUS,
        DMASR_RS,
        DMASR_RPSS,
        DMASR_RBUS,
        DMASR_ROS,
        DMASR_FBES,
        DMASR_NIS,
        DMASR_AIS,
    ];

    #[test]
    fn each_bit_lands_in_its_own_field() {
        assert!(InterruptStatus::from_raw(DMASR_TS).tx_complete);
        assert!(InterruptStatus::from_raw(DMASR_TPSS).tx_stopped);
        assert!(InterruptStatus::from_raw(DMASR_TBUS).tx_buf_unavailable);
        assert!(InterruptStatus::from_raw(DMASR_TUS).tx_underflow);
        assert!(InterruptStatus::from_raw(DMASR_RS).rx_complete);
        assert!(InterruptStatus::from_raw(DMASR_RPSS).rx_stopped);
        assert!(InterruptStatus::from_raw(DMASR_RBUS).rx_buf_unavailable);
        assert!(InterruptStatus::from_raw(DMASR_ROS).rx_overflow);
        assert!(InterruptStatus::from_raw(DMASR_FBES).fatal_bus_error);
        assert!(InterruptStatus::from_raw(DMASR_NIS).normal_summary);
        assert!(InterruptStatus::from_raw(DMASR_AIS).abnormal_summary);
    }

    #[test]
    fn acknowledge_mask_matches_what_was_decoded() {
        // the clear path writes to_raw() back to DMASR, so it must
        // reproduce exactly the decoded bits
        for bit in EVERY_SOURCE {
            assert_eq!(InterruptStatus::from_raw(bit).to_raw(), bit);
        }

        let word = EVERY_SOURCE.iter().fold(0, |acc, &b| acc | b);
        assert_eq!(InterruptStatus::from_raw(word).to_raw(), word);
    }

    #[test]
    fn decode_ignores_unrelated_bits() {
        // process-state fields share the register but are not sources
        let status = InterruptStatus::from_raw(0x7 << 17 | 0x7 << 20);
        assert!(!status.any());
        assert_eq!(status.to_raw(), 0);
    }

    #[test]
    fn summaries_alone_do_not_count_as_activity() {
        let summaries = InterruptStatus::from_raw(DMASR_NIS | DMASR_AIS);
        assert!(!summaries.any());

        let with_event = InterruptStatus::from_raw(DMASR_NIS | DMASR_TS);
        assert!(with_event.any());
    }

    #[test]
    fn fifo_and_bus_faults_classify_as_errors() {
        for bit in [DMASR_TUS, DMASR_ROS, DMASR_FBES] {
            let status = InterruptStatus::from_raw(bit);
            assert!(status.has_error());
            assert!(status.any());
        }

        let normal = InterruptStatus::from_raw(DMASR_TS | DMASR_RS | DMASR_NIS);
        assert!(!normal.has_error());
    }

    #[test]
    fn default_snapshot_is_empty() {
        let status = InterruptStatus::default();

        assert!(!status.any());
        assert!(!status.has_error());
        assert_eq!(status.to_raw(), 0);
    }
}
