//! Bit layouts for the normal (4-word) DMA descriptors.
//!
//! Word 0 carries status and the OWN bit, word 1 carries control and
//! buffer sizes; words 2 and 3 are plain addresses and need no
//! constants. See the Ethernet chapters of RM0090 and RM0385.

#![allow(dead_code)]

// =============================================================================
// RDES0 (RX Descriptor Word 0) - Status
// =============================================================================

/// RX Descriptor Word 0 bit field constants
pub mod rdes0 {
    /// TCP/UDP/ICMP payload checksum mismatch (offload engine enabled)
    pub const PAYLOAD_CSUM_ERR: u32 = 1 << 0;
    /// Frame arrived with a bad CRC
    pub const CRC_ERR: u32 = 1 << 1;
    /// Frame length was not a whole number of octets
    pub const DRIBBLE_ERR: u32 = 1 << 2;
    /// The PHY raised RX_ER while the frame was on the wire
    pub const RX_ERR: u32 = 1 << 3;
    /// Frame was cut short by the receive watchdog
    pub const RX_WATCHDOG: u32 = 1 << 4;
    /// Set for Ethernet-II frames (length/type above 0x600)
    pub const FRAME_TYPE: u32 = 1 << 5;
    /// Collision seen after the first 64 bytes
    pub const LATE_COLLISION: u32 = 1 << 6;
    /// IPv4 header checksum mismatch (offload engine enabled)
    pub const IP_HEADER_CSUM_ERR: u32 = 1 << 7;
    /// This descriptor holds the tail of the frame
    pub const LAST_DESC: u32 = 1 << 8;
    /// This descriptor holds the head of the frame
    pub const FIRST_DESC: u32 = 1 << 9;
    /// Frame carries a VLAN tag
    pub const VLAN_TAG: u32 = 1 << 10;
    /// RX FIFO overflowed into this frame
    pub const OVERFLOW_ERR: u32 = 1 << 11;
    /// Received length disagrees with the length/type field
    pub const LENGTH_ERR: u32 = 1 << 12;
    /// Source address rejected by the SA filter
    pub const SA_FILTER_FAIL: u32 = 1 << 13;
    /// Descriptor fault or bus error while writing the frame
    pub const DESC_ERR: u32 = 1 << 14;
    /// OR of the error bits, valid in the last descriptor
    pub const ERR_SUMMARY: u32 = 1 << 15;
    /// Frame length field shift (14 bits wide)
    pub const FRAME_LEN_SHIFT: u32 = 16;
    /// Frame length field mask
    pub const FRAME_LEN_MASK: u32 = 0x3FFF << 16;
    /// Destination address rejected by the DA filter
    pub const DA_FILTER_FAIL: u32 = 1 << 30;
    /// Set while the DMA owns the descriptor, clear once handed back
    pub const OWN: u32 = 1 << 31;

    /// Union of the receive error bits
    pub const ALL_ERRORS: u32 = CRC_ERR
        | DRIBBLE_ERR
        | RX_ERR
        | RX_WATCHDOG
        | LATE_COLLISION
        | OVERFLOW_ERR
        | LENGTH_ERR
        | DESC_ERR
        | PAYLOAD_CSUM_ERR
        | IP_HEADER_CSUM_ERR;
}

// =============================================================================
// RDES1 (RX Descriptor Word 1) - Control
// =============================================================================

/// RX Descriptor Word 1 bit field constants
pub mod rdes1 {
    /// Buffer 1 size mask (13 bits wide)
    pub const BUFFER1_SIZE_MASK: u32 = 0x1FFF;
    /// Buffer 1 size shift
    pub const BUFFER1_SIZE_SHIFT: u32 = 0;
    /// Word 3 points at the next descriptor instead of a second buffer
    pub const SECOND_ADDR_CHAINED: u32 = 1 << 14;
    /// Final descriptor; the DMA wraps to the list base after this one
    pub const RX_END_OF_RING: u32 = 1 << 15;
    /// Buffer 2 size mask (13 bits wide)
    pub const BUFFER2_SIZE_MASK: u32 = 0x1FFF << 16;
    /// Buffer 2 size shift
    pub const BUFFER2_SIZE_SHIFT: u32 = 16;
    /// Suppress the completion interrupt for this descriptor
    pub const DISABLE_IRQ: u32 = 1 << 31;
}

// =============================================================================
// TDES0 (TX Descriptor Word 0) - Status/Control
// =============================================================================

/// TX Descriptor Word 0 bit field constants
pub mod tdes0 {
    /// Transmission was deferred at least once
    pub const DEFERRED: u32 = 1 << 0;
    /// TX FIFO ran dry mid-frame
    pub const UNDERFLOW_ERR: u32 = 1 << 1;
    /// Deferred past 24288 bit times and abandoned
    pub const EXCESSIVE_DEFERRAL: u32 = 1 << 2;
    /// Collision count shift (4 bits wide)
    pub const COLLISION_COUNT_SHIFT: u32 = 3;
    /// Collision count mask
    pub const COLLISION_COUNT_MASK: u32 = 0xF << 3;
    /// Frame went out VLAN tagged
    pub const VLAN_FRAME: u32 = 1 << 7;
    /// Gave up after 16 collisions
    pub const EXCESSIVE_COLLISION: u32 = 1 << 8;
    /// Collision seen after the first 64 byte times
    pub const LATE_COLLISION: u32 = 1 << 9;
    /// Carrier sense never asserted
    pub const NO_CARRIER: u32 = 1 << 10;
    /// Carrier dropped mid-transmission
    pub const LOSS_OF_CARRIER: u32 = 1 << 11;
    /// Offload engine could not insert the payload checksum
    pub const IP_PAYLOAD_ERR: u32 = 1 << 12;
    /// Frame discarded by a software-requested flush
    pub const FRAME_FLUSHED: u32 = 1 << 13;
    /// Transmission ran past the jabber limit
    pub const JABBER_TIMEOUT: u32 = 1 << 14;
    /// OR of the error bits
    pub const ERR_SUMMARY: u32 = 1 << 15;
    /// Offload engine could not insert the IP header checksum
    pub const IP_HEADER_ERR: u32 = 1 << 16;
    /// A transmit timestamp was captured
    pub const TX_TIMESTAMP_STATUS: u32 = 1 << 17;
    /// Word 3 points at the next descriptor instead of a second buffer
    pub const SECOND_ADDR_CHAINED: u32 = 1 << 20;
    /// Final descriptor; the DMA wraps to the list base after this one
    pub const TX_END_OF_RING: u32 = 1 << 21;
    /// Checksum insertion control shift (2 bits wide)
    pub const CHECKSUM_INSERT_SHIFT: u32 = 22;
    /// Checksum insertion control mask
    pub const CHECKSUM_INSERT_MASK: u32 = 0x3 << 22;
    /// Capture a timestamp when this frame goes out
    pub const TX_TIMESTAMP_EN: u32 = 1 << 25;
    /// Do not pad short frames
    pub const DISABLE_PAD: u32 = 1 << 26;
    /// Do not append the FCS
    pub const DISABLE_CRC: u32 = 1 << 27;
    /// This descriptor holds the head of the frame
    pub const FIRST_SEGMENT: u32 = 1 << 28;
    /// This descriptor holds the tail of the frame
    pub const LAST_SEGMENT: u32 = 1 << 29;
    /// Raise the transmit interrupt once this frame completes
    pub const INTERRUPT_ON_COMPLETE: u32 = 1 << 30;
    /// Set while the DMA owns the descriptor, clear once handed back
    pub const OWN: u32 = 1 << 31;

    /// Union of the transmit error bits
    pub const ALL_ERRORS: u32 = UNDERFLOW_ERR
        | EXCESSIVE_DEFERRAL
        | EXCESSIVE_COLLISION
        | LATE_COLLISION
        | NO_CARRIER
        | LOSS_OF_CARRIER
        | JABBER_TIMEOUT
        | IP_PAYLOAD_ERR
        | IP_HEADER_ERR;
}

// =============================================================================
// TDES1 (TX Descriptor Word 1) - Buffer Sizes
// =============================================================================

/// TX Descriptor Word 1 bit field constants
pub mod tdes1 {
    /// Buffer 1 size mask (13 bits wide)
    pub const BUFFER1_SIZE_MASK: u32 = 0x1FFF;
    /// Buffer 1 size shift
    pub const BUFFER1_SIZE_SHIFT: u32 = 0;
    /// Buffer 2 size mask (13 bits wide)
    pub const BUFFER2_SIZE_MASK: u32 = 0x1FFF << 16;
    /// Buffer 2 size shift
    pub const BUFFER2_SIZE_SHIFT: u32 = 16;
}

// =============================================================================
// Checksum Insertion Modes
// =============================================================================

/// Encodings for the TDES0 checksum insertion field
pub mod checksum_mode {
    /// Hardware inserts nothing
    pub const DISABLED: u32 = 0;
    /// IP header checksum only
    pub const IP_ONLY: u32 = 1;
    /// Header plus payload checksum, pseudo-header left alone
    pub const IP_AND_PAYLOAD: u32 = 2;
    /// Header plus payload checksum including the pseudo-header
    pub const FULL: u32 = 3;
}
