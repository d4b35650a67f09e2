//! MAC Core Register Definitions
//!
//! Offsets, bit layouts and a typed facade for the ETH MAC block: frame
//! filtering, station/filter addresses, the MII management port, flow
//! control and the debug register.

use super::{
    clear_bits, read_reg, reg_bit_ops, reg_ro, reg_rw, set_bits, write_reg, MAC_BASE,
};

// =============================================================================
// Register Offsets
// =============================================================================

/// MAC Configuration Register offset
pub const MACCR_OFFSET: usize = 0x00;
/// MAC Frame Filter Register offset
pub const MACFFR_OFFSET: usize = 0x04;
/// MAC Hash Table High Register offset
pub const MACHTHR_OFFSET: usize = 0x08;
/// MAC Hash Table Low Register offset
pub const MACHTLR_OFFSET: usize = 0x0C;
/// MAC MII Address Register offset
pub const MACMIIAR_OFFSET: usize = 0x10;
/// MAC MII Data Register offset
pub const MACMIIDR_OFFSET: usize = 0x14;
/// MAC Flow Control Register offset
pub const MACFCR_OFFSET: usize = 0x18;
/// MAC VLAN Tag Register offset
pub const MACVLANTR_OFFSET: usize = 0x1C;
/// MAC PMT Control and Status Register offset
pub const MACPMTCSR_OFFSET: usize = 0x2C;
/// MAC Debug Register offset (read-only)
pub const MACDBGR_OFFSET: usize = 0x34;
/// MAC Interrupt Status Register offset
pub const MACSR_OFFSET: usize = 0x38;
/// MAC Interrupt Mask Register offset
pub const MACIMR_OFFSET: usize = 0x3C;
/// MAC Address 0 High Register offset (upper 16 bits of the station address)
pub const MACA0HR_OFFSET: usize = 0x40;
/// MAC Address 0 Low Register offset (lower 32 bits of the station address)
pub const MACA0LR_OFFSET: usize = 0x44;
/// MAC Address 1 High Register offset (filter slot 1)
pub const MACA1HR_OFFSET: usize = 0x48;
/// MAC Address 1 Low Register offset
pub const MACA1LR_OFFSET: usize = 0x4C;
/// MAC Address 2 High Register offset (filter slot 2)
pub const MACA2HR_OFFSET: usize = 0x50;
/// MAC Address 2 Low Register offset
pub const MACA2LR_OFFSET: usize = 0x54;
/// MAC Address 3 High Register offset (filter slot 3)
pub const MACA3HR_OFFSET: usize = 0x58;
/// MAC Address 3 Low Register offset
pub const MACA3LR_OFFSET: usize = 0x5C;

/// Perfect-filter slots beyond the station address (MACA1..MACA3)
pub const MAC_ADDR_FILTER_COUNT: usize = 3;

// =============================================================================
// MAC Address High Register Bits (filter slots 1-3)
// =============================================================================

/// Address Enable; the slot participates in filtering while set
pub const MACAHR_AE: u32 = 1 << 31;
/// Compare against the source address instead of the destination
pub const MACAHR_SA: u32 = 1 << 30;
/// Mask Byte Control shift (bits 29:24)
pub const MACAHR_MBC_SHIFT: u32 = 24;
/// Mask Byte Control; each set bit excludes one address byte from the compare
pub const MACAHR_MBC_MASK: u32 = 0x3F << 24;

// =============================================================================
// MAC Configuration Register (MACCR) Bits
// =============================================================================

/// Receiver Enable
pub const MACCR_RE: u32 = 1 << 2;
/// Transmitter Enable
pub const MACCR_TE: u32 = 1 << 3;
/// Deferral Check (half-duplex only)
pub const MACCR_DC: u32 = 1 << 4;
/// Back-Off Limit shift
pub const MACCR_BL_SHIFT: u32 = 5;
/// Back-Off Limit mask (2 bits)
pub const MACCR_BL_MASK: u32 = 0x3 << 5;
/// Automatic Pad/CRC Stripping
pub const MACCR_APCS: u32 = 1 << 7;
/// Retry Disable
pub const MACCR_RD: u32 = 1 << 9;
/// IPv4 Checksum Offload
pub const MACCR_IPCO: u32 = 1 << 10;
/// Duplex Mode: 0 = half, 1 = full
pub const MACCR_DM: u32 = 1 << 11;
/// Loopback Mode
pub const MACCR_LM: u32 = 1 << 12;
/// Receive Own Disable (half-duplex only)
pub const MACCR_ROD: u32 = 1 << 13;
/// Fast Ethernet Speed: 0 = 10 Mbps, 1 = 100 Mbps
pub const MACCR_FES: u32 = 1 << 14;
/// Carrier Sense Disable
pub const MACCR_CSD: u32 = 1 << 16;
/// Inter-Frame Gap shift
pub const MACCR_IFG_SHIFT: u32 = 17;
/// Inter-Frame Gap mask (3 bits)
pub const MACCR_IFG_MASK: u32 = 0x7 << 17;
/// Jabber Disable
pub const MACCR_JD: u32 = 1 << 22;
/// Watchdog Disable
pub const MACCR_WD: u32 = 1 << 23;
/// CRC Stripping for Type Frames
pub const MACCR_CSTF: u32 = 1 << 25;

/// IFG field encodings, in bit times
pub mod ifg {
    /// 96 bit times (reset value)
    pub const IFG_96: u32 = 0;
    /// 88 bit times
    pub const IFG_88: u32 = 1;
    /// 80 bit times
    pub const IFG_80: u32 = 2;
    /// 72 bit times
    pub const IFG_72: u32 = 3;
    /// 64 bit times
    pub const IFG_64: u32 = 4;
    /// 56 bit times
    pub const IFG_56: u32 = 5;
    /// 48 bit times
    pub const IFG_48: u32 = 6;
    /// 40 bit times (shortest legal gap)
    pub const IFG_40: u32 = 7;
}

// =============================================================================
// MAC Frame Filter Register (MACFFR) Bits
// =============================================================================

/// Promiscuous Mode
pub const MACFFR_PM: u32 = 1 << 0;
/// Hash Unicast
pub const MACFFR_HU: u32 = 1 << 1;
/// Hash Multicast
pub const MACFFR_HM: u32 = 1 << 2;
/// DA Inverse Filtering
pub const MACFFR_DAIF: u32 = 1 << 3;
/// Pass All Multicast
pub const MACFFR_PAM: u32 = 1 << 4;
/// Broadcast Frames Disable
pub const MACFFR_BFD: u32 = 1 << 5;
/// Pass Control Frames shift
pub const MACFFR_PCF_SHIFT: u32 = 6;
/// Pass Control Frames mask
pub const MACFFR_PCF_MASK: u32 = 0x3 << 6;
/// SA Inverse Filtering
pub const MACFFR_SAIF: u32 = 1 << 8;
/// Source Address Filter Enable
pub const MACFFR_SAF: u32 = 1 << 9;
/// Hash or Perfect Filter
pub const MACFFR_HPF: u32 = 1 << 10;
/// Receive All
pub const MACFFR_RA: u32 = 1 << 31;

/// PCF field encodings for control-frame forwarding
pub mod pcf {
    /// Drop every control frame
    pub const NONE: u32 = 0;
    /// Forward all control frames except PAUSE
    pub const ALL_EXCEPT_PAUSE: u32 = 1;
    /// Forward all control frames
    pub const ALL: u32 = 2;
    /// Forward control frames that pass the address filter
    pub const FILTERED: u32 = 3;
}

// =============================================================================
// MAC VLAN Tag Register (MACVLANTR) Bits
// =============================================================================

/// VLAN Tag Identifier field (bits 15:0)
pub const MACVLANTR_VLANTI_MASK: u32 = 0xFFFF;
/// 12-bit comparison: match only the VID, ignoring priority and CFI.
/// Clear to compare the full 16-bit tag.
pub const MACVLANTR_VLANTC: u32 = 1 << 16;

// =============================================================================
// MAC MII Address Register (MACMIIAR) Bits
// =============================================================================

/// MII Busy
pub const MACMIIAR_MB: u32 = 1 << 0;
/// MII Write
pub const MACMIIAR_MW: u32 = 1 << 1;
/// Clock Range shift
pub const MACMIIAR_CR_SHIFT: u32 = 2;
/// Clock Range mask (3 bits)
pub const MACMIIAR_CR_MASK: u32 = 0x7 << 2;
/// MII Register Address shift
pub const MACMIIAR_MR_SHIFT: u32 = 6;
/// MII Register Address mask (5 bits)
pub const MACMIIAR_MR_MASK: u32 = 0x1F << 6;
/// PHY Address shift
pub const MACMIIAR_PA_SHIFT: u32 = 11;
/// PHY Address mask (5 bits)
pub const MACMIIAR_PA_MASK: u32 = 0x1F << 11;

/// CR field encodings for the MDC divider
pub mod csr_clock {
    /// HCLK / 42 (HCLK 60-100 MHz)
    pub const DIV_42: u32 = 0;
    /// HCLK / 62 (HCLK 100-150 MHz)
    pub const DIV_62: u32 = 1;
    /// HCLK / 16 (HCLK 20-35 MHz)
    pub const DIV_16: u32 = 2;
    /// HCLK / 26 (HCLK 35-60 MHz)
    pub const DIV_26: u32 = 3;
    /// HCLK / 102 (HCLK 150 MHz and above)
    pub const DIV_102: u32 = 4;
}

// =============================================================================
// MAC Flow Control Register (MACFCR) Bits
// =============================================================================

/// Flow Control Busy (full duplex) / Backpressure Activate (half duplex)
pub const MACFCR_FCB_BPA: u32 = 1 << 0;
/// Transmit Flow Control Enable
pub const MACFCR_TFCE: u32 = 1 << 1;
/// Receive Flow Control Enable
pub const MACFCR_RFCE: u32 = 1 << 2;
/// Unicast PAUSE Frame Detect
pub const MACFCR_UPFD: u32 = 1 << 3;
/// PAUSE Low Threshold shift
pub const MACFCR_PLT_SHIFT: u32 = 4;
/// PAUSE Low Threshold mask
pub const MACFCR_PLT_MASK: u32 = 0x3 << 4;
/// Zero-Quanta PAUSE Disable
pub const MACFCR_ZQPD: u32 = 1 << 7;
/// PAUSE Time shift
pub const MACFCR_PT_SHIFT: u32 = 16;
/// PAUSE Time mask
pub const MACFCR_PT_MASK: u32 = 0xFFFF << 16;

// =============================================================================
// MAC Debug Register (MACDBGR) Bits (Read-Only)
// =============================================================================

/// MAC MII receive protocol engine active
pub const MACDBGR_MMRPEA: u32 = 1 << 0;
/// RX FIFO write controller active
pub const MACDBGR_RFWRA: u32 = 1 << 4;
/// RX FIFO read controller status shift
pub const MACDBGR_RFRCS_SHIFT: u32 = 5;
/// RX FIFO read controller status mask
pub const MACDBGR_RFRCS_MASK: u32 = 0x3 << 5;
/// RX FIFO fill level shift
pub const MACDBGR_RFFL_SHIFT: u32 = 8;
/// RX FIFO fill level mask
pub const MACDBGR_RFFL_MASK: u32 = 0x3 << 8;
/// MAC MII transmit engine active
pub const MACDBGR_MMTEA: u32 = 1 << 16;
/// MAC transmit frame controller status shift
pub const MACDBGR_MTFCS_SHIFT: u32 = 17;
/// MAC transmit frame controller status mask
pub const MACDBGR_MTFCS_MASK: u32 = 0x3 << 17;
/// MAC transmitter in PAUSE
pub const MACDBGR_MTP: u32 = 1 << 19;
/// TX FIFO read status shift
pub const MACDBGR_TFRS_SHIFT: u32 = 20;
/// TX FIFO read status mask
pub const MACDBGR_TFRS_MASK: u32 = 0x3 << 20;
/// TX FIFO write active
pub const MACDBGR_TFWA: u32 = 1 << 22;
/// TX FIFO not empty
pub const MACDBGR_TFNE: u32 = 1 << 24;
/// TX FIFO full
pub const MACDBGR_TFF: u32 = 1 << 25;

// =============================================================================
// Packing Helpers
// =============================================================================

/// Little-endian pack of the first four address bytes for a MACAxLR register.
const fn addr_low_word(addr: &[u8; 6]) -> u32 {
    u32::from_le_bytes([addr[0], addr[1], addr[2], addr[3]])
}

/// The last two address bytes for the low half of a MACAxHR register.
const fn addr_high_word(addr: &[u8; 6]) -> u32 {
    (addr[4] as u32) | ((addr[5] as u32) << 8)
}

/// Recover the six address bytes from a high/low register pair.
const fn unpack_addr(high: u32, low: u32) -> [u8; 6] {
    let l = low.to_le_bytes();
    [l[0], l[1], l[2], l[3], (high & 0xFF) as u8, ((high >> 8) & 0xFF) as u8]
}

// =============================================================================
// MAC Register Access Functions
// =============================================================================

/// MAC Register block for type-safe access
pub struct MacRegs;

impl MacRegs {
    /// Get the base address
    #[inline(always)]
    pub const fn base() -> usize {
        MAC_BASE
    }

    // -------------------------------------------------------------------------
    // Register accessors (generated by macros)
    // -------------------------------------------------------------------------

    reg_rw!(config, set_config, MAC_BASE, MACCR_OFFSET, "MAC Configuration register");
    reg_rw!(frame_filter, set_frame_filter, MAC_BASE, MACFFR_OFFSET, "Frame Filter register");
    reg_rw!(hash_table_high, set_hash_table_high, MAC_BASE, MACHTHR_OFFSET, "Hash Table High register");
    reg_rw!(hash_table_low, set_hash_table_low, MAC_BASE, MACHTLR_OFFSET, "Hash Table Low register");
    reg_rw!(mii_address, set_mii_address, MAC_BASE, MACMIIAR_OFFSET, "MII Address register");
    reg_rw!(mii_data, set_mii_data, MAC_BASE, MACMIIDR_OFFSET, "MII Data register");
    reg_rw!(flow_control, set_flow_control, MAC_BASE, MACFCR_OFFSET, "Flow Control register");
    reg_rw!(vlan_tag, set_vlan_tag, MAC_BASE, MACVLANTR_OFFSET, "VLAN Tag register");
    reg_rw!(interrupt_mask, set_interrupt_mask, MAC_BASE, MACIMR_OFFSET, "Interrupt Mask register");
    reg_rw!(mac_addr0_high, set_mac_addr0_high, MAC_BASE, MACA0HR_OFFSET, "MAC Address 0 High register");
    reg_rw!(mac_addr0_low, set_mac_addr0_low, MAC_BASE, MACA0LR_OFFSET, "MAC Address 0 Low register");

    reg_ro!(debug, MAC_BASE, MACDBGR_OFFSET, "Debug register");
    reg_ro!(interrupt_status, MAC_BASE, MACSR_OFFSET, "Interrupt Status register");

    // -------------------------------------------------------------------------
    // Bit operations (generated by macros)
    // -------------------------------------------------------------------------

    reg_bit_ops!(enable_tx, disable_tx, MAC_BASE, MACCR_OFFSET, MACCR_TE, "transmitter", "Enable", "Disable");
    reg_bit_ops!(enable_rx, disable_rx, MAC_BASE, MACCR_OFFSET, MACCR_RE, "receiver", "Enable", "Disable");

    // -------------------------------------------------------------------------
    // Conditional bit helpers
    // -------------------------------------------------------------------------

    /// Set or clear one bit of a MAC-block register.
    #[inline(always)]
    fn write_flag(offset: usize, bit: u32, on: bool) {
        unsafe {
            if on {
                set_bits(MAC_BASE + offset, bit);
            } else {
                clear_bits(MAC_BASE + offset, bit);
            }
        }
    }

    /// Select full (true) or half (false) duplex
    #[inline(always)]
    pub fn set_duplex_full(full: bool) {
        Self::write_flag(MACCR_OFFSET, MACCR_DM, full);
    }

    /// Select 100 Mbps (true) or 10 Mbps (false)
    #[inline(always)]
    pub fn set_speed_100mbps(is_100: bool) {
        Self::write_flag(MACCR_OFFSET, MACCR_FES, is_100);
    }

    /// Toggle IPv4 receive checksum offload
    #[inline(always)]
    pub fn set_checksum_offload(enable: bool) {
        Self::write_flag(MACCR_OFFSET, MACCR_IPCO, enable);
    }

    /// Toggle promiscuous reception
    #[inline(always)]
    pub fn set_promiscuous(enable: bool) {
        Self::write_flag(MACFFR_OFFSET, MACFFR_PM, enable);
    }

    /// Toggle unconditional multicast reception
    #[inline(always)]
    pub fn set_pass_all_multicast(enable: bool) {
        Self::write_flag(MACFFR_OFFSET, MACFFR_PAM, enable);
    }

    /// Toggle hash filtering of unicast destinations
    pub fn enable_hash_unicast(enable: bool) {
        Self::write_flag(MACFFR_OFFSET, MACFFR_HU, enable);
    }

    /// Toggle hash filtering of multicast destinations.
    ///
    /// Subscribing to specific groups through the hash table receives less
    /// traffic than PAM, at the cost of hash false positives.
    pub fn enable_hash_multicast(enable: bool) {
        Self::write_flag(MACFFR_OFFSET, MACFFR_HM, enable);
    }

    /// Toggle HPF: perfect-only unicast with hashed multicast when set,
    /// hash-or-perfect for both when clear.
    pub fn set_hash_perfect_filter(enable: bool) {
        Self::write_flag(MACFFR_OFFSET, MACFFR_HPF, enable);
    }

    // -------------------------------------------------------------------------
    // Hash table operations
    // -------------------------------------------------------------------------

    /// Read the 64-bit hash table
    #[inline(always)]
    pub fn hash_table() -> u64 {
        ((Self::hash_table_high() as u64) << 32) | Self::hash_table_low() as u64
    }

    /// Write the 64-bit hash table
    #[inline(always)]
    pub fn set_hash_table(value: u64) {
        Self::set_hash_table_low(value as u32);
        Self::set_hash_table_high((value >> 32) as u32);
    }

    /// Zero the hash table
    #[inline(always)]
    pub fn clear_hash_table() {
        Self::set_hash_table(0);
    }

    /// Hash a destination address to its table index (0-63).
    ///
    /// The index is derived from the Ethernet CRC-32 of the six address
    /// bytes, computed LSB-first with the reflected polynomial, matching
    /// the serial CRC the receive engine accumulates.
    pub fn compute_hash_index(addr: &[u8; 6]) -> u8 {
        const CRC32_POLY: u32 = 0xEDB8_8320;

        let mut crc = u32::MAX;
        for &byte in addr {
            crc ^= byte as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ CRC32_POLY
                } else {
                    crc >> 1
                };
            }
        }
        (crc & 0x3F) as u8
    }

    /// Which half of the table an index lands in, and its bit within it.
    #[inline(always)]
    const fn hash_slot(index: u8) -> (bool, u32) {
        let index = (index & 0x3F) as u32;
        (index >= 32, 1 << (index % 32))
    }

    /// Set one hash-table bit
    pub fn set_hash_bit(index: u8) {
        match Self::hash_slot(index) {
            (true, bit) => Self::set_hash_table_high(Self::hash_table_high() | bit),
            (false, bit) => Self::set_hash_table_low(Self::hash_table_low() | bit),
        }
    }

    /// Clear one hash-table bit
    pub fn clear_hash_bit(index: u8) {
        match Self::hash_slot(index) {
            (true, bit) => Self::set_hash_table_high(Self::hash_table_high() & !bit),
            (false, bit) => Self::set_hash_table_low(Self::hash_table_low() & !bit),
        }
    }

    /// Test one hash-table bit
    pub fn is_hash_bit_set(index: u8) -> bool {
        match Self::hash_slot(index) {
            (true, bit) => Self::hash_table_high() & bit != 0,
            (false, bit) => Self::hash_table_low() & bit != 0,
        }
    }

    // =========================================================================
    // VLAN Tag Filtering
    // =========================================================================

    /// Program the VLAN tag comparison.
    ///
    /// With `vid_only` the comparison covers the 12-bit VID; otherwise the
    /// full 16-bit tag (priority + CFI + VID) must match.
    pub fn configure_vlan_filter(vid: u16, vid_only: bool) {
        let mut vlan = (vid as u32) & MACVLANTR_VLANTI_MASK;
        if vid_only {
            vlan |= MACVLANTR_VLANTC;
        }
        Self::set_vlan_tag(vlan);
    }

    /// Match frames carrying one VID (12-bit comparison)
    pub fn set_vlan_id_filter(vid: u16) {
        Self::configure_vlan_filter(vid & 0x0FFF, true);
    }

    /// The VID currently programmed into the tag register
    pub fn get_vlan_id_filter() -> u16 {
        (Self::vlan_tag() & 0x0FFF) as u16
    }

    /// Reset the tag comparison to the match-all zero tag
    pub fn clear_vlan_filter() {
        Self::set_vlan_tag(0);
    }

    // =========================================================================
    // MII / MDIO Interface
    // =========================================================================

    /// Whether an MII transaction is still in flight
    #[inline(always)]
    pub fn is_mii_busy() -> bool {
        Self::mii_address() & MACMIIAR_MB != 0
    }

    // =========================================================================
    // Flow Control
    // =========================================================================

    /// Toggle PAUSE frame generation
    #[inline(always)]
    pub fn enable_tx_flow_control(enable: bool) {
        Self::write_flag(MACFCR_OFFSET, MACFCR_TFCE, enable);
    }

    /// Toggle acting on received PAUSE frames
    #[inline(always)]
    pub fn enable_rx_flow_control(enable: bool) {
        Self::write_flag(MACFCR_OFFSET, MACFCR_RFCE, enable);
    }

    /// Program MACFCR in one shot.
    ///
    /// `pause_time` counts slot times (512 bit times); `plt` selects when a
    /// refresh PAUSE goes out; the three flags gate unicast PAUSE
    /// detection and the TX/RX halves of flow control.
    pub fn configure_flow_control(
        pause_time: u16,
        plt: u8,
        unicast_detect: bool,
        tx_enable: bool,
        rx_enable: bool,
    ) {
        let fc = ((pause_time as u32) << MACFCR_PT_SHIFT)
            | (((plt as u32) & 0x3) << MACFCR_PLT_SHIFT)
            | if unicast_detect { MACFCR_UPFD } else { 0 }
            | if tx_enable { MACFCR_TFCE } else { 0 }
            | if rx_enable { MACFCR_RFCE } else { 0 };

        unsafe { write_reg(MAC_BASE + MACFCR_OFFSET, fc) }
    }

    /// Start (true) or lift (false) a PAUSE request toward the peer.
    ///
    /// In full duplex FCB queues a PAUSE frame; in half duplex BPA asserts
    /// backpressure on the carrier instead.
    pub fn send_pause_frame(activate: bool) {
        Self::write_flag(MACFCR_OFFSET, MACFCR_FCB_BPA, activate);
    }

    /// Whether a previously requested PAUSE frame is still pending
    #[inline(always)]
    pub fn is_flow_control_busy() -> bool {
        Self::flow_control() & MACFCR_FCB_BPA != 0
    }

    // =========================================================================
    // Station Address and Perfect Filters
    // =========================================================================

    /// Program the station address (MACA0). The MO bit of the high word is
    /// always written as 1, as the manual requires.
    pub fn set_mac_address(addr: &[u8; 6]) {
        Self::set_mac_addr0_low(addr_low_word(addr));
        Self::set_mac_addr0_high(addr_high_word(addr) | (1 << 31));
    }

    /// Read the station address back out of MACA0
    pub fn get_mac_address() -> [u8; 6] {
        unpack_addr(Self::mac_addr0_high(), Self::mac_addr0_low())
    }

    /// High/low register offsets for a perfect-filter slot, or `None`
    /// outside 1..=3.
    #[inline(always)]
    const fn addr_filter_offsets(slot: usize) -> Option<(usize, usize)> {
        match slot {
            1 => Some((MACA1HR_OFFSET, MACA1LR_OFFSET)),
            2 => Some((MACA2HR_OFFSET, MACA2LR_OFFSET)),
            3 => Some((MACA3HR_OFFSET, MACA3LR_OFFSET)),
            _ => None,
        }
    }

    /// Program and enable a perfect-filter slot.
    ///
    /// `source_addr` matches the SA instead of the DA; each set `mask` bit
    /// excludes the corresponding address byte from the comparison.
    /// Returns `false` for a slot outside 1..=3.
    pub fn set_mac_filter(slot: usize, addr: &[u8; 6], source_addr: bool, mask: u8) -> bool {
        let Some((high_off, low_off)) = Self::addr_filter_offsets(slot) else {
            return false;
        };

        let high = addr_high_word(addr)
            | (((mask as u32) & 0x3F) << MACAHR_MBC_SHIFT)
            | if source_addr { MACAHR_SA } else { 0 }
            | MACAHR_AE;

        unsafe {
            write_reg(MAC_BASE + low_off, addr_low_word(addr));
            write_reg(MAC_BASE + high_off, high);
        }
        true
    }

    /// Disable a perfect-filter slot. Returns `false` for an invalid slot.
    pub fn clear_mac_filter(slot: usize) -> bool {
        let Some((high_off, low_off)) = Self::addr_filter_offsets(slot) else {
            return false;
        };

        unsafe {
            write_reg(MAC_BASE + low_off, 0);
            // AE clear takes the slot out of the comparison
            write_reg(MAC_BASE + high_off, 0);
        }
        true
    }

    /// Whether a slot participates in filtering; `None` for an invalid slot
    pub fn is_mac_filter_enabled(slot: usize) -> Option<bool> {
        let (high_off, _) = Self::addr_filter_offsets(slot)?;
        let high = unsafe { read_reg(MAC_BASE + high_off) };
        Some(high & MACAHR_AE != 0)
    }

    /// Address and enable state of a slot; `None` for an invalid slot
    pub fn get_mac_filter(slot: usize) -> Option<([u8; 6], bool)> {
        let (high_off, low_off) = Self::addr_filter_offsets(slot)?;

        let low = unsafe { read_reg(MAC_BASE + low_off) };
        let high = unsafe { read_reg(MAC_BASE + high_off) };

        Some((unpack_addr(high, low), high & MACAHR_AE != 0))
    }

    /// Disable every perfect-filter slot
    pub fn clear_all_mac_filters() {
        for slot in 1..=MAC_ADDR_FILTER_COUNT {
            Self::clear_mac_filter(slot);
        }
    }

    /// First disabled slot, or `None` when all three are in use
    pub fn find_free_mac_filter_slot() -> Option<usize> {
        (1..=MAC_ADDR_FILTER_COUNT).find(|&slot| Self::is_mac_filter_enabled(slot) == Some(false))
    }

    /// Slot currently holding `addr`, or `None` if no enabled slot matches
    pub fn find_mac_filter(addr: &[u8; 6]) -> Option<usize> {
        (1..=MAC_ADDR_FILTER_COUNT).find(|&slot| {
            matches!(Self::get_mac_filter(slot), Some((a, true)) if a == *addr)
        })
    }
}
