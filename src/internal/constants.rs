//! Centralized Constants
//!
//! One home for the driver-wide numbers: frame geometry, timeouts,
//! clock rates, flow-control defaults and the default station address.
//! Register bit definitions stay with their hardware blocks under
//! `register/`; only block-independent values live here.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Largest frame on the wire: 1500 payload + 14 header + 4 FCS + 4 VLAN tag
pub const MAX_FRAME_SIZE: usize = 1522;

/// Standard Ethernet MTU
pub const MTU: usize = 1500;

/// Destination MAC + source MAC + EtherType
pub const ETH_HEADER_SIZE: usize = 14;

/// FCS trailer length
pub const CRC_SIZE: usize = 4;

/// 802.1Q tag length
pub const VLAN_TAG_SIZE: usize = 4;

/// Stock DMA buffer size: a full tagged frame, rounded up to keep
/// 16-byte alignment
pub const DEFAULT_BUFFER_SIZE: usize = 1600;

/// Smallest valid frame before the FCS is added
pub const MIN_FRAME_SIZE: usize = 60;

// =============================================================================
// Default Buffer Counts
// =============================================================================

/// Stock receive ring depth
pub const DEFAULT_RX_BUFFERS: usize = 10;

/// Stock transmit ring depth
pub const DEFAULT_TX_BUFFERS: usize = 10;

// =============================================================================
// Timing Constants
// =============================================================================

/// How long the DMA soft reset may take, in milliseconds
pub const SOFT_RESET_TIMEOUT_MS: u32 = 100;

/// Spacing between reset-completion polls, in microseconds
pub const RESET_POLL_INTERVAL_US: u32 = 100;

/// Spin budget for one MII/MDIO transaction
pub const MII_BUSY_TIMEOUT: u32 = 100_000;

/// Spin budget for the TX FIFO flush to finish
pub const FLUSH_TIMEOUT: u32 = 100_000;

/// How long the PHY soft-reset bit may stay set, in milliseconds
pub const PHY_RESET_TIMEOUT_MS: u32 = 500;

/// How long to wait for link-up, in milliseconds
pub const LINK_UP_TIMEOUT_MS: u32 = 5_000;

/// How long auto-negotiation may run, in milliseconds.
///
/// IEEE 802.3 allows several seconds for the full FLP exchange.
pub const AUTONEG_TIMEOUT_MS: u32 = 5_000;

/// Settle time after forcing speed/duplex on the PHY, in milliseconds
pub const PHY_CONFIG_DELAY_MS: u32 = 50;

// =============================================================================
// Clock Frequencies
// =============================================================================

/// RMII reference clock, fixed at 50 MHz
pub const RMII_CLK_HZ: u32 = 50_000_000;

/// MII TX/RX clock at 100 Mbit/s
pub const MII_100M_CLK_HZ: u32 = 25_000_000;

/// MII TX/RX clock at 10 Mbit/s
pub const MII_10M_CLK_HZ: u32 = 2_500_000;

/// MDC ceiling per IEEE 802.3
pub const MDC_MAX_FREQ_HZ: u32 = 2_500_000;

// =============================================================================
// Flow Control (IEEE 802.3 PAUSE)
// =============================================================================

/// Largest PAUSE quanta value; one unit is 512 bit times, so this is
/// roughly 33 ms at 100 Mbit/s
pub const PAUSE_TIME_MAX: u16 = 0xFFFF;

/// Stock low water mark, in buffers out of the default ten
pub const DEFAULT_FLOW_LOW_WATER: usize = 3;

/// Stock high water mark, in buffers out of the default ten
pub const DEFAULT_FLOW_HIGH_WATER: usize = 6;

// =============================================================================
// MAC Address
// =============================================================================

/// Fallback station address: locally administered (bit 1 of the first
/// byte set), unicast (bit 0 clear)
pub const DEFAULT_MAC_ADDR: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

/// Station address length
pub const MAC_ADDR_LEN: usize = 6;
