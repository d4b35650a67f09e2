//! STM32 Ethernet MAC Driver
//!
//! A `no_std`, `no_alloc` Rust implementation of the STM32F4/F7 Ethernet MAC
//! (ETH) controller.
//!
//! This crate provides a bare-metal driver for the Ethernet MAC found on the
//! STM32F4 and STM32F7 families, based on the Synopsys DesignWare MAC (DWMAC)
//! IP core.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **MAC Layer** ([`driver::mac`]): Main Ethernet driver with TX/RX operations
//! 2. **PHY Layer** ([`phy`]): Ethernet PHY drivers (e.g., LAN8742A)
//! 3. **HAL Layer** ([`hal`]): Hardware abstraction for SMI/MDIO and reset
//!
//! ## Standard Compliance
//!
//! - **IEEE 802.3**: Frame sizes, MDIO/MDC protocol, flow control
//! - **Synopsys DWMAC**: DMA descriptors, register layout (portable to other SoCs)
//! - **STM32-specific**: Memory map, RCC clock/reset sequencing, SYSCFG pinout
//!   selection
//!
//! # Supported PHY Chips
//!
//! - [`Lan8742a`]: Microchip/SMSC LAN8742A (fitted to the ST Nucleo-144 boards)
//!
//! Additional PHY drivers can be added by implementing [`PhyDriver`].
//!
//! # Features
//!
//! - `stm32f4` (default): Target the STM32F4 family (F407/F417/F427/F429/F439)
//! - `stm32f7`: Target the STM32F7 family (F745/F746/F756/F7x7). Additive with
//!   `stm32f4`; when both are enabled the F7 family tables apply
//! - `defmt`: Enable defmt formatting for driver types and structured logging
//! - `smoltcp`: Enable smoltcp network stack integration
//! - `critical-section`: Enable the ISR-safe `SharedEth` wrapper
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32_eth::{EthConfig, EthMac, LinkState};
//! use embedded_hal::delay::DelayNs;
//!
//! // Your delay implementation (from the HAL or custom)
//! let mut delay = /* your DelayNs implementation */;
//!
//! // Static allocation; on STM32F7, place where the Ethernet DMA can
//! // reach it (see "Buffer Placement" below)
//! static mut ETH: EthMac<10, 10, 1600> = EthMac::new();
//!
//! let eth = unsafe { &mut ETH };
//!
//! // Configure with builder pattern
//! let config = EthConfig::nucleo_default()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x12, 0x34, 0x56]);
//!
//! eth.init(config, &mut delay).unwrap();
//!
//! // Bring the link up (auto-negotiation with forced fallback)
//! while !matches!(eth.update_link_status(&mut delay).unwrap(), LinkState::Up(_)) {
//!     delay.delay_ms(100);
//! }
//!
//! eth.start().unwrap();
//! ```
//!
//! # Memory Requirements
//!
//! With default configuration (10 RX buffers, 10 TX buffers, 1600 bytes each):
//! - Total: ~32 KB of DMA-capable SRAM
//!
//! # Buffer Placement
//!
//! Descriptor rings and frame buffers live inside the [`EthMac`] struct, so
//! the placement of the driver instance decides where the DMA reads and
//! writes:
//!
//! - **STM32F4**: any internal SRAM works; no cache to manage.
//! - **STM32F7**: the Ethernet DMA cannot access DTCM, and the default
//!   `memory.x` for many F7 parts places `.bss`/`.data` there. Put the
//!   instance in SRAM1/SRAM2 (a dedicated linker section, or adjust the
//!   memory map) and either configure that region non-cacheable via the MPU
//!   or keep the data cache off.

#![cfg_attr(docsrs, doc(cfg_hide(feature = "stm32f7")))]
#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in clippy.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

// =============================================================================
// Modules
// =============================================================================

#[cfg(feature = "stm32f4")]
#[cfg_attr(docsrs, doc(cfg(feature = "stm32f4")))]
pub mod boards;
pub mod driver;
pub mod hal;
pub mod phy;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "smoltcp")]
#[cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
pub mod integration;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{
    ChecksumConfig, DmaBurstLen, Duplex, EthConfig, FlowControlConfig, LinkConfig,
    MAC_FILTER_SLOTS, MacAddressFilter, MacFilterType, PauseLowThreshold, PhyInterface, Speed,
    State, TxChecksumMode,
};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result,
};
pub use driver::events::{Event, EventHandler, EventKind};
pub use driver::interrupt::InterruptStatus;
pub use driver::link::{LinkManager, LinkState, NegotiationPhase};
pub use driver::mac::{EthMac, EthMacDefault, EthMacLarge, EthMacSmall, FrameInfo};

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the safe driver APIs instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants. Use only if you fully
/// understand the STM32 ETH hardware and accept responsibility for correct
/// sequencing and synchronization.
pub mod unsafe_registers {
    pub use crate::internal::register::dma::DmaRegs;
    pub use crate::internal::register::mac::MacRegs;
    pub use crate::internal::register::sys::SysRegs;
}

// Re-export PHY types
pub use phy::{Lan8742a, Lan8742aWithReset, LinkStatus, PhyCapabilities, PhyDriver};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{SharedEth, SharedEthDefault, SharedEthLarge, SharedEthSmall};

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types and integration points.
pub mod constants {
    pub use crate::internal::constants::{
        // Link bring-up timing
        AUTONEG_TIMEOUT_MS,
        // Frame/buffer sizes
        CRC_SIZE,
        DEFAULT_BUFFER_SIZE,
        // Flow control
        DEFAULT_FLOW_HIGH_WATER,
        DEFAULT_FLOW_LOW_WATER,
        // MAC address
        DEFAULT_MAC_ADDR,
        // Buffer counts
        DEFAULT_RX_BUFFERS,
        DEFAULT_TX_BUFFERS,
        ETH_HEADER_SIZE,
        // Timing
        FLUSH_TIMEOUT,
        LINK_UP_TIMEOUT_MS,
        MAC_ADDR_LEN,
        MAX_FRAME_SIZE,
        // Clocks
        MDC_MAX_FREQ_HZ,
        MII_10M_CLK_HZ,
        MII_100M_CLK_HZ,
        MII_BUSY_TIMEOUT,
        MIN_FRAME_SIZE,
        MTU,
        PAUSE_TIME_MAX,
        PHY_CONFIG_DELAY_MS,
        PHY_RESET_TIMEOUT_MS,
        RESET_POLL_INTERVAL_US,
        RMII_CLK_HZ,
        SOFT_RESET_TIMEOUT_MS,
        VLAN_TAG_SIZE,
    };
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare a static, ISR-safe Ethernet driver instance for synchronous use.
///
/// This macro expands to a `SharedEth` static, reducing boilerplate for
/// synchronous bring-up where the ETH interrupt and the main loop share the
/// driver.
///
/// On STM32F7, make sure the static lands in memory the Ethernet DMA can
/// reach (not DTCM); see the crate-level "Buffer Placement" notes.
///
/// # Examples
///
/// ```ignore
/// ph_stm32_eth::eth_static_sync!(ETH);
///
/// ETH.with(|eth| {
///     eth.init(EthConfig::nucleo_default(), &mut delay).unwrap();
///     eth.start().unwrap();
/// });
/// ```
#[cfg(feature = "critical-section")]
#[macro_export]
macro_rules! eth_static_sync {
    ($name:ident) => {
        $crate::eth_static_sync!($name, 10, 10, 1600);
    };
    ($name:ident, $rx:expr, $tx:expr, $buf:expr) => {
        static $name: $crate::sync::SharedEth<$rx, $tx, $buf> = $crate::sync::SharedEth::new();
    };
}
