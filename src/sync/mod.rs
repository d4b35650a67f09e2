//! Synchronization and Concurrency Support
//!
//! This module provides synchronization primitives and concurrency-safe
//! wrappers for the Ethernet driver. It includes:
//!
//! - **Primitives** (`primitives`): Low-level synchronization types
//!   - [`CriticalSectionCell`] - ISR-safe interior mutability
//!
//! - **Shared Wrappers** (`shared`): ISR-safe driver wrappers
//!   - [`SharedEth`] - Synchronous critical-section protected driver
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables this module
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32_eth::eth_static_sync;
//!
//! // Static ISR-safe driver (10 RX, 10 TX, 1600 byte buffers)
//! eth_static_sync!(ETH_DRIVER);
//!
//! fn main() {
//!     ETH_DRIVER.with(|eth| {
//!         eth.init(EthConfig::nucleo_default(), &mut delay).unwrap();
//!         eth.start().unwrap();
//!     });
//! }
//!
//! #[interrupt]
//! fn ETH() {
//!     ETH_DRIVER.with(|eth| {
//!         // Safe access from ISR
//!         eth.handle_interrupt();
//!     });
//! }
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::{SharedEth, SharedEthDefault, SharedEthLarge, SharedEthSmall};
