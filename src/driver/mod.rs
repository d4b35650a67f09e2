//! Core driver components for the STM32 Ethernet MAC peripheral.
//!
//! This module contains the essential building blocks for configuring and
//! operating the Ethernet MAC controller:
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`events`] - Event queue and callback dispatch
//! - [`interrupt`] - Decoded DMA interrupt status
//! - [`link`] - PHY link bring-up state machine
//! - [`mac`] - The main Ethernet MAC controller implementation
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32_eth::driver::{EthConfig, EthMac, Error};
//!
//! let config = EthConfig::nucleo_default()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod events;
pub mod interrupt;
pub mod link;
pub mod mac;

// Re-exports for convenience
pub use config::{
    ChecksumConfig, DmaBurstLen, Duplex, EthConfig, FlowControlConfig, LinkConfig,
    MAC_FILTER_SLOTS, MacAddressFilter, MacFilterType, PauseLowThreshold, PhyInterface, Speed,
    State, TxChecksumMode,
};
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result};
pub use events::{CallbackTable, Event, EventHandler, EventKind, EventQueue};
pub use interrupt::InterruptStatus;
pub use link::{LinkManager, LinkState, NegotiationPhase};
pub use mac::{EthMac, EthMacDefault, EthMacLarge, EthMacSmall, FrameInfo};
