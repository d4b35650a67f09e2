//! Hardware Abstraction Layer
//!
//! This module provides higher-level abstractions over the raw registers,
//! making it easier to use the ETH peripheral without dealing with
//! register-level details.
//!
//! # Modules
//!
//! - [`mdio`]: MDIO/SMI bus for PHY communication
//! - [`reset`]: Reset controller for the ETH peripheral
//!
//! GPIO alternate-function setup (AF11 on the RMII/MII pins) is left to the
//! application's pin configuration; see the board modules for the expected
//! pinout.
//!
//! # Delay Integration
//!
//! All types that require delays use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod mdio;
pub mod reset;

// Re-export commonly used types
pub use mdio::{MdcClockDivider, MdioBus, MdioController, PhyStatus, SmiPort};
pub use reset::{ResetController, ResetManager, ResetState};
