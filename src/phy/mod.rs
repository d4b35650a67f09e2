//! Ethernet PHY Drivers
//!
//! This module provides a generic PHY driver trait and an implementation
//! for the PHY chip fitted to the ST Nucleo-144 boards.
//!
//! # Architecture
//!
//! The PHY layer is designed to be independent of the MAC implementation,
//! communicating only through the MDIO bus interface. This allows:
//!
//! - Reuse across different MAC implementations
//! - Easy addition of new PHY drivers
//! - Testing with mock MDIO implementations
//!
//! # Supported PHY Chips
//!
//! - [`Lan8742a`]: Microchip/SMSC LAN8742A (Nucleo-F429ZI, Nucleo-F746ZG)
//!
//! # Example
//!
//! ```ignore
//! use ph_stm32_eth::phy::{Lan8742a, PhyDriver};
//! use ph_stm32_eth::hal::MdioController;
//! use embedded_hal::delay::DelayNs;
//!
//! // Your delay implementation (from the HAL or custom)
//! let mut delay = /* your DelayNs implementation */;
//!
//! // Create MDIO controller
//! let mut mdio = MdioController::new(&mut delay);
//!
//! // Create PHY driver at address 0
//! let mut phy = Lan8742a::new(0);
//!
//! // Initialize and enable auto-negotiation
//! phy.init(&mut mdio)?;
//!
//! // Poll for link status
//! loop {
//!     if let Some(link) = phy.poll_link(&mut mdio)? {
//!         // link established
//!         break;
//!     }
//! }
//! ```
//!
//! Boards that route the PHY reset line to a GPIO can wrap the driver:
//!
//! ```ignore
//! use ph_stm32_eth::phy::{Lan8742aWithReset, PhyDriver};
//! use embedded_hal::digital::OutputPin;
//!
//! let reset_pin = gpioa.pa3.into_push_pull_output();
//! let mut phy = Lan8742aWithReset::new(0, reset_pin);
//! phy.hardware_reset(&mut delay)?;
//! phy.init(&mut mdio)?;
//! ```

pub mod generic;
pub mod lan8742a;

pub use generic::{LinkStatus, PhyCapabilities, PhyDriver};
pub use lan8742a::{Lan8742a, Lan8742aWithReset};

// Re-export IEEE 802.3 standard register definitions from mdio
pub use crate::hal::mdio::{anar, bmcr, bmsr, phy_reg};
