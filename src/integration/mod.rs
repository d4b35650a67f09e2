//! External Stack Integrations
//!
//! Glue between the driver and outside network stacks. Today that is
//! [`smoltcp`]: a `smoltcp::phy::Device` implementation with RX/TX
//! tokens, gated behind the `smoltcp` feature.
//!
//! ```ignore
//! use smoltcp::phy::Device;
//! let (rx, tx) = eth.receive(Instant::ZERO).unwrap();
//! ```

pub mod smoltcp;

pub use smoltcp::{EthRxToken, EthTxToken, ethernet_address};
