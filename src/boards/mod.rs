//! Board-specific helpers and pin mappings.
//!
//! This module provides opinionated board configurations to reduce boilerplate
//! for common STM32 Ethernet boards.
//!
//! # Overview
//!
//! The board helpers encapsulate MAC/PHY defaults and wiring assumptions for a
//! specific board. They are intended to define a canonical "happy path" for
//! bring-up code: construct the config, construct the PHY driver, and hand
//! both to [`EthMac::init`](crate::EthMac::init).
//!
//! The RMII pins themselves are configured through the user's GPIO setup code
//! (this crate does not own the GPIO peripherals); the pin tables here record
//! the wiring so that setup code has one authoritative reference.
//!
//! # Supported Boards
//!
//! - NUCLEO-F429ZI (LAN8742A, RMII, ST Nucleo-144 form factor)
//!
//! The other ST Nucleo-144 boards (F746ZG, F767ZI, H-series predecessors)
//! share the same Ethernet wiring, so the pin table applies to them as well.

pub mod nucleo_f429zi;
