//! Internal Implementation Details
//!
//! Everything below this module is crate-private machinery with no
//! stability promises:
//!
//! - [`register`]: raw memory-mapped register definitions
//! - [`constants`]: driver-wide numbers
//! - [`dma`]: DMA engine, descriptor rings and descriptor bit fields
//!
//! The curated escape hatch into this layer is
//! `crate::unsafe_registers`; nothing else here is visible outside the
//! crate.

pub(crate) mod constants;
pub(crate) mod dma;
pub(crate) mod register;

// Register types are accessed via submodules: register::dma::DmaRegs, etc.
