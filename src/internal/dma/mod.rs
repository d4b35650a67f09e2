//! DMA Engine
//!
//! Descriptor rings, frame buffers and the transfer logic between them.
//! All memory is statically allocated through const generics; nothing
//! here touches the heap.
//!
//! [`DmaEngine`] owns one RX and one TX [`ring::DescriptorRing`] plus
//! their buffers, and talks to the hardware exclusively through the
//! descriptor OWN bits and the `DmaRegs` doorbells. The driver facade
//! in `driver::mac` embeds one engine per instance.

// Not every ring/engine accessor has a driver-side caller
#![allow(dead_code)]

pub(crate) mod descriptor;
mod engine;
mod ring;

pub use engine::DmaEngine;
