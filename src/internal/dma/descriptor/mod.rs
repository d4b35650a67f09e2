//! TX and RX DMA descriptor structures.
//!
//! The ETH DMA uses the normal (4-word) descriptor format in chained mode:
//! each descriptor carries a status word, a control/size word, a buffer
//! pointer, and a pointer to the next descriptor. The OWN bit in the status
//! word is the only synchronization primitive between driver and DMA.

pub mod bits;
pub mod rx;
pub mod tx;

pub use rx::RxDescriptor;
pub use tx::TxDescriptor;

/// Volatile wrapper for descriptor words.
///
/// The DMA writes these fields behind the compiler's back, so every
/// access must stay volatile; caching or reordering them would tear the
/// OWN-bit handshake.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: all access goes through volatile loads and stores, which are
// single atomic bus transactions for u32 on Cortex-M.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Cell holding `value`.
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Volatile load.
    #[inline(always)]
    pub fn get(&self) -> T {
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Volatile store.
    #[inline(always)]
    pub fn set(&self, value: T) {
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }

    /// Volatile read-modify-write through `f`.
    #[inline(always)]
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        self.set(f(self.get()));
    }
}

impl<T: Copy + Default> Default for VolatileCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Receive-side view of a descriptor used by the frame scan.
///
/// The scan walks software-owned descriptors looking for a first-of-frame
/// marker and the matching last-of-frame marker; it never writes through
/// this trait. Implemented by the real RX descriptor and by the mock used
/// in host tests.
pub(crate) trait RxSlot {
    /// True when the DMA owns this descriptor.
    fn is_owned(&self) -> bool;
    /// True when this descriptor holds the first segment of a frame.
    fn is_first(&self) -> bool;
    /// True when this descriptor holds the last segment of a frame.
    fn is_last(&self) -> bool;
    /// True when the DMA flagged an error on this frame.
    fn has_error(&self) -> bool;
    /// Total frame length in bytes, valid only on a last-of-frame descriptor.
    fn frame_length(&self) -> usize;
}
