//! ISR-safe driver wrappers using critical sections.
//!
//! [`SharedEth`] is an Ethernet driver handle that can sit in a
//! `static` and be touched from thread context and the ETH interrupt
//! alike.

use super::primitives::CriticalSectionCell;
use crate::driver::mac::EthMac;

/// Critical-section guarded handle around [`EthMac`].
///
/// Every access runs under `critical_section::with()`, so interrupts
/// stay masked while the closure holds the driver.
///
/// # Example
///
/// ```ignore
/// static ETH_DRIVER: SharedEth<10, 10, 1600> = SharedEth::new();
///
/// ETH_DRIVER.with(|eth| {
///     eth.transmit(&data).ok();
/// });
/// ```
pub struct SharedEth<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> {
    inner: CriticalSectionCell<EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>>,
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    SharedEth<RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Const constructor, so handles can live in `static`s.
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(EthMac::new()),
        }
    }

    /// Run `f` with exclusive driver access, interrupts masked.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>) -> R,
    {
        self.inner.with(f)
    }

    /// Non-blocking variant of [`Self::with`]; `None` when the driver
    /// is already borrowed further up the stack.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>) -> R,
    {
        self.inner.try_with(f)
    }

    /// Whether received frames are waiting.
    pub fn rx_available(&self) -> bool {
        self.inner.with(|eth| eth.rx_available())
    }

    /// Free TX descriptors immediately available.
    pub fn tx_available(&self) -> usize {
        self.inner.with(|eth| eth.tx_available())
    }
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> Default
    for SharedEth<RX_BUFS, TX_BUFS, BUF_SIZE>
{
    fn default() -> Self {
        Self::new()
    }
}

/// Default shared driver configuration (10 RX, 10 TX, 1600 byte buffers).
pub type SharedEthDefault = SharedEth<10, 10, 1600>;

/// Small shared driver configuration for memory-constrained systems.
pub type SharedEthSmall = SharedEth<4, 4, 1600>;

/// Large shared driver configuration for high-throughput applications.
pub type SharedEthLarge = SharedEth<16, 16, 1600>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::State;

    #[test]
    fn aliases_carry_their_ring_depths() {
        // descriptors start CPU-owned, so a fresh ring reads fully free
        assert_eq!(SharedEthSmall::new().tx_available(), 4);
        assert_eq!(SharedEthDefault::new().tx_available(), 10);
        assert_eq!(SharedEthLarge::new().tx_available(), 16);
        assert_eq!(SharedEthDefault::default().tx_available(), 10);
    }

    #[test]
    fn closures_see_the_driver_and_return_values() {
        let shared = SharedEthDefault::new();

        assert_eq!(shared.with(|eth| eth.state()), State::Uninitialized);
        assert_eq!(shared.with(|_| 42), 42);
    }

    #[test]
    fn try_with_works_when_uncontended() {
        let shared = SharedEthDefault::new();

        assert_eq!(shared.try_with(|eth| eth.state()), Some(State::Uninitialized));
        assert_eq!(shared.with(|_| 1), 1);
        assert_eq!(shared.try_with(|_| 2), Some(2));
    }

    #[test]
    fn fresh_driver_has_no_rx_frames() {
        let shared = SharedEthDefault::new();
        assert!(!shared.rx_available());
    }

    #[test]
    fn lives_in_a_static() {
        static SHARED: SharedEth<10, 10, 1600> = SharedEth::new();

        assert_eq!(SHARED.with(|eth| eth.state()), State::Uninitialized);
        assert_eq!(SHARED.tx_available(), 10);
    }
}
