//! Reset Controller HAL
//!
//! Covers both reset paths into the MAC: the DMA soft reset inside the
//! peripheral and the RCC reset line around it.

use embedded_hal::delay::DelayNs;

use crate::driver::error::{IoError, Result};
use crate::internal::constants::{RESET_POLL_INTERVAL_US, SOFT_RESET_TIMEOUT_MS};
use crate::internal::register::dma::DmaRegs;
use crate::internal::register::sys::SysRegs;

// =============================================================================
// Reset Controller
// =============================================================================

/// Blocking soft-reset driver with a configurable timeout.
#[derive(Debug)]
pub struct ResetController<D: DelayNs> {
    /// Delay provider
    delay: D,
    /// How long to wait for the reset bit, in milliseconds
    timeout_ms: u32,
}

impl<D: DelayNs> ResetController<D> {
    /// Controller with the stock timeout.
    pub fn new(delay: D) -> Self {
        Self::with_timeout(delay, SOFT_RESET_TIMEOUT_MS)
    }

    /// Controller with a caller-chosen timeout.
    pub fn with_timeout(delay: D, timeout_ms: u32) -> Self {
        Self { delay, timeout_ms }
    }

    /// Run a DMA soft reset and wait for it to finish.
    ///
    /// Resets the DMA engine and MAC logic to their defaults and stops
    /// any running transfers. The ETH kernel clocks must already be on
    /// and an RX clock present at the PHY interface, or the reset bit
    /// never clears and this times out.
    pub fn soft_reset(&mut self) -> Result<()> {
        DmaRegs::software_reset();

        // SR clears by itself once the reset finishes
        let polls = (self.timeout_ms * 1000) / RESET_POLL_INTERVAL_US;
        for _ in 0..polls {
            if self.is_reset_done() {
                return Ok(());
            }
            self.delay.delay_us(RESET_POLL_INTERVAL_US);
        }

        Err(IoError::Timeout.into())
    }

    /// True while the soft reset is still running.
    pub fn is_reset_in_progress(&self) -> bool {
        !DmaRegs::is_reset_complete()
    }

    /// True once the soft reset has finished.
    pub fn is_reset_done(&self) -> bool {
        !self.is_reset_in_progress()
    }

    /// Assert the RCC reset line over the whole ETH peripheral.
    ///
    /// Every MAC/DMA register is pinned at its reset value while held.
    /// The PHY interface selection latches only during this reset.
    pub fn hold_peripheral_reset(&self) {
        SysRegs::assert_eth_reset();
    }

    /// Release the RCC reset line again.
    pub fn release_peripheral_reset(&self) {
        SysRegs::release_eth_reset();
    }

    /// The configured timeout in milliseconds.
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}

// =============================================================================
// Reset State Machine
// =============================================================================

/// Where a managed reset sequence currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetState {
    /// No reset pending, normal operation
    #[default]
    Normal,
    /// Soft reset issued, bit not yet clear
    Resetting,
    /// Soft reset finished, init not yet run
    ResetComplete,
}

/// Non-blocking wrapper around [`ResetController`].
///
/// Lets a main loop issue the reset once and poll for completion
/// instead of blocking through the whole wait.
#[derive(Debug)]
pub struct ResetManager<D: DelayNs> {
    controller: ResetController<D>,
    state: ResetState,
}

impl<D: DelayNs> ResetManager<D> {
    /// Manager in the [`ResetState::Normal`] state.
    pub fn new(delay: D) -> Self {
        Self {
            controller: ResetController::new(delay),
            state: ResetState::Normal,
        }
    }

    /// Current sequence state.
    pub fn state(&self) -> ResetState {
        self.state
    }

    /// Issue the soft reset without waiting.
    pub fn start_reset(&mut self) {
        DmaRegs::software_reset();
        self.state = ResetState::Resetting;
    }

    /// One non-blocking completion check; true once the reset is done.
    pub fn poll_reset(&mut self) -> bool {
        match self.state {
            ResetState::Resetting if self.controller.is_reset_done() => {
                self.state = ResetState::ResetComplete;
                true
            }
            state => state == ResetState::ResetComplete,
        }
    }

    /// Blocking reset through the inner controller.
    pub fn reset(&mut self) -> Result<()> {
        self.start_reset();
        match self.controller.soft_reset() {
            Ok(()) => {
                self.state = ResetState::ResetComplete;
                Ok(())
            }
            Err(err) => {
                self.state = ResetState::Normal;
                Err(err)
            }
        }
    }

    /// Acknowledge the completed reset and return to normal.
    pub fn complete(&mut self) {
        self.state = ResetState::Normal;
    }

    /// Borrow the inner controller.
    pub fn controller(&self) -> &ResetController<D> {
        &self.controller
    }

    /// Borrow the inner controller mutably.
    pub fn controller_mut(&mut self) -> &mut ResetController<D> {
        &mut self.controller
    }
}

// =============================================================================
// Full Reset Sequence
// =============================================================================

/// Complete bring-up reset: enable the ETH kernel clocks, pulse the RCC
/// reset line, then soft-reset the DMA and wait for it.
pub fn full_reset<D: DelayNs>(mut delay: D, timeout_ms: u32) -> Result<()> {
    SysRegs::enable_eth_clocks();

    SysRegs::assert_eth_reset();
    delay.delay_us(10);
    SysRegs::release_eth_reset();
    delay.delay_us(10);

    let mut controller = ResetController::with_timeout(delay, timeout_ms);
    controller.soft_reset()
}
