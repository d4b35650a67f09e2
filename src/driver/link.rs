//! Link negotiation state machine.
//!
//! [`LinkManager`] drives a [`PhyDriver`] through reset, link detection
//! and speed/duplex resolution:
//!
//! ```text
//! Reset -> AwaitLink -> Autonegotiate -> AwaitNegotiationComplete -> ConfigApplied
//!                   \-> ManualConfigure --------------------------/
//! ```
//!
//! A PHY that never leaves reset is fatal - nothing works without a
//! responding transceiver. A link that never comes up is not: the manager
//! reports [`LinkState::Down`] and the caller retries later. When
//! auto-negotiation is enabled but does not complete within its budget,
//! the manager falls back to the configured forced speed/duplex; the
//! forced path is never followed by another negotiation attempt.
//!
//! After `ConfigApplied` the manager re-enters `AwaitLink` (not `Reset`)
//! when the link drops, so cable unplug/replug cycles do not repeat the
//! PHY reset.

use embedded_hal::delay::DelayNs;

use crate::driver::config::LinkConfig;
use crate::driver::error::{Error, IoError, Result};
use crate::hal::mdio::MdioBus;
use crate::phy::{LinkStatus, PhyDriver};

// =============================================================================
// Link State
// =============================================================================

/// Externally visible link state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No link partner detected
    Down,
    /// Link detected, speed/duplex not yet resolved
    Negotiating,
    /// Link established with resolved parameters
    Up(LinkStatus),
}

impl LinkState {
    /// True when the link is established
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, LinkState::Up(_))
    }

    /// The resolved link parameters, when up
    #[must_use]
    pub const fn status(&self) -> Option<LinkStatus> {
        match self {
            LinkState::Up(status) => Some(*status),
            _ => None,
        }
    }
}

/// Progress of the bring-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NegotiationPhase {
    /// PHY soft reset pending or in progress
    Reset,
    /// Waiting for a link partner
    AwaitLink,
    /// Auto-negotiation restarted, waiting to be told it is running
    Autonegotiate,
    /// Waiting for auto-negotiation to resolve
    AwaitNegotiationComplete,
    /// Forced speed/duplex being written
    ManualConfigure,
    /// Bring-up finished for this link session
    ConfigApplied,
}

// =============================================================================
// Link Manager
// =============================================================================

/// Drives the PHY from reset to an established link
///
/// Owns the PHY driver and the negotiation policy. All methods take the
/// MDIO bus and (where they wait) a delay provider by `&mut`, so the
/// manager composes with whatever owns the management interface.
pub struct LinkManager<P: PhyDriver> {
    phy: P,
    config: LinkConfig,
    phase: NegotiationPhase,
    state: LinkState,
    fell_back: bool,
}

impl<P: PhyDriver> LinkManager<P> {
    /// Create a manager for an un-reset PHY
    pub const fn new(phy: P, config: LinkConfig) -> Self {
        Self {
            phy,
            config,
            phase: NegotiationPhase::Reset,
            state: LinkState::Down,
            fell_back: false,
        }
    }

    /// Current link state
    #[must_use]
    pub const fn state(&self) -> LinkState {
        self.state
    }

    /// Current bring-up phase
    #[must_use]
    pub const fn phase(&self) -> NegotiationPhase {
        self.phase
    }

    /// True when the link is established
    #[must_use]
    pub const fn is_up(&self) -> bool {
        self.state.is_up()
    }

    /// Resolved speed/duplex, when the link is up
    #[must_use]
    pub const fn link_status(&self) -> Option<LinkStatus> {
        self.state.status()
    }

    /// True when the current link came from the forced fallback rather
    /// than a completed auto-negotiation
    #[must_use]
    pub const fn fell_back(&self) -> bool {
        self.fell_back
    }

    /// The negotiation policy in effect
    #[must_use]
    pub const fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Access the owned PHY driver
    pub const fn phy(&self) -> &P {
        &self.phy
    }

    /// Mutable access to the owned PHY driver
    pub fn phy_mut(&mut self) -> &mut P {
        &mut self.phy
    }

    /// Consume the manager, returning the PHY driver
    pub fn into_phy(self) -> P {
        self.phy
    }

    /// Run the bring-up sequence to completion for this invocation
    ///
    /// Blocks (via `delay`) for bounded durations only. Returns the
    /// resulting state: `Up` on success, `Down` when no link partner
    /// appeared within the budget (retry later). A PHY that never clears
    /// its reset bit surfaces as `PhyTimeout` and leaves the manager in
    /// the `Reset` phase so a retry starts from the reset again.
    pub fn update_link_status<M: MdioBus, D: DelayNs>(
        &mut self,
        mdio: &mut M,
        delay: &mut D,
    ) -> Result<LinkState> {
        // A finished session only needs revalidation, not renegotiation.
        if self.phase == NegotiationPhase::ConfigApplied {
            if self.phy.is_link_up(mdio)? {
                return Ok(self.state);
            }
            self.link_lost();
        }

        if self.phase == NegotiationPhase::Reset {
            self.phy.soft_reset(mdio)?;
            self.phase = NegotiationPhase::AwaitLink;
        }

        if !self.await_link(mdio, delay)? {
            self.state = LinkState::Down;
            #[cfg(feature = "defmt")]
            defmt::debug!("link: no partner within {} ms", self.config.link_timeout_ms);
            return Ok(self.state);
        }

        if self.config.auto_negotiation {
            self.phase = NegotiationPhase::Autonegotiate;
            self.state = LinkState::Negotiating;
            self.phy.enable_auto_negotiation(mdio)?;
            self.phase = NegotiationPhase::AwaitNegotiationComplete;

            match self.await_negotiation(mdio, delay) {
                Ok(status) => {
                    self.fell_back = false;
                    return Ok(self.apply(status));
                }
                Err(Error::Io(IoError::NegotiationFailed)) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "link: auto-negotiation incomplete after {} ms, forcing {:?}/{:?}",
                        self.config.an_timeout_ms,
                        self.config.speed,
                        self.config.duplex
                    );
                    self.fell_back = true;
                }
                Err(e) => return Err(e),
            }
        }

        // Forced configuration: either requested outright or the
        // fallback after a failed negotiation.
        self.phase = NegotiationPhase::ManualConfigure;
        let forced = LinkStatus::new(self.config.speed, self.config.duplex);
        self.phy.force_link(mdio, forced)?;
        delay.delay_ms(self.config.settle_delay_ms);

        Ok(self.apply(forced))
    }

    /// Check an established link for loss
    ///
    /// Returns `Some(Down)` exactly once when an up link drops (the
    /// manager re-enters `AwaitLink`), `None` otherwise. Bringing the
    /// link back up is [`Self::update_link_status`]'s job.
    pub fn poll<M: MdioBus>(&mut self, mdio: &mut M) -> Result<Option<LinkState>> {
        if !self.state.is_up() {
            return Ok(None);
        }

        if self.phy.is_link_up(mdio)? {
            return Ok(None);
        }

        self.link_lost();
        #[cfg(feature = "defmt")]
        defmt::info!("link: down");
        Ok(Some(LinkState::Down))
    }

    /// Poll for link-up within the configured budget
    fn await_link<M: MdioBus, D: DelayNs>(&mut self, mdio: &mut M, delay: &mut D) -> Result<bool> {
        self.phase = NegotiationPhase::AwaitLink;

        let poll_ms = self.config.poll_interval_ms.max(1);
        let attempts = self.config.link_timeout_ms.div_ceil(poll_ms).max(1);

        for _ in 0..attempts {
            if self.phy.is_link_up(mdio)? {
                return Ok(true);
            }
            delay.delay_ms(poll_ms);
        }

        Ok(false)
    }

    /// Poll for a resolved negotiation within the configured budget
    ///
    /// Completion requires both the IEEE complete bit and a valid vendor
    /// speed indication; a PHY reporting complete without a resolved
    /// speed keeps polling until the budget runs out.
    fn await_negotiation<M: MdioBus, D: DelayNs>(
        &mut self,
        mdio: &mut M,
        delay: &mut D,
    ) -> Result<LinkStatus> {
        let poll_ms = self.config.poll_interval_ms.max(1);
        let attempts = self.config.an_timeout_ms.div_ceil(poll_ms).max(1);

        for _ in 0..attempts {
            if self.phy.is_auto_negotiation_complete(mdio)? {
                if let Some(status) = self.phy.link_status(mdio)? {
                    return Ok(status);
                }
            }
            delay.delay_ms(poll_ms);
        }

        Err(IoError::NegotiationFailed.into())
    }

    fn apply(&mut self, status: LinkStatus) -> LinkState {
        self.phase = NegotiationPhase::ConfigApplied;
        self.state = LinkState::Up(status);
        #[cfg(feature = "defmt")]
        defmt::info!("link: up {:?}/{:?}", status.speed, status.duplex);
        self.state
    }

    fn link_lost(&mut self) {
        self.state = LinkState::Down;
        self.phase = NegotiationPhase::AwaitLink;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
