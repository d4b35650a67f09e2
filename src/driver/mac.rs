//! STM32 Ethernet MAC driver
//!
//! [`EthMac`] ties the pieces together: the register blocks, the DMA
//! descriptor engine, the SMI management port, the PHY driver and the
//! link state machine. All buffer memory lives inside the struct via
//! const generics, so a driver instance can be placed in a `static`.
//!
//! # Lifecycle
//!
//! ```ignore
//! static mut ETH: EthMacDefault = EthMacDefault::new();
//!
//! let eth = unsafe { &mut ETH };
//! eth.init(EthConfig::nucleo_default(), &mut delay)?;
//! eth.update_link_status(&mut delay)?;
//! eth.start()?;
//! ```
//!
//! `init` configures the peripheral but leaves TX/RX disabled; `start`
//! enables the MAC core first and then the DMA, `stop` reverses that
//! order. Frames move through [`EthMac::transmit`] and
//! [`EthMac::receive_frame`] / [`EthMac::copy_frame`] /
//! [`EthMac::release_frame`].

use embedded_hal::delay::DelayNs;

use super::config::{
    ChecksumConfig, Duplex, EthConfig, MacAddressFilter, MacFilterType, PhyInterface, Speed, State,
};
use super::error::{ConfigError, DmaError, Error, IoError, Result};
use super::events::{
    CallbackTable, DEFAULT_EVENT_CAPACITY, Event, EventHandler, EventKind, EventQueue,
};
use super::interrupt::InterruptStatus;
use super::link::{LinkManager, LinkState};
use crate::hal::mdio::{MAX_PHY_ADDR, MdioBus, SmiPort};
use crate::hal::reset::ResetController;
use crate::internal::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_RX_BUFFERS, DEFAULT_TX_BUFFERS, FLUSH_TIMEOUT,
};
use crate::internal::dma::DmaEngine;
use crate::internal::dma::descriptor::bits::tdes0;
use crate::internal::register::dma::{
    DMABMR_AAB, DMABMR_FB, DMABMR_PBL_MASK, DMABMR_PBL_SHIFT, DMABMR_RDP_MASK, DMABMR_RDP_SHIFT,
    DMABMR_USP, DMAOMR_OSF, DMAOMR_RSF, DMAOMR_TSF, DmaRegs, RxProcessState, TxProcessState,
};
use crate::internal::register::mac::{
    MAC_ADDR_FILTER_COUNT, MACCR_DM, MACCR_FES, MACCR_IPCO, MACFFR_PAM, MACFFR_PM, MacRegs,
};
use crate::internal::register::sys::SysRegs;
use crate::phy::{Lan8742a, LinkStatus, PhyDriver};

// =============================================================================
// Borrowed Delay
// =============================================================================

/// Adapter so components that take delays by value can borrow the
/// caller's delay provider for the duration of one call.
struct BorrowedDelay<'a, D: DelayNs>(&'a mut D);

impl<D: DelayNs> DelayNs for BorrowedDelay<'_, D> {
    fn delay_ns(&mut self, ns: u32) {
        self.0.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}

// =============================================================================
// Frame Info
// =============================================================================

/// Handle to a received frame still sitting in the RX ring.
///
/// Returned by [`EthMac::receive_frame`]; the descriptors it covers stay
/// owned by the host until [`EthMac::release_frame`] gives them back to
/// the DMA. `length` excludes the 4-byte FCS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameInfo {
    /// Ring index of the first descriptor of the frame
    pub first_index: usize,
    /// Number of descriptors the frame spans
    pub descriptor_count: usize,
    /// Frame length in bytes, FCS excluded
    pub length: usize,
}

// =============================================================================
// Ethernet MAC Driver
// =============================================================================

/// STM32 Ethernet MAC driver.
///
/// Const generic parameters size the descriptor rings and buffers:
/// `RX_BUFS`/`TX_BUFS` descriptors with `BUF_SIZE`-byte buffers each.
/// See [`EthMacDefault`], [`EthMacSmall`] and [`EthMacLarge`] for common
/// configurations.
pub struct EthMac<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> {
    /// DMA descriptor rings and buffers
    dma: DmaEngine<RX_BUFS, TX_BUFS, BUF_SIZE>,
    /// Active configuration (stored at `init`)
    config: EthConfig,
    /// Driver lifecycle state
    state: State,
    /// Station address programmed into the MAC
    mac_addr: [u8; 6],
    /// Speed currently applied to the MAC core
    speed: Speed,
    /// Duplex currently applied to the MAC core
    duplex: Duplex,
    /// SMI management port for PHY register access
    smi: SmiPort,
    /// PHY link bring-up state machine
    link: LinkManager<Lan8742a>,
    /// Pending driver events, drained by `poll_events`
    events: EventQueue<DEFAULT_EVENT_CAPACITY>,
    /// Registered event handlers
    callbacks: CallbackTable,
    /// Link partner advertised PAUSE during the last negotiation
    peer_pause_ability: bool,
    /// A PAUSE frame is currently holding the partner off
    flow_control_active: bool,
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>
{
    // =========================================================================
    // Construction & Accessors
    // =========================================================================

    /// Create an uninitialized driver.
    ///
    /// Const so instances can be placed in statics; nothing touches the
    /// hardware until [`Self::init`].
    #[must_use]
    pub const fn new() -> Self {
        let config = EthConfig::new();
        Self {
            dma: DmaEngine::new(),
            mac_addr: config.mac_address,
            speed: config.link.speed,
            duplex: config.link.duplex,
            link: LinkManager::new(Lan8742a::new(0), config.link),
            config,
            state: State::Uninitialized,
            smi: SmiPort::new(),
            events: EventQueue::new(),
            callbacks: CallbackTable::new(),
            peer_pause_ability: false,
            flow_control_active: false,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Station address programmed into the MAC
    #[must_use]
    pub const fn mac_address(&self) -> [u8; 6] {
        self.mac_addr
    }

    /// Speed currently applied to the MAC core
    #[must_use]
    pub const fn speed(&self) -> Speed {
        self.speed
    }

    /// Duplex currently applied to the MAC core
    #[must_use]
    pub const fn duplex(&self) -> Duplex {
        self.duplex
    }

    /// The configuration stored at `init`
    #[must_use]
    pub const fn config(&self) -> &EthConfig {
        &self.config
    }

    /// Total memory footprint of a driver instance in bytes
    #[must_use]
    pub const fn memory_usage() -> usize {
        size_of::<Self>()
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Bring the peripheral out of reset and configure it.
    ///
    /// Enables clocks, selects the PHY interface, soft-resets the DMA,
    /// probes the PHY and programs MAC/DMA defaults plus the descriptor
    /// rings. TX/RX stay disabled until [`Self::start`].
    ///
    /// A PHY that never answers on the SMI bus is fatal here: the probe
    /// surfaces `PhyTimeout` (bus stuck) or `InvalidPhyAddress` (wrong or
    /// missing chip) and the driver stays uninitialized.
    pub fn init<D: DelayNs>(&mut self, config: EthConfig, delay: &mut D) -> Result<()> {
        if self.state != State::Uninitialized {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        if config.phy_addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress.into());
        }
        self.config = config;

        // === STEP 1: SYSCFG clock ===
        // Needed before the MII/RMII selection below can be written.
        SysRegs::enable_syscfg_clock();

        // === STEP 2: PHY interface selection ===
        // SYSCFG_PMC may only change while the MAC is held in reset with
        // its kernel clocks off.
        SysRegs::assert_eth_reset();
        match self.config.phy_interface {
            PhyInterface::Rmii => SysRegs::set_rmii_mode(),
            PhyInterface::Mii => SysRegs::set_mii_mode(),
        }
        SysRegs::release_eth_reset();

        // === STEP 3: MAC kernel clocks ===
        SysRegs::enable_eth_clocks();

        // === STEP 4: DMA soft reset ===
        // Requires the PHY reference clock; a missing REF_CLK shows up
        // here as a reset that never completes.
        ResetController::with_timeout(BorrowedDelay(delay), self.config.sw_reset_timeout_ms)
            .soft_reset()
            .map_err(|_| Error::Config(ConfigError::ResetFailed))?;

        #[cfg(feature = "defmt")]
        defmt::debug!("eth: DMA soft reset complete");

        // === STEP 5: MDC clock divider ===
        self.smi.configure_for_hclk(self.config.hclk_hz);

        // === STEP 6: PHY probe ===
        let phy = Lan8742a::new(self.config.phy_addr);
        phy.verify_id(&mut self.smi)?;
        self.link = LinkManager::new(phy, self.config.link);

        #[cfg(feature = "defmt")]
        defmt::debug!("eth: LAN8742A found at address {}", self.config.phy_addr);

        // === STEP 7: MAC core defaults ===
        self.configure_mac_defaults();

        // === STEP 8: DMA controller defaults ===
        self.configure_dma_defaults();

        // === STEP 9: Descriptor rings ===
        let cic = (self.config.checksum.tx_checksum as u32) << tdes0::CHECKSUM_INSERT_SHIFT;
        self.dma.set_tx_ctrl_flags(cic & tdes0::CHECKSUM_INSERT_MASK);
        self.dma.init();

        // === STEP 10: Station address ===
        self.mac_addr = self.config.mac_address;
        MacRegs::set_mac_address(&self.mac_addr);

        self.state = State::Initialized;

        #[cfg(feature = "defmt")]
        defmt::info!("eth: initialized, station address {}", self.mac_addr);

        Ok(())
    }

    /// Program the MAC configuration and frame filter registers.
    fn configure_mac_defaults(&mut self) {
        // MACCR comes up zeroed after the soft reset; build the full value
        // so re-init after a stop is deterministic. APCS stays off: the
        // FCS remains in the RX buffer and reported lengths subtract it.
        let mut cr = 0u32;
        if self.config.link.speed == Speed::Mbps100 {
            cr |= MACCR_FES;
        }
        if self.config.link.duplex == Duplex::Full {
            cr |= MACCR_DM;
        }
        if self.config.checksum.rx_checksum {
            cr |= MACCR_IPCO;
        }
        MacRegs::set_config(cr);

        // Perfect DA filtering with all multicast passed through.
        let mut ff = MACFFR_PAM;
        if self.config.promiscuous {
            ff |= MACFFR_PM;
        }
        MacRegs::set_frame_filter(ff);
        MacRegs::clear_hash_table();
    }

    /// Program the DMA bus and operation mode registers.
    fn configure_dma_defaults(&mut self) {
        let pbl = self.config.dma_burst_len as u32;

        let mut bmr = DMABMR_AAB | DMABMR_FB | DMABMR_USP;
        bmr |= (pbl << DMABMR_PBL_SHIFT) & DMABMR_PBL_MASK;
        bmr |= (pbl << DMABMR_RDP_SHIFT) & DMABMR_RDP_MASK;
        DmaRegs::set_bus_mode(bmr);

        // Store-and-forward both directions; OSF lets the TX DMA fetch
        // the next frame while the previous one drains.
        DmaRegs::set_operation_mode(DMAOMR_TSF | DMAOMR_RSF | DMAOMR_OSF);

        DmaRegs::disable_all_interrupts();
        DmaRegs::clear_all_interrupts();
    }

    // =========================================================================
    // Start / Stop
    // =========================================================================

    /// Enable the MAC core, then the DMA.
    ///
    /// Idempotent when already running. Fails with `InvalidState` before
    /// `init`, and with `Timeout` if the TX FIFO flush never completes.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            State::Running => return Ok(()),
            State::Initialized | State::Stopped => {}
            State::Uninitialized => return Err(IoError::InvalidState.into()),
        }

        self.dma.reset();
        DmaRegs::clear_all_interrupts();
        DmaRegs::enable_default_interrupts();

        // MAC core first, then the DMA processes.
        MacRegs::enable_tx();
        MacRegs::enable_rx();
        self.flush_tx_fifo()?;

        DmaRegs::start_tx();
        DmaRegs::start_rx();
        DmaRegs::rx_poll_demand();

        self.state = State::Running;

        #[cfg(feature = "defmt")]
        defmt::info!("eth: started");

        Ok(())
    }

    /// Stop the DMA, then disable the MAC core.
    ///
    /// Waits for the TX DMA to finish its current frame before disabling
    /// anything. Idempotent when already stopped.
    pub fn stop(&mut self) -> Result<()> {
        match self.state {
            State::Stopped => return Ok(()),
            State::Running => {}
            State::Uninitialized | State::Initialized => {
                return Err(IoError::InvalidState.into());
            }
        }

        // DMA first, MAC second: the reverse of `start`.
        DmaRegs::stop_tx();
        self.wait_tx_dma_idle()?;
        DmaRegs::stop_rx();

        self.flush_tx_fifo()?;
        MacRegs::disable_tx();
        MacRegs::disable_rx();

        DmaRegs::disable_all_interrupts();
        DmaRegs::clear_all_interrupts();

        self.flow_control_active = false;
        self.state = State::Stopped;

        #[cfg(feature = "defmt")]
        defmt::info!("eth: stopped");

        Ok(())
    }

    /// Trigger a TX FIFO flush and wait for it to complete.
    fn flush_tx_fifo(&mut self) -> Result<()> {
        DmaRegs::flush_tx_fifo();

        let mut spins = 0u32;
        while !DmaRegs::is_tx_fifo_flush_complete() {
            if spins >= FLUSH_TIMEOUT {
                return Err(IoError::Timeout.into());
            }
            core::hint::spin_loop();
            spins += 1;
        }
        Ok(())
    }

    /// Wait for the TX DMA process to report the stopped state.
    fn wait_tx_dma_idle(&mut self) -> Result<()> {
        let mut spins = 0u32;
        while TxProcessState::from(DmaRegs::status()) != TxProcessState::Stopped {
            if spins >= FLUSH_TIMEOUT {
                return Err(IoError::Timeout.into());
            }
            core::hint::spin_loop();
            spins += 1;
        }
        Ok(())
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// Queue a frame for transmission.
    ///
    /// The frame is copied into ring buffers and handed to the DMA.
    /// Returns the number of descriptors consumed. When the ring looks
    /// full, completed descriptors are reclaimed once and the transmit is
    /// retried before reporting `RingExhausted`.
    pub fn transmit(&mut self, frame: &[u8]) -> Result<usize> {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }

        match self.dma.transmit(frame) {
            Err(Error::Dma(DmaError::RingExhausted)) => {
                self.dma.reclaim_transmitted();
                self.dma.transmit(frame)
            }
            other => other,
        }
    }

    /// Reclaim descriptors for frames the DMA finished sending.
    ///
    /// Returns `(frames, errors)`. Called automatically from
    /// [`Self::handle_interrupt`]; polling drivers call it directly.
    pub fn reclaim_transmitted(&mut self) -> (usize, usize) {
        self.dma.reclaim_transmitted()
    }

    /// Number of free TX descriptors immediately available
    #[must_use]
    pub fn tx_available(&self) -> usize {
        self.dma.tx_available()
    }

    /// Whether a frame of `len` bytes could be queued right now
    #[must_use]
    pub fn can_transmit(&self, len: usize) -> bool {
        self.dma.can_transmit(len)
    }

    // =========================================================================
    // Receive
    // =========================================================================

    /// Take the oldest complete frame out of the RX ring without copying.
    ///
    /// Returns `None` when no complete frame is waiting. The returned
    /// handle stays valid until [`Self::release_frame`]; calling this
    /// again before releasing returns the same frame.
    pub fn receive_frame(&mut self) -> Result<Option<FrameInfo>> {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }
        Ok(self.dma.receive_frame())
    }

    /// Copy a received frame's payload into `buffer`.
    ///
    /// `buffer` must hold at least `info.length` bytes or the copy fails
    /// with `BufferTooSmall`. Returns the number of bytes copied.
    pub fn copy_frame(&self, info: &FrameInfo, buffer: &mut [u8]) -> Result<usize> {
        self.dma.copy_frame(info, buffer)
    }

    /// Return a frame's descriptors to the DMA and restart reception.
    pub fn release_frame(&mut self, info: &FrameInfo) {
        self.dma.release_frame(info);
    }

    /// Receive and copy in one step.
    ///
    /// Combines [`Self::receive_frame`], [`Self::copy_frame`] and
    /// [`Self::release_frame`]. Fails with `IncompleteFrame` when nothing
    /// is waiting.
    pub fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }
        self.dma.receive(buffer)
    }

    /// Discard the oldest waiting frame, if any.
    pub fn flush_rx_frame(&mut self) {
        self.dma.flush_rx_frame();
    }

    /// Whether at least one complete frame is waiting
    #[must_use]
    pub fn rx_available(&self) -> bool {
        self.dma.rx_available()
    }

    /// Number of complete frames waiting in the RX ring
    #[must_use]
    pub fn rx_frame_count(&self) -> usize {
        self.dma.rx_frame_count()
    }

    /// Length of the oldest waiting frame (FCS excluded)
    #[must_use]
    pub fn peek_frame_length(&self) -> Option<usize> {
        self.dma.peek_frame_length()
    }

    // =========================================================================
    // Link Management
    // =========================================================================

    /// Run the PHY link bring-up sequence.
    ///
    /// Drives auto-negotiation (or forced configuration) per the stored
    /// [`super::config::LinkConfig`] and applies the resulting speed and
    /// duplex to the MAC core. `Down` is a normal outcome when no cable
    /// is plugged; call again later. Queues a `LinkChanged` event on
    /// up/down transitions.
    pub fn update_link_status<D: DelayNs>(&mut self, delay: &mut D) -> Result<LinkState> {
        let was_up = self.link.is_up();
        let state = self.link.update_link_status(&mut self.smi, delay)?;

        match state {
            LinkState::Up(status) => {
                if !was_up || status.speed != self.speed || status.duplex != self.duplex {
                    self.apply_link(status);
                }
                if !was_up {
                    self.peer_pause_ability = self.negotiated_pause_ability();
                    if self.config.flow_control.enabled && self.peer_pause_ability {
                        self.apply_flow_control();
                    }
                    self.push_event(Event::LinkChanged { up: true });
                }
            }
            LinkState::Down | LinkState::Negotiating => {
                if was_up {
                    self.peer_pause_ability = false;
                    self.flow_control_active = false;
                    self.push_event(Event::LinkChanged { up: false });
                }
            }
        }

        Ok(state)
    }

    /// Cheap link supervision for an established link.
    ///
    /// One BMSR read; returns `Some(Down)` exactly once when an up link
    /// drops (and queues a `LinkChanged` event), `None` otherwise. After
    /// a loss, [`Self::update_link_status`] renegotiates.
    pub fn poll_link(&mut self) -> Result<Option<LinkState>> {
        let change = self.link.poll(&mut self.smi)?;
        if let Some(LinkState::Down) = change {
            self.peer_pause_ability = false;
            self.flow_control_active = false;
            self.push_event(Event::LinkChanged { up: false });
        }
        Ok(change)
    }

    /// Whether the link was up as of the last update or poll
    #[must_use]
    pub const fn is_link_up(&self) -> bool {
        self.link.is_up()
    }

    /// Negotiated speed and duplex, when the link is up
    #[must_use]
    pub const fn link_info(&self) -> Option<LinkStatus> {
        self.link.link_status()
    }

    /// Link state as of the last update or poll
    #[must_use]
    pub const fn link_state(&self) -> LinkState {
        self.link.state()
    }

    /// Access the link state machine
    #[must_use]
    pub const fn link(&self) -> &LinkManager<Lan8742a> {
        &self.link
    }

    /// Apply a negotiated or forced link mode to the MAC core.
    fn apply_link(&mut self, status: LinkStatus) {
        self.speed = status.speed;
        self.duplex = status.duplex;
        MacRegs::set_speed_100mbps(status.speed == Speed::Mbps100);
        MacRegs::set_duplex_full(status.duplex == Duplex::Full);

        #[cfg(feature = "defmt")]
        defmt::info!("eth: link {} {}", status.speed, status.duplex);
    }

    /// Whether the partner advertised PAUSE in the completed negotiation.
    ///
    /// Forced links (and the fallback after a failed negotiation) never
    /// report PAUSE ability: ANLPAR is stale there.
    fn negotiated_pause_ability(&mut self) -> bool {
        if !self.config.link.auto_negotiation || self.link.fell_back() {
            return false;
        }
        self.link
            .phy()
            .link_partner_abilities(&mut self.smi)
            .map(|caps| caps.pause)
            .unwrap_or(false)
    }

    /// Set the MAC speed directly (no PHY interaction)
    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
        MacRegs::set_speed_100mbps(speed == Speed::Mbps100);
    }

    /// Set the MAC duplex directly (no PHY interaction)
    pub fn set_duplex(&mut self, duplex: Duplex) {
        self.duplex = duplex;
        MacRegs::set_duplex_full(duplex == Duplex::Full);
    }

    /// Set MAC speed and duplex together (no PHY interaction)
    pub fn update_link(&mut self, speed: Speed, duplex: Duplex) {
        self.set_speed(speed);
        self.set_duplex(duplex);
    }

    // =========================================================================
    // MAC Address & Frame Filtering
    // =========================================================================

    /// Change the station address.
    pub fn set_mac_address(&mut self, addr: [u8; 6]) {
        self.mac_addr = addr;
        MacRegs::set_mac_address(&addr);
    }

    /// Enable or disable promiscuous mode (receive everything)
    pub fn set_promiscuous(&mut self, enable: bool) {
        self.config.promiscuous = enable;
        MacRegs::set_promiscuous(enable);
    }

    /// Enable or disable passing all multicast frames
    pub fn set_pass_all_multicast(&mut self, enable: bool) {
        MacRegs::set_pass_all_multicast(enable);
    }

    /// Update the checksum offload configuration.
    ///
    /// Stores the new policy and, once the peripheral has been
    /// initialized, reprograms the MACCR offload bit and the descriptor
    /// insertion flags used for subsequent transmits.
    pub fn set_checksum_config(&mut self, checksum: ChecksumConfig) {
        self.config.checksum = checksum;
        if self.state != State::Uninitialized {
            MacRegs::set_checksum_offload(checksum.rx_checksum);
            let cic = (checksum.tx_checksum as u32) << tdes0::CHECKSUM_INSERT_SHIFT;
            self.dma.set_tx_ctrl_flags(cic & tdes0::CHECKSUM_INSERT_MASK);
        }
    }

    /// Add a perfect destination-address filter.
    ///
    /// Returns the slot used (1-based), or `None` when all
    /// [`MAC_FILTER_SLOTS`](super::config::MAC_FILTER_SLOTS) slots are
    /// occupied.
    pub fn add_mac_filter(&mut self, addr: &[u8; 6]) -> Option<usize> {
        self.add_filter_entry(&MacAddressFilter::new(*addr))
    }

    /// Add a perfect filter from a full filter description.
    ///
    /// [`MacAddressFilter`] additionally selects source-address matching
    /// and per-byte wildcard masks. Returns the slot used (1-based), or
    /// `None` when all slots are occupied.
    pub fn add_filter_entry(&mut self, filter: &MacAddressFilter) -> Option<usize> {
        let slot = MacRegs::find_free_mac_filter_slot()?;
        MacRegs::set_mac_filter(
            slot,
            &filter.address,
            filter.filter_type == MacFilterType::Source,
            filter.byte_mask,
        );
        Some(slot)
    }

    /// Remove a perfect filter by address; `true` when one was removed.
    pub fn remove_mac_filter(&mut self, addr: &[u8; 6]) -> bool {
        match MacRegs::find_mac_filter(addr) {
            Some(slot) => MacRegs::clear_mac_filter(slot),
            None => false,
        }
    }

    /// Disable all perfect filters.
    pub fn clear_mac_filters(&mut self) {
        MacRegs::clear_all_mac_filters();
    }

    /// Number of perfect filter slots currently in use
    #[must_use]
    pub fn mac_filter_count(&self) -> usize {
        (1..=MAC_ADDR_FILTER_COUNT)
            .filter(|&slot| MacRegs::is_mac_filter_enabled(slot) == Some(true))
            .count()
    }

    // =========================================================================
    // Hash Filtering
    // =========================================================================

    /// Add an address to the 64-bit hash filter.
    ///
    /// Takes effect once hash filtering is enabled via
    /// [`Self::enable_hash_multicast`] or [`Self::enable_hash_unicast`].
    pub fn add_hash_filter(&mut self, addr: &[u8; 6]) {
        MacRegs::set_hash_bit(MacRegs::compute_hash_index(addr));
    }

    /// Remove an address's hash bit.
    ///
    /// Other addresses hashing to the same bit lose filtering too; the
    /// hash filter is approximate by nature.
    pub fn remove_hash_filter(&mut self, addr: &[u8; 6]) {
        MacRegs::clear_hash_bit(MacRegs::compute_hash_index(addr));
    }

    /// Whether an address's hash bit is currently set
    #[must_use]
    pub fn check_hash_filter(&self, addr: &[u8; 6]) -> bool {
        MacRegs::is_hash_bit_set(MacRegs::compute_hash_index(addr))
    }

    /// Clear the whole hash table.
    pub fn clear_hash_table(&mut self) {
        MacRegs::clear_hash_table();
    }

    /// Route multicast frames through the hash table instead of passing
    /// them all.
    pub fn enable_hash_multicast(&mut self, enable: bool) {
        MacRegs::enable_hash_multicast(enable);
        // Hash and pass-all are alternatives for multicast
        MacRegs::set_pass_all_multicast(!enable);
    }

    /// Route unicast frames through the hash table as well as the
    /// perfect filters.
    pub fn enable_hash_unicast(&mut self, enable: bool) {
        MacRegs::enable_hash_unicast(enable);
    }

    // =========================================================================
    // VLAN Filtering
    // =========================================================================

    /// Receive only frames tagged with this 12-bit VLAN ID.
    pub fn set_vlan_filter(&mut self, vid: u16) {
        MacRegs::set_vlan_id_filter(vid);
    }

    /// Configure the VLAN filter with a full 16-bit tag comparison.
    pub fn set_vlan_tag_filter(&mut self, tag: u16) {
        MacRegs::configure_vlan_filter(tag, false);
    }

    /// Disable VLAN filtering (match-all tag of zero).
    pub fn clear_vlan_filter(&mut self) {
        MacRegs::clear_vlan_filter();
    }

    /// The currently configured VLAN ID
    #[must_use]
    pub fn vlan_filter_id(&self) -> u16 {
        MacRegs::get_vlan_id_filter()
    }

    // =========================================================================
    // Flow Control
    // =========================================================================

    /// Program MACFCR from the stored flow control configuration.
    fn apply_flow_control(&mut self) {
        let fc = self.config.flow_control;
        MacRegs::configure_flow_control(
            fc.pause_time,
            fc.pause_low_threshold as u8,
            fc.unicast_pause_detect,
            true,
            true,
        );
    }

    /// Send a PAUSE frame with the given quanta (0 resumes the partner).
    fn send_pause(&mut self, pause_time: u16) {
        if MacRegs::is_flow_control_busy() {
            return;
        }
        let fc = self.config.flow_control;
        MacRegs::configure_flow_control(
            pause_time,
            fc.pause_low_threshold as u8,
            fc.unicast_pause_detect,
            true,
            true,
        );
        MacRegs::send_pause_frame(true);
    }

    /// Watermark-based PAUSE management.
    ///
    /// Call periodically (or from the RX path). When free RX descriptors
    /// fall to the low water mark a PAUSE goes out; once the application
    /// has drained back above the high water mark a zero-quanta PAUSE
    /// releases the partner. No-op unless flow control is enabled and the
    /// partner advertised PAUSE.
    pub fn check_flow_control(&mut self) {
        if !self.config.flow_control.enabled || !self.peer_pause_ability {
            return;
        }

        let fc = self.config.flow_control;
        let free = self.dma.rx_free_count();

        if !self.flow_control_active && free <= fc.low_water_mark {
            self.send_pause(fc.pause_time);
            self.flow_control_active = true;

            #[cfg(feature = "defmt")]
            defmt::debug!("eth: pause sent, {} rx descriptors free", free);
        } else if self.flow_control_active && free >= fc.high_water_mark {
            self.send_pause(0);
            self.flow_control_active = false;

            #[cfg(feature = "defmt")]
            defmt::debug!("eth: pause released, {} rx descriptors free", free);
        }
    }

    /// Whether the partner advertised PAUSE in the last negotiation
    #[must_use]
    pub const fn peer_supports_pause(&self) -> bool {
        self.peer_pause_ability
    }

    /// Whether a PAUSE frame is currently holding the partner off
    #[must_use]
    pub const fn is_flow_control_active(&self) -> bool {
        self.flow_control_active
    }

    // =========================================================================
    // PHY Register Access
    // =========================================================================

    /// Read a PHY register over SMI.
    pub fn read_phy_reg(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        self.smi.read(phy_addr, reg_addr)
    }

    /// Write a PHY register over SMI.
    pub fn write_phy_reg(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.smi.write(phy_addr, reg_addr, value)
    }

    // =========================================================================
    // Interrupt Handling
    // =========================================================================

    /// Snapshot the DMA interrupt status without clearing it
    #[must_use]
    pub fn interrupt_status(&self) -> InterruptStatus {
        InterruptStatus::from_raw(DmaRegs::status())
    }

    /// Acknowledge the given interrupt flags
    pub fn clear_interrupts(&mut self, status: InterruptStatus) {
        DmaRegs::set_status(status.to_raw());
    }

    /// Acknowledge every pending interrupt flag
    pub fn clear_all_interrupts(&mut self) {
        DmaRegs::clear_all_interrupts();
    }

    /// Enable the default interrupt set (RX, TX, error summaries)
    pub fn enable_interrupts(&mut self) {
        DmaRegs::enable_default_interrupts();
    }

    /// Mask all DMA interrupts
    pub fn disable_interrupts(&mut self) {
        DmaRegs::disable_all_interrupts();
    }

    /// Service the Ethernet interrupt.
    ///
    /// Call from the ETH IRQ handler. Acknowledges the pending flags,
    /// reclaims completed TX descriptors, restarts a starved receiver and
    /// queues the corresponding [`Event`]s for [`Self::poll_events`].
    /// Returns the parsed status so the handler can react directly.
    pub fn handle_interrupt(&mut self) -> InterruptStatus {
        let status = self.interrupt_status();
        self.clear_interrupts(status);

        if status.rx_complete {
            // At least one frame landed even if the count scan races the app
            let frames = (self.dma.rx_frame_count() as u32).max(1);
            self.push_event(Event::Received { frames });
        }

        if status.tx_complete {
            let (frames, _errors) = self.dma.reclaim_transmitted();
            if frames > 0 {
                self.push_event(Event::Transmitted {
                    frames: frames as u32,
                });
            }
        }

        if status.rx_buf_unavailable || status.rx_overflow {
            // Receiver suspended for lack of descriptors; the poll demand
            // restarts it once buffers are free again.
            DmaRegs::resume_rx();
        }

        if status.has_error() {
            self.push_event(Event::Error {
                dma_status: status.to_raw(),
            });

            #[cfg(feature = "defmt")]
            if status.fatal_bus_error {
                defmt::error!("eth: fatal bus error, DMASR {:#010x}", status.to_raw());
            }
        }

        status
    }

    // =========================================================================
    // Events & Callbacks
    // =========================================================================

    /// Register (or replace) the handler for one event kind.
    pub fn register_callback(&mut self, kind: EventKind, handler: EventHandler) {
        self.callbacks.register(kind, handler);
    }

    /// Remove the handler for one event kind.
    pub fn unregister_callback(&mut self, kind: EventKind) {
        self.callbacks.unregister(kind);
    }

    /// Whether a handler is registered for this kind
    #[must_use]
    pub fn is_callback_registered(&self, kind: EventKind) -> bool {
        self.callbacks.is_registered(kind)
    }

    /// Drain the event queue, invoking registered handlers.
    ///
    /// Handlers run here, in the caller's context, never in the
    /// interrupt. Events without a handler are discarded. Returns the
    /// number of events drained.
    pub fn poll_events(&mut self) -> usize {
        let mut drained = 0;
        while let Some(event) = self.events.pop() {
            self.callbacks.dispatch(event);
            drained += 1;
        }
        drained
    }

    /// Events waiting to be drained
    #[must_use]
    pub const fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Events dropped because the queue was full
    #[must_use]
    pub const fn events_dropped(&self) -> u32 {
        self.events.dropped_count()
    }

    /// Queue an event; overflow is counted and logged by the queue.
    fn push_event(&mut self, event: Event) {
        let _ = self.events.push(event);
    }

    // =========================================================================
    // Debug & Statistics
    // =========================================================================

    /// RX frames dropped by the engine (errored or flushed)
    #[must_use]
    pub fn rx_dropped(&self) -> u32 {
        self.dma.rx_dropped()
    }

    /// TX frames that completed with an error status
    #[must_use]
    pub fn tx_errors(&self) -> u32 {
        self.dma.tx_error_count()
    }

    /// Read and clear the hardware missed-frame counters.
    ///
    /// Returns `(missed_by_dma, missed_by_application)`.
    pub fn take_missed_frame_counts(&mut self) -> (u16, u16) {
        DmaRegs::take_missed_frame_counts()
    }

    /// Current `(rx, tx)` DMA process states (0 = stopped)
    #[must_use]
    pub fn dma_process_states(&self) -> (u32, u32) {
        let status = DmaRegs::status();
        (
            RxProcessState::from(status) as u32,
            TxProcessState::from(status) as u32,
        )
    }

    /// Dump the main register blocks through defmt.
    #[cfg(feature = "defmt")]
    pub fn log_registers(&self) {
        defmt::debug!(
            "eth: MACCR={:#010x} MACFFR={:#010x} MACFCR={:#010x}",
            MacRegs::config(),
            MacRegs::frame_filter(),
            MacRegs::flow_control(),
        );
        defmt::debug!(
            "eth: DMABMR={:#010x} DMAOMR={:#010x} DMASR={:#010x} DMAIER={:#010x}",
            DmaRegs::bus_mode(),
            DmaRegs::operation_mode(),
            DmaRegs::status(),
            DmaRegs::interrupt_enable(),
        );
        defmt::debug!(
            "eth: rx_ring={:#010x} tx_ring={:#010x} rx_dropped={} tx_errors={}",
            self.dma.rx_ring_addr(),
            self.dma.tx_ring_addr(),
            self.dma.rx_dropped(),
            self.dma.tx_error_count(),
        );
    }
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> Default
    for EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> MdioBus
    for EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>
{
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        self.smi.read(phy_addr, reg_addr)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.smi.write(phy_addr, reg_addr, value)
    }

    fn is_busy(&self) -> bool {
        self.smi.is_busy()
    }
}

// =============================================================================
// Common Configurations
// =============================================================================

/// Default driver: 10 RX and 10 TX buffers of 1600 bytes
pub type EthMacDefault = EthMac<DEFAULT_RX_BUFFERS, DEFAULT_TX_BUFFERS, DEFAULT_BUFFER_SIZE>;

/// Small-footprint driver: 4+4 buffers of 1600 bytes
pub type EthMacSmall = EthMac<4, 4, DEFAULT_BUFFER_SIZE>;

/// High-throughput driver: 16+16 buffers of 1600 bytes
pub type EthMacLarge = EthMac<16, 16, DEFAULT_BUFFER_SIZE>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;

    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    // =========================================================================
    // Construction Tests
    // =========================================================================

    #[test]
    fn new_starts_uninitialized() {
        let mac = EthMacSmall::new();
        assert_eq!(mac.state(), State::Uninitialized);
        assert_eq!(mac.mac_address(), EthConfig::new().mac_address);
        assert_eq!(mac.speed(), Speed::Mbps100);
        assert_eq!(mac.duplex(), Duplex::Full);
        assert_eq!(mac.pending_events(), 0);
        assert_eq!(mac.events_dropped(), 0);
        assert!(!mac.peer_supports_pause());
        assert!(!mac.is_flow_control_active());
    }

    #[test]
    fn new_reports_link_down() {
        let mac = EthMacSmall::new();
        assert!(!mac.is_link_up());
        assert_eq!(mac.link_state(), LinkState::Down);
        assert!(mac.link_info().is_none());
    }

    #[test]
    fn fresh_rings_are_idle() {
        let mac = EthMacSmall::new();
        assert_eq!(mac.tx_available(), 4);
        assert!(!mac.rx_available());
        assert_eq!(mac.rx_frame_count(), 0);
        assert_eq!(mac.peek_frame_length(), None);
        assert_eq!(mac.rx_dropped(), 0);
        assert_eq!(mac.tx_errors(), 0);
    }

    #[test]
    fn default_matches_new() {
        let mac = EthMacSmall::default();
        assert_eq!(mac.state(), State::Uninitialized);
        assert_eq!(mac.speed(), Speed::Mbps100);
    }

    #[test]
    fn memory_usage_scales_with_rings() {
        assert!(EthMacLarge::memory_usage() > EthMacSmall::memory_usage());
        // Dominated by the ring buffers
        assert!(EthMacSmall::memory_usage() > 8 * DEFAULT_BUFFER_SIZE);
    }

    // =========================================================================
    // State Gating Tests
    // =========================================================================

    #[test]
    fn init_rejects_invalid_phy_addr() {
        let mut mac = EthMacSmall::new();
        let mut delay = crate::testing::MockDelay::new();
        let config = EthConfig::new().with_phy_addr(32);

        assert!(matches!(
            mac.init(config, &mut delay),
            Err(Error::Config(ConfigError::InvalidPhyAddress))
        ));
        assert_eq!(mac.state(), State::Uninitialized);
    }

    #[test]
    fn init_twice_is_rejected() {
        let mut mac = EthMacSmall::new();
        mac.state = State::Initialized;
        let mut delay = crate::testing::MockDelay::new();

        assert!(matches!(
            mac.init(EthConfig::new(), &mut delay),
            Err(Error::Config(ConfigError::AlreadyInitialized))
        ));
    }

    #[test]
    fn start_requires_init() {
        let mut mac = EthMacSmall::new();
        assert!(matches!(
            mac.start(),
            Err(Error::Io(IoError::InvalidState))
        ));
    }

    #[test]
    fn start_when_running_is_idempotent() {
        let mut mac = EthMacSmall::new();
        mac.state = State::Running;
        assert!(mac.start().is_ok());
        assert_eq!(mac.state(), State::Running);
    }

    #[test]
    fn stop_requires_running() {
        let mut mac = EthMacSmall::new();
        assert!(matches!(mac.stop(), Err(Error::Io(IoError::InvalidState))));

        mac.state = State::Initialized;
        assert!(matches!(mac.stop(), Err(Error::Io(IoError::InvalidState))));
    }

    #[test]
    fn stop_when_stopped_is_idempotent() {
        let mut mac = EthMacSmall::new();
        mac.state = State::Stopped;
        assert!(mac.stop().is_ok());
        assert_eq!(mac.state(), State::Stopped);
    }

    #[test]
    fn transmit_requires_running() {
        let mut mac = EthMacSmall::new();
        let frame = [0u8; 64];
        assert!(matches!(
            mac.transmit(&frame),
            Err(Error::Io(IoError::InvalidState))
        ));
    }

    #[test]
    fn receive_requires_running() {
        let mut mac = EthMacSmall::new();
        assert!(matches!(
            mac.receive_frame(),
            Err(Error::Io(IoError::InvalidState))
        ));

        let mut buf = [0u8; 128];
        assert!(matches!(
            mac.receive(&mut buf),
            Err(Error::Io(IoError::InvalidState))
        ));
    }

    // =========================================================================
    // Frame Info Tests
    // =========================================================================

    #[test]
    fn frame_info_is_copy_and_comparable() {
        let info = FrameInfo {
            first_index: 2,
            descriptor_count: 1,
            length: 60,
        };
        let copy = info;
        assert_eq!(copy, info);
        assert_eq!(copy.length, 60);
    }

    // =========================================================================
    // Event & Callback Tests
    // =========================================================================

    #[test]
    fn callback_registration_round_trip() {
        fn on_rx(_event: Event) {}

        let mut mac = EthMacSmall::new();
        assert!(!mac.is_callback_registered(EventKind::Received));

        mac.register_callback(EventKind::Received, on_rx);
        assert!(mac.is_callback_registered(EventKind::Received));
        assert!(!mac.is_callback_registered(EventKind::Transmitted));

        mac.unregister_callback(EventKind::Received);
        assert!(!mac.is_callback_registered(EventKind::Received));
    }

    #[test]
    fn poll_events_on_empty_queue_returns_zero() {
        let mut mac = EthMacSmall::new();
        assert_eq!(mac.poll_events(), 0);
    }

    #[test]
    fn poll_events_dispatches_queued_events() {
        static LINK_HITS: AtomicUsize = AtomicUsize::new(0);

        fn on_link(event: Event) {
            assert!(matches!(event, Event::LinkChanged { .. }));
            LINK_HITS.fetch_add(1, Ordering::Relaxed);
        }

        let mut mac = EthMacSmall::new();
        mac.register_callback(EventKind::LinkChanged, on_link);

        mac.push_event(Event::LinkChanged { up: true });
        mac.push_event(Event::LinkChanged { up: false });
        // No handler: drained but not dispatched
        mac.push_event(Event::Transmitted { frames: 1 });
        assert_eq!(mac.pending_events(), 3);

        assert_eq!(mac.poll_events(), 3);
        assert_eq!(mac.pending_events(), 0);
        assert_eq!(LINK_HITS.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn event_queue_overflow_is_counted() {
        let mut mac = EthMacSmall::new();

        for i in 0..(DEFAULT_EVENT_CAPACITY as u32 + 2) {
            mac.push_event(Event::Received { frames: i });
        }

        assert_eq!(mac.pending_events(), DEFAULT_EVENT_CAPACITY);
        assert_eq!(mac.events_dropped(), 2);

        // Oldest events survive; the overflow dropped the newest
        assert_eq!(mac.events.pop(), Some(Event::Received { frames: 0 }));
    }
}
