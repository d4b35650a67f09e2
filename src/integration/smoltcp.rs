//! smoltcp Network Stack Integration
#![cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
//!
//! Implements [`smoltcp::phy::Device`] for [`EthMac`], so the driver can
//! sit directly under a [smoltcp](https://docs.rs/smoltcp) interface.
//!
//! # Example
//!
//! ```ignore
//! use smoltcp::iface::{Config, Interface, SocketSet};
//! use smoltcp::wire::{EthernetAddress, IpCidr};
//! use ph_stm32_eth::{EthConfig, EthMacDefault};
//!
//! static mut ETH: EthMacDefault = EthMacDefault::new();
//! let eth = unsafe { &mut ETH };
//! eth.init(EthConfig::nucleo_default(), &mut delay).unwrap();
//! eth.start().unwrap();
//!
//! let config = Config::new(EthernetAddress(eth.mac_address()).into());
//! let mut iface = Interface::new(config, eth, smoltcp::time::Instant::ZERO);
//!
//! iface.update_ip_addrs(|addrs| {
//!     addrs.push(IpCidr::new(IpAddress::v4(192, 168, 1, 100), 24)).unwrap();
//! });
//! ```
//!
//! Only compiled with the `smoltcp` feature:
//! ```toml
//! [dependencies]
//! ph-stm32-eth = { version = "0.1", features = ["smoltcp"] }
//! ```
//!
//! # Why the tokens hold raw pointers
//!
//! `Device::receive()` must hand out an RX token and a TX token over the
//! same driver at once, which two `&mut` borrows cannot express. The
//! tokens therefore store `*mut EthMac` and rebuild the reference inside
//! `consume()`. That stays sound because each token is consumed by value
//! before the interface touches the driver again, the two directions run
//! on disjoint descriptor rings and buffer pools, and `PhantomData`
//! pins the tokens to the borrow of the driver they came from. The same
//! shape appears in embassy-net and stm32-eth.

use core::marker::PhantomData;

use crate::driver::config::{State, TxChecksumMode};
use crate::driver::mac::EthMac;
use crate::internal::constants::{MAX_FRAME_SIZE, MTU};

use smoltcp::phy::{Checksum, ChecksumCapabilities, Device, DeviceCapabilities, Medium};
use smoltcp::time::Instant;

// =============================================================================
// RX Token
// =============================================================================

/// One receivable frame, handed to smoltcp for consumption.
///
/// Carries a raw driver pointer; see the module docs for why that is
/// sound. Part of the [`Device`] plumbing, rarely named directly.
pub struct EthRxToken<'a, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> {
    mac: *mut EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>,
    _borrow: PhantomData<&'a mut EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>>,
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    EthRxToken<'_, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    fn over(mac: *mut EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>) -> Self {
        Self {
            mac,
            _borrow: PhantomData,
        }
    }
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> smoltcp::phy::RxToken
    for EthRxToken<'_, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        // A frame may span descriptors, so reassemble it into one stack
        // buffer instead of exposing a ring slice.
        let mut frame = [0u8; MAX_FRAME_SIZE];

        // SAFETY: pointer valid for 'a; consumed by value so the driver
        // is not aliased, and RX runs on its own ring.
        let mac = unsafe { &mut *self.mac };
        let len = mac.receive(&mut frame).unwrap_or_default();

        f(&frame[..len])
    }
}

// =============================================================================
// TX Token
// =============================================================================

/// Permission to transmit one frame.
///
/// Carries a raw driver pointer; see the module docs for why that is
/// sound. Part of the [`Device`] plumbing, rarely named directly.
pub struct EthTxToken<'a, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> {
    mac: *mut EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>,
    _borrow: PhantomData<&'a mut EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>>,
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    EthTxToken<'_, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    fn over(mac: *mut EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>) -> Self {
        Self {
            mac,
            _borrow: PhantomData,
        }
    }
}

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> smoltcp::phy::TxToken
    for EthTxToken<'_, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let len = len.min(MAX_FRAME_SIZE);
        let mut frame = [0u8; MAX_FRAME_SIZE];

        // smoltcp writes the outgoing frame into the scratch buffer
        let result = f(&mut frame[..len]);

        // SAFETY: pointer valid for 'a; consumed by value so the driver
        // is not aliased, and TX runs on its own ring.
        let mac = unsafe { &mut *self.mac };

        // a full ring is not reported; smoltcp retries on its own
        let _ = mac.transmit(&frame[..len]);

        result
    }
}

// =============================================================================
// Device Implementation
// =============================================================================

impl<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> Device
    for EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>
{
    type RxToken<'a>
        = EthRxToken<'a, RX_BUFS, TX_BUFS, BUF_SIZE>
    where
        Self: 'a;
    type TxToken<'a>
        = EthTxToken<'a, RX_BUFS, TX_BUFS, BUF_SIZE>
    where
        Self: 'a;

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        if self.state() != State::Running || !self.rx_available() {
            return None;
        }

        // Both tokens must come back together; see the module docs for
        // the aliasing argument.
        let raw = self as *mut Self;
        Some((EthRxToken::over(raw), EthTxToken::over(raw)))
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        if self.state() != State::Running {
            return None;
        }

        // try to free a descriptor before declaring the ring full
        if self.tx_available() == 0 {
            self.reclaim_transmitted();
            if self.tx_available() == 0 {
                return None;
            }
        }

        Some(EthTxToken::over(self as *mut Self))
    }

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();
        caps.medium = Medium::Ethernet;
        caps.max_transmission_unit = MTU;
        // one frame per token, no scatter-gather toward smoltcp
        caps.max_burst_size = Some(1);

        // `Checksum` names the work LEFT to smoltcp, so `None` means the
        // hardware already covers both directions.
        let rx_offloaded = self.config().checksum.rx_checksum;
        let still_needed = |tx_offloaded: bool| match (tx_offloaded, rx_offloaded) {
            (true, true) => Checksum::None,
            (true, false) => Checksum::Rx,
            (false, true) => Checksum::Tx,
            (false, false) => Checksum::Both,
        };

        // The pseudo-header sum only goes in under Full, so TCP/UDP stay
        // in software below that. ICMP carries no pseudo-header and is
        // offloaded from IpAndPayload up.
        let tx_mode = self.config().checksum.tx_checksum;
        caps.checksum = ChecksumCapabilities::default();
        caps.checksum.ipv4 = still_needed(tx_mode != TxChecksumMode::Disabled);
        caps.checksum.udp = still_needed(tx_mode == TxChecksumMode::Full);
        caps.checksum.tcp = still_needed(tx_mode == TxChecksumMode::Full);
        caps.checksum.icmpv4 = still_needed(matches!(
            tx_mode,
            TxChecksumMode::IpAndPayload | TxChecksumMode::Full
        ));

        caps
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// The driver's MAC address as a smoltcp [`EthernetAddress`](smoltcp::wire::EthernetAddress),
/// ready for an interface `Config`.
pub fn ethernet_address<const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>(
    eth: &EthMac<RX_BUFS, TX_BUFS, BUF_SIZE>,
) -> smoltcp::wire::EthernetAddress {
    smoltcp::wire::EthernetAddress(eth.mac_address())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::{ChecksumConfig, EthConfig};
    use crate::driver::mac::EthMacDefault;

    #[test]
    fn frame_bounds_match_ethernet() {
        // 1500-byte MTU, 1522-byte tagged maximum on the wire
        assert_eq!(MTU, 1500);
        assert_eq!(MAX_FRAME_SIZE, 1522);
    }

    #[test]
    fn device_reports_single_frame_ethernet() {
        let caps = EthMacDefault::new().capabilities();

        assert_eq!(caps.medium, Medium::Ethernet);
        assert_eq!(caps.max_transmission_unit, MTU);
        assert_eq!(caps.max_burst_size, Some(1));
    }

    #[test]
    fn no_offload_leaves_all_checksums_to_smoltcp() {
        let caps = EthMacDefault::new().capabilities();

        assert!(matches!(caps.checksum.ipv4, Checksum::Both));
        assert!(matches!(caps.checksum.tcp, Checksum::Both));
        assert!(matches!(caps.checksum.udp, Checksum::Both));
        assert!(matches!(caps.checksum.icmpv4, Checksum::Both));
    }

    #[test]
    fn full_offload_takes_over_all_checksums() {
        let mut eth = EthMacDefault::new();
        eth.set_checksum_config(ChecksumConfig {
            rx_checksum: true,
            tx_checksum: TxChecksumMode::Full,
        });

        let caps = eth.capabilities();
        assert!(matches!(caps.checksum.ipv4, Checksum::None));
        assert!(matches!(caps.checksum.tcp, Checksum::None));
        assert!(matches!(caps.checksum.udp, Checksum::None));
    }

    #[test]
    fn header_only_offload_keeps_transport_sums_in_software() {
        let mut eth = EthMacDefault::new();
        eth.set_checksum_config(ChecksumConfig {
            rx_checksum: false,
            tx_checksum: TxChecksumMode::IpHeaderOnly,
        });

        let caps = eth.capabilities();
        // header insertion is covered, verification on RX is not
        assert!(matches!(caps.checksum.ipv4, Checksum::Rx));
        // hardware never computes the pseudo-header in this mode
        assert!(matches!(caps.checksum.tcp, Checksum::Both));
        assert!(matches!(caps.checksum.udp, Checksum::Both));
    }

    #[test]
    fn tokens_require_a_running_driver() {
        let mut eth = EthMacDefault::new();
        assert_eq!(eth.state(), State::Uninitialized);

        assert!(Device::receive(&mut eth, Instant::ZERO).is_none());
        assert!(Device::transmit(&mut eth, Instant::ZERO).is_none());
    }

    #[test]
    fn borrow_marker_adds_no_size() {
        assert_eq!(
            core::mem::size_of::<PhantomData<&mut EthMac<10, 10, 1600>>>(),
            0
        );
    }

    #[test]
    fn offload_config_flows_into_the_device() {
        let config = EthConfig::nucleo_default().with_rx_checksum(true);
        assert!(config.checksum.rx_checksum);
    }
}
