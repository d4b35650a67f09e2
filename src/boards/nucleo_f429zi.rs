//! NUCLEO-F429ZI board configuration (STM32F429ZI + LAN8742A).
//!
//! This module provides constants and helpers for the ST Nucleo-144 boards,
//! which wire the on-chip MAC to a LAN8742A-CZ over RMII. It is intended as
//! the canonical "happy path" for Nucleo bring-up code.
//!
//! The F7 Nucleo-144 boards (NUCLEO-F746ZG, NUCLEO-F767ZI) use the identical
//! Ethernet wiring, so these pin assignments apply to them unchanged.

use crate::driver::config::{EthConfig, PhyInterface};
use crate::phy::Lan8742a;

/// NUCLEO-F429ZI board configuration constants and helpers.
pub struct NucleoF429zi;

impl NucleoF429zi {
    // =========================================================================
    // PHY Configuration
    // =========================================================================

    /// PHY address (all LAN8742A straps are pulled LOW on the Nucleo-144).
    pub const PHY_ADDR: u8 = 0;

    /// Expected PHY ID (LAN8742A = 0x0007C13x).
    pub const PHY_ID: u32 = 0x0007_C130;

    /// PHY ID mask (ignores revision nibble).
    pub const PHY_ID_MASK: u32 = 0xFFFF_FFF0;

    // =========================================================================
    // SMI (MDIO) Pins
    // =========================================================================

    /// MDC (Management Data Clock) pin.
    pub const MDC_PIN: &'static str = "PC1";

    /// MDIO (Management Data I/O) pin.
    pub const MDIO_PIN: &'static str = "PA2";

    // =========================================================================
    // Clock Configuration
    // =========================================================================

    /// Reference clock input pin (50 MHz, driven by the PHY).
    pub const REF_CLK_PIN: &'static str = "PA1";

    /// Reference clock frequency in Hz.
    pub const REF_CLK_HZ: u32 = 50_000_000;

    /// Maximum AHB clock on the STM32F429 in Hz.
    ///
    /// Pass the real HCLK to [`EthConfig::with_hclk_hz`] when the clock tree
    /// runs slower; the default assumes this maximum, which always yields a
    /// safe MDC divider.
    pub const MAX_HCLK_HZ: u32 = 180_000_000;

    // =========================================================================
    // RMII Data Pins
    // =========================================================================

    /// Carrier Sense / Data Valid pin.
    pub const CRS_DV_PIN: &'static str = "PA7";

    /// RX Data 0 pin.
    pub const RXD0_PIN: &'static str = "PC4";

    /// RX Data 1 pin.
    pub const RXD1_PIN: &'static str = "PC5";

    /// TX Enable pin.
    pub const TX_EN_PIN: &'static str = "PG11";

    /// TX Data 0 pin.
    pub const TXD0_PIN: &'static str = "PG13";

    /// TX Data 1 pin.
    pub const TXD1_PIN: &'static str = "PB13";

    /// Alternate function number for every Ethernet pin (AF11 on F4/F7).
    pub const ETH_AF: u8 = 11;

    // =========================================================================
    // Reset Configuration
    // =========================================================================

    /// PHY reset pin (None = wired to board NRST, use soft reset).
    pub const PHY_RST_PIN: Option<&'static str> = None;

    /// Time to wait after PHY power-up or reset (milliseconds).
    pub const PHY_RESET_MS: u32 = 50;

    // =========================================================================
    // Board Identification
    // =========================================================================

    /// Board name.
    pub const BOARD_NAME: &'static str = "NUCLEO-F429ZI";

    /// Board manufacturer.
    pub const MANUFACTURER: &'static str = "STMicroelectronics";

    /// MCU on board.
    pub const MCU: &'static str = "STM32F429ZIT6";

    // =========================================================================
    // Helper Methods
    // =========================================================================

    /// Check if a PHY ID matches the expected LAN8742A pattern.
    #[inline]
    pub const fn is_valid_phy_id(id: u32) -> bool {
        (id & Self::PHY_ID_MASK) == Self::PHY_ID
    }

    /// Return the default driver configuration for the Nucleo-144.
    ///
    /// # Returns
    ///
    /// A configuration using RMII with the LAN8742A at PHY address 0 and the
    /// MDC divider derived from the maximum F429 HCLK.
    #[must_use]
    pub const fn eth_config() -> EthConfig {
        EthConfig::nucleo_default()
            .with_phy_interface(PhyInterface::Rmii)
            .with_phy_addr(Self::PHY_ADDR)
            .with_hclk_hz(Self::MAX_HCLK_HZ)
    }

    /// Return the default driver configuration with a custom MAC address.
    ///
    /// # Arguments
    ///
    /// * `mac` - 6-byte MAC address.
    #[must_use]
    pub const fn eth_config_with_mac(mac: [u8; 6]) -> EthConfig {
        Self::eth_config().with_mac_address(mac)
    }

    /// Construct a LAN8742A PHY driver using the board's PHY address.
    #[must_use]
    pub const fn lan8742a() -> Lan8742a {
        Lan8742a::new(Self::PHY_ADDR)
    }

    /// Get a human-readable description of the board.
    #[must_use]
    pub const fn description() -> &'static str {
        "NUCLEO-F429ZI: STM32F429ZI + LAN8742A Ethernet (RMII, PHY addr 0)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::PhyDriver;

    #[test]
    fn phy_id_validation() {
        assert!(NucleoF429zi::is_valid_phy_id(0x0007_C130));
        assert!(NucleoF429zi::is_valid_phy_id(0x0007_C131));
        assert!(NucleoF429zi::is_valid_phy_id(0x0007_C13F));
        assert!(!NucleoF429zi::is_valid_phy_id(0x0007_C0F1));
        assert!(!NucleoF429zi::is_valid_phy_id(0x0022_1556));
    }

    #[test]
    fn config_uses_board_wiring() {
        let config = NucleoF429zi::eth_config();
        assert_eq!(config.phy_interface, PhyInterface::Rmii);
        assert_eq!(config.phy_addr, NucleoF429zi::PHY_ADDR);
        assert_eq!(config.hclk_hz, NucleoF429zi::MAX_HCLK_HZ);
    }

    #[test]
    fn config_with_mac_overrides_address() {
        let mac = [0x02, 0x12, 0x34, 0x56, 0x78, 0x9A];
        let config = NucleoF429zi::eth_config_with_mac(mac);
        assert_eq!(config.mac_address, mac);
    }

    #[test]
    fn phy_uses_board_address() {
        let phy = NucleoF429zi::lan8742a();
        assert_eq!(phy.address(), NucleoF429zi::PHY_ADDR);
    }
}
