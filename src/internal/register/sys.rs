//! System-Level Register Definitions
//!
//! RCC and SYSCFG registers needed to bring up the ETH peripheral:
//! - RCC AHB1ENR: MAC, MAC-TX and MAC-RX kernel clock enables
//! - RCC AHB1RSTR: ETH peripheral reset
//! - RCC APB2ENR: SYSCFG clock enable (needed before touching SYSCFG)
//! - SYSCFG PMC: MII/RMII pinout selection
//!
//! Only the bits relevant to Ethernet bring-up are defined here.

use super::{
    read_reg, reg_ro, reg_rw, write_reg, RCC_BASE, SYSCFG_BASE,
};

// =============================================================================
// Register Offsets
// =============================================================================

/// RCC AHB1 peripheral reset register offset
pub const RCC_AHB1RSTR_OFFSET: usize = 0x10;
/// RCC AHB1 peripheral clock enable register offset
pub const RCC_AHB1ENR_OFFSET: usize = 0x30;
/// RCC APB2 peripheral clock enable register offset
pub const RCC_APB2ENR_OFFSET: usize = 0x44;

/// SYSCFG peripheral mode configuration register offset
pub const SYSCFG_PMC_OFFSET: usize = 0x04;

// =============================================================================
// RCC AHB1RSTR Bits
// =============================================================================

/// Ethernet MAC reset
pub const RCC_AHB1RSTR_ETHMACRST: u32 = 1 << 25;

// =============================================================================
// RCC AHB1ENR Bits
// =============================================================================

/// Ethernet MAC clock enable
pub const RCC_AHB1ENR_ETHMACEN: u32 = 1 << 25;
/// Ethernet MAC transmission clock enable
pub const RCC_AHB1ENR_ETHMACTXEN: u32 = 1 << 26;
/// Ethernet MAC reception clock enable
pub const RCC_AHB1ENR_ETHMACRXEN: u32 = 1 << 27;
/// Ethernet MAC PTP clock enable
pub const RCC_AHB1ENR_ETHMACPTPEN: u32 = 1 << 28;

/// All three kernel clocks needed for normal operation
pub const RCC_AHB1ENR_ETH_ALL: u32 =
    RCC_AHB1ENR_ETHMACEN | RCC_AHB1ENR_ETHMACTXEN | RCC_AHB1ENR_ETHMACRXEN;

// =============================================================================
// RCC APB2ENR Bits
// =============================================================================

/// SYSCFG clock enable
pub const RCC_APB2ENR_SYSCFGEN: u32 = 1 << 14;

// =============================================================================
// SYSCFG PMC Bits
// =============================================================================

/// Ethernet PHY interface selection: 0 = MII, 1 = RMII
///
/// Must be written while the MAC is held in reset and its clocks are
/// disabled, otherwise the selection does not take effect.
pub const SYSCFG_PMC_MII_RMII_SEL: u32 = 1 << 23;

// =============================================================================
// System Register Access Functions
// =============================================================================

/// System register block (RCC + SYSCFG glue) for type-safe access
pub struct SysRegs;

impl SysRegs {
    // -------------------------------------------------------------------------
    // Register accessors (generated by macros)
    // -------------------------------------------------------------------------

    reg_rw!(ahb1_enable, set_ahb1_enable, RCC_BASE, RCC_AHB1ENR_OFFSET, "AHB1 clock enable register");
    reg_rw!(ahb1_reset, set_ahb1_reset, RCC_BASE, RCC_AHB1RSTR_OFFSET, "AHB1 reset register");
    reg_rw!(pmc, set_pmc, SYSCFG_BASE, SYSCFG_PMC_OFFSET, "SYSCFG peripheral mode register");

    reg_ro!(apb2_enable, RCC_BASE, RCC_APB2ENR_OFFSET, "APB2 clock enable register");

    // -------------------------------------------------------------------------
    // Clock control helpers
    // -------------------------------------------------------------------------

    /// Enable the SYSCFG clock
    ///
    /// SYSCFG must be clocked before the MII/RMII selection in
    /// `SYSCFG_PMC` can be written.
    #[inline(always)]
    pub fn enable_syscfg_clock() {
        unsafe {
            let current = read_reg(RCC_BASE + RCC_APB2ENR_OFFSET);
            write_reg(RCC_BASE + RCC_APB2ENR_OFFSET, current | RCC_APB2ENR_SYSCFGEN);
        }
    }

    /// Enable the ETH kernel clocks (MAC, MAC-TX, MAC-RX)
    ///
    /// This MUST be called before accessing any ETH registers. Without
    /// it the peripheral is not clocked and register access will fail
    /// or return garbage.
    #[inline(always)]
    pub fn enable_eth_clocks() {
        unsafe {
            let current = read_reg(RCC_BASE + RCC_AHB1ENR_OFFSET);

            #[cfg(feature = "defmt")]
            defmt::debug!(
                "RCC AHB1ENR before: {:#010x} (ETHMACEN bit 25 = {})",
                current,
                (current >> 25) & 1
            );

            let new_val = current | RCC_AHB1ENR_ETH_ALL;
            write_reg(RCC_BASE + RCC_AHB1ENR_OFFSET, new_val);

            #[cfg(feature = "defmt")]
            {
                let readback = read_reg(RCC_BASE + RCC_AHB1ENR_OFFSET);
                defmt::debug!(
                    "RCC AHB1ENR after: {:#010x} (ETHMACEN bit 25 = {})",
                    readback,
                    (readback >> 25) & 1
                );
            }
        }
    }

    /// Disable the ETH kernel clocks
    #[inline(always)]
    pub fn disable_eth_clocks() {
        unsafe {
            let current = read_reg(RCC_BASE + RCC_AHB1ENR_OFFSET);
            write_reg(RCC_BASE + RCC_AHB1ENR_OFFSET, current & !RCC_AHB1ENR_ETH_ALL);
        }
    }

    /// Check whether the ETH kernel clocks are enabled
    #[inline(always)]
    pub fn eth_clocks_enabled() -> bool {
        unsafe {
            (read_reg(RCC_BASE + RCC_AHB1ENR_OFFSET) & RCC_AHB1ENR_ETH_ALL) == RCC_AHB1ENR_ETH_ALL
        }
    }

    // -------------------------------------------------------------------------
    // Peripheral reset helpers
    // -------------------------------------------------------------------------

    /// Assert the ETH peripheral reset
    #[inline(always)]
    pub fn assert_eth_reset() {
        unsafe {
            let current = read_reg(RCC_BASE + RCC_AHB1RSTR_OFFSET);
            write_reg(RCC_BASE + RCC_AHB1RSTR_OFFSET, current | RCC_AHB1RSTR_ETHMACRST);
        }
    }

    /// Release the ETH peripheral reset
    #[inline(always)]
    pub fn release_eth_reset() {
        unsafe {
            let current = read_reg(RCC_BASE + RCC_AHB1RSTR_OFFSET);
            write_reg(RCC_BASE + RCC_AHB1RSTR_OFFSET, current & !RCC_AHB1RSTR_ETHMACRST);
        }
    }

    /// Check whether the ETH peripheral reset is currently asserted
    #[inline(always)]
    pub fn is_eth_reset_asserted() -> bool {
        unsafe { (read_reg(RCC_BASE + RCC_AHB1RSTR_OFFSET) & RCC_AHB1RSTR_ETHMACRST) != 0 }
    }

    // -------------------------------------------------------------------------
    // PHY interface helpers
    // -------------------------------------------------------------------------

    /// Configure for RMII mode
    ///
    /// Sets MII_RMII_SEL = 1. The MAC must be held in reset while this
    /// is written for the selection to latch.
    #[inline(always)]
    pub fn set_rmii_mode() {
        unsafe {
            let pmc = read_reg(SYSCFG_BASE + SYSCFG_PMC_OFFSET);
            let new_val = pmc | SYSCFG_PMC_MII_RMII_SEL;
            write_reg(SYSCFG_BASE + SYSCFG_PMC_OFFSET, new_val);

            #[cfg(feature = "defmt")]
            defmt::debug!("SYSCFG_PMC set RMII mode: {:#010x}", new_val);
        }
    }

    /// Configure for MII mode
    ///
    /// Clears MII_RMII_SEL. The MAC must be held in reset while this
    /// is written for the selection to latch.
    #[inline(always)]
    pub fn set_mii_mode() {
        unsafe {
            let pmc = read_reg(SYSCFG_BASE + SYSCFG_PMC_OFFSET);
            let new_val = pmc & !SYSCFG_PMC_MII_RMII_SEL;
            write_reg(SYSCFG_BASE + SYSCFG_PMC_OFFSET, new_val);

            #[cfg(feature = "defmt")]
            defmt::debug!("SYSCFG_PMC set MII mode: {:#010x}", new_val);
        }
    }

    /// Check whether RMII mode is selected
    #[inline(always)]
    pub fn is_rmii_mode() -> bool {
        unsafe { (read_reg(SYSCFG_BASE + SYSCFG_PMC_OFFSET) & SYSCFG_PMC_MII_RMII_SEL) != 0 }
    }
}
