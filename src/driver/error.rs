//! Driver error taxonomy
//!
//! Three domain enums keep diagnostics specific: [`ConfigError`] for
//! setup and bring-up, [`DmaError`] for descriptor and buffer capacity
//! problems, [`IoError`] for runtime TX/RX and PHY trouble. [`Error`]
//! wraps all three and is what the driver surface returns; `?` converts
//! from any domain automatically.

/// Setup and bring-up failures: configuration, reset, PHY probe, GPIO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Driver already initialized
    AlreadyInitialized,
    /// Invalid configuration parameter
    InvalidConfig,
    /// Invalid PHY address (must be 0-31) or no PHY answering there
    InvalidPhyAddress,
    /// GPIO configuration error
    GpioError,
    /// Software reset failed or timed out
    ResetFailed,
}

impl ConfigError {
    /// Short human-readable description
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyInitialized => "already initialized",
            Self::InvalidConfig => "invalid configuration",
            Self::InvalidPhyAddress => "invalid PHY address",
            Self::GpioError => "GPIO configuration error",
            Self::ResetFailed => "software reset failed",
        }
    }
}

/// Descriptor ring and buffer capacity problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// No free TX descriptors; backpressure, retry after reclaim
    RingExhausted,
    /// Frame too large for the ring's total buffer capacity
    FrameTooLarge,
    /// Invalid frame length (zero)
    InvalidLength,
    /// Fatal bus error (unrecoverable, engine reset required)
    FatalBusError,
}

impl DmaError {
    /// Short human-readable description
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RingExhausted => "descriptor ring exhausted",
            Self::FrameTooLarge => "frame too large for buffers",
            Self::InvalidLength => "invalid frame length",
            Self::FatalBusError => "fatal DMA bus error",
        }
    }
}

/// Runtime TX/RX and PHY management failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// MDIO busy indicator never cleared within the retry budget
    PhyTimeout,
    /// Auto-negotiation did not complete within the retry budget
    NegotiationFailed,
    /// Operation timed out
    Timeout,
    /// Invalid state for operation (e.g., not running)
    InvalidState,
    /// Buffer too small for received frame
    BufferTooSmall,
    /// Incomplete frame received (reassembly not finished, retry)
    IncompleteFrame,
    /// Receive error (CRC, overflow, framing) seen on a frame's
    /// descriptors; such frames are dropped and counted, not delivered
    FrameError,
}

impl IoError {
    /// Short human-readable description
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PhyTimeout => "PHY access timed out",
            Self::NegotiationFailed => "auto-negotiation failed",
            Self::Timeout => "operation timed out",
            Self::InvalidState => "invalid state for operation",
            Self::BufferTooSmall => "buffer too small for frame",
            Self::IncompleteFrame => "incomplete frame",
            Self::FrameError => "frame error",
        }
    }
}

/// Any driver error, tagged with its domain.
///
/// Match the inner enum when a caller cares about a specific cause:
/// ```ignore
/// match mac.transmit(frame) {
///     Err(Error::Dma(DmaError::RingExhausted)) => { /* back off */ }
///     other => other.map(|_| ())?,
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

/// Display plus the `From` conversion that lets `?` lift a domain error
/// into [`Error`].
macro_rules! domain_error {
    ($domain:ident => $variant:ident) => {
        impl core::fmt::Display for $domain {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$domain> for Error {
            fn from(e: $domain) -> Self {
                Error::$variant(e)
            }
        }
    };
}

domain_error!(ConfigError => Config);
domain_error!(DmaError => Dma);
domain_error!(IoError => Io);

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;
    use std::string::ToString;

    use super::*;

    const CONFIG_VARIANTS: [ConfigError; 5] = [
        ConfigError::AlreadyInitialized,
        ConfigError::InvalidConfig,
        ConfigError::InvalidPhyAddress,
        ConfigError::GpioError,
        ConfigError::ResetFailed,
    ];

    const DMA_VARIANTS: [DmaError; 4] = [
        DmaError::RingExhausted,
        DmaError::FrameTooLarge,
        DmaError::InvalidLength,
        DmaError::FatalBusError,
    ];

    const IO_VARIANTS: [IoError; 7] = [
        IoError::PhyTimeout,
        IoError::NegotiationFailed,
        IoError::Timeout,
        IoError::InvalidState,
        IoError::BufferTooSmall,
        IoError::IncompleteFrame,
        IoError::FrameError,
    ];

    #[test]
    fn every_variant_describes_itself() {
        for v in CONFIG_VARIANTS {
            assert!(!v.as_str().is_empty(), "{v:?}");
            assert_eq!(v.to_string(), v.as_str());
        }
        for v in DMA_VARIANTS {
            assert!(!v.as_str().is_empty(), "{v:?}");
            assert_eq!(v.to_string(), v.as_str());
        }
        for v in IO_VARIANTS {
            assert!(!v.as_str().is_empty(), "{v:?}");
            assert_eq!(v.to_string(), v.as_str());
        }
    }

    #[test]
    fn lifting_preserves_the_domain() {
        let config: Error = ConfigError::InvalidPhyAddress.into();
        assert_eq!(config, Error::Config(ConfigError::InvalidPhyAddress));

        let dma: Error = DmaError::RingExhausted.into();
        assert_eq!(dma, Error::Dma(DmaError::RingExhausted));

        let io: Error = IoError::NegotiationFailed.into();
        assert_eq!(io, Error::Io(IoError::NegotiationFailed));
    }

    #[test]
    fn question_mark_lifts_domain_errors() {
        fn probe() -> Result<()> {
            Err(ConfigError::ResetFailed)?
        }

        assert_eq!(probe(), Err(Error::Config(ConfigError::ResetFailed)));
    }

    #[test]
    fn display_prefixes_the_domain() {
        let cases: [(Error, &str, &str); 3] = [
            (Error::Config(ConfigError::ResetFailed), "config:", "reset"),
            (Error::Dma(DmaError::FatalBusError), "dma:", "bus error"),
            (Error::Io(IoError::BufferTooSmall), "io:", "buffer"),
        ];

        for (err, prefix, fragment) in cases {
            let rendered = format!("{err}");
            assert!(rendered.starts_with(prefix), "{rendered}");
            assert!(rendered.contains(fragment), "{rendered}");
        }
    }

    #[test]
    fn errors_compare_by_variant() {
        assert_eq!(
            Error::Config(ConfigError::GpioError),
            Error::Config(ConfigError::GpioError)
        );
        assert_ne!(
            Error::Config(ConfigError::GpioError),
            Error::Config(ConfigError::InvalidConfig)
        );
        assert_ne!(
            Error::Io(IoError::Timeout),
            Error::Dma(DmaError::InvalidLength)
        );
    }

    #[test]
    fn domain_result_aliases_carry_domain_errors() {
        let config: ConfigResult<()> = Err(ConfigError::InvalidConfig);
        let dma: DmaResult<()> = Err(DmaError::InvalidLength);
        let io: IoResult<()> = Err(IoError::Timeout);

        assert!(config.is_err() && dma.is_err() && io.is_err());
    }
}
