//! Error types for zaocfg-core.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Requested value outside the valid inclusive range. Detected locally,
    /// before the device is touched.
    #[error("{field} {value} not in range of {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The device rejected or failed a write. Carries the device's own text.
    #[error("{0}")]
    Device(String),

    /// The device could not be reached at all.
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A device-state document could not be read or parsed.
    #[error("device state error: {0}")]
    DeviceState(String),
}

impl Error {
    /// Whether the failure was detected locally, without device interaction.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
