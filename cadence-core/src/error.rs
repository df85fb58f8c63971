//! Unified error taxonomy for the motion stack

/// Errors returned by motion operations and hardware contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Optional operation not supported by this backend
    NotImplemented,
    /// Invalid argument (zero ramp rate, unsupported resolution, ...)
    InvalidArgument,
    /// Motion command issued while the stepper is disabled
    Canceled,
    /// Hardware transport failure
    Io,
    /// Underlying device or controller not ready (e.g. no ramp bound)
    NotReady,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Error::NotImplemented => "operation not implemented",
            Error::InvalidArgument => "invalid argument",
            Error::Canceled => "canceled: device disabled",
            Error::Io => "hardware transport failure",
            Error::NotReady => "device not ready",
        };
        f.write_str(s)
    }
}
