//! Error types for acdcontrol-core.

use crate::registry::DeviceIdentity;
use crate::report::Directive;
use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Opening the device node failed.
    #[error("{path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A driver directive (ioctl) failed.
    #[error("{directive} failed: {source}")]
    Directive {
        directive: Directive,
        #[source]
        source: std::io::Error,
    },

    /// Device identity is not in the registry and no override was given.
    #[error("device unsupported: vendor 0x{:04x}, product 0x{:04x}", .0.vendor_id, .0.product_id)]
    Unsupported(DeviceIdentity),

    /// Value out of safe range.
    #[error("value out of range: {field} = {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Brightness argument could not be parsed.
    #[error("invalid brightness specifier '{0}'")]
    InvalidSpecifier(String),

    /// Registry built with the same (vendor, product) key twice.
    #[error("duplicate registry record: vendor 0x{vendor_id:04x}, product 0x{product_id:04x}")]
    DuplicateRecord { vendor_id: u16, product_id: u16 },

    /// Config file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for wrapping a failed directive.
    pub fn directive(directive: Directive, source: std::io::Error) -> Self {
        Self::Directive { directive, source }
    }

    /// Process exit status this error terminates with when it is fatal.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Error::Directive { directive, .. } => match directive {
                Directive::InitReport => ExitStatus::InitFailed,
                Directive::GetUsage | Directive::SetUsage => ExitStatus::UsageFailed,
                Directive::GetReport | Directive::SetReport => ExitStatus::ReportFailed,
                // Probe directives only ever skip a device; classify as usage-level.
                Directive::GetVersion | Directive::GetDeviceInfo | Directive::GetApplication => {
                    ExitStatus::UsageFailed
                }
            },
            Error::Unsupported(_) => ExitStatus::Unsupported,
            Error::Open { .. }
            | Error::OutOfRange { .. }
            | Error::InvalidSpecifier(_)
            | Error::DuplicateRecord { .. }
            | Error::Config(_) => ExitStatus::NoDevices,
        }
    }
}

/// Outcome of a whole run, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Normal completion, even if some candidates were skipped.
    Success,
    /// No device paths were given, or the arguments were unusable.
    NoDevices,
    /// Re-initializing the report structures failed.
    InitFailed,
    /// Unknown device and no force override.
    Unsupported,
    /// A get/set usage directive failed.
    UsageFailed,
    /// A get/set report directive failed.
    ReportFailed,
}

impl ExitStatus {
    /// Numeric process exit code.
    pub fn code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::NoDevices | Self::InitFailed => 1,
            Self::Unsupported | Self::UsageFailed => 2,
            Self::ReportFailed => 3,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
