//! Requested operation and positional argument classification.
//!
//! Positional arguments mix device paths with at most one brightness
//! specifier. An argument that starts with a digit, `+` or `-` is the
//! specifier:
//! - `160`: set brightness to 160
//! - `+10` / `-10`: change brightness by that amount
//!
//! In detect mode every positional is a device path.

use crate::error::{Error, Result};
use crate::safety;
use crate::transport::Access;
use tracing::warn;

/// What to do with every device of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Read and print the current brightness.
    Query,
    /// Write an absolute brightness.
    SetAbsolute(u8),
    /// Change brightness by a signed amount and print the result.
    SetRelative(i32),
    /// Only report which devices are monitors.
    DetectOnly,
}

impl Operation {
    /// Access mode needed to open devices for this operation.
    pub fn access(&self) -> Access {
        match self {
            Self::SetAbsolute(_) | Self::SetRelative(_) => Access::ReadWrite,
            Self::Query | Self::DetectOnly => Access::ReadOnly,
        }
    }
}

/// Device paths and operation of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub candidates: Vec<String>,
    pub operation: Operation,
}

/// Whether an argument looks like a brightness specifier.
pub fn looks_numeric(arg: &str) -> bool {
    matches!(arg.chars().next(), Some(c) if c.is_ascii_digit() || c == '+' || c == '-')
}

/// Parse a brightness specifier into a set operation.
pub fn parse_specifier(arg: &str) -> Result<Operation> {
    let invalid = || Error::InvalidSpecifier(arg.to_string());

    if arg.starts_with('+') || arg.starts_with('-') {
        let delta = arg.parse::<i32>().map_err(|_| invalid())?;
        return Ok(Operation::SetRelative(delta));
    }

    let value = arg.parse::<i64>().map_err(|_| invalid())?;
    Ok(Operation::SetAbsolute(safety::validate_brightness(value)?))
}

/// Split positional arguments into device paths and the operation.
///
/// With several specifiers the last one wins.
pub fn split_arguments<I, S>(args: I, detect: bool) -> Result<Invocation>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut candidates = Vec::new();
    let mut operation = if detect {
        Operation::DetectOnly
    } else {
        Operation::Query
    };

    for arg in args {
        let arg = arg.as_ref();
        if !detect && looks_numeric(arg) {
            if operation != Operation::Query {
                warn!(specifier = arg, "Brightness given more than once; using the last");
            }
            operation = parse_specifier(arg)?;
            continue;
        }
        candidates.push(arg.to_string());
    }

    Ok(Invocation {
        candidates,
        operation,
    })
}
