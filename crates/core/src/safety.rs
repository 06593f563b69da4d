//! Safety layer: validates brightness values and gates writes to unknown
//! hardware before any directive is sent.
//!
//! ## Brightness
//! - **Range**: 0 – 255 (8-bit feature report usage)
//! - Absolute values outside the range are rejected at parse time.
//! - Relative changes are clamped into the range after adding the delta.
//! - Not every value in the range changes the backlight; the device snaps
//!   to its own granularity.
//!
//! ## Unknown devices
//! A device whose (vendor, product) pair is not in the registry is refused
//! unless the caller explicitly forces it. This check runs before any
//! transaction, including read-only queries.

use crate::error::{Error, Result};
use crate::registry::{DeviceIdentity, Registry};
use tracing::warn;

pub const BRIGHTNESS_MIN: u8 = 0;
pub const BRIGHTNESS_MAX: u8 = 255;

/// Validate an absolute brightness value.
pub fn validate_brightness(value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::OutOfRange {
        field: "brightness",
        value,
        min: BRIGHTNESS_MIN as i64,
        max: BRIGHTNESS_MAX as i64,
    })
}

/// Clamp a computed brightness into the valid range.
pub fn clamp_brightness(value: i64) -> u8 {
    value.clamp(BRIGHTNESS_MIN as i64, BRIGHTNESS_MAX as i64) as u8
}

/// Result of the registry check for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clearance {
    /// Device is in the registry.
    Supported,
    /// Device is unknown but the caller forced it.
    Forced,
}

/// Allow transactions only on registered devices, unless forced.
pub fn check_supported(
    registry: &Registry,
    identity: DeviceIdentity,
    force: bool,
) -> Result<Clearance> {
    if registry.is_supported(identity) {
        return Ok(Clearance::Supported);
    }
    if force {
        warn!(
            vid = format_args!("0x{:04X}", identity.vendor_id),
            pid = format_args!("0x{:04X}", identity.product_id),
            "Proceeding with unsupported device (forced)"
        );
        return Ok(Clearance::Forced);
    }
    Err(Error::Unsupported(identity))
}
