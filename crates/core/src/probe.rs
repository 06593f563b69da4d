//! Device identification and monitor classification.
//!
//! A hiddev node is treated as a monitor when one of its application
//! collections sits on the USB monitor usage page. This is a heuristic: the
//! brightness transaction itself is only attempted on devices that pass it.

use crate::error::Result;
use crate::registry::DeviceIdentity;
use crate::report::is_monitor_usage;
use crate::transport::FeatureChannel;
use tracing::debug;

/// Identity plus application count, as read from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub identity: DeviceIdentity,
    pub num_applications: u32,
}

/// Query the driver for the device's identity and application count.
pub fn device_info(channel: &dyn FeatureChannel) -> Result<DeviceInfo> {
    let raw = channel.device_info()?;
    let info = DeviceInfo {
        identity: DeviceIdentity::from_raw(raw.vendor, raw.product),
        num_applications: raw.num_applications,
    };

    debug!(
        vid = format_args!("0x{:04X}", info.identity.vendor_id),
        pid = format_args!("0x{:04X}", info.identity.product_id),
        applications = info.num_applications,
        "device info"
    );
    Ok(info)
}

/// Read the device's vendor/product identity.
pub fn identify(channel: &dyn FeatureChannel) -> Result<DeviceIdentity> {
    Ok(device_info(channel)?.identity)
}

/// Whether any application collection of the device is a monitor application.
///
/// Applications whose query fails are skipped.
pub fn is_monitor_application(channel: &dyn FeatureChannel, info: &DeviceInfo) -> bool {
    for index in 0..info.num_applications {
        match channel.application(index) {
            Ok(usage) if is_monitor_usage(usage) => {
                debug!(
                    index,
                    usage = format_args!("0x{:08X}", usage),
                    "monitor application found"
                );
                return true;
            }
            Ok(usage) => {
                debug!(index, usage = format_args!("0x{:08X}", usage), "application");
            }
            Err(e) => {
                debug!(index, error = %e, "application query failed, skipping");
            }
        }
    }
    false
}
