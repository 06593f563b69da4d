//! HID feature-report channel abstraction.
//!
//! Provides a trait-based channel so that real hiddev nodes and mock devices
//! share the same interface.

use crate::error::Result;
use crate::report::{DriverVersion, RawDeviceInfo, ReportInfo, UsageRef};
use tracing::trace;

/// The fixed set of driver directives against an open HID device.
///
/// Every call either succeeds or fails as a whole.
pub trait FeatureChannel: Send {
    /// Packed driver version.
    fn driver_version(&self) -> Result<DriverVersion>;

    /// Raw vendor/product IDs and the number of application collections.
    fn device_info(&self) -> Result<RawDeviceInfo>;

    /// Usage of the application collection at `index`.
    fn application(&self, index: u32) -> Result<u32>;

    /// Re-initialize the driver's internal report structures.
    fn init_report(&self) -> Result<()>;

    /// Fetch the value for `usage` into `usage.value`.
    fn get_usage(&self, usage: &mut UsageRef) -> Result<()>;

    /// Fetch a whole report from the device.
    fn get_report(&self, report: &ReportInfo) -> Result<()>;

    /// Store `usage.value` in the driver's copy of the report.
    fn set_usage(&self, usage: &UsageRef) -> Result<()>;

    /// Send the driver's copy of a report to the device.
    fn set_report(&self, report: &ReportInfo) -> Result<()>;
}

/// How a device node is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Source of feature channels, keyed by device path.
pub trait DeviceOpener {
    fn open(&self, path: &str, access: Access) -> Result<Box<dyn FeatureChannel>>;
}

/// Read one usage value: get-usage, then get-report.
///
/// Both directives must succeed; the value comes from the usage reference.
pub fn read_usage(
    channel: &dyn FeatureChannel,
    usage: UsageRef,
    report: &ReportInfo,
) -> Result<UsageRef> {
    let mut usage = usage;
    channel.get_usage(&mut usage)?;
    channel.get_report(report)?;

    trace!(
        report_id = usage.report_id,
        usage_code = format_args!("0x{:06X}", usage.usage_code),
        value = usage.value,
        "usage RX"
    );
    Ok(usage)
}

/// Write one usage value: set-usage, then set-report.
pub fn write_usage(
    channel: &dyn FeatureChannel,
    usage: &UsageRef,
    report: &ReportInfo,
) -> Result<()> {
    trace!(
        report_id = usage.report_id,
        usage_code = format_args!("0x{:06X}", usage.usage_code),
        value = usage.value,
        "usage TX"
    );

    channel.set_usage(usage)?;
    channel.set_report(report)?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::mock::MockChannel;
    use super::*;
    use crate::brightness::{brightness_report, brightness_usage};
    use crate::report::Directive;

    #[test]
    fn read_usage_issues_usage_then_report() {
        let mock = MockChannel::display(0x05ac, 0x9219).with_brightness(160);
        let usage = read_usage(&mock, brightness_usage(), &brightness_report()).unwrap();
        assert_eq!(usage.value, 160);
        assert_eq!(mock.calls(), vec![Directive::GetUsage, Directive::GetReport]);
    }

    #[test]
    fn write_usage_issues_usage_then_report() {
        let mock = MockChannel::display(0x05ac, 0x9219);
        let usage = brightness_usage().with_value(42);
        write_usage(&mock, &usage, &brightness_report()).unwrap();
        assert_eq!(mock.calls(), vec![Directive::SetUsage, Directive::SetReport]);
        assert_eq!(mock.brightness(), 42);
    }

    #[test]
    fn read_usage_stops_at_first_failure() {
        let mock = MockChannel::display(0x05ac, 0x9219).failing(Directive::GetUsage);
        let result = read_usage(&mock, brightness_usage(), &brightness_report());
        assert!(result.is_err());
        assert_eq!(mock.calls(), vec![Directive::GetUsage]);
    }

    #[test]
    fn mock_rejects_wrong_report() {
        let mock = MockChannel::display(0x05ac, 0x9219);
        let result = read_usage(
            &mock,
            brightness_usage(),
            &crate::report::ReportInfo::feature(1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn read_only_channel_rejects_writes() {
        let opener = mock::MockOpener::new()
            .with_device("/dev/hiddev0", MockChannel::display(0x05ac, 0x9219));
        let channel = opener.open("/dev/hiddev0", Access::ReadOnly).unwrap();
        channel.init_report().unwrap();
        let usage = brightness_usage().with_value(10);
        assert!(write_usage(channel.as_ref(), &usage, &brightness_report()).is_err());
    }

    #[test]
    fn opener_fails_for_unknown_path() {
        let opener = mock::MockOpener::new();
        let err = opener
            .open("/dev/hiddev9", Access::ReadOnly)
            .err()
            .unwrap();
        assert!(err.to_string().starts_with("/dev/hiddev9:"));
        assert!(opener.opened().is_empty());
    }
}
