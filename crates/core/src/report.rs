//! hiddev report and usage references.
//!
//! The Linux hiddev interface addresses a single value inside a HID report by
//! a usage reference: report type, report ID, field index, usage index and
//! usage code. Reading a value is a two-step exchange (fetch the usage, then
//! the report); writing is the mirror image (store the usage, then send the
//! report).
//!
//! Layout reference: `linux/hiddev.h`.

use std::fmt;

/// HID report types as numbered by hiddev.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ReportType {
    Input = 1,
    Output = 2,
    Feature = 3,
}

impl ReportType {
    pub fn as_raw(&self) -> u32 {
        *self as u32
    }
}

/// Usage page of the USB monitor control usage tables.
pub const MONITOR_USAGE_PAGE: u32 = 0x80;

/// Whether an application collection usage belongs to the monitor usage page.
///
/// The page lives in bits 16..24 of the 32-bit usage.
pub fn is_monitor_usage(application: u32) -> bool {
    (application >> 16) & 0xFF == MONITOR_USAGE_PAGE
}

/// Reference to one usage value inside a report (`struct hiddev_usage_ref`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRef {
    pub report_type: ReportType,
    pub report_id: u32,
    pub field_index: u32,
    pub usage_index: u32,
    pub usage_code: u32,
    /// Value read back by get-usage, or to be written by set-usage.
    pub value: i32,
}

impl UsageRef {
    /// First usage of the first field of a feature report.
    pub fn feature(report_id: u32, usage_code: u32) -> Self {
        Self {
            report_type: ReportType::Feature,
            report_id,
            field_index: 0,
            usage_index: 0,
            usage_code,
            value: 0,
        }
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.value = value;
        self
    }
}

/// Reference to a whole report (`struct hiddev_report_info`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportInfo {
    pub report_type: ReportType,
    pub report_id: u32,
    pub num_fields: u32,
}

impl ReportInfo {
    /// Single-field feature report.
    pub fn feature(report_id: u32) -> Self {
        Self {
            report_type: ReportType::Feature,
            report_id,
            num_fields: 1,
        }
    }
}

/// The fixed set of driver directives a feature channel understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    GetVersion,
    GetDeviceInfo,
    GetApplication,
    InitReport,
    GetUsage,
    GetReport,
    SetUsage,
    SetReport,
}

impl Directive {
    /// Directives that change device or driver state.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::InitReport | Self::SetUsage | Self::SetReport)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GetVersion => "get driver version",
            Self::GetDeviceInfo => "get device info",
            Self::GetApplication => "get application",
            Self::InitReport => "init report structures",
            Self::GetUsage => "get usage",
            Self::GetReport => "get report",
            Self::SetUsage => "set usage",
            Self::SetReport => "set report",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Packed hiddev driver version (`major << 16 | minor << 8 | patch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverVersion(pub u32);

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.0 >> 16,
            (self.0 >> 8) & 0xFF,
            self.0 & 0xFF
        )
    }
}

/// Raw device information as reported by the driver (`struct hiddev_devinfo`).
///
/// Vendor and product come back as signed 16-bit fields; use
/// [`crate::registry::DeviceIdentity::from_raw`] to get the USB IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawDeviceInfo {
    pub vendor: i32,
    pub product: i32,
    pub num_applications: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_usage_page_detected() {
        assert!(is_monitor_usage(0x0080_0001));
        assert!(is_monitor_usage(0x0080_0010));
        assert!(!is_monitor_usage(0x0001_0006)); // generic desktop keyboard
        assert!(!is_monitor_usage(0x000C_0001)); // consumer control
        assert!(!is_monitor_usage(0x0082_0010)); // VESA virtual controls page
    }

    #[test]
    fn monitor_usage_ignores_top_byte() {
        assert!(is_monitor_usage(0xFF80_0000));
    }

    #[test]
    fn feature_usage_defaults() {
        let usage = UsageRef::feature(16, 0x820010);
        assert_eq!(usage.report_type, ReportType::Feature);
        assert_eq!(usage.field_index, 0);
        assert_eq!(usage.usage_index, 0);
        assert_eq!(usage.value, 0);
        assert_eq!(usage.with_value(42).value, 42);
    }

    #[test]
    fn feature_report_has_one_field() {
        let report = ReportInfo::feature(16);
        assert_eq!(report.report_type.as_raw(), 3);
        assert_eq!(report.num_fields, 1);
    }

    #[test]
    fn driver_version_unpacks() {
        assert_eq!(DriverVersion(0x0001_0004).to_string(), "1.0.4");
        assert_eq!(DriverVersion(0x0002_0A03).to_string(), "2.10.3");
    }

    #[test]
    fn write_directives() {
        assert!(Directive::InitReport.is_write());
        assert!(Directive::SetUsage.is_write());
        assert!(Directive::SetReport.is_write());
        assert!(!Directive::GetUsage.is_write());
        assert!(!Directive::GetReport.is_write());
        assert!(!Directive::GetApplication.is_write());
    }
}
