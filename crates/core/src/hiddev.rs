//! Linux hiddev backend for [`FeatureChannel`].
//!
//! Talks to `/dev/usb/hiddevN` (or `/dev/hiddevN`) nodes through the ioctls
//! of `linux/hiddev.h`. Get-class directives work on a read-only handle;
//! set-usage and set-report need the node opened read-write.

use crate::error::{Error, Result};
use crate::report::{Directive, DriverVersion, RawDeviceInfo, ReportInfo, UsageRef};
use crate::transport::{Access, DeviceOpener, FeatureChannel};
use nix::libc::c_int;
use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use tracing::{debug, trace};

/// `struct hiddev_devinfo`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddevDevinfo {
    pub bustype: u32,
    pub busnum: u32,
    pub devnum: u32,
    pub ifnum: u32,
    pub vendor: i16,
    pub product: i16,
    pub version: i16,
    pub num_applications: u32,
}

/// `struct hiddev_report_info`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddevReportInfo {
    pub report_type: u32,
    pub report_id: u32,
    pub num_fields: u32,
}

/// `struct hiddev_usage_ref`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddevUsageRef {
    pub report_type: u32,
    pub report_id: u32,
    pub field_index: u32,
    pub usage_index: u32,
    pub usage_code: u32,
    pub value: i32,
}

impl From<&UsageRef> for HiddevUsageRef {
    fn from(usage: &UsageRef) -> Self {
        Self {
            report_type: usage.report_type.as_raw(),
            report_id: usage.report_id,
            field_index: usage.field_index,
            usage_index: usage.usage_index,
            usage_code: usage.usage_code,
            value: usage.value,
        }
    }
}

impl From<&ReportInfo> for HiddevReportInfo {
    fn from(report: &ReportInfo) -> Self {
        Self {
            report_type: report.report_type.as_raw(),
            report_id: report.report_id,
            num_fields: report.num_fields,
        }
    }
}

impl From<HiddevDevinfo> for RawDeviceInfo {
    fn from(info: HiddevDevinfo) -> Self {
        Self {
            vendor: info.vendor as i32,
            product: info.product as i32,
            num_applications: info.num_applications,
        }
    }
}

mod ioctl {
    use super::{HiddevDevinfo, HiddevReportInfo, HiddevUsageRef};
    use nix::libc::c_int;

    const HID_MAGIC: u8 = b'H';

    nix::ioctl_read!(hidiocgversion, HID_MAGIC, 0x01, c_int);
    nix::ioctl_write_int_bad!(hidiocapplication, nix::request_code_none!(HID_MAGIC, 0x02));
    nix::ioctl_read!(hidiocgdevinfo, HID_MAGIC, 0x03, HiddevDevinfo);
    nix::ioctl_none!(hidiocinitreport, HID_MAGIC, 0x05);
    nix::ioctl_write_ptr!(hidiocgreport, HID_MAGIC, 0x07, HiddevReportInfo);
    nix::ioctl_write_ptr!(hidiocsreport, HID_MAGIC, 0x08, HiddevReportInfo);
    nix::ioctl_readwrite!(hidiocgusage, HID_MAGIC, 0x0B, HiddevUsageRef);
    nix::ioctl_write_ptr!(hidiocsusage, HID_MAGIC, 0x0C, HiddevUsageRef);
}

/// An open hiddev node.
///
/// The file is closed when the channel is dropped.
#[derive(Debug)]
pub struct HiddevChannel {
    file: File,
    path: String,
}

impl HiddevChannel {
    pub fn open(path: &str, access: Access) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(access == Access::ReadWrite)
            .open(path)
            .map_err(|source| Error::Open {
                path: path.to_string(),
                source,
            })?;

        debug!(path, ?access, "Opened hiddev node");
        Ok(Self {
            file,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn fd(&self) -> c_int {
        self.file.as_raw_fd()
    }

    /// Map an ioctl result onto the directive that issued it.
    fn check<T>(&self, directive: Directive, result: nix::Result<T>) -> Result<T> {
        trace!(path = %self.path, %directive, ok = result.is_ok(), "ioctl");
        result.map_err(|errno| Error::directive(directive, errno.into()))
    }
}

impl FeatureChannel for HiddevChannel {
    fn driver_version(&self) -> Result<DriverVersion> {
        let mut version: c_int = 0;
        // SAFETY: fd is open for the lifetime of self; version is a valid c_int.
        let result = unsafe { ioctl::hidiocgversion(self.fd(), &mut version) };
        self.check(Directive::GetVersion, result)?;
        Ok(DriverVersion(version as u32))
    }

    fn device_info(&self) -> Result<RawDeviceInfo> {
        let mut info = HiddevDevinfo::default();
        // SAFETY: info matches struct hiddev_devinfo.
        let result = unsafe { ioctl::hidiocgdevinfo(self.fd(), &mut info) };
        self.check(Directive::GetDeviceInfo, result)?;
        Ok(info.into())
    }

    fn application(&self, index: u32) -> Result<u32> {
        // SAFETY: HIDIOCAPPLICATION takes the index by value and returns the usage.
        let result = unsafe { ioctl::hidiocapplication(self.fd(), index as c_int) };
        let usage = self.check(Directive::GetApplication, result)?;
        Ok(usage as u32)
    }

    fn init_report(&self) -> Result<()> {
        // SAFETY: no argument.
        let result = unsafe { ioctl::hidiocinitreport(self.fd()) };
        self.check(Directive::InitReport, result)?;
        Ok(())
    }

    fn get_usage(&self, usage: &mut UsageRef) -> Result<()> {
        let mut raw = HiddevUsageRef::from(&*usage);
        // SAFETY: raw matches struct hiddev_usage_ref.
        let result = unsafe { ioctl::hidiocgusage(self.fd(), &mut raw) };
        self.check(Directive::GetUsage, result)?;
        usage.value = raw.value;
        Ok(())
    }

    fn get_report(&self, report: &ReportInfo) -> Result<()> {
        let raw = HiddevReportInfo::from(report);
        // SAFETY: raw matches struct hiddev_report_info.
        let result = unsafe { ioctl::hidiocgreport(self.fd(), &raw) };
        self.check(Directive::GetReport, result)?;
        Ok(())
    }

    fn set_usage(&self, usage: &UsageRef) -> Result<()> {
        let raw = HiddevUsageRef::from(usage);
        // SAFETY: raw matches struct hiddev_usage_ref.
        let result = unsafe { ioctl::hidiocsusage(self.fd(), &raw) };
        self.check(Directive::SetUsage, result)?;
        Ok(())
    }

    fn set_report(&self, report: &ReportInfo) -> Result<()> {
        let raw = HiddevReportInfo::from(report);
        // SAFETY: raw matches struct hiddev_report_info.
        let result = unsafe { ioctl::hidiocsreport(self.fd(), &raw) };
        self.check(Directive::SetReport, result)?;
        Ok(())
    }
}

/// Opens hiddev nodes from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddevOpener;

impl DeviceOpener for HiddevOpener {
    fn open(&self, path: &str, access: Access) -> Result<Box<dyn FeatureChannel>> {
        Ok(Box::new(HiddevChannel::open(path, access)?))
    }
}
