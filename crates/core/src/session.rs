//! Session driver: runs one operation over a list of device nodes.
//!
//! Candidates are processed strictly in order, one handle at a time. A
//! device that cannot be opened or identified, or that is not a monitor, is
//! skipped with a warning. Everything else that goes wrong ends the whole
//! run, including a failed brightness directive on one device of a batch: a
//! half-finished transaction must not be followed by more output that looks
//! valid.

use crate::brightness::{self, Completion};
use crate::error::{Error, ExitStatus, Result};
use crate::probe;
use crate::registry::{DeviceIdentity, Registry};
use crate::request::Operation;
use crate::safety;
use crate::transport::DeviceOpener;
use std::io::Write;
use tracing::{debug, info, warn};

/// Write one line, logging (not failing) when the stream is gone.
macro_rules! emit {
    ($w:expr, $($arg:tt)*) => {
        if let Err(e) = writeln!($w, $($arg)*) {
            debug!(error = %e, "failed to write output line");
        }
    };
}

/// Behavior switches for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Suppress the driver version line.
    pub silent: bool,
    /// Print only the brightness value, without the device path.
    pub brief: bool,
    /// Operate on devices missing from the registry.
    pub force: bool,
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceOutcome {
    /// Device node could not be opened.
    OpenFailed,
    /// Device info query failed.
    Unidentified,
    /// Detect mode: device is a monitor.
    Monitor {
        identity: DeviceIdentity,
        supported: bool,
    },
    /// Device is not a monitor.
    NotMonitor { identity: DeviceIdentity },
    /// Brightness read (query or readback after a relative change).
    Brightness { identity: DeviceIdentity, value: i32 },
    /// Absolute brightness written.
    Written { identity: DeviceIdentity, value: u8 },
    /// Processing this device ended the run.
    Fatal { status: ExitStatus },
}

/// Outcome of one candidate, tagged with its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReport {
    pub path: String,
    pub outcome: DeviceOutcome,
}

/// Per-device outcomes and the overall exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub devices: Vec<DeviceReport>,
    pub status: ExitStatus,
}

/// Drives the probe and brightness engine over candidate device nodes.
pub struct Session<'a> {
    registry: &'a Registry,
    opener: &'a dyn DeviceOpener,
    options: SessionOptions,
}

impl<'a> Session<'a> {
    pub fn new(
        registry: &'a Registry,
        opener: &'a dyn DeviceOpener,
        options: SessionOptions,
    ) -> Self {
        Self {
            registry,
            opener,
            options,
        }
    }

    /// Process every candidate in order.
    ///
    /// Results go to `out`, warnings and diagnostics to `err`.
    pub fn run(
        &self,
        candidates: &[String],
        operation: Operation,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> SessionReport {
        let mut devices = Vec::with_capacity(candidates.len());
        if candidates.is_empty() {
            return SessionReport {
                devices,
                status: ExitStatus::NoDevices,
            };
        }

        let mut version_pending = true;
        for path in candidates {
            match self.process(path, operation, &mut version_pending, out, err) {
                Ok(outcome) => devices.push(DeviceReport {
                    path: path.clone(),
                    outcome,
                }),
                Err(e) => {
                    let status = e.exit_status();
                    self.report_fatal(path, &e, err);
                    devices.push(DeviceReport {
                        path: path.clone(),
                        outcome: DeviceOutcome::Fatal { status },
                    });
                    return SessionReport { devices, status };
                }
            }
        }

        SessionReport {
            devices,
            status: ExitStatus::Success,
        }
    }

    fn process(
        &self,
        path: &str,
        operation: Operation,
        version_pending: &mut bool,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<DeviceOutcome> {
        let channel = match self.opener.open(path, operation.access()) {
            Ok(channel) => channel,
            Err(e) => {
                warn!(path, error = %e, "Skipping device: open failed");
                emit!(err, "{e}");
                return Ok(DeviceOutcome::OpenFailed);
            }
        };

        // The flag stays set until some device answers the version query.
        if *version_pending && !self.options.silent {
            match channel.driver_version() {
                Ok(version) => {
                    emit!(out, "hiddev driver version is {version}");
                    *version_pending = false;
                }
                Err(e) => warn!(path, error = %e, "Could not read driver version"),
            }
        }

        let info = match probe::device_info(channel.as_ref()) {
            Ok(info) => info,
            Err(e) => {
                warn!(path, error = %e, "Skipping device: cannot identify");
                emit!(err, "{path}: {e}");
                return Ok(DeviceOutcome::Unidentified);
            }
        };
        let identity = info.identity;
        let supported = self.registry.is_supported(identity);

        if operation == Operation::DetectOnly {
            if !probe::is_monitor_application(channel.as_ref(), &info) {
                return Ok(DeviceOutcome::NotMonitor { identity });
            }
            emit!(
                out,
                "{path}: USB Monitor - {}.\t{}",
                if supported { "SUPPORTED" } else { "UNSUPPORTED" },
                self.registry.display(identity)
            );
            return Ok(DeviceOutcome::Monitor {
                identity,
                supported,
            });
        }

        if !supported {
            emit!(err, "Device unsupported: {}", self.registry.display(identity));
        }
        safety::check_supported(self.registry, identity, self.options.force)?;

        if !probe::is_monitor_application(channel.as_ref(), &info) {
            warn!(path, "Skipping device: not a monitor");
            emit!(err, "{path}: This device is NOT USB monitor!");
            return Ok(DeviceOutcome::NotMonitor { identity });
        }

        info!(
            path,
            vid = format_args!("0x{:04X}", identity.vendor_id),
            pid = format_args!("0x{:04X}", identity.product_id),
            model = self.registry.describe(identity).unwrap_or("unknown"),
            "Found USB monitor"
        );

        brightness::init(channel.as_ref())?;
        let outcome = match brightness::execute(channel.as_ref(), operation)? {
            Completion::Read(value) => {
                if self.options.brief {
                    emit!(out, "{value}");
                } else {
                    emit!(out, "{path}: BRIGHTNESS={value}");
                }
                DeviceOutcome::Brightness { identity, value }
            }
            Completion::Written(value) => DeviceOutcome::Written { identity, value },
            Completion::Nothing => DeviceOutcome::Monitor {
                identity,
                supported,
            },
        };

        debug!(path, "Closing device");
        Ok(outcome)
    }

    fn report_fatal(&self, path: &str, error: &Error, err: &mut dyn Write) {
        match error {
            // The unsupported line has already been printed.
            Error::Unsupported(_) => {}
            Error::Directive { source, .. } if error.exit_status() == ExitStatus::InitFailed => {
                emit!(
                    err,
                    "FATAL: {path}: failed to initialize internal report structures: {source}"
                );
            }
            _ => emit!(err, "{path}: {error}"),
        }
    }
}
