//! Brightness read/write via the monitor feature report.
//!
//! Brightness lives in feature report 16 as usage 0x820010 (VESA virtual
//! control page 0x82, brightness 0x10), first field, first usage.
//!
//! Every transaction starts with the driver's report structures freshly
//! initialized (see [`init`]).
//!
//! Device quirk: right after power-on or reset, a read before any write may
//! return 0 even though the display keeps a non-zero brightness. The value is
//! reported as-is.

use crate::error::Result;
use crate::report::{ReportInfo, UsageRef};
use crate::request::Operation;
use crate::safety;
use crate::transport::{read_usage, write_usage, FeatureChannel};
use tracing::debug;

/// Feature report carrying the brightness control.
pub const BRIGHTNESS_REPORT_ID: u32 = 16;
/// Usage code of the brightness value.
pub const MONITOR_BRIGHTNESS_USAGE: u32 = 0x0082_0010;

/// Usage reference for the brightness value.
pub fn brightness_usage() -> UsageRef {
    UsageRef::feature(BRIGHTNESS_REPORT_ID, MONITOR_BRIGHTNESS_USAGE)
}

/// Report reference for the brightness report.
pub fn brightness_report() -> ReportInfo {
    ReportInfo::feature(BRIGHTNESS_REPORT_ID)
}

/// Re-initialize the driver's internal report structures.
///
/// Nothing else in this module works without it; callers treat a failure
/// as fatal.
pub fn init(channel: &dyn FeatureChannel) -> Result<()> {
    channel.init_report()
}

/// Read the current brightness.
///
/// Steps:
/// 1. get-usage fills the usage value from the driver's report cache
/// 2. get-report fetches the report from the device
pub fn read_brightness(channel: &dyn FeatureChannel) -> Result<i32> {
    let usage = read_usage(channel, brightness_usage(), &brightness_report())?;
    Ok(usage.value)
}

/// Write an absolute brightness.
///
/// Steps:
/// 1. set-usage stores the value in the driver's report
/// 2. set-report sends the report to the device
pub fn write_brightness(channel: &dyn FeatureChannel, value: u8) -> Result<()> {
    let usage = brightness_usage().with_value(value as i32);
    write_usage(channel, &usage, &brightness_report())
}

/// Change brightness by `delta` and return the value the device settled on.
///
/// Steps:
/// 1. Read the current brightness
/// 2. Clamp `current + delta` into 0..=255 and write it
/// 3. Read back; the device may snap to its own granularity, so the
///    readback is returned rather than the computed value
pub fn adjust_brightness(channel: &dyn FeatureChannel, delta: i32) -> Result<i32> {
    let current = read_brightness(channel)?;
    let target = safety::clamp_brightness(current as i64 + delta as i64);
    debug!(current, delta, target, "adjusting brightness");

    write_brightness(channel, target)?;
    read_brightness(channel)
}

/// What a completed operation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Brightness read from the device (query, or readback after a change).
    Read(i32),
    /// Absolute brightness written; nothing read back.
    Written(u8),
    /// Detect-only: no directive issued.
    Nothing,
}

/// Run one operation against the device.
pub fn execute(channel: &dyn FeatureChannel, operation: Operation) -> Result<Completion> {
    match operation {
        Operation::Query => read_brightness(channel).map(Completion::Read),
        Operation::SetAbsolute(value) => {
            write_brightness(channel, value)?;
            Ok(Completion::Written(value))
        }
        Operation::SetRelative(delta) => adjust_brightness(channel, delta).map(Completion::Read),
        Operation::DetectOnly => Ok(Completion::Nothing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ExitStatus};
    use crate::report::Directive;
    use crate::transport::mock::MockChannel;

    fn display() -> MockChannel {
        MockChannel::display(0x05ac, 0x9219)
    }

    #[test]
    fn usage_reference_targets_brightness() {
        let usage = brightness_usage();
        assert_eq!(usage.report_id, 16);
        assert_eq!(usage.usage_code, 0x820010);
        assert_eq!(usage.field_index, 0);
        assert_eq!(usage.usage_index, 0);
        assert_eq!(brightness_report().num_fields, 1);
    }

    #[test]
    fn read_returns_current_value() {
        let mock = display().with_brightness(160);
        assert_eq!(read_brightness(&mock).unwrap(), 160);
    }

    #[test]
    fn set_then_get_round_trips_every_value() {
        let mock = display();
        for value in 0..=255u8 {
            write_brightness(&mock, value).unwrap();
            assert_eq!(read_brightness(&mock).unwrap(), value as i32);
        }
    }

    #[test]
    fn write_sends_usage_then_report() {
        let mock = display();
        write_brightness(&mock, 200).unwrap();
        assert_eq!(mock.calls(), vec![Directive::SetUsage, Directive::SetReport]);
    }

    #[test]
    fn relative_clamps_at_zero() {
        let mock = display().with_brightness(0);
        assert_eq!(adjust_brightness(&mock, -50).unwrap(), 0);
        assert_eq!(mock.brightness(), 0);
    }

    #[test]
    fn relative_clamps_at_max() {
        let mock = display().with_brightness(250);
        assert_eq!(adjust_brightness(&mock, 50).unwrap(), 255);
    }

    #[test]
    fn relative_matches_clamped_sum() {
        for current in [0, 1, 100, 128, 254, 255] {
            for delta in [-300, -10, -1, 0, 1, 10, 300] {
                let mock = display().with_brightness(current);
                let expected = (current + delta).clamp(0, 255);
                assert_eq!(adjust_brightness(&mock, delta).unwrap(), expected);
            }
        }
    }

    #[test]
    fn relative_reports_readback_not_computed_value() {
        // Device with 16-step granularity: 5 + 10 = 15 snaps to 0.
        let mock = display().with_brightness(5).with_step(16);
        assert_eq!(adjust_brightness(&mock, 10).unwrap(), 0);

        let mock = display().with_brightness(100).with_step(16);
        assert_eq!(adjust_brightness(&mock, 20).unwrap(), 112);
    }

    #[test]
    fn relative_sequence_is_read_write_read() {
        let mock = display().with_brightness(5);
        adjust_brightness(&mock, -10).unwrap();
        assert_eq!(
            mock.calls(),
            vec![
                Directive::GetUsage,
                Directive::GetReport,
                Directive::SetUsage,
                Directive::SetReport,
                Directive::GetUsage,
                Directive::GetReport,
            ]
        );
    }

    #[test]
    fn relative_stops_when_write_fails() {
        let mock = display().with_brightness(100).failing(Directive::SetReport);
        let err = adjust_brightness(&mock, 10).unwrap_err();
        assert_eq!(err.exit_status(), ExitStatus::ReportFailed);
        assert_eq!(mock.calls().last(), Some(&Directive::SetReport));
    }

    #[test]
    fn each_step_fails_distinctly() {
        for (directive, status) in [
            (Directive::GetUsage, ExitStatus::UsageFailed),
            (Directive::GetReport, ExitStatus::ReportFailed),
        ] {
            let mock = display().failing(directive);
            let err = read_brightness(&mock).unwrap_err();
            assert!(matches!(err, Error::Directive { directive: d, .. } if d == directive));
            assert_eq!(err.exit_status(), status);
        }
        for (directive, status) in [
            (Directive::SetUsage, ExitStatus::UsageFailed),
            (Directive::SetReport, ExitStatus::ReportFailed),
        ] {
            let mock = display().failing(directive);
            let err = write_brightness(&mock, 1).unwrap_err();
            assert_eq!(err.exit_status(), status);
        }
    }

    #[test]
    fn init_failure_is_init_status() {
        let mock = display().failing(Directive::InitReport);
        assert_eq!(init(&mock).unwrap_err().exit_status(), ExitStatus::InitFailed);
    }

    #[test]
    fn execute_dispatches_by_operation() {
        let mock = display().with_brightness(40);
        assert_eq!(
            execute(&mock, Operation::Query).unwrap(),
            Completion::Read(40)
        );
        assert_eq!(
            execute(&mock, Operation::SetAbsolute(90)).unwrap(),
            Completion::Written(90)
        );
        assert_eq!(mock.brightness(), 90);
        assert_eq!(
            execute(&mock, Operation::SetRelative(-100)).unwrap(),
            Completion::Read(0)
        );
    }

    #[test]
    fn execute_detect_only_sends_nothing() {
        let mock = display();
        assert_eq!(
            execute(&mock, Operation::DetectOnly).unwrap(),
            Completion::Nothing
        );
        assert!(mock.calls().is_empty());
    }
}
