//! acdcontrol CLI: read and set the brightness of USB-HID Apple displays.

use acdcontrol_core::config::{self, Config};
use acdcontrol_core::error::ExitStatus;
use acdcontrol_core::registry::Registry;
use acdcontrol_core::request::{split_arguments, Invocation};
use acdcontrol_core::session::SessionOptions;
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const NOTICE: &str =
    "Apple Cinema and Studio Display Control Program. Please, use --about switch to learn more";

const EXAMPLES: &str = "\
EXAMPLES:
  The HID device is assumed to be /dev/hiddev0; it may also be
  /dev/hiddevX or /dev/usb/hiddevX.

  acdcontrol --detect /dev/usb/hiddev*
      Find out which HID device is the display to control.

  acdcontrol /dev/hiddev0
      Read the current brightness.

  acdcontrol /dev/hiddev0 160
      Set brightness to 160. Valid values are 0-255; how many distinct
      levels the backlight has depends on the model.

  acdcontrol /dev/hiddev0 +10
      Increase the current brightness by 10.

  acdcontrol /dev/hiddev0 -10
      Decrease the current brightness by 10.";

const ABOUT: &str = "\
Written by Pavel Gurevich.

This program is free software, distributed under the GNU GPL version 2.

CREDITS

Andre Beckedorf wrote similar software for Windows and helped make this
one possible. Thanks also to the people who helped him:

    * Dmitri Kitaynik (20\" Display)
    * Mark Wagner (15\" and 17\" Displays)
    * Veit Wahlich (30\" Display)
    * Charles Lepple (24\" Display)
    * Arne Zellentin (relative brightness change)

NOTE: the startup message can be suppressed with --silent (-s)";

#[derive(Parser, Debug)]
#[command(
    name = "acdcontrol",
    version,
    about = "Apple Cinema and Studio Display brightness control",
    after_help = EXAMPLES
)]
struct Cli {
    /// Suppress non-functional output.
    #[arg(short, long)]
    silent: bool,

    /// Print only the brightness value when querying.
    #[arg(short, long)]
    brief: bool,

    /// Operate on displays missing from the list of supported devices.
    #[arg(short, long)]
    force: bool,

    /// Only report which of the given devices are monitors.
    #[arg(short, long)]
    detect: bool,

    /// List supported devices and exit.
    #[arg(short, long)]
    list_all: bool,

    /// Show information about the program, credits and thanks.
    #[arg(short, long)]
    about: bool,

    /// Read defaults from this JSON file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// hiddev device nodes (/dev/usb/hiddevX or /dev/hiddevX), optionally
    /// followed by a brightness: N sets it, +N/-N changes it.
    #[arg(value_name = "DEVICE|BRIGHTNESS", allow_negative_numbers = true)]
    args: Vec<String>,
}

fn init_tracing(config_filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_filter.unwrap_or("error")))
        .unwrap_or_else(|_| EnvFilter::new("error"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn list_all(out: &mut dyn Write) -> Result<()> {
    let registry = Registry::builtin()?;
    for record in registry.list_all() {
        writeln!(out, "{}", registry.display(record.identity()))?;
    }
    Ok(())
}

fn run(cli: Cli, config: &Config, out: &mut dyn Write) -> Result<ExitStatus> {
    if cli.list_all {
        list_all(out)?;
        return Ok(ExitStatus::Success);
    }
    if cli.about {
        writeln!(out, "acdcontrol {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "{ABOUT}")?;
        return Ok(ExitStatus::Success);
    }

    let options = config.session_options(cli.silent, cli.brief, cli.force);
    let invocation = split_arguments(&cli.args, cli.detect)?;
    if invocation.candidates.is_empty() {
        write!(out, "{}", Cli::command().render_help())?;
        return Ok(ExitStatus::NoDevices);
    }

    if !options.silent {
        writeln!(out, "{NOTICE}")?;
    }

    run_session(&invocation, options, out)
}

#[cfg(target_os = "linux")]
fn run_session(
    invocation: &Invocation,
    options: SessionOptions,
    out: &mut dyn Write,
) -> Result<ExitStatus> {
    use acdcontrol_core::hiddev::HiddevOpener;
    use acdcontrol_core::session::Session;

    let registry = Registry::builtin()?;
    let opener = HiddevOpener;
    let session = Session::new(&registry, &opener, options);

    let stderr = std::io::stderr();
    let report = session.run(
        &invocation.candidates,
        invocation.operation,
        out,
        &mut stderr.lock(),
    );
    Ok(report.status)
}

#[cfg(not(target_os = "linux"))]
fn run_session(
    _invocation: &Invocation,
    _options: SessionOptions,
    _out: &mut dyn Write,
) -> Result<ExitStatus> {
    anyhow::bail!("hiddev devices are only available on Linux")
}

fn try_main(cli: Cli) -> Result<ExitStatus> {
    let config = config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(config.log_filter.as_deref());

    let stdout = std::io::stdout();
    run(cli, &config, &mut stdout.lock())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_main(cli) {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            eprintln!("acdcontrol: {e:#}");
            ExitCode::from(ExitStatus::NoDevices.code())
        }
    }
}
