//! CLI tool for simon-smart

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use simon_smart::{Config, DriveIdentity, SmartDevice, SmartStatus};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "simon-smart")]
#[command(about = "Read S.M.A.R.T. attributes, thresholds and identity from ATA drives", long_about = None)]
#[command(version)]
struct Cli {
    /// Physical drive index to read (repeatable, default: scan)
    #[arg(short, long)]
    drive: Vec<u8>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Configuration file (default: platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Send SMART ENABLE OPERATIONS before reading
    #[arg(long)]
    enable: bool,
}

/// One attribute joined with its threshold
#[cfg(feature = "cli")]
#[derive(Serialize)]
struct AttributeRow {
    id: u8,
    flags: u16,
    value: u8,
    worst: u8,
    threshold: Option<u8>,
    raw: u64,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct DriveReport {
    drive: u8,
    identity: Option<DriveIdentity>,
    status: Option<SmartStatus>,
    attributes: Vec<AttributeRow>,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct Report {
    timestamp: String,
    drives: Vec<DriveReport>,
}

#[cfg(feature = "cli")]
fn read_drive(
    config: &Config,
    index: u8,
    enable: bool,
) -> simon_smart::Result<Option<DriveReport>> {
    let mut device = SmartDevice::open_configured(&config.device, index);
    if !device.is_valid() {
        return Ok(None);
    }

    if enable && !config.device.enable_on_open && !device.enable_smart()? {
        log::warn!("Drive {} rejected SMART ENABLE", index);
    }

    let identity = device.read_identity()?;
    let status = device.read_smart_status()?;
    let thresholds = device.read_smart_thresholds()?;
    let attributes = device
        .read_smart_data()?
        .iter()
        .filter(|a| !a.is_empty())
        .map(|a| AttributeRow {
            id: a.id,
            flags: a.status_flags,
            value: a.current_value,
            worst: a.worst_value,
            threshold: simon_smart::threshold_for(&thresholds, a.id),
            raw: a.raw(),
        })
        .collect();

    device.close();

    Ok(Some(DriveReport {
        drive: index,
        identity,
        status,
        attributes,
    }))
}

#[cfg(feature = "cli")]
fn print_drive(report: &DriveReport) {
    println!("=== Drive {} ===", report.drive);
    match &report.identity {
        Some(identity) => {
            println!("Model: {}", identity.model);
            println!("Firmware: {}", identity.firmware_revision);
            if !identity.serial_number.is_empty() {
                println!("Serial: {}", identity.serial_number);
            }
        }
        None => println!("Identity: unavailable"),
    }
    match report.status {
        Some(SmartStatus::Ok) => println!("Status: PASSED"),
        Some(SmartStatus::ThresholdExceeded) => println!("Status: FAILING"),
        Some(SmartStatus::Unknown) | None => println!("Status: unknown"),
    }

    if report.attributes.is_empty() {
        println!("No SMART attributes returned");
        return;
    }

    println!(
        "\n{:>3}  {:>6}  {:>5}  {:>5}  {:>6}  {:>15}",
        "ID", "FLAGS", "VALUE", "WORST", "THRESH", "RAW"
    );
    for attr in &report.attributes {
        let threshold = attr
            .threshold
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}  0x{:04x}  {:>5}  {:>5}  {:>6}  {:>15}",
            attr.id, attr.flags, attr.value, attr.worst, threshold, attr.raw
        );
    }
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let indices: Vec<u8> = if cli.drive.is_empty() {
        (0..config.scan.max_drives).collect()
    } else {
        cli.drive.clone()
    };

    let mut drives = Vec::new();
    for index in indices {
        match read_drive(&config, index, cli.enable)? {
            Some(report) => drives.push(report),
            None if !cli.drive.is_empty() => {
                eprintln!("Drive {}: cannot open device", index);
            }
            None => {}
        }
    }

    if cli.format == "json" {
        let report = Report {
            timestamp: chrono::Local::now().to_rfc3339(),
            drives,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if drives.is_empty() {
        println!("No SMART-capable drives found (administrator/root privileges required)");
    } else {
        for (i, report) in drives.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print_drive(report);
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features not enabled. Please compile with --features cli");
    std::process::exit(1);
}
