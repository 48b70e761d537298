//! # simon-smart
//!
//! S.M.A.R.T. readout for ATA drives through raw passthrough commands, without
//! `smartctl` or a vendor driver. The crate builds the ATA task-file requests
//! for SMART ENABLE, READ DATA, READ THRESHOLDS, RETURN STATUS and IDENTIFY
//! DEVICE, sends them through the operating system's drive control channel,
//! and decodes the returned sectors into typed records.
//!
//! ## Quick Start
//!
//! ```no_run
//! use simon_smart::SmartDevice;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut drive = SmartDevice::open(0);
//! if drive.is_valid() {
//!     if let Some((model, firmware)) = drive.read_name_and_firmware_revision()? {
//!         println!("{} (firmware {})", model, firmware);
//!     }
//!
//!     let thresholds = drive.read_smart_thresholds()?;
//!     for attr in drive.read_smart_data()?.iter().filter(|a| !a.is_empty()) {
//!         println!(
//!             "{:3}: value {} worst {} threshold {:?} raw {}",
//!             attr.id,
//!             attr.current_value,
//!             attr.worst_value,
//!             simon_smart::threshold_for(&thresholds, attr.id),
//!             attr.raw()
//!         );
//!     }
//! }
//! drive.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Model
//!
//! Hardware trouble is never an error: a drive that fails to open yields an
//! invalid session, and a failed command yields an empty table, `false` or
//! `None`. Only calling an operation after [`SmartDevice::close`] returns
//! [`Error::Disposed`].
//!
//! ## Platform Support
//!
//! | Platform | Device path | Control channel |
//! |----------|-------------|-----------------|
//! | Windows  | `\\.\PhysicalDriveN` | `SMART_SEND_DRIVE_COMMAND` / `SMART_RCV_DRIVE_DATA` |
//! | Linux    | `/dev/sdX`  | `HDIO_DRIVE_CMD` / `HDIO_DRIVE_TASK` |
//!
//! Opening a drive requires administrator/root privileges.

pub mod ata;
pub mod channel;
pub mod config;
pub mod error;
pub mod session;

pub use ata::{
    threshold_for, AttributeRecord, DriveIdentity, SmartStatus, ThresholdRecord,
    MAX_DRIVE_ATTRIBUTES,
};
pub use config::Config;
pub use error::{Error, Result};
pub use session::SmartDevice;
