//! ATA SMART wire formats
//!
//! Byte-exact encoders and decoders for the structures exchanged with the
//! SMART control channel:
//! - [`registers`]: the task-file register block
//! - [`command`]: per-operation command requests
//! - [`result`]: result geometry and decoding of attribute, threshold,
//!   status and identify payloads

pub mod command;
pub mod registers;
pub mod result;

pub use command::{CommandRequest, DriveCommand, SmartOperation, COMMAND_REQUEST_SIZE, SECTOR_SIZE};
pub use registers::{RegisterBlock, RegisterCommand, RegisterFeature, SMART_LBA_HI, SMART_LBA_MID};
pub use result::{
    identify_string, threshold_for, AttributeRecord, DriveIdentity, SmartStatus, ThresholdRecord,
    MAX_DRIVE_ATTRIBUTES,
};
