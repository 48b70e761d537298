// Result buffers returned by the SMART control channel
//
// Every result starts with a 16-byte SENDCMDOUTPARAMS header (buffer size
// plus driver status). Data-returning commands append one 512-byte sector,
// RETURN STATUS appends the device's register block.

use super::command::SECTOR_SIZE;
use super::registers::{RegisterBlock, REGISTER_BLOCK_SIZE};
use serde::{Deserialize, Serialize};

/// Size of the result header (buffer size + driver status)
pub const RESULT_HEADER_SIZE: usize = 16;
/// Result size for commands without data (enable/disable)
pub const COMMAND_RESULT_SIZE: usize = RESULT_HEADER_SIZE;
/// Result size for SMART RETURN STATUS
pub const SMART_STATUS_RESULT_SIZE: usize = RESULT_HEADER_SIZE + REGISTER_BLOCK_SIZE;
/// Result size for SMART READ DATA
pub const SMART_DATA_RESULT_SIZE: usize = RESULT_HEADER_SIZE + SECTOR_SIZE;
/// Result size for SMART READ THRESHOLDS
pub const SMART_THRESHOLDS_RESULT_SIZE: usize = RESULT_HEADER_SIZE + SECTOR_SIZE;
/// Result size for IDENTIFY DEVICE
pub const IDENTIFY_RESULT_SIZE: usize = RESULT_HEADER_SIZE + SECTOR_SIZE;

/// Number of entries in the attribute and threshold tables
pub const MAX_DRIVE_ATTRIBUTES: usize = 30;
pub const ATTRIBUTE_RECORD_SIZE: usize = 12;
pub const THRESHOLD_RECORD_SIZE: usize = 12;

// Tables follow the 2-byte revision number at the start of the sector
const TABLE_OFFSET: usize = 2;

// Identify block string ranges, as sector byte offsets
const SERIAL_NUMBER_RANGE: std::ops::Range<usize> = 20..40;
const FIRMWARE_REVISION_RANGE: std::ops::Range<usize> = 46..54;
const MODEL_NUMBER_RANGE: std::ops::Range<usize> = 54..94;

/// Driver status block of the result header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverStatus {
    pub driver_error: u8,
    /// Content of the ATA error register
    pub ide_error: u8,
}

/// Decoded result header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultHeader {
    pub buffer_size: u32,
    pub status: DriverStatus,
}

impl ResultHeader {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < RESULT_HEADER_SIZE {
            return None;
        }

        Some(Self {
            buffer_size: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            status: DriverStatus {
                driver_error: bytes[4],
                ide_error: bytes[5],
            },
        })
    }

    pub fn to_bytes(&self) -> [u8; RESULT_HEADER_SIZE] {
        let mut out = [0u8; RESULT_HEADER_SIZE];
        out[0..4].copy_from_slice(&self.buffer_size.to_le_bytes());
        out[4] = self.status.driver_error;
        out[5] = self.status.ide_error;
        out
    }
}

/// One entry of the SMART attribute table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    /// Attribute ID, 0 for unused slots
    pub id: u8,
    pub status_flags: u16,
    /// Current normalized value (1-253)
    pub current_value: u8,
    /// Worst normalized value seen
    pub worst_value: u8,
    /// Vendor-specific raw value, little-endian
    pub raw_value: [u8; 6],
    pub reserved: u8,
}

impl AttributeRecord {
    pub fn from_bytes(bytes: &[u8; ATTRIBUTE_RECORD_SIZE]) -> Self {
        Self {
            id: bytes[0],
            status_flags: u16::from_le_bytes([bytes[1], bytes[2]]),
            current_value: bytes[3],
            worst_value: bytes[4],
            raw_value: [bytes[5], bytes[6], bytes[7], bytes[8], bytes[9], bytes[10]],
            reserved: bytes[11],
        }
    }

    pub fn to_bytes(&self) -> [u8; ATTRIBUTE_RECORD_SIZE] {
        let mut out = [0u8; ATTRIBUTE_RECORD_SIZE];
        out[0] = self.id;
        out[1..3].copy_from_slice(&self.status_flags.to_le_bytes());
        out[3] = self.current_value;
        out[4] = self.worst_value;
        out[5..11].copy_from_slice(&self.raw_value);
        out[11] = self.reserved;
        out
    }

    /// Raw value as an integer
    pub fn raw(&self) -> u64 {
        let r = &self.raw_value;
        u64::from_le_bytes([r[0], r[1], r[2], r[3], r[4], r[5], 0, 0])
    }

    /// Unused table slot
    pub fn is_empty(&self) -> bool {
        self.id == 0
    }
}

/// One entry of the SMART threshold table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRecord {
    pub id: u8,
    pub threshold: u8,
    pub reserved: [u8; 10],
}

impl ThresholdRecord {
    pub fn from_bytes(bytes: &[u8; THRESHOLD_RECORD_SIZE]) -> Self {
        let mut reserved = [0u8; 10];
        reserved.copy_from_slice(&bytes[2..]);
        Self {
            id: bytes[0],
            threshold: bytes[1],
            reserved,
        }
    }

    pub fn to_bytes(&self) -> [u8; THRESHOLD_RECORD_SIZE] {
        let mut out = [0u8; THRESHOLD_RECORD_SIZE];
        out[0] = self.id;
        out[1] = self.threshold;
        out[2..].copy_from_slice(&self.reserved);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.id == 0
    }
}

/// Identity strings taken from the IDENTIFY DEVICE block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveIdentity {
    pub model: String,
    pub firmware_revision: String,
    pub serial_number: String,
}

/// Outcome of SMART RETURN STATUS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmartStatus {
    /// No threshold exceeded
    Ok,
    /// At least one attribute crossed its failure threshold
    ThresholdExceeded,
    /// The device answered with an unrecognized register signature
    Unknown,
}

fn sector_payload(result: &[u8]) -> Option<&[u8]> {
    result.get(RESULT_HEADER_SIZE..RESULT_HEADER_SIZE + SECTOR_SIZE)
}

/// Decode the attribute table of a SMART READ DATA result
///
/// `None` (invalid call) and short buffers decode to an empty table; a valid
/// result always yields all [`MAX_DRIVE_ATTRIBUTES`] entries, unused ones
/// included.
pub fn decode_attributes(result: Option<&[u8]>) -> Vec<AttributeRecord> {
    let Some(sector) = result.and_then(sector_payload) else {
        return Vec::new();
    };

    sector[TABLE_OFFSET..TABLE_OFFSET + MAX_DRIVE_ATTRIBUTES * ATTRIBUTE_RECORD_SIZE]
        .chunks_exact(ATTRIBUTE_RECORD_SIZE)
        .filter_map(|chunk| chunk.try_into().ok())
        .map(AttributeRecord::from_bytes)
        .collect()
}

/// Decode the threshold table of a SMART READ THRESHOLDS result
pub fn decode_thresholds(result: Option<&[u8]>) -> Vec<ThresholdRecord> {
    let Some(sector) = result.and_then(sector_payload) else {
        return Vec::new();
    };

    sector[TABLE_OFFSET..TABLE_OFFSET + MAX_DRIVE_ATTRIBUTES * THRESHOLD_RECORD_SIZE]
        .chunks_exact(THRESHOLD_RECORD_SIZE)
        .filter_map(|chunk| chunk.try_into().ok())
        .map(ThresholdRecord::from_bytes)
        .collect()
}

/// Decode the identity strings of an IDENTIFY DEVICE result
pub fn decode_identity(result: Option<&[u8]>) -> Option<DriveIdentity> {
    let sector = result.and_then(sector_payload)?;

    Some(DriveIdentity {
        model: identify_string(&sector[MODEL_NUMBER_RANGE]),
        firmware_revision: identify_string(&sector[FIRMWARE_REVISION_RANGE]),
        serial_number: identify_string(&sector[SERIAL_NUMBER_RANGE]),
    })
}

/// Decode the register block returned by SMART RETURN STATUS
pub fn decode_status(result: Option<&[u8]>) -> Option<SmartStatus> {
    let regs = RegisterBlock::from_bytes(result?.get(RESULT_HEADER_SIZE..)?)?;

    Some(if regs.has_smart_signature() {
        SmartStatus::Ok
    } else if regs.has_exceeded_signature() {
        SmartStatus::ThresholdExceeded
    } else {
        SmartStatus::Unknown
    })
}

/// Convert an ATA identify string field to text.
///
/// ATA strings are stored as 16-bit words with the first character in the
/// high byte, so each byte pair is swapped before reading. Leading and
/// trailing spaces and NULs are removed. `raw` must have even length.
pub fn identify_string(raw: &[u8]) -> String {
    debug_assert!(raw.len() % 2 == 0, "ATA string fields are whole words");

    raw.chunks_exact(2)
        .flat_map(|pair| [pair[1], pair[0]])
        .map(|b| b as char)
        .collect::<String>()
        .trim_matches(|c: char| c == ' ' || c == '\0')
        .to_string()
}

/// Look up the failure threshold for attribute `id`
pub fn threshold_for(thresholds: &[ThresholdRecord], id: u8) -> Option<u8> {
    if id == 0 {
        return None;
    }
    thresholds.iter().find(|t| t.id == id).map(|t| t.threshold)
}
