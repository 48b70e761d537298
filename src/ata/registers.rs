// ATA task-file register block
//
// Mirrors the IDEREGS layout the SMART control channel marshals: seven
// one-byte registers followed by a reserved byte, packed with no padding.

use serde::{Deserialize, Serialize};

/// Encoded size of a register block in bytes
pub const REGISTER_BLOCK_SIZE: usize = 8;

/// LBA-mid value that marks a SMART sub-command
pub const SMART_LBA_MID: u8 = 0x4F;
/// LBA-high value that marks a SMART sub-command
pub const SMART_LBA_HI: u8 = 0xC2;

/// LBA-mid value returned by SMART RETURN STATUS when a threshold is exceeded
pub const SMART_LBA_MID_EXCEEDED: u8 = 0xF4;
/// LBA-high value returned by SMART RETURN STATUS when a threshold is exceeded
pub const SMART_LBA_HI_EXCEEDED: u8 = 0x2C;

/// Base value of the device/head register (obsolete bits 7 and 5 set)
pub const DEVICE_HEAD_BASE: u8 = 0xA0;

// Field offsets inside the encoded block
const OFF_FEATURES: usize = 0;
const OFF_SECTOR_COUNT: usize = 1;
const OFF_SECTOR_NUMBER: usize = 2;
const OFF_LBA_MID: usize = 3;
const OFF_LBA_HIGH: usize = 4;
const OFF_DEVICE_HEAD: usize = 5;
const OFF_COMMAND: usize = 6;
const OFF_RESERVED: usize = 7;

/// Command register values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RegisterCommand {
    /// SMART command family
    Smart = 0xB0,
    /// IDENTIFY DEVICE
    Identify = 0xEC,
}

/// Feature register values selecting a SMART sub-command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RegisterFeature {
    SmartReadData = 0xD0,
    SmartReadThresholds = 0xD1,
    SmartEnableOperations = 0xD8,
    SmartDisableOperations = 0xD9,
    SmartReturnStatus = 0xDA,
}

/// ATA task-file registers, one byte each
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterBlock {
    pub features: u8,
    pub sector_count: u8,
    /// Sector number, also LBA-low
    pub sector_number: u8,
    /// Cylinder low, also LBA-mid
    pub lba_mid: u8,
    /// Cylinder high, also LBA-high
    pub lba_high: u8,
    pub device_head: u8,
    pub command: u8,
    pub reserved: u8,
}

impl RegisterBlock {
    /// Encode into the on-wire byte layout
    pub fn to_bytes(&self) -> [u8; REGISTER_BLOCK_SIZE] {
        let mut out = [0u8; REGISTER_BLOCK_SIZE];
        out[OFF_FEATURES] = self.features;
        out[OFF_SECTOR_COUNT] = self.sector_count;
        out[OFF_SECTOR_NUMBER] = self.sector_number;
        out[OFF_LBA_MID] = self.lba_mid;
        out[OFF_LBA_HIGH] = self.lba_high;
        out[OFF_DEVICE_HEAD] = self.device_head;
        out[OFF_COMMAND] = self.command;
        out[OFF_RESERVED] = self.reserved;
        out
    }

    /// Decode from the on-wire byte layout
    ///
    /// Returns `None` if fewer than [`REGISTER_BLOCK_SIZE`] bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < REGISTER_BLOCK_SIZE {
            return None;
        }

        Some(Self {
            features: bytes[OFF_FEATURES],
            sector_count: bytes[OFF_SECTOR_COUNT],
            sector_number: bytes[OFF_SECTOR_NUMBER],
            lba_mid: bytes[OFF_LBA_MID],
            lba_high: bytes[OFF_LBA_HIGH],
            device_head: bytes[OFF_DEVICE_HEAD],
            command: bytes[OFF_COMMAND],
            reserved: bytes[OFF_RESERVED],
        })
    }

    /// Whether LBA-mid/high carry the SMART signature
    pub fn has_smart_signature(&self) -> bool {
        self.lba_mid == SMART_LBA_MID && self.lba_high == SMART_LBA_HI
    }

    /// Whether LBA-mid/high carry the "threshold exceeded" status signature
    pub fn has_exceeded_signature(&self) -> bool {
        self.lba_mid == SMART_LBA_MID_EXCEEDED && self.lba_high == SMART_LBA_HI_EXCEEDED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_offsets() {
        let regs = RegisterBlock {
            features: 1,
            sector_count: 2,
            sector_number: 3,
            lba_mid: 4,
            lba_high: 5,
            device_head: 6,
            command: 7,
            reserved: 8,
        };
        assert_eq!(regs.to_bytes(), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(RegisterBlock::from_bytes(&regs.to_bytes()), Some(regs));
    }

    #[test]
    fn test_short_input_rejected() {
        assert_eq!(RegisterBlock::from_bytes(&[0u8; 7]), None);
    }

    #[test]
    fn test_signatures() {
        let mut regs = RegisterBlock {
            lba_mid: SMART_LBA_MID,
            lba_high: SMART_LBA_HI,
            ..Default::default()
        };
        assert!(regs.has_smart_signature());
        assert!(!regs.has_exceeded_signature());

        regs.lba_mid = SMART_LBA_MID_EXCEEDED;
        regs.lba_high = SMART_LBA_HI_EXCEEDED;
        assert!(!regs.has_smart_signature());
        assert!(regs.has_exceeded_signature());
    }

    #[test]
    fn test_code_values() {
        assert_eq!(RegisterCommand::Smart as u8, 0xB0);
        assert_eq!(RegisterCommand::Identify as u8, 0xEC);
        assert_eq!(RegisterFeature::SmartReadData as u8, 0xD0);
        assert_eq!(RegisterFeature::SmartReadThresholds as u8, 0xD1);
        assert_eq!(RegisterFeature::SmartEnableOperations as u8, 0xD8);
    }
}
