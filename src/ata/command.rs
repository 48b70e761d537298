// Drive command requests
//
// Builds the SENDCMDINPARAMS-shaped request for each SMART operation. The
// mapping from operation to register values is fixed; nothing here can fail.

use super::registers::{
    RegisterBlock, RegisterCommand, RegisterFeature, DEVICE_HEAD_BASE, REGISTER_BLOCK_SIZE,
    SMART_LBA_HI, SMART_LBA_MID,
};
use super::result::{
    COMMAND_RESULT_SIZE, IDENTIFY_RESULT_SIZE, SMART_DATA_RESULT_SIZE, SMART_STATUS_RESULT_SIZE,
    SMART_THRESHOLDS_RESULT_SIZE,
};
use serde::{Deserialize, Serialize};

/// Encoded size of a command request in bytes
pub const COMMAND_REQUEST_SIZE: usize = 32;

/// Size of the single sector returned by the data-transferring commands
pub const SECTOR_SIZE: usize = 512;

const OFF_BUFFER_SIZE: usize = 0;
const OFF_REGISTERS: usize = 4;
const OFF_DRIVE_NUMBER: usize = OFF_REGISTERS + REGISTER_BLOCK_SIZE;

/// Control-channel operation codes (the transfer direction of a request)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum DriveCommand {
    /// Issue a command that returns no sector data
    SendDriveCommand = 0x0007_C084,
    /// Issue a command and receive its data
    ReceiveDriveData = 0x0007_C088,
}

impl DriveCommand {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// The SMART operations a session can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmartOperation {
    EnableSmart,
    DisableSmart,
    ReadData,
    ReadThresholds,
    ReturnStatus,
    Identify,
}

impl SmartOperation {
    /// Recover the operation a register block encodes
    pub fn from_registers(registers: &RegisterBlock) -> Option<Self> {
        if registers.command == RegisterCommand::Identify as u8 {
            return Some(SmartOperation::Identify);
        }
        if registers.command != RegisterCommand::Smart as u8 {
            return None;
        }

        const ENABLE: u8 = RegisterFeature::SmartEnableOperations as u8;
        const DISABLE: u8 = RegisterFeature::SmartDisableOperations as u8;
        const READ_DATA: u8 = RegisterFeature::SmartReadData as u8;
        const READ_THRESHOLDS: u8 = RegisterFeature::SmartReadThresholds as u8;
        const RETURN_STATUS: u8 = RegisterFeature::SmartReturnStatus as u8;

        match registers.features {
            ENABLE => Some(SmartOperation::EnableSmart),
            DISABLE => Some(SmartOperation::DisableSmart),
            READ_DATA => Some(SmartOperation::ReadData),
            READ_THRESHOLDS => Some(SmartOperation::ReadThresholds),
            RETURN_STATUS => Some(SmartOperation::ReturnStatus),
            _ => None,
        }
    }

    /// Feature register value, `None` for plain ATA commands
    pub fn feature(self) -> Option<RegisterFeature> {
        match self {
            SmartOperation::EnableSmart => Some(RegisterFeature::SmartEnableOperations),
            SmartOperation::DisableSmart => Some(RegisterFeature::SmartDisableOperations),
            SmartOperation::ReadData => Some(RegisterFeature::SmartReadData),
            SmartOperation::ReadThresholds => Some(RegisterFeature::SmartReadThresholds),
            SmartOperation::ReturnStatus => Some(RegisterFeature::SmartReturnStatus),
            SmartOperation::Identify => None,
        }
    }

    pub fn command(self) -> RegisterCommand {
        match self {
            SmartOperation::Identify => RegisterCommand::Identify,
            _ => RegisterCommand::Smart,
        }
    }

    /// Control-channel direction. Depends on the operation kind only.
    pub fn direction(self) -> DriveCommand {
        match self {
            SmartOperation::EnableSmart
            | SmartOperation::DisableSmart
            | SmartOperation::ReturnStatus => DriveCommand::SendDriveCommand,
            SmartOperation::ReadData
            | SmartOperation::ReadThresholds
            | SmartOperation::Identify => DriveCommand::ReceiveDriveData,
        }
    }

    /// Whether the device answers with a 512-byte sector
    pub fn transfers_sector(self) -> bool {
        matches!(
            self,
            SmartOperation::ReadData | SmartOperation::ReadThresholds | SmartOperation::Identify
        )
    }

    /// Exact size of the result structure the control channel fills
    pub fn result_size(self) -> usize {
        match self {
            SmartOperation::EnableSmart | SmartOperation::DisableSmart => COMMAND_RESULT_SIZE,
            SmartOperation::ReturnStatus => SMART_STATUS_RESULT_SIZE,
            SmartOperation::ReadData => SMART_DATA_RESULT_SIZE,
            SmartOperation::ReadThresholds => SMART_THRESHOLDS_RESULT_SIZE,
            SmartOperation::Identify => IDENTIFY_RESULT_SIZE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SmartOperation::EnableSmart => "SMART ENABLE OPERATIONS",
            SmartOperation::DisableSmart => "SMART DISABLE OPERATIONS",
            SmartOperation::ReadData => "SMART READ DATA",
            SmartOperation::ReadThresholds => "SMART READ THRESHOLDS",
            SmartOperation::ReturnStatus => "SMART RETURN STATUS",
            SmartOperation::Identify => "IDENTIFY DEVICE",
        }
    }
}

/// A complete device-command request: target drive plus register block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Size of the data buffer the caller expects back
    pub buffer_size: u32,
    pub registers: RegisterBlock,
    /// 0-based physical drive index
    pub drive_index: u8,
}

impl CommandRequest {
    /// Build the request for `operation` addressed to `drive_index`
    pub fn new(operation: SmartOperation, drive_index: u8) -> Self {
        let (lba_mid, lba_high) = match operation.command() {
            RegisterCommand::Smart => (SMART_LBA_MID, SMART_LBA_HI),
            RegisterCommand::Identify => (0, 0),
        };

        let registers = RegisterBlock {
            features: operation.feature().map(|f| f as u8).unwrap_or(0),
            sector_count: 1,
            sector_number: 1,
            lba_mid,
            lba_high,
            device_head: DEVICE_HEAD_BASE | ((drive_index & 1) << 4),
            command: operation.command() as u8,
            reserved: 0,
        };

        let buffer_size = if operation.transfers_sector() {
            SECTOR_SIZE as u32
        } else {
            0
        };

        Self {
            buffer_size,
            registers,
            drive_index,
        }
    }

    pub fn enable_smart(drive_index: u8) -> Self {
        Self::new(SmartOperation::EnableSmart, drive_index)
    }

    pub fn read_data(drive_index: u8) -> Self {
        Self::new(SmartOperation::ReadData, drive_index)
    }

    pub fn read_thresholds(drive_index: u8) -> Self {
        Self::new(SmartOperation::ReadThresholds, drive_index)
    }

    pub fn identify(drive_index: u8) -> Self {
        Self::new(SmartOperation::Identify, drive_index)
    }

    /// Encode into the 32-byte request layout
    pub fn to_bytes(&self) -> [u8; COMMAND_REQUEST_SIZE] {
        let mut out = [0u8; COMMAND_REQUEST_SIZE];
        out[OFF_BUFFER_SIZE..OFF_REGISTERS].copy_from_slice(&self.buffer_size.to_le_bytes());
        out[OFF_REGISTERS..OFF_DRIVE_NUMBER].copy_from_slice(&self.registers.to_bytes());
        out[OFF_DRIVE_NUMBER] = self.drive_index;
        out
    }

    /// Decode a request previously produced by [`CommandRequest::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < COMMAND_REQUEST_SIZE {
            return None;
        }

        let buffer_size = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let registers = RegisterBlock::from_bytes(&bytes[OFF_REGISTERS..OFF_DRIVE_NUMBER])?;

        Some(Self {
            buffer_size,
            registers,
            drive_index: bytes[OFF_DRIVE_NUMBER],
        })
    }
}
