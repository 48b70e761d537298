//! SMART device session
//!
//! [`SmartDevice`] owns the handle to one physical drive and exposes the
//! SMART operations on it. The session is in one of three states:
//!
//! - valid: the drive opened, commands go to the control channel
//! - invalid: the open failed, every read degrades to its empty result
//! - closed: terminal, every operation returns [`crate::Error::Disposed`]
//!
//! [`SmartDevice::is_valid`] records the outcome of the open and does not
//! change on close.
//!
//! Hardware failures never raise errors so monitoring loops can poll
//! opportunistically; only use after [`SmartDevice::close`] does.
//!
//! A session is not safe for concurrent commands. Use one session per thread
//! or serialize access externally.

use crate::ata::result::{decode_attributes, decode_identity, decode_status, decode_thresholds};
use crate::ata::{
    AttributeRecord, CommandRequest, DriveIdentity, SmartOperation, SmartStatus, ThresholdRecord,
};
use crate::channel::{
    self, DeviceHandle, DeviceOpener, HandleState, PlatformHandle, PlatformOpener,
};
use crate::config::DeviceConfig;
use crate::error::Result;

/// SMART access to one physical drive
#[derive(Debug)]
pub struct SmartDevice<H: DeviceHandle = PlatformHandle> {
    drive_index: u8,
    opened: bool,
    state: HandleState<H>,
}

impl SmartDevice<PlatformHandle> {
    /// Open physical drive `drive_index` with the default device settings.
    ///
    /// Never fails: an open failure leaves the session invalid.
    pub fn open(drive_index: u8) -> Self {
        Self::open_with(&PlatformOpener::default(), drive_index)
    }

    /// Open physical drive `drive_index` using `config`
    pub fn open_configured(config: &DeviceConfig, drive_index: u8) -> Self {
        Self::open_with_config(&PlatformOpener::from_config(config), config, drive_index)
    }
}

impl<H: DeviceHandle> SmartDevice<H> {
    /// Open `drive_index` through `opener`
    pub fn open_with<O>(opener: &O, drive_index: u8) -> Self
    where
        O: DeviceOpener<Handle = H>,
    {
        let state = match opener.open(drive_index) {
            Ok(handle) => {
                log::debug!("Opened drive {}", drive_index);
                HandleState::Open(handle)
            }
            Err(e) => {
                log::warn!("Failed to open drive {}: {}", drive_index, e);
                HandleState::Invalid
            }
        };

        Self {
            drive_index,
            opened: state.is_open(),
            state,
        }
    }

    /// Open `drive_index` through `opener`, applying `config` options
    pub fn open_with_config<O>(opener: &O, config: &DeviceConfig, drive_index: u8) -> Self
    where
        O: DeviceOpener<Handle = H>,
    {
        let mut device = Self::open_with(opener, drive_index);
        if config.enable_on_open && device.opened {
            // A fresh session cannot be closed yet
            let enabled = device.enable_smart().unwrap_or(false);
            if !enabled {
                log::warn!("SMART ENABLE failed on drive {}", drive_index);
            }
        }
        device
    }

    /// 0-based physical drive index this session addresses
    pub fn drive_index(&self) -> u8 {
        self.drive_index
    }

    /// Whether the drive opened successfully. Unaffected by [`Self::close`];
    /// use [`Self::is_closed`] for the lifecycle.
    pub fn is_valid(&self) -> bool {
        self.opened
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn execute(&mut self, operation: SmartOperation) -> Result<Option<Vec<u8>>> {
        let request = CommandRequest::new(operation, self.drive_index);
        channel::invoke(&mut self.state, operation, &request)
    }

    /// Send SMART ENABLE OPERATIONS. `Ok(false)` if the drive refused or
    /// the session is invalid.
    pub fn enable_smart(&mut self) -> Result<bool> {
        Ok(self.execute(SmartOperation::EnableSmart)?.is_some())
    }

    /// Send SMART DISABLE OPERATIONS
    pub fn disable_smart(&mut self) -> Result<bool> {
        Ok(self.execute(SmartOperation::DisableSmart)?.is_some())
    }

    /// Read the attribute table.
    ///
    /// Returns all table slots, including unused ones with id 0, or an empty
    /// vector when the read failed.
    pub fn read_smart_data(&mut self) -> Result<Vec<AttributeRecord>> {
        let result = self.execute(SmartOperation::ReadData)?;
        Ok(decode_attributes(result.as_deref()))
    }

    /// Read the threshold table, same conventions as [`Self::read_smart_data`]
    pub fn read_smart_thresholds(&mut self) -> Result<Vec<ThresholdRecord>> {
        let result = self.execute(SmartOperation::ReadThresholds)?;
        Ok(decode_thresholds(result.as_deref()))
    }

    /// Query the drive's overall SMART verdict
    pub fn read_smart_status(&mut self) -> Result<Option<SmartStatus>> {
        let result = self.execute(SmartOperation::ReturnStatus)?;
        Ok(decode_status(result.as_deref()))
    }

    /// Read model, firmware revision and serial number
    pub fn read_identity(&mut self) -> Result<Option<DriveIdentity>> {
        let result = self.execute(SmartOperation::Identify)?;
        Ok(decode_identity(result.as_deref()))
    }

    /// Read the model name and firmware revision.
    ///
    /// `Ok(None)` means the read failed and neither string is available.
    pub fn read_name_and_firmware_revision(&mut self) -> Result<Option<(String, String)>> {
        Ok(self
            .read_identity()?
            .map(|identity| (identity.model, identity.firmware_revision)))
    }

    /// Release the drive handle. Closing again is a no-op.
    pub fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }
        log::debug!("Closing drive {}", self.drive_index);
        // Dropping the handle releases the OS resource
        self.state = HandleState::Closed;
    }
}
