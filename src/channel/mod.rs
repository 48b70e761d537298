//! Control channel to a physical drive
//!
//! A [`DeviceOpener`] turns a drive index into a [`DeviceHandle`]; the
//! handle exposes the OS device I/O control primitive. [`invoke`] issues one
//! SMART command through it and enforces the result-size contract.
//!
//! Platform support:
//! - Windows: `\\.\PhysicalDriveN` + `DeviceIoControl(SMART_*_DRIVE_*)`
//! - Linux: `/dev/sdX` + `HDIO_DRIVE_CMD` / `HDIO_DRIVE_TASK`
//! - elsewhere: every open fails, so sessions stay invalid

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(test)]
pub(crate) mod mock;

use crate::ata::{CommandRequest, DriveCommand, SmartOperation};
use crate::error::{Error, Result};
use std::io;

/// An open device that accepts I/O control calls.
///
/// The OS resource is released when the handle is dropped.
pub trait DeviceHandle {
    /// Issue `code` with `input` and fill `output`.
    ///
    /// Returns the number of bytes the OS reports as transferred.
    fn io_control(&mut self, code: DriveCommand, input: &[u8], output: &mut [u8])
        -> io::Result<usize>;
}

/// Opens drives by 0-based physical index
pub trait DeviceOpener {
    type Handle: DeviceHandle;

    fn open(&self, drive_index: u8) -> io::Result<Self::Handle>;
}

/// Lifecycle of the handle owned by a session
#[derive(Debug)]
pub enum HandleState<H> {
    /// Opened successfully
    Open(H),
    /// Open failed; calls are absorbed as failures
    Invalid,
    /// Closed, terminal
    Closed,
}

impl<H> HandleState<H> {
    pub fn is_open(&self) -> bool {
        matches!(self, HandleState::Open(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, HandleState::Closed)
    }
}

/// Issue `request` for `operation` through the handle in `state`.
///
/// Returns `Ok(Some(buffer))` with a buffer of exactly
/// [`SmartOperation::result_size`] bytes when the call succeeded and
/// transferred the whole result, `Ok(None)` when the handle is invalid or the
/// call failed, and [`Error::Disposed`] when the handle was closed.
pub fn invoke<H: DeviceHandle>(
    state: &mut HandleState<H>,
    operation: SmartOperation,
    request: &CommandRequest,
) -> Result<Option<Vec<u8>>> {
    let handle = match state {
        HandleState::Open(handle) => handle,
        HandleState::Invalid => {
            log::trace!(
                "{} on drive {} skipped: handle invalid",
                operation.name(),
                request.drive_index
            );
            return Ok(None);
        }
        HandleState::Closed => return Err(Error::Disposed("SmartDevice")),
    };

    let direction = operation.direction();
    let input = request.to_bytes();
    let mut output = vec![0u8; operation.result_size()];

    log::debug!(
        "{} on drive {} via {:#010x}",
        operation.name(),
        request.drive_index,
        direction.code()
    );

    match handle.io_control(direction, &input, &mut output) {
        Ok(transferred) if transferred >= output.len() => {
            log::trace!("{} returned {} bytes", operation.name(), transferred);
            Ok(Some(output))
        }
        Ok(transferred) => {
            log::warn!(
                "{} on drive {} returned {} of {} bytes",
                operation.name(),
                request.drive_index,
                transferred,
                output.len()
            );
            Ok(None)
        }
        Err(e) => {
            log::warn!(
                "{} on drive {} failed: {}",
                operation.name(),
                request.drive_index,
                e
            );
            Ok(None)
        }
    }
}

/// Expand a drive path template.
///
/// `{index}` becomes the decimal drive index, `{letter}` the block-device
/// letter suffix (0 -> `a`, 25 -> `z`, 26 -> `aa`).
pub fn device_path(template: &str, drive_index: u8) -> String {
    template
        .replace("{index}", &drive_index.to_string())
        .replace("{letter}", &drive_letters(drive_index))
}

fn drive_letters(drive_index: u8) -> String {
    let mut n = drive_index as u32 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

#[cfg(target_os = "windows")]
pub use self::windows::{WindowsHandle as PlatformHandle, WindowsOpener as PlatformOpener};

#[cfg(target_os = "linux")]
pub use self::linux::{LinuxHandle as PlatformHandle, LinuxOpener as PlatformOpener};

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub use self::unsupported::{NoHandle as PlatformHandle, UnsupportedOpener as PlatformOpener};

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod unsupported {
    use super::{DeviceHandle, DeviceOpener};
    use crate::ata::DriveCommand;
    use crate::config::DeviceConfig;
    use std::io;

    /// Uninhabited: no handle can be opened on this platform
    #[derive(Debug)]
    pub enum NoHandle {}

    impl DeviceHandle for NoHandle {
        fn io_control(&mut self, _: DriveCommand, _: &[u8], _: &mut [u8]) -> io::Result<usize> {
            match *self {}
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct UnsupportedOpener;

    impl UnsupportedOpener {
        pub fn from_config(_config: &DeviceConfig) -> Self {
            Self
        }
    }

    impl DeviceOpener for UnsupportedOpener {
        type Handle = NoHandle;

        fn open(&self, drive_index: u8) -> io::Result<NoHandle> {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("SMART passthrough unavailable for drive {}", drive_index),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockOpener, Reply};
    use super::*;
    use crate::ata::result::{COMMAND_RESULT_SIZE, SMART_DATA_RESULT_SIZE};

    #[test]
    fn test_device_path_templates() {
        assert_eq!(
            device_path("\\\\.\\PhysicalDrive{index}", 3),
            "\\\\.\\PhysicalDrive3"
        );
        assert_eq!(device_path("/dev/sd{letter}", 0), "/dev/sda");
        assert_eq!(device_path("/dev/sd{letter}", 25), "/dev/sdz");
        assert_eq!(device_path("/dev/sd{letter}", 26), "/dev/sdaa");
        assert_eq!(device_path("/dev/sd{letter}", 255), "/dev/sdiv");
    }

    #[test]
    fn test_invoke_sizes_buffer_per_operation() {
        let opener = MockOpener::new();
        let mut state = HandleState::Open(opener.open(0).unwrap());

        let request = CommandRequest::enable_smart(0);
        let out = invoke(&mut state, SmartOperation::EnableSmart, &request).unwrap();
        assert_eq!(out.map(|b| b.len()), Some(COMMAND_RESULT_SIZE));

        let request = CommandRequest::read_data(0);
        let out = invoke(&mut state, SmartOperation::ReadData, &request).unwrap();
        assert_eq!(out.map(|b| b.len()), Some(SMART_DATA_RESULT_SIZE));

        let calls = opener.calls();
        assert_eq!(calls[0].output_len, COMMAND_RESULT_SIZE);
        assert_eq!(calls[1].output_len, SMART_DATA_RESULT_SIZE);
        assert!(calls.iter().all(|c| c.input_len == crate::ata::COMMAND_REQUEST_SIZE));
    }

    #[test]
    fn test_direction_independent_of_drive_and_history() {
        let opener = MockOpener::new();
        for index in [0u8, 1, 7, 200] {
            let mut state = HandleState::Open(opener.open(index).unwrap());
            for op in [
                SmartOperation::ReadData,
                SmartOperation::EnableSmart,
                SmartOperation::Identify,
                SmartOperation::ReadThresholds,
                SmartOperation::EnableSmart,
            ] {
                invoke(&mut state, op, &CommandRequest::new(op, index)).unwrap();
            }
        }

        for call in opener.calls() {
            let expected = if call.request.registers.features == 0xD8 {
                DriveCommand::SendDriveCommand
            } else {
                DriveCommand::ReceiveDriveData
            };
            assert_eq!(call.code, expected);
        }
    }

    #[test]
    fn test_failed_and_short_calls_are_absorbed() {
        let opener = MockOpener::new()
            .reply(SmartOperation::ReadData, Reply::Fail)
            .reply(SmartOperation::ReadThresholds, Reply::Short(100));
        let mut state = HandleState::Open(opener.open(0).unwrap());

        let out = invoke(
            &mut state,
            SmartOperation::ReadData,
            &CommandRequest::read_data(0),
        );
        assert!(matches!(out, Ok(None)));

        let out = invoke(
            &mut state,
            SmartOperation::ReadThresholds,
            &CommandRequest::read_thresholds(0),
        );
        assert!(matches!(out, Ok(None)));
    }

    #[test]
    fn test_invalid_and_closed_states() {
        let mut invalid: HandleState<super::mock::MockHandle> = HandleState::Invalid;
        let out = invoke(
            &mut invalid,
            SmartOperation::ReadData,
            &CommandRequest::read_data(0),
        );
        assert!(matches!(out, Ok(None)));

        let mut closed: HandleState<super::mock::MockHandle> = HandleState::Closed;
        let out = invoke(
            &mut closed,
            SmartOperation::ReadData,
            &CommandRequest::read_data(0),
        );
        assert!(matches!(out, Err(Error::Disposed(_))));
    }
}
