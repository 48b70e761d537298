//! Linux SMART control channel via the HDIO ioctls
//!
//! Linux has no SENDCMDINPARAMS-style interface, so each request is decoded
//! back into its operation and re-issued as `HDIO_DRIVE_CMD` (data reads,
//! enable/disable) or `HDIO_DRIVE_TASK` (RETURN STATUS, which needs the
//! output registers). The reply is re-shaped into the same result geometry
//! the Windows driver produces, so decoding is platform independent.

use super::{device_path, DeviceHandle, DeviceOpener};
use crate::ata::result::{DriverStatus, ResultHeader, RESULT_HEADER_SIZE};
use crate::ata::{CommandRequest, DriveCommand, RegisterBlock, SmartOperation, SECTOR_SIZE};
use crate::config::DeviceConfig;
use nix::errno::Errno;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;

const HDIO_DRIVE_TASK: libc::c_ulong = 0x031e; // linux/hdreg.h
const HDIO_DRIVE_CMD: libc::c_ulong = 0x031f; // linux/hdreg.h

// HDIO_DRIVE_CMD argument block: command, sector, feature, nsector, data
const DRIVE_CMD_HEADER: usize = 4;
const DRIVE_CMD_ARGS_SIZE: usize = DRIVE_CMD_HEADER + SECTOR_SIZE;

// HDIO_DRIVE_TASK argument block: command, feature, nsector, sector, lcyl, hcyl, select
const DRIVE_TASK_ARGS_SIZE: usize = 7;

fn invalid_input(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg.to_string())
}

/// Build the `HDIO_DRIVE_CMD` argument block for `request`
fn drive_cmd_args(
    operation: SmartOperation,
    request: &CommandRequest,
) -> [u8; DRIVE_CMD_ARGS_SIZE] {
    let regs = &request.registers;
    let mut args = [0u8; DRIVE_CMD_ARGS_SIZE];
    args[0] = regs.command;
    args[1] = regs.sector_number;
    args[2] = regs.features;
    // A non-zero sector count makes the kernel expect a data-in transfer
    args[3] = if operation.transfers_sector() {
        regs.sector_count
    } else {
        0
    };
    args
}

/// Re-shape a completed `HDIO_DRIVE_CMD` block into header plus sector.
///
/// On return the kernel leaves status in `args[0]`, error in `args[1]` and
/// the sector in `args[4..]`. `output` must hold `operation.result_size()`.
fn reshape_drive_cmd(
    operation: SmartOperation,
    request: &CommandRequest,
    args: &[u8; DRIVE_CMD_ARGS_SIZE],
    output: &mut [u8],
) -> usize {
    let header = ResultHeader {
        buffer_size: request.buffer_size,
        status: DriverStatus {
            driver_error: 0,
            ide_error: args[1],
        },
    };
    output[..RESULT_HEADER_SIZE].copy_from_slice(&header.to_bytes());

    if operation.transfers_sector() {
        output[RESULT_HEADER_SIZE..RESULT_HEADER_SIZE + SECTOR_SIZE]
            .copy_from_slice(&args[DRIVE_CMD_HEADER..]);
    }

    operation.result_size()
}

/// Build the `HDIO_DRIVE_TASK` argument block for `request`
fn drive_task_args(request: &CommandRequest) -> [u8; DRIVE_TASK_ARGS_SIZE] {
    let regs = &request.registers;
    [
        regs.command,
        regs.features,
        regs.sector_count,
        regs.sector_number,
        regs.lba_mid,
        regs.lba_high,
        regs.device_head,
    ]
}

/// Re-shape a completed `HDIO_DRIVE_TASK` block into header plus registers.
///
/// On return the block holds status, error, nsector, sector, lcyl, hcyl,
/// select; status lands in `command` and error in `features`.
fn reshape_drive_task(
    operation: SmartOperation,
    request: &CommandRequest,
    args: &[u8; DRIVE_TASK_ARGS_SIZE],
    output: &mut [u8],
) -> usize {
    let returned = RegisterBlock {
        features: args[1],
        sector_count: args[2],
        sector_number: args[3],
        lba_mid: args[4],
        lba_high: args[5],
        device_head: args[6],
        command: args[0],
        reserved: 0,
    };

    let header = ResultHeader {
        buffer_size: request.buffer_size,
        status: DriverStatus {
            driver_error: 0,
            ide_error: args[1],
        },
    };
    output[..RESULT_HEADER_SIZE].copy_from_slice(&header.to_bytes());
    output[RESULT_HEADER_SIZE..operation.result_size()].copy_from_slice(&returned.to_bytes());

    operation.result_size()
}

/// Open block device, closed on drop
#[derive(Debug)]
pub struct LinuxHandle {
    file: File,
    path: String,
}

impl LinuxHandle {
    pub fn path(&self) -> &str {
        &self.path
    }

    fn drive_cmd(
        &mut self,
        operation: SmartOperation,
        request: &CommandRequest,
        output: &mut [u8],
    ) -> io::Result<usize> {
        let mut args = drive_cmd_args(operation, request);

        let ret = unsafe {
            libc::ioctl(self.file.as_raw_fd(), HDIO_DRIVE_CMD as _, args.as_mut_ptr())
        };
        Errno::result(ret).map_err(io::Error::from)?;

        Ok(reshape_drive_cmd(operation, request, &args, output))
    }

    fn drive_task(
        &mut self,
        operation: SmartOperation,
        request: &CommandRequest,
        output: &mut [u8],
    ) -> io::Result<usize> {
        let mut args = drive_task_args(request);

        let ret = unsafe {
            libc::ioctl(self.file.as_raw_fd(), HDIO_DRIVE_TASK as _, args.as_mut_ptr())
        };
        Errno::result(ret).map_err(io::Error::from)?;

        Ok(reshape_drive_task(operation, request, &args, output))
    }
}

impl DeviceHandle for LinuxHandle {
    fn io_control(
        &mut self,
        code: DriveCommand,
        input: &[u8],
        output: &mut [u8],
    ) -> io::Result<usize> {
        let request =
            CommandRequest::from_bytes(input).ok_or_else(|| invalid_input("short request"))?;
        let operation = SmartOperation::from_registers(&request.registers)
            .ok_or_else(|| invalid_input("unsupported ATA command"))?;

        if operation.direction() != code {
            return Err(invalid_input("direction does not match command"));
        }
        if output.len() < operation.result_size() {
            return Err(invalid_input("result buffer too small"));
        }

        match operation {
            SmartOperation::ReturnStatus => self.drive_task(operation, &request, output),
            _ => self.drive_cmd(operation, &request, output),
        }
    }
}

/// Opens `/dev/sdX`-style block devices by index
#[derive(Debug, Clone)]
pub struct LinuxOpener {
    path_template: String,
}

impl LinuxOpener {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            path_template: config.path_template.clone(),
        }
    }
}

impl Default for LinuxOpener {
    fn default() -> Self {
        Self::from_config(&DeviceConfig::default())
    }
}

impl DeviceOpener for LinuxOpener {
    type Handle = LinuxHandle;

    fn open(&self, drive_index: u8) -> io::Result<LinuxHandle> {
        let path = device_path(&self.path_template, drive_index);
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path, e)))?;

        Ok(LinuxHandle { file, path })
    }
}
