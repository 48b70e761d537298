// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2024 NervoSys

//! Windows SMART control channel
//!
//! Opens `\\.\PhysicalDriveN` with read/write access and issues
//! `SMART_SEND_DRIVE_COMMAND` / `SMART_RCV_DRIVE_DATA` through
//! `DeviceIoControl`. Requests and results are passed as raw bytes in the
//! SENDCMDINPARAMS / SENDCMDOUTPARAMS layouts.

use super::{device_path, DeviceHandle, DeviceOpener};
use crate::ata::DriveCommand;
use crate::config::DeviceConfig;
use std::ffi::OsStr;
use std::io;
use std::os::windows::ffi::OsStrExt;
use ::windows::core::PCWSTR;
use ::windows::Win32::Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE};
use ::windows::Win32::Storage::FileSystem::{
    CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use ::windows::Win32::System::IO::DeviceIoControl;

const GENERIC_READ_WRITE: u32 = 0x80000000 | 0x40000000;

/// Open handle to a physical drive, closed on drop
#[derive(Debug)]
pub struct WindowsHandle {
    handle: HANDLE,
    path: String,
}

impl WindowsHandle {
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl DeviceHandle for WindowsHandle {
    fn io_control(
        &mut self,
        code: DriveCommand,
        input: &[u8],
        output: &mut [u8],
    ) -> io::Result<usize> {
        let mut bytes_returned: u32 = 0;

        let result = unsafe {
            DeviceIoControl(
                self.handle,
                code.code(),
                Some(input.as_ptr() as *const _),
                input.len() as u32,
                Some(output.as_mut_ptr() as *mut _),
                output.len() as u32,
                Some(&mut bytes_returned),
                None,
            )
        };

        result.map_err(io::Error::from)?;
        Ok(bytes_returned as usize)
    }
}

impl Drop for WindowsHandle {
    fn drop(&mut self) {
        let _close_result: std::result::Result<(), _> = unsafe { CloseHandle(self.handle) };
        log::trace!("Closed {}", self.path);
    }
}

/// Opens physical drives by index using a path template
#[derive(Debug, Clone)]
pub struct WindowsOpener {
    path_template: String,
}

impl WindowsOpener {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            path_template: config.path_template.clone(),
        }
    }
}

impl Default for WindowsOpener {
    fn default() -> Self {
        Self::from_config(&DeviceConfig::default())
    }
}

impl DeviceOpener for WindowsOpener {
    type Handle = WindowsHandle;

    fn open(&self, drive_index: u8) -> io::Result<WindowsHandle> {
        let path = device_path(&self.path_template, drive_index);
        let wide: Vec<u16> = OsStr::new(&path)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        let handle = unsafe {
            CreateFileW(
                PCWSTR::from_raw(wide.as_ptr()),
                GENERIC_READ_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                None,
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                None,
            )
        };

        match handle {
            Ok(h) if h != INVALID_HANDLE_VALUE => Ok(WindowsHandle { handle: h, path }),
            Ok(_) => Err(io::Error::last_os_error()),
            Err(e) => {
                log::debug!("CreateFileW({}) failed: {}", path, e);
                Err(io::Error::from(e))
            }
        }
    }
}
