// Scripted control channel used by the unit tests

use super::{DeviceHandle, DeviceOpener};
use crate::ata::result::{ResultHeader, RESULT_HEADER_SIZE};
use crate::ata::{CommandRequest, DriveCommand, SmartOperation, SECTOR_SIZE};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::rc::Rc;

/// How the mock answers one operation
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Succeed, copying these bytes into the front of the result
    Fill(Vec<u8>),
    /// Succeed but report only this many bytes transferred
    Short(usize),
    /// Fail the OS call
    Fail,
}

/// One recorded control-channel call
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub code: DriveCommand,
    pub request: CommandRequest,
    pub input_len: usize,
    pub output_len: usize,
}

#[derive(Debug, Default)]
struct Shared {
    replies: RefCell<HashMap<SmartOperation, Reply>>,
    calls: RefCell<Vec<Call>>,
    drops: Cell<usize>,
}

#[derive(Debug)]
pub(crate) struct MockHandle {
    shared: Rc<Shared>,
}

impl DeviceHandle for MockHandle {
    fn io_control(
        &mut self,
        code: DriveCommand,
        input: &[u8],
        output: &mut [u8],
    ) -> io::Result<usize> {
        let request = CommandRequest::from_bytes(input)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "short request"))?;

        self.shared.calls.borrow_mut().push(Call {
            code,
            request,
            input_len: input.len(),
            output_len: output.len(),
        });

        let reply = SmartOperation::from_registers(&request.registers)
            .and_then(|op| self.shared.replies.borrow().get(&op).cloned());

        match reply {
            Some(Reply::Fail) => Err(io::Error::from_raw_os_error(1)),
            Some(Reply::Short(n)) => Ok(n),
            Some(Reply::Fill(bytes)) => {
                let n = bytes.len().min(output.len());
                output[..n].copy_from_slice(&bytes[..n]);
                Ok(output.len())
            }
            None => {
                let header = ResultHeader {
                    buffer_size: request.buffer_size,
                    ..Default::default()
                };
                output[..RESULT_HEADER_SIZE].copy_from_slice(&header.to_bytes());
                Ok(output.len())
            }
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.shared.drops.set(self.shared.drops.get() + 1);
    }
}

/// Opener handing out [`MockHandle`]s that share one script and call log
#[derive(Debug, Default)]
pub(crate) struct MockOpener {
    shared: Rc<Shared>,
    fail_open: bool,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opener whose every open fails
    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    pub fn reply(self, operation: SmartOperation, reply: Reply) -> Self {
        self.shared.replies.borrow_mut().insert(operation, reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.shared.calls.borrow().clone()
    }

    /// Number of handles released so far
    pub fn drops(&self) -> usize {
        self.shared.drops.get()
    }
}

impl DeviceOpener for MockOpener {
    type Handle = MockHandle;

    fn open(&self, drive_index: u8) -> io::Result<MockHandle> {
        if self.fail_open {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("drive {} unavailable", drive_index),
            ));
        }
        Ok(MockHandle {
            shared: Rc::clone(&self.shared),
        })
    }
}

/// A full-size result whose sector starts with `payload`
pub(crate) fn sector_result(payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; RESULT_HEADER_SIZE + SECTOR_SIZE];
    let header = ResultHeader {
        buffer_size: SECTOR_SIZE as u32,
        ..Default::default()
    };
    buf[..RESULT_HEADER_SIZE].copy_from_slice(&header.to_bytes());
    buf[RESULT_HEADER_SIZE..RESULT_HEADER_SIZE + payload.len()].copy_from_slice(payload);
    buf
}
