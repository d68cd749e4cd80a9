//! IOKit-backed [`SmcIo`] for Apple hardware.
//!
//! Talks to the `AppleSMC` kext through `IOConnectCallStructMethod`. Key
//! reads are two calls (key-info for the declared size, then read-bytes);
//! writes check the declared size first so a short or long payload fails
//! before touching the register.

use std::ffi::{CStr, c_void};

use libc::{KERN_SUCCESS, kern_return_t, mach_error_string};
use objc2_io_kit::{
    IOConnectCallStructMethod, IOIteratorNext, IOMainPort, IOObjectRelease, IOServiceClose,
    IOServiceGetMatchingServices, IOServiceMatching, IOServiceOpen, io_connect_t,
};
use tracing::trace;

use super::keys::SmcKey;
use super::power::{SmcError, SmcIo};

const KERNEL_INDEX_SMC: u32 = 2;
const SMC_CMD_READ_BYTES: u8 = 5;
const SMC_CMD_WRITE_BYTES: u8 = 6;
const SMC_CMD_READ_KEYINFO: u8 = 9;
const SMC_BYTES_LEN: usize = 32;

/// SMC result code for a key the controller does not know.
const SMC_RESULT_KEY_NOT_FOUND: u8 = 132;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
struct KeyDataVers {
    major: libc::c_char,
    minor: libc::c_char,
    build: libc::c_char,
    reserved: [libc::c_char; 1],
    release: u16,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
struct KeyDataPLimit {
    version: u16,
    length: u16,
    cpu_plimit: u32,
    gpu_plimit: u32,
    mem_plimit: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
struct KeyInfo {
    data_size: u32,
    data_type: u32,
    data_attributes: u8,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
struct KeyData {
    key: u32,
    vers: KeyDataVers,
    plimit_data: KeyDataPLimit,
    key_info: KeyInfo,
    result: u8,
    status: u8,
    data8: u8,
    data32: u32,
    bytes: [u8; SMC_BYTES_LEN],
}

fn kern_err(res: kern_return_t) -> String {
    unsafe { CStr::from_ptr(mach_error_string(res)).to_string_lossy().into_owned() }
}

/// An [`SmcIo`] backend over the AppleSMC IOKit service.
pub struct IoKitSmc {
    conn: Option<io_connect_t>,
}

impl IoKitSmc {
    /// Create a backend with no connection yet; call
    /// [`open`](SmcIo::open) before reading or writing.
    pub fn new() -> Self {
        Self { conn: None }
    }

    fn conn(&self) -> Result<io_connect_t, SmcError> {
        self.conn
            .ok_or_else(|| SmcError::Unavailable("SMC connection is not open".to_string()))
    }

    fn call(
        &self,
        conn: io_connect_t,
        input: &KeyData,
        output: &mut KeyData,
    ) -> Result<(), kern_return_t> {
        unsafe {
            let mut output_cnt = size_of::<KeyData>();
            let res = IOConnectCallStructMethod(
                conn,
                KERNEL_INDEX_SMC,
                input as *const _ as *const c_void,
                size_of::<KeyData>(),
                output as *mut _ as *mut c_void,
                &raw mut output_cnt,
            );
            if res == KERN_SUCCESS { Ok(()) } else { Err(res) }
        }
    }

    /// Fetch key metadata into `output`; `input` must carry the key.
    fn key_info(
        &self,
        conn: io_connect_t,
        input: &mut KeyData,
        output: &mut KeyData,
    ) -> Result<(), SmcError> {
        input.data8 = SMC_CMD_READ_KEYINFO;
        let key = SmcKey::new(input.key.to_be_bytes());
        self.call(conn, input, output)
            .map_err(|res| SmcError::Io(format!("key info for {key} failed: {}", kern_err(res))))?;
        if output.result == SMC_RESULT_KEY_NOT_FOUND {
            return Err(SmcError::KeyNotFound(key));
        }
        Ok(())
    }
}

impl Default for IoKitSmc {
    fn default() -> Self {
        Self::new()
    }
}

impl SmcIo for IoKitSmc {
    fn open(&mut self) -> Result<(), SmcError> {
        if self.conn.is_some() {
            return Ok(());
        }
        unsafe {
            let mut main_port = 0;
            let res = IOMainPort(0, &raw mut main_port);
            if res != KERN_SUCCESS {
                return Err(SmcError::Unavailable(format!(
                    "IOMainPort failed: {}",
                    kern_err(res)
                )));
            }

            let matching = IOServiceMatching(c"AppleSMC".as_ptr()).and_then(|d| d.downcast().ok());
            let mut iterator = 0;
            let res = IOServiceGetMatchingServices(main_port, matching, &raw mut iterator);
            if res != KERN_SUCCESS {
                return Err(SmcError::Unavailable(format!(
                    "matching AppleSMC failed: {}",
                    kern_err(res)
                )));
            }

            let device = IOIteratorNext(iterator);
            IOObjectRelease(iterator);
            if device == 0 {
                return Err(SmcError::Unavailable("no AppleSMC service found".to_string()));
            }

            let mut conn = 0;
            let res = IOServiceOpen(device, libc::mach_task_self(), 0, &raw mut conn);
            IOObjectRelease(device);
            if res != KERN_SUCCESS {
                return Err(SmcError::Unavailable(format!(
                    "IOServiceOpen failed: {}",
                    kern_err(res)
                )));
            }

            self.conn = Some(conn);
        }
        trace!("SMC connection opened");
        Ok(())
    }

    fn close(&mut self) -> Result<(), SmcError> {
        if let Some(conn) = self.conn.take() {
            IOServiceClose(conn);
            trace!("SMC connection closed");
        }
        Ok(())
    }

    fn read(&mut self, key: SmcKey) -> Result<Vec<u8>, SmcError> {
        let conn = self.conn()?;

        let mut input = KeyData {
            key: u32::from_be_bytes(*key.as_bytes()),
            ..Default::default()
        };
        let mut output = KeyData::default();
        self.key_info(conn, &mut input, &mut output)?;

        let size = (output.key_info.data_size as usize).min(SMC_BYTES_LEN);
        input.key_info.data_size = output.key_info.data_size;
        input.data8 = SMC_CMD_READ_BYTES;
        self.call(conn, &input, &mut output)
            .map_err(|res| SmcError::Io(format!("read {key} failed: {}", kern_err(res))))?;

        Ok(output.bytes[..size].to_vec())
    }

    fn write(&mut self, key: SmcKey, value: &[u8]) -> Result<(), SmcError> {
        let conn = self.conn()?;

        if value.len() > SMC_BYTES_LEN {
            return Err(SmcError::LengthMismatch {
                key,
                got: value.len(),
                want: SMC_BYTES_LEN,
            });
        }

        // The register's declared size must match the payload exactly.
        let mut input = KeyData {
            key: u32::from_be_bytes(*key.as_bytes()),
            ..Default::default()
        };
        let mut output = KeyData::default();
        self.key_info(conn, &mut input, &mut output)?;
        let declared = output.key_info.data_size as usize;
        if declared != value.len() {
            return Err(SmcError::LengthMismatch {
                key,
                got: value.len(),
                want: declared,
            });
        }

        let mut bytes = [0u8; SMC_BYTES_LEN];
        bytes[..value.len()].copy_from_slice(value);

        let input = KeyData {
            key: u32::from_be_bytes(*key.as_bytes()),
            data8: SMC_CMD_WRITE_BYTES,
            key_info: KeyInfo {
                data_size: value.len() as u32,
                ..Default::default()
            },
            bytes,
            ..Default::default()
        };
        let mut output = KeyData::default();
        self.call(conn, &input, &mut output)
            .map_err(|res| SmcError::Io(format!("write {key} failed: {}", kern_err(res))))?;
        Ok(())
    }
}

impl Drop for IoKitSmc {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
