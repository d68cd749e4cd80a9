//! The [`SmcIo`] port and the [`PowerControl`] semantic layer on top of it.

use tracing::trace;

use super::keys::{self, SmcKey};

/// Errors from SMC access, raw or semantic.
#[derive(Debug, thiserror::Error)]
pub enum SmcError {
    #[error(
        "SMC unavailable: {0} \
         (wrong platform, missing driver, or insufficient privileges?)"
    )]
    Unavailable(String),

    #[error("SMC key {0} not found")]
    KeyNotFound(SmcKey),

    #[error("SMC I/O failure: {0}")]
    Io(String),

    #[error("unexpected payload length for {key}: got {got}, want {want}")]
    LengthMismatch {
        key: SmcKey,
        got: usize,
        want: usize,
    },
}

/// Raw key/value access to an SMC connection.
///
/// Backends own the vendor connection; [`PowerControl`] is written purely
/// against this trait so a test double can stand in for real hardware.
/// A single open handle is not safe for concurrent calls unless the
/// backend serializes them.
pub trait SmcIo {
    /// Establish the hardware connection.
    fn open(&mut self) -> Result<(), SmcError>;

    /// Release the hardware connection. Safe to call once after `open`.
    fn close(&mut self) -> Result<(), SmcError>;

    /// Read the current value of a key.
    fn read(&mut self, key: SmcKey) -> Result<Vec<u8>, SmcError>;

    /// Write a raw value to a key.
    fn write(&mut self, key: SmcKey, value: &[u8]) -> Result<(), SmcError>;
}

/// Battery power control in terms of an [`SmcIo`] backend.
///
/// Semantic operations issue no retries: a failed read or write surfaces
/// immediately and the caller decides what to do. Multi-register
/// operations ([`enable_charging`](Self::enable_charging),
/// [`disable_charging`](Self::disable_charging)) are not transactional —
/// a failure partway leaves the registers already written as they are.
pub struct PowerControl<I> {
    io: I,
}

impl<I: SmcIo> PowerControl<I> {
    /// Wrap an SMC backend.
    pub fn new(io: I) -> Self {
        Self { io }
    }

    /// Consume the wrapper and return the backend.
    pub fn into_inner(self) -> I {
        self.io
    }

    /// Open the underlying hardware connection.
    pub fn open(&mut self) -> Result<(), SmcError> {
        self.io.open()
    }

    /// Close the underlying hardware connection.
    pub fn close(&mut self) -> Result<(), SmcError> {
        self.io.close()
    }

    /// Read a raw key value.
    pub fn read(&mut self, key: SmcKey) -> Result<Vec<u8>, SmcError> {
        trace!(%key, "reading SMC key");
        let value = self.io.read(key)?;
        trace!(%key, value = ?value, "SMC read succeeded");
        Ok(value)
    }

    /// Write a raw key value.
    pub fn write(&mut self, key: SmcKey, value: &[u8]) -> Result<(), SmcError> {
        trace!(%key, value = ?value, "writing SMC key");
        self.io.write(key, value)?;
        trace!(%key, "SMC write succeeded");
        Ok(())
    }

    /// Whether charging is currently enabled.
    ///
    /// True iff the first charger-inhibit register reads exactly one byte
    /// equal to [`keys::CHARGING_ALLOWED`]. Any other payload — including
    /// an empty or over-long one — reports disabled without coercion.
    pub fn is_charging_enabled(&mut self) -> Result<bool, SmcError> {
        let value = self.read(keys::CHARGER_INHIBIT_A)?;
        Ok(value.as_slice() == [keys::CHARGING_ALLOWED])
    }

    /// Enable charging.
    ///
    /// Clears both charger-inhibit registers, then re-enables the adapter.
    /// Stops at the first failed write; registers already written stay
    /// written (no rollback).
    pub fn enable_charging(&mut self) -> Result<(), SmcError> {
        trace!("enabling charging");
        self.write(keys::CHARGER_INHIBIT_A, &[keys::CHARGING_ALLOWED])?;
        self.write(keys::CHARGER_INHIBIT_B, &[keys::CHARGING_ALLOWED])?;
        self.enable_adapter()
    }

    /// Disable charging.
    ///
    /// Sets both charger-inhibit registers. Stops at the first failed
    /// write; registers already written stay written (no rollback).
    pub fn disable_charging(&mut self) -> Result<(), SmcError> {
        trace!("disabling charging");
        self.write(keys::CHARGER_INHIBIT_A, &[keys::CHARGING_INHIBITED])?;
        self.write(keys::CHARGER_INHIBIT_B, &[keys::CHARGING_INHIBITED])
    }

    /// Whether the AC adapter is enabled.
    pub fn is_adapter_enabled(&mut self) -> Result<bool, SmcError> {
        let value = self.read(keys::ADAPTER_INHIBIT)?;
        Ok(value.as_slice() == [keys::ADAPTER_ALLOWED])
    }

    /// Enable the AC adapter's power delivery.
    pub fn enable_adapter(&mut self) -> Result<(), SmcError> {
        self.write(keys::ADAPTER_INHIBIT, &[keys::ADAPTER_ALLOWED])
    }

    /// Disable the AC adapter's power delivery.
    pub fn disable_adapter(&mut self) -> Result<(), SmcError> {
        self.write(keys::ADAPTER_INHIBIT, &[keys::ADAPTER_INHIBITED])
    }

    /// The battery charge as reported by the charge register.
    ///
    /// The payload must be exactly one byte; anything else is a
    /// [`SmcError::LengthMismatch`], never a truncated reading.
    pub fn battery_charge(&mut self) -> Result<u8, SmcError> {
        let value = self.read(keys::BATTERY_CHARGE)?;
        if value.len() != 1 {
            return Err(SmcError::LengthMismatch {
                key: keys::BATTERY_CHARGE,
                got: value.len(),
                want: 1,
            });
        }
        Ok(value[0])
    }

    /// Whether a charger is physically attached.
    ///
    /// Read-only physical state, never set by this layer.
    pub fn is_plugged_in(&mut self) -> Result<bool, SmcError> {
        let value = self.read(keys::AC_PRESENT)?;
        Ok(value.as_slice() == [keys::AC_ATTACHED])
    }
}
