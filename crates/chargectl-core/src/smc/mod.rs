//! SMC power control — reading and writing battery-charging registers.
//!
//! The System Management Controller exposes named 4-character registers
//! ("keys"). This module owns the small table of keys chargectl interprets
//! ([`keys`]), the [`SmcIo`] port every backend implements, and the
//! [`PowerControl`] layer that turns raw register bytes into charging,
//! adapter, and battery state.
//!
//! On Apple hardware the [`iokit`] backend talks to the real controller;
//! everywhere else (and in tests) any other [`SmcIo`] implementation can be
//! plugged in.

pub mod keys;
pub mod power;

#[cfg(target_os = "macos")]
#[allow(unsafe_code)]
pub mod iokit;

pub use keys::SmcKey;
pub use power::{PowerControl, SmcError, SmcIo};
