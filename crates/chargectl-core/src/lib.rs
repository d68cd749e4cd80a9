#![deny(unsafe_code)]

//! chargectl core — daemon transport client and SMC power control.
//!
//! Two independent pieces live here, composed by the embedding binaries:
//!
//! - [`ipc`]: an HTTP-over-Unix-socket client so unprivileged processes can
//!   query and command the privileged daemon without a network port.
//! - [`smc`]: the System Management Controller key/value layer that turns
//!   raw register bytes into charging, adapter, and battery state.
//!
//! Neither piece calls the other; the daemon that owns the SMC side is
//! reached through the IPC side by the processes that embed both.

/// Unix-socket transport client for the daemon API.
pub mod ipc;
/// SMC register access and battery power-control semantics.
pub mod smc;

pub use ipc::{ClientError, IpcClient};
pub use smc::{PowerControl, SmcError, SmcIo, SmcKey};
