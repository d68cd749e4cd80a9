//! Daemon IPC — Unix domain socket transport for unprivileged clients.
//!
//! The daemon exposes an HTTP API over a Unix socket; access control is the
//! socket file's permissions rather than a network boundary. Clients dial a
//! fresh connection per request and never multiplex.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐      Unix socket       ┌──────────────┐
//! │ unprivileged │───────────────────────▶│  privileged  │
//! │    client    │  HTTP/1.1, raw bodies  │    daemon    │
//! └──────────────┘                        └──────┬───────┘
//!                                                │
//!                                         ┌──────▼───────┐
//!                                         │     SMC      │
//!                                         └──────────────┘
//! ```

pub mod client;

pub use client::{ClientError, IpcClient};
