#![deny(unsafe_code)]

//! Shared test utilities for the chargectl workspace.
//!
//! Provides a mock daemon bound to a throwaway Unix socket, a scriptable
//! SMC backend with a call journal, and tracing helpers so individual
//! crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! chargectl-test-utils = { workspace = true }
//! ```

pub mod daemon;
pub mod smc;
pub mod tracing_setup;
