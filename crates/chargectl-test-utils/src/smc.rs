//! A scriptable [`SmcIo`] double with a recorded call journal.
//!
//! Script per-key read payloads and failures with the builder methods,
//! run the code under test, then assert on [`journal`](MockSmcIo::journal)
//! to verify call order — e.g. that a failed register write aborts a
//! multi-register operation before later writes happen.

use std::collections::{HashMap, HashSet};

use chargectl_core::smc::{SmcError, SmcIo, SmcKey};

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Open,
    Close,
    Read(SmcKey),
    Write(SmcKey, Vec<u8>),
}

/// Scriptable in-memory [`SmcIo`] implementation.
///
/// Reads return the scripted payload, or [`SmcError::KeyNotFound`] for
/// unscripted keys. Writes succeed unless scripted to fail. Every call is
/// journalled, including failing ones.
#[derive(Debug, Default)]
pub struct MockSmcIo {
    reads: HashMap<SmcKey, Vec<u8>>,
    failing_reads: HashSet<SmcKey>,
    failing_writes: HashSet<SmcKey>,
    open_failure: Option<String>,
    journal: Vec<Op>,
}

impl MockSmcIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the payload returned by reads of `key`.
    pub fn with_read(mut self, key: SmcKey, payload: impl Into<Vec<u8>>) -> Self {
        self.reads.insert(key, payload.into());
        self
    }

    /// Make reads of `key` fail with an I/O error.
    pub fn failing_read(mut self, key: SmcKey) -> Self {
        self.failing_reads.insert(key);
        self
    }

    /// Make writes to `key` fail with an I/O error.
    pub fn failing_write(mut self, key: SmcKey) -> Self {
        self.failing_writes.insert(key);
        self
    }

    /// Make `open` fail as if the controller were unreachable.
    pub fn failing_open(mut self, reason: &str) -> Self {
        self.open_failure = Some(reason.to_string());
        self
    }

    /// The calls recorded so far, in order.
    pub fn journal(&self) -> &[Op] {
        &self.journal
    }

    /// Consume the mock and return the recorded calls.
    pub fn into_journal(self) -> Vec<Op> {
        self.journal
    }

    /// The payload of the most recent write to `key`, if any.
    pub fn last_write(&self, key: SmcKey) -> Option<&[u8]> {
        self.journal.iter().rev().find_map(|op| match op {
            Op::Write(k, value) if *k == key => Some(value.as_slice()),
            _ => None,
        })
    }
}

impl SmcIo for MockSmcIo {
    fn open(&mut self) -> Result<(), SmcError> {
        self.journal.push(Op::Open);
        match &self.open_failure {
            Some(reason) => Err(SmcError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> Result<(), SmcError> {
        self.journal.push(Op::Close);
        Ok(())
    }

    fn read(&mut self, key: SmcKey) -> Result<Vec<u8>, SmcError> {
        self.journal.push(Op::Read(key));
        if self.failing_reads.contains(&key) {
            return Err(SmcError::Io(format!("scripted read failure for {key}")));
        }
        self.reads
            .get(&key)
            .cloned()
            .ok_or(SmcError::KeyNotFound(key))
    }

    fn write(&mut self, key: SmcKey, value: &[u8]) -> Result<(), SmcError> {
        self.journal.push(Op::Write(key, value.to_vec()));
        if self.failing_writes.contains(&key) {
            return Err(SmcError::Io(format!("scripted write failure for {key}")));
        }
        Ok(())
    }
}
