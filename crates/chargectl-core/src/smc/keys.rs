//! The SMC registers chargectl interprets, and their sentinel bytes.
//!
//! Keys are externally defined by the hardware vendor; this table is the
//! one place their names and byte conventions appear.

use std::fmt;

/// A four-character SMC register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SmcKey([u8; 4]);

impl SmcKey {
    /// Wrap a raw four-byte key name.
    pub const fn new(raw: [u8; 4]) -> Self {
        Self(raw)
    }

    /// The raw four-byte key name.
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for SmcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Charger inhibit, first register. [`CHARGING_ALLOWED`] permits charging,
/// [`CHARGING_INHIBITED`] blocks it. Written in tandem with
/// [`CHARGER_INHIBIT_B`].
pub const CHARGER_INHIBIT_A: SmcKey = SmcKey(*b"CH0B");

/// Charger inhibit, second register. Same convention as
/// [`CHARGER_INHIBIT_A`].
pub const CHARGER_INHIBIT_B: SmcKey = SmcKey(*b"CH0C");

/// Adapter inhibit. Cuts the AC adapter's power delivery independent of
/// charging state.
pub const ADAPTER_INHIBIT: SmcKey = SmcKey(*b"CH0I");

/// Battery charge percentage, single byte. Apple-silicon key name; Intel
/// machines expose the same reading as `BBIF`.
pub const BATTERY_CHARGE: SmcKey = SmcKey(*b"BUIC");

/// AC presence, single byte. [`AC_ATTACHED`] when a charger is plugged in.
pub const AC_PRESENT: SmcKey = SmcKey(*b"AC-W");

/// Charger-inhibit registers: charging permitted.
pub const CHARGING_ALLOWED: u8 = 0x00;
/// Charger-inhibit registers: charging blocked.
pub const CHARGING_INHIBITED: u8 = 0x02;

/// Adapter-inhibit register: adapter delivering power.
pub const ADAPTER_ALLOWED: u8 = 0x00;
/// Adapter-inhibit register: adapter cut off.
pub const ADAPTER_INHIBITED: u8 = 0x01;

/// AC-presence register: charger attached.
pub const AC_ATTACHED: u8 = 0x01;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_display() {
        assert_eq!(CHARGER_INHIBIT_A.to_string(), "CH0B");
        assert_eq!(AC_PRESENT.to_string(), "AC-W");
    }

    #[test]
    fn test_key_round_trips_raw_bytes() {
        let key = SmcKey::new(*b"BUIC");
        assert_eq!(key, BATTERY_CHARGE);
        assert_eq!(key.as_bytes(), b"BUIC");
    }
}
