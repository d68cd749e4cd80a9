//! Integration tests for the [`PowerControl`] semantic layer.
//!
//! These live under `tests/` rather than as an inline `#[cfg(test)]` module
//! so they link the same `chargectl-core` rlib that `chargectl-test-utils`
//! is built against. An inline unit-test build of the crate is a distinct
//! instance from the one the helper crate depends on, so the shared
//! `SmcIo`/`SmcKey` types would not unify.

use chargectl_core::smc::power::{PowerControl, SmcError};
use chargectl_core::smc::keys;
use chargectl_test_utils::smc::{MockSmcIo, Op};
use pretty_assertions::assert_eq;

#[test]
fn test_is_charging_enabled_only_for_exact_zero_byte() {
    let cases: [(&[u8], bool); 4] = [
        (&[0x00], true),
        (&[0x02], false),
        (&[], false),
        (&[0x00, 0x00], false),
    ];
    for (payload, expected) in cases {
        let io = MockSmcIo::new().with_read(keys::CHARGER_INHIBIT_A, payload.to_vec());
        let mut power = PowerControl::new(io);
        assert_eq!(
            power.is_charging_enabled().unwrap(),
            expected,
            "payload {payload:?}"
        );
    }
}

#[test]
fn test_enable_charging_writes_both_registers_then_adapter() {
    let io = MockSmcIo::new();
    let mut power = PowerControl::new(io);
    power.enable_charging().unwrap();

    let journal = power.into_inner().into_journal();
    assert_eq!(
        journal,
        vec![
            Op::Write(keys::CHARGER_INHIBIT_A, vec![keys::CHARGING_ALLOWED]),
            Op::Write(keys::CHARGER_INHIBIT_B, vec![keys::CHARGING_ALLOWED]),
            Op::Write(keys::ADAPTER_INHIBIT, vec![keys::ADAPTER_ALLOWED]),
        ]
    );
}

#[test]
fn test_enable_charging_stops_at_first_failure() {
    let io = MockSmcIo::new().failing_write(keys::CHARGER_INHIBIT_B);
    let mut power = PowerControl::new(io);

    let err = power.enable_charging().unwrap_err();
    assert!(matches!(err, SmcError::Io(_)));

    // CH0B was written, CH0C failed, and the adapter register was
    // never touched.
    let journal = power.into_inner().into_journal();
    assert_eq!(
        journal,
        vec![
            Op::Write(keys::CHARGER_INHIBIT_A, vec![keys::CHARGING_ALLOWED]),
            Op::Write(keys::CHARGER_INHIBIT_B, vec![keys::CHARGING_ALLOWED]),
        ]
    );
}

#[test]
fn test_disable_charging_writes_inhibit_to_both_registers() {
    let io = MockSmcIo::new();
    let mut power = PowerControl::new(io);
    power.disable_charging().unwrap();

    let journal = power.into_inner().into_journal();
    assert_eq!(
        journal,
        vec![
            Op::Write(keys::CHARGER_INHIBIT_A, vec![keys::CHARGING_INHIBITED]),
            Op::Write(keys::CHARGER_INHIBIT_B, vec![keys::CHARGING_INHIBITED]),
        ]
    );
}

#[test]
fn test_disable_charging_skips_second_write_on_failure() {
    let io = MockSmcIo::new().failing_write(keys::CHARGER_INHIBIT_A);
    let mut power = PowerControl::new(io);

    power.disable_charging().unwrap_err();

    let journal = power.into_inner().into_journal();
    assert_eq!(
        journal,
        vec![Op::Write(
            keys::CHARGER_INHIBIT_A,
            vec![keys::CHARGING_INHIBITED]
        )]
    );
}

#[test]
fn test_adapter_enable_disable_and_query() {
    let io = MockSmcIo::new().with_read(keys::ADAPTER_INHIBIT, vec![0x00]);
    let mut power = PowerControl::new(io);

    assert!(power.is_adapter_enabled().unwrap());
    power.enable_adapter().unwrap();
    power.disable_adapter().unwrap();

    let io = power.into_inner();
    assert_eq!(io.last_write(keys::ADAPTER_INHIBIT), Some(&[0x01][..]));
}

#[test]
fn test_is_adapter_enabled_false_for_inhibited() {
    let io = MockSmcIo::new().with_read(keys::ADAPTER_INHIBIT, vec![0x01]);
    let mut power = PowerControl::new(io);
    assert!(!power.is_adapter_enabled().unwrap());
}

#[test]
fn test_battery_charge_reads_single_byte() {
    let io = MockSmcIo::new().with_read(keys::BATTERY_CHARGE, vec![0x32]);
    let mut power = PowerControl::new(io);
    assert_eq!(power.battery_charge().unwrap(), 50);
}

#[test]
fn test_battery_charge_rejects_wrong_length() {
    let io = MockSmcIo::new().with_read(keys::BATTERY_CHARGE, vec![0x32, 0x00]);
    let mut power = PowerControl::new(io);

    let err = power.battery_charge().unwrap_err();
    match err {
        SmcError::LengthMismatch { key, got, want } => {
            assert_eq!(key, keys::BATTERY_CHARGE);
            assert_eq!(got, 2);
            assert_eq!(want, 1);
        }
        other => panic!("expected LengthMismatch, got {other:?}"),
    }
}

#[test]
fn test_is_plugged_in_only_for_exact_one_byte() {
    let cases: [(&[u8], bool); 4] = [
        (&[0x01], true),
        (&[0x00], false),
        (&[0x02], false),
        (&[0x01, 0x01], false),
    ];
    for (payload, expected) in cases {
        let io = MockSmcIo::new().with_read(keys::AC_PRESENT, payload.to_vec());
        let mut power = PowerControl::new(io);
        assert_eq!(power.is_plugged_in().unwrap(), expected, "payload {payload:?}");
    }
}

#[test]
fn test_open_failure_maps_to_unavailable() {
    let io = MockSmcIo::new().failing_open("no AppleSMC service found");
    let mut power = PowerControl::new(io);

    let err = power.open().unwrap_err();
    assert!(matches!(err, SmcError::Unavailable(_)));
    assert!(err.to_string().contains("insufficient privileges"));
}

#[test]
fn test_unknown_key_maps_to_key_not_found() {
    let io = MockSmcIo::new();
    let mut power = PowerControl::new(io);

    let err = power.read(keys::BATTERY_CHARGE).unwrap_err();
    assert!(matches!(err, SmcError::KeyNotFound(k) if k == keys::BATTERY_CHARGE));
}

#[test]
fn test_read_failure_propagates_not_defaults() {
    let io = MockSmcIo::new().failing_read(keys::CHARGER_INHIBIT_A);
    let mut power = PowerControl::new(io);

    // A failed read must surface as an error, never as "disabled".
    assert!(power.is_charging_enabled().is_err());
}

#[test]
fn test_open_close_pass_through() {
    let io = MockSmcIo::new();
    let mut power = PowerControl::new(io);
    power.open().unwrap();
    power.close().unwrap();

    let journal = power.into_inner().into_journal();
    assert_eq!(journal, vec![Op::Open, Op::Close]);
}
