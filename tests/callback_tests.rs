//! Integration tests for callback dispatch.
//!
//! Fires armed probes through the mock host and checks that callbacks run
//! with the right hit context and that hits are counted.

#![cfg(feature = "mock-host")]

use std::cell::Cell;
use std::sync::Arc;

use probereg::frame::{self, Signedness};
use probereg::mock::{MockFrame, MockHost, MockTarget};
use probereg::{
    ArgValue, CallFrame, CallbackTable, Error, ProbeHit, ProbeRegistry, RawValue, platform,
};

// Callbacks run on the firing thread, so per-thread state keeps tests apart.
thread_local! {
    static LAST_MALLOC: Cell<(u64, u64)> = const { Cell::new((0, 0)) };
}

fn on_malloc(frame: &mut dyn CallFrame, hit: &ProbeHit) {
    let size = frame::argument_unsigned(frame, 0).unwrap_or(0);
    LAST_MALLOC.with(|last| last.set((size, hit.address)));
}

fn on_memcpy(frame: &mut dyn CallFrame, _hit: &ProbeHit) {
    let params = frame::function_parameters(
        frame,
        &[Signedness::Unsigned, Signedness::Unsigned, Signedness::Signed],
    )
    .unwrap();
    assert_eq!(
        params,
        vec![
            ArgValue::Unsigned(0xdead),
            ArgValue::Unsigned(0xbeef),
            ArgValue::Signed(-1)
        ]
    );
}

fn setup() -> (MockHost, ProbeRegistry<MockHost>, MockTarget) {
    let mut table = CallbackTable::new();
    table.define("on_malloc", on_malloc).unwrap();
    table.define("on_memcpy", on_memcpy).unwrap();

    let t = MockTarget(1);
    let mut host = MockHost::new();
    host.attach(t);
    host.add_symbol(t, "malloc", 0x4000);
    host.add_symbol(t, "memcpy", 0x5000);

    let mut reg = ProbeRegistry::new(Arc::new(table));
    reg.register_by_name("malloc", "on_malloc").unwrap();
    reg.register_by_name("memcpy", "on_memcpy").unwrap();
    reg.set(&mut host, &t).unwrap();
    (host, reg, t)
}

#[test]
fn test_fire_runs_callback_with_arguments() {
    let (host, reg, t) = setup();
    let malloc_probe = reg.instances(&t).unwrap()[0];

    let mut frame = MockFrame::new().with_arg(RawValue::from_u64(128));
    host.fire(reg.callbacks(), malloc_probe, &mut frame).unwrap();

    assert_eq!(LAST_MALLOC.with(Cell::get), (128, 0x4000));
}

#[test]
fn test_fire_reads_mixed_signedness() {
    let (host, reg, t) = setup();
    let memcpy_probe = reg.instances(&t).unwrap()[1];

    let mut frame = MockFrame::new()
        .with_arg(RawValue::from_u64(0xdead))
        .with_arg(RawValue::from_u64(0xbeef))
        .with_arg(RawValue::new(0xffff_ffff, 4));
    host.fire(reg.callbacks(), memcpy_probe, &mut frame).unwrap();
}

#[test]
fn test_hits_are_counted_per_callback() {
    let (host, reg, t) = setup();
    let ids = reg.instances(&t).unwrap().to_vec();
    let callbacks = reg.callbacks().clone();

    platform::set_mock_time(7_000);
    let mut frame = MockFrame::new()
        .with_arg(RawValue::from_u64(1))
        .with_arg(RawValue::from_u64(0xbeef))
        .with_arg(RawValue::from_i64(-1));
    host.fire(&callbacks, ids[0], &mut frame).unwrap();
    host.fire(&callbacks, ids[0], &mut frame).unwrap();

    let stats = callbacks.stats();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].name, "on_malloc");
    assert_eq!(stats[0].hits, 2);
    assert_eq!(stats[0].last_timestamp, 7_000);
    assert_eq!(stats[1].hits, 0);
}

#[test]
fn test_fire_after_unset_fails() {
    let (mut host, mut reg, t) = setup();
    let id = reg.instances(&t).unwrap()[0];
    reg.unset(&mut host, &t);

    let mut frame = MockFrame::new();
    assert!(host.fire(reg.callbacks(), id, &mut frame).is_err());
}

#[test]
fn test_verbose_dispatch_still_runs_callback() {
    let (host, reg, t) = setup();
    let id = reg.instances(&t).unwrap()[0];

    probereg::set_verbose(true);
    assert!(probereg::is_verbose());
    let mut frame = MockFrame::new().with_arg(RawValue::from_u64(64));
    host.fire(reg.callbacks(), id, &mut frame).unwrap();
    probereg::set_verbose(false);

    assert!(reg.callbacks().snapshot(reg.specs()[0].callback().id).unwrap().hits >= 1);
}

#[test]
fn test_error_display() {
    let err = Error::UnsatisfiedPattern("malloc".to_string());
    assert!(format!("{}", err).contains("malloc"));

    let err = Error::DuplicateCallback("on_malloc".to_string());
    assert!(format!("{}", err).contains("on_malloc"));

    let err = Error::InvalidSpec {
        pattern: "".to_string(),
        fault: probereg::SpecFault::UnknownCallback("on_free".to_string()),
    };
    assert!(format!("{}", err).contains("on_free"));
}
