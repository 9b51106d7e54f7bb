//! Integration tests for callback value extraction helpers.

#![cfg(feature = "mock-host")]

use probereg::frame::{self, ArgValue, Signedness};
use probereg::mock::MockFrame;
use probereg::{CallFrame, RawValue};

#[test]
fn test_evaluate_unsigned_and_signed() {
    let mut f = MockFrame::new().with_expression("(int)errno", RawValue::new(0xffff_fff4, 4));

    assert_eq!(frame::evaluate_unsigned(&mut f, "(int)errno").unwrap(), 0xffff_fff4);
    assert_eq!(frame::evaluate_signed(&mut f, "(int)errno").unwrap(), -12);
}

#[test]
fn test_evaluate_missing_expression() {
    let mut f = MockFrame::new();
    assert!(frame::evaluate_unsigned(&mut f, "nope").is_err());
}

#[test]
fn test_argument_is_zero_based() {
    let mut f = MockFrame::new()
        .with_arg(RawValue::from_u64(10))
        .with_arg(RawValue::from_u64(20));

    assert_eq!(frame::argument_unsigned(&mut f, 0).unwrap(), 10);
    assert_eq!(frame::argument_unsigned(&mut f, 1).unwrap(), 20);
    assert!(frame::argument_unsigned(&mut f, 2).is_err());
    assert_eq!(f.argument(1).unwrap(), RawValue::from_u64(20));
}

#[test]
fn test_argument_signed_narrow() {
    let mut f = MockFrame::new().with_arg(RawValue::new(0x80, 1));
    assert_eq!(frame::argument_signed(&mut f, 0).unwrap(), -128);
    assert_eq!(frame::argument_unsigned(&mut f, 0).unwrap(), 0x80);
}

#[test]
fn test_function_parameters_layout() {
    let mut f = MockFrame::new()
        .with_arg(RawValue::from_i64(-3))
        .with_arg(RawValue::from_i64(-3));

    let params =
        frame::function_parameters(&mut f, &[Signedness::Signed, Signedness::Unsigned]).unwrap();
    assert_eq!(
        params,
        vec![ArgValue::Signed(-3), ArgValue::Unsigned((-3i64) as u64)]
    );
}

#[test]
fn test_function_parameters_empty_layout() {
    let mut f = MockFrame::new();
    assert!(frame::function_parameters(&mut f, &[]).unwrap().is_empty());
}

#[test]
fn test_function_parameters_propagates_error() {
    let mut f = MockFrame::new().with_arg(RawValue::from_u64(1));
    assert!(frame::function_parameters(&mut f, &[Signedness::Unsigned; 2]).is_err());
}
