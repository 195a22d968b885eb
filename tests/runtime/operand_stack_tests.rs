#[path = "../support/mod.rs"]
mod support;

use arbor::{
    RuntimeConfig, RuntimeError,
    runtime::{StackValue, value::MAX_SAFE_INTEGER},
};
use serde_json::json;

use support::{Harness, load_with};

fn runtime() -> Harness {
    load_with(json!({}), RuntimeConfig::default()).0
}

fn numbers(rt: &mut Harness, values: &[f64]) {
    let id = rt.id(1);
    for &value in values {
        rt.push(id, StackValue::Number(value)).unwrap();
    }
}

fn calc(left: f64, right: f64, operator: &str) -> Result<StackValue, RuntimeError> {
    let mut rt = runtime();
    numbers(&mut rt, &[left, right]);
    let id = rt.id(2);
    rt.calc(id, operator)
}

#[test]
fn the_first_pushed_value_is_the_left_operand() {
    assert_eq!(calc(10.0, 3.0, "-").unwrap(), StackValue::Number(7.0));
    assert_eq!(calc(10.0, 3.0, "//").unwrap(), StackValue::Number(3.0));
    assert_eq!(calc(-7.0, 2.0, "//").unwrap(), StackValue::Number(-4.0));
    assert_eq!(calc(6.0, 7.0, "*").unwrap(), StackValue::Number(42.0));
    assert_eq!(calc(0.5, 0.25, "+").unwrap(), StackValue::Number(0.75));
}

#[test]
fn results_replace_their_operands() {
    let mut rt = runtime();
    numbers(&mut rt, &[1.0, 10.0, 3.0]);
    let id = rt.id(2);
    rt.calc(id, "+").unwrap();

    assert_eq!(
        rt.stack().as_slice(),
        &[StackValue::Number(1.0), StackValue::Number(13.0)]
    );
}

#[test]
fn division_by_zero_is_an_invalid_value() {
    let err = calc(1.0, 0.0, "//").unwrap_err();
    assert_eq!(err.kind(), "InvalidStackValueError");
}

#[test]
fn overflowing_results_are_rejected() {
    let err = calc(MAX_SAFE_INTEGER, MAX_SAFE_INTEGER, "+").unwrap_err();
    assert_eq!(err.kind(), "InvalidStackValueError");
}

#[test]
fn unknown_operators_leave_the_stack_alone() {
    let mut rt = runtime();
    numbers(&mut rt, &[2.0, 3.0]);
    let id = rt.id(2);

    let err = rt.calc(id, "%").unwrap_err();
    assert_eq!(err.to_string(), "unknown operator `%`");
    assert_eq!(rt.stack().len(), 2);
}

#[test]
fn arithmetic_on_text_fails() {
    let mut rt = runtime();
    let id = rt.id(1);
    rt.push(id, StackValue::Number(1.0)).unwrap();
    rt.push(id, "one".into()).unwrap();

    let err = rt.calc(id, "+").unwrap_err();
    assert_eq!(err.to_string(), "cannot apply `+` to Number and Text");
}

#[test]
fn compare_is_exact_and_type_sensitive() {
    let mut rt = runtime();
    let id = rt.id(1);

    rt.push(id, StackValue::Number(1.0)).unwrap();
    rt.push(id, "1".into()).unwrap();
    assert!(!rt.compare(id).unwrap());

    rt.push(id, "a".into()).unwrap();
    rt.push(id, "a".into()).unwrap();
    assert!(rt.compare(id).unwrap());

    assert_eq!(
        rt.stack().as_slice(),
        &[StackValue::Number(0.0), StackValue::Number(1.0)]
    );
}

#[test]
fn values_outside_the_safe_range_cannot_be_pushed() {
    let mut rt = runtime();
    let id = rt.id(1);

    for value in [f64::NAN, f64::INFINITY, MAX_SAFE_INTEGER + 2.0, -MAX_SAFE_INTEGER - 2.0] {
        let err = rt.push(id, StackValue::Number(value)).unwrap_err();
        assert_eq!(err.kind(), "InvalidStackValueError", "{value}");
    }
    rt.push(id, StackValue::Number(-MAX_SAFE_INTEGER)).unwrap();
    assert_eq!(rt.stack().len(), 1);
}

#[test]
fn empty_stack_operations_underflow() {
    let mut rt = runtime();
    let id = rt.id(1);

    let pop = rt.pop(id).unwrap_err();
    assert_eq!(
        pop.to_string(),
        "cannot pop a value off the stack, because the stack is empty"
    );
    assert_eq!(rt.duplicate_top(id).unwrap_err().kind(), "StackUnderflowError");
    assert_eq!(rt.compare(id).unwrap_err().kind(), "StackUnderflowError");
}

#[test]
fn offsets_count_from_the_top() {
    let mut rt = runtime();
    numbers(&mut rt, &[1.0, 2.0, 3.0]);
    let id = rt.id(1);

    assert_eq!(rt.peek(id, 0).unwrap(), StackValue::Number(3.0));
    assert_eq!(rt.peek(id, 2).unwrap(), StackValue::Number(1.0));

    rt.swap(id, 0, 2).unwrap();
    rt.duplicate_top(id).unwrap();
    assert_eq!(
        rt.stack().as_slice(),
        &[
            StackValue::Number(3.0),
            StackValue::Number(2.0),
            StackValue::Number(1.0),
            StackValue::Number(1.0),
        ]
    );

    let err = rt.peek(id, 4).unwrap_err();
    assert_eq!(
        err.to_string(),
        "stack offset 4 is out of bounds for a stack of depth 4"
    );
}
