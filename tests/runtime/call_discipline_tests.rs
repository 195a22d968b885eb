#[path = "../support/mod.rs"]
mod support;

use arbor::{
    bytecode::CallMode,
    runtime::{SchedulerState, StackValue},
};
use serde_json::json;

use support::{rendered, start};

/// `main` calls `target` with `mode`; `target` pushes a marker and emits an
/// element when it is renderable.
fn caller(mode: &str, renderable: bool) -> serde_json::Value {
    let body = if renderable {
        json!([{"op": "elem", "id": 20, "tag": "i"}])
    } else {
        json!([{"op": "push", "id": 20, "value": {"string": 1}}])
    };
    json!({
        "strings": [[1, "called"]],
        "sections": [
            {"label": "main", "renderable": true, "body": [
                {"op": "call", "id": 1, "label": "target", "mode": mode}
            ]},
            {"label": "target", "renderable": renderable, "body": body}
        ]
    })
}

#[test]
fn renderable_code_calls_renderable_code() {
    let (rt, _clock) = start(caller("renderable", true));
    assert_eq!(rt.state(), SchedulerState::Idle);
    assert_eq!(rendered(&rt), r#"<i x-id="elem-20"></i>"#);
}

#[test]
fn renderable_calls_reject_non_renderable_code() {
    let (rt, _clock) = start(caller("renderable", false));
    let report = rt.last_error().unwrap();
    assert_eq!(report.kind, "CallDisciplineError");
    assert_eq!(
        report.message,
        "cannot call renderable code from non-renderable code or vice versa (`target` under MUST_BE_RENDERABLE)"
    );
}

#[test]
fn callable_calls_accept_only_non_renderable_code() {
    let (rt, _clock) = start(caller("callable", false));
    assert_eq!(rt.state(), SchedulerState::Idle);

    let (rt, _clock) = start(caller("callable", true));
    assert_eq!(rt.last_error().map(|e| e.kind), Some("CallDisciplineError"));
}

#[test]
fn unconstrained_calls_accept_both() {
    for renderable in [true, false] {
        let (rt, _clock) = start(caller("any", renderable));
        assert_eq!(rt.state(), SchedulerState::Idle, "renderable = {renderable}");
    }
}

#[test]
fn undefined_sections_fail_the_render() {
    let (rt, _clock) = start(json!({
        "sections": [{"label": "main", "renderable": true, "body": [
            {"op": "call", "id": 1, "label": "ghost", "mode": "any"}
        ]}]
    }));
    assert_eq!(
        rt.last_error().map(|e| e.to_string()),
        Some("UndefinedSectionError: cannot call undefined code section `ghost`".to_string())
    );
}

#[test]
fn the_call_mode_is_restored_after_each_call() {
    let (mut rt, _clock) = start(caller("callable", false));
    assert_eq!(rt.call_mode(), CallMode::CanBeAny);

    let id = rt.id("manual");
    rt.invoke(id, "target", CallMode::MustBeCallable).unwrap();
    assert_eq!(rt.call_mode(), CallMode::CanBeAny);
    assert_eq!(
        rt.stack().as_slice(),
        &[StackValue::from("called"), StackValue::from("called")]
    );

    rt.invoke(id, "main", CallMode::MustBeCallable).unwrap_err();
    assert_eq!(rt.call_mode(), CallMode::CanBeAny);
}

#[test]
fn nested_non_renderable_calls_keep_their_mode() {
    let (rt, _clock) = start(json!({
        "strings": [[1, "deep"]],
        "sections": [
            {"label": "main", "renderable": true, "body": [
                {"op": "call", "id": 1, "label": "outer", "mode": "callable"},
                {"op": "value", "id": 2, "value": {"stack": 0}}
            ]},
            {"label": "outer", "renderable": false, "body": [
                {"op": "call", "id": 3, "label": "inner", "mode": "callable"}
            ]},
            {"label": "inner", "renderable": false, "body": [
                {"op": "push", "id": 4, "value": {"string": 1}}
            ]}
        ]
    }));
    assert_eq!(rendered(&rt), r#"<span x-id="rawValue-2">deep</span>"#);
}

#[test]
fn redefinition_replaces_the_section() {
    let (mut rt, _clock) = start(caller("renderable", true));
    let body = serde_json::from_value(json!([{"op": "elem", "id": 21, "tag": "b"}])).unwrap();
    rt.define("target", true, body);
    rt.render();

    assert_eq!(rendered(&rt), r#"<b x-id="elem-21"></b>"#);
}
