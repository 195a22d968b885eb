#[path = "../support/mod.rs"]
mod support;

use std::time::Duration;

use arbor::{
    Program, Runtime, RuntimeConfig, VirtualTree,
    runtime::{Clock, SchedulerState},
};
use serde_json::json;

use support::{load_with, settle, start, start_with};

fn self_rerendering() -> serde_json::Value {
    json!({
        "sections": [{"label": "main", "renderable": true, "body": [
            {"op": "elem", "id": 1, "tag": "hr"},
            {"op": "render", "id": 2}
        ]}]
    })
}

#[test]
fn init_requests_settle_into_one_extra_render() {
    let (mut rt, clock) = start(json!({
        "sections": [
            {"label": "init", "renderable": false, "body": [
                {"op": "render", "id": 1},
                {"op": "render", "id": 2}
            ]},
            {"label": "main", "renderable": true, "body": [{"op": "elem", "id": 3, "tag": "p"}]}
        ]
    }));

    assert_eq!(settle(&mut rt, &clock, 10, 10), 1);
    assert_eq!(rt.render_count(), 2);
    assert_eq!(rt.next_deadline(), None);
    assert_eq!(rt.state(), SchedulerState::Idle);
}

#[test]
fn the_quota_is_configurable() {
    let config = RuntimeConfig::default().with_storm_quota(2);
    let (mut rt, clock) = start_with(self_rerendering(), config);

    clock.advance_ms(100);
    assert!(rt.poll());
    assert_eq!(rt.state(), SchedulerState::Idle);
    clock.advance_ms(100);
    assert!(rt.poll());

    assert_eq!(rt.render_count(), 3);
    assert_eq!(
        rt.last_error().map(|e| e.to_string()),
        Some(
            "RerenderStormError: scheduled more than 2 re-renders from renderable code within one window, loop prevented"
                .to_string()
        )
    );
}

#[test]
fn a_self_rerendering_program_is_stopped() {
    let (mut rt, clock) = start(self_rerendering());

    let ran = settle(&mut rt, &clock, 100, 100);

    assert_eq!(ran, 5);
    assert_eq!(rt.state(), SchedulerState::Error);
    assert_eq!(rt.next_deadline(), None);
}

#[test]
fn the_guard_recovers_after_a_quiet_window() {
    let (mut rt, clock) = start(self_rerendering());
    settle(&mut rt, &clock, 100, 100);
    assert_eq!(rt.state(), SchedulerState::Error);

    clock.advance_ms(1000);
    assert!(!rt.poll());
    rt.render();

    assert_eq!(rt.state(), SchedulerState::Idle);
    assert_eq!(rt.last_error(), None);
    assert_eq!(rt.rerender_requests(), 1);
    assert_eq!(rt.next_deadline(), Some(clock.now() + Duration::from_millis(100)));
}

#[test]
fn programs_compiled_in_unsafe_mode_are_never_stopped() {
    let mut source = self_rerendering();
    source["unsafe_mode"] = json!(true);
    let (mut rt, clock) = load_with(source, RuntimeConfig::default());
    let mount = rt.mount();
    rt.bootstrap(mount);

    assert!(rt.config().unsafe_mode);
    assert_eq!(settle(&mut rt, &clock, 100, 20), 20);
    assert_eq!(rt.state(), SchedulerState::Idle);
    assert_eq!(rt.render_count(), 21);
}

#[test]
fn the_system_clock_drives_real_deadlines() {
    let program: Program = serde_json::from_value(self_rerendering()).unwrap();
    let config = RuntimeConfig::default().with_settle_delay(Duration::ZERO);
    let mut rt = Runtime::new(VirtualTree::new(), config);
    rt.load_program(&program);
    let mount = rt.mount();
    rt.bootstrap(mount);

    assert!(rt.next_deadline().is_some());
    assert!(rt.poll());
    assert_eq!(rt.render_count(), 2);
}
