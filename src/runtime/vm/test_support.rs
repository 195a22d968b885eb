use std::rc::Rc;

use serde_json::Value as Json;

use crate::{
    bytecode::Program,
    runtime::{Runtime, RuntimeConfig, clock::ManualClock},
    surface::{Surface, VirtualTree},
};

pub(super) type TestRuntime = Runtime<VirtualTree>;

pub(super) fn new_runtime() -> TestRuntime {
    Runtime::with_clock(
        VirtualTree::new(),
        RuntimeConfig::default(),
        Rc::new(ManualClock::new()),
    )
}

/// Loads a program given as JSON into a runtime driven by a manual clock.
pub(super) fn load(program: Json) -> (TestRuntime, Rc<ManualClock>) {
    load_with(program, RuntimeConfig::default())
}

pub(super) fn load_with(program: Json, config: RuntimeConfig) -> (TestRuntime, Rc<ManualClock>) {
    let program: Program = serde_json::from_value(program).unwrap();
    let clock = Rc::new(ManualClock::new());
    let mut rt = Runtime::with_clock(VirtualTree::new(), config, clock.clone());
    rt.load_program(&program);
    (rt, clock)
}

pub(super) fn boot(rt: &mut TestRuntime) {
    let mount = rt.mount();
    rt.bootstrap(mount);
}

/// Markup of everything rendered below the mount node.
pub(super) fn output(rt: &TestRuntime) -> String {
    rt.surface().inner_markup(rt.mount())
}

pub(super) fn node_by_xid(rt: &TestRuntime, xid: &str) -> crate::surface::NodeId {
    rt.surface()
        .find_by_attribute(crate::surface::XID_ATTRIBUTE, xid)
        .unwrap_or_else(|| panic!("no node tagged {xid} in {}", output(rt)))
}

pub(super) fn mount_attribute(rt: &TestRuntime, name: &str) -> Option<String> {
    rt.surface()
        .attribute(rt.surface().root(), name)
        .map(str::to_string)
}
