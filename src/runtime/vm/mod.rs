use std::{rc::Rc, time::Instant};

use crate::{
    bytecode::{CallMode, Instruction, Program},
    runtime::{
        clock::{Clock, SystemClock},
        config::RuntimeConfig,
        error::Result,
        frame::{FrameKind, RenderFrame, RenderStack},
        ident::{CallId, Identifiers, RawKey},
        scheduler::{Scheduler, SchedulerState, StormGuard},
        section::{CodeSection, SectionTable},
        stack::OperandStack,
        tables::ResourceTables,
        value::StackValue,
    },
    surface::Surface,
};

mod binary_ops;
mod comparison_ops;
mod dispatch;
mod event;
mod function_call;
mod recovery;
mod render;
mod schedule;

pub use event::Listener;
pub use function_call::CallContext;
pub use recovery::{ERROR_CLASS, ErrorReport};

/// Executes a loaded program against an output surface.
///
/// The runtime owns every piece of shared execution state: the operand
/// stack, the render frames, the call context, the event listeners and the
/// scheduler. Hosts drive it through [`Runtime::bootstrap`],
/// [`Runtime::poll`] and [`Runtime::dispatch_event`].
pub struct Runtime<S: Surface> {
    config: RuntimeConfig,
    clock: Rc<dyn Clock>,
    surface: S,
    mount: S::Node,
    ids: Identifiers,
    tables: ResourceTables,
    sections: SectionTable,
    stack: OperandStack,
    frames: RenderStack<S::Node>,
    call: CallContext,
    focus: Option<S::Node>,
    listeners: Vec<Listener<S::Node>>,
    scheduler: Scheduler,
    root_id: CallId,
    root_section: Rc<CodeSection>,
    last_error: Option<ErrorReport>,
}

impl<S: Surface> Runtime<S> {
    pub fn new(surface: S, config: RuntimeConfig) -> Self {
        Self::with_clock(surface, config, Rc::new(SystemClock))
    }

    pub fn with_clock(surface: S, config: RuntimeConfig, clock: Rc<dyn Clock>) -> Self {
        let now = clock.now();
        let mut ids = Identifiers::new();
        let root_id = ids.resolve(&RawKey::ROOT);
        let root_section = Rc::new(CodeSection::root());
        let storm = StormGuard::new(config.storm_quota, config.quota_window, now);
        let mount = surface.root();

        let mut runtime = Self {
            config,
            clock,
            surface,
            mount,
            ids,
            tables: ResourceTables::new(),
            sections: SectionTable::new(),
            stack: OperandStack::new(),
            frames: RenderStack::new(),
            call: CallContext::new(root_section.clone()),
            focus: None,
            listeners: Vec::new(),
            scheduler: Scheduler::new(storm),
            root_id,
            root_section,
            last_error: None,
        };
        runtime.install_root_frame(mount);
        runtime
    }

    /// Loads the tables and sections of `program`. A program compiled in
    /// unsafe mode switches the runtime to unsafe mode.
    pub fn load_program(&mut self, program: &Program) {
        if program.unsafe_mode {
            self.set_unsafe_mode(true);
        }
        self.load_strings(program.strings.iter().map(|(k, v)| (*k, v.as_str())));
        self.load_constants(program.constants.iter().copied());
        for section in &program.sections {
            self.define(&section.label, section.renderable, section.body.clone());
        }
        diag!(
            self,
            debug,
            sections = self.sections.len(),
            strings = self.tables.string_count(),
            constants = self.tables.constant_count(),
            "program loaded"
        );
    }

    /// Registers a code section, replacing any section with the same label.
    pub fn define(&mut self, label: &str, renderable: bool, body: Vec<Instruction>) {
        let replaced = self
            .sections
            .define(CodeSection::new(label, renderable, body));
        if replaced.is_some() {
            diag!(self, warn, section = label, "code section redefined");
        }
    }

    pub fn has_section(&self, label: &str) -> bool {
        self.sections.contains(label)
    }

    pub fn load_strings<'a>(&mut self, entries: impl IntoIterator<Item = (i64, &'a str)>) {
        self.tables.load_strings(entries);
    }

    pub fn load_constants(&mut self, entries: impl IntoIterator<Item = (i64, f64)>) {
        self.tables.load_constants(entries);
    }

    pub fn get_string(&self, key: i64) -> Result<Rc<str>> {
        self.tables.get_string(key)
    }

    pub fn get_constant(&self, key: i64) -> Result<f64> {
        self.tables.get_constant(key)
    }

    /// Unsafe mode disables diagnostic logging and the re-render storm guard.
    pub fn set_unsafe_mode(&mut self, enabled: bool) {
        self.config.unsafe_mode = enabled;
    }

    pub(crate) fn logging_enabled(&self) -> bool {
        !self.config.unsafe_mode
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Canonical handle for a raw calling identifier.
    pub fn id(&mut self, raw: impl Into<RawKey>) -> CallId {
        self.ids.resolve(&raw.into())
    }

    pub fn identifiers(&self) -> &Identifiers {
        &self.ids
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Node the program renders into.
    pub fn mount(&self) -> S::Node {
        self.mount
    }

    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    pub fn render_depth(&self) -> usize {
        self.frames.depth()
    }

    pub fn call_mode(&self) -> CallMode {
        self.call.mode()
    }

    pub fn focus(&self) -> Option<S::Node> {
        self.focus
    }

    /// Sets the node `read` instructions take their value from.
    pub fn set_focus(&mut self, node: Option<S::Node>) {
        self.focus = node;
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// When the next deferred render is due, if one is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    pub fn render_count(&self) -> u64 {
        self.scheduler.renders()
    }

    /// Re-render requests counted against the storm quota in the current window.
    pub fn rerender_requests(&self) -> u32 {
        self.scheduler.storm().requested()
    }

    /// Failure currently shown by the error display.
    pub fn last_error(&self) -> Option<&ErrorReport> {
        self.last_error.as_ref()
    }

    pub fn push(&mut self, id: CallId, value: StackValue) -> Result<()> {
        diag!(self, trace, site = %self.ids.label(id), %value, "push");
        self.stack.push(value)
    }

    pub fn pop(&mut self, id: CallId) -> Result<StackValue> {
        let value = self.stack.pop()?;
        diag!(self, trace, site = %self.ids.label(id), %value, "pop");
        Ok(value)
    }

    pub fn duplicate_top(&mut self, id: CallId) -> Result<()> {
        self.stack.duplicate_top()?;
        diag!(self, trace, site = %self.ids.label(id), depth = self.stack.len(), "copy");
        Ok(())
    }

    pub fn swap(&mut self, id: CallId, a: usize, b: usize) -> Result<()> {
        self.stack.swap(a, b)?;
        diag!(self, trace, site = %self.ids.label(id), a, b, "swap");
        Ok(())
    }

    pub fn peek(&self, id: CallId, offset: usize) -> Result<StackValue> {
        let value = self.stack.peek(offset)?.clone();
        diag!(self, trace, site = %self.ids.label(id), offset, %value, "peek");
        Ok(value)
    }

    fn install_root_frame(&mut self, mount: S::Node) {
        self.frames.truncate(0);
        self.frames.push(RenderFrame::new(
            self.root_id,
            self.root_section.clone(),
            mount,
            FrameKind::Root,
        ));
        self.mount = mount;
    }
}

#[cfg(test)]
mod test_support;
