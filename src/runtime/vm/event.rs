use std::rc::Rc;

use crate::{
    bytecode::CallMode,
    runtime::{
        error::{Result, RuntimeError},
        ident::CallId,
        value::StackValue,
    },
    surface::{FocusValue, Surface},
};

use super::Runtime;

/// Handler registered by a `listen` instruction during the current render.
#[derive(Debug, Clone)]
pub struct Listener<N> {
    pub id: CallId,
    pub node: N,
    pub event: Rc<str>,
    pub handler: Rc<str>,
}

impl<S: Surface> Runtime<S> {
    /// Binds `handler` to `event` on the current frame's node.
    pub fn bind_event(&mut self, id: CallId, event: &str, handler: &str) -> Result<()> {
        let node = self.insertion_point()?;
        self.surface.add_listener(node, event)?;
        diag!(self, debug, site = %self.ids.label(id), event, handler, "listen");
        self.listeners.push(Listener {
            id,
            node,
            event: event.into(),
            handler: handler.into(),
        });
        Ok(())
    }

    /// Delivers `event` fired on `target`.
    ///
    /// Handlers bound on the target run first, then those bound on each
    /// ancestor. Every handler runs as non-renderable code with the focus
    /// set to `target`. The first failure is shown by the error display and
    /// stops delivery. Returns the number of handlers that ran.
    pub fn dispatch_event(&mut self, target: S::Node, event: &str) -> usize {
        let mut matched = Vec::new();
        let mut current = Some(target);
        while let Some(node) = current {
            matched.extend(
                self.listeners
                    .iter()
                    .filter(|l| l.node == node && &*l.event == event)
                    .map(|l| (l.id, l.handler.clone())),
            );
            current = self.surface.parent(node);
        }
        diag!(self, debug, event, handlers = matched.len(), "dispatch event");

        let mut ran = 0;
        for (id, handler) in matched {
            ran += 1;
            if let Err(err) = self.run_handler(id, target, &handler) {
                self.recover(err);
                break;
            }
        }
        ran
    }

    fn run_handler(&mut self, id: CallId, target: S::Node, handler: &str) -> Result<()> {
        let saved_focus = self.focus.replace(target);
        let result = self.invoke(id, handler, CallMode::MustBeCallable);
        self.focus = saved_focus;
        result
    }

    /// Reads the focused node and pushes its value: text as text, a toggle
    /// as `1` or `0`.
    pub fn read_focus(&mut self, id: CallId) -> Result<()> {
        let node = self.focus.ok_or(RuntimeError::NoFocusTarget)?;
        let value = match self.surface.read_value(node)? {
            FocusValue::Text(text) => StackValue::text(text),
            FocusValue::Toggle(on) => StackValue::Number(if on { 1.0 } else { 0.0 }),
        };
        self.push(id, value)
    }

    pub fn listeners(&self) -> &[Listener<S::Node>] {
        &self.listeners
    }
}
