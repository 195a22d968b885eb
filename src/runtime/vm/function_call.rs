use std::rc::Rc;

use crate::{
    bytecode::CallMode,
    runtime::{
        error::{Result, RuntimeError},
        ident::CallId,
        section::CodeSection,
    },
    surface::Surface,
};

use super::Runtime;

/// Call mode and section of the code currently executing.
#[derive(Debug, Clone)]
pub struct CallContext {
    mode: CallMode,
    section: Rc<CodeSection>,
}

impl CallContext {
    pub(super) fn new(section: Rc<CodeSection>) -> Self {
        Self {
            mode: CallMode::CanBeAny,
            section,
        }
    }

    pub fn mode(&self) -> CallMode {
        self.mode
    }

    pub fn section(&self) -> &Rc<CodeSection> {
        &self.section
    }
}

impl<S: Surface> Runtime<S> {
    /// Looks up `label`, checks it against `mode` and runs its body.
    ///
    /// The caller's call context is restored when the body finishes, whether
    /// it succeeded or not.
    pub fn invoke(&mut self, id: CallId, label: &str, mode: CallMode) -> Result<()> {
        let callee = self.sections.lookup(label)?;
        self.check_discipline(&callee, mode)?;
        diag!(
            self,
            debug,
            site = %self.ids.label(id),
            section = label,
            %mode,
            "call"
        );

        let Some(body) = callee.body.clone() else {
            return Ok(());
        };
        self.with_call_context(mode, callee, |rt| rt.execute(&body))
    }

    fn check_discipline(&self, callee: &CodeSection, mode: CallMode) -> Result<()> {
        let allowed = match mode {
            CallMode::MustBeRenderable => {
                let caller = self.frames.top().ok_or(RuntimeError::NoRenderFrame)?;
                caller.section.renderable == callee.renderable
            }
            CallMode::MustBeCallable => !callee.renderable,
            CallMode::CanBeAny => true,
        };
        if allowed {
            Ok(())
        } else {
            Err(RuntimeError::CallDiscipline {
                label: callee.label.to_string(),
                mode,
            })
        }
    }

    pub(super) fn with_call_context<R>(
        &mut self,
        mode: CallMode,
        section: Rc<CodeSection>,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let saved = std::mem::replace(&mut self.call, CallContext { mode, section });
        let result = f(self);
        self.call = saved;
        result
    }
}
