use crate::{
    bytecode::{Instruction, ValueRef},
    runtime::{error::Result, ident::CallId, value::StackValue},
    surface::Surface,
};

use super::Runtime;

impl<S: Surface> Runtime<S> {
    /// Runs `code` in order, stopping at the first failure.
    pub fn execute(&mut self, code: &[Instruction]) -> Result<()> {
        for instruction in code {
            self.dispatch_instruction(instruction)?;
        }
        Ok(())
    }

    fn dispatch_instruction(&mut self, instruction: &Instruction) -> Result<()> {
        let id = self.ids.resolve(instruction.id());
        match instruction {
            Instruction::Container { tag, body, .. } => {
                self.enter_container(id, tag, |rt| rt.execute(body))
            }
            Instruction::If { body, .. } => self.enter_conditional(id, |rt| rt.execute(body)),
            Instruction::Elem { tag, .. } => self.emit_leaf(id, tag),
            Instruction::Value { raw, value, .. } => {
                let content = self.resolve_value(id, *value)?;
                self.emit_value(id, *raw, Some(content))
            }
            Instruction::Call { label, mode, .. } => self.invoke(id, label, *mode),
            Instruction::Render { .. } => {
                self.request_rerender(id);
                Ok(())
            }
            Instruction::Listen { event, handler, .. } => self.bind_event(id, event, handler),
            Instruction::Push { value, .. } => {
                let value = self.resolve_value(id, *value)?;
                self.push(id, value)
            }
            Instruction::Copy { .. } => self.duplicate_top(id),
            Instruction::Pop { .. } => self.pop(id).map(drop),
            Instruction::Swap { a, b, .. } => self.swap(id, *a, *b),
            Instruction::Compare { .. } => self.compare(id).map(drop),
            Instruction::Read { .. } => self.read_focus(id),
            Instruction::Calc { operator, .. } => self.calc(id, operator).map(drop),
        }
    }

    /// Resolves a value reference. Numbers are validated when pushed, not here.
    fn resolve_value(&self, id: CallId, value: ValueRef) -> Result<StackValue> {
        match value {
            ValueRef::String(key) => Ok(StackValue::Text(self.tables.get_string(key)?)),
            ValueRef::Constant(key) => Ok(StackValue::Number(self.tables.get_constant(key)?)),
            ValueRef::Stack(offset) => self.peek(id, offset),
        }
    }
}
