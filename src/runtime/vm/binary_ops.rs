use crate::{
    bytecode::MathOp,
    runtime::{error::Result, ident::CallId, value::StackValue},
    surface::Surface,
};

use super::Runtime;

impl<S: Surface> Runtime<S> {
    /// Applies `operator` to the two topmost values. The value pushed first
    /// is the left operand.
    pub fn calc(&mut self, id: CallId, operator: &str) -> Result<StackValue> {
        let op: MathOp = operator.parse()?;
        let result = self.stack.calc(op)?;
        diag!(
            self,
            trace,
            site = %self.ids.label(id),
            operator = op.symbol(),
            %result,
            "calc"
        );
        Ok(result)
    }
}
