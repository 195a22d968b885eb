use crate::{
    bytecode::MathOp,
    runtime::{
        error::{Result, RuntimeError},
        value::StackValue,
    },
};

/// Operand stack shared by every section of a running program.
///
/// Offsets count from the top: offset `0` is the most recently pushed value.
#[derive(Debug, Default, Clone)]
pub struct OperandStack {
    values: Vec<StackValue>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a value after checking it is representable on the stack.
    pub fn push(&mut self, value: StackValue) -> Result<()> {
        value.validate()?;
        self.values.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<StackValue> {
        self.values.pop().ok_or(RuntimeError::StackUnderflow {
            operation: "pop a value off the stack",
        })
    }

    /// Pushes a copy of the top value.
    pub fn duplicate_top(&mut self) -> Result<()> {
        let top = self
            .values
            .last()
            .cloned()
            .ok_or(RuntimeError::StackUnderflow {
                operation: "duplicate the top value",
            })?;
        self.values.push(top);
        Ok(())
    }

    pub fn peek(&self, offset: usize) -> Result<&StackValue> {
        let index = self.index_of(offset)?;
        Ok(&self.values[index])
    }

    /// Exchanges the values at two top-relative offsets.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let a = self.index_of(a)?;
        let b = self.index_of(b)?;
        self.values.swap(a, b);
        Ok(())
    }

    /// Pops the right operand, then the left one, and pushes `left op right`.
    pub fn calc(&mut self, op: MathOp) -> Result<StackValue> {
        let right = self.pop()?;
        let left = self.pop()?;
        let (Some(l), Some(r)) = (left.as_number(), right.as_number()) else {
            return Err(RuntimeError::OperandType {
                operator: op.symbol(),
                left: left.type_name(),
                right: right.type_name(),
            });
        };
        let result = StackValue::number(op.apply(l, r))?;
        self.values.push(result.clone());
        Ok(result)
    }

    /// Pops two values and pushes `1` if they are equal, `0` otherwise.
    pub fn compare(&mut self) -> Result<bool> {
        let first = self.pop()?;
        let second = self.pop()?;
        let equal = first == second;
        self.values
            .push(StackValue::Number(if equal { 1.0 } else { 0.0 }));
        Ok(equal)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Values from bottom to top.
    pub fn as_slice(&self) -> &[StackValue] {
        &self.values
    }

    fn index_of(&self, offset: usize) -> Result<usize> {
        let depth = self.values.len();
        if offset < depth {
            Ok(depth - 1 - offset)
        } else {
            Err(RuntimeError::StackOffset { offset, depth })
        }
    }
}
