use std::fmt;

use thiserror::Error;

use crate::{bytecode::CallMode, surface::SurfaceError};

/// Resource table a lookup failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    String,
    Constant,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::String => write!(f, "string"),
            ResourceKind::Constant => write!(f, "constant"),
        }
    }
}

/// Failure raised while executing a program.
///
/// Every variant is fatal for the render pass or event handler that raised
/// it; the scheduler turns it into the visible error state.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("cannot call undefined code section `{label}`")]
    UndefinedSection { label: String },

    #[error("{kind} {key} not found")]
    UndefinedResource { kind: ResourceKind, key: i64 },

    #[error(
        "cannot call renderable code from non-renderable code or vice versa (`{label}` under {mode})"
    )]
    CallDiscipline { label: String, mode: CallMode },

    #[error("cannot have a value on the stack that is out of bounds: {value}")]
    InvalidStackValue { value: String },

    #[error("cannot {operation}, because the stack is empty")]
    StackUnderflow { operation: &'static str },

    #[error("stack offset {offset} is out of bounds for a stack of depth {depth}")]
    StackOffset { offset: usize, depth: usize },

    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    #[error("cannot apply `{operator}` to {left} and {right}")]
    OperandType {
        operator: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot read a value because no node is focused")]
    NoFocusTarget,

    #[error("scheduled more than {quota} re-renders from renderable code within one window, loop prevented")]
    RerenderStorm { quota: u32 },

    #[error("no rendering frame is open")]
    NoRenderFrame,

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl RuntimeError {
    /// Stable kind name shown in the error display and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::UndefinedSection { .. } => "UndefinedSectionError",
            RuntimeError::UndefinedResource { .. } => "UndefinedResourceError",
            RuntimeError::CallDiscipline { .. } => "CallDisciplineError",
            RuntimeError::InvalidStackValue { .. } => "InvalidStackValueError",
            RuntimeError::StackUnderflow { .. } => "StackUnderflowError",
            RuntimeError::StackOffset { .. } => "StackOffsetError",
            RuntimeError::UnknownOperator(_) => "UnknownOperatorError",
            RuntimeError::OperandType { .. } => "OperandTypeError",
            RuntimeError::NoFocusTarget => "NoFocusTargetError",
            RuntimeError::RerenderStorm { .. } => "RerenderStormError",
            RuntimeError::NoRenderFrame => "NoRenderFrameError",
            RuntimeError::Surface(_) => "SurfaceError",
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
