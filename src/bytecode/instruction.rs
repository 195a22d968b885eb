use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::runtime::{error::RuntimeError, ident::RawKey};

/// Renderability constraint applied when a section is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CallMode {
    /// Callee renderability must match the section of the innermost render frame.
    #[serde(rename = "renderable")]
    MustBeRenderable,
    /// Callee must be non-renderable.
    #[serde(rename = "callable")]
    MustBeCallable,
    #[default]
    #[serde(rename = "any")]
    CanBeAny,
}

impl fmt::Display for CallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallMode::MustBeRenderable => "MUST_BE_RENDERABLE",
            CallMode::MustBeCallable => "MUST_BE_CALLABLE",
            CallMode::CanBeAny => "CAN_BE_ANY",
        };
        write!(f, "{}", name)
    }
}

/// Source of a value used by `push` and `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueRef {
    /// Entry of the string table.
    String(i64),
    /// Entry of the constant table.
    Constant(i64),
    /// Operand stack entry, counted from the top.
    Stack(usize),
}

/// Arithmetic operator of `calc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Sub,
    Mul,
    /// Division rounded toward negative infinity.
    FloorDiv,
}

impl MathOp {
    pub fn symbol(self) -> &'static str {
        match self {
            MathOp::Add => "+",
            MathOp::Sub => "-",
            MathOp::Mul => "*",
            MathOp::FloorDiv => "//",
        }
    }

    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            MathOp::Add => left + right,
            MathOp::Sub => left - right,
            MathOp::Mul => left * right,
            MathOp::FloorDiv => (left / right).floor(),
        }
    }
}

impl FromStr for MathOp {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(MathOp::Add),
            "-" => Ok(MathOp::Sub),
            "*" => Ok(MathOp::Mul),
            "//" => Ok(MathOp::FloorDiv),
            other => Err(RuntimeError::UnknownOperator(other.to_string())),
        }
    }
}

/// Tag of a `container` instruction.
///
/// A missing tag means a plain `div`; the reserved tag `root` marks the
/// wrapper the compiler puts around section bodies, whose children are
/// hoisted into the caller's node instead of being nested.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ContainerTag {
    #[default]
    Default,
    Named(String),
    Root,
}

impl ContainerTag {
    pub const ROOT_NAME: &'static str = "root";

    /// Element name the container node is created with.
    pub fn element(&self) -> &str {
        match self {
            ContainerTag::Default => "div",
            ContainerTag::Named(tag) => tag,
            ContainerTag::Root => Self::ROOT_NAME,
        }
    }
}

impl From<Option<String>> for ContainerTag {
    fn from(tag: Option<String>) -> Self {
        match tag {
            None => ContainerTag::Default,
            Some(tag) if tag == Self::ROOT_NAME => ContainerTag::Root,
            Some(tag) => ContainerTag::Named(tag),
        }
    }
}

impl From<ContainerTag> for Option<String> {
    fn from(tag: ContainerTag) -> Self {
        match tag {
            ContainerTag::Default => None,
            ContainerTag::Named(tag) => Some(tag),
            ContainerTag::Root => Some(ContainerTag::ROOT_NAME.to_string()),
        }
    }
}

/// One step of a code section. Every instruction carries the calling
/// identifier of its site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    Container {
        id: RawKey,
        #[serde(default)]
        tag: ContainerTag,
        #[serde(default)]
        body: Vec<Instruction>,
    },
    If {
        id: RawKey,
        #[serde(default)]
        body: Vec<Instruction>,
    },
    Elem {
        id: RawKey,
        tag: String,
    },
    Value {
        id: RawKey,
        /// Interpret the value as markup instead of plain text.
        #[serde(default)]
        raw: bool,
        value: ValueRef,
    },
    Call {
        id: RawKey,
        label: String,
        #[serde(default)]
        mode: CallMode,
    },
    Render {
        id: RawKey,
    },
    Listen {
        id: RawKey,
        event: String,
        handler: String,
    },
    Push {
        id: RawKey,
        value: ValueRef,
    },
    Copy {
        id: RawKey,
    },
    Pop {
        id: RawKey,
    },
    Swap {
        id: RawKey,
        a: usize,
        b: usize,
    },
    Compare {
        id: RawKey,
    },
    Read {
        id: RawKey,
    },
    Calc {
        id: RawKey,
        /// Kept as written; unknown operators fail when executed.
        operator: String,
    },
}

impl Instruction {
    pub fn id(&self) -> &RawKey {
        match self {
            Instruction::Container { id, .. }
            | Instruction::If { id, .. }
            | Instruction::Elem { id, .. }
            | Instruction::Value { id, .. }
            | Instruction::Call { id, .. }
            | Instruction::Render { id }
            | Instruction::Listen { id, .. }
            | Instruction::Push { id, .. }
            | Instruction::Copy { id }
            | Instruction::Pop { id }
            | Instruction::Swap { id, .. }
            | Instruction::Compare { id }
            | Instruction::Read { id }
            | Instruction::Calc { id, .. } => id,
        }
    }

    /// Operation name as written in the program.
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Container { .. } => "container",
            Instruction::If { .. } => "if",
            Instruction::Elem { .. } => "elem",
            Instruction::Value { .. } => "value",
            Instruction::Call { .. } => "call",
            Instruction::Render { .. } => "render",
            Instruction::Listen { .. } => "listen",
            Instruction::Push { .. } => "push",
            Instruction::Copy { .. } => "copy",
            Instruction::Pop { .. } => "pop",
            Instruction::Swap { .. } => "swap",
            Instruction::Compare { .. } => "compare",
            Instruction::Read { .. } => "read",
            Instruction::Calc { .. } => "calc",
        }
    }

    /// Nested body of block instructions.
    pub fn body(&self) -> Option<&[Instruction]> {
        match self {
            Instruction::Container { body, .. } | Instruction::If { body, .. } => Some(body),
            _ => None,
        }
    }
}
