//! Program representation: instructions, code sections and resource tables
//! as produced by the layout compiler.

pub mod instruction;
pub mod program;

pub use instruction::{CallMode, ContainerTag, Instruction, MathOp, ValueRef};
pub use program::{LoadError, Program, ProgramWarning, SectionDef};
