//! Execution and rendering runtime for compiled layout programs.
//!
//! A program is a table of named code sections over a shared operand stack.
//! Running `main` materializes a tree of nodes on a [`surface::Surface`];
//! event handlers and deferred re-renders rebuild that tree from scratch.

pub mod bytecode;
pub mod runtime;
pub mod surface;

pub use bytecode::{Instruction, LoadError, Program};
pub use runtime::{Runtime, RuntimeConfig, RuntimeError};
pub use surface::{Surface, VirtualTree};
