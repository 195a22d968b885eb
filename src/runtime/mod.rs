//! Runtime core types and program execution.
//!
//! # Single Flow
//! A runtime is driven from one thread. Render passes, event handlers and
//! scheduler ticks never interleave: each runs to completion before the host
//! calls into the runtime again, so the operand stack, render frames and call
//! context need no synchronization.

/// Emits a tracing event unless diagnostics are disabled for this runtime.
macro_rules! diag {
    ($rt:expr, $level:ident, $($arg:tt)+) => {
        if $rt.logging_enabled() {
            ::tracing::$level!($($arg)+);
        }
    };
}

pub mod clock;
pub mod config;
pub mod error;
pub mod frame;
pub mod ident;
pub mod scheduler;
pub mod section;
pub mod stack;
pub mod tables;
pub mod value;
pub mod vm;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use ident::{CallId, RawKey};
pub use scheduler::SchedulerState;
pub use value::StackValue;
pub use vm::{ErrorReport, Runtime};
