use std::fmt;

use crate::{
    runtime::{
        error::{Result, RuntimeError},
        scheduler::SchedulerState,
    },
    surface::Surface,
};

use super::Runtime;

/// Class set on the mount node while the error display is shown.
pub const ERROR_CLASS: &str = "arbor-error";
const ERROR_STYLE: &str = "color: red";
const ERROR_HEADING: &str = "An error occurred";

/// Failure shown by the error display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl<S: Surface> Runtime<S> {
    /// Abandons the current flow and replaces the output with the error
    /// display. Execution resumes only with the next render.
    pub(super) fn recover(&mut self, err: RuntimeError) {
        let report = ErrorReport {
            kind: err.kind(),
            message: err.to_string(),
        };
        diag!(self, error, kind = report.kind, message = %report.message, "runtime failure");

        self.frames.truncate(1);
        self.focus = None;
        self.listeners.clear();
        self.scheduler.state = SchedulerState::Error;
        if let Err(display_err) = self.show_error(&report) {
            diag!(self, error, error = %display_err, "failed to show the error display");
        }
        self.last_error = Some(report);
    }

    fn show_error(&mut self, report: &ErrorReport) -> Result<()> {
        let mount = self.mount;
        self.surface.clear_children(mount)?;
        self.surface.set_attribute(mount, "style", ERROR_STYLE)?;
        self.surface.set_attribute(mount, "class", ERROR_CLASS)?;

        let heading = self.surface.create_element("h1")?;
        self.surface.set_text(heading, ERROR_HEADING)?;
        self.surface.append_child(mount, heading)?;

        let detail = self.surface.create_element("pre")?;
        self.surface.set_text(detail, &report.to_string())?;
        self.surface.append_child(mount, detail)?;
        Ok(())
    }

    pub(super) fn clear_error_display(&mut self) -> Result<()> {
        let mount = self.mount;
        self.surface.remove_attribute(mount, "style")?;
        self.surface.remove_attribute(mount, "class")?;
        Ok(())
    }
}
