use crate::{
    bytecode::CallMode,
    runtime::{
        error::{Result, RuntimeError},
        ident::CallId,
        scheduler::SchedulerState,
        section::{INIT_SECTION, MAIN_SECTION},
    },
    surface::Surface,
};

use super::Runtime;

impl<S: Surface> Runtime<S> {
    /// Mounts the program on `target`, runs `init` if the program defines
    /// it and performs the first render.
    ///
    /// A failing `init` shows the error display and skips the render.
    pub fn bootstrap(&mut self, target: S::Node) {
        self.install_root_frame(target);
        diag!(self, debug, "bootstrap");
        if self.sections.contains(INIT_SECTION) {
            let root = self.root_id;
            if let Err(err) = self.invoke(root, INIT_SECTION, CallMode::MustBeCallable) {
                self.recover(err);
                return;
            }
        }
        self.render();
    }

    /// Asks for another render.
    ///
    /// Outside the render pass, or from non-renderable code, this arms the
    /// settle deadline unless it is already armed. From the render pass
    /// itself it is counted against the storm quota and the render in
    /// progress arms the deadline when it finishes.
    pub fn request_rerender(&mut self, id: CallId) {
        let now = self.clock.now();
        let rendering = self.scheduler.state == SchedulerState::Rendering;
        if !rendering || self.call.mode() == CallMode::MustBeCallable {
            self.scheduler.arm(now + self.config.settle_delay);
            diag!(self, debug, site = %self.ids.label(id), "re-render requested");
        } else {
            self.scheduler.storm.tick(now);
            let requested = self.scheduler.storm.record();
            diag!(
                self,
                debug,
                site = %self.ids.label(id),
                requested,
                quota = self.scheduler.storm.quota(),
                "re-render requested while rendering"
            );
        }
        self.scheduler.pending = true;
    }

    /// Rebuilds the output from scratch by running `main`.
    ///
    /// Failures never escape: they switch the scheduler to
    /// [`SchedulerState::Error`] and show the error display.
    pub fn render(&mut self) {
        let started = self.clock.now();
        self.scheduler.state = SchedulerState::Rendering;
        self.scheduler.pending = false;
        self.scheduler.renders += 1;
        let cycle = self.scheduler.renders;

        match self.render_pass() {
            Ok(()) => {
                self.scheduler.state = SchedulerState::Idle;
                self.last_error = None;
            }
            Err(err) => self.recover(err),
        }
        if self.scheduler.pending {
            let at = self.clock.now() + self.config.settle_delay;
            self.scheduler.arm(at);
        }

        let elapsed = self.clock.now().saturating_duration_since(started);
        diag!(
            self,
            debug,
            cycle,
            elapsed_us = elapsed.as_micros() as u64,
            state = ?self.scheduler.state,
            rerender = self.scheduler.deadline.is_some(),
            "render finished"
        );
    }

    fn render_pass(&mut self) -> Result<()> {
        let mount = self.mount;
        self.surface.clear_children(mount)?;
        self.clear_error_display()?;
        self.stack.clear();
        self.frames.truncate(1);
        self.listeners.clear();
        self.focus = None;

        let root = self.root_id;
        self.invoke(root, MAIN_SECTION, CallMode::MustBeRenderable)?;

        let storm = &self.scheduler.storm;
        if !self.config.unsafe_mode && storm.exceeded() {
            let quota = storm.quota();
            self.scheduler.pending = false;
            return Err(RuntimeError::RerenderStorm { quota });
        }
        Ok(())
    }

    /// Advances the scheduler: resets the storm counter when its window has
    /// passed and runs the deferred render if it is due. Returns whether a
    /// render ran.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now();
        self.scheduler.storm.tick(now);
        if self.scheduler.take_due(now) {
            self.render();
            true
        } else {
            false
        }
    }
}
