use std::rc::Rc;

use crate::runtime::{ident::CallId, section::CodeSection};

/// Role of a render frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Wrapper whose children are hoisted into the parent on close.
    Root,
    /// Owns a fresh node that is appended to the parent on close.
    Container,
    /// Shares its parent's node; never appended.
    Conditional,
}

/// Open insertion scope of the render pass.
#[derive(Debug, Clone)]
pub struct RenderFrame<N> {
    pub id: CallId,
    /// Section that was executing when the frame opened.
    pub section: Rc<CodeSection>,
    /// Node that children are appended to.
    pub target: N,
    pub kind: FrameKind,
}

impl<N> RenderFrame<N> {
    pub fn new(id: CallId, section: Rc<CodeSection>, target: N, kind: FrameKind) -> Self {
        Self {
            id,
            section,
            target,
            kind,
        }
    }
}

/// Stack of render frames. The bottom frame is bound to the surface root.
#[derive(Debug)]
pub struct RenderStack<N> {
    frames: Vec<RenderFrame<N>>,
}

impl<N> Default for RenderStack<N> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<N> RenderStack<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: RenderFrame<N>) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<RenderFrame<N>> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<&RenderFrame<N>> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drops every frame above the first `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    pub fn frames(&self) -> &[RenderFrame<N>] {
        &self.frames
    }
}
