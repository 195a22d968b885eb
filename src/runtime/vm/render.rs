use crate::{
    bytecode::{CallMode, ContainerTag},
    runtime::{
        error::{Result, RuntimeError},
        frame::{FrameKind, RenderFrame},
        ident::CallId,
        value::StackValue,
    },
    surface::{Surface, XID_ATTRIBUTE},
};

use super::Runtime;

impl<S: Surface> Runtime<S> {
    /// Opens a container, runs `body` inside it and attaches the result to
    /// the enclosing frame.
    ///
    /// Outside renderable code this only runs `body`. A container tagged
    /// [`ContainerTag::Root`] is a wrapper: its children are moved into the
    /// enclosing node and the wrapper itself is dropped.
    pub fn enter_container(
        &mut self,
        id: CallId,
        tag: &ContainerTag,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let section = self.call.section().clone();
        if !section.renderable || self.call.mode() == CallMode::MustBeCallable {
            return body(self);
        }

        let node = self.surface.create_element(tag.element())?;
        let xid = format!("container-{}", self.ids.label(id));
        self.surface.set_attribute(node, XID_ATTRIBUTE, &xid)?;
        let kind = match tag {
            ContainerTag::Root => FrameKind::Root,
            ContainerTag::Default | ContainerTag::Named(_) => FrameKind::Container,
        };
        diag!(self, debug, site = %xid, tag = tag.element(), depth = self.frames.depth(), "open container");

        self.frames.push(RenderFrame::new(id, section, node, kind));
        let saved_focus = self.focus.replace(node);
        let result = body(self);
        self.focus = saved_focus;
        self.frames.pop();
        if let Err(err) = result {
            self.surface.release(node);
            return Err(err);
        }

        let parent = self.insertion_point()?;
        match kind {
            FrameKind::Root => {
                for child in self.surface.children(node)? {
                    self.surface.append_child(parent, child)?;
                }
                self.surface.release(node);
            }
            FrameKind::Container | FrameKind::Conditional => {
                self.surface.append_child(parent, node)?;
            }
        }
        Ok(())
    }

    /// Pops the branch condition and runs `body` only if it is the number 1.
    pub fn enter_conditional(
        &mut self,
        id: CallId,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let condition = self.pop(id)?;
        let taken = condition.is_true();
        diag!(self, trace, site = %self.ids.label(id), %condition, taken, "conditional");
        if !taken {
            return Ok(());
        }

        let target = self.insertion_point()?;
        let section = self.call.section().clone();
        self.frames.push(RenderFrame::new(
            id,
            section,
            target,
            FrameKind::Conditional,
        ));
        let result = body(self);
        self.frames.pop();
        result
    }

    /// Appends a childless element to the current frame's node.
    pub fn emit_leaf(&mut self, id: CallId, tag: &str) -> Result<()> {
        let parent = self.insertion_point()?;
        let node = self.surface.create_element(tag)?;
        let xid = format!("elem-{}", self.ids.label(id));
        self.surface.set_attribute(node, XID_ATTRIBUTE, &xid)?;
        self.surface.append_child(parent, node)?;
        Ok(())
    }

    /// Appends `content` as text, or as parsed markup when `raw_markup` is set
    /// and the markup contains more than a single text node.
    pub fn emit_value(
        &mut self,
        id: CallId,
        raw_markup: bool,
        content: Option<StackValue>,
    ) -> Result<()> {
        let Some(content) = content else {
            return Ok(());
        };
        let parent = self.insertion_point()?;
        let text = content.to_text();
        let xid = format!("rawValue-{}", self.ids.label(id));

        if raw_markup {
            let nodes = self.surface.parse_markup(&text)?;
            let plain = match nodes.as_slice() {
                [] => true,
                [only] => self.surface.is_text(*only),
                _ => false,
            };
            if !plain {
                for node in nodes {
                    if !self.surface.is_text(node) {
                        self.surface.set_attribute(node, XID_ATTRIBUTE, &xid)?;
                    }
                    self.surface.append_child(parent, node)?;
                }
                return Ok(());
            }
            for node in nodes {
                self.surface.release(node);
            }
        }

        let span = self.surface.create_element("span")?;
        self.surface.set_text(span, &text)?;
        self.surface.set_attribute(span, XID_ATTRIBUTE, &xid)?;
        self.surface.append_child(parent, span)?;
        Ok(())
    }

    pub(super) fn insertion_point(&self) -> Result<S::Node> {
        self.frames
            .top()
            .map(|frame| frame.target)
            .ok_or(RuntimeError::NoRenderFrame)
    }
}
