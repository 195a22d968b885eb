//! Output surfaces: the node tree a running program renders into.

use std::fmt;

use thiserror::Error;

pub mod markup;
pub mod vtree;

pub use vtree::{NodeId, VirtualTree};

/// Attribute the runtime tags every emitted node with.
pub const XID_ATTRIBUTE: &str = "x-id";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("node {0} does not exist")]
    UnknownNode(String),

    #[error("cannot append node {child} to {parent}: {reason}")]
    InvalidAppend {
        parent: String,
        child: String,
        reason: &'static str,
    },

    #[error("text nodes cannot have {0}")]
    TextNode(&'static str),

    #[error("unsupported input type `{0}`")]
    UnsupportedInput(String),
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Value read from a focused node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusValue {
    Text(String),
    /// State of a toggle control such as a checkbox.
    Toggle(bool),
}

/// Tree of element and text nodes that a runtime renders into.
///
/// Handles are small copyable values. Created nodes start detached; a node
/// becomes visible once it is appended under [`Surface::root`].
pub trait Surface {
    type Node: Copy + Eq + fmt::Debug;

    fn root(&self) -> Self::Node;

    fn create_element(&mut self, tag: &str) -> SurfaceResult<Self::Node>;

    /// Appends `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> SurfaceResult<()>;

    fn children(&self, node: Self::Node) -> SurfaceResult<Vec<Self::Node>>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str) -> SurfaceResult<()>;

    fn remove_attribute(&mut self, node: Self::Node, name: &str) -> SurfaceResult<()>;

    /// Replaces the content of `node` with a single text child.
    fn set_text(&mut self, node: Self::Node, text: &str) -> SurfaceResult<()>;

    /// Parses markup into detached top-level nodes.
    fn parse_markup(&mut self, markup: &str) -> SurfaceResult<Vec<Self::Node>>;

    fn is_text(&self, node: Self::Node) -> bool;

    /// Removes and releases every child of `node`.
    fn clear_children(&mut self, node: Self::Node) -> SurfaceResult<()>;

    /// Releases a detached node and its subtree. Handles to released nodes
    /// become invalid.
    fn release(&mut self, node: Self::Node);

    /// Reads the user-visible value of `node`.
    fn read_value(&self, node: Self::Node) -> SurfaceResult<FocusValue>;

    /// Registers interest in `event` on `node`.
    fn add_listener(&mut self, node: Self::Node, event: &str) -> SurfaceResult<()>;
}
