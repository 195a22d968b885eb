//! In-memory output tree.
//!
//! Nodes live in an arena of slots. Released slots go back to a free pool and
//! are reused; every slot carries a generation so handles to a released node
//! are detected instead of silently aliasing the slot's next occupant.

use std::{collections::BTreeMap, fmt};

use crate::surface::{
    FocusValue, Surface, SurfaceError, SurfaceResult,
    markup::{self, MarkupNode},
};

/// Handle to a node of a [`VirtualTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<String>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Input types whose value is their text.
const TEXT_INPUT_TYPES: &[&str] = &[
    "button", "color", "date", "datetime-local", "email", "file", "hidden", "month", "number",
    "password", "radio", "range", "search", "submit", "tel", "text", "time", "url", "week",
];

#[derive(Debug, Clone)]
pub struct VirtualTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl Default for VirtualTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualTree {
    /// Creates a tree whose root is `<div id="root">`.
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        let mut attributes = BTreeMap::new();
        attributes.insert("id".to_string(), "root".to_string());
        tree.root = tree.alloc(NodeData::Element {
            tag: "div".to_string(),
            attributes,
        });
        tree
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn node(&self, id: NodeId) -> SurfaceResult<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or_else(|| SurfaceError::UnknownNode(id.to_string()))
    }

    fn node_mut(&mut self, id: NodeId) -> SurfaceResult<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or_else(|| SurfaceError::UnknownNode(id.to_string()))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).ok()?.data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).ok()?.data {
            NodeData::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeData::Text(_) => None,
        }
    }

    pub fn listeners(&self, id: NodeId) -> &[String] {
        self.node(id).map_or(&[][..], |node| node.listeners.as_slice())
    }

    /// First node, in document order below the root, whose attribute `name`
    /// equals `value`.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        let mut pending = vec![self.root];
        while let Some(id) = pending.pop() {
            if self.attribute(id, name) == Some(value) {
                return Some(id);
            }
            if let Ok(node) = self.node(id) {
                pending.extend(node.children.iter().rev());
            }
        }
        None
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { .. } => {
                for &child in &node.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Serializes `id` and its subtree. Attributes are written in name order.
    pub fn to_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    /// Serializes the children of `id`.
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Ok(node) = self.node(id) {
            for &child in &node.children {
                self.write_markup(child, &mut out);
            }
        }
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(&markup::escape_text(text)),
            NodeData::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&markup::escape_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if markup::is_void(tag) && node.children.is_empty() {
                    return;
                }
                for &child in &node.children {
                    self.write_markup(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    /// Sets what the user typed into an input. Checkbox inputs take
    /// `true`, `on` or `1` as checked and anything else as unchecked.
    pub fn set_input_value(&mut self, id: NodeId, value: &str) -> SurfaceResult<()> {
        if self.attribute(id, "type") == Some("checkbox") {
            let checked = matches!(value, "true" | "on" | "1");
            return self.set_checked(id, checked);
        }
        self.set_attribute(id, "value", value)
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> SurfaceResult<()> {
        if checked {
            self.set_attribute(id, "checked", "")
        } else {
            self.remove_attribute(id, "checked")
        }
    }

    fn detach(&mut self, child: NodeId) -> SurfaceResult<()> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        if let Ok(parent) = self.node_mut(parent) {
            parent.children.retain(|&c| c != child);
        }
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.node(id).ok().and_then(|node| node.parent);
        }
        false
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let Some(slot) = self.slots.get_mut(id.index as usize) else {
                continue;
            };
            if slot.generation != id.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                pending.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
    }

    fn build(&mut self, parsed: MarkupNode) -> NodeId {
        match parsed {
            MarkupNode::Text(text) => self.alloc(NodeData::Text(text)),
            MarkupNode::Element {
                tag,
                attributes,
                children,
            } => {
                let id = self.alloc(NodeData::Element {
                    tag,
                    attributes: attributes.into_iter().collect(),
                });
                for child in children {
                    let child = self.build(child);
                    if let Ok(node) = self.node_mut(child) {
                        node.parent = Some(id);
                    }
                    if let Ok(node) = self.node_mut(id) {
                        node.children.push(child);
                    }
                }
                id
            }
        }
    }
}

impl Surface for VirtualTree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn create_element(&mut self, tag: &str) -> SurfaceResult<NodeId> {
        Ok(self.alloc(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
        }))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> SurfaceResult<()> {
        if matches!(self.node(parent)?.data, NodeData::Text(_)) {
            return Err(SurfaceError::TextNode("children"));
        }
        self.node(child)?;
        if self.is_ancestor(child, parent) {
            return Err(SurfaceError::InvalidAppend {
                parent: parent.to_string(),
                child: child.to_string(),
                reason: "the child contains the parent",
            });
        }
        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn children(&self, node: NodeId) -> SurfaceResult<Vec<NodeId>> {
        Ok(self.node(node)?.children.clone())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).ok()?.parent
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> SurfaceResult<()> {
        match &mut self.node_mut(node)?.data {
            NodeData::Element { attributes, .. } => {
                attributes.insert(name.to_string(), value.to_string());
                Ok(())
            }
            NodeData::Text(_) => Err(SurfaceError::TextNode("attributes")),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> SurfaceResult<()> {
        match &mut self.node_mut(node)?.data {
            NodeData::Element { attributes, .. } => {
                attributes.remove(name);
                Ok(())
            }
            NodeData::Text(_) => Err(SurfaceError::TextNode("attributes")),
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> SurfaceResult<()> {
        if let NodeData::Text(content) = &mut self.node_mut(node)?.data {
            *content = text.to_string();
            return Ok(());
        }
        self.clear_children(node)?;
        let child = self.create_text(text);
        self.append_child(node, child)
    }

    fn parse_markup(&mut self, source: &str) -> SurfaceResult<Vec<NodeId>> {
        Ok(markup::parse(source)
            .into_iter()
            .map(|parsed| self.build(parsed))
            .collect())
    }

    fn is_text(&self, node: NodeId) -> bool {
        matches!(
            self.node(node).map(|n| &n.data),
            Ok(NodeData::Text(_))
        )
    }

    fn clear_children(&mut self, node: NodeId) -> SurfaceResult<()> {
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            self.free_subtree(child);
        }
        Ok(())
    }

    fn release(&mut self, node: NodeId) {
        if node == self.root {
            return;
        }
        if self.detach(node).is_ok() {
            self.free_subtree(node);
        }
    }

    /// Inputs yield what the user entered; any other node yields its inner
    /// markup.
    fn read_value(&self, node: NodeId) -> SurfaceResult<FocusValue> {
        if self.tag(node) != Some("input") {
            self.node(node)?;
            return Ok(FocusValue::Text(self.inner_markup(node)));
        }
        let kind = self.attribute(node, "type").unwrap_or("text");
        if kind == "checkbox" {
            return Ok(FocusValue::Toggle(self.attribute(node, "checked").is_some()));
        }
        if TEXT_INPUT_TYPES.contains(&kind) {
            let value = self.attribute(node, "value").unwrap_or_default();
            return Ok(FocusValue::Text(value.to_string()));
        }
        Err(SurfaceError::UnsupportedInput(kind.to_string()))
    }

    fn add_listener(&mut self, node: NodeId, event: &str) -> SurfaceResult<()> {
        let node = self.node_mut(node)?;
        if !node.listeners.iter().any(|e| e == event) {
            node.listeners.push(event.to_string());
        }
        Ok(())
    }
}
