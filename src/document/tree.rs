use std::collections::{BTreeMap, BTreeSet};

use super::Document;
use crate::error::DocumentError;
use crate::handle::NodeId;

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    hidden: bool,
    focusable: bool,
    scroll_top: u16,
    z_index: Option<i32>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            classes: BTreeSet::new(),
            attributes: BTreeMap::new(),
            hidden: false,
            focusable: false,
            scroll_top: 0,
            z_index: None,
        }
    }
}

/// In-memory document: an arena of element nodes under a single root.
///
/// Nodes are never freed; a detached node keeps its id and can be inserted
/// again. Focus follows the same rules a browser applies to `tabindex`
/// elements: the node must be focusable, attached to the root, and have no
/// hidden ancestor.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: Vec<Node>,
    focused: Option<NodeId>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("body")],
            focused: None,
        }
    }

    /// Create a detached element carrying display text.
    pub fn create_text(&mut self, tag: &str, text: impl Into<String>) -> NodeId {
        let id = self.create_element(tag);
        self.nodes[id.0].text = text.into();
        id
    }

    /// Create a focusable control with a label and append it to `parent`.
    pub fn add_control(
        &mut self,
        parent: NodeId,
        label: impl Into<String>,
    ) -> Result<NodeId, DocumentError> {
        let id = self.create_text("button", label);
        self.nodes[id.0].focusable = true;
        self.append_child(parent, id)?;
        Ok(id)
    }

    fn node(&self, id: NodeId) -> Result<&Node, DocumentError> {
        self.nodes.get(id.0).ok_or(DocumentError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DocumentError> {
        self.nodes.get_mut(id.0).ok_or(DocumentError::UnknownNode(id))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|n| n.tag.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|n| n.text.as_str())
    }

    pub fn z_index(&self, id: NodeId) -> Option<i32> {
        self.nodes.get(id.0).and_then(|n| n.z_index)
    }

    pub fn scroll_top(&self, id: NodeId) -> u16 {
        self.nodes.get(id.0).map(|n| n.scroll_top).unwrap_or(0)
    }

    pub fn set_scroll_top(&mut self, id: NodeId, offset: u16) -> Result<(), DocumentError> {
        self.node_mut(id)?.scroll_top = offset;
        Ok(())
    }

    /// Clear focus without moving it anywhere, as when the window loses focus.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Attached to the root with no hidden node on the way up.
    pub fn is_rendered(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(current.0) else {
                return false;
            };
            if node.hidden {
                return false;
            }
            if current == self.root() {
                return true;
            }
            cursor = node.parent;
        }
        false
    }

    /// Pre-order walk of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.nodes.get(current.0) else {
                continue;
            };
            out.push(current);
            pending.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Focusable, rendered nodes at or below `id` in document order.
    pub fn focusable_within(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.is_focusable(*n) && self.is_rendered(*n))
            .collect()
    }

    /// Next (or previous) tab stop in document order, wrapping around the
    /// ends. Starts from the first/last stop when `from` is `None`.
    pub fn next_focusable(&self, from: Option<NodeId>, forward: bool) -> Option<NodeId> {
        let order = self.focusable_within(self.root());
        if order.is_empty() {
            return None;
        }
        let len = order.len() as isize;
        let idx = from.and_then(|f| order.iter().position(|n| *n == f));
        let next = match (idx, forward) {
            (Some(i), true) => (i as isize + 1).rem_euclid(len),
            (Some(i), false) => (i as isize - 1).rem_euclid(len),
            (None, true) => 0,
            (None, false) => len - 1,
        };
        order.get(next as usize).copied()
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for NodeTree {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), DocumentError> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.root() {
            return Err(DocumentError::RootImmovable);
        }
        if self.is_within(parent, child) {
            return Err(DocumentError::Cycle { parent, child });
        }
        self.detach(child)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let at = index.min(siblings.len());
        siblings.insert(at, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn detach(&mut self, node: NodeId) -> Result<(), DocumentError> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|c| *c != node);
        self.node_mut(node)?.parent = None;
        Ok(())
    }

    fn set_class(
        &mut self,
        node: NodeId,
        class: &str,
        enabled: bool,
    ) -> Result<(), DocumentError> {
        let classes = &mut self.node_mut(node)?.classes;
        if enabled {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
        Ok(())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|n| n.classes.contains(class))
    }

    fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), DocumentError> {
        let attributes = &mut self.node_mut(node)?.attributes;
        match value {
            Some(value) => {
                attributes.insert(name.to_string(), value.to_string());
            }
            None => {
                attributes.remove(name);
            }
        }
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes
            .get(node.0)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    fn set_hidden(&mut self, node: NodeId, hidden: bool) -> Result<(), DocumentError> {
        self.node_mut(node)?.hidden = hidden;
        Ok(())
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| n.hidden)
    }

    fn set_focusable(&mut self, node: NodeId, focusable: bool) -> Result<(), DocumentError> {
        self.node_mut(node)?.focusable = focusable;
        Ok(())
    }

    fn is_focusable(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| n.focusable)
    }

    fn focus(&mut self, node: NodeId) -> Result<bool, DocumentError> {
        if !self.node(node)?.focusable || !self.is_rendered(node) {
            return Ok(false);
        }
        self.focused = Some(node);
        Ok(true)
    }

    fn focused(&self) -> Option<NodeId> {
        // a node hidden or detached after taking focus no longer holds it
        self.focused.filter(|n| self.is_rendered(*n))
    }

    fn scroll_to_top(&mut self, node: NodeId) -> Result<(), DocumentError> {
        self.node_mut(node)?.scroll_top = 0;
        Ok(())
    }

    fn set_z_index(&mut self, node: NodeId, z: i32) -> Result<(), DocumentError> {
        self.node_mut(node)?.z_index = Some(z);
        Ok(())
    }
}
