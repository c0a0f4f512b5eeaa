//! Primitive document operations the overlay stack relies on.
//!
//! The stack never owns markup. Whatever hosts it (a browser binding, a
//! retained-mode UI tree, the in-memory [`NodeTree`]) implements this trait
//! and the manager drives it through these primitives only.

pub mod tree;

pub use tree::NodeTree;

use crate::error::DocumentError;
use crate::handle::NodeId;

pub trait Document {
    fn root(&self) -> NodeId;

    fn create_element(&mut self, tag: &str) -> NodeId;

    fn contains(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Move `child` under `parent` at `index`, detaching it from its current
    /// parent first. Indices past the end append.
    fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), DocumentError>;

    /// Remove `node` from its parent. Detached nodes stay valid and can be
    /// inserted again.
    fn detach(&mut self, node: NodeId) -> Result<(), DocumentError>;

    fn set_class(&mut self, node: NodeId, class: &str, enabled: bool)
    -> Result<(), DocumentError>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), DocumentError>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_hidden(&mut self, node: NodeId, hidden: bool) -> Result<(), DocumentError>;

    fn is_hidden(&self, node: NodeId) -> bool;

    fn set_focusable(&mut self, node: NodeId, focusable: bool) -> Result<(), DocumentError>;

    fn is_focusable(&self, node: NodeId) -> bool;

    /// Move keyboard focus to `node`. Returns `Ok(false)` when the node exists
    /// but cannot take focus right now (not focusable, hidden, or detached).
    fn focus(&mut self, node: NodeId) -> Result<bool, DocumentError>;

    fn focused(&self) -> Option<NodeId>;

    fn scroll_to_top(&mut self, node: NodeId) -> Result<(), DocumentError>;

    fn set_z_index(&mut self, node: NodeId, z: i32) -> Result<(), DocumentError>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.insert_child(parent, usize::MAX, child)
    }

    fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError> {
        self.insert_child(parent, 0, child)
    }

    fn child_index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|c| *c == node)
    }

    /// True when `node` is `ancestor` or lives somewhere below it.
    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }
}
