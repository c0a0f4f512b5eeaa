//! Callbacks the stack needs from each overlay's content.
//!
//! The stack knows nothing about what an overlay shows. It only asks where
//! the content lives and which nodes should take focus when the focus trap
//! routes into the overlay.

use std::any::Any;
use std::fmt;

use crate::document::Document;
use crate::handle::NodeId;

/// Downcasting support for boxed content, so owners can reach their concrete
/// type through the manager.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub trait OverlayContent: AsAny + fmt::Debug {
    /// Root node of the content, or `None` while it has not been rendered.
    fn content_anchor(&self) -> Option<NodeId>;

    fn first_focusable(&self, doc: &dyn Document) -> Option<NodeId>;

    /// Target for focus arriving from the bottom sentinel. Defaults to the
    /// explicit close affordance.
    fn last_focusable(&self, _doc: &dyn Document) -> Option<NodeId> {
        self.default_focus_target()
    }

    /// Fallback focus target, typically the close button.
    fn default_focus_target(&self) -> Option<NodeId> {
        None
    }

    /// Whether the fallback target may take focus when the first focusable
    /// element cannot. Content reports false to give up instead, for example
    /// while its close button is disabled.
    fn has_default_focus_target(&self) -> bool {
        self.default_focus_target().is_some()
    }
}

/// Focusable nodes at or below `root` in document order, skipping anything
/// inside a hidden subtree of `root`.
pub fn tab_order(doc: &dyn Document, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if doc.is_hidden(node) {
            continue;
        }
        if doc.is_focusable(node) {
            out.push(node);
        }
        pending.extend(doc.children(node).into_iter().rev());
    }
    out
}

/// Stock content: tab order is derived from the document, the close button is
/// named explicitly.
#[derive(Debug, Clone, Default)]
pub struct FocusableContent {
    anchor: Option<NodeId>,
    close_button: Option<NodeId>,
}

impl FocusableContent {
    pub fn new(anchor: NodeId) -> Self {
        Self {
            anchor: Some(anchor),
            close_button: None,
        }
    }

    /// Content whose anchor has not been rendered yet.
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn with_close_button(mut self, close: NodeId) -> Self {
        self.close_button = Some(close);
        self
    }

    pub fn set_anchor(&mut self, anchor: Option<NodeId>) {
        self.anchor = anchor;
    }

    pub fn set_close_button(&mut self, close: Option<NodeId>) {
        self.close_button = close;
    }
}

impl OverlayContent for FocusableContent {
    fn content_anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    fn first_focusable(&self, doc: &dyn Document) -> Option<NodeId> {
        tab_order(doc, self.anchor?).into_iter().next()
    }

    fn default_focus_target(&self) -> Option<NodeId> {
        self.close_button
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeTree;

    #[test]
    fn first_focusable_skips_hidden_branches() {
        let mut doc = NodeTree::new();
        let root = doc.root();
        let dialog = doc.create_element("div");
        doc.append_child(root, dialog).unwrap();
        let hidden = doc.create_element("div");
        doc.append_child(dialog, hidden).unwrap();
        doc.add_control(hidden, "secret").unwrap();
        doc.set_hidden(hidden, true).unwrap();
        let name = doc.add_control(dialog, "name").unwrap();
        let close = doc.add_control(dialog, "x").unwrap();

        let content = FocusableContent::new(dialog).with_close_button(close);
        assert_eq!(content.first_focusable(&doc), Some(name));
        assert_eq!(content.last_focusable(&doc), Some(close));
        assert!(content.has_default_focus_target());
        assert_eq!(tab_order(&doc, dialog), vec![name, close]);
    }

    #[test]
    fn pending_content_has_no_targets() {
        let doc = NodeTree::new();
        let content = FocusableContent::pending();
        assert_eq!(content.content_anchor(), None);
        assert_eq!(content.first_focusable(&doc), None);
        assert!(!content.has_default_focus_target());
    }

    #[test]
    fn boxed_content_downcasts_to_concrete_type() {
        let mut boxed: Box<dyn OverlayContent> = Box::new(FocusableContent::pending());
        let concrete = (*boxed).as_any_mut().downcast_mut::<FocusableContent>();
        assert!(concrete.is_some());
    }
}
