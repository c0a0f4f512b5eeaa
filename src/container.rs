//! Shared overlay container and backdrop.
//!
//! All overlay content is moved into one container appended to the document
//! root, so every overlay shares a single stacking context no matter where
//! its content was declared. Each overlay gets its own slot under the
//! container's content area; the slot carries the overlay's z-index and is
//! reused across open/close cycles until the overlay is destroyed.

use std::collections::BTreeMap;

use crate::config::ClassNames;
use crate::constants::SLOT_OWNER_ATTR;
use crate::document::Document;
use crate::error::DocumentError;
use crate::handle::{NodeId, OverlayHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerNodes {
    pub root: NodeId,
    pub content: NodeId,
    pub backdrop: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Attachment {
    content: NodeId,
    original_parent: Option<NodeId>,
    original_index: Option<usize>,
}

#[derive(Debug)]
pub struct OverlayContainer {
    classes: ClassNames,
    nodes: Option<ContainerNodes>,
    slots: BTreeMap<OverlayHandle, NodeId>,
    attachments: BTreeMap<OverlayHandle, Attachment>,
    backdrop_visible: bool,
}

impl OverlayContainer {
    pub fn new(classes: ClassNames) -> Self {
        Self {
            classes,
            nodes: None,
            slots: BTreeMap::new(),
            attachments: BTreeMap::new(),
            backdrop_visible: false,
        }
    }

    pub fn nodes(&self) -> Option<ContainerNodes> {
        self.nodes
    }

    /// The shared container, created and appended to the root on first use.
    pub fn ensure_container<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
    ) -> Result<ContainerNodes, DocumentError> {
        if let Some(nodes) = self.nodes
            && doc.contains(nodes.root)
        {
            if doc.parent(nodes.root).is_none() {
                let doc_root = doc.root();
                doc.append_child(doc_root, nodes.root)?;
            }
            return Ok(nodes);
        }
        let root = doc.create_element("div");
        doc.set_class(root, &self.classes.container, true)?;
        let backdrop = doc.create_element("div");
        doc.set_class(backdrop, &self.classes.backdrop, true)?;
        let content = doc.create_element("div");
        doc.set_class(content, &self.classes.content, true)?;
        doc.append_child(root, backdrop)?;
        doc.append_child(root, content)?;
        let doc_root = doc.root();
        doc.append_child(doc_root, root)?;
        let nodes = ContainerNodes {
            root,
            content,
            backdrop,
        };
        tracing::debug!(container = %root, "created overlay container");
        self.nodes = Some(nodes);
        Ok(nodes)
    }

    /// Whether `content` may be moved into the container at all.
    pub fn check_attachable<D: Document + ?Sized>(
        &self,
        doc: &D,
        content: NodeId,
    ) -> Result<(), DocumentError> {
        if !doc.contains(content) {
            return Err(DocumentError::UnknownNode(content));
        }
        if content == doc.root() {
            return Err(DocumentError::RootImmovable);
        }
        if let Some(nodes) = self.nodes
            && doc.is_within(nodes.root, content)
        {
            return Err(DocumentError::Cycle {
                parent: nodes.content,
                child: content,
            });
        }
        Ok(())
    }

    fn ensure_slot<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        handle: OverlayHandle,
    ) -> Result<NodeId, DocumentError> {
        let nodes = self.ensure_container(doc)?;
        let slot = match self.slots.get(&handle) {
            Some(slot) if doc.contains(*slot) => *slot,
            _ => {
                let slot = doc.create_element("div");
                doc.set_class(slot, &self.classes.slot, true)?;
                doc.set_attribute(slot, SLOT_OWNER_ATTR, Some(handle.to_string().as_str()))?;
                self.slots.insert(handle, slot);
                slot
            }
        };
        if doc.parent(slot) != Some(nodes.content) {
            doc.append_child(nodes.content, slot)?;
        }
        Ok(slot)
    }

    /// Move `content` into the overlay's slot, remembering where it came
    /// from. Returns false when it was already attached.
    pub fn attach<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        handle: OverlayHandle,
        content: NodeId,
    ) -> Result<bool, DocumentError> {
        let slot = self.ensure_slot(doc, handle)?;
        if let Some(existing) = self.attachments.get(&handle).copied() {
            if existing.content == content && doc.parent(content) == Some(slot) {
                return Ok(false);
            }
            if existing.content == content {
                // moved out from under us; put it back but keep the original origin
                doc.append_child(slot, content)?;
                return Ok(true);
            }
            self.restore(doc, existing, true)?;
        }
        let attachment = Attachment {
            content,
            original_parent: doc.parent(content),
            original_index: doc.child_index(content),
        };
        doc.append_child(slot, content)?;
        self.attachments.insert(handle, attachment);
        tracing::trace!(overlay = %handle, content = %content, "attached overlay content");
        Ok(true)
    }

    /// Put the overlay's content back under its original parent. Returns
    /// false when nothing was attached.
    pub fn detach<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        handle: OverlayHandle,
        restore_position: bool,
    ) -> Result<bool, DocumentError> {
        let Some(attachment) = self.attachments.remove(&handle) else {
            return Ok(false);
        };
        self.restore(doc, attachment, restore_position)?;
        tracing::trace!(overlay = %handle, "detached overlay content");
        Ok(true)
    }

    fn restore<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        attachment: Attachment,
        restore_position: bool,
    ) -> Result<(), DocumentError> {
        match attachment.original_parent {
            Some(parent) if doc.contains(parent) => {
                let index = if restore_position {
                    attachment.original_index.unwrap_or(usize::MAX)
                } else {
                    usize::MAX
                };
                doc.insert_child(parent, index, attachment.content)
            }
            // content was never in the tree; leave it detached as we found it
            _ => doc.detach(attachment.content),
        }
    }

    /// Detach content and drop the overlay's slot for good.
    pub fn forget<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        handle: OverlayHandle,
        restore_position: bool,
    ) -> Result<(), DocumentError> {
        let detached = self.detach(doc, handle, restore_position);
        if let Some(slot) = self.slots.remove(&handle)
            && doc.contains(slot)
        {
            doc.detach(slot)?;
        }
        detached.map(|_| ())
    }

    pub fn slot(&self, handle: OverlayHandle) -> Option<NodeId> {
        self.slots.get(&handle).copied()
    }

    pub fn is_attached(&self, handle: OverlayHandle) -> bool {
        self.attachments.contains_key(&handle)
    }

    pub fn original_parent(&self, handle: OverlayHandle) -> Option<NodeId> {
        self.attachments.get(&handle)?.original_parent
    }

    pub fn set_slot_visible<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        handle: OverlayHandle,
        visible: bool,
    ) -> Result<(), DocumentError> {
        match self.slots.get(&handle) {
            Some(slot) => doc.set_hidden(*slot, !visible),
            None => Ok(()),
        }
    }

    pub fn show_backdrop<D: Document + ?Sized>(&mut self, doc: &mut D) -> Result<(), DocumentError> {
        self.set_backdrop(doc, true)
    }

    pub fn hide_backdrop<D: Document + ?Sized>(&mut self, doc: &mut D) -> Result<(), DocumentError> {
        self.set_backdrop(doc, false)
    }

    fn set_backdrop<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        visible: bool,
    ) -> Result<(), DocumentError> {
        // the flag tracks the stack even if the document write fails
        self.backdrop_visible = visible;
        let nodes = self.ensure_container(doc)?;
        doc.set_class(nodes.backdrop, &self.classes.visible, visible)
    }

    pub fn backdrop_visible(&self) -> bool {
        self.backdrop_visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeTree;

    fn setup() -> (NodeTree, OverlayContainer, NodeId, NodeId) {
        let mut doc = NodeTree::new();
        let root = doc.root();
        let page = doc.create_element("main");
        doc.append_child(root, page).unwrap();
        let before = doc.create_text("p", "before");
        doc.append_child(page, before).unwrap();
        let dialog = doc.create_element("section");
        doc.append_child(page, dialog).unwrap();
        let after = doc.create_text("p", "after");
        doc.append_child(page, after).unwrap();
        (doc, OverlayContainer::new(ClassNames::default()), page, dialog)
    }

    #[test]
    fn ensure_container_is_idempotent() {
        let (mut doc, mut container, _, _) = setup();
        let first = container.ensure_container(&mut doc).unwrap();
        let second = container.ensure_container(&mut doc).unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.parent(first.root), Some(doc.root()));
        assert_eq!(doc.children(first.root), vec![first.backdrop, first.content]);
        assert!(doc.has_class(first.root, "overlay-container"));
    }

    #[test]
    fn attach_then_detach_restores_original_position() {
        let (mut doc, mut container, page, dialog) = setup();
        let h = OverlayHandle::new(0, 0);
        assert!(container.attach(&mut doc, h, dialog).unwrap());
        let slot = container.slot(h).unwrap();
        assert_eq!(doc.parent(dialog), Some(slot));
        assert_eq!(container.original_parent(h), Some(page));

        // second attach is a no-op
        assert!(!container.attach(&mut doc, h, dialog).unwrap());

        assert!(container.detach(&mut doc, h, true).unwrap());
        assert_eq!(doc.parent(dialog), Some(page));
        assert_eq!(doc.child_index(dialog), Some(1));
        assert!(!container.detach(&mut doc, h, true).unwrap());
    }

    #[test]
    fn detach_without_position_appends() {
        let (mut doc, mut container, page, dialog) = setup();
        let h = OverlayHandle::new(0, 0);
        container.attach(&mut doc, h, dialog).unwrap();
        container.detach(&mut doc, h, false).unwrap();
        assert_eq!(doc.children(page).last(), Some(&dialog));
    }

    #[test]
    fn attachable_check_rejects_root() {
        let (doc, container, _, dialog) = setup();
        assert_eq!(
            container.check_attachable(&doc, doc.root()),
            Err(DocumentError::RootImmovable)
        );
        assert!(container.check_attachable(&doc, dialog).is_ok());
    }

    #[test]
    fn backdrop_toggles_visible_class() {
        let (mut doc, mut container, _, _) = setup();
        container.show_backdrop(&mut doc).unwrap();
        let nodes = container.nodes().unwrap();
        assert!(container.backdrop_visible());
        assert!(doc.has_class(nodes.backdrop, "visible"));
        container.hide_backdrop(&mut doc).unwrap();
        assert!(!doc.has_class(nodes.backdrop, "visible"));
    }

    #[test]
    fn forget_removes_slot() {
        let (mut doc, mut container, page, dialog) = setup();
        let h = OverlayHandle::new(0, 0);
        container.attach(&mut doc, h, dialog).unwrap();
        let slot = container.slot(h).unwrap();
        container.forget(&mut doc, h, true).unwrap();
        assert_eq!(container.slot(h), None);
        assert_eq!(doc.parent(slot), None);
        assert_eq!(doc.parent(dialog), Some(page));
    }
}
