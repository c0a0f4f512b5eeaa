//! Focus trap sentinels.
//!
//! Two focusable, content-free nodes bracket the whole document. Focus can
//! only reach one of them by leaving the interactive content at either end,
//! and when that happens focus is sent back into whichever overlay is active.
//! One shared pair serves every overlay: routing always targets the top of
//! the stack, so a newly opened overlay takes over the trap without any
//! rewiring.

use crate::config::ClassNames;
use crate::content::OverlayContent;
use crate::document::Document;
use crate::error::DocumentError;
use crate::handle::{NodeId, OverlayHandle};
use crate::notify::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelEdge {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentinels {
    pub top: NodeId,
    pub bottom: NodeId,
}

/// Where routing sent focus, and which notification it calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRoute {
    pub handle: OverlayHandle,
    pub target: Option<NodeId>,
    pub notification: Notification,
}

#[derive(Debug)]
pub struct FocusTrap {
    classes: ClassNames,
    sentinels: Option<Sentinels>,
    visible: bool,
}

impl FocusTrap {
    pub fn new(classes: ClassNames) -> Self {
        Self {
            classes,
            sentinels: None,
            visible: false,
        }
    }

    pub fn sentinels(&self) -> Option<Sentinels> {
        self.sentinels
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn edge_of(&self, node: NodeId) -> Option<SentinelEdge> {
        let sentinels = self.sentinels?;
        if node == sentinels.top {
            Some(SentinelEdge::Top)
        } else if node == sentinels.bottom {
            Some(SentinelEdge::Bottom)
        } else {
            None
        }
    }

    fn ensure<D: Document + ?Sized>(&mut self, doc: &mut D) -> Result<Sentinels, DocumentError> {
        if let Some(sentinels) = self.sentinels
            && doc.contains(sentinels.top)
            && doc.contains(sentinels.bottom)
        {
            return Ok(sentinels);
        }
        let mut make = |edge: &str| -> Result<NodeId, DocumentError> {
            let node = doc.create_element("span");
            doc.set_class(node, &self.classes.sentinel, true)?;
            doc.set_attribute(node, "data-edge", Some(edge))?;
            doc.set_focusable(node, true)?;
            doc.set_hidden(node, true)?;
            Ok(node)
        };
        let sentinels = Sentinels {
            top: make("top")?,
            bottom: make("bottom")?,
        };
        self.sentinels = Some(sentinels);
        Ok(sentinels)
    }

    /// Unhide the sentinels and move them to the very first and very last
    /// positions under the root, ahead of anything inserted since last time.
    pub fn show<D: Document + ?Sized>(&mut self, doc: &mut D) -> Result<(), DocumentError> {
        self.visible = true;
        let sentinels = self.ensure(doc)?;
        let root = doc.root();
        doc.prepend_child(root, sentinels.top)?;
        doc.append_child(root, sentinels.bottom)?;
        doc.set_hidden(sentinels.top, false)?;
        doc.set_hidden(sentinels.bottom, false)?;
        tracing::trace!("focus trap sentinels shown");
        Ok(())
    }

    pub fn hide<D: Document + ?Sized>(&mut self, doc: &mut D) -> Result<(), DocumentError> {
        self.visible = false;
        let Some(sentinels) = self.sentinels else {
            return Ok(());
        };
        doc.set_hidden(sentinels.top, true)?;
        doc.set_hidden(sentinels.bottom, true)?;
        tracing::trace!("focus trap sentinels hidden");
        Ok(())
    }
}

fn try_focus<D: Document + ?Sized>(doc: &mut D, candidates: &[Option<NodeId>]) -> Option<NodeId> {
    for node in candidates.iter().flatten() {
        match doc.focus(*node) {
            Ok(true) => return Some(*node),
            Ok(false) => {}
            Err(err) => tracing::debug!(node = %node, %err, "focus candidate rejected"),
        }
    }
    None
}

/// Focus the overlay's first focusable element, falling back to its default
/// target. Gives up quietly when neither can take focus.
pub fn focus_first<D: Document>(
    doc: &mut D,
    handle: OverlayHandle,
    content: &dyn OverlayContent,
) -> FocusRoute {
    let first = content.first_focusable(&*doc);
    let fallback = if content.has_default_focus_target() {
        content.default_focus_target()
    } else {
        None
    };
    let target = try_focus(doc, &[first, fallback]);
    if target.is_none() {
        tracing::debug!(overlay = %handle, "nothing in the overlay can take focus");
    }
    FocusRoute {
        handle,
        target,
        notification: Notification::FocusFirst,
    }
}

/// Focus the overlay's last focusable element, wrapping to the first one when
/// it has none.
pub fn focus_last<D: Document>(
    doc: &mut D,
    handle: OverlayHandle,
    content: &dyn OverlayContent,
) -> FocusRoute {
    let last = content.last_focusable(&*doc);
    if let Some(target) = try_focus(doc, &[last]) {
        return FocusRoute {
            handle,
            target: Some(target),
            notification: Notification::FocusLast,
        };
    }
    focus_first(doc, handle, content)
}

/// Route a sentinel focus to the active overlay.
pub fn route<D: Document>(
    doc: &mut D,
    edge: SentinelEdge,
    handle: OverlayHandle,
    content: &dyn OverlayContent,
) -> FocusRoute {
    match edge {
        SentinelEdge::Top => focus_first(doc, handle, content),
        SentinelEdge::Bottom => focus_last(doc, handle, content),
    }
}
