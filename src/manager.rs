//! The overlay manager ties the stack, container, backdrop and focus trap
//! together behind the operations overlay owners call.
//!
//! One manager is constructed per document and handed to every overlay owner;
//! there is no global instance. Tests build a fresh one each.
//!
//! # Invariants
//!
//! - The backdrop and the sentinels are visible exactly when the stack is
//!   non-empty. Every mutating method restores that before returning and
//!   before any post-mutation notification is delivered.
//! - `before-*` notifications fire before the document is touched; `open`,
//!   `close` and `focus-*` fire after all bookkeeping is done.
//! - Silent closes mutate state like regular ones but deliver nothing.
//! - Failures of the document or of a callback are logged and never leave the
//!   stack half-updated.

use crate::anchors::AnchorRegistry;
use crate::config::{DetachPolicy, OverlayConfig, OverlayKind};
use crate::container::{ContainerNodes, OverlayContainer};
use crate::content::OverlayContent;
use crate::document::Document;
use crate::error::{DocumentError, OverlayError};
use crate::focus_trap::{self, FocusTrap, SentinelEdge, Sentinels};
use crate::handle::{NodeId, OverlayHandle};
use crate::lifecycle::{OverlayState, Transition};
use crate::notify::{self, Hooks, Notification, OverlayEvent};
use crate::scheduler::{Deferred, TickQueue};
use crate::stack::{OverlayRecord, OverlayStack};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The overlay was closed and is now on top of the stack.
    Opened,
    /// The overlay was already open and has been moved to the top.
    Reactivated,
}

pub struct OverlayManager<D: Document> {
    document: D,
    config: OverlayConfig,
    registry: AnchorRegistry,
    stack: OverlayStack,
    container: OverlayContainer,
    trap: FocusTrap,
    hooks: Hooks,
    ticks: TickQueue,
}

fn soft<T>(context: &'static str, result: Result<T, DocumentError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(context, error = %err, "document operation failed");
            None
        }
    }
}

impl<D: Document> OverlayManager<D> {
    pub fn new(document: D) -> Self {
        Self::with_config(document, OverlayConfig::default())
    }

    pub fn with_config(document: D, config: OverlayConfig) -> Self {
        Self {
            document,
            container: OverlayContainer::new(config.classes.clone()),
            trap: FocusTrap::new(config.classes.clone()),
            config,
            registry: AnchorRegistry::new(),
            stack: OverlayStack::new(),
            hooks: Hooks::default(),
            ticks: TickQueue::new(),
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    // --- Registration ---

    /// Register an overlay of the configured default kind.
    pub fn register<C: OverlayContent>(&mut self, content: C) -> OverlayHandle {
        let kind = self.config.default_kind;
        self.register_with(content, kind)
    }

    pub fn register_with<C: OverlayContent>(&mut self, content: C, kind: OverlayKind) -> OverlayHandle {
        let handle = self.registry.insert(Box::new(content), kind);
        tracing::debug!(overlay = %handle, ?kind, "registered overlay");
        handle
    }

    /// Install the overlay's single observer, replacing any previous one.
    pub fn set_observer<F>(&mut self, handle: OverlayHandle, observer: F) -> bool
    where
        F: FnMut(&OverlayEvent) + 'static,
    {
        match self.registry.get_mut(handle) {
            Some(entry) => {
                entry.observer = Some(Box::new(observer));
                true
            }
            None => false,
        }
    }

    /// Append a hook that sees every notification for every overlay, after
    /// previously added hooks and before the overlay's own observer.
    pub fn add_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&OverlayEvent) + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    pub fn content<T: OverlayContent>(&self, handle: OverlayHandle) -> Option<&T> {
        let entry = self.registry.get(handle)?;
        (*entry.content).as_any().downcast_ref::<T>()
    }

    pub fn content_mut<T: OverlayContent>(&mut self, handle: OverlayHandle) -> Option<&mut T> {
        let entry = self.registry.get_mut(handle)?;
        (*entry.content).as_any_mut().downcast_mut::<T>()
    }

    pub fn kind(&self, handle: OverlayHandle) -> Option<OverlayKind> {
        self.registry.get(handle).map(|e| e.kind)
    }

    // --- Queries ---

    pub fn state(&self, handle: OverlayHandle) -> Option<OverlayState> {
        match self.registry.lookup(handle) {
            Ok(entry) => Some(entry.lifecycle.state()),
            Err(OverlayError::Destroyed(_)) => Some(OverlayState::Destroyed),
            Err(_) => None,
        }
    }

    pub fn is_open(&self, handle: OverlayHandle) -> bool {
        self.registry.contains(handle) && self.stack.contains(handle)
    }

    pub fn active(&self) -> Option<OverlayHandle> {
        self.stack.active().map(|r| r.handle)
    }

    /// Open overlays, bottom first.
    pub fn open_overlays(&self) -> Vec<OverlayHandle> {
        self.stack.handles()
    }

    pub fn records(&self) -> Vec<OverlayRecord> {
        self.stack.all()
    }

    pub fn z_rank(&self, handle: OverlayHandle) -> Option<i32> {
        self.stack.rank_of(handle, self.config.base_z)
    }

    pub fn backdrop_visible(&self) -> bool {
        self.container.backdrop_visible()
    }

    pub fn sentinels_visible(&self) -> bool {
        self.trap.visible()
    }

    pub fn sentinels(&self) -> Option<Sentinels> {
        self.trap.sentinels()
    }

    pub fn container(&self) -> Option<ContainerNodes> {
        self.container.nodes()
    }

    /// The container slot hosting the overlay's content, once it has one.
    pub fn slot(&self, handle: OverlayHandle) -> Option<NodeId> {
        self.container.slot(handle)
    }

    pub fn pending_ticks(&self) -> usize {
        self.ticks.len()
    }

    // --- Lifecycle ---

    /// Open `handle`, or bring it to the top if it is already open.
    ///
    /// A first open delivers `before-open` right away; `open` and
    /// `focus-first` follow on the next [`tick`](Self::tick). Re-activation
    /// delivers neither `before-open` nor `open`. On error nothing changes.
    pub fn open(&mut self, handle: OverlayHandle) -> Result<OpenOutcome, OverlayError> {
        let entry = self.registry.lookup(handle)?;
        if self.stack.contains(handle) {
            self.reactivate(handle);
            return Ok(OpenOutcome::Reactivated);
        }
        let anchor = entry
            .content
            .content_anchor()
            .filter(|a| self.document.contains(*a))
            .ok_or(OverlayError::AnchorMissing(handle))?;
        self.container.check_attachable(&self.document, anchor)?;

        if let Some(entry) = self.registry.get_mut(handle)
            && !entry.lifecycle.advance(Transition::BeginOpen)
        {
            return Err(OverlayError::Destroyed(handle));
        }
        tracing::debug!(overlay = %handle, depth = self.stack.len() + 1, "opening overlay");
        self.notify(handle, Notification::BeforeOpen);

        let was_empty = self.stack.is_empty();
        soft(
            "attach content",
            self.container.attach(&mut self.document, handle, anchor),
        );
        soft(
            "show slot",
            self.container.set_slot_visible(&mut self.document, handle, true),
        );
        self.stack.push(OverlayRecord {
            handle,
            content_anchor: anchor,
            original_parent: self.container.original_parent(handle),
        });
        self.apply_z_order();
        if was_empty {
            self.show_chrome();
        }
        soft("scroll to top", self.document.scroll_to_top(anchor));
        self.route_focus(handle, SentinelEdge::Top, true);
        self.ticks.schedule(Deferred::Settle(handle));
        Ok(OpenOutcome::Opened)
    }

    fn reactivate(&mut self, handle: OverlayHandle) {
        if let Some(record) = self.stack.get(handle).copied() {
            self.stack.push(record);
        }
        self.apply_z_order();
        tracing::debug!(overlay = %handle, depth = self.stack.len(), "re-activated overlay");
        self.route_focus(handle, SentinelEdge::Top, false);
    }

    /// Close `handle` with notifications. Returns false when it was not open.
    pub fn close(&mut self, handle: OverlayHandle) -> bool {
        self.close_inner(handle, false)
    }

    /// Close `handle` without delivering any notification.
    pub fn close_silently(&mut self, handle: OverlayHandle) -> bool {
        self.close_inner(handle, true)
    }

    fn close_inner(&mut self, handle: OverlayHandle, silent: bool) -> bool {
        let Some(entry) = self.registry.get(handle) else {
            return false;
        };
        if !self.stack.contains(handle) {
            return false;
        }
        let policy = entry.kind.detach_policy();

        if silent {
            self.ticks.cancel_for(handle);
        } else {
            // observers get `open` before they get `before-close`
            self.flush_settle(handle);
        }
        self.transition(handle, Transition::BeginClose);
        if !silent {
            self.notify(handle, Notification::BeforeClose);
        }

        self.stack.remove(handle);
        self.apply_z_order();
        soft(
            "hide slot",
            self.container.set_slot_visible(&mut self.document, handle, false),
        );
        if policy == DetachPolicy::OnClose {
            let restore = self.config.restore_original_position;
            soft(
                "detach content",
                self.container.detach(&mut self.document, handle, restore),
            );
        }
        if self.stack.is_empty() {
            self.hide_chrome();
        }
        self.ticks.cancel_for(handle);
        self.transition(handle, Transition::FinishClose);
        tracing::debug!(overlay = %handle, silent, depth = self.stack.len(), "closed overlay");

        if !silent {
            self.notify(handle, Notification::Close);
            if let Some(next) = self.active() {
                self.route_focus(next, SentinelEdge::Top, false);
            }
        }
        true
    }

    /// Silently close everything, most recently activated first.
    pub fn close_all(&mut self) {
        let handles = self.stack.handles();
        if handles.is_empty() {
            return;
        }
        tracing::debug!(count = handles.len(), "closing all overlays");
        for handle in handles.into_iter().rev() {
            self.close_inner(handle, true);
        }
    }

    /// Tear the overlay down for good: close it silently, return its content
    /// to where it was declared, and retire the handle.
    pub fn destroy(&mut self, handle: OverlayHandle) -> bool {
        if !self.registry.contains(handle) {
            return false;
        }
        self.close_inner(handle, true);
        let restore = self.config.restore_original_position;
        soft(
            "release content",
            self.container.forget(&mut self.document, handle, restore),
        );
        self.ticks.cancel_for(handle);
        self.transition(handle, Transition::Destroy);
        self.registry.remove(handle);
        tracing::debug!(overlay = %handle, "destroyed overlay");
        true
    }

    // --- Focus ---

    /// Send focus to the overlay's first focusable element. Returns whether
    /// anything took focus.
    pub fn focus_first(&mut self, handle: OverlayHandle) -> bool {
        self.is_open(handle) && self.route_focus(handle, SentinelEdge::Top, false).is_some()
    }

    /// Send focus to the overlay's last focusable element, wrapping to the
    /// first when there is none.
    pub fn focus_last(&mut self, handle: OverlayHandle) -> bool {
        self.is_open(handle) && self.route_focus(handle, SentinelEdge::Bottom, false).is_some()
    }

    /// Report that `node` received focus. Sentinel focus is routed into the
    /// active overlay; focus inside an overlay cancels its pending blur.
    /// Returns true when focus was redirected.
    pub fn handle_focus_in(&mut self, node: NodeId) -> bool {
        self.focus_in(node, false)
    }

    /// Like [`handle_focus_in`](Self::handle_focus_in), but routing away from
    /// a sentinel delivers no notification. For hosts that put focus on a
    /// sentinel themselves, such as when restoring the focused node after
    /// re-rendering the page.
    pub fn handle_focus_in_silently(&mut self, node: NodeId) -> bool {
        self.focus_in(node, true)
    }

    fn focus_in(&mut self, node: NodeId, silent: bool) -> bool {
        if let Some(edge) = self.trap.edge_of(node) {
            let Some(active) = self.active() else {
                return false;
            };
            return self.route_focus(active, edge, silent).is_some();
        }
        if let Some(handle) = self.overlay_containing(node) {
            self.ticks.cancel(Deferred::Blur(handle));
        }
        false
    }

    /// Report that `node` lost focus. If it sits inside an open overlay, a
    /// `blur` for that overlay is queued for the next tick.
    pub fn handle_focus_out(&mut self, node: NodeId) {
        if let Some(handle) = self.overlay_containing(node) {
            self.ticks.schedule(Deferred::Blur(handle));
        }
    }

    /// Run work deferred from the previous turn of the event loop. Returns the
    /// number of tasks that delivered something.
    pub fn tick(&mut self) -> usize {
        let mut ran = 0;
        for task in self.ticks.drain() {
            match task {
                Deferred::Settle(handle) => {
                    if self.stack.contains(handle) {
                        self.settle(handle);
                        ran += 1;
                    }
                }
                Deferred::Blur(handle) => {
                    let Some(record) = self.stack.get(handle).copied() else {
                        continue;
                    };
                    let inside = self
                        .document
                        .focused()
                        .is_some_and(|f| self.document.is_within(f, record.content_anchor));
                    if !inside {
                        self.notify(handle, Notification::Blur);
                        ran += 1;
                    }
                }
            }
        }
        ran
    }

    // --- Internals ---

    fn settle(&mut self, handle: OverlayHandle) {
        let Some(entry) = self.registry.get_mut(handle) else {
            return;
        };
        if entry.lifecycle.state() != OverlayState::Opening {
            return;
        }
        entry.lifecycle.advance(Transition::Settle);
        self.notify(handle, Notification::Open);
        self.notify(handle, Notification::FocusFirst);
    }

    /// Deliver a still-queued `open` right away. Returns whether it ran.
    fn flush_settle(&mut self, handle: OverlayHandle) -> bool {
        if self.ticks.cancel(Deferred::Settle(handle)) {
            self.settle(handle);
            true
        } else {
            false
        }
    }

    fn transition(&mut self, handle: OverlayHandle, transition: Transition) {
        if let Some(entry) = self.registry.get_mut(handle) {
            entry.lifecycle.advance(transition);
        }
    }

    fn notify(&mut self, handle: OverlayHandle, notification: Notification) {
        let event = OverlayEvent {
            handle,
            notification,
            depth: self.stack.len(),
        };
        let observer = self
            .registry
            .get_mut(handle)
            .and_then(|entry| entry.observer.as_mut());
        notify::dispatch(&mut self.hooks, observer, &event);
    }

    fn route_focus(
        &mut self,
        handle: OverlayHandle,
        edge: SentinelEdge,
        silent: bool,
    ) -> Option<NodeId> {
        if !self.registry.contains(handle) {
            return None;
        }
        // an overlay still waiting for its `open` gets it before any focus
        // notification; settling already announced `focus-first`
        let settled = !silent && self.flush_settle(handle);
        let entry = self.registry.get(handle)?;
        let route = focus_trap::route(&mut self.document, edge, handle, entry.content.as_ref());
        tracing::trace!(overlay = %handle, ?edge, target = ?route.target, silent, "routed focus");
        if !silent && !(settled && route.notification == Notification::FocusFirst) {
            self.notify(handle, route.notification);
        }
        route.target
    }

    fn apply_z_order(&mut self) {
        for (record, z) in self.stack.ranks(self.config.base_z) {
            if let Some(slot) = self.container.slot(record.handle) {
                soft("set z-index", self.document.set_z_index(slot, z));
            }
        }
    }

    fn show_chrome(&mut self) {
        soft("show backdrop", self.container.show_backdrop(&mut self.document));
        soft("show sentinels", self.trap.show(&mut self.document));
    }

    fn hide_chrome(&mut self) {
        soft("hide backdrop", self.container.hide_backdrop(&mut self.document));
        soft("hide sentinels", self.trap.hide(&mut self.document));
    }

    fn overlay_containing(&self, node: NodeId) -> Option<OverlayHandle> {
        self.stack
            .all()
            .into_iter()
            .rev()
            .find(|r| self.document.is_within(node, r.content_anchor))
            .map(|r| r.handle)
    }
}
