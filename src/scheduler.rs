//! One-tick deferral queue.
//!
//! The host drains the queue once per turn of its event loop via
//! [`OverlayManager::tick`](crate::manager::OverlayManager::tick). Work
//! scheduled while a tick is being processed waits for the following tick.

use std::collections::VecDeque;

use crate::handle::OverlayHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Deliver `open` then `focus-first` for a first-open.
    Settle(OverlayHandle),
    /// Deliver `blur` unless focus came back inside the overlay first.
    Blur(OverlayHandle),
}

impl Deferred {
    pub fn handle(self) -> OverlayHandle {
        match self {
            Deferred::Settle(h) | Deferred::Blur(h) => h,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TickQueue {
    pending: VecDeque<Deferred>,
}

impl TickQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for the next tick. Scheduling the same task twice keeps a
    /// single entry.
    pub fn schedule(&mut self, task: Deferred) {
        if !self.pending.contains(&task) {
            self.pending.push_back(task);
        }
    }

    /// Remove `task` if queued; returns whether it was.
    pub fn cancel(&mut self, task: Deferred) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| *t != task);
        self.pending.len() != before
    }

    /// Drop everything queued for `handle`.
    pub fn cancel_for(&mut self, handle: OverlayHandle) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| t.handle() != handle);
        before - self.pending.len()
    }

    pub fn is_scheduled(&self, task: Deferred) -> bool {
        self.pending.contains(&task)
    }

    /// Everything due this tick, oldest first.
    pub fn drain(&mut self) -> Vec<Deferred> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_dedupes_and_drains_in_order() {
        let a = OverlayHandle::new(0, 0);
        let b = OverlayHandle::new(1, 0);
        let mut q = TickQueue::new();
        q.schedule(Deferred::Settle(a));
        q.schedule(Deferred::Blur(b));
        q.schedule(Deferred::Settle(a));
        assert_eq!(q.len(), 2);
        assert_eq!(q.drain(), vec![Deferred::Settle(a), Deferred::Blur(b)]);
        assert!(q.is_empty());
    }

    #[test]
    fn cancel_removes_single_task_or_all_for_handle() {
        let a = OverlayHandle::new(0, 0);
        let mut q = TickQueue::new();
        q.schedule(Deferred::Settle(a));
        q.schedule(Deferred::Blur(a));
        assert!(q.cancel(Deferred::Blur(a)));
        assert!(!q.cancel(Deferred::Blur(a)));
        assert!(q.is_scheduled(Deferred::Settle(a)));
        assert_eq!(q.cancel_for(a), 1);
        assert!(q.is_empty());
    }
}
