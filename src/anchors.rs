//! Registry resolving overlay handles to their content and per-overlay state.
//!
//! Entries live in a generational arena. Removing an entry bumps its slot's
//! generation, so every handle issued for the old entry reports
//! [`OverlayError::Destroyed`] instead of resolving to whatever reuses the
//! slot later.

use std::fmt;

use crate::config::OverlayKind;
use crate::content::OverlayContent;
use crate::error::OverlayError;
use crate::handle::{NodeId, OverlayHandle};
use crate::lifecycle::Lifecycle;
use crate::notify::Observer;

pub struct OverlayEntry {
    pub content: Box<dyn OverlayContent>,
    pub kind: OverlayKind,
    pub lifecycle: Lifecycle,
    pub observer: Option<Observer>,
}

impl OverlayEntry {
    fn new(content: Box<dyn OverlayContent>, kind: OverlayKind) -> Self {
        Self {
            content,
            kind,
            lifecycle: Lifecycle::default(),
            observer: None,
        }
    }
}

impl fmt::Debug for OverlayEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayEntry")
            .field("content", &self.content)
            .field("kind", &self.kind)
            .field("state", &self.lifecycle.state())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<OverlayEntry>,
}

#[derive(Debug, Default)]
pub struct AnchorRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, content: Box<dyn OverlayContent>, kind: OverlayKind) -> OverlayHandle {
        let entry = OverlayEntry::new(content, kind);
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return OverlayHandle::new(index, slot.generation);
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        OverlayHandle::new(index, 0)
    }

    /// Resolve `handle`, distinguishing never-issued handles from stale ones.
    pub fn lookup(&self, handle: OverlayHandle) -> Result<&OverlayEntry, OverlayError> {
        let slot = self
            .slots
            .get(handle.index())
            .ok_or(OverlayError::UnknownOverlay(handle))?;
        if handle.generation() < slot.generation {
            return Err(OverlayError::Destroyed(handle));
        }
        match &slot.entry {
            Some(entry) if slot.generation == handle.generation() => Ok(entry),
            _ => Err(OverlayError::UnknownOverlay(handle)),
        }
    }

    pub fn get(&self, handle: OverlayHandle) -> Option<&OverlayEntry> {
        self.lookup(handle).ok()
    }

    pub fn get_mut(&mut self, handle: OverlayHandle) -> Option<&mut OverlayEntry> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.entry.as_mut()
    }

    pub fn contains(&self, handle: OverlayHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn content_anchor(&self, handle: OverlayHandle) -> Option<NodeId> {
        self.get(handle)?.content.content_anchor()
    }

    /// Forget the entry and retire the handle.
    pub fn remove(&mut self, handle: OverlayHandle) -> Option<OverlayEntry> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index() as u32);
        Some(entry)
    }

    pub fn handles(&self) -> Vec<OverlayHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.entry.is_some())
            .map(|(i, s)| OverlayHandle::new(i as u32, s.generation))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
