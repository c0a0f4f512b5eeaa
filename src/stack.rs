//! LIFO stack of open overlays.
//!
//! # Invariants
//!
//! - A handle appears at most once.
//! - The last record is the active overlay. Re-pushing a handle that is
//!   already open moves it to the end, so order reflects most recent
//!   activation rather than most recent open.
//! - Ranks are derived from position on demand and never stored.

use crate::handle::{NodeId, OverlayHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayRecord {
    pub handle: OverlayHandle,
    pub content_anchor: NodeId,
    pub original_parent: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayStack {
    records: Vec<OverlayRecord>,
}

impl OverlayStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record`, removing any earlier entry for the same handle first.
    pub fn push(&mut self, record: OverlayRecord) {
        self.remove(record.handle);
        self.records.push(record);
    }

    /// Returns whether the handle was present.
    pub fn remove(&mut self, handle: OverlayHandle) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.handle != handle);
        self.records.len() != before
    }

    pub fn active(&self) -> Option<&OverlayRecord> {
        self.records.last()
    }

    pub fn index_of(&self, handle: OverlayHandle) -> Option<usize> {
        self.records.iter().position(|r| r.handle == handle)
    }

    pub fn contains(&self, handle: OverlayHandle) -> bool {
        self.index_of(handle).is_some()
    }

    pub fn get(&self, handle: OverlayHandle) -> Option<&OverlayRecord> {
        self.records.iter().find(|r| r.handle == handle)
    }

    /// Snapshot of the stack, bottom first.
    pub fn all(&self) -> Vec<OverlayRecord> {
        self.records.clone()
    }

    pub fn handles(&self) -> Vec<OverlayHandle> {
        self.records.iter().map(|r| r.handle).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rank of the overlay at `index`: the top gets `base_z + 1`, everything
    /// below gets `base_z` minus its distance from the top.
    pub fn rank_at(&self, index: usize, base_z: i32) -> Option<i32> {
        let top = self.records.len().checked_sub(1)?;
        if index > top {
            return None;
        }
        if index == top {
            return Some(base_z.saturating_add(1));
        }
        let distance = i32::try_from(top - index).unwrap_or(i32::MAX);
        Some(base_z.saturating_sub(distance))
    }

    pub fn rank_of(&self, handle: OverlayHandle, base_z: i32) -> Option<i32> {
        self.rank_at(self.index_of(handle)?, base_z)
    }

    /// Ranks for every open overlay in stack order.
    pub fn ranks(&self, base_z: i32) -> Vec<(OverlayRecord, i32)> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| self.rank_at(i, base_z).map(|z| (*r, z)))
            .collect()
    }
}
