//! Opaque identifiers used across the overlay stack.
//!
//! `OverlayHandle` is an arena index paired with a generation counter. The
//! registry bumps the generation whenever a slot is reused, so a handle held
//! past `destroy` never resolves to a newer overlay living in the same slot.

use std::fmt;

/// Stable identifier for one overlay instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayHandle {
    index: u32,
    generation: u32,
}

impl OverlayHandle {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) const fn index(self) -> usize {
        self.index as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for OverlayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay#{}.{}", self.index, self.generation)
    }
}

/// Reference to a node owned by a [`Document`](crate::document::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index, mostly useful for logging.
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_compare_by_index_and_generation() {
        let a = OverlayHandle::new(3, 0);
        let b = OverlayHandle::new(3, 1);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
        assert_eq!(b.to_string(), "overlay#3.1");
    }
}
