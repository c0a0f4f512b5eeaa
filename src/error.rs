//! Error types for document primitives and overlay operations.
//!
//! None of these reach the end user. Overlay operations that fail simply have
//! no effect; the error only tells the caller (and the log) why.

use thiserror::Error;

use crate::handle::{NodeId, OverlayHandle};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("cannot move {child} under {parent}: {parent} is inside {child}")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("the document root cannot be moved")]
    RootImmovable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("{0} is not registered")]
    UnknownOverlay(OverlayHandle),
    #[error("{0} has been destroyed")]
    Destroyed(OverlayHandle),
    #[error("{0} has no rendered content anchor")]
    AnchorMissing(OverlayHandle),
    #[error("document operation failed: {0}")]
    Document(#[from] DocumentError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_errors_convert_into_overlay_errors() {
        let err: OverlayError = DocumentError::UnknownNode(NodeId(7)).into();
        assert_eq!(err.to_string(), "document operation failed: unknown node node#7");
    }
}
