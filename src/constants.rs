//! Shared crate-wide constants.

/// Base stacking rank for overlays. The active overlay sits one above it and
/// every overlay beneath is demoted below it by its distance from the top.
pub const BASE_Z: i32 = 1000;

/// Class on the shared container appended to the document root.
pub const CONTAINER_CLASS: &str = "overlay-container";

/// Class on the container's content area holding one slot per overlay.
pub const CONTENT_CLASS: &str = "overlay-content";

/// Class on the shared dimming element.
pub const BACKDROP_CLASS: &str = "overlay-backdrop";

/// Class on the per-overlay wrapper that receives the overlay's z-index.
pub const SLOT_CLASS: &str = "overlay-slot";

/// Class on both focus trap sentinels.
pub const SENTINEL_CLASS: &str = "overlay-sentinel";

/// Class toggled on the backdrop while any overlay is open.
pub const VISIBLE_CLASS: &str = "visible";

/// Attribute on each slot naming the overlay it hosts.
pub const SLOT_OWNER_ATTR: &str = "data-overlay";
