//! A shared stack for modal surfaces.
//!
//! Overlays (dialogs, modals) register with one [`OverlayManager`] per
//! document. The manager keeps them in activation order, assigns z-ranks so
//! the most recent one is on top, shows a single backdrop while anything is
//! open, and keeps keyboard focus inside the active overlay with a pair of
//! focus-trap sentinels at the edges of the document.
//!
//! ```
//! use overlay_stack::{Document, FocusableContent, NodeTree, OverlayManager};
//!
//! let mut doc = NodeTree::new();
//! let root = doc.root();
//! let dialog = doc.create_element("section");
//! doc.append_child(root, dialog).unwrap();
//! let ok = doc.add_control(dialog, "OK").unwrap();
//!
//! let mut overlays = OverlayManager::new(doc);
//! let handle = overlays.register(FocusableContent::new(dialog));
//! overlays.open(handle).unwrap();
//! assert_eq!(overlays.document().focused(), Some(ok));
//! assert!(overlays.backdrop_visible());
//!
//! overlays.close(handle);
//! assert!(!overlays.backdrop_visible());
//! ```

pub mod anchors;
pub mod config;
pub mod constants;
pub mod container;
pub mod content;
pub mod document;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod focus_trap;
pub mod handle;
pub mod lifecycle;
pub mod log_buffer;
pub mod manager;
pub mod notify;
pub mod scheduler;
pub mod stack;
pub mod tracing_sub;
pub mod ui;

pub use config::{ClassNames, DetachPolicy, OverlayConfig, OverlayKind};
pub use content::{FocusableContent, OverlayContent};
pub use document::{Document, NodeTree};
pub use error::{DocumentError, OverlayError};
pub use handle::{NodeId, OverlayHandle};
pub use lifecycle::OverlayState;
pub use manager::{OpenOutcome, OverlayManager};
pub use notify::{EventLog, Notification, OverlayEvent};
