use crate::constants::{
    BACKDROP_CLASS, BASE_Z, CONTAINER_CLASS, CONTENT_CLASS, SENTINEL_CLASS, SLOT_CLASS,
    VISIBLE_CLASS,
};

/// When an overlay's content goes back to where it was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachPolicy {
    /// Restore the content to its original parent on every close.
    OnClose,
    /// Keep the content in the shared container (hidden) until destroyed.
    OnDestroy,
}

/// The two overlay variants differ only in their detach policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayKind {
    #[default]
    Dialog,
    Modal,
}

impl OverlayKind {
    pub const fn detach_policy(self) -> DetachPolicy {
        match self {
            OverlayKind::Dialog => DetachPolicy::OnClose,
            OverlayKind::Modal => DetachPolicy::OnDestroy,
        }
    }
}

/// Class names used when building the shared container and sentinels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames {
    pub container: String,
    pub content: String,
    pub backdrop: String,
    pub slot: String,
    pub sentinel: String,
    pub visible: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            container: CONTAINER_CLASS.to_string(),
            content: CONTENT_CLASS.to_string(),
            backdrop: BACKDROP_CLASS.to_string(),
            slot: SLOT_CLASS.to_string(),
            sentinel: SENTINEL_CLASS.to_string(),
            visible: VISIBLE_CLASS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayConfig {
    pub base_z: i32,
    pub default_kind: OverlayKind,
    pub classes: ClassNames,
    /// Put restored content back at its original child index rather than
    /// appending it to the original parent.
    pub restore_original_position: bool,
}

impl OverlayConfig {
    pub fn new() -> Self {
        Self {
            base_z: BASE_Z,
            default_kind: OverlayKind::Dialog,
            classes: ClassNames::default(),
            restore_original_position: true,
        }
    }

    pub fn with_base_z(mut self, base_z: i32) -> Self {
        self.base_z = base_z;
        self
    }

    pub fn with_default_kind(mut self, kind: OverlayKind) -> Self {
        self.default_kind = kind;
        self
    }

    pub fn with_classes(mut self, classes: ClassNames) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_restore_original_position(mut self, restore: bool) -> Self {
        self.restore_original_position = restore;
        self
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::new()
    }
}
