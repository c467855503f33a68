//! Keymap & Layout Model (C2) and Binding Index (C3).
//!
//! Design principles, carried over from the layered mapping model this crate
//! is descended from: layouts are data, not code — a `Keymap` is a pure JSON
//! document resolved against a `BindingIndex` built from a `LayoutPreset`.
//! Neither type owns any timing or per-frame state; both are rebuilt only on
//! configuration change and then queried read-only from the touch-processing
//! hot path.

pub mod binding;
pub mod keymap;
pub mod layout;

pub use binding::{BindingHit, BindingIndex};
pub use keymap::{
    clamp_custom_rect, CustomButton, KeyMapping, Keymap, KeymapError, LayoutBlock, StorageKey,
    MAX_LAYER, MIN_CUSTOM_EXTENT,
};
pub use layout::{
    build_layouts, ColumnSettings, HitGeometry, Key, KeyLayout, LayoutKey, LayoutPreset,
    PAD_HEIGHT_MM, PAD_WIDTH_MM,
};
