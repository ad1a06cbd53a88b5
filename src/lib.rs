//! Docking layout model: sections of tabbed contents arranged in a tree of splitters.
//!
//! - [`DockContainer`] owns the layout and routes drops, splits, floats and removals.
//! - [`ContentRegistry`] hands out the shared [`ContentRef`] handles the layout refers to, and
//!   resolves unique names when a saved layout is restored.
//! - [`LayoutBuilder`] scripts an initial layout.
//!
//! The crate keeps no UI state of its own: a presentation layer renders the container and feeds
//! user gestures back into it. The geometry helpers in [`dock`] ([`outer_drop_rect`] and
//! friends) use `egui` types so an egui frontend can hit-test drop targets directly.

#![forbid(unsafe_code)]

pub mod dock;
pub mod layout_builder;
pub mod registry;

pub use dock::{
    ContentLocation, ContentMenuEntry, ContentPayload, DockContainer, DockContainerOptions,
    DropArea, FloatingId, FloatingPanel, FloatingSnapshot, LAYOUT_MAGIC, LAYOUT_VERSION,
    LayoutPersistenceError, LayoutSnapshot, Node, NodeId, NodeSnapshot, Orientation,
    RestoreReport, Section, Splitter, SplitterTree, outer_drop_area_at, outer_drop_rect,
    section_drop_area_at,
};
pub use layout_builder::{BuilderNodeId, LayoutBuilder, SplitDirection};
pub use registry::{ContentDescriptor, ContentRef, ContentRegistry, ContentResolver, RegistryError};
