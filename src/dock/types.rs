use egui::Rect;

use crate::registry::ContentRef;

/// Identifies a node (splitter or section) inside a [`super::SplitterTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(u64);

impl NodeId {
    pub(super) fn from_u64(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies a floating panel of a [`super::DockContainer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FloatingId(pub(super) u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Children laid out left to right.
    #[default]
    Horizontal,

    /// Children laid out top to bottom.
    Vertical,
}

impl Orientation {
    pub(super) fn to_wire(self) -> i32 {
        match self {
            Self::Horizontal => 1,
            Self::Vertical => 2,
        }
    }

    pub(super) fn from_wire(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Horizontal),
            2 => Some(Self::Vertical),
            _ => None,
        }
    }
}

/// A content item together with its per-placement presentation state.
///
/// This is what moves around when content is detached and re-homed.
#[derive(Clone, Debug)]
pub struct ContentPayload {
    pub content: ContentRef,
    pub visible: bool,
}

impl ContentPayload {
    pub fn new(content: ContentRef) -> Self {
        Self {
            content,
            visible: true,
        }
    }

    pub fn uid(&self) -> u32 {
        self.content.uid()
    }
}

/// A detached top-level window holding exactly one content item.
#[derive(Clone, Debug)]
pub struct FloatingPanel {
    pub(super) id: FloatingId,
    pub(super) payload: ContentPayload,
    pub(super) geometry: Rect,
}

impl FloatingPanel {
    pub fn id(&self) -> FloatingId {
        self.id
    }

    pub fn content(&self) -> &ContentRef {
        &self.payload.content
    }

    pub fn payload(&self) -> &ContentPayload {
        &self.payload
    }

    pub fn is_visible(&self) -> bool {
        self.payload.visible
    }

    /// Outer rectangle of the window, as last reported by the host.
    pub fn geometry(&self) -> Rect {
        self.geometry
    }
}

/// Where a content item currently lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentLocation {
    Section(NodeId),
    Floating(FloatingId),
}

/// One row of the "show/hide panels" menu a host builds from [`super::DockContainer::content_entries`].
#[derive(Clone, Debug)]
pub struct ContentMenuEntry {
    pub uid: u32,
    pub unique_name: String,
    pub title: String,
    pub visible: bool,
    pub location: ContentLocation,
}
