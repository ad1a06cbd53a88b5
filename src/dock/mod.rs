use egui::{Pos2, Rect};

mod content;
mod drop;
mod drop_area;
mod integrity;
mod options;
mod persistence;
mod section;
mod stream;
mod tree;
mod types;


pub use drop_area::{DropArea, outer_drop_area_at, outer_drop_rect, section_drop_area_at};
pub use options::DockContainerOptions;
pub use persistence::{
    FloatingSnapshot, LAYOUT_MAGIC, LAYOUT_VERSION, LayoutPersistenceError, LayoutSnapshot,
    NodeSnapshot, RestoreReport,
};
pub use section::Section;
pub use tree::{Node, Splitter, SplitterTree};
pub use types::{
    ContentLocation, ContentMenuEntry, ContentPayload, FloatingId, FloatingPanel, NodeId,
    Orientation,
};

use crate::registry::ContentRef;

/// Owns one splitter/section layout plus the list of floating panels.
///
/// The container is the authoritative layout model. A presentation layer renders it and feeds
/// user gestures back through [`Self::drop_content`], [`Self::split_sections`],
/// [`Self::take_content`] and friends. Every mutation completes before returning, so the
/// presentation never observes a half-built tree.
///
/// Invariant: each content item lives in exactly one section or exactly one floating panel.
#[derive(Debug, Default)]
pub struct DockContainer {
    pub options: DockContainerOptions,

    tree: SplitterTree,
    floating: Vec<FloatingPanel>,
    next_floating_id: u64,
}

impl DockContainer {
    pub fn new() -> Self {
        Self::new_with_options(DockContainerOptions::default())
    }

    pub fn new_with_options(options: DockContainerOptions) -> Self {
        Self {
            options,
            tree: SplitterTree::new(),
            floating: Vec::new(),
            next_floating_id: 1,
        }
    }

    /// Start from a prebuilt tree, e.g. one made with [`crate::LayoutBuilder`].
    pub fn with_tree(tree: SplitterTree) -> Self {
        let mut container = Self::new();
        let _previous: SplitterTree = container.replace_tree(tree);
        container
    }

    pub fn tree(&self) -> &SplitterTree {
        &self.tree
    }

    /// Install a new layout tree and return the previous one.
    ///
    /// Floating panels whose content also appears in `tree` are closed.
    pub fn replace_tree(&mut self, mut tree: SplitterTree) -> SplitterTree {
        tree.normalize(self.options.collapse_redundant_splitters);
        self.floating.retain(|panel| {
            let docked = tree.find_content(panel.payload.uid()).is_some();
            if docked {
                log::warn!(
                    "closing floating panel for {:?}: content is docked in the new layout",
                    panel.content().unique_name()
                );
            }
            !docked
        });
        std::mem::replace(&mut self.tree, tree)
    }

    pub fn orientation(&self) -> Orientation {
        self.options.orientation
    }

    /// Orientation used the next time a root splitter is created.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.options.orientation = orientation;
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty() && self.floating.is_empty()
    }

    /// Docked sections in depth-first order.
    pub fn sections(&self) -> Vec<NodeId> {
        self.tree.sections()
    }

    pub fn section(&self, id: NodeId) -> Option<&Section> {
        self.tree.section(id)
    }

    /// Select the active tab of a section. Returns `false` for an unknown section or index.
    pub fn set_active_index(&mut self, section: NodeId, index: usize) -> bool {
        self.tree
            .section_mut(section)
            .is_some_and(|section| section.set_active_index(index))
    }

    /// Forward splitter handle movements from the presentation layer.
    pub fn set_splitter_sizes(&mut self, splitter: NodeId, sizes: &[i32]) -> bool {
        self.tree.set_splitter_sizes(splitter, sizes)
    }

    pub fn floating_panels(&self) -> &[FloatingPanel] {
        &self.floating
    }

    pub fn floating_panel(&self, id: FloatingId) -> Option<&FloatingPanel> {
        self.floating.iter().find(|panel| panel.id == id)
    }

    /// Where the content with `uid` currently lives.
    pub fn locate(&self, uid: u32) -> Option<ContentLocation> {
        if let Some(section) = self.tree.find_content(uid) {
            return Some(ContentLocation::Section(section));
        }
        self.floating
            .iter()
            .find(|panel| panel.payload.uid() == uid)
            .map(|panel| ContentLocation::Floating(panel.id))
    }

    /// Every placed content: docked ones in tab order section by section, then floating ones.
    pub fn contents(&self) -> Vec<ContentRef> {
        self.payloads()
            .map(|payload| payload.content.clone())
            .collect()
    }

    /// Problems with the layout model, empty if it is consistent.
    pub fn integrity_issues(&self) -> Vec<String> {
        integrity::layout_integrity_issues(self)
    }

    // ------------------------------------------------------------------------

    fn payloads(&self) -> impl Iterator<Item = &ContentPayload> + '_ {
        let docked = self
            .tree
            .sections()
            .into_iter()
            .filter_map(|id| self.tree.section(id))
            .flat_map(Section::entries);
        docked.chain(self.floating.iter().map(|panel| &panel.payload))
    }

    fn allocate_floating_id(&mut self) -> FloatingId {
        let id = FloatingId(self.next_floating_id);
        self.next_floating_id = self.next_floating_id.saturating_add(1);
        id
    }

    fn default_floating_geometry(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.options.default_floating_size)
    }

    /// Prune what removals left behind.
    fn cleanup(&mut self) {
        self.cleanup_keeping(&[]);
    }

    fn cleanup_keeping(&mut self, keep: &[NodeId]) {
        self.tree
            .normalize_keeping(self.options.collapse_redundant_splitters, keep);
    }
}
