use egui::Vec2;

use super::types::Orientation;

/// Options for [`super::DockContainer`].
#[derive(Clone, Debug)]
pub struct DockContainerOptions {
    /// Orientation of the root splitter when the container creates one from scratch.
    pub orientation: Orientation,

    /// If true, removals are followed by collapsing structurally redundant splitters:
    /// a non-root splitter with a single child is replaced by that child, a splitter nested in a
    /// parent of the same orientation is merged into it, and a root whose only child is a
    /// splitter is replaced by that splitter.
    ///
    /// Empty sections and empty splitters are always pruned.
    pub collapse_redundant_splitters: bool,

    /// Share of the container's width/height used by the outer drop bands
    /// (see [`super::outer_drop_rect`]).
    pub outer_drop_band: f32,

    /// Size given to a floating panel created without explicit geometry.
    pub default_floating_size: Vec2,
}

impl Default for DockContainerOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            collapse_redundant_splitters: true,
            outer_drop_band: 0.05,
            default_floating_size: Vec2::new(480.0, 360.0),
        }
    }
}
