use std::collections::{BTreeMap, HashSet};

use egui::Vec2;

use crate::dock::{ContentPayload, Node, NodeId, Orientation, Section, Splitter, SplitterTree};
use crate::registry::ContentRef;

/// Extent of the whole layout along each axis. Split fractions become size hints in these units,
/// so that flattening nested splitters keeps their proportions.
const LAYOUT_EXTENT: f32 = 1000.0;

/// Split direction with Dear ImGui `DockBuilder::SplitNode`-like semantics.
///
/// The direction indicates where the *side* node is placed relative to the *main* node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SplitDirection {
    fn orientation(self) -> Orientation {
        match self {
            Self::Left | Self::Right => Orientation::Horizontal,
            Self::Up | Self::Down => Orientation::Vertical,
        }
    }

    fn side_first(self) -> bool {
        matches!(self, Self::Left | Self::Up)
    }
}

/// A logical node id used by [`LayoutBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuilderNodeId(u64);

#[derive(Clone, Debug)]
enum BuilderNode<Item> {
    Leaf {
        items: Vec<Item>,
    },
    Split {
        dir: SplitDirection,
        side_fraction: f32,
        main: BuilderNodeId,
        side: BuilderNodeId,
    },
}

/// Builds a [`SplitterTree`] from code, the way Dear ImGui's `DockBuilder` does:
/// you create empty nodes, split them, then dock contents into leaf nodes, and finally `finish()`.
///
/// Leaves become sections. Leaves still empty at `finish()` are pruned, as is any splitter they
/// leave redundant.
///
/// ```
/// # use egui_section_dock::{ContentRegistry, DockContainer, LayoutBuilder, SplitDirection};
/// let mut registry = ContentRegistry::new();
/// let scene = registry.register("scene", "Scene").unwrap();
/// let inspector = registry.register("inspector", "Inspector").unwrap();
///
/// let mut builder = LayoutBuilder::new();
/// let dockspace = builder.add_node();
/// let (right, main) = builder.split_node(dockspace, SplitDirection::Right, 0.25);
/// builder.dock_content(scene, main);
/// builder.dock_content(inspector, right);
///
/// let dock = DockContainer::with_tree(builder.finish(dockspace));
/// assert_eq!(dock.sections().len(), 2);
/// ```
pub struct LayoutBuilder<Item = ContentRef> {
    next_node_id: u64,
    nodes: BTreeMap<BuilderNodeId, BuilderNode<Item>>,
}

impl<Item> Default for LayoutBuilder<Item> {
    fn default() -> Self {
        Self {
            next_node_id: 1,
            nodes: BTreeMap::new(),
        }
    }
}

impl<Item> LayoutBuilder<Item> {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_node_id(&mut self) -> BuilderNodeId {
        let id = BuilderNodeId(self.next_node_id);
        self.next_node_id = self.next_node_id.saturating_add(1);
        id
    }

    /// Create an empty leaf node.
    #[must_use]
    pub fn add_node(&mut self) -> BuilderNodeId {
        let id = self.alloc_node_id();
        self.nodes.insert(id, BuilderNode::Leaf { items: Vec::new() });
        id
    }

    /// Split an existing node and return `(side, main)` (Dear ImGui semantics).
    ///
    /// The `node` itself becomes the split, and whatever it held is moved into the returned
    /// `main` child node. `side_fraction` is the share of the split given to `side`.
    #[must_use]
    pub fn split_node(
        &mut self,
        node: BuilderNodeId,
        dir: SplitDirection,
        side_fraction: f32,
    ) -> (BuilderNodeId, BuilderNodeId) {
        debug_assert!(
            (0.0..=1.0).contains(&side_fraction),
            "side_fraction must be in 0.0..=1.0"
        );

        let old = self
            .nodes
            .remove(&node)
            .unwrap_or(BuilderNode::Leaf { items: Vec::new() });
        let main = self.alloc_node_id();
        self.nodes.insert(main, old);

        let side = self.add_node();

        self.nodes.insert(
            node,
            BuilderNode::Split {
                dir,
                side_fraction: side_fraction.clamp(0.0, 1.0),
                main,
                side,
            },
        );

        (side, main)
    }

    /// Add a tab to a leaf node. Docking into a split or unknown node is a caller bug and is
    /// ignored.
    pub fn dock_content(&mut self, item: Item, node: BuilderNodeId) {
        let leaf = match self.nodes.get_mut(&node) {
            Some(BuilderNode::Leaf { items }) => Some(items),
            Some(BuilderNode::Split { .. }) | None => None,
        };
        debug_assert!(leaf.is_some(), "dock_content: node {node:?} is not a leaf node");
        match leaf {
            Some(items) => items.push(item),
            None => log::error!("dock_content: node {node:?} is not a leaf node"),
        }
    }

    /// Dock several contents into one leaf node (tabbed together).
    pub fn dock_contents(&mut self, items: impl IntoIterator<Item = Item>, node: BuilderNodeId) {
        for item in items {
            self.dock_content(item, node);
        }
    }

    /// Finish building, mapping docked items to contents along the way.
    ///
    /// Useful when the scripted layout is expressed in unique names: resolve them here and
    /// return `None` to leave an item out. A content docked more than once keeps its first place.
    pub fn finish_map(
        self,
        root: BuilderNodeId,
        mut map: impl FnMut(Item) -> Option<ContentRef>,
    ) -> SplitterTree {
        let mut build = Build {
            nodes: self.nodes,
            tree: SplitterTree::new(),
            placed: HashSet::new(),
        };
        let root_node = build.node(root, Vec2::splat(LAYOUT_EXTENT), &mut map);

        let root_splitter = if build.tree.splitter(root_node).is_some() {
            root_node
        } else {
            build.tree.insert(Node::Splitter(Splitter::from_slots(
                Orientation::Horizontal,
                vec![(root_node, 0)],
            )))
        };

        let mut tree = build.tree;
        tree.set_root(Some(root_splitter));
        tree.normalize(true);
        tree
    }
}

impl LayoutBuilder<ContentRef> {
    /// Finish building and produce the tree.
    ///
    /// `root` is typically the id returned by the first `add_node()` and then mutated by splits.
    pub fn finish(self, root: BuilderNodeId) -> SplitterTree {
        self.finish_map(root, Some)
    }
}

struct Build<Item> {
    nodes: BTreeMap<BuilderNodeId, BuilderNode<Item>>,
    tree: SplitterTree,
    placed: HashSet<u32>,
}

impl<Item> Build<Item> {
    /// `extent` is the node's share of the layout, used to turn fractions into size hints.
    fn node(
        &mut self,
        node_id: BuilderNodeId,
        extent: Vec2,
        map: &mut impl FnMut(Item) -> Option<ContentRef>,
    ) -> NodeId {
        match self.nodes.remove(&node_id) {
            Some(BuilderNode::Leaf { items }) => {
                let mut section = Section::new();
                for content in items.into_iter().filter_map(|item| map(item)) {
                    if self.placed.insert(content.uid()) {
                        section.add_content(ContentPayload::new(content), false);
                    } else {
                        log::warn!(
                            "content {:?} is docked more than once; keeping the first",
                            content.unique_name()
                        );
                    }
                }
                self.tree.insert_section(section)
            }
            Some(BuilderNode::Split {
                dir,
                side_fraction,
                main,
                side,
            }) => {
                let orientation = dir.orientation();
                let (main_extent, side_extent) = match orientation {
                    Orientation::Horizontal => {
                        let side_width = extent.x * side_fraction;
                        (
                            Vec2::new(extent.x - side_width, extent.y),
                            Vec2::new(side_width, extent.y),
                        )
                    }
                    Orientation::Vertical => {
                        let side_height = extent.y * side_fraction;
                        (
                            Vec2::new(extent.x, extent.y - side_height),
                            Vec2::new(extent.x, side_height),
                        )
                    }
                };
                let along = |extent: Vec2| match orientation {
                    Orientation::Horizontal => extent.x.round() as i32,
                    Orientation::Vertical => extent.y.round() as i32,
                };

                let main_node = self.node(main, main_extent, map);
                let side_node = self.node(side, side_extent, map);

                let main_slot = (main_node, along(main_extent));
                let side_slot = (side_node, along(side_extent));
                let slots = if dir.side_first() {
                    vec![side_slot, main_slot]
                } else {
                    vec![main_slot, side_slot]
                };
                self.tree
                    .insert(Node::Splitter(Splitter::from_slots(orientation, slots)))
            }
            None => self.tree.insert_section(Section::new()),
        }
    }
}
