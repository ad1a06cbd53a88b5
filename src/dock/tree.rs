use itertools::Itertools as _;

use super::section::Section;
use super::types::{NodeId, Orientation};

/// A node of the layout tree: either a split or a tab group.
#[derive(Clone, Debug)]
pub enum Node {
    Splitter(Splitter),
    Section(Section),
}

impl Node {
    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Self::Section(section) => Some(section),
            Self::Splitter(_) => None,
        }
    }

    pub fn as_splitter(&self) -> Option<&Splitter> {
        match self {
            Self::Splitter(splitter) => Some(splitter),
            Self::Section(_) => None,
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, Self::Section(_))
    }
}

/// An oriented container dividing its space among its children.
///
/// `sizes[i]` is the size hint of `children[i]`. A hint of `0` leaves the size to the
/// presentation layer.
#[derive(Clone, Debug)]
pub struct Splitter {
    orientation: Orientation,
    children: Vec<NodeId>,
    sizes: Vec<i32>,
}

impl Splitter {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            children: Vec::new(),
            sizes: Vec::new(),
        }
    }

    pub(crate) fn from_slots(orientation: Orientation, slots: Vec<(NodeId, i32)>) -> Self {
        let (children, sizes) = slots.into_iter().unzip();
        Self {
            orientation,
            children,
            sizes,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn sizes(&self) -> &[i32] {
        &self.sizes
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn index_of(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    /// Replace all size hints. Returns `false` (and changes nothing) on a length mismatch.
    pub fn set_sizes(&mut self, sizes: &[i32]) -> bool {
        if sizes.len() != self.children.len() {
            return false;
        }
        self.sizes.clear();
        self.sizes.extend(sizes.iter().map(|&size| size.max(0)));
        true
    }

    fn slots(&self) -> impl Iterator<Item = (NodeId, i32)> + '_ {
        self.children.iter().copied().zip(self.sizes.iter().copied())
    }

    fn set_slots(&mut self, slots: Vec<(NodeId, i32)>) {
        (self.children, self.sizes) = slots.into_iter().unzip();
    }

    fn insert(&mut self, index: usize, child: NodeId, size: i32) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
        self.sizes.insert(index, size);
    }

    fn remove_at(&mut self, index: usize) -> (NodeId, i32) {
        (self.children.remove(index), self.sizes.remove(index))
    }
}

/// Arena holding the splitter/section hierarchy of one container.
///
/// The root, when present, is always a [`Splitter`]. Every other node is referenced by exactly
/// one splitter.
#[derive(Clone, Debug, Default)]
pub struct SplitterTree {
    nodes: ahash::HashMap<NodeId, Node>,

    /// Child to parent splitter, mirroring every `Splitter::children`.
    parents: ahash::HashMap<NodeId, NodeId>,
    root: Option<NodeId>,
    next_id: u64,
}

impl SplitterTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// A tree is empty when it holds no section.
    pub fn is_empty(&self) -> bool {
        self.first_section().is_none()
    }

    /// Number of nodes (splitters and sections).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn section(&self, id: NodeId) -> Option<&Section> {
        self.get(id).and_then(Node::as_section)
    }

    pub fn section_mut(&mut self, id: NodeId) -> Option<&mut Section> {
        match self.nodes.get_mut(&id) {
            Some(Node::Section(section)) => Some(section),
            _ => None,
        }
    }

    pub fn splitter(&self, id: NodeId) -> Option<&Splitter> {
        self.get(id).and_then(Node::as_splitter)
    }

    pub fn splitter_mut(&mut self, id: NodeId) -> Option<&mut Splitter> {
        match self.nodes.get_mut(&id) {
            Some(Node::Splitter(splitter)) => Some(splitter),
            _ => None,
        }
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Number of splitters between the root and `id` (the root itself has depth 0).
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        if !self.nodes.contains_key(&id) {
            return None;
        }
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            depth += 1;
            current = parent;
        }
        (Some(current) == self.root).then_some(depth)
    }

    /// Visit all reachable nodes depth-first, parents before children.
    pub fn visit_preorder(&self, mut visit: impl FnMut(NodeId, &Node, usize)) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            visit(id, node, depth);
            if let Node::Splitter(splitter) = node {
                stack.extend(splitter.children.iter().rev().map(|&child| (child, depth + 1)));
            }
        }
    }

    /// Section ids in depth-first order.
    pub fn sections(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.visit_preorder(|id, node, _| {
            if node.is_section() {
                out.push(id);
            }
        });
        out
    }

    pub fn first_section(&self) -> Option<NodeId> {
        self.sections().into_iter().next()
    }

    /// Section currently holding the content with `uid`.
    pub fn find_content(&self, uid: u32) -> Option<NodeId> {
        self.sections()
            .into_iter()
            .find(|&id| self.section(id).is_some_and(|s| s.contains(uid)))
    }

    /// Replace the size hints of a splitter, e.g. after the user dragged a handle.
    pub fn set_splitter_sizes(&mut self, id: NodeId, sizes: &[i32]) -> bool {
        self.splitter_mut(id)
            .is_some_and(|splitter| splitter.set_sizes(sizes))
    }

    /// One line per node, indented by depth. Handy in test failure messages.
    pub fn summary(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        self.visit_preorder(|id, node, depth| {
            let indent = "  ".repeat(depth);
            match node {
                Node::Splitter(splitter) => lines.push(format!(
                    "{indent}{id} {:?} sizes={:?}",
                    splitter.orientation, splitter.sizes
                )),
                Node::Section(section) => lines.push(format!(
                    "{indent}{id} section active={:?} [{}]",
                    section.active_index(),
                    section.contents().map(|c| c.unique_name()).join(", ")
                )),
            }
        });
        if lines.is_empty() {
            "root=None".to_owned()
        } else {
            lines.join("\n")
        }
    }

    // ------------------------------------------------------------------------
    // Mutation primitives

    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        self.next_id += 1;
        let id = NodeId::from_u64(self.next_id);
        if let Node::Splitter(splitter) = &node {
            for &child in &splitter.children {
                self.parents.insert(child, id);
            }
        }
        self.nodes.insert(id, node);
        id
    }

    fn remove_node(&mut self, id: NodeId) {
        self.nodes.remove(&id);
        self.parents.remove(&id);
    }

    pub(crate) fn insert_section(&mut self, section: Section) -> NodeId {
        self.insert(Node::Section(section))
    }

    /// The root splitter, created with `orientation` if the tree has none yet.
    pub(super) fn ensure_root(&mut self, orientation: Orientation) -> NodeId {
        if let Some(root) = self.root {
            return root;
        }
        let root = self.insert(Node::Splitter(Splitter::new(orientation)));
        self.root = Some(root);
        root
    }

    /// Append `child` to the root splitter.
    pub(super) fn attach_to_root(&mut self, child: NodeId, orientation: Orientation) {
        if self.parent_of(child).is_some() {
            log::warn!("section {child} has already been added");
            return;
        }
        let root = self.ensure_root(orientation);
        if let Some(splitter) = self.splitter_mut(root) {
            splitter.insert(usize::MAX, child, 0);
            self.parents.insert(child, root);
        }
    }

    /// Unlink `id` from its parent splitter. The node stays in the arena.
    pub(super) fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent_of(id) else {
            return false;
        };
        let Some(splitter) = self.splitter_mut(parent) else {
            return false;
        };
        let Some(index) = splitter.index_of(id) else {
            return false;
        };
        splitter.remove_at(index);
        self.parents.remove(&id);
        true
    }

    /// Sibling split: place `new` directly before or after `target` along `orientation`.
    ///
    /// If the target's parent already has that orientation, `new` becomes a direct sibling.
    /// Otherwise the target's slot is taken over by a fresh splitter holding both nodes.
    /// The target's size hint is shared between the two.
    pub(super) fn insert_beside(
        &mut self,
        target: NodeId,
        new: NodeId,
        orientation: Orientation,
        before: bool,
    ) -> bool {
        let Some(parent) = self.parent_of(target) else {
            return false;
        };
        let Some(splitter) = self.splitter_mut(parent) else {
            return false;
        };
        let Some(index) = splitter.index_of(target) else {
            return false;
        };

        let size = splitter.sizes[index];
        let half = size / 2;

        if splitter.orientation == orientation {
            splitter.sizes[index] = size - half;
            let at = if before { index } else { index + 1 };
            splitter.insert(at, new, half);
            self.parents.insert(new, parent);
            return true;
        }

        let (first, second) = if before { (new, target) } else { (target, new) };
        let wrapper = self.insert(Node::Splitter(Splitter::from_slots(
            orientation,
            vec![(first, half), (second, size - half)],
        )));
        if let Some(splitter) = self.splitter_mut(parent) {
            splitter.children[index] = wrapper;
            self.parents.insert(wrapper, parent);
        }
        true
    }

    /// Outer-edge insertion against the root splitter.
    ///
    /// A root that already matches `orientation` (or has at most one child) is reoriented and
    /// grows by one slot. Otherwise a new root wraps the old one.
    pub(super) fn insert_at_edge(
        &mut self,
        new: NodeId,
        orientation: Orientation,
        append: bool,
        root_orientation: Orientation,
    ) {
        let root = self.ensure_root(root_orientation);
        if let Some(splitter) = self.splitter_mut(root) {
            if splitter.orientation == orientation || splitter.len() <= 1 {
                splitter.orientation = orientation;
                let at = if append { usize::MAX } else { 0 };
                splitter.insert(at, new, 0);
                self.parents.insert(new, root);
                return;
            }
        }

        let slots = if append {
            vec![(root, 0), (new, 0)]
        } else {
            vec![(new, 0), (root, 0)]
        };
        let wrapper = self.insert(Node::Splitter(Splitter::from_slots(orientation, slots)));
        self.root = Some(wrapper);
    }

    /// Drop empty sections and empty splitters.
    ///
    /// With `collapse_redundant`, a non-root splitter with a single child is replaced by that
    /// child, a splitter nested in a parent of the same orientation is flattened into it, and a
    /// root whose only child is a splitter is replaced by that splitter. A root holding a single
    /// section is kept.
    pub(crate) fn normalize(&mut self, collapse_redundant: bool) {
        self.normalize_keeping(collapse_redundant, &[]);
    }

    /// [`Self::normalize`], except that the sections in `keep` survive even when empty.
    pub(super) fn normalize_keeping(&mut self, collapse_redundant: bool, keep: &[NodeId]) {
        let Some(root) = self.root else {
            return;
        };
        if self.splitter(root).is_none() {
            log::error!("layout root {root} is not a splitter; dropping it");
            self.nodes.clear();
            self.parents.clear();
            self.root = None;
            return;
        }

        self.normalize_splitter(root, collapse_redundant, keep);

        let Some(splitter) = self.splitter(root) else {
            return;
        };
        match splitter.children.as_slice() {
            [] => {
                self.remove_node(root);
                self.root = None;
            }
            [only] if collapse_redundant && self.splitter(*only).is_some() => {
                let only = *only;
                self.remove_node(root);
                self.parents.remove(&only);
                self.root = Some(only);
            }
            _ => {}
        }
    }

    fn normalize_splitter(&mut self, id: NodeId, collapse_redundant: bool, keep: &[NodeId]) {
        let Some(splitter) = self.splitter(id) else {
            return;
        };
        let orientation = splitter.orientation;
        let old_slots: Vec<(NodeId, i32)> = splitter.slots().collect();

        let mut slots: Vec<(NodeId, i32)> = Vec::with_capacity(old_slots.len());
        for (child, size) in old_slots {
            if self.splitter(child).is_some() {
                self.normalize_splitter(child, collapse_redundant, keep);
            }
            let (removed, replacement) =
                self.plan_slot(child, size, orientation, collapse_redundant, keep);
            for node in removed {
                self.remove_node(node);
            }
            slots.extend(replacement);
        }

        for &(child, _) in &slots {
            self.parents.insert(child, id);
        }
        if let Some(splitter) = self.splitter_mut(id) {
            splitter.set_slots(slots);
        }
    }

    /// What takes the place of an already normalized `child` inside a splitter of
    /// `orientation`: the nodes to drop from the arena and the replacement slots.
    fn plan_slot(
        &self,
        child: NodeId,
        size: i32,
        orientation: Orientation,
        collapse_redundant: bool,
        keep: &[NodeId],
    ) -> (Vec<NodeId>, Vec<(NodeId, i32)>) {
        match self.nodes.get(&child) {
            None => (Vec::new(), Vec::new()),
            Some(Node::Section(section)) if section.is_empty() && !keep.contains(&child) => {
                (vec![child], Vec::new())
            }
            Some(Node::Section(_)) => (Vec::new(), vec![(child, size)]),
            Some(Node::Splitter(inner)) => match inner.children.as_slice() {
                [] => (vec![child], Vec::new()),
                [only] if collapse_redundant => {
                    let (mut removed, slots) =
                        self.plan_slot(*only, size, orientation, collapse_redundant, keep);
                    removed.push(child);
                    (removed, slots)
                }
                _ if collapse_redundant && inner.orientation == orientation => {
                    (vec![child], inner.slots().collect())
                }
                _ => (Vec::new(), vec![(child, size)]),
            },
        }
    }

    /// Install `root` as the root splitter. Used when building a tree off to the side.
    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        debug_assert!(
            root.is_none_or(|root| self.splitter(root).is_some()),
            "layout root must be a splitter"
        );
        self.root = root;
    }

    pub(super) fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// The recorded parent links, for integrity checks.
    pub(super) fn parent_links(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.parents.iter().map(|(&child, &parent)| (child, parent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::types::ContentPayload;
    use crate::registry::{ContentRef, ContentRegistry};

    fn section_with(content: &ContentRef) -> Section {
        Section::with_payload(ContentPayload::new(content.clone()))
    }

    struct Fixture {
        _registry: ContentRegistry,
        contents: Vec<ContentRef>,
    }

    fn fixture(n: usize) -> Fixture {
        let mut registry = ContentRegistry::new();
        let contents = (0..n)
            .map(|i| registry.register(format!("c{i}"), format!("C{i}")).unwrap())
            .collect();
        Fixture {
            _registry: registry,
            contents,
        }
    }

    #[test]
    fn same_orientation_split_adds_direct_sibling() {
        let f = fixture(2);
        let mut tree = SplitterTree::new();
        let a = tree.insert_section(section_with(&f.contents[0]));
        tree.attach_to_root(a, Orientation::Horizontal);
        let root = tree.root().unwrap();

        let b = tree.insert_section(section_with(&f.contents[1]));
        assert!(tree.insert_beside(a, b, Orientation::Horizontal, true));

        assert_eq!(tree.splitter(root).unwrap().children(), &[b, a]);
        assert_eq!(tree.depth_of(b), tree.depth_of(a));
    }

    #[test]
    fn orthogonal_split_interposes_splitter() {
        let f = fixture(2);
        let mut tree = SplitterTree::new();
        let a = tree.insert_section(section_with(&f.contents[0]));
        tree.attach_to_root(a, Orientation::Horizontal);
        let depth_before = tree.depth_of(a).unwrap();

        let b = tree.insert_section(section_with(&f.contents[1]));
        assert!(tree.insert_beside(a, b, Orientation::Vertical, false));

        let parent = tree.parent_of(a).unwrap();
        let splitter = tree.splitter(parent).unwrap();
        assert_eq!(splitter.orientation(), Orientation::Vertical);
        assert_eq!(splitter.children(), &[a, b]);
        assert_eq!(tree.depth_of(a).unwrap(), depth_before + 1);
    }

    #[test]
    fn split_shares_size_hint() {
        let f = fixture(3);
        let mut tree = SplitterTree::new();
        let a = tree.insert_section(section_with(&f.contents[0]));
        let b = tree.insert_section(section_with(&f.contents[1]));
        tree.attach_to_root(a, Orientation::Horizontal);
        tree.attach_to_root(b, Orientation::Horizontal);
        let root = tree.root().unwrap();
        assert!(tree.set_splitter_sizes(root, &[300, 101]));

        let c = tree.insert_section(section_with(&f.contents[2]));
        assert!(tree.insert_beside(b, c, Orientation::Horizontal, false));
        assert_eq!(tree.splitter(root).unwrap().sizes(), &[300, 51, 50]);

        assert!(!tree.set_splitter_sizes(root, &[1, 2]));
    }

    #[test]
    fn edge_insert_wraps_mismatched_root() {
        let f = fixture(3);
        let mut tree = SplitterTree::new();
        let a = tree.insert_section(section_with(&f.contents[0]));
        let b = tree.insert_section(section_with(&f.contents[1]));
        tree.attach_to_root(a, Orientation::Horizontal);
        tree.attach_to_root(b, Orientation::Horizontal);
        let old_root = tree.root().unwrap();

        let c = tree.insert_section(section_with(&f.contents[2]));
        tree.insert_at_edge(c, Orientation::Vertical, false, Orientation::Horizontal);

        let root = tree.root().unwrap();
        assert_ne!(root, old_root);
        let splitter = tree.splitter(root).unwrap();
        assert_eq!(splitter.orientation(), Orientation::Vertical);
        assert_eq!(splitter.children(), &[c, old_root]);
    }

    #[test]
    fn edge_insert_reorients_single_child_root() {
        let f = fixture(2);
        let mut tree = SplitterTree::new();
        let a = tree.insert_section(section_with(&f.contents[0]));
        tree.attach_to_root(a, Orientation::Horizontal);
        let root = tree.root().unwrap();

        let b = tree.insert_section(section_with(&f.contents[1]));
        tree.insert_at_edge(b, Orientation::Vertical, true, Orientation::Horizontal);

        assert_eq!(tree.root(), Some(root));
        let splitter = tree.splitter(root).unwrap();
        assert_eq!(splitter.orientation(), Orientation::Vertical);
        assert_eq!(splitter.children(), &[a, b]);
    }

    #[test]
    fn normalize_prunes_and_collapses() {
        let f = fixture(3);
        let mut tree = SplitterTree::new();
        let a = tree.insert_section(section_with(&f.contents[0]));
        tree.attach_to_root(a, Orientation::Horizontal);
        let b = tree.insert_section(section_with(&f.contents[1]));
        assert!(tree.insert_beside(a, b, Orientation::Vertical, false));
        let c = tree.insert_section(section_with(&f.contents[2]));
        assert!(tree.insert_beside(b, c, Orientation::Horizontal, false));
        // H[ V[a, H[b, c]] ]

        let uid = f.contents[0].uid();
        assert!(tree.section_mut(a).unwrap().take_content(uid).is_some());
        tree.normalize(true);

        // a is gone, V collapses, the root hoists H[b, c].
        let root = tree.root().unwrap();
        let splitter = tree.splitter(root).unwrap();
        assert_eq!(splitter.orientation(), Orientation::Horizontal);
        assert_eq!(splitter.children(), &[b, c]);
        assert!(tree.get(a).is_none());
        assert_eq!(tree.len(), 3, "{}", tree.summary());
        assert_eq!(tree.parent_of(b), Some(root));
        assert_eq!(tree.parent_of(c), Some(root));
        assert_eq!(tree.parent_of(root), None);
        assert!(tree.integrity_issues().is_empty(), "{:?}", tree.integrity_issues());
    }

    #[test]
    fn parent_links_track_every_edit() {
        let f = fixture(4);
        let mut tree = SplitterTree::new();
        let a = tree.insert_section(section_with(&f.contents[0]));
        assert_eq!(tree.parent_of(a), None);
        tree.attach_to_root(a, Orientation::Horizontal);
        let root = tree.root().unwrap();
        assert_eq!(tree.parent_of(a), Some(root));

        let b = tree.insert_section(section_with(&f.contents[1]));
        assert!(tree.insert_beside(a, b, Orientation::Horizontal, false));
        assert_eq!(tree.parent_of(b), Some(root));

        let c = tree.insert_section(section_with(&f.contents[2]));
        assert!(tree.insert_beside(b, c, Orientation::Vertical, true));
        let wrapper = tree.parent_of(c).unwrap();
        assert_eq!(tree.parent_of(b), Some(wrapper));
        assert_eq!(tree.parent_of(wrapper), Some(root));
        assert_eq!(tree.depth_of(c), Some(2));

        let d = tree.insert_section(section_with(&f.contents[3]));
        tree.insert_at_edge(d, Orientation::Vertical, true, Orientation::Horizontal);
        let new_root = tree.root().unwrap();
        assert_eq!(tree.parent_of(root), Some(new_root));
        assert_eq!(tree.parent_of(d), Some(new_root));
        assert_eq!(tree.depth_of(c), Some(3));
        assert!(tree.integrity_issues().is_empty(), "{:?}", tree.integrity_issues());

        assert!(tree.detach(d));
        assert_eq!(tree.parent_of(d), None);
        assert!(!tree.detach(d));
    }

    #[test]
    fn normalize_keeps_root_with_single_section() {
        let f = fixture(2);
        let mut tree = SplitterTree::new();
        let a = tree.insert_section(section_with(&f.contents[0]));
        let b = tree.insert_section(section_with(&f.contents[1]));
        tree.attach_to_root(a, Orientation::Horizontal);
        tree.attach_to_root(b, Orientation::Horizontal);

        let uid = f.contents[1].uid();
        assert!(tree.section_mut(b).unwrap().take_content(uid).is_some());
        tree.normalize(true);

        let root = tree.root().unwrap();
        assert_eq!(tree.splitter(root).unwrap().children(), &[a]);

        let uid = f.contents[0].uid();
        assert!(tree.section_mut(a).unwrap().take_content(uid).is_some());
        tree.normalize(true);
        assert!(tree.root().is_none());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn normalize_without_collapse_only_prunes() {
        let f = fixture(3);
        let mut tree = SplitterTree::new();
        let a = tree.insert_section(section_with(&f.contents[0]));
        tree.attach_to_root(a, Orientation::Horizontal);
        let b = tree.insert_section(section_with(&f.contents[1]));
        assert!(tree.insert_beside(a, b, Orientation::Vertical, false));
        let c = tree.insert_section(section_with(&f.contents[2]));
        tree.attach_to_root(c, Orientation::Horizontal);
        // H[ V[a, b], c ]

        let uid = f.contents[0].uid();
        assert!(tree.section_mut(a).unwrap().take_content(uid).is_some());
        tree.normalize(false);

        let parent = tree.parent_of(b).unwrap();
        assert_eq!(tree.splitter(parent).unwrap().children(), &[b]);
        assert_eq!(tree.depth_of(b), Some(2));
    }
}
