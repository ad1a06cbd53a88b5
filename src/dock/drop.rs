use super::section::Section;
use super::types::{ContentLocation, ContentPayload, NodeId, Orientation};
use super::{DockContainer, DropArea};
use crate::registry::ContentRef;

impl DockContainer {
    /// Host-facing entry point: dock `content` relative to `target` (or to the container).
    ///
    /// Without a target, an empty container gets a fresh section whatever the area, and
    /// [`DropArea::Center`] means "the first section". The new tab is not activated unless it is
    /// the section's first one.
    pub fn add_section_content(
        &mut self,
        content: ContentRef,
        target: Option<NodeId>,
        area: DropArea,
    ) -> Option<NodeId> {
        let visible = self
            .payloads()
            .find(|payload| payload.uid() == content.uid())
            .is_none_or(|payload| payload.visible);
        let payload = ContentPayload { content, visible };
        self.drop_content(payload, target, area, false)
    }

    /// Place `payload` according to `target` and `area` and return the section now holding it.
    ///
    /// - no target, empty tree: new root section (area ignored)
    /// - no target, [`DropArea::Center`]: first section
    /// - no target and an edge area, or any `Outer*` area: outer-edge drop against the root
    /// - target and [`DropArea::Center`]: new tab in the target
    /// - target and an edge: new section split off the target
    ///
    /// Content that already lives somewhere in the layout is moved, never duplicated.
    pub fn drop_content(
        &mut self,
        payload: ContentPayload,
        target: Option<NodeId>,
        area: DropArea,
        auto_active: bool,
    ) -> Option<NodeId> {
        let target = target.filter(|&id| self.check_section(id, "drop target"));
        let uid = payload.uid();

        let moved = match self.locate(uid) {
            Some(ContentLocation::Section(current))
                if Some(current) == target && area == DropArea::Center =>
            {
                // Re-dropping onto its own tab group only re-selects it.
                let section = self.tree.section_mut(current)?;
                if let Some(index) = section.position(uid) {
                    if auto_active {
                        section.set_active_index(index);
                    }
                }
                return Some(current);
            }
            Some(_) => self.detach_content(uid).is_some(),
            None => false,
        };

        let placed = self.place(payload, target, area, auto_active);
        if moved {
            self.cleanup();
        }
        placed
    }

    /// User-invoked "split this panel": put `second` right after `first` along `orientation`.
    ///
    /// `second` is created empty when `None` (fill it with a [`DropArea::Center`] drop), or moved
    /// from its current place in the tree. If `first`'s parent already has `orientation`, `second`
    /// becomes its direct sibling; otherwise a new splitter holding both takes `first`'s slot.
    pub fn split_sections(
        &mut self,
        first: NodeId,
        second: Option<NodeId>,
        orientation: Orientation,
    ) -> Option<NodeId> {
        if !self.check_section(first, "split source") {
            return None;
        }
        if second == Some(first) {
            log::warn!("cannot split section {first} against itself");
            return None;
        }
        if self.tree.parent_of(first).is_none() {
            self.tree.attach_to_root(first, self.options.orientation);
        }

        let (second, moved) = match second {
            Some(second) => {
                if !self.check_section(second, "split target") {
                    return None;
                }
                (second, self.tree.detach(second))
            }
            None => (self.tree.insert_section(Section::new()), false),
        };

        self.tree.insert_beside(first, second, orientation, false);
        if moved {
            self.cleanup_keeping(&[first, second]);
        }
        Some(second)
    }

    fn place(
        &mut self,
        payload: ContentPayload,
        target: Option<NodeId>,
        area: DropArea,
        auto_active: bool,
    ) -> Option<NodeId> {
        let target = target.filter(|_| !area.is_outer());

        let Some(target) = target else {
            if self.tree.is_empty() {
                let section = self.tree.insert_section(Section::with_payload(payload));
                self.tree.attach_to_root(section, self.options.orientation);
                return Some(section);
            }
            return match area.split() {
                Some((orientation, before)) => Some(self.drop_outer(payload, orientation, !before)),
                None => {
                    let first = self.tree.first_section()?;
                    self.tree
                        .section_mut(first)?
                        .add_content(payload, auto_active);
                    Some(first)
                }
            };
        };

        match area.split() {
            None => {
                self.tree
                    .section_mut(target)?
                    .add_content(payload, auto_active);
                Some(target)
            }
            Some((orientation, before)) => {
                let section = self.tree.insert_section(Section::with_payload(payload));
                if !self.tree.insert_beside(target, section, orientation, before) {
                    log::error!("drop target {target} is not attached to the layout");
                    self.tree.attach_to_root(section, self.options.orientation);
                }
                Some(section)
            }
        }
    }

    fn drop_outer(&mut self, payload: ContentPayload, orientation: Orientation, append: bool) -> NodeId {
        let section = self.tree.insert_section(Section::with_payload(payload));
        self.tree
            .insert_at_edge(section, orientation, append, self.options.orientation);
        section
    }

    /// Callers must only pass sections obtained from this container.
    fn check_section(&self, id: NodeId, role: &str) -> bool {
        let known = self.tree.section(id).is_some();
        debug_assert!(known, "{role} {id} is not a section of this container");
        if !known {
            log::error!("{role} {id} is not a section of this container");
        }
        known
    }
}
