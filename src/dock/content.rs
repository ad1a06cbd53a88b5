use egui::Rect;

use super::types::{ContentLocation, ContentMenuEntry, ContentPayload, FloatingId, FloatingPanel};
use super::DockContainer;
use crate::registry::ContentRef;

impl DockContainer {
    /// Remove the content with `uid` from wherever it lives and hand back its payload.
    ///
    /// Sections emptied by the removal are pruned. Unknown content leaves the layout untouched.
    pub fn take_content(&mut self, uid: u32) -> Option<ContentPayload> {
        let payload = self.detach_content(uid)?;
        self.cleanup();
        Some(payload)
    }

    /// Like [`Self::take_content`] but without pruning, for callers that re-home the payload
    /// before cleaning up.
    pub(super) fn detach_content(&mut self, uid: u32) -> Option<ContentPayload> {
        if let Some(section) = self.tree.find_content(uid) {
            return self.tree.section_mut(section)?.take_content(uid);
        }
        let index = self
            .floating
            .iter()
            .position(|panel| panel.payload.uid() == uid)?;
        Some(self.floating.remove(index).payload)
    }

    /// Move `content` into its own floating panel and return the panel's id.
    ///
    /// Without `geometry` the panel gets the default floating size. Content that is already
    /// floating keeps its panel; only the geometry (if given) is updated.
    pub fn float_content(&mut self, content: &ContentRef, geometry: Option<Rect>) -> FloatingId {
        let uid = content.uid();
        if let Some(panel) = self
            .floating
            .iter_mut()
            .find(|panel| panel.payload.uid() == uid)
        {
            log::warn!("content {:?} is already floating", content.unique_name());
            if let Some(geometry) = geometry {
                panel.geometry = geometry;
            }
            return panel.id;
        }

        let payload = match self.detach_content(uid) {
            Some(payload) => {
                self.cleanup();
                payload
            }
            None => ContentPayload::new(content.clone()),
        };
        let id = self.allocate_floating_id();
        let geometry = geometry.unwrap_or_else(|| self.default_floating_geometry());
        self.floating.push(FloatingPanel {
            id,
            payload,
            geometry,
        });
        id
    }

    /// Record where the host moved a floating window. Returns `false` for an unknown panel.
    pub fn set_floating_geometry(&mut self, id: FloatingId, geometry: Rect) -> bool {
        match self.floating.iter_mut().find(|panel| panel.id == id) {
            Some(panel) => {
                panel.geometry = geometry;
                true
            }
            None => false,
        }
    }

    /// Show or hide a placed content without changing where it lives.
    pub fn set_content_visible(&mut self, uid: u32, visible: bool) -> bool {
        let payload = match self.tree.find_content(uid) {
            Some(section) => self
                .tree
                .section_mut(section)
                .and_then(|section| section.entry_mut(uid)),
            None => self
                .floating
                .iter_mut()
                .find(|panel| panel.payload.uid() == uid)
                .map(|panel| &mut panel.payload),
        };
        let Some(payload) = payload else {
            return false;
        };
        if payload.visible != visible {
            log::debug!(
                "content {:?} visible: {} -> {visible}",
                payload.content.unique_name(),
                payload.visible
            );
            payload.visible = visible;
        }
        true
    }

    /// One entry per placed content for a "show/hide panels" menu: docked contents section by
    /// section in tab order, then floating ones.
    pub fn content_entries(&self) -> Vec<ContentMenuEntry> {
        let docked = self.tree.sections().into_iter().flat_map(|id| {
            self.tree
                .section(id)
                .map(|section| section.entries())
                .unwrap_or_default()
                .iter()
                .map(move |payload| (payload, ContentLocation::Section(id)))
        });
        let floating = self
            .floating
            .iter()
            .map(|panel| (&panel.payload, ContentLocation::Floating(panel.id)));

        docked
            .chain(floating)
            .map(|(payload, location)| ContentMenuEntry {
                uid: payload.uid(),
                unique_name: payload.content.unique_name().to_owned(),
                title: payload.content.title().to_owned(),
                visible: payload.visible,
                location,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use egui::{Pos2, Vec2};

    use super::*;
    use crate::dock::{DropArea, NodeId};
    use crate::registry::ContentRegistry;

    fn setup(names: &[&str]) -> (ContentRegistry, Vec<ContentRef>, DockContainer) {
        let mut registry = ContentRegistry::new();
        let contents = names
            .iter()
            .map(|name| registry.register(*name, name.to_uppercase()).unwrap())
            .collect();
        (registry, contents, DockContainer::new())
    }

    fn add(dock: &mut DockContainer, c: &ContentRef, target: Option<NodeId>, area: DropArea) -> NodeId {
        dock.add_section_content(c.clone(), target, area).unwrap()
    }

    #[test]
    fn take_only_content_empties_layout() {
        let (_registry, c, mut dock) = setup(&["a"]);
        add(&mut dock, &c[0], None, DropArea::Center);

        let payload = dock.take_content(c[0].uid()).unwrap();
        assert_eq!(payload.content.unique_name(), "a");
        assert!(dock.is_empty());
        assert_eq!(dock.tree().root(), None);
        assert!(dock.integrity_issues().is_empty());
    }

    #[test]
    fn take_unknown_content_changes_nothing() {
        let (_registry, c, mut dock) = setup(&["a", "b"]);
        let a = add(&mut dock, &c[0], None, DropArea::Center);
        // Empty section made by a split survives until the next cleanup.
        let empty = dock.split_sections(a, None, crate::dock::Orientation::Vertical).unwrap();
        let before = dock.tree().summary();

        assert!(dock.take_content(c[1].uid()).is_none());
        assert_eq!(dock.tree().summary(), before);
        assert!(dock.section(empty).is_some());
    }

    #[test]
    fn take_prunes_emptied_section_and_collapses() {
        let (_registry, c, mut dock) = setup(&["a", "b", "c"]);
        let a = add(&mut dock, &c[0], None, DropArea::Center);
        let b = add(&mut dock, &c[1], Some(a), DropArea::Bottom);
        let _ = add(&mut dock, &c[2], Some(b), DropArea::Right);

        dock.take_content(c[0].uid()).unwrap();
        assert!(dock.section(a).is_none());
        assert!(dock.integrity_issues().is_empty(), "{}", dock.tree().summary());
        assert_eq!(dock.contents().len(), 2);
    }

    #[test]
    fn float_and_redock() {
        let (_registry, c, mut dock) = setup(&["a", "b"]);
        let a = add(&mut dock, &c[0], None, DropArea::Center);
        let _ = add(&mut dock, &c[1], Some(a), DropArea::Center);

        let geometry = Rect::from_min_size(Pos2::new(40.0, 50.0), Vec2::new(200.0, 100.0));
        let id = dock.float_content(&c[1], Some(geometry));
        assert_eq!(dock.locate(c[1].uid()), Some(ContentLocation::Floating(id)));
        assert_eq!(dock.section(a).unwrap().len(), 1);
        assert_eq!(dock.floating_panel(id).unwrap().geometry(), geometry);

        // Floating again keeps the panel.
        assert_eq!(dock.float_content(&c[1], None), id);
        assert_eq!(dock.floating_panels().len(), 1);

        let section = add(&mut dock, &c[1], Some(a), DropArea::Right);
        assert!(dock.floating_panels().is_empty());
        assert_eq!(dock.locate(c[1].uid()), Some(ContentLocation::Section(section)));
        assert!(dock.integrity_issues().is_empty());
    }

    #[test]
    fn float_unplaced_content_uses_default_geometry() {
        let (_registry, c, mut dock) = setup(&["a"]);
        let id = dock.float_content(&c[0], None);
        let panel = dock.floating_panel(id).unwrap();
        assert_eq!(panel.geometry().size(), dock.options.default_floating_size);
        assert!(panel.is_visible());

        let moved = Rect::from_min_size(Pos2::new(10.0, 10.0), Vec2::splat(64.0));
        assert!(dock.set_floating_geometry(id, moved));
        assert_eq!(dock.floating_panel(id).unwrap().geometry(), moved);

        assert!(dock.take_content(c[0].uid()).is_some());
        assert!(!dock.set_floating_geometry(id, moved));
        assert!(dock.is_empty());
    }

    #[test]
    fn visibility_survives_moves() {
        let (_registry, c, mut dock) = setup(&["a", "b"]);
        let a = add(&mut dock, &c[0], None, DropArea::Center);
        let _ = add(&mut dock, &c[1], Some(a), DropArea::Center);

        assert!(dock.set_content_visible(c[1].uid(), false));
        let _ = add(&mut dock, &c[1], Some(a), DropArea::Left);
        let entry = dock
            .content_entries()
            .into_iter()
            .find(|entry| entry.unique_name == "b")
            .unwrap();
        assert!(!entry.visible);

        dock.float_content(&c[1], None);
        assert!(!dock.floating_panels()[0].is_visible());

        assert!(!dock.set_content_visible(9999, true));
    }

    #[test]
    fn menu_lists_docked_then_floating() {
        let (_registry, c, mut dock) = setup(&["zeta", "alpha", "mid", "tab"]);
        let a = add(&mut dock, &c[0], None, DropArea::Center);
        let top = add(&mut dock, &c[1], Some(a), DropArea::Top);
        let floating = dock.float_content(&c[2], None);
        let _ = add(&mut dock, &c[3], Some(a), DropArea::Center);

        let entries = dock.content_entries();
        let names: Vec<&str> = entries.iter().map(|e| e.unique_name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta", "tab", "mid"]);
        assert_eq!(entries[0].location, ContentLocation::Section(top));
        assert_eq!(entries[0].title, "ALPHA");
        assert_eq!(entries[2].location, ContentLocation::Section(a));
        assert_eq!(entries[3].location, ContentLocation::Floating(floating));
    }
}
