use super::types::ContentPayload;
use crate::registry::ContentRef;

/// A tab group: an ordered list of contents with at most one active tab.
#[derive(Clone, Debug, Default)]
pub struct Section {
    entries: Vec<ContentPayload>,
    active: Option<usize>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn with_payload(payload: ContentPayload) -> Self {
        let mut section = Self::new();
        section.add_content(payload, true);
        section
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Contents in tab order.
    pub fn contents(&self) -> impl ExactSizeIterator<Item = &ContentRef> + '_ {
        self.entries.iter().map(|entry| &entry.content)
    }

    pub fn entries(&self) -> &[ContentPayload] {
        &self.entries
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_content(&self) -> Option<&ContentRef> {
        self.active
            .and_then(|index| self.entries.get(index))
            .map(|entry| &entry.content)
    }

    pub fn position(&self, uid: u32) -> Option<usize> {
        self.entries.iter().position(|entry| entry.uid() == uid)
    }

    pub fn contains(&self, uid: u32) -> bool {
        self.position(uid).is_some()
    }

    /// Append a tab. The first tab of an empty section always becomes active.
    pub fn add_content(&mut self, payload: ContentPayload, auto_active: bool) {
        self.entries.push(payload);
        if auto_active || self.active.is_none() {
            self.active = Some(self.entries.len() - 1);
        }
    }

    /// Returns `false` for an out-of-range index.
    pub fn set_active_index(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.active = Some(index);
            true
        } else {
            false
        }
    }

    pub(super) fn take_content(&mut self, uid: u32) -> Option<ContentPayload> {
        let index = self.position(uid)?;
        let payload = self.entries.remove(index);

        self.active = match self.active {
            _ if self.entries.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) if active == index => Some(index.min(self.entries.len() - 1)),
            other => other,
        };

        Some(payload)
    }

    pub(super) fn entry_mut(&mut self, uid: u32) -> Option<&mut ContentPayload> {
        self.entries.iter_mut().find(|entry| entry.uid() == uid)
    }
}
