use std::rc::{Rc, Weak};

/// Shared handle to a piece of host-supplied content.
///
/// The host owns the strong handles. The registry only keeps [`Weak`] references, so a content
/// that the host drops (or unregisters) simply stops resolving.
pub type ContentRef = Rc<ContentDescriptor>;

/// Immutable identity of a dockable content item.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ContentDescriptor {
    unique_name: String,
    uid: u32,
    title: String,
}

impl ContentDescriptor {
    /// Stable key used across save/restore cycles.
    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    EmptyName,
    DuplicateName(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "content unique name must not be empty"),
            Self::DuplicateName(name) => {
                write!(f, "content unique name {name:?} is already registered")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Lookup seam between persisted content names and live content.
///
/// Restoring a layout only ever *reads* through this trait; returning `None` drops that entry
/// from the restored layout.
pub trait ContentResolver {
    fn resolve(&self, unique_name: &str) -> Option<ContentRef>;
}

impl<F> ContentResolver for F
where
    F: Fn(&str) -> Option<ContentRef>,
{
    fn resolve(&self, unique_name: &str) -> Option<ContentRef> {
        self(unique_name)
    }
}

/// Name → content mapping owned by the host application.
///
/// Registering hands back the only strong handle; keep it alive for as long as the content
/// should be restorable.
#[derive(Debug, Default)]
pub struct ContentRegistry {
    by_name: ahash::HashMap<String, Weak<ContentDescriptor>>,
    next_uid: u32,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a content descriptor and register it under `unique_name`.
    ///
    /// A name whose previous content has been dropped can be registered again.
    pub fn register(
        &mut self,
        unique_name: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<ContentRef, RegistryError> {
        let unique_name = unique_name.into();
        if unique_name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.resolve(&unique_name).is_some() {
            return Err(RegistryError::DuplicateName(unique_name));
        }

        self.next_uid = self.next_uid.wrapping_add(1);
        let content = Rc::new(ContentDescriptor {
            unique_name: unique_name.clone(),
            uid: self.next_uid,
            title: title.into(),
        });
        self.by_name.insert(unique_name, Rc::downgrade(&content));
        Ok(content)
    }

    /// Returns `true` if a live entry was removed.
    pub fn unregister(&mut self, unique_name: &str) -> bool {
        self.by_name
            .remove(unique_name)
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    pub fn resolve(&self, unique_name: &str) -> Option<ContentRef> {
        self.by_name.get(unique_name).and_then(Weak::upgrade)
    }

    pub fn contains(&self, unique_name: &str) -> bool {
        self.by_name
            .get(unique_name)
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.by_name
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget entries whose content has been dropped. Returns how many were removed.
    pub fn prune_dead(&mut self) -> usize {
        let before = self.by_name.len();
        self.by_name.retain(|_, weak| weak.strong_count() > 0);
        before - self.by_name.len()
    }
}

impl ContentResolver for ContentRegistry {
    fn resolve(&self, unique_name: &str) -> Option<ContentRef> {
        Self::resolve(self, unique_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_resolve() {
        let mut registry = ContentRegistry::new();
        let a = registry.register("a", "Alpha").unwrap();
        let b = registry.register("b", "Beta").unwrap();

        assert_ne!(a.uid(), b.uid());
        assert_eq!(registry.resolve("a").unwrap().title(), "Alpha");
        assert!(Rc::ptr_eq(&registry.resolve("b").unwrap(), &b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicate_and_empty_names_are_rejected() {
        let mut registry = ContentRegistry::new();
        let _a = registry.register("a", "Alpha").unwrap();

        assert_eq!(
            registry.register("a", "Again"),
            Err(RegistryError::DuplicateName("a".to_owned()))
        );
        assert_eq!(registry.register("", "Nameless"), Err(RegistryError::EmptyName));
    }

    #[test]
    fn dropped_content_no_longer_resolves() {
        let mut registry = ContentRegistry::new();
        let a = registry.register("a", "Alpha").unwrap();
        drop(a);

        assert!(registry.resolve("a").is_none());
        assert!(!registry.contains("a"));
        assert_eq!(registry.prune_dead(), 1);

        // The name is free again.
        assert!(registry.register("a", "Alpha 2").is_ok());
    }

    #[test]
    fn unregister_keeps_host_handle_alive() {
        let mut registry = ContentRegistry::new();
        let a = registry.register("a", "Alpha").unwrap();

        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert!(registry.resolve("a").is_none());
        assert_eq!(a.unique_name(), "a");
    }

    #[test]
    fn closures_are_resolvers() {
        let mut registry = ContentRegistry::new();
        let a = registry.register("a", "Alpha").unwrap();

        let only_a = |name: &str| (name == "a").then(|| a.clone());
        assert!(only_a.resolve("a").is_some());
        assert!(only_a.resolve("b").is_none());
    }
}
