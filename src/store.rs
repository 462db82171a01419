use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    collection::Collection,
    error::{Error, Result},
    model::{ContentItem, ItemId},
    persist::{CollectionKey, LocalStore},
};

/// Authoritative in-memory collection backed by the local store.
///
/// The persisted value is the source of truth once seeded; the seed
/// JSON file is only consulted when the key is absent. Every mutation
/// writes through before the in-memory state is considered committed,
/// so the two can never diverge: a failed write leaves the collection
/// exactly as it was and returns the error.
#[derive(Debug)]
pub struct ContentStore<T> {
    collection: Collection<T>,
    local: LocalStore,
    key: CollectionKey,
    seed_path: PathBuf,
}

impl<T> ContentStore<T>
where
    T: ContentItem + Serialize + DeserializeOwned + Clone,
{
    /// Loads the collection, seeding the local store from the seed
    /// JSON on first use. Read and parse failures degrade to an empty
    /// collection with a logged warning; rendering must never crash on
    /// a bad source.
    #[must_use]
    pub fn load(local: LocalStore, key: CollectionKey, seed_path: impl Into<PathBuf>) -> Self {
        let seed_path = seed_path.into();
        let items = match local.read(key) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(items) => items,
                Err(err) => {
                    warn!(%key, "persisted collection is malformed: {err}");
                    Vec::new()
                }
            },
            Ok(None) => seed_from_file(&local, key, &seed_path),
            Err(err) => {
                warn!(%key, "failed to read local store: {err}");
                Vec::new()
            }
        };

        Self {
            collection: Collection::new(items),
            local,
            key,
            seed_path,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    #[must_use]
    pub const fn key(&self) -> CollectionKey {
        self.key
    }

    /// Inserts a freshly created item at the front of the collection.
    pub fn create(&mut self, item: T) -> Result<()> {
        if self.collection.get(item.id()).is_some() {
            return Err(Error::DuplicateId(item.id()));
        }
        let mut next = self.collection.clone();
        next.prepend(item);
        self.persist(&next)?;
        self.collection = next;
        Ok(())
    }

    /// Replaces the item with the same id in place; position in the
    /// collection is preserved.
    pub fn update(&mut self, item: T) -> Result<()> {
        let id = item.id();
        let mut next = self.collection.clone();
        if !next.replace(item) {
            return Err(Error::ItemNotFound(id));
        }
        self.persist(&next)?;
        self.collection = next;
        Ok(())
    }

    /// Removes exactly one item. Irreversible; the caller is expected
    /// to have gated this behind an explicit confirmation.
    pub fn delete(&mut self, id: ItemId) -> Result<T> {
        let mut next = self.collection.clone();
        let removed = next.remove(id).ok_or(Error::ItemNotFound(id))?;
        self.persist(&next)?;
        self.collection = next;
        Ok(removed)
    }

    /// Drops the persisted state and reloads from the seed source.
    pub fn reset(&mut self) -> Result<()> {
        self.local.clear(self.key)?;
        let items = seed_from_file(&self.local, self.key, &self.seed_path);
        self.collection = Collection::new(items);
        Ok(())
    }

    /// Serializes the collection to pretty-printed JSON identical in
    /// shape to the seed format, for promoting local edits back into
    /// the static seed.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self.collection.items())?;
        fs::write(path, json)?;
        Ok(())
    }

    fn persist(&self, next: &Collection<T>) -> Result<()> {
        // Serializing our own models never fails; the write can.
        let json = serde_json::to_string(next.items())?;
        self.local.write(self.key, &json)
    }
}

fn seed_from_file<T: DeserializeOwned + Serialize>(
    local: &LocalStore,
    key: CollectionKey,
    seed_path: &Path,
) -> Vec<T> {
    let raw = match fs::read_to_string(seed_path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(%key, "no seed file at {}", seed_path.display());
            return Vec::new();
        }
        Err(err) => {
            warn!(%key, "failed to read seed file: {err}");
            return Vec::new();
        }
    };

    let items: Vec<T> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(err) => {
            warn!(%key, "seed file is malformed: {err}");
            return Vec::new();
        }
    };

    // First load: mirror the seed into the local store so it becomes
    // the source of truth. A failed write here is logged but does not
    // prevent reading; the next mutation will surface it.
    match serde_json::to_string(&items) {
        Ok(json) => {
            if let Err(err) = local.write(key, &json) {
                warn!(%key, "failed to seed local store: {err}");
            }
        }
        Err(err) => warn!(%key, "failed to serialize seed: {err}"),
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Post;
    use time::macros::datetime;

    fn post(id: i64, title: &str) -> Post {
        Post {
            id: ItemId::new(id),
            title: title.into(),
            excerpt: "excerpt".into(),
            tags: vec![],
            category: "Process".into(),
            content: "body".into(),
            date: datetime!(2024-01-01 00:00 UTC),
            slug: crate::slug::PostSlug::from_title(title).unwrap(),
            featured: false,
            read_time: None,
            author: None,
            featured_image: None,
            image_alt: None,
        }
    }

    fn fixture() -> (tempfile::TempDir, LocalStore, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path().join("store.redb")).unwrap();
        let seed = dir.path().join("posts.json");
        (dir, local, seed)
    }

    #[test]
    fn first_load_seeds_the_local_store() {
        let (_dir, local, seed) = fixture();
        let posts = vec![post(1, "First"), post(2, "Second")];
        fs::write(&seed, serde_json::to_string(&posts).unwrap()).unwrap();

        let store = ContentStore::<Post>::load(local.clone(), CollectionKey::Posts, &seed);
        assert_eq!(store.collection().len(), 2);
        assert!(local.read(CollectionKey::Posts).unwrap().is_some());
    }

    #[test]
    fn persisted_state_wins_over_the_seed() {
        let (_dir, local, seed) = fixture();
        fs::write(&seed, serde_json::to_string(&vec![post(1, "Seeded")]).unwrap()).unwrap();
        local
            .write(
                CollectionKey::Posts,
                &serde_json::to_string(&vec![post(9, "Persisted")]).unwrap(),
            )
            .unwrap();

        let store = ContentStore::<Post>::load(local, CollectionKey::Posts, &seed);
        assert_eq!(store.collection().len(), 1);
        assert_eq!(store.collection().items()[0].title, "Persisted");
    }

    #[test]
    fn missing_seed_loads_empty() {
        let (_dir, local, seed) = fixture();
        let store = ContentStore::<Post>::load(local, CollectionKey::Posts, &seed);
        assert!(store.collection().is_empty());
    }

    #[test]
    fn malformed_seed_fails_soft_to_empty() {
        let (_dir, local, seed) = fixture();
        fs::write(&seed, "{ not json ").unwrap();
        let store = ContentStore::<Post>::load(local.clone(), CollectionKey::Posts, &seed);
        assert!(store.collection().is_empty());
        // Nothing was written through for a bad seed.
        assert_eq!(local.read(CollectionKey::Posts).unwrap(), None);
    }

    #[test]
    fn create_prepends_and_writes_through() {
        let (_dir, local, seed) = fixture();
        let mut store = ContentStore::<Post>::load(local.clone(), CollectionKey::Posts, &seed);
        store.create(post(1, "Older")).unwrap();
        store.create(post(2, "Newer")).unwrap();

        assert_eq!(store.collection().items()[0].title, "Newer");

        let persisted: Vec<Post> =
            serde_json::from_str(&local.read(CollectionKey::Posts).unwrap().unwrap()).unwrap();
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[0].title, "Newer");
    }

    #[test]
    fn create_rejects_duplicate_ids() {
        let (_dir, local, seed) = fixture();
        let mut store = ContentStore::<Post>::load(local, CollectionKey::Posts, &seed);
        store.create(post(1, "First")).unwrap();
        assert!(matches!(
            store.create(post(1, "Clone")),
            Err(Error::DuplicateId(_))
        ));
        assert_eq!(store.collection().len(), 1);
    }

    #[test]
    fn update_preserves_position() {
        let (_dir, local, seed) = fixture();
        let mut store = ContentStore::<Post>::load(local, CollectionKey::Posts, &seed);
        store.create(post(1, "A")).unwrap();
        store.create(post(2, "B")).unwrap();
        store.create(post(3, "C")).unwrap();

        let mut edited = post(2, "B edited");
        edited.slug = "b".parse().unwrap();
        store.update(edited).unwrap();

        let titles: Vec<&str> = store
            .collection()
            .items()
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, vec!["C", "B edited", "A"]);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let (_dir, local, seed) = fixture();
        let mut store = ContentStore::<Post>::load(local, CollectionKey::Posts, &seed);
        assert!(matches!(
            store.update(post(404, "Ghost")),
            Err(Error::ItemNotFound(_))
        ));
    }

    #[test]
    fn delete_removes_exactly_one_keeping_order() {
        let (_dir, local, seed) = fixture();
        let mut store = ContentStore::<Post>::load(local, CollectionKey::Posts, &seed);
        for id in 1..=4 {
            store.create(post(id, &format!("P{id}"))).unwrap();
        }

        let removed = store.delete(ItemId::new(3)).unwrap();
        assert_eq!(removed.title, "P3");

        let ids: Vec<i64> = store
            .collection()
            .items()
            .iter()
            .map(|p| p.id.get())
            .collect();
        assert_eq!(ids, vec![4, 2, 1]);

        assert!(matches!(
            store.delete(ItemId::new(3)),
            Err(Error::ItemNotFound(_))
        ));
    }

    /// In-memory backend whose writes can be switched off, standing in
    /// for a disk that stops accepting data mid-session.
    #[derive(Debug)]
    struct FlakyBackend {
        inner: redb::backends::InMemoryBackend,
        writable: std::sync::Arc<std::sync::atomic::AtomicBool>,
    }

    impl redb::StorageBackend for FlakyBackend {
        fn len(&self) -> std::io::Result<u64> {
            redb::StorageBackend::len(&self.inner)
        }

        fn read(&self, offset: u64, out: &mut [u8]) -> std::io::Result<()> {
            redb::StorageBackend::read(&self.inner, offset, out)
        }

        fn set_len(&self, len: u64) -> std::io::Result<()> {
            redb::StorageBackend::set_len(&self.inner, len)
        }

        fn sync_data(&self) -> std::io::Result<()> {
            redb::StorageBackend::sync_data(&self.inner)
        }

        fn write(&self, offset: u64, data: &[u8]) -> std::io::Result<()> {
            if !self.writable.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(std::io::Error::other("storage rejected the write"));
            }
            redb::StorageBackend::write(&self.inner, offset, data)
        }
    }

    #[test]
    fn failed_write_leaves_the_collection_untouched() {
        use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};

        let writable = Arc::new(AtomicBool::new(true));
        let backend = FlakyBackend {
            inner: redb::backends::InMemoryBackend::new(),
            writable: Arc::clone(&writable),
        };
        let db = redb::Database::builder().create_with_backend(backend).unwrap();
        let local = LocalStore::with_database(db);

        let mut store =
            ContentStore::<Post>::load(local, CollectionKey::Posts, "absent-seed.json");
        store.create(post(1, "Kept")).unwrap();

        writable.store(false, Ordering::SeqCst);
        assert!(store.create(post(2, "Rejected")).is_err());
        assert!(store.update(post(1, "Edited")).is_err());
        assert!(store.delete(ItemId::new(1)).is_err());

        // The in-memory state never got ahead of the durable copy.
        assert_eq!(store.collection().len(), 1);
        assert_eq!(store.collection().items()[0].title, "Kept");
    }

    #[test]
    fn reset_returns_to_the_seed_state() {
        let (_dir, local, seed) = fixture();
        fs::write(&seed, serde_json::to_string(&vec![post(1, "Seeded")]).unwrap()).unwrap();

        let mut store = ContentStore::<Post>::load(local, CollectionKey::Posts, &seed);
        store.create(post(2, "Local only")).unwrap();
        assert_eq!(store.collection().len(), 2);

        store.reset().unwrap();
        assert_eq!(store.collection().len(), 1);
        assert_eq!(store.collection().items()[0].title, "Seeded");
    }

    #[test]
    fn export_matches_seed_shape() {
        let (dir, local, seed) = fixture();
        fs::write(&seed, serde_json::to_string(&vec![post(1, "Only")]).unwrap()).unwrap();
        let store = ContentStore::<Post>::load(local, CollectionKey::Posts, &seed);

        let out = dir.path().join("export.json");
        store.export_to(&out).unwrap();

        let exported: Vec<Post> = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(exported, store.collection().items());
    }
}
