use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    error::{Error, Result},
    manifest::PortfolioManifest,
    model::{Artwork, Post},
    persist::{CollectionKey, LocalStore},
    store::ContentStore,
};

pub const MANIFEST_FILE: &str = "Portfolio.toml";

/// An on-disk portfolio workspace.
///
/// ```text
/// /portfolio-root
/// ├── Portfolio.toml
/// ├── seed
/// │   ├── posts.json
/// │   └── artworks.json
/// ├── .atelier
/// │   └── store.redb
/// └── build
/// ```
///
/// The seed files bootstrap the local store on first load; after that
/// the store is the source of truth until explicitly reset.
#[derive(Debug, Clone)]
pub struct Portfolio {
    root: PathBuf,
    manifest: PortfolioManifest,
}

impl Portfolio {
    /// Creates a new workspace directory named after the portfolio,
    /// with empty seed files.
    pub fn create(parent: impl AsRef<Path>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let root = parent.as_ref().join(&name);
        if root.join(MANIFEST_FILE).exists() {
            return Err(Error::PortfolioAlreadyExists);
        }
        fs::create_dir_all(&root)?;

        let manifest = PortfolioManifest::new(name);
        manifest.save(root.join(MANIFEST_FILE))?;

        fs::create_dir_all(root.join("seed"))?;
        for key in [CollectionKey::Posts, CollectionKey::Artworks] {
            let seed = seed_path(&root, key);
            if !seed.exists() {
                fs::write(seed, "[]\n")?;
            }
        }

        Ok(Self { root, manifest })
    }

    /// Opens the workspace rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let manifest_path = root.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(Error::PortfolioNotFound);
        }
        let manifest = PortfolioManifest::open(manifest_path)?;
        Ok(Self { root, manifest })
    }

    /// Walks up from `start` until a directory containing
    /// `Portfolio.toml` is found.
    pub fn find(start: impl AsRef<Path>) -> Result<Self> {
        let mut current = start.as_ref().to_path_buf();
        loop {
            if current.join(MANIFEST_FILE).exists() {
                return Self::open(current);
            }
            if !current.pop() {
                return Err(Error::PortfolioNotFound);
            }
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn manifest(&self) -> &PortfolioManifest {
        &self.manifest
    }

    #[must_use]
    pub fn seed_path(&self, key: CollectionKey) -> PathBuf {
        seed_path(&self.root, key)
    }

    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(".atelier")
    }

    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.state_dir().join("store.redb")
    }

    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Opens the durable local store for this workspace.
    pub fn local_store(&self) -> Result<LocalStore> {
        LocalStore::open(self.store_path())
    }

    /// Loads the blog collection, seeding the local store on first
    /// use.
    #[must_use]
    pub fn posts(&self, local: &LocalStore) -> ContentStore<Post> {
        ContentStore::load(
            local.clone(),
            CollectionKey::Posts,
            self.seed_path(CollectionKey::Posts),
        )
    }

    /// Loads the gallery collection.
    #[must_use]
    pub fn artworks(&self, local: &LocalStore) -> ContentStore<Artwork> {
        ContentStore::load(
            local.clone(),
            CollectionKey::Artworks,
            self.seed_path(CollectionKey::Artworks),
        )
    }
}

fn seed_path(root: &Path, key: CollectionKey) -> PathBuf {
    root.join("seed").join(format!("{}.json", key.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_lays_out_the_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let portfolio = Portfolio::create(dir.path(), "studio").unwrap();

        assert!(portfolio.root().join(MANIFEST_FILE).exists());
        assert!(portfolio.seed_path(CollectionKey::Posts).exists());
        assert!(portfolio.seed_path(CollectionKey::Artworks).exists());
        assert_eq!(portfolio.manifest().name(), "studio");
    }

    #[test]
    fn create_refuses_an_existing_workspace() {
        let dir = tempfile::tempdir().unwrap();
        Portfolio::create(dir.path(), "studio").unwrap();
        assert!(matches!(
            Portfolio::create(dir.path(), "studio"),
            Err(Error::PortfolioAlreadyExists)
        ));
    }

    #[test]
    fn find_walks_up_to_the_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let portfolio = Portfolio::create(dir.path(), "studio").unwrap();
        let nested = portfolio.root().join("seed");

        let found = Portfolio::find(&nested).unwrap();
        assert_eq!(found.root(), portfolio.root());

        assert!(matches!(
            Portfolio::find(dir.path()),
            Err(Error::PortfolioNotFound)
        ));
    }

    #[test]
    fn fresh_workspace_loads_empty_collections() {
        let dir = tempfile::tempdir().unwrap();
        let portfolio = Portfolio::create(dir.path(), "studio").unwrap();
        let local = portfolio.local_store().unwrap();

        assert!(portfolio.posts(&local).collection().is_empty());
        assert!(portfolio.artworks(&local).collection().is_empty());
    }
}
