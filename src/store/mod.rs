//! Content store - the process-wide snapshot of loaded posts
//!
//! The store reads nothing until the first [`ContentStore::snapshot`] call.
//! Readers share an `Arc` of the current collection; a reload builds a new
//! collection off to the side and swaps it in, so readers never observe a
//! half-loaded state. Each load cycle also fixes the public view once.

use std::sync::{Arc, RwLock};

use crate::content::loader::ContentLoader;
use crate::query::PostCollection;
use crate::Site;

/// One load cycle: every post, and what the public may see of them
#[derive(Clone)]
struct Snapshot {
    all: Arc<PostCollection>,
    public: Arc<PostCollection>,
}

/// Lazily loaded, explicitly reloadable post collection
pub struct ContentStore {
    site: Site,
    snapshot: RwLock<Option<Snapshot>>,
}

impl ContentStore {
    /// Create an empty store; nothing is read from disk yet
    pub fn new(site: Site) -> Self {
        Self {
            site,
            snapshot: RwLock::new(None),
        }
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// The current collection, loading it on first use
    pub fn snapshot(&self) -> Arc<PostCollection> {
        self.current().all
    }

    /// The collection the public sees: published posts only, unless the
    /// site is configured to render drafts
    pub fn public_snapshot(&self) -> Arc<PostCollection> {
        self.current().public
    }

    /// Re-read the content directory and replace the snapshot
    pub fn reload(&self) -> Arc<PostCollection> {
        let loaded = self.load();
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(loaded.clone());
        tracing::info!("Reloaded {} posts", loaded.all.len());
        loaded.all
    }

    /// Drop the snapshot; the next `snapshot()` call reloads
    pub fn invalidate(&self) {
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        tracing::debug!("Content snapshot invalidated");
    }

    /// Whether a snapshot is currently held
    pub fn is_loaded(&self) -> bool {
        self.read_current().is_some()
    }

    fn current(&self) -> Snapshot {
        if let Some(current) = self.read_current() {
            return current;
        }

        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        // Another caller may have loaded while we waited for the lock
        if let Some(current) = guard.as_ref() {
            return current.clone();
        }

        let loaded = self.load();
        *guard = Some(loaded.clone());
        loaded
    }

    fn read_current(&self) -> Option<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn load(&self) -> Snapshot {
        let all = Arc::new(ContentLoader::new(&self.site).load_all());
        let public = if self.site.config.render_drafts {
            Arc::clone(&all)
        } else {
            Arc::new(all.published())
        };
        Snapshot { all, public }
    }
}
