//! In-memory package indexes.
//!
//! Two maps back the constraint checks: the installed index mirrors the
//! on-disk database, and the installing index tracks names that are
//! mid-install so dependency cycles short-circuit instead of recursing
//! forever.

use ahash::{AHashMap, AHashSet};
use parking_lot::{Mutex, RwLock};

use crate::core::pkginfo::PkgInfo;

/// Name-keyed map of everything currently installed. Mutated only by
/// the orchestrator; workers never touch it.
#[derive(Default)]
pub struct InstalledIndex {
    map: RwLock<AHashMap<String, PkgInfo>>,
}

impl InstalledIndex {
    pub fn insert(&self, info: PkgInfo) {
        self.map.write().insert(info.name.clone(), info);
    }

    pub fn remove(&self, name: &str) -> Option<PkgInfo> {
        self.map.write().remove(name)
    }

    pub fn get(&self, name: &str) -> Option<PkgInfo> {
        self.map.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Snapshot of every record, for linear scans.
    pub fn snapshot(&self) -> Vec<PkgInfo> {
        self.map.read().values().cloned().collect()
    }
}

/// Names that are mid-install during the current invocation. Entries
/// live only while an [`InstallingGuard`] is held.
#[derive(Default)]
pub struct InstallingIndex {
    set: Mutex<AHashSet<String>>,
}

impl InstallingIndex {
    /// Mark `name` as in flight. Returns `None` if it already is, which
    /// is how dependency cycles are broken.
    pub fn try_enter<'a>(&'a self, name: &str) -> Option<InstallingGuard<'a>> {
        if self.set.lock().insert(name.to_string()) {
            Some(InstallingGuard {
                index: self,
                name: name.to_string(),
            })
        } else {
            None
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.set.lock().contains(name)
    }
}

/// Removes its name from the installing index when dropped, so the
/// entry is released on every exit path of an install.
pub struct InstallingGuard<'a> {
    index: &'a InstallingIndex,
    name: String,
}

impl Drop for InstallingGuard<'_> {
    fn drop(&mut self) {
        self.index.set.lock().remove(&self.name);
    }
}
