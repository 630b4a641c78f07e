//! Process-wide state, passed explicitly.
//!
//! Everything an operation needs travels in one `Context` value:
//! configured paths, the installed and installing indexes, and the
//! operating flags. Startup builds it by scanning the database root so
//! the in-memory view and the disk agree from the first operation.

use crate::config::Settings;
use crate::core::error::Result;
use crate::core::index::{InstalledIndex, InstallingIndex};
use crate::db::PackageDb;

pub struct Context {
    pub settings: Settings,
    pub installed: InstalledIndex,
    pub installing: InstallingIndex,
    /// Bypass duplicate and unsatisfied-dependency checks.
    pub force: bool,
    /// Detailed logs and interactive remove confirmation.
    pub verbose: bool,
}

impl Context {
    /// Build a context and reconcile the installed index with the
    /// database root.
    pub fn open(settings: Settings, force: bool, verbose: bool) -> Result<Self> {
        let ctx = Self {
            settings,
            installed: InstalledIndex::default(),
            installing: InstallingIndex::default(),
            force,
            verbose,
        };

        for record in ctx.db().scan()? {
            ctx.installed.insert(record);
        }
        tracing::debug!(installed = ctx.installed.len(), "database scan complete");

        Ok(ctx)
    }

    pub fn db(&self) -> PackageDb {
        PackageDb::new(&self.settings.runepkg_db)
    }
}
