//! Remove orchestration: the reverse of install.
//!
//! Payload files are unlinked first (missing files are not an error),
//! then the database directory goes, then the installed index and the
//! completion index are refreshed.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::context::Context;
use crate::core::error::{Result, RunepkgError};
use crate::core::fsops;
use crate::engine::query::resolve_installed_dir;

/// Identity of a package that was actually removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedPackage {
    pub name: String,
    pub version: String,
}

/// Remove the package named by `spec`, a `{name}-{version}` or a bare
/// name resolved against the database. In verbose mode the user is
/// asked to confirm; declining yields [`RunepkgError::Cancelled`].
pub fn remove(ctx: &Context, spec: &str) -> Result<RemovedPackage> {
    let dir_name = resolve_installed_dir(ctx, spec)?;
    let db = ctx.db();
    let info = db.read_dir_entry(&dir_name)?;

    if ctx.verbose {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Remove {dir_name}?"))
            .default(false)
            .interact()
            .map_err(|e| RunepkgError::Io(std::io::Error::other(e)))?;
        if !confirmed {
            return Err(RunepkgError::Cancelled);
        }
    }

    for rel in &info.file_list {
        let path = match fsops::join(&ctx.settings.install_dir, rel) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(path = %rel, %err, "skipping suspicious payload path");
                continue;
            }
        };
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::debug!(path = %path.display(), %e, "could not unlink");
            }
        }
    }
    prune_empty_dirs(&ctx.settings.install_dir, &info.file_list);

    db.remove_dir_entry(&dir_name)?;
    ctx.installed.remove(&info.name);
    db.rebuild_autocomplete()?;

    tracing::info!(package = %info.name, version = %info.version, "removed");
    Ok(RemovedPackage {
        name: info.name,
        version: info.version,
    })
}

/// Best-effort cleanup of directories the payload left empty. Shared
/// directories still holding other packages' files survive because
/// `remove_dir` refuses non-empty directories.
fn prune_empty_dirs(install_root: &Path, file_list: &[String]) {
    let mut dirs: BTreeSet<PathBuf> = BTreeSet::new();
    for rel in file_list {
        let mut parent = Path::new(rel).parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            dirs.insert(dir.to_path_buf());
            parent = dir.parent();
        }
    }

    let mut dirs: Vec<PathBuf> = dirs.into_iter().collect();
    dirs.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));
    for dir in dirs {
        let _ = fs::remove_dir(install_root.join(dir));
    }
}
