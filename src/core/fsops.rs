//! Filesystem primitives shared by the install and remove engines.
//!
//! All payload placement goes through [`join`], which refuses absolute
//! paths and `..` traversal so a package can never write outside the
//! configured target root.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::os::unix::fs::{DirBuilderExt, PermissionsExt, symlink};
use std::path::{Component, Path, PathBuf};

use crate::core::error::{Result, RunepkgError};

/// Join a relative path onto a base directory.
///
/// Fails if `rel` is absolute, contains a `..` component, or the
/// combined path exceeds the platform path limit.
pub fn join(dir: &Path, rel: &str) -> Result<PathBuf> {
    if rel.is_empty() {
        return Err(RunepkgError::InvalidInput("empty relative path".into()));
    }

    let rel_path = Path::new(rel);
    for component in rel_path.components() {
        match component {
            Component::ParentDir => {
                return Err(RunepkgError::InvalidInput(format!(
                    "path {rel} contains a parent-directory component"
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(RunepkgError::InvalidInput(format!("path {rel} is absolute")));
            }
            Component::Normal(_) | Component::CurDir => {}
        }
    }

    let joined = dir.join(rel_path);
    if joined.as_os_str().len() >= libc::PATH_MAX as usize {
        return Err(RunepkgError::InvalidInput(format!(
            "joined path for {rel} exceeds the platform path limit"
        )));
    }

    Ok(joined)
}

/// Create `path` and all missing ancestors with `mode`.
///
/// Already-existing directories are success; a non-directory collision
/// anywhere on the way is an error.
pub fn mkdirs(path: &Path, mode: u32) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(RunepkgError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} exists and is not a directory", path.display()),
            )));
        }
        Err(_) => {}
    }

    fs::DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(path)?;
    Ok(())
}

/// Recursively delete `path`.
///
/// Best-effort: every entry is attempted even after a failure, and an
/// error is returned if any entry could not be removed.
pub fn rmdirs(path: &Path) -> Result<()> {
    let failed = rmdirs_inner(path);
    if failed == 0 {
        Ok(())
    } else {
        Err(RunepkgError::Io(std::io::Error::other(format!(
            "{failed} entries could not be removed under {}",
            path.display()
        ))))
    }
}

fn rmdirs_inner(path: &Path) -> usize {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return 0;
    };

    if !meta.is_dir() {
        return usize::from(fs::remove_file(path).is_err());
    }

    let mut failed = 0;
    match fs::read_dir(path) {
        Ok(entries) => {
            for entry in entries.flatten() {
                failed += rmdirs_inner(&entry.path());
            }
        }
        Err(_) => failed += 1,
    }

    failed + usize::from(fs::remove_dir(path).is_err())
}

/// Buffered byte copy; the destination gets the source's low 9
/// permission bits.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    let src_file = fs::File::open(src)?;
    let mode = src_file.metadata()?.permissions().mode() & 0o777;

    let dst_file = fs::File::create(dst)?;
    let mut reader = BufReader::new(src_file);
    let mut writer = BufWriter::new(dst_file);
    std::io::copy(&mut reader, &mut writer)?;

    fs::set_permissions(dst, fs::Permissions::from_mode(mode))?;
    Ok(())
}

/// Recreate the symlink at `src` as `dst`, replacing any existing entry.
pub fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let target = fs::read_link(src)?;

    match fs::symlink_metadata(dst) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(dst)?,
        Ok(_) => fs::remove_file(dst)?,
        Err(_) => {}
    }

    symlink(&target, dst)?;
    Ok(())
}

/// Recursive sum of regular-file sizes under `path`.
///
/// Symlinks are counted as their own length, never the target's.
pub fn dir_size(path: &Path) -> Result<u64> {
    let meta = fs::symlink_metadata(path)?;
    if !meta.is_dir() {
        return Ok(meta.len());
    }

    let mut total = 0;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if meta.file_type().is_symlink() || meta.is_file() {
            total += meta.len();
        } else if meta.is_dir() {
            total += dir_size(&entry.path())?;
        }
    }
    Ok(total)
}
