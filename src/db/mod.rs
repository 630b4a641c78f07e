//! Persistent package database.
//!
//! The database root is a flat set of `{name}-{version}/` directories,
//! each holding exactly one `pkginfo.bin`. A package counts as
//! installed iff that file exists and carries the right magic. Next to
//! the package directories live the completion index and a flat text
//! package list, both rewritten through temp-and-rename.

pub mod autocomplete;

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::core::error::{Result, RunepkgError};
use crate::core::fsops;
use crate::core::pkginfo::{MAGIC, PkgInfo};

pub const PKGINFO_FILE: &str = "pkginfo.bin";
pub const PACKAGES_LIST: &str = "packages.list";

pub struct PackageDb {
    root: PathBuf,
}

impl PackageDb {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{db_root}/{name}-{version}`.
    pub fn package_path(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(format!("{name}-{version}"))
    }

    pub fn create_dir(&self, name: &str, version: &str) -> Result<()> {
        fsops::mkdirs(&self.package_path(name, version), 0o755)
    }

    /// Write `pkginfo.bin` for `info`, going through a temp file so an
    /// interrupted write can never be mistaken for a valid record.
    pub fn write(&self, info: &PkgInfo) -> Result<()> {
        let dir = self.package_path(&info.name, &info.version);
        fsops::mkdirs(&dir, 0o755)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&info.encode())?;
        tmp.flush()?;
        tmp.persist(dir.join(PKGINFO_FILE))
            .map_err(|e| RunepkgError::Io(e.error))?;
        Ok(())
    }

    pub fn read(&self, name: &str, version: &str) -> Result<PkgInfo> {
        self.read_dir_entry(&format!("{name}-{version}"))
    }

    /// Read the record under `{db_root}/{dir_name}`. The record body is
    /// the authoritative source of the name and version, so callers
    /// never have to split a directory name.
    pub fn read_dir_entry(&self, dir_name: &str) -> Result<PkgInfo> {
        let path = self.root.join(dir_name).join(PKGINFO_FILE);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RunepkgError::NotFound(format!("package record {dir_name}")));
            }
            Err(e) => return Err(e.into()),
        };
        PkgInfo::decode(&bytes, &path)
    }

    /// Whether `dir_name` holds a readable record with the right magic.
    pub fn is_installed_dir(&self, dir_name: &str) -> bool {
        let path = self.root.join(dir_name).join(PKGINFO_FILE);
        let mut magic = [0u8; 4];
        match fs::File::open(&path) {
            Ok(mut file) => {
                use std::io::Read as _;
                file.read_exact(&mut magic).is_ok() && &magic == MAGIC
            }
            Err(_) => false,
        }
    }

    /// Recursively delete one package directory.
    pub fn remove(&self, name: &str, version: &str) -> Result<()> {
        fsops::rmdirs(&self.package_path(name, version))
    }

    pub fn remove_dir_entry(&self, dir_name: &str) -> Result<()> {
        fsops::rmdirs(&self.root.join(dir_name))
    }

    /// Enumerate package directory names, optionally filtered by a name
    /// prefix. Order is the directory scan order; callers sort.
    pub fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            if let Some(prefix) = prefix {
                if !name.starts_with(prefix) {
                    continue;
                }
            }
            names.push(name);
        }
        Ok(names)
    }

    /// Read every valid record, skipping and logging unreadable ones.
    /// This is the startup reconciliation between disk and the
    /// in-memory installed index.
    pub fn scan(&self) -> Result<Vec<PkgInfo>> {
        let mut records = Vec::new();
        for dir_name in self.list(None)? {
            match self.read_dir_entry(&dir_name) {
                Ok(info) => records.push(info),
                Err(err) => {
                    tracing::warn!(entry = %dir_name, %err, "skipping unreadable database entry");
                }
            }
        }
        Ok(records)
    }

    /// Rewrite the completion index and the flat text package list from
    /// the current set of valid entries.
    pub fn rebuild_autocomplete(&self) -> Result<()> {
        fsops::mkdirs(&self.root, 0o755)?;

        let mut entries: Vec<String> = self
            .list(None)?
            .into_iter()
            .filter(|dir| self.is_installed_dir(dir))
            .collect();
        entries.sort_unstable();

        autocomplete::write_index(&self.root, &entries)?;

        let mut flat = String::new();
        for entry in &entries {
            flat.push_str(entry);
            flat.push('\n');
        }
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(flat.as_bytes())?;
        tmp.flush()?;
        tmp.persist(self.root.join(PACKAGES_LIST))
            .map_err(|e| RunepkgError::Io(e.error))?;
        Ok(())
    }
}
