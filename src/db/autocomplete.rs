//! Persistent completion index for installed packages.
//!
//! A sorted, memory-mapped array of `{name}-{version}` strings so that
//! shell-completion consumers can binary-search without parsing the
//! database. Layout: a fixed header (magic `RUNE`, format version,
//! entry count, string-blob size), `entry_count` u32 offsets, then the
//! NUL-terminated strings in lexicographic order.

use std::fs::File;
use std::io::Write as _;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use memmap2::Mmap;
use tempfile::NamedTempFile;

use crate::core::error::{Result, RunepkgError};
use crate::core::pkginfo::MAGIC;

pub const INDEX_FILE: &str = "runepkg_autocomplete.bin";
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 16;

/// Serialize `entries` (sorted here for idempotence) and rename the
/// result into place, so concurrent readers see either the old or the
/// new index, never a torn one.
pub fn write_index(db_root: &Path, entries: &[String]) -> Result<()> {
    let mut sorted: Vec<&str> = entries.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut blob = Vec::new();
    let mut offsets = Vec::with_capacity(sorted.len());
    for entry in &sorted {
        offsets.push(blob.len() as u32);
        blob.extend_from_slice(entry.as_bytes());
        blob.push(0);
    }

    let mut tmp = NamedTempFile::new_in(db_root)?;
    tmp.write_all(MAGIC)?;
    tmp.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    tmp.write_u32::<LittleEndian>(sorted.len() as u32)?;
    tmp.write_u32::<LittleEndian>(blob.len() as u32)?;
    for offset in &offsets {
        tmp.write_u32::<LittleEndian>(*offset)?;
    }
    tmp.write_all(&blob)?;
    tmp.flush()?;

    let target = db_root.join(INDEX_FILE);
    let file = tmp
        .persist(&target)
        .map_err(|e| RunepkgError::Io(e.error))?;
    file.set_permissions(std::fs::Permissions::from_mode(0o644))?;
    Ok(())
}

/// Read-only view over a completion index.
pub struct AutocompleteIndex {
    mmap: Mmap,
    entry_count: usize,
}

impl AutocompleteIndex {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|_| RunepkgError::NotFound(format!("completion index {}", path.display())))?;

        // SAFETY: the file is opened read-only and the mapping is
        // validated before any string is handed out.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < HEADER_LEN || &mmap[..4] != MAGIC {
            return Err(RunepkgError::corrupt(path, "bad completion index magic"));
        }
        let version = LittleEndian::read_u32(&mmap[4..8]);
        if version != FORMAT_VERSION {
            return Err(RunepkgError::corrupt(
                path,
                format!("unsupported completion index version {version}"),
            ));
        }

        let entry_count = LittleEndian::read_u32(&mmap[8..12]) as usize;
        let strings_size = LittleEndian::read_u32(&mmap[12..16]) as usize;
        if HEADER_LEN + entry_count * 4 + strings_size != mmap.len() {
            return Err(RunepkgError::corrupt(
                path,
                "completion index sections do not add up to the file size",
            ));
        }

        Ok(Self { mmap, entry_count })
    }

    pub fn len(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// The `i`th entry. Offsets come from the file, so a corrupt index
    /// yields `None` rather than a panic.
    pub fn entry(&self, i: usize) -> Option<&str> {
        if i >= self.entry_count {
            return None;
        }
        let offset_pos = HEADER_LEN + i * 4;
        let blob_start = HEADER_LEN + self.entry_count * 4;
        let start = blob_start + LittleEndian::read_u32(&self.mmap[offset_pos..offset_pos + 4]) as usize;

        let rest = self.mmap.get(start..)?;
        let end = memchr::memchr(0, rest)?;
        std::str::from_utf8(&rest[..end]).ok()
    }

    /// Exact-name membership via binary search.
    pub fn contains(&self, entry: &str) -> bool {
        self.binary_search(entry).is_ok()
    }

    /// All entries starting with `prefix`: binary-search to the
    /// insertion point, then scan forward.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let start = match self.binary_search(prefix) {
            Ok(i) | Err(i) => i,
        };

        let mut matches = Vec::new();
        for i in start..self.entry_count {
            match self.entry(i) {
                Some(entry) if entry.starts_with(prefix) => matches.push(entry.to_string()),
                _ => break,
            }
        }
        matches
    }

    fn binary_search(&self, needle: &str) -> std::result::Result<usize, usize> {
        let mut low = 0;
        let mut high = self.entry_count;
        while low < high {
            let mid = (low + high) / 2;
            match self.entry(mid) {
                Some(entry) if entry < needle => low = mid + 1,
                Some(entry) if entry == needle => return Ok(mid),
                _ => high = mid,
            }
        }
        Err(low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn build(entries: &[&str]) -> (TempDir, AutocompleteIndex) {
        let tmp = TempDir::new().unwrap();
        let owned: Vec<String> = entries.iter().map(|s| (*s).to_string()).collect();
        write_index(tmp.path(), &owned).unwrap();
        let index = AutocompleteIndex::open(&tmp.path().join(INDEX_FILE)).unwrap();
        (tmp, index)
    }

    #[test]
    fn entries_are_sorted_and_searchable() {
        let (_tmp, index) = build(&["zlib1g-1.3", "hello-2.12-1", "libssl3-3.0.2"]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.entry(0), Some("hello-2.12-1"));
        assert_eq!(index.entry(2), Some("zlib1g-1.3"));
        assert!(index.contains("libssl3-3.0.2"));
        assert!(!index.contains("libssl3"));
    }

    #[test]
    fn prefix_completion() {
        let (_tmp, index) = build(&["libssl-1.1.1", "libssl3-3.0", "hello-1.0"]);
        assert_eq!(
            index.complete("libssl"),
            vec!["libssl-1.1.1".to_string(), "libssl3-3.0".to_string()]
        );
        assert!(index.complete("nope").is_empty());
        assert_eq!(index.complete("").len(), 3);
    }

    #[test]
    fn empty_index_round_trips() {
        let (_tmp, index) = build(&[]);
        assert!(index.is_empty());
        assert!(index.complete("x").is_empty());
    }

    #[test]
    fn rebuild_is_idempotent_bytewise() {
        let tmp = TempDir::new().unwrap();
        let entries = vec!["b-2".to_string(), "a-1".to_string()];
        write_index(tmp.path(), &entries).unwrap();
        let first = std::fs::read(tmp.path().join(INDEX_FILE)).unwrap();
        write_index(tmp.path(), &entries).unwrap();
        let second = std::fs::read(tmp.path().join(INDEX_FILE)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn open_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(INDEX_FILE);
        std::fs::write(&path, b"not an index").unwrap();
        assert!(AutocompleteIndex::open(&path).is_err());
    }
}
