//! The canonical in-memory package record and its binary encoding.
//!
//! `pkginfo.bin` layout:
//!   - fixed header: 4-byte magic `RUNE`, 64-byte NUL-padded name,
//!     64-byte NUL-padded version, u32 LE offset of the body;
//!   - body: length-prefixed strings (u64 LE length, 0 = absent) in a
//!     fixed field order, starting with the name and version in full;
//!   - u32 LE file count followed by that many length-prefixed paths.
//!
//! The header name/version are truncated convenience copies for
//! scavenging tools; the body strings are authoritative.

use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::core::error::{Result, RunepkgError};

pub const MAGIC: &[u8; 4] = b"RUNE";

const HEADER_NAME_LEN: usize = 64;
const HEADER_LEN: usize = 4 + HEADER_NAME_LEN * 2 + 4;

/// Upper bound on `file_count`, capping allocations when reading an
/// untrusted record.
pub const MAX_FILE_COUNT: u32 = 1_000_000;

/// Metadata and file list of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PkgInfo {
    pub name: String,
    pub version: String,
    pub architecture: Option<String>,
    pub maintainer: Option<String>,
    pub description: Option<String>,
    pub depends: Option<String>,
    pub installed_size: Option<String>,
    pub section: Option<String>,
    pub priority: Option<String>,
    pub homepage: Option<String>,
    pub source_filename: Option<String>,
    /// Relative paths of regular files and symlinks in the payload, in
    /// lexicographic order. Validated to stay under the target root.
    pub file_list: Vec<String>,
}

impl PkgInfo {
    /// Directory name of this record under the database root.
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Serialize to the `pkginfo.bin` byte layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + 256 + self.file_list.len() * 48);

        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&padded_header_field(&self.name));
        out.extend_from_slice(&padded_header_field(&self.version));
        out.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());

        write_string(&mut out, Some(&self.name));
        write_string(&mut out, Some(&self.version));
        write_string(&mut out, self.architecture.as_deref());
        write_string(&mut out, self.maintainer.as_deref());
        write_string(&mut out, self.description.as_deref());
        write_string(&mut out, self.depends.as_deref());
        write_string(&mut out, self.installed_size.as_deref());
        write_string(&mut out, self.section.as_deref());
        write_string(&mut out, self.priority.as_deref());
        write_string(&mut out, self.homepage.as_deref());
        write_string(&mut out, self.source_filename.as_deref());

        out.extend_from_slice(&(self.file_list.len() as u32).to_le_bytes());
        for path in &self.file_list {
            write_string(&mut out, Some(path));
        }

        out
    }

    /// Deserialize a `pkginfo.bin` image. `origin` names the file in
    /// corruption errors.
    pub fn decode(bytes: &[u8], origin: &Path) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(RunepkgError::corrupt(origin, "shorter than the fixed header"));
        }
        if &bytes[..4] != MAGIC {
            return Err(RunepkgError::corrupt(origin, "bad magic"));
        }

        let mut cursor = Cursor::new(&bytes[4 + HEADER_NAME_LEN * 2..]);
        let data_offset = cursor.read_u32::<LittleEndian>()? as usize;
        if data_offset < HEADER_LEN || data_offset > bytes.len() {
            return Err(RunepkgError::corrupt(origin, "body offset out of range"));
        }

        let mut cursor = Cursor::new(&bytes[data_offset..]);
        let name = read_string(&mut cursor, origin)?
            .ok_or_else(|| RunepkgError::corrupt(origin, "record has no name"))?;
        let version = read_string(&mut cursor, origin)?
            .ok_or_else(|| RunepkgError::corrupt(origin, "record has no version"))?;

        let mut info = Self {
            name,
            version,
            architecture: read_string(&mut cursor, origin)?,
            maintainer: read_string(&mut cursor, origin)?,
            description: read_string(&mut cursor, origin)?,
            depends: read_string(&mut cursor, origin)?,
            installed_size: read_string(&mut cursor, origin)?,
            section: read_string(&mut cursor, origin)?,
            priority: read_string(&mut cursor, origin)?,
            homepage: read_string(&mut cursor, origin)?,
            source_filename: read_string(&mut cursor, origin)?,
            file_list: Vec::new(),
        };

        let file_count = cursor.read_u32::<LittleEndian>().map_err(|_| {
            RunepkgError::corrupt(origin, "truncated before the file count")
        })?;
        if file_count > MAX_FILE_COUNT {
            return Err(RunepkgError::corrupt(
                origin,
                format!("file count {file_count} exceeds the limit"),
            ));
        }

        info.file_list.reserve(file_count as usize);
        for _ in 0..file_count {
            let path = read_string(&mut cursor, origin)?
                .ok_or_else(|| RunepkgError::corrupt(origin, "empty path in file list"))?;
            if !is_safe_relative_path(&path) {
                return Err(RunepkgError::corrupt(
                    origin,
                    format!("file list entry {path} is absolute or traverses upward"),
                ));
            }
            info.file_list.push(path);
        }

        Ok(info)
    }
}

/// Payload paths must be relative and free of `..` segments.
fn is_safe_relative_path(path: &str) -> bool {
    !path.starts_with('/') && !path.split('/').any(|segment| segment == "..")
}

fn padded_header_field(value: &str) -> [u8; HEADER_NAME_LEN] {
    let mut field = [0u8; HEADER_NAME_LEN];
    let bytes = value.as_bytes();
    // Truncate at a char boundary so the copy stays valid UTF-8.
    let mut len = bytes.len().min(HEADER_NAME_LEN);
    while len > 0 && !value.is_char_boundary(len) {
        len -= 1;
    }
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

fn write_string(out: &mut Vec<u8>, value: Option<&str>) {
    match value {
        None | Some("") => out.extend_from_slice(&0u64.to_le_bytes()),
        Some(s) => {
            out.extend_from_slice(&(s.len() as u64).to_le_bytes());
            out.extend_from_slice(s.as_bytes());
        }
    }
}

fn read_string(cursor: &mut Cursor<&[u8]>, origin: &Path) -> Result<Option<String>> {
    let len = cursor
        .read_u64::<LittleEndian>()
        .map_err(|_| RunepkgError::corrupt(origin, "truncated length prefix"))?;
    if len == 0 {
        return Ok(None);
    }

    let remaining = cursor.get_ref().len() as u64 - cursor.position();
    if len > remaining {
        return Err(RunepkgError::corrupt(
            origin,
            format!("declared length {len} exceeds the remaining {remaining} bytes"),
        ));
    }

    let start = cursor.position() as usize;
    let end = start + len as usize;
    let raw = &cursor.get_ref()[start..end];
    cursor.set_position(end as u64);

    let s = std::str::from_utf8(raw)
        .map_err(|_| RunepkgError::corrupt(origin, "string is not valid UTF-8"))?;
    Ok(Some(s.to_string()))
}
