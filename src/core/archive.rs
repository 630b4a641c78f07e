//! `.deb` archive reader.
//!
//! A Debian binary package is an `ar` container holding a
//! `control.tar.*` (metadata) and a `data.tar.*` (payload). Extraction
//! is done fully in-process: the outer container with the `ar` crate,
//! the members with `tar` plus a per-suffix decoder (gz, xz, zst).

use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tempfile::TempDir;

use crate::core::error::{Result, RunepkgError};
use crate::core::fsops;
use crate::core::pkginfo::PkgInfo;

/// An unpacked `.deb`: the parsed record plus the scratch directory
/// holding `control/` and `data/`. The scratch directory is removed
/// when this value drops, on every exit path.
pub struct ExtractedDeb {
    pub info: PkgInfo,
    scratch: TempDir,
}

impl ExtractedDeb {
    pub fn data_dir(&self) -> PathBuf {
        self.scratch.path().join("data")
    }

    pub fn control_dir(&self) -> PathBuf {
        self.scratch.path().join("control")
    }
}

/// Unpack `deb` under a fresh directory in `scratch_root` and build its
/// [`PkgInfo`]. No partial record is returned on error.
pub fn extract_deb(deb: &Path, scratch_root: &Path) -> Result<ExtractedDeb> {
    let deb = deb
        .canonicalize()
        .map_err(|_| RunepkgError::NotFound(format!("package file {}", deb.display())))?;
    if !deb.is_file() {
        return Err(RunepkgError::NotFound(format!(
            "{} is not a regular file",
            deb.display()
        )));
    }

    fsops::mkdirs(scratch_root, 0o755)?;
    let scratch = tempfile::Builder::new()
        .prefix("unpack-")
        .tempdir_in(scratch_root)?;
    let control_dir = scratch.path().join("control");
    let data_dir = scratch.path().join("data");

    let mut seen_control = false;
    let mut seen_data = false;

    let mut outer = ar::Archive::new(File::open(&deb)?);
    while let Some(entry) = outer.next_entry() {
        let entry = entry.map_err(|e| {
            RunepkgError::Extraction(format!("bad ar member in {}: {e}", deb.display()))
        })?;
        let identifier = entry.header().identifier().to_vec();

        if let Some(suffix) = member_suffix(&identifier, b"control.tar") {
            unpack_member(entry, &suffix, &control_dir)?;
            seen_control = true;
        } else if let Some(suffix) = member_suffix(&identifier, b"data.tar") {
            unpack_member(entry, &suffix, &data_dir)?;
            seen_data = true;
        }
    }

    if !seen_control || !seen_data {
        return Err(RunepkgError::Extraction(format!(
            "{} is missing its control.tar.* or data.tar.* member",
            deb.display()
        )));
    }

    let control_file = control_dir.join("control");
    let content = fs::read_to_string(&control_file).map_err(|_| {
        RunepkgError::Extraction(format!("{} carries no control file", deb.display()))
    })?;

    let mut info = parse_control(&content)?;
    info.source_filename = deb
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    info.file_list = collect_file_list(&data_dir)?;

    Ok(ExtractedDeb { info, scratch })
}

fn member_suffix(identifier: &[u8], stem: &[u8]) -> Option<String> {
    identifier
        .strip_prefix(stem)
        .map(|rest| String::from_utf8_lossy(rest).into_owned())
}

fn unpack_member<R: Read>(member: R, suffix: &str, dest: &Path) -> Result<()> {
    let reader: Box<dyn Read> = match suffix {
        "" => Box::new(member),
        ".gz" => Box::new(GzDecoder::new(member)),
        ".xz" => {
            let mut decompressed = Vec::new();
            lzma_rs::xz_decompress(&mut BufReader::new(member), &mut decompressed)
                .map_err(|e| RunepkgError::Extraction(format!("xz decode failed: {e:?}")))?;
            Box::new(Cursor::new(decompressed))
        }
        ".zst" => Box::new(
            ruzstd::decoding::StreamingDecoder::new(member)
                .map_err(|e| RunepkgError::Extraction(format!("zstd decode failed: {e}")))?,
        ),
        other => {
            return Err(RunepkgError::Extraction(format!(
                "unsupported member compression {other}"
            )));
        }
    };

    fsops::mkdirs(dest, 0o755)?;
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);
    archive
        .unpack(dest)
        .map_err(|e| RunepkgError::Extraction(format!("tar unpack failed: {e}")))?;
    Ok(())
}

/// Parse an RFC-822-style control stanza. `Package`, `Version`, and
/// `Architecture` are required; continuation lines (leading whitespace)
/// extend the preceding field.
pub fn parse_control(content: &str) -> Result<PkgInfo> {
    let mut fields: Vec<(String, String)> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if fields.is_empty() {
                continue;
            }
            // A .deb control holds a single stanza.
            break;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            let Some((_, value)) = fields.last_mut() else {
                return Err(RunepkgError::Parse(
                    "continuation line before any control field".into(),
                ));
            };
            value.push('\n');
            value.push_str(line.trim());
        } else if let Some((key, value)) = line.split_once(':') {
            // Really old debs may carry oddly capitalized field names.
            fields.push((key.trim().to_ascii_lowercase(), value.trim().to_string()));
        } else {
            return Err(RunepkgError::Parse(format!("malformed control line: {line}")));
        }
    }

    let mut info = PkgInfo::default();
    for (key, value) in fields {
        match key.as_str() {
            "package" => info.name = value,
            "version" => info.version = value,
            "architecture" => info.architecture = Some(value),
            "maintainer" => info.maintainer = Some(value),
            "description" => info.description = Some(value),
            "depends" => info.depends = Some(value),
            "installed-size" => info.installed_size = Some(value),
            "section" => info.section = Some(value),
            "priority" => info.priority = Some(value),
            "homepage" => info.homepage = Some(value),
            _ => {}
        }
    }

    if info.name.is_empty() {
        return Err(RunepkgError::Parse("control is missing Package".into()));
    }
    if info.version.is_empty() {
        return Err(RunepkgError::Parse("control is missing Version".into()));
    }
    if info.architecture.is_none() {
        return Err(RunepkgError::Parse("control is missing Architecture".into()));
    }

    Ok(info)
}

/// Collect the relative paths of every regular file and symlink under
/// `data_dir`, sorted lexicographically. Directories are recreated on
/// demand at install time and are not recorded.
fn collect_file_list(data_dir: &Path) -> Result<Vec<String>> {
    let mut list = Vec::new();
    walk(data_dir, Path::new(""), &mut list)?;
    list.sort();
    Ok(list)
}

fn walk(dir: &Path, rel: &Path, out: &mut Vec<String>) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let name = entry.file_name();
        let rel_path = rel.join(&name);
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            walk(&entry.path(), &rel_path, out)?;
        } else {
            out.push(rel_path.to_string_lossy().into_owned());
        }
    }
    Ok(())
}

/// The `name_version_arch.deb` filename grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebFilename {
    pub name: String,
    pub version: String,
    pub arch: String,
}

impl DebFilename {
    /// Parse a conventional Debian package filename. Returns `None` for
    /// names that do not follow the grammar.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(".deb")?;
        let mut parts = stem.split('_');
        let (name, version, arch) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || name.is_empty() || version.is_empty() || arch.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            version: version.to_string(),
            arch: arch.to_string(),
        })
    }
}
