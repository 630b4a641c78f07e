//! Read-only queries over the installed set.

use memchr::memmem;

use crate::core::context::Context;
use crate::core::error::{Result, RunepkgError};
use crate::core::pkginfo::PkgInfo;

/// Installed directory names, optionally filtered by a prefix, sorted.
pub fn list(ctx: &Context, pattern: Option<&str>) -> Result<Vec<String>> {
    let mut entries = ctx.db().list(pattern)?;
    entries.sort_unstable();
    Ok(entries)
}

/// Full metadata for one package, named exactly or uniquely by prefix.
pub fn status(ctx: &Context, name: &str) -> Result<PkgInfo> {
    let dir_name = resolve_installed_dir(ctx, name)?;
    ctx.db().read_dir_entry(&dir_name)
}

/// `(package, path)` pairs for every payload path containing `needle`.
/// Linear in the total file count; no index is maintained.
pub fn search(ctx: &Context, needle: &str) -> Vec<(String, String)> {
    let finder = memmem::Finder::new(needle.as_bytes());

    let mut hits = Vec::new();
    for info in ctx.installed.snapshot() {
        for path in &info.file_list {
            if finder.find(path.as_bytes()).is_some() {
                hits.push((info.name.clone(), path.clone()));
            }
        }
    }
    hits.sort_unstable();
    hits
}

/// Installed directory names containing `query`, in scan order, capped
/// at `max`.
pub fn suggestions(ctx: &Context, query: &str, max: usize) -> Result<Vec<String>> {
    Ok(ctx
        .db()
        .list(None)?
        .into_iter()
        .filter(|dir| dir.contains(query))
        .take(max)
        .collect())
}

const MAX_SUGGESTIONS: usize = 16;

/// Resolve `input` (a full `{name}-{version}` or a bare name) to one
/// installed directory. Zero or several candidates yield
/// [`RunepkgError::SuggestionsShown`] carrying the candidate list, so
/// callers print it instead of a bare "not found".
pub(crate) fn resolve_installed_dir(ctx: &Context, input: &str) -> Result<String> {
    let dirs = ctx.db().list(None)?;

    if dirs.iter().any(|dir| dir == input) {
        return Ok(input.to_string());
    }

    let mut matches: Vec<String> = dirs
        .iter()
        .filter(|dir| dir.starts_with(input))
        .cloned()
        .collect();
    matches.sort_unstable();

    match matches.len() {
        1 => Ok(matches.swap_remove(0)),
        0 => {
            let mut candidates = suggestions(ctx, input, MAX_SUGGESTIONS)?;
            candidates.sort_unstable();
            Err(RunepkgError::SuggestionsShown {
                query: input.to_string(),
                candidates,
            })
        }
        _ => Err(RunepkgError::SuggestionsShown {
            query: input.to_string(),
            candidates: matches,
        }),
    }
}
