//! Install orchestration.
//!
//! One call installs one `.deb` plus whatever dependencies it can find
//! next to it, recursively. Cycles are broken by the installing index:
//! re-entering a name that is already mid-install short-circuits to
//! success. Metadata is always persisted before payload placement, and
//! the completion index is rebuilt after both.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use ahash::AHashSet;
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::core::archive::{self, DebFilename};
use crate::core::context::Context;
use crate::core::depends::{self, DepAtom};
use crate::core::error::{Result, RunepkgError};
use crate::core::fsops;
use crate::core::pkginfo::PkgInfo;
use crate::core::sysinfo;
use crate::core::version::Version;

/// Per-invocation bookkeeping: dependency names already attempted, so a
/// diamond-shaped graph does not trigger duplicate recursive installs.
#[derive(Default)]
struct InstallSession {
    attempted_deps: AHashSet<String>,
}

/// Install a package named by a `.deb` path or a glob prefix.
pub fn install(ctx: &Context, request: &str) -> Result<()> {
    let mut session = InstallSession::default();
    install_request(ctx, &mut session, request)
}

fn install_request(ctx: &Context, session: &mut InstallSession, request: &str) -> Result<()> {
    let deb_path = resolve_request(request)?;

    // Filename fast path: a `{name}_{version}_*.deb` already installed
    // at that version needs no unpacking unless we are forcing.
    if let Some(parsed) = deb_file_name(&deb_path)
        && let Some(existing) = ctx.installed.get(&parsed.name)
        && existing.version == parsed.version
        && !ctx.force
    {
        tracing::info!(
            package = %parsed.name,
            version = %parsed.version,
            "already installed, skipping"
        );
        return Ok(());
    }

    install_file(ctx, session, &deb_path)
}

fn install_file(ctx: &Context, session: &mut InstallSession, deb_path: &Path) -> Result<()> {
    let started = Instant::now();

    let extracted = archive::extract_deb(deb_path, &ctx.settings.control_dir)?;
    let info = &extracted.info;

    // Cycle break: if this name is already mid-install further up the
    // stack, the dependency edge that brought us here is circular.
    let Some(_guard) = ctx.installing.try_enter(&info.name) else {
        tracing::debug!(package = %info.name, "already installing, breaking cycle");
        return Ok(());
    };

    if let Some(existing) = ctx.installed.get(&info.name) {
        if existing.version == info.version {
            if !ctx.force {
                tracing::info!(package = %info.name, version = %info.version, "already installed");
                return Ok(());
            }
            tracing::info!(package = %info.name, version = %info.version, "reinstalling");
            ctx.db().remove(&existing.name, &existing.version)?;
            ctx.installed.remove(&existing.name);
        } else if ctx.force {
            tracing::info!(
                package = %info.name,
                from = %existing.version,
                to = %info.version,
                "upgrading"
            );
            ctx.db().remove(&existing.name, &existing.version)?;
            ctx.installed.remove(&existing.name);
        } else {
            tracing::error!(
                package = %info.name,
                installed = %existing.version,
                requested = %info.version,
                "already installed at another version, pass --force to upgrade"
            );
            return Err(RunepkgError::AlreadyInstalled {
                name: existing.name,
                version: existing.version,
            });
        }
    }

    resolve_dependencies(ctx, session, info, deb_path)?;

    // Metadata first, so a crash mid-placement leaves a record that the
    // startup scan can reconcile against.
    let db = ctx.db();
    db.create_dir(&info.name, &info.version)?;
    db.write(info)?;
    ctx.installed.insert(info.clone());

    let failures = place_payload(ctx, info, &extracted.data_dir());
    if failures > 0 {
        tracing::warn!(
            package = %info.name,
            failures,
            total = info.file_list.len(),
            "some files could not be placed; the record reflects the intended state"
        );
    }

    db.rebuild_autocomplete()?;

    tracing::debug!(
        package = %info.name,
        version = %info.version,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "install complete"
    );
    Ok(())
}

/// Map an install request to a concrete `.deb` path.
///
/// A path that exists is taken as-is; anything else becomes a glob
/// (`*.deb` appended when absent), tried in the working directory and
/// then under `debs/`. Multiple candidates are ranked by the Debian
/// version embedded in their filenames, highest first.
fn resolve_request(request: &str) -> Result<PathBuf> {
    let direct = Path::new(request);
    if request.ends_with(".deb") && direct.is_file() {
        return Ok(direct.to_path_buf());
    }

    let pattern = if request.ends_with(".deb") {
        request.to_string()
    } else {
        format!("{request}*.deb")
    };

    let mut matches = glob_debs(&pattern)?;
    if matches.is_empty() {
        matches = glob_debs(&format!("debs/{pattern}"))?;
    }
    if matches.is_empty() {
        return Err(RunepkgError::NotFound(format!(
            "no package file matches {request}"
        )));
    }

    matches.sort_by(|a, b| candidate_rank(b).cmp(&candidate_rank(a)));
    Ok(matches.swap_remove(0))
}

fn glob_debs(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .map_err(|e| RunepkgError::InvalidInput(format!("bad pattern {pattern}: {e}")))?;
    Ok(paths.flatten().filter(|p| p.is_file()).collect())
}

/// Ordering key for glob candidates: version from the
/// `name_version_arch.deb` grammar when the filename fits it, with the
/// raw filename as a lexicographic fallback.
fn candidate_rank(path: &Path) -> (Option<Version>, String) {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let version = DebFilename::parse(&file_name).and_then(|f| f.version.parse().ok());
    (version, file_name)
}

fn deb_file_name(path: &Path) -> Option<DebFilename> {
    DebFilename::parse(&path.file_name()?.to_string_lossy())
}

fn resolve_dependencies(
    ctx: &Context,
    session: &mut InstallSession,
    info: &PkgInfo,
    deb_path: &Path,
) -> Result<()> {
    let atoms = depends::parse_depends(info.depends.as_deref().unwrap_or(""))?;
    if atoms.is_empty() {
        return Ok(());
    }

    // A bare relative filename has an empty parent; siblings then live
    // in the working directory.
    let sibling_dir = deb_path.parent().map(|dir| {
        if dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            dir.to_path_buf()
        }
    });
    let mut unsatisfied = Vec::new();

    for atom in &atoms {
        if dependency_satisfied(ctx, atom) {
            continue;
        }

        // One recursive attempt per dependency name per invocation.
        if session.attempted_deps.insert(atom.package.clone()) {
            if let Some(sibling) = find_sibling(sibling_dir.as_deref(), &atom.package)? {
                tracing::info!(dependency = %atom, sibling = %sibling.display(), "installing dependency");
                if let Err(err) = install_file(ctx, session, &sibling) {
                    tracing::warn!(dependency = %atom, %err, "dependency install failed");
                }
            }
        }

        if !dependency_satisfied(ctx, atom) {
            unsatisfied.push(atom.to_string());
        }
    }

    if !unsatisfied.is_empty() && !ctx.force {
        tracing::error!(
            package = %info.name,
            missing = %unsatisfied.join(", "),
            "unsatisfied dependencies, pass --force to install anyway"
        );
        return Err(RunepkgError::ConstraintUnsatisfied(unsatisfied));
    }
    Ok(())
}

fn dependency_satisfied(ctx: &Context, atom: &DepAtom) -> bool {
    // A name that is mid-install further up the stack counts as
    // satisfied; its own install will finish before ours returns.
    if ctx.installing.contains(&atom.package) {
        return true;
    }

    let Some(installed) = ctx.installed.get(&atom.package) else {
        return false;
    };
    match installed.version.parse::<Version>() {
        Ok(version) => atom.is_satisfied_by(&version),
        Err(err) => {
            tracing::warn!(
                package = %atom.package,
                version = %installed.version,
                %err,
                "installed version does not parse, accepting"
            );
            true
        }
    }
}

/// Look for exactly one `{dep_name}*.deb` next to the package being
/// installed. Zero or several matches mean no sibling resolution.
fn find_sibling(dir: Option<&Path>, dep_name: &str) -> Result<Option<PathBuf>> {
    let Some(dir) = dir else {
        return Ok(None);
    };
    let pattern = format!(
        "{}/{}*.deb",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(dep_name)
    );
    let matches = glob_debs(&pattern)?;
    if matches.len() == 1 {
        Ok(matches.into_iter().next())
    } else {
        Ok(None)
    }
}

/// Fan the payload out over a bounded worker pool. Individual failures
/// are counted, logged, and never abort the package.
fn place_payload(ctx: &Context, info: &PkgInfo, data_dir: &Path) -> usize {
    if info.file_list.is_empty() {
        return 0;
    }

    let workers = sysinfo::placement_workers();
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool,
        Err(err) => {
            tracing::warn!(%err, "worker pool unavailable, placing files serially");
            let mut failures = 0;
            for rel in &info.file_list {
                if let Err(err) = place_entry(data_dir, &ctx.settings.install_dir, rel) {
                    tracing::warn!(path = %rel, %err, "failed to place file");
                    failures += 1;
                }
            }
            return failures;
        }
    };

    tracing::debug!(workers, files = info.file_list.len(), "placing payload");
    let bar = if ctx.verbose {
        ProgressBar::new(info.file_list.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    let failures = AtomicUsize::new(0);

    pool.install(|| {
        info.file_list.par_iter().for_each(|rel| {
            if let Err(err) = place_entry(data_dir, &ctx.settings.install_dir, rel) {
                tracing::warn!(path = %rel, %err, "failed to place file");
                failures.fetch_add(1, Ordering::Relaxed);
            }
            bar.inc(1);
        });
    });

    bar.finish_and_clear();
    failures.into_inner()
}

fn place_entry(data_root: &Path, install_root: &Path, rel: &str) -> Result<()> {
    let src = fsops::join(data_root, rel)?;
    // join re-validates, so no entry can land outside the target root.
    let dst = fsops::join(install_root, rel)?;

    let meta = std::fs::symlink_metadata(&src)?;
    if meta.is_dir() {
        return fsops::mkdirs(&dst, 0o755);
    }

    if let Some(parent) = dst.parent() {
        fsops::mkdirs(parent, 0o755)?;
    }
    if meta.file_type().is_symlink() {
        fsops::copy_symlink(&src, &dst)
    } else {
        fsops::copy_file(&src, &dst)
    }
}
