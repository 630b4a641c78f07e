//! Status command - full metadata dump for one package.

use crate::cli::packages::print_suggestions;
use crate::cli::style;
use crate::core::context::Context;
use crate::core::error::{Result, RunepkgError};
use crate::core::pkginfo::PkgInfo;
use crate::engine::query;

pub fn status(ctx: &Context, name: &str) -> Result<()> {
    match query::status(ctx, name) {
        Ok(info) => {
            print_info(&info);
            Ok(())
        }
        Err(RunepkgError::SuggestionsShown { query, candidates }) => {
            print_suggestions(&query, &candidates);
            Err(RunepkgError::SuggestionsShown { query, candidates })
        }
        Err(err) => Err(err),
    }
}

fn print_info(info: &PkgInfo) {
    println!(
        "{}",
        style::header(&style::pkg_version(&info.name, &info.version))
    );

    let optional = [
        ("Architecture", &info.architecture),
        ("Maintainer", &info.maintainer),
        ("Section", &info.section),
        ("Priority", &info.priority),
        ("Installed-Size", &info.installed_size),
        ("Depends", &info.depends),
        ("Homepage", &info.homepage),
        ("Source", &info.source_filename),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            style::print_kv(key, value);
        }
    }
    if let Some(description) = &info.description {
        style::print_kv("Description", &description.replace('\n', "\n    "));
    }
    style::print_kv("Files", &info.file_list.len().to_string());
}
