//! Remove command.

use crate::cli::packages::print_suggestions;
use crate::cli::style;
use crate::core::context::Context;
use crate::core::error::{Result, RunepkgError};
use crate::engine;

pub fn remove(ctx: &Context, spec: &str) -> Result<()> {
    match engine::remove(ctx, spec) {
        Ok(removed) => {
            println!(
                "{}",
                style::success(&format!(
                    "removed {}",
                    style::pkg_version(&removed.name, &removed.version)
                ))
            );
            Ok(())
        }
        Err(RunepkgError::SuggestionsShown { query, candidates }) => {
            print_suggestions(&query, &candidates);
            Err(RunepkgError::SuggestionsShown { query, candidates })
        }
        Err(RunepkgError::Cancelled) => {
            println!("{}", style::warning("removal cancelled"));
            Err(RunepkgError::Cancelled)
        }
        Err(err) => Err(err),
    }
}
