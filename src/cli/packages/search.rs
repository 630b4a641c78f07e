//! Search command - substring search over installed file lists.

use crate::cli::style;
use crate::core::context::Context;
use crate::core::error::Result;
use crate::engine::query;

pub fn search(ctx: &Context, substring: &str) -> Result<()> {
    let hits = query::search(ctx, substring);

    if hits.is_empty() {
        println!("{}", style::note(&format!("no installed file matches {substring}")));
        return Ok(());
    }

    for (name, path) in &hits {
        println!("{}: {}", style::pkg(name), style::payload_path(path));
    }
    Ok(())
}
