//! List command.

use crate::cli::style;
use crate::core::context::Context;
use crate::core::error::Result;
use crate::engine::query;

pub fn list(ctx: &Context, pattern: Option<&str>) -> Result<()> {
    let entries = query::list(ctx, pattern)?;

    if entries.is_empty() {
        match pattern {
            Some(p) => println!("{}", style::note(&format!("no installed packages match {p}"))),
            None => println!("{}", style::note("no packages installed")),
        }
        return Ok(());
    }

    for entry in &entries {
        println!("{entry}");
    }
    println!(
        "{}",
        style::note(&format!("{} package(s) installed", entries.len()))
    );
    Ok(())
}
