//! Bash completion shim handler.
//!
//! Invoked with the Bash completion environment (`COMP_LINE`,
//! `COMP_POINT`); prints one candidate per line from the memory-mapped
//! completion index. Every failure is silent: a broken index must never
//! break the user's shell.

use crate::core::context::Context;
use crate::core::error::Result;
use crate::db::autocomplete::{AutocompleteIndex, INDEX_FILE};

pub fn complete(ctx: &Context) -> Result<()> {
    let line = std::env::var("COMP_LINE").unwrap_or_default();
    let point = std::env::var("COMP_POINT")
        .ok()
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(line.len())
        .min(line.len());

    let prefix = current_word(&line, point);

    let index_path = ctx.settings.runepkg_db.join(INDEX_FILE);
    let Ok(index) = AutocompleteIndex::open(&index_path) else {
        return Ok(());
    };

    for candidate in index.complete(prefix) {
        println!("{candidate}");
    }
    Ok(())
}

/// The word being completed: the text after the last whitespace before
/// the cursor.
fn current_word(line: &str, point: usize) -> &str {
    let head = &line[..point];
    match head.rfind(char::is_whitespace) {
        Some(i) => &head[i + 1..],
        None => head,
    }
}
