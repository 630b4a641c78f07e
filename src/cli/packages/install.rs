//! Install command: target expansion and per-package reporting.

use std::io::Read as _;

use crate::cli::style;
use crate::core::context::Context;
use crate::core::error::Result;
use crate::engine;

/// Install every requested target. Targets may be `.deb` paths, glob
/// prefixes, `@listfile` references, or `-` for a list on stdin.
pub fn install(ctx: &Context, targets: &[String]) -> Result<()> {
    let requests = expand_targets(targets)?;
    if requests.is_empty() {
        println!("{}", style::warning("nothing to install"));
        return Ok(());
    }

    for request in &requests {
        engine::install(ctx, request)?;
        println!("{}", style::success(&format!("installed {}", style::pkg(request))));
    }
    Ok(())
}

/// Flatten `@listfile` and `-` targets into plain install requests.
/// List files hold one request per line; blank lines and `#` comments
/// are skipped.
fn expand_targets(targets: &[String]) -> Result<Vec<String>> {
    let mut requests = Vec::new();

    for target in targets {
        if let Some(list_path) = target.strip_prefix('@') {
            let content = std::fs::read_to_string(list_path)?;
            push_lines(&content, &mut requests);
        } else if target == "-" {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            push_lines(&content, &mut requests);
        } else {
            requests.push(target.clone());
        }
    }

    Ok(requests)
}

fn push_lines(content: &str, requests: &mut Vec<String>) {
    for line in content.lines() {
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            requests.push(line.to_string());
        }
    }
}
