//! Terminal rendering for runepkg CLI output.
//!
//! Messages carry lowercase severity prefixes in the dpkg tradition
//! (`error: ...`, `warning: ...`) rather than symbol bullets, and
//! package identity always goes through one accent color so it stands
//! out in dependency chatter.

use owo_colors::OwoColorize;

pub fn success(msg: &str) -> String {
    format!("{}: {msg}", "ok".green().bold())
}

pub fn warning(msg: &str) -> String {
    format!("{}: {msg}", "warning".yellow().bold())
}

pub fn error(msg: &str) -> String {
    format!("{}: {msg}", "error".red().bold())
}

/// Section lead-in for the status dump.
pub fn header(msg: &str) -> String {
    format!("{} {msg}", "::".cyan().bold())
}

/// Low-priority chatter: counts, empty-result notes.
pub fn note(msg: &str) -> String {
    msg.dimmed().italic().to_string()
}

/// A package name in the accent color.
pub fn pkg(name: &str) -> String {
    name.cyan().bold().to_string()
}

/// `name version`, the pair runepkg identifies a record by.
pub fn pkg_version(name: &str, version: &str) -> String {
    format!("{} {}", name.cyan().bold(), version.bold())
}

/// A payload path in search output.
pub fn payload_path(path: &str) -> String {
    path.blue().to_string()
}

/// One line of the status dump, key column aligned.
pub fn print_kv(key: &str, value: &str) {
    println!("  {} {value}", format!("{:<15}", format!("{key}:")).bold());
}
