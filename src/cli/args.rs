//! Command-line argument definitions using clap derive macros.

use clap::{Parser, Subcommand};

/// runepkg - a Debian-style binary package manager
///
/// Installs .deb packages onto a configured target root, tracks them in
/// a per-package database, and resolves dependencies with real Debian
/// version ordering.
#[derive(Parser, Debug)]
#[command(name = "runepkg")]
#[command(author = "Runepkg Team")]
#[command(version)]
#[command(about = "A Debian-style binary package manager", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Detailed logs and interactive confirmation for remove
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Bypass duplicate and unsatisfied-dependency checks
    #[arg(short, long, global = true)]
    pub force: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install packages from .deb files
    #[command(visible_alias = "i")]
    Install {
        /// .deb paths, glob prefixes, @listfile, or `-` for stdin
        #[arg(required = true)]
        targets: Vec<String>,
    },

    /// Remove an installed package
    #[command(visible_alias = "r")]
    Remove {
        /// Package name or name-version
        spec: String,
    },

    /// List installed packages
    #[command(visible_alias = "ls")]
    List {
        /// Only show entries starting with this prefix
        pattern: Option<String>,
    },

    /// Show full metadata for an installed package
    Status {
        /// Package name or name-version
        name: String,
    },

    /// Search installed file lists for a substring
    #[command(visible_alias = "s")]
    Search {
        /// Substring to look for in payload paths
        substring: String,
    },

    /// Internal: called by the bash completion shim
    #[command(hide = true)]
    Complete,

    /// Generate a shell completion script
    Completions {
        /// Shell type (bash, zsh, fish, ...)
        shell: clap_complete::Shell,
    },
}
