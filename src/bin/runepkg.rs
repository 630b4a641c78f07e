//! runepkg CLI Binary
//!
//! The command-line interface for the runepkg package manager.

use clap::{CommandFactory, Parser};

use runepkg_lib::cli::{Cli, Commands, packages, style};
use runepkg_lib::config::Settings;
use runepkg_lib::core::{Context, RunepkgError};

#[cfg(not(target_env = "msvc"))]
use mimalloc::MiMalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing; --verbose raises the default level to debug.
    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    // Completion-script generation needs no configuration.
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "runepkg", &mut std::io::stdout());
        return 0;
    }

    match dispatch(cli) {
        Ok(()) => 0,
        Err(err) => {
            // The suggestion path already printed its candidate list.
            if !matches!(err, RunepkgError::SuggestionsShown { .. }) {
                eprintln!("{}", style::error(&err.to_string()));
            }
            err.exit_code()
        }
    }
}

fn dispatch(cli: Cli) -> Result<(), RunepkgError> {
    let settings = Settings::load()?;
    let ctx = Context::open(settings, cli.force, cli.verbose)?;

    match cli.command {
        Commands::Install { targets } => packages::install(&ctx, &targets),
        Commands::Remove { spec } => packages::remove(&ctx, &spec),
        Commands::List { pattern } => packages::list(&ctx, pattern.as_deref()),
        Commands::Status { name } => packages::status(&ctx, &name),
        Commands::Search { substring } => packages::search(&ctx, &substring),
        Commands::Complete => packages::complete(&ctx),
        Commands::Completions { .. } => unreachable!("handled before configuration"),
    }
}
