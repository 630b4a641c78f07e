//! Command-line interface

pub mod args;
pub mod packages;
pub mod style;

pub use args::{Cli, Commands};
