//! Install, remove, and query orchestration

pub mod install;
pub mod query;
pub mod remove;

pub use install::install;
pub use remove::{RemovedPackage, remove};
