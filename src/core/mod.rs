//! Core module - records, indexes, version engine, and archive reader

pub mod archive;
pub mod context;
pub mod depends;
pub mod error;
pub mod fsops;
pub mod index;
pub mod pkginfo;
pub mod sysinfo;
pub mod version;

pub use context::Context;
pub use error::{Result, RunepkgError};
pub use pkginfo::PkgInfo;
