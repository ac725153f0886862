//! Generation pipeline core.
//!
//! `genx` turns a prototype SDL annotated with `@node` into a full server
//! skeleton. This crate owns the machinery every extension shares:
//!
//! - [`File`] and the [`replacement`] engine: byte-range surgery over
//!   in-memory content,
//! - the [`format`] dispatcher: canonical per-extension reformatting,
//! - the [`Extension`] contract and per-run [`Runtime`],
//! - the [`Generator`] orchestrator: seven sequential phases from before
//!   hooks through the after hooks,
//! - the [`CleanupExtension`] sweeper for stale generated files.
//!
//! Actual code generation lives in the extension crates (`genx-relay`,
//! `genx-gosurgery`); this crate never decides *what* to emit.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cleanup;
mod error;
mod extension;
mod file;
pub mod format;
mod generate;
pub mod replacement;
pub mod schema;
mod scope;

pub use cleanup::{is_generated_basename, CleanupExtension, GENERATED_FILE_RE};
pub use error::{Error, FileCollision, Result};
pub use extension::{Config, Extension, ExtensionResult, Runtime};
pub use file::File;
pub use generate::Generator;
pub use replacement::Replacement;
pub use scope::Scope;
