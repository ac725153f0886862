//! The file value: a relative path paired with its in-memory content.
//!
//! Content is canonical; disk bytes are written verbatim in the pipeline's
//! write phase. Mutation happens only through the replacement engine or the
//! formatter.

use std::path::{Path, PathBuf};

use crate::format::format_text;
use crate::replacement::{apply, Replacement};
use crate::{Error, Result};

/// A generated file: relative output path plus content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Path relative to the pipeline output directory.
    pub rel_path: PathBuf,
    /// Full file content.
    pub content: String,
}

impl File {
    /// Build a file value.
    #[must_use]
    pub fn new(rel_path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self { rel_path: rel_path.into(), content: content.into() }
    }

    /// The path's extension, without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.rel_path).extension().and_then(|e| e.to_str())
    }

    /// Run the formatter dispatcher over the content.
    ///
    /// # Errors
    ///
    /// Formatting failures are fatal and carry this file's relative path.
    pub fn format(&mut self) -> Result<()> {
        match format_text(self.extension(), &self.content) {
            Ok(formatted) => {
                self.content = formatted;
                Ok(())
            }
            Err(source) => Err(Error::FormatFailure {
                path: self.rel_path.display().to_string(),
                source,
            }),
        }
    }

    /// Apply a replacement set to the content, then reformat.
    ///
    /// # Errors
    ///
    /// Fails on overlapping or out-of-range replacements, or when the
    /// rewritten content no longer formats.
    pub fn apply_replacements(&mut self, replacements: &[Replacement]) -> Result<()> {
        self.content = apply(&self.content, replacements).map_err(|e| Error::Surgery {
            path: self.rel_path.display().to_string(),
            source: Box::new(e),
        })?;
        self.format()
    }
}
