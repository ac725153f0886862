//! Typed error enum for the pipeline core.
//!
//! Library consumers can match on specific variants; the CLI converts these
//! to `anyhow::Error` at the binary boundary for richer context messages.
//! Every error bubbles to the top-level generate call; nothing is retried
//! or swallowed.

use std::path::PathBuf;

/// A generated file path claimed by more than one extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCollision {
    /// Relative path of the contested file.
    pub path: String,
    /// Names of every extension that emitted it.
    pub extensions: Vec<String>,
}

fn collision_report(collisions: &[FileCollision]) -> String {
    collisions
        .iter()
        .map(|c| format!("file: {}, extensions: {:?}", c.path, c.extensions))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors produced by the generation pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The pipeline configuration failed validation.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// A prototype SDL file failed to parse.
    #[error("failed to parse schema: {0}")]
    SchemaParse(String),

    /// The merged schema failed validation.
    #[error("failed to validate schema: {0}")]
    SchemaValidate(String),

    /// An enhancement invariant was violated; the message names the
    /// offending `Type.field`.
    #[error("schema invariant violated: {0}")]
    SchemaInvariant(String),

    /// A code emitter could not render its output.
    #[error("failed to render {what}: {message}")]
    TemplateRender {
        /// What was being rendered (e.g. a node name or file kind).
        what: String,
        /// Underlying render failure.
        message: String,
    },

    /// Source surgery failed for one generated file.
    #[error("surgery failed for {path}")]
    Surgery {
        /// Relative path of the generated file under surgery.
        path: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// Two or more extensions emitted the same file path.
    #[error("duplicate generated files:\n{}", collision_report(.0))]
    DuplicateFile(Vec<FileCollision>),

    /// The formatter rejected a file; formatting failures are fatal.
    #[error("failed to format {path}")]
    FormatFailure {
        /// Relative path of the file being formatted.
        path: String,
        /// Formatter failure.
        #[source]
        source: genx_gosrc::Error,
    },

    /// A replacement set was malformed (overlap or out-of-bounds range).
    #[error("replacement error: {0}")]
    Replacement(String),

    /// Reading, writing, or walking the output tree failed.
    #[error("io error on {}", path.display())]
    Io {
        /// The path involved.
        path: PathBuf,
        /// Operating-system error.
        #[source]
        source: std::io::Error,
    },

    /// Go source could not be scanned.
    #[error(transparent)]
    GoSource(#[from] genx_gosrc::Error),

    /// The cancellation scope was triggered.
    #[error("generation cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the pipeline's public API.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time assertion that `Error` is `Send + Sync`.
    const _: () = {
        const fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    };

    #[test]
    fn duplicate_file_report_names_every_claimant() {
        let err = Error::DuplicateFile(vec![FileCollision {
            path: "server/model/models.genx.go".to_string(),
            extensions: vec!["relay".to_string(), "rogue".to_string()],
        }]);
        let text = err.to_string();
        assert!(text.contains("server/model/models.genx.go"));
        assert!(text.contains("relay"));
        assert!(text.contains("rogue"));
    }
}
