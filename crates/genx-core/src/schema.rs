//! Prototype SDL loading for the schema phase.
//!
//! The orchestrator loads and validates every SDL file matching the
//! prototype pattern when no extension has already populated the runtime's
//! schema slot. Extensions that do their own enhancement reuse
//! [`glob_sources`] so file discovery behaves identically everywhere.

use std::fs;
use std::path::PathBuf;

use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;

use crate::extension::Config;
use crate::{Error, Result};

/// One discovered SDL source: path plus full text.
#[derive(Debug, Clone)]
pub struct SdlSource {
    /// Path on disk.
    pub path: PathBuf,
    /// File content.
    pub text: String,
}

/// Collect the SDL files matching `pattern` relative to `output_dir`,
/// in sorted path order.
///
/// # Errors
///
/// Fails when the pattern is malformed ([`Error::ConfigInvalid`]), matches
/// nothing ([`Error::SchemaParse`]), or a matched file cannot be read.
pub fn glob_sources(config: &Config) -> Result<Vec<SdlSource>> {
    let pattern = config.output_dir.join(&config.prototype_rel_pattern);
    let pattern = pattern.to_str().ok_or_else(|| {
        Error::ConfigInvalid(format!("prototype pattern is not valid UTF-8: {pattern:?}"))
    })?;

    let mut paths: Vec<PathBuf> = glob::glob(pattern)
        .map_err(|e| Error::ConfigInvalid(format!("bad prototype pattern `{pattern}`: {e}")))?
        .filter_map(std::result::Result::ok)
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(Error::SchemaParse(format!(
            "no schema files match pattern `{pattern}`"
        )));
    }

    paths
        .into_iter()
        .map(|path| {
            let text = fs::read_to_string(&path)
                .map_err(|source| Error::Io { path: path.clone(), source })?;
            Ok(SdlSource { path, text })
        })
        .collect()
}

/// Load, merge, and validate the prototype schema.
///
/// # Errors
///
/// Propagates discovery errors from [`glob_sources`]; parse failures map to
/// [`Error::SchemaParse`] and validation failures to [`Error::SchemaValidate`].
pub fn load_schema(config: &Config) -> Result<Valid<Schema>> {
    let sources = glob_sources(config)?;

    let mut builder = Schema::builder();
    for source in sources {
        builder = builder.parse(source.text, source.path);
    }
    let schema = builder
        .build()
        .map_err(|e| Error::SchemaParse(e.to_string()))?;
    schema
        .validate()
        .map_err(|e| Error::SchemaValidate(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path) -> Config {
        Config {
            output_dir: dir.to_path_buf(),
            prototype_rel_pattern: "*.graphql".to_string(),
            go_module: "example.com/app".to_string(),
        }
    }

    #[test]
    fn missing_files_error_mentions_the_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let err = glob_sources(&config(dir.path())).unwrap_err();
        assert!(err.to_string().contains("*.graphql"));
    }

    #[test]
    fn loads_and_validates_a_prototype() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("prototype.graphql"),
            "type Query { ping: String }\n",
        )
        .unwrap();

        let schema = load_schema(&config(dir.path())).unwrap();
        assert!(schema.types.contains_key("Query"));
    }

    #[test]
    fn invalid_sdl_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.graphql"), "type {{{\n").unwrap();

        assert!(matches!(
            load_schema(&config(dir.path())),
            Err(Error::SchemaParse(_))
        ));
    }
}
