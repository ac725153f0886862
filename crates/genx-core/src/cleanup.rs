//! Stale-file sweeper, run as an after-generate extension.
//!
//! Every directory that received a generated file in the current run is
//! walked; any file whose basename matches the generated-file pattern but
//! was not produced this run is deleted. Files elsewhere, and files not
//! matching the pattern, are never touched.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;
use walkdir::WalkDir;

use crate::extension::{Extension, Runtime};
use crate::scope::Scope;
use crate::{Error, Result};

/// Matches the basename of any pipeline-generated file (`*.genx.<ext>`).
pub static GENERATED_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.genx\.\w+$").expect("valid pattern"));

/// True when `basename` carries the generated-file suffix.
#[must_use]
pub fn is_generated_basename(basename: &str) -> bool {
    GENERATED_FILE_RE.is_match(basename)
}

/// The cleanup extension. Register it last so it observes every result.
#[derive(Debug, Default)]
pub struct CleanupExtension;

impl CleanupExtension {
    /// Build the extension.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Extension for CleanupExtension {
    fn name(&self) -> &str {
        "cleanup"
    }

    fn after_generate(&mut self, scope: &Scope, runtime: &mut Runtime) -> Result<()> {
        // Directory → basenames written in this run.
        let mut dir_to_files: BTreeMap<PathBuf, BTreeSet<String>> = BTreeMap::new();
        for file in runtime.files() {
            let abs = runtime.config.output_dir.join(&file.rel_path);
            let Some(dir) = abs.parent() else { continue };
            let Some(base) = abs.file_name().and_then(|b| b.to_str()) else {
                continue;
            };
            dir_to_files
                .entry(dir.to_path_buf())
                .or_default()
                .insert(base.to_string());
        }

        // Walks from nested receiving directories can overlap; every file is
        // judged against its own parent's set, and candidates are collected
        // first so each stale file is removed exactly once.
        let mut stale: BTreeSet<PathBuf> = BTreeSet::new();
        for dir in dir_to_files.keys() {
            for entry in WalkDir::new(dir).follow_links(false) {
                scope.checkpoint()?;
                let entry = entry.map_err(|e| Error::Io {
                    path: dir.clone(),
                    source: e.into(),
                })?;
                if entry.file_type().is_dir() {
                    continue;
                }
                let Some(base) = entry.file_name().to_str() else { continue };
                if !is_generated_basename(base) {
                    continue;
                }
                let Some(current) = entry.path().parent().and_then(|p| dir_to_files.get(p))
                else {
                    continue;
                };
                if !current.contains(base) {
                    stale.insert(entry.path().to_path_buf());
                }
            }
        }

        for path in stale {
            scope.checkpoint()?;
            fs::remove_file(&path).map_err(|source| Error::Io { path: path.clone(), source })?;
            info!(path = %path.display(), "removed stale generated file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{Config, ExtensionResult};
    use crate::file::File;

    #[test]
    fn suffix_pattern_matches_generated_names_only() {
        assert!(is_generated_basename("models.genx.go"));
        assert!(is_generated_basename("schema.genx.graphql"));
        assert!(!is_generated_basename("models.go"));
        assert!(!is_generated_basename("genx.go"));
        assert!(!is_generated_basename("models.genx.go.bak"));
    }

    fn runtime_with(dir: &std::path::Path, rel_paths: &[&str]) -> Runtime {
        let mut runtime = Runtime::new(Config {
            output_dir: dir.to_path_buf(),
            prototype_rel_pattern: "prototype.graphql".to_string(),
            go_module: String::new(),
        });
        runtime.results.insert(
            "relay".to_string(),
            ExtensionResult {
                files: rel_paths.iter().map(|p| File::new(*p, "")).collect(),
                metadata: None,
            },
        );
        runtime
    }

    #[test]
    fn removes_only_stale_generated_files_in_touched_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("server/model");
        let other = dir.path().join("server/other");
        std::fs::create_dir_all(&model).unwrap();
        std::fs::create_dir_all(&other).unwrap();

        std::fs::write(model.join("models.genx.go"), "current").unwrap();
        std::fs::write(model.join("stale.genx.go"), "stale").unwrap();
        std::fs::write(model.join("user.go"), "hand-written").unwrap();
        std::fs::write(other.join("stale.genx.go"), "untouched dir").unwrap();

        let mut runtime = runtime_with(dir.path(), &["server/model/models.genx.go"]);
        CleanupExtension::new()
            .after_generate(&Scope::new(), &mut runtime)
            .unwrap();

        assert!(model.join("models.genx.go").exists());
        assert!(!model.join("stale.genx.go").exists());
        assert!(model.join("user.go").exists());
        assert!(other.join("stale.genx.go").exists(), "untouched dirs are out of scope");
    }

    #[test]
    fn root_level_walks_do_not_sweep_current_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("server/model");
        std::fs::create_dir_all(&model).unwrap();

        std::fs::write(dir.path().join("schema.genx.graphql"), "current").unwrap();
        std::fs::write(dir.path().join("old.genx.graphql"), "stale").unwrap();
        std::fs::write(model.join("models.genx.go"), "current").unwrap();

        let mut runtime = runtime_with(
            dir.path(),
            &["schema.genx.graphql", "server/model/models.genx.go"],
        );
        CleanupExtension::new()
            .after_generate(&Scope::new(), &mut runtime)
            .unwrap();

        assert!(dir.path().join("schema.genx.graphql").exists());
        assert!(!dir.path().join("old.genx.graphql").exists());
        assert!(
            model.join("models.genx.go").exists(),
            "the root walk must not sweep another receiving directory's files"
        );
    }
}
