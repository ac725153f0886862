//! Go source surgery extension.
//!
//! Runs after the emitting extensions: for every output directory that
//! received a `*.genx.go` file this run, the hand-written `.go` files
//! already on disk are scanned for top-level identifiers, and each
//! generated file in that directory is rewritten so that
//!
//! - declarations the user already provides are commented out, and
//! - generated functions with a matching user `Hook*`/`hook*` function
//!   delegate through it.
//!
//! Directories without user files are left untouched. The rewrite happens
//! in place on the sibling extensions' in-memory files, before the
//! pipeline's format and write phases.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use genx_core::{Error, Extension, ExtensionResult, File, Result, Runtime, Scope};
use tracing::debug;
use walkdir::WalkDir;

mod surgery;

use surgery::{ident_marks, refactor_replacements};

fn is_generated_go(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".genx.go"))
}

fn is_user_go(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".go") && !n.ends_with(".genx.go"))
}

fn surgery_error(path: &Path, source: Error) -> Error {
    Error::Surgery {
        path: path.display().to_string(),
        source: Box::new(source),
    }
}

/// Rewrite one generated file against a user identifier set: compute the
/// replacements, apply them, reformat, and re-parse as a consistency check.
fn refactor_file(file: &mut File, user_marks: &BTreeSet<String>) -> Result<()> {
    let replacements = refactor_replacements(&file.content, user_marks)
        .map_err(|e| surgery_error(&file.rel_path, e))?;
    if replacements.is_empty() {
        return Ok(());
    }
    file.apply_replacements(&replacements)?;
    genx_gosrc::decl::parse_file(&file.content)
        .map_err(|e| surgery_error(&file.rel_path, e.into()))?;
    Ok(())
}

/// Reconcile in-memory generated Go files with hand-written ones.
///
/// Exposed for direct use and for tests; the [`GosurgeryExtension`] wires
/// this into the pipeline with user files collected from the output tree.
///
/// # Errors
///
/// Per-file failures are wrapped in [`Error::Surgery`] with the file's
/// relative path.
pub fn surgery(generated: &mut [File], user: &[File]) -> Result<()> {
    let mut user_marks = BTreeSet::new();
    let mut user_count = 0usize;
    for file in user.iter().filter(|f| f.extension() == Some("go")) {
        let decls = genx_gosrc::decl::parse_file(&file.content)
            .map_err(|e| surgery_error(&file.rel_path, e.into()))?;
        user_marks.extend(ident_marks(&decls));
        user_count += 1;
    }
    if user_count == 0 {
        return Ok(());
    }

    for file in generated
        .iter_mut()
        .filter(|f| f.extension() == Some("go"))
    {
        refactor_file(file, &user_marks)?;
    }
    Ok(())
}

/// The surgery extension. Register it after every emitting extension.
#[derive(Debug, Default)]
pub struct GosurgeryExtension;

impl GosurgeryExtension {
    /// Build the extension.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Extension for GosurgeryExtension {
    fn name(&self) -> &str {
        "gosurgery"
    }

    fn generate(&mut self, scope: &Scope, runtime: &mut Runtime) -> Result<ExtensionResult> {
        // Directories that received a generated Go file this run.
        let dirs: BTreeSet<PathBuf> = runtime
            .files()
            .filter(|f| is_generated_go(&f.rel_path))
            .filter_map(|f| f.rel_path.parent().map(Path::to_path_buf))
            .collect();

        // Collect the user identifier set of each directory from disk.
        let mut user_sets: BTreeMap<PathBuf, BTreeSet<String>> = BTreeMap::new();
        for dir in &dirs {
            scope.checkpoint()?;
            let abs = runtime.config.output_dir.join(dir);
            if !abs.exists() {
                continue;
            }
            let mut marks = BTreeSet::new();
            let mut count = 0usize;
            for entry in WalkDir::new(&abs).follow_links(false) {
                let entry = entry.map_err(|e| Error::Io {
                    path: abs.clone(),
                    source: e.into(),
                })?;
                if entry.file_type().is_dir() || !is_user_go(entry.path()) {
                    continue;
                }
                let text = fs::read_to_string(entry.path()).map_err(|source| Error::Io {
                    path: entry.path().to_path_buf(),
                    source,
                })?;
                let decls = genx_gosrc::decl::parse_file(&text)
                    .map_err(|e| surgery_error(entry.path(), e.into()))?;
                marks.extend(ident_marks(&decls));
                count += 1;
            }
            if count > 0 {
                user_sets.insert(dir.clone(), marks);
            }
        }

        // Rewrite sibling extensions' files in place.
        for file in runtime.files_mut() {
            if !is_generated_go(&file.rel_path) {
                continue;
            }
            let Some(marks) = file.rel_path.parent().and_then(|d| user_sets.get(d)) else {
                continue;
            };
            scope.checkpoint()?;
            debug!(path = %file.rel_path.display(), "running surgery");
            refactor_file(file, marks)?;
        }

        Ok(ExtensionResult::default())
    }
}
