//! The extension contract and the per-generation runtime.
//!
//! An extension is a named value contributing before/generate/after behavior
//! to the pipeline. Hooks default to no-ops and an empty result, so an
//! extension implements only what it needs. The runtime carries the loaded
//! schema and the accumulated per-extension results; it is created per
//! top-level generate call and discarded on completion.

use std::collections::BTreeMap;
use std::path::PathBuf;

use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;

use crate::file::File;
use crate::scope::Scope;
use crate::Result;

/// Pipeline configuration. Everything beyond these three values is owned by
/// individual extensions.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the generated tree. The parent directory must exist.
    pub output_dir: PathBuf,
    /// Glob, relative to `output_dir`, matching the prototype SDL files.
    pub prototype_rel_pattern: String,
    /// Go module path forwarded to the code emitters.
    pub go_module: String,
}

/// What one extension's generate hook produced.
#[derive(Debug, Default)]
pub struct ExtensionResult {
    /// Files to be formatted and written by the orchestrator.
    pub files: Vec<File>,
    /// Opaque metadata other extensions may read.
    pub metadata: Option<serde_json::Value>,
}

/// Per-generation state shared with extensions.
///
/// The results map is inserted into exclusively by the orchestrator between
/// extension calls. Extensions may read other entries and may rewrite file
/// *contents* in place (the surgery extension does), but must never insert
/// or remove entries themselves.
pub struct Runtime {
    /// The configuration for this run.
    pub config: Config,
    /// Validated schema; populated by an extension's before hook or by the
    /// orchestrator's load phase, whichever comes first.
    pub schema: Option<Valid<Schema>>,
    /// Extension name → that extension's cumulative result.
    pub results: BTreeMap<String, ExtensionResult>,
}

impl Runtime {
    /// Fresh runtime for one generate call.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, schema: None, results: BTreeMap::new() }
    }

    /// The result stored for `extension_name`, if it ran already.
    #[must_use]
    pub fn result(&self, extension_name: &str) -> Option<&ExtensionResult> {
        self.results.get(extension_name)
    }

    /// Every file registered so far, in extension-name order.
    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.results.values().flat_map(|r| r.files.iter())
    }

    /// Mutable view of every registered file, in extension-name order.
    /// This is the surgery extension's window into sibling results.
    pub fn files_mut(&mut self) -> impl Iterator<Item = &mut File> {
        self.results.values_mut().flat_map(|r| r.files.iter_mut())
    }
}

/// A named component contributing behavior to the pipeline.
///
/// Hooks run in declared extension order within each phase. Any hook error
/// aborts the run. The default implementations are no-ops with an empty
/// generate result.
pub trait Extension {
    /// Stable, unique (case-sensitive) extension name.
    fn name(&self) -> &str;

    /// Runs before the schema load phase.
    ///
    /// # Errors
    ///
    /// Any error aborts the pipeline.
    fn before_generate(&mut self, _scope: &Scope, _runtime: &mut Runtime) -> Result<()> {
        Ok(())
    }

    /// Produces this extension's files and metadata.
    ///
    /// # Errors
    ///
    /// Any error aborts the pipeline.
    fn generate(&mut self, _scope: &Scope, _runtime: &mut Runtime) -> Result<ExtensionResult> {
        Ok(ExtensionResult::default())
    }

    /// Runs after all files have been written.
    ///
    /// # Errors
    ///
    /// Any error aborts the pipeline.
    fn after_generate(&mut self, _scope: &Scope, _runtime: &mut Runtime) -> Result<()> {
        Ok(())
    }
}
