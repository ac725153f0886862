//! The pipeline orchestrator.
//!
//! Runs extensions through seven strictly sequential phases:
//!
//! 1. before hooks, in declared order
//! 2. schema load, unless an extension already populated the runtime
//! 3. generate hooks, results stored under each extension's name
//! 4. duplicate-path check across all results
//! 5. format every file through the dispatcher
//! 6. write, creating parent directories as needed
//! 7. after hooks
//!
//! Every phase short-circuits on the first error. Partial writes from phase
//! 6 are not rolled back: the output directory is regenerable, not
//! transactional.

use std::collections::BTreeMap;
use std::fs;

use tracing::{debug, info};

use crate::error::FileCollision;
use crate::extension::{Config, Extension, Runtime};
use crate::schema::load_schema;
use crate::scope::Scope;
use crate::{Error, Result};

/// Builder for one generation run: configuration plus an ordered extension
/// list.
#[must_use]
pub struct Generator {
    config: Config,
    extensions: Vec<Box<dyn Extension>>,
}

impl Generator {
    /// Start a run over `config` with no extensions registered yet.
    pub fn new(config: Config) -> Self {
        Self { config, extensions: Vec::new() }
    }

    /// Append an extension; order of registration is execution order.
    pub fn extension(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Run the full pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first failure from any phase; see [`Error`] for the kinds.
    pub fn run(mut self, scope: &Scope) -> Result<()> {
        validate(&self.config, &self.extensions)?;
        let mut runtime = Runtime::new(self.config);

        debug!("phase: before-generate");
        for ext in &mut self.extensions {
            scope.checkpoint()?;
            ext.before_generate(scope, &mut runtime)?;
        }

        if runtime.schema.is_none() {
            debug!("phase: schema load");
            scope.checkpoint()?;
            runtime.schema = Some(load_schema(&runtime.config)?);
        }

        debug!("phase: generate");
        for ext in &mut self.extensions {
            scope.checkpoint()?;
            let result = ext.generate(scope, &mut runtime)?;
            runtime.results.insert(ext.name().to_string(), result);
        }

        debug!("phase: duplicate check");
        check_duplicate_files(&runtime)?;

        debug!("phase: format");
        for file in runtime.files_mut() {
            scope.checkpoint()?;
            file.format()?;
        }

        debug!("phase: write");
        write_files(scope, &runtime)?;

        debug!("phase: after-generate");
        for ext in &mut self.extensions {
            scope.checkpoint()?;
            ext.after_generate(scope, &mut runtime)?;
        }

        Ok(())
    }
}

fn validate(config: &Config, extensions: &[Box<dyn Extension>]) -> Result<()> {
    if config.output_dir.as_os_str().is_empty() {
        return Err(Error::ConfigInvalid("output dir is required".to_string()));
    }
    if config.prototype_rel_pattern.is_empty() {
        return Err(Error::ConfigInvalid(
            "prototype rel pattern is required".to_string(),
        ));
    }
    if extensions.is_empty() {
        return Err(Error::ConfigInvalid("no extensions".to_string()));
    }

    let mut seen = BTreeMap::new();
    for ext in extensions {
        *seen.entry(ext.name().to_string()).or_insert(0u32) += 1;
    }
    let duplicated: Vec<String> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name)
        .collect();
    if !duplicated.is_empty() {
        return Err(Error::ConfigInvalid(format!(
            "duplicated extensions: {duplicated:?}"
        )));
    }
    Ok(())
}

/// Build path → claimants and fail when any path has more than one.
fn check_duplicate_files(runtime: &Runtime) -> Result<()> {
    let mut claims: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (ext_name, result) in &runtime.results {
        for file in &result.files {
            claims
                .entry(file.rel_path.display().to_string())
                .or_default()
                .push(ext_name.clone());
        }
    }

    let collisions: Vec<FileCollision> = claims
        .into_iter()
        .filter(|(_, extensions)| extensions.len() > 1)
        .map(|(path, extensions)| FileCollision { path, extensions })
        .collect();
    if collisions.is_empty() {
        Ok(())
    } else {
        Err(Error::DuplicateFile(collisions))
    }
}

fn write_files(scope: &Scope, runtime: &Runtime) -> Result<()> {
    for file in runtime.files() {
        scope.checkpoint()?;
        let path = runtime.config.output_dir.join(&file.rel_path);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| Error::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, &file.content).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "wrote generated file");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ExtensionResult;
    use crate::file::File;

    struct Named(&'static str);

    impl Extension for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn config(dir: &std::path::Path) -> Config {
        Config {
            output_dir: dir.to_path_buf(),
            prototype_rel_pattern: "prototype.graphql".to_string(),
            go_module: "example.com/app".to_string(),
        }
    }

    #[test]
    fn rejects_empty_output_dir() {
        let err = Generator::new(Config {
            output_dir: std::path::PathBuf::new(),
            prototype_rel_pattern: "x".to_string(),
            go_module: String::new(),
        })
        .extension(Named("a"))
        .run(&Scope::new())
        .unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid(_)));
    }

    #[test]
    fn rejects_duplicate_extension_names() {
        let dir = tempfile::tempdir().unwrap();
        let err = Generator::new(config(dir.path()))
            .extension(Named("a"))
            .extension(Named("a"))
            .run(&Scope::new())
            .unwrap_err();
        assert!(err.to_string().contains("duplicated extensions"));
    }

    #[test]
    fn rejects_missing_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let err = Generator::new(config(dir.path())).run(&Scope::new()).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid(_)));
    }

    struct Emits {
        name: &'static str,
        path: &'static str,
    }

    impl Extension for Emits {
        fn name(&self) -> &str {
            self.name
        }

        fn generate(&mut self, _: &Scope, _: &mut Runtime) -> Result<ExtensionResult> {
            Ok(ExtensionResult {
                files: vec![File::new(self.path, "package model\n")],
                metadata: None,
            })
        }
    }

    #[test]
    fn duplicate_paths_fail_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("prototype.graphql"),
            "type Query { ping: String }\n",
        )
        .unwrap();

        let err = Generator::new(config(dir.path()))
            .extension(Emits { name: "first", path: "server/model/models.genx.go" })
            .extension(Emits { name: "second", path: "server/model/models.genx.go" })
            .run(&Scope::new())
            .unwrap_err();

        let Error::DuplicateFile(collisions) = &err else {
            panic!("expected DuplicateFile, got {err}");
        };
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].extensions, vec!["first", "second"]);
        assert!(!dir.path().join("server").exists(), "nothing may be written");
    }

    #[test]
    fn writes_files_and_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("prototype.graphql"),
            "type Query { ping: String }\n",
        )
        .unwrap();

        Generator::new(config(dir.path()))
            .extension(Emits { name: "only", path: "server/model/models.genx.go" })
            .run(&Scope::new())
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("server/model/models.genx.go")).unwrap();
        assert_eq!(written, "package model\n");
    }

    #[test]
    fn cancelled_scope_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let scope = Scope::new();
        scope.cancel();
        let err = Generator::new(config(dir.path()))
            .extension(Named("a"))
            .run(&scope)
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
