//! Relay extension for the genx pipeline.
//!
//! The before hook loads the prototype SDL, runs the [`schema`] enhancer,
//! and installs the validated enhanced schema on the runtime. The generate
//! hook projects the schema through the [`node`] model and emits the
//! enhanced SDL plus the Go model and resolver files.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use std::collections::BTreeSet;

use apollo_compiler::ast::Document;
use genx_core::{Error, Extension, ExtensionResult, File, Result, Runtime, Scope};
use tracing::debug;

mod model;
pub mod node;
mod resolver;
pub mod schema;
mod util;

pub use schema::{enhance, EnhanceResult, NODE_DIRECTIVE, PRELUDE};

/// Marker line at the top of every emitted Go file.
pub(crate) const HEADER: &str = "Code generated by genx. DO NOT EDIT.";

/// State carried from the before hook into the generate hook.
struct Enhanced {
    nodes: BTreeSet<String>,
    sdl: String,
}

/// The relay extension: schema enhancement plus model/resolver emission.
#[derive(Default)]
pub struct RelayExtension {
    enhanced: Option<Enhanced>,
}

impl RelayExtension {
    /// Build the extension.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Extension for RelayExtension {
    fn name(&self) -> &str {
        "relay"
    }

    fn before_generate(&mut self, scope: &Scope, runtime: &mut Runtime) -> Result<()> {
        scope.checkpoint()?;

        let sources = genx_core::schema::glob_sources(&runtime.config)?;
        let mut merged = Document::new();
        for source in sources {
            let doc = Document::parse(source.text, source.path)
                .map_err(|e| Error::SchemaParse(e.to_string()))?;
            merged.definitions.extend(doc.definitions);
        }

        let result = schema::enhance(&merged)?;
        debug!(nodes = result.nodes.len(), "enhanced prototype schema");

        let sdl = result.document.to_string();
        let validated = result
            .document
            .to_schema()
            .map_err(|e| Error::SchemaParse(e.to_string()))?
            .validate()
            .map_err(|e| Error::SchemaValidate(e.to_string()))?;

        runtime.schema = Some(validated);
        self.enhanced = Some(Enhanced { nodes: result.nodes, sdl });
        Ok(())
    }

    fn generate(&mut self, scope: &Scope, runtime: &mut Runtime) -> Result<ExtensionResult> {
        let enhanced = self.enhanced.as_ref().ok_or_else(|| {
            Error::ConfigInvalid("relay generate ran without its before hook".to_string())
        })?;
        let schema = runtime.schema.as_ref().ok_or_else(|| {
            Error::ConfigInvalid("relay generate ran without a loaded schema".to_string())
        })?;

        let data = node::Data::new(schema, &enhanced.nodes, &runtime.config.go_module);

        let mut files = vec![File::new("schema.genx.graphql", enhanced.sdl.clone())];
        files.push(model::models_file(&data)?);
        files.push(resolver::root_resolver_file(&data)?);
        for n in &data.nodes {
            scope.checkpoint()?;
            files.push(resolver::node_resolver_file(&data, n)?);
        }

        let metadata = serde_json::json!({
            "nodes": enhanced.nodes.iter().collect::<Vec<_>>(),
        });
        Ok(ExtensionResult { files, metadata: Some(metadata) })
    }
}
