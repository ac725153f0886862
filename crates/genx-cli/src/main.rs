//! CLI for `genx`.
//!
//! # Subcommands
//!
//! ```text
//! # Run the full pipeline against an output tree:
//! genx generate --output-dir ./app --prototype prototype.graphql \
//!   --go-module example.com/app
//!
//! # Or keep the settings in a project config:
//! genx generate --config genx.yaml
//!
//! # Inspect the enhanced SDL without writing anything:
//! genx enhance ./app/prototype.graphql
//! ```

#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use apollo_compiler::ast::Document;
use clap::Parser;
use genx_core::{CleanupExtension, Config, Generator, Scope};
use genx_gosurgery::GosurgeryExtension;
use genx_relay::RelayExtension;
use serde::Deserialize;

/// Server-backend generator for `@node`-annotated prototype schemas.
#[derive(Parser)]
#[command(name = "genx", version, about)]
enum Cli {
    /// Run the full pipeline: enhance, emit, surgery, write, cleanup.
    Generate(GenerateArgs),

    /// Print the enhanced SDL for prototype files without writing anything.
    Enhance(EnhanceArgs),
}

#[derive(Parser)]
struct GenerateArgs {
    /// Root of the generated tree.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Glob matching the prototype SDL files, relative to the output dir.
    #[arg(short, long)]
    prototype: Option<String>,

    /// Go module path of the generated server.
    #[arg(short, long)]
    go_module: Option<String>,

    /// Path to a project config YAML file. Flags override config values.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct EnhanceArgs {
    /// Prototype SDL files to enhance.
    #[arg(required = true)]
    prototypes: Vec<PathBuf>,
}

/// Project-level settings, loaded from YAML.
///
/// ```yaml
/// # genx.yaml
/// output_dir: .
/// prototype: prototype.graphql
/// go_module: example.com/app
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectConfig {
    output_dir: Option<PathBuf>,
    prototype: Option<String>,
    go_module: Option<String>,
}

impl ProjectConfig {
    fn load(path: &PathBuf) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_yaml_ng::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse() {
        Cli::Generate(args) => run_generate(&args),
        Cli::Enhance(args) => run_enhance(&args),
    }
}

fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let project = match &args.config {
        Some(path) => ProjectConfig::load(path)?,
        None => ProjectConfig::default(),
    };

    let output_dir = args
        .output_dir
        .clone()
        .or(project.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let prototype = args
        .prototype
        .clone()
        .or(project.prototype)
        .unwrap_or_else(|| "prototype.graphql".to_string());
    let Some(go_module) = args.go_module.clone().or(project.go_module) else {
        bail!("go module is required; pass --go-module or set go_module in the config");
    };

    let config = Config {
        output_dir,
        prototype_rel_pattern: prototype,
        go_module,
    };

    Generator::new(config)
        .extension(RelayExtension::new())
        .extension(GosurgeryExtension::new())
        .extension(CleanupExtension::new())
        .run(&Scope::new())
        .context("generation failed")?;

    eprintln!("Generation complete.");
    Ok(())
}

fn run_enhance(args: &EnhanceArgs) -> anyhow::Result<()> {
    let mut merged = Document::new();
    for path in &args.prototypes {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let doc = Document::parse(text, path)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
        merged.definitions.extend(doc.definitions);
    }

    let result = genx_relay::enhance(&merged).context("enhancement failed")?;
    print!("{}", result.document);
    Ok(())
}
