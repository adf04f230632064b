//! `customify`: build option schemas and stylesheets from a manifest.

mod manifest;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use customify::{compile_css, BuildOptions, BuildOutput, TransformRegistry, ValueSource};
use tracing_subscriber::EnvFilter;

use crate::manifest::{load_values, Manifest};

#[derive(Parser, Debug)]
#[command(name = "customify", version, about = "Compile declarative style options to CSS")]
struct Cli {
    /// Log merge and compile events (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile saved values into CSS
    Build {
        #[arg(short, long)]
        manifest: PathBuf,
        /// YAML mapping of option id to saved value
        #[arg(long)]
        values: Option<PathBuf>,
        /// Emit only what the saved values set, without schema defaults
        #[arg(long)]
        saved_only: bool,
        /// Only declarations the live preview can apply
        #[arg(long)]
        live_only: bool,
        #[arg(long, value_enum, default_value_t = BuildFormat::Css)]
        format: BuildFormat,
        #[command(flatten)]
        diagnostics: DiagnosticsArg,
    },
    /// Print the merged schema
    Schema {
        #[arg(short, long)]
        manifest: PathBuf,
        #[arg(long, value_enum, default_value_t = SchemaFormat::Json)]
        format: SchemaFormat,
        #[command(flatten)]
        diagnostics: DiagnosticsArg,
    },
}

#[derive(clap::Args, Debug)]
struct DiagnosticsArg {
    /// Run the schema validator and print its findings to stderr
    #[arg(long)]
    diagnostics: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum BuildFormat {
    Css,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SchemaFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::Build {
            manifest,
            values,
            saved_only,
            live_only,
            format,
            diagnostics,
        } => {
            let output = build_schema(&manifest, diagnostics.diagnostics)?;
            let saved = match values {
                Some(path) => load_values(&path)?,
                None => Default::default(),
            };
            let transforms = TransformRegistry::new();
            let css = if saved_only {
                compile_css(&output.schema, &saved, &transforms)
            } else {
                compile_css(&output.schema, &saved.or_else(output.schema.defaults()), &transforms)
            };
            for diagnostic in &css.diagnostics {
                eprintln!("{}", diagnostic);
            }

            let rendered = match (format, live_only) {
                (BuildFormat::Css, false) => css.to_stylesheet(),
                (BuildFormat::Css, true) => css.to_live_stylesheet(),
                (BuildFormat::Json, false) => serde_json::to_string_pretty(&css)?,
                (BuildFormat::Json, true) => {
                    let live: Vec<_> = css.live().collect();
                    serde_json::to_string_pretty(&live)?
                }
            };
            writeln!(stdout, "{}", rendered.trim_end())?;
        }
        Command::Schema {
            manifest,
            format,
            diagnostics,
        } => {
            let output = build_schema(&manifest, diagnostics.diagnostics)?;
            let rendered = match format {
                SchemaFormat::Json => serde_json::to_string_pretty(&output.schema)?,
                SchemaFormat::Yaml => serde_yaml::to_string(&output.schema)?,
            };
            writeln!(stdout, "{}", rendered.trim_end())?;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("customify={level},customify_cli={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Builds the manifest's schema and reports diagnostics on stderr.
///
/// `--diagnostics` and `CUSTOMIFY_DIAGNOSTICS` both switch diagnostics on, in
/// addition to the manifest's own setting.
fn build_schema(path: &std::path::Path, diagnostics: bool) -> Result<BuildOutput> {
    let mut manifest = Manifest::load(path)?;
    manifest.diagnostics |= diagnostics || BuildOptions::from_env().diagnostics;

    let output = manifest
        .pipeline()?
        .build_schema()
        .with_context(|| format!("failed to build schema from {}", path.display()))?;

    for diagnostic in &output.diagnostics {
        eprintln!("{}", diagnostic);
    }
    tracing::info!(
        sections = output.schema.len(),
        options = output.schema.option_count(),
        diagnostics = output.diagnostics.len(),
        "schema built"
    );
    Ok(output)
}
