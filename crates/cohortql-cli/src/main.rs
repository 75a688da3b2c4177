//! cohortql CLI: compile statement documents to SQL.

use clap::{Parser, Subcommand};
use cohortql_core::config::{parse_person_ids, CompileConfig};
use cohortql_exec::{CompiledQuery, Compiler};
use cohortql_io::{MemoryConnection, ScriptWriter};
use cohortql_operators::Registry;
use cohortql_planner::{parse_yaml_statement, ParsedStatement};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "cohortql")]
#[command(about = "cohortql: compile clinical cohort statements into portable SQL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a statement into a temp-table script plus the final query
    Compile {
        /// Path to the statement YAML/JSON file
        #[arg(short, long)]
        statement: PathBuf,

        /// Target dialect (overrides env and document)
        #[arg(long)]
        dialect: Option<String>,

        /// Comma-separated person allowlist (overrides env and document)
        #[arg(long)]
        person_ids: Option<String>,

        /// Write the script here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write the compile manifest (JSON) here
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Check that a statement builds into a valid operator tree
    Validate {
        /// Path to the statement YAML/JSON file
        #[arg(short, long)]
        statement: PathBuf,
    },

    /// Print operator metadata as JSON
    Operators,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            statement,
            dialect,
            person_ids,
            out,
            manifest,
        } => {
            let flags = Overrides {
                dialect,
                person_ids,
            };
            if let Err(e) = compile_statement(&statement, &flags, out.as_deref(), manifest.as_deref()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Validate { statement } => {
            if let Err(e) = validate_statement(&statement) {
                eprintln!("Validation failed: {}", e);
                std::process::exit(1);
            }
            println!("✓ Statement is valid");
        }
        Commands::Operators => match serde_json::to_string_pretty(&Registry::default().to_metadata()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Command-line overrides; they win over the document and the environment.
#[derive(Debug, Default)]
struct Overrides {
    dialect: Option<String>,
    person_ids: Option<String>,
}

fn resolve_config(
    doc: &ParsedStatement,
    flags: &Overrides,
) -> Result<CompileConfig, Box<dyn std::error::Error>> {
    let mut config = CompileConfig::from_env();
    doc.config.apply(&mut config);
    if let Some(d) = &flags.dialect {
        config.dialect = d.clone();
    }
    if let Some(ids) = &flags.person_ids {
        config.person_ids = Some(parse_person_ids(ids)?);
    }
    config.validate()?;
    Ok(config)
}

fn compile_statement(
    path: &Path,
    flags: &Overrides,
    out: Option<&Path>,
    manifest_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let src = fs::read_to_string(path)?;
    let registry = Registry::default();
    let parsed = parse_yaml_statement(&src, &registry)?;
    let config = resolve_config(&parsed, flags)?;
    let dialect = config.dialect.clone();
    let compiler = Compiler::new(config)?;

    let compiled: CompiledQuery = match out {
        // The file receives every statement the build phase runs, drops
        // included, then the root query.
        Some(out_path) => {
            let out_str = out_path.to_str().ok_or("output path is not valid UTF-8")?;
            let mut writer = ScriptWriter::to_path(out_str, dialect)?;
            let compiled = compiler.compile(&parsed.root, &mut writer)?;
            writer.write_statement(&compiled.sql)?;
            writer.flush()?;
            eprintln!(
                "✓ Wrote {} statements to {}",
                writer.written(),
                out_path.display()
            );
            compiled
        }
        None => {
            let mut writer = ScriptWriter::to_writer(std::io::stdout().lock(), dialect);
            let compiled = compiler.compile(&parsed.root, &mut writer)?;
            writer.write_statement(&compiled.sql)?;
            writer.flush()?;
            compiled
        }
    };

    if let Some(p) = manifest_path {
        fs::write(p, serde_json::to_string_pretty(&compiled.manifest)?)?;
    }
    Ok(())
}

fn validate_statement(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let src = fs::read_to_string(path)?;
    let registry = Registry::default();
    let parsed = parse_yaml_statement(&src, &registry)?;
    let config = resolve_config(&parsed, &Overrides::default())?;
    // Lower once against a recording connection so type and column errors
    // surface here too.
    let mut conn = MemoryConnection::new(config.dialect.clone());
    Compiler::new(config)?.compile(&parsed.root, &mut conn)?;
    Ok(())
}
