//! qforge: render queryable command files as SQL.
//!
//! # Usage
//!
//! ```bash
//! # SELECT for a query command
//! qforge query users.json --schema schema.toml
//!
//! # Paged variant, SQL Server syntax
//! qforge page users.json --schema schema.toml --dialect sqlserver
//!
//! # Batched mutations as JSON
//! qforge execute changes.json --schema schema.toml --json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use qail_forge::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qforge")]
#[command(version)]
#[command(about = "Render queryable command files as dialect SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    qforge query users.json --schema schema.toml
    qforge page users.json --schema schema.toml --dialect sqlserver
    qforge migrate schema-changes.json --schema schema.toml --dialect sqlite")]
struct Cli {
    /// Target dialect (overrides the config file)
    #[arg(short, long, global = true, env = "QFORGE_DIALECT")]
    dialect: Option<Dialect>,

    /// Config file (default: ./qforge.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print statements as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a query command as a SELECT
    Query(CommandFile),
    /// Render a query command as a paged SELECT
    Page(CommandFile),
    /// Render a list of execution commands as batched statements
    Execute(CommandFile),
    /// Render a migration command as DDL
    Migrate(CommandFile),
    /// List supported dialects
    Dialects,
}

#[derive(clap::Args)]
struct CommandFile {
    /// JSON command file
    file: PathBuf,

    /// Entity metadata (.toml or .json)
    #[arg(short, long)]
    schema: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let file = match &cli.command {
        Commands::Dialects => {
            show_dialects();
            return Ok(());
        }
        Commands::Query(file)
        | Commands::Page(file)
        | Commands::Execute(file)
        | Commands::Migrate(file) => file,
    };

    let engine = build_engine(cli, &file.schema)?;
    match &cli.command {
        Commands::Query(_) => {
            let command: QueryCommand = read_command(&file.file)?;
            print_statements(cli, &[engine.generate_query_statement(&command)?])
        }
        Commands::Page(_) => {
            let command: QueryCommand = read_command(&file.file)?;
            print_statements(cli, &[engine.generate_query_paging_statement(&command)?])
        }
        Commands::Execute(_) => {
            let commands: Vec<ExecutionCommand> = read_command(&file.file)?;
            let statements = engine.generate_execution_statements(&commands)?;
            if cli.json {
                return print_json(&statements);
            }
            for (i, statement) in statements.iter().enumerate() {
                let mut tags = Vec::new();
                if statement.perform_alone(engine.config().isolate_read_back) {
                    tags.push("alone");
                }
                if statement.must_affect_data {
                    tags.push("must-affect-data");
                }
                println!("{} {}", format!("-- statement {}", i + 1).dimmed(), tags.join(", ").yellow());
                print_statement(&statement.script, &statement.parameters);
                if let Some(read_back) = statement.read_back_script() {
                    println!("{} {}", "-- read back:".dimmed(), read_back.cyan());
                }
            }
            Ok(())
        }
        Commands::Migrate(_) => {
            let command: MigrationCommand = read_command(&file.file)?;
            print_statements(cli, &engine.generate_migration_statements(&command)?)
        }
        Commands::Dialects => Ok(()),
    }
}

fn build_engine(cli: &Cli, schema: &Path) -> Result<Engine> {
    let mut config = EngineConfig::discover(cli.config.as_deref()).context("loading config")?;
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    let registry = EntityRegistry::load(schema)
        .with_context(|| format!("loading schema {}", schema.display()))?;
    tracing::debug!(dialect = %config.dialect, "engine ready");
    Ok(Engine::new(config, Arc::new(registry)))
}

fn read_command<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn print_statements(cli: &Cli, statements: &[Statement]) -> Result<()> {
    if cli.json {
        return print_json(statements);
    }
    for statement in statements {
        print_statement(&statement.script, &statement.parameters);
    }
    Ok(())
}

fn print_statement(script: &str, parameters: &[Parameter]) {
    println!("{};", script.white());
    if !parameters.is_empty() {
        println!("{}", "Parameters:".cyan());
        for p in parameters {
            println!("  {} = {}", p.name, p.value.to_string().yellow());
        }
    }
    println!();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn show_dialects() {
    println!("{}", "Supported dialects".cyan().bold());
    for dialect in Dialect::ALL {
        let generator = dialect.generator();
        println!(
            "  {:<10} {}  max parameters: {}",
            dialect.to_string().green(),
            generator.placeholder(1, "P1").yellow(),
            generator.max_parameters()
        );
    }
}
