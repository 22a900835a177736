//! tabula command-line interface
//!
//! Works on table definitions stored as JSON files:
//!
//! ```text
//! tabula diff --previous person.json --next person.edited.json
//! tabula diff --next post.json --format script
//! tabula validate person.edited.json
//! tabula remove person
//! ```

mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use tabula_designer::{
    DdlCompiler, DdlStatement, DesignerConfig, TableDefinition, ValidationError, preview_script,
};

use crate::logging::LoggingConfig;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "Compile table definition edits into SurrealQL statements")]
#[command(version)]
struct Cli {
    /// Designer configuration file (TOML)
    #[arg(long, global = true, env = "TABULA_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the statements that turn one definition into another
    Diff {
        /// Definition as it exists now; omit for a new table
        #[arg(long)]
        previous: Option<PathBuf>,

        /// Edited definition
        #[arg(long)]
        next: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Check a definition and list every violated rule
    Validate {
        /// Definition to check
        definition: PathBuf,
    },

    /// Print the statement removing a table
    Remove {
        /// Table name
        table: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One row per statement
    Table,
    /// Statements joined into a script
    Script,
    /// JSON array of statements
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = if cli.quiet {
        LoggingConfig::quiet()
    } else if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };
    if let Err(e) = logging::init(logging) {
        eprintln!("Error: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run a command, returning whether it succeeded
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Diff {
            previous,
            next,
            format,
        } => {
            let previous = previous.as_deref().map(read_definition).transpose()?;
            let next = read_definition(&next)?;
            let plan = DdlCompiler::with_options(config.compiler.clone()).plan(previous.as_ref(), &next);
            println!("{}", render_plan(&plan, format)?);
            Ok(true)
        }
        Commands::Validate { definition } => {
            let definition = read_definition(&definition)?;
            let violations = definition.validate_with(&config.validation);
            if violations.is_empty() {
                println!("{} is valid", display_name(&definition));
                Ok(true)
            } else {
                println!("{}", render_violations(&violations));
                Ok(false)
            }
        }
        Commands::Remove { table } => {
            println!(
                "{}",
                DdlCompiler::with_options(config.compiler.clone()).remove_table(table)
            );
            Ok(true)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DesignerConfig> {
    match path {
        Some(path) => DesignerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(DesignerConfig::default()),
    }
}

fn read_definition(path: &Path) -> anyhow::Result<TableDefinition> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading definition {}", path.display()))?;
    let definition: TableDefinition = serde_json::from_str(&text)
        .with_context(|| format!("parsing definition {}", path.display()))?;
    tracing::debug!(path = %path.display(), table = %definition.name(), "read definition");
    Ok(definition)
}

fn display_name(definition: &TableDefinition) -> &str {
    if definition.name().is_empty() {
        "<unnamed>"
    } else {
        definition.name()
    }
}

fn render_plan(plan: &[DdlStatement], format: OutputFormat) -> anyhow::Result<String> {
    let statements: Vec<String> = plan.iter().map(|s| s.to_string()).collect();

    Ok(match format {
        OutputFormat::Script => preview_script(&statements),
        OutputFormat::Json => serde_json::to_string_pretty(&statements)?,
        OutputFormat::Table => {
            if plan.is_empty() {
                return Ok("No changes".to_string());
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "Action", "Target", "Name", "Statement"]);
            for (i, (statement, text)) in plan.iter().zip(&statements).enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    if statement.is_remove() { "REMOVE" } else { "DEFINE" }.to_string(),
                    format!("{:?}", statement.target()).to_lowercase(),
                    statement.object_name().to_string(),
                    text.clone(),
                ]);
            }
            table.to_string()
        }
    })
}

fn render_violations(violations: &[ValidationError]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Attribute", "Problem"]);
    for violation in violations {
        table.add_row(vec![violation.field.clone(), violation.message.clone()]);
    }
    table.to_string()
}
