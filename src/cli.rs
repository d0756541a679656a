use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use prepkit::analyser::logic::types::ColumnInfo;
use prepkit::analyser::logic::validation::{ExpectedSchema, ValidationReport, validate_delimited};
use prepkit::analyser::session::PreprocessSession;
use prepkit::config::Settings;
use prepkit::pipeline::{Recipe, run_recipe_file};
use prepkit::utils::fmt_opt;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "prepkit", about = "Tabular data preprocessing tool", version)]
pub struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true, env = "PREPKIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a file and print per-column statistics
    Profile {
        /// CSV or spreadsheet (xlsx, xls, xlsm, ods) to profile
        file: PathBuf,

        /// Print the column info as JSON
        #[arg(long)]
        json: bool,

        /// Also print the first rows of the table
        #[arg(long)]
        preview: bool,
    },
    /// Strictly parse a CSV file and report problems
    Validate {
        /// CSV file to validate
        file: PathBuf,

        /// Field delimiter. Defaults to the configured one.
        #[arg(short, long)]
        delimiter: Option<char>,

        /// JSON file with the expected columns and types
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a recipe on a file and save the result as CSV
    Apply {
        /// Input CSV or spreadsheet
        file: PathBuf,

        /// Path to a JSON recipe
        #[arg(short, long)]
        recipe: PathBuf,

        /// Output file path. Defaults to preprocessed_<name> next to the input,
        /// with a .csv extension for spreadsheet inputs.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run_command(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Profile {
            file,
            json,
            preview,
        } => handle_profile(&file, json, preview, settings),
        Commands::Validate {
            file,
            delimiter,
            schema,
            json,
        } => handle_validate(&file, delimiter, schema.as_deref(), json, settings),
        Commands::Apply {
            file,
            recipe,
            output,
        } => handle_apply(&file, &recipe, output.as_deref(), settings),
    }
}

fn handle_profile(file: &Path, json: bool, preview: bool, settings: &Settings) -> Result<()> {
    let mut session = PreprocessSession::from_settings(settings);
    session
        .load_path(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    let Some(table) = session.table() else {
        anyhow::bail!("Nothing loaded from {}", file.display());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(session.column_info())?);
        return Ok(());
    }

    println!(
        "{}: {} rows, {} columns",
        session.file_name().unwrap_or_default(),
        table.row_count(),
        table.column_count()
    );
    println!();
    print_column_info(session.column_info(), table.row_count());

    if preview {
        println!();
        println!("{}", table.columns.join("\t"));
        for row in table.rows.iter().take(settings.preview_row_limit) {
            let cells: Vec<&str> = table
                .columns
                .iter()
                .map(|c| row.get(c).map(String::as_str).unwrap_or_default())
                .collect();
            println!("{}", cells.join("\t"));
        }
    }
    Ok(())
}

fn print_column_info(info: &[ColumnInfo], row_count: usize) {
    let width = info.iter().map(|c| c.name.len()).max().unwrap_or(0).max(6);
    println!(
        "{:<width$}  {:<6}  {:>12}  {:>6}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}",
        "column", "type", "missing", "unique", "mean", "median", "min", "max", "std"
    );
    for col in info {
        let missing = format!("{} ({:.1}%)", col.missing, col.missing_pct(row_count));
        println!(
            "{:<width$}  {:<6}  {:>12}  {:>6}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}",
            col.name,
            col.kind,
            missing,
            col.unique,
            fmt_opt(col.mean),
            fmt_opt(col.median),
            fmt_opt(col.min),
            fmt_opt(col.max),
            fmt_opt(col.std),
        );
    }
}

fn handle_validate(
    file: &Path,
    delimiter: Option<char>,
    schema: Option<&Path>,
    json: bool,
    settings: &Settings,
) -> Result<()> {
    let mut options = settings.strict.clone();
    if let Some(delimiter) = delimiter {
        options.delimiter = delimiter;
    }
    if let Some(schema_path) = schema {
        options.expected_schema = Some(load_schema(schema_path)?);
    }

    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let report = validate_delimited(&text, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&report_summary(&report))?);
    } else {
        print_report(&report);
    }

    if !report.is_valid() {
        anyhow::bail!(
            "{} failed validation with {} error(s)",
            file.display(),
            report.errors.len()
        );
    }
    Ok(())
}

fn report_summary(report: &ValidationReport) -> serde_json::Value {
    serde_json::json!({
        "valid": report.is_valid(),
        "columns": report.columns,
        "row_count": report.rows.len(),
        "errors": report.errors,
        "warnings": report.warnings,
        "column_types": report.column_types,
        "missing_ratio_by_column": report.missing_ratio_by_column,
    })
}

fn print_report(report: &ValidationReport) {
    println!(
        "{} rows, {} columns",
        report.rows.len(),
        report.columns.len()
    );
    for column in &report.columns {
        let kind = report
            .column_types
            .get(column)
            .map(|t| format!("{t:?}").to_lowercase())
            .unwrap_or_default();
        let missing = report
            .missing_ratio_by_column
            .get(column)
            .copied()
            .unwrap_or(0.0);
        println!("  {column}: {kind}, {:.1}% missing", missing * 100.0);
    }
    for issue in &report.errors {
        println!("error: {issue}");
    }
    for issue in &report.warnings {
        println!("warning: {issue}");
    }
    if report.is_valid() {
        println!("OK");
    }
}

fn load_schema(path: &Path) -> Result<ExpectedSchema> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse JSON schema")
}

fn handle_apply(file: &Path, recipe: &Path, output: Option<&Path>, settings: &Settings) -> Result<()> {
    let recipe = Recipe::from_file(recipe)?;
    println!("Running recipe '{}' on {}...", recipe.name, file.display());

    let outcome = run_recipe_file(&recipe, file, output, settings)?;
    for idx in &outcome.skipped {
        if let Some(step) = recipe.steps.get(*idx) {
            println!("  skipped step {}: {}", idx + 1, step.label());
        }
    }
    println!("{}", outcome.summary());
    if let Some(path) = &outcome.output_path {
        println!("Saved to {}", path.display());
    }
    Ok(())
}
