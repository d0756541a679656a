//! Recipe execution.
//!
//! Applies recipe steps through a [`PreprocessSession`], so every applied step
//! is an undo point, and reports what happened.

use super::spec::Recipe;
use super::validation::validate_recipe;
use crate::analyser::logic::types::FileKind;
use crate::analyser::session::PreprocessSession;
use crate::config::Settings;
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Report generated after running a recipe
#[derive(Debug, Clone, Default)]
pub struct RecipeOutcome {
    /// Number of steps that changed the table
    pub applied: usize,

    /// Indices of steps whose preconditions did not hold
    pub skipped: Vec<usize>,

    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,

    /// Where the result was written, for file runs
    pub output_path: Option<PathBuf>,

    pub duration: Duration,
}

impl RecipeOutcome {
    /// One-line summary for logs and the CLI
    pub fn summary(&self) -> String {
        format!(
            "Recipe completed: {} applied, {} skipped, rows {} → {}, columns {} → {}, {:.2}s",
            self.applied,
            self.skipped.len(),
            self.rows_before,
            self.rows_after,
            self.columns_before,
            self.columns_after,
            self.duration.as_secs_f64()
        )
    }
}

fn table_shape(session: &PreprocessSession) -> (usize, usize) {
    session
        .table()
        .map_or((0, 0), |t| (t.row_count(), t.column_count()))
}

impl Recipe {
    /// Applies every step in order, recording each applied step in history.
    ///
    /// Steps whose preconditions fail are skipped and listed in the outcome.
    pub fn run(&self, session: &mut PreprocessSession) -> RecipeOutcome {
        let start = Instant::now();
        let (rows_before, columns_before) = table_shape(session);

        let mut outcome = RecipeOutcome {
            rows_before,
            columns_before,
            ..RecipeOutcome::default()
        };

        for (idx, step) in self.steps.iter().enumerate() {
            if session.apply(step) {
                outcome.applied += 1;
            } else {
                tracing::warn!(step = idx + 1, operation = %step.label(), "Recipe step skipped");
                outcome.skipped.push(idx);
            }
        }

        (outcome.rows_after, outcome.columns_after) = table_shape(session);
        outcome.duration = start.elapsed();
        tracing::info!(recipe = %self.name, "{}", outcome.summary());
        outcome
    }
}

/// `preprocessed_<name>` next to the input, with a `.csv` extension when the
/// input is a spreadsheet since the result is always CSV text.
fn default_output_path(input: &Path, session: &PreprocessSession) -> PathBuf {
    let name = session.export_file_name();
    let path = input.with_file_name(&name);
    match FileKind::from_name(&name) {
        Some(FileKind::Spreadsheet) => path.with_extension("csv"),
        _ => path,
    }
}

/// Loads `input`, validates and runs `recipe`, and writes the CSV result.
///
/// The output defaults to `preprocessed_<name>` next to the input.
///
/// # Errors
///
/// Fails when the input cannot be loaded, the recipe references columns the
/// file lacks, or the result cannot be written.
pub fn run_recipe_file(
    recipe: &Recipe,
    input: &Path,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<RecipeOutcome> {
    let mut session = PreprocessSession::from_settings(settings);
    session
        .load_path(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let columns = session
        .table()
        .map(|t| t.columns.clone())
        .unwrap_or_default();
    let issues = validate_recipe(recipe, &columns);
    if !issues.is_empty() {
        anyhow::bail!(
            "Recipe validation failed:\n{}",
            issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    let mut outcome = recipe.run(&mut session);

    let output_path = output.map_or_else(|| default_output_path(input, &session), Path::to_path_buf);
    let csv = session.export_csv().context("Nothing to export")?;
    std::fs::write(&output_path, csv)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    outcome.output_path = Some(output_path);
    Ok(outcome)
}
