//! Recipe validation.
//!
//! Checks a recipe against the columns of the table it will run on before any
//! step is applied, so a bad recipe fails with a readable list of problems
//! instead of silently skipping steps.

use super::spec::{RECIPE_VERSION, Recipe};
use crate::analyser::logic::types::Operation;

/// A problem found in a recipe; `step_index` is `None` for recipe-level issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIssue {
    pub step_index: Option<usize>,
    pub message: String,
}

impl RecipeIssue {
    fn step(step_index: usize, message: impl Into<String>) -> Self {
        Self {
            step_index: Some(step_index),
            message: message.into(),
        }
    }

    fn recipe(message: impl Into<String>) -> Self {
        Self {
            step_index: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RecipeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(idx) = self.step_index {
            write!(f, "Step {}: {}", idx + 1, self.message)
        } else {
            write!(f, "Recipe: {}", self.message)
        }
    }
}

/// Validates `recipe` against the starting `columns`.
///
/// Column deletions are simulated step by step, so a step that references a
/// column removed by an earlier step is reported too.
pub fn validate_recipe(recipe: &Recipe, columns: &[String]) -> Vec<RecipeIssue> {
    let mut issues = Vec::new();

    if recipe.version != RECIPE_VERSION {
        issues.push(RecipeIssue::recipe(format!(
            "Unsupported recipe version '{}', expected '{RECIPE_VERSION}'",
            recipe.version
        )));
    }

    let mut current: Vec<&str> = columns.iter().map(String::as_str).collect();

    for (idx, step) in recipe.steps.iter().enumerate() {
        if let Operation::Standardize { columns } | Operation::Normalize { columns } = step
            && columns.is_empty()
        {
            issues.push(RecipeIssue::step(idx, "No columns selected"));
        }

        for column in step.referenced_columns() {
            if !current.contains(&column) {
                issues.push(RecipeIssue::step(
                    idx,
                    format!("Column '{column}' does not exist at this point"),
                ));
            }
        }

        if let Operation::DeleteColumn { column } = step {
            current.retain(|c| c != column);
        }
    }

    issues
}
