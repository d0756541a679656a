//! Recipe data structures and JSON persistence.

use crate::analyser::logic::types::Operation;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current recipe format version
pub const RECIPE_VERSION: &str = "0.1";

/// Ordered list of operations with a name and format version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Format version for future migrations
    #[serde(default = "default_version")]
    pub version: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Applied in order, each against the result of the previous one
    #[serde(default)]
    pub steps: Vec<Operation>,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: RECIPE_VERSION.to_owned(),
            name: name.into(),
            description: None,
            steps: Vec::new(),
        }
    }

    /// Appends a step, builder style.
    #[must_use]
    pub fn with_step(mut self, step: Operation) -> Self {
        self.steps.push(step);
        self
    }

    /// Load a recipe from a JSON file
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not a valid recipe.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe file {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Parse a recipe from a JSON string
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or unknown operations.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse recipe JSON")
    }

    /// Save the recipe to a JSON file
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json).context("Failed to write recipe file")
    }

    /// Serialize the recipe to a pretty JSON string
    ///
    /// # Errors
    ///
    /// Fails only if serialization itself fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize recipe")
    }
}

fn default_version() -> String {
    RECIPE_VERSION.to_owned()
}
