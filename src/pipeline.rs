//! Replayable preprocessing recipes.
//!
//! A recipe is the list of [`Operation`](crate::analyser::logic::Operation)s a
//! user applied, stored as versioned JSON so the same preprocessing can be
//! replayed headlessly on another file.
//!
//! ```json
//! {
//!   "version": "0.1",
//!   "name": "clean sensors",
//!   "steps": [
//!     { "op": "fill_missing", "column": "temp", "method": "median" },
//!     { "op": "remove_outliers", "column": "temp" },
//!     { "op": "standardize", "columns": ["temp", "humidity"] },
//!     { "op": "delete_column", "column": "notes" }
//!   ]
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use prepkit::analyser::session::PreprocessSession;
//! use prepkit::pipeline::{Recipe, validate_recipe};
//! use std::path::Path;
//!
//! let recipe = Recipe::from_file("recipe.json")?;
//! let mut session = PreprocessSession::new();
//! session.load_path(Path::new("sensors.csv"))?;
//!
//! let columns = session.table().map(|t| t.columns.clone()).unwrap_or_default();
//! assert!(validate_recipe(&recipe, &columns).is_empty());
//!
//! let outcome = recipe.run(&mut session);
//! println!("{}", outcome.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod executor;
pub mod spec;
pub mod validation;

pub use executor::{RecipeOutcome, run_recipe_file};
pub use spec::{RECIPE_VERSION, Recipe};
pub use validation::{RecipeIssue, validate_recipe};
