//! # prepkit - Tabular Data Preprocessing
//!
//! prepkit loads a CSV or spreadsheet into a small string table, profiles every
//! column, and applies reversible cleaning operations with linear undo/redo.
//!
//! ## Quick Start
//!
//! ```no_run
//! use prepkit::analyser::session::PreprocessSession;
//! use prepkit::analyser::logic::FillMethod;
//! use std::path::Path;
//!
//! # fn main() -> prepkit::error::Result<()> {
//! let mut session = PreprocessSession::new();
//! session.load_path(Path::new("sensors.csv"))?;
//!
//! for col in session.column_info() {
//!     println!("{}: {} ({} missing)", col.name, col.kind, col.missing);
//! }
//!
//! session.fill_missing("temp", FillMethod::Median, None);
//! session.remove_outliers("temp");
//! session.undo();
//!
//! let csv = session.export_csv()?;
//! # let _ = csv;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`analyser`]: Parsing, profiling, mutations and the undoable session
//!   - [`analyser::logic`]: Pure table logic (no state)
//!   - [`analyser::history`]: Linear undo/redo store
//!   - [`analyser::session`]: Host-owned preprocessing state
//! - [`pipeline`]: JSON recipes replaying a list of operations
//! - [`config`]: User settings
//! - [`logging`]: Subscriber setup for the binary
//! - [`error`]: Error types and handling utilities
//! - [`utils`]: Number parsing and formatting
//!
//! ## Tables
//!
//! A [`Table`](analyser::logic::Table) keeps every cell as text. An empty cell
//! is missing; numeric columns are recognised by the analyzer, not the parser,
//! so a column only becomes `number` when more than 80% of its non-missing cells
//! parse.

#![warn(clippy::all, rust_2018_idioms)]

pub mod analyser;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod utils;
