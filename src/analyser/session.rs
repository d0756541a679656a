//! Host-owned preprocessing session.
//!
//! A [`PreprocessSession`] holds everything a UI needs to render and drive the
//! preprocessing view: the loaded file name, the current snapshot, the undo
//! history and the user's column selection. The host owns it and passes it by
//! reference; nothing here is global.
//!
//! ```
//! use prepkit::analyser::session::PreprocessSession;
//! use prepkit::analyser::logic::FillMethod;
//!
//! # fn main() -> prepkit::error::Result<()> {
//! let mut session = PreprocessSession::new();
//! session.load_bytes("line.csv", b"a,b\n1,2\n3,\n5,6")?;
//! session.fill_missing("b", FillMethod::Mean, None);
//! assert_eq!(session.table().and_then(|t| t.cell(1, "b")), Some("4"));
//!
//! session.undo();
//! assert_eq!(session.table().and_then(|t| t.cell(1, "b")), Some(""));
//! # Ok(())
//! # }
//! ```
//!
//! ## Overlapping loads
//!
//! Hosts that read files asynchronously call [`PreprocessSession::begin_load`]
//! when a read starts and [`PreprocessSession::finish_load`] when it completes.
//! Only the most recent ticket is honoured, so a slow earlier read can never
//! overwrite a later one.

use super::history::HistoryStore;
use super::logic::cleaning::{apply_operation, is_applicable};
use super::logic::io::{export_file_name, file_name_of, load_bytes, write_csv};
use super::logic::profiling::analyze_table;
use super::logic::types::{ColumnInfo, ColumnType, FillMethod, Operation, Snapshot, Table};
use super::logic::validation::ValidationReport;
use crate::config::Settings;
use crate::error::{PrepError, Result, ResultExt as _};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Whether an applied operation becomes an undo step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recording {
    Record,
    Skip,
}

/// Handle for one in-flight load. Stale tickets are ignored on completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug)]
pub struct PreprocessSession {
    id: Uuid,
    file_name: Option<String>,
    current: Option<Arc<Snapshot>>,
    history: HistoryStore<Snapshot>,
    selected: Vec<String>,
    generation: u64,
}

impl PreprocessSession {
    pub fn new() -> Self {
        Self::with_history_limit(None)
    }

    pub fn with_history_limit(limit: Option<usize>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: None,
            current: None,
            history: HistoryStore::with_limit(limit),
            selected: Vec::new(),
            generation: 0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_history_limit(settings.history_limit)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Arc<Snapshot>> {
        self.current.as_ref()
    }

    pub fn table(&self) -> Option<&Table> {
        self.current.as_deref().map(|s| &s.table)
    }

    pub fn column_info(&self) -> &[ColumnInfo] {
        self.current
            .as_deref()
            .map(|s| s.column_info.as_slice())
            .unwrap_or_default()
    }

    pub fn history(&self) -> &HistoryStore<Snapshot> {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Starts a load and supersedes any load still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Installs a parsed table if `ticket` is still the latest load.
    ///
    /// Returns `Ok(false)` for superseded tickets, whose result is dropped.
    ///
    /// # Errors
    ///
    /// Returns the parse error carried in `parsed` for the latest ticket.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        name: impl Into<String>,
        parsed: Result<Table>,
    ) -> Result<bool> {
        let name = name.into();
        if ticket.generation != self.generation {
            tracing::warn!(
                session = %self.id,
                file = %name,
                "Discarding superseded load"
            );
            return Ok(false);
        }

        let table = parsed?;
        let column_info = analyze_table(&table);
        tracing::info!(
            session = %self.id,
            file = %name,
            rows = table.row_count(),
            columns = table.column_count(),
            "Loaded file"
        );

        let snapshot = Snapshot::new(table, column_info, format!("Load {name}"));
        self.history.reset();
        self.current = Some(self.history.record(snapshot));
        self.file_name = Some(name);
        self.selected.clear();
        Ok(true)
    }

    /// Parses an in-memory file and loads it.
    ///
    /// # Errors
    ///
    /// Returns any [`load_bytes`] error; the previous state is kept.
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let ticket = self.begin_load();
        self.finish_load(ticket, name, load_bytes(name, bytes))
            .map(|_| ())
    }

    /// Reads, parses and loads a file from disk.
    ///
    /// # Errors
    ///
    /// Returns read or parse errors; the previous state is kept.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let name = file_name_of(path)?;
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        self.load_bytes(&name, &bytes)
    }

    /// Loads the rows of a strict validation report.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::Parse`] with the first error when the report is
    /// not valid.
    pub fn load_validated(&mut self, name: &str, report: ValidationReport) -> Result<()> {
        let ticket = self.begin_load();
        let parsed = match report.errors.first() {
            Some(issue) => Err(PrepError::Parse(issue.message.clone())),
            None => Ok(report.into_table()),
        };
        self.finish_load(ticket, name, parsed).map(|_| ())
    }

    /// Drops the loaded file, its history and the selection. In-flight loads
    /// become stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.file_name = None;
        self.current = None;
        self.history.reset();
        self.selected.clear();
        tracing::info!(session = %self.id, "Cleared session");
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Applies `op` and records it as an undo step.
    ///
    /// Returns `false` when nothing is loaded or `op` does not apply.
    pub fn apply(&mut self, op: &Operation) -> bool {
        self.apply_with(op, Recording::Record)
    }

    pub fn apply_with(&mut self, op: &Operation, recording: Recording) -> bool {
        let Some(current) = self.current.as_deref() else {
            tracing::warn!(operation = %op.label(), "No file loaded");
            return false;
        };
        if !is_applicable(&current.table, &current.column_info, op) {
            tracing::debug!(operation = %op.label(), "Operation does not apply, skipped");
            return false;
        }

        let (table, column_info) = apply_operation(&current.table, &current.column_info, op);
        let snapshot = Snapshot::new(table, column_info, op.label());
        self.current = Some(match recording {
            Recording::Record => self.history.record(snapshot),
            Recording::Skip => Arc::new(snapshot),
        });

        if let Operation::DeleteColumn { column } = op {
            self.selected.retain(|c| c != column);
        }
        true
    }

    pub fn standardize(&mut self, columns: &[String]) -> bool {
        self.apply(&Operation::Standardize {
            columns: columns.to_vec(),
        })
    }

    pub fn normalize(&mut self, columns: &[String]) -> bool {
        self.apply(&Operation::Normalize {
            columns: columns.to_vec(),
        })
    }

    pub fn fill_missing(&mut self, column: &str, method: FillMethod, value: Option<&str>) -> bool {
        self.apply(&Operation::FillMissing {
            column: column.to_owned(),
            method,
            value: value.map(str::to_owned),
        })
    }

    pub fn remove_outliers(&mut self, column: &str) -> bool {
        self.apply(&Operation::RemoveOutliers {
            column: column.to_owned(),
        })
    }

    pub fn change_type(&mut self, column: &str, to: ColumnType) -> bool {
        self.apply(&Operation::ChangeType {
            column: column.to_owned(),
            to,
        })
    }

    pub fn delete_column(&mut self, column: &str) -> bool {
        self.apply(&Operation::DeleteColumn {
            column: column.to_owned(),
        })
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                tracing::debug!(label = %snapshot.label, "Undo");
                self.current = Some(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                tracing::debug!(label = %snapshot.label, "Redo");
                self.current = Some(snapshot);
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Column selection
    // ---------------------------------------------------------------------

    pub fn selected_columns(&self) -> &[String] {
        &self.selected
    }

    /// Adds `column` to the selection if it exists and is not selected yet.
    pub fn select(&mut self, column: &str) -> bool {
        let exists = self.table().is_some_and(|t| t.has_column(column));
        if !exists || self.selected.iter().any(|c| c == column) {
            return false;
        }
        self.selected.push(column.to_owned());
        true
    }

    pub fn deselect(&mut self, column: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|c| c != column);
        self.selected.len() != before
    }

    pub fn toggle_selection(&mut self, column: &str) {
        if !self.deselect(column) {
            self.select(column);
        }
    }

    pub fn standardize_selected(&mut self) -> bool {
        let columns = self.selected.clone();
        self.standardize(&columns)
    }

    pub fn normalize_selected(&mut self) -> bool {
        let columns = self.selected.clone();
        self.normalize(&columns)
    }

    // ---------------------------------------------------------------------
    // Export
    // ---------------------------------------------------------------------

    /// Current table as CSV.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::EmptyInput`] when nothing is loaded or the table
    /// has no rows.
    pub fn export_csv(&self) -> Result<String> {
        match self.table() {
            Some(table) if !table.is_empty() => write_csv(table),
            _ => Err(PrepError::EmptyInput),
        }
    }

    pub fn export_file_name(&self) -> String {
        export_file_name(self.file_name())
    }
}

impl Default for PreprocessSession {
    fn default() -> Self {
        Self::new()
    }
}
