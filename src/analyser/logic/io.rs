use super::types::{FileKind, Row, Table};
use crate::error::{PrepError, Result, ResultExt as _};
use calamine::{Data, Reader as _, open_workbook_auto_from_rs};
use std::io::Cursor;
use std::path::Path;

const BOM: char = '\u{FEFF}';

/// Lenient comma-split parse used for immediate preprocessing.
///
/// Blank lines are skipped, values are trimmed and short rows are padded with
/// empty cells. Quotes are not interpreted; use
/// [`super::validation::validate_delimited`] for quote-aware parsing with
/// diagnostics.
///
/// # Errors
///
/// Returns [`PrepError::EmptyInput`] when no non-blank line remains.
pub fn parse_delimited(text: &str) -> Result<Table> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());

    let header = lines.next().ok_or(PrepError::EmptyInput)?;
    let columns: Vec<String> = header.split(',').map(|h| h.trim().to_owned()).collect();

    let rows = lines
        .map(|line| {
            let values: Vec<&str> = line.split(',').collect();
            build_row(&columns, |idx| values.get(idx).map(|v| v.trim()))
        })
        .collect();

    Ok(Table::new(columns, rows))
}

/// Decodes the first worksheet of an xlsx/xls/xlsm/ods workbook.
///
/// # Errors
///
/// Returns [`PrepError::Spreadsheet`] for undecodable bytes and
/// [`PrepError::EmptyInput`] when the workbook has no sheet or no rows.
pub fn parse_spreadsheet(bytes: &[u8]) -> Result<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(PrepError::EmptyInput)??;

    let mut sheet_rows = range.rows();
    let header = sheet_rows.next().ok_or(PrepError::EmptyInput)?;
    let columns: Vec<String> = header.iter().map(cell_to_string).collect();

    let rows = sheet_rows
        .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|cells| {
            let values: Vec<String> = cells.iter().map(cell_to_string).collect();
            build_row(&columns, |idx| values.get(idx).map(String::as_str))
        })
        .collect();

    Ok(Table::new(columns, rows))
}

/// Stringifies a spreadsheet cell; the analyzer recovers numeric types later.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => crate::utils::format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| crate::utils::format_number(dt.as_f64())),
        Data::Error(e) => format!("#ERR:{e:?}"),
    }
}

fn build_row<'a>(columns: &[String], value_at: impl Fn(usize) -> Option<&'a str>) -> Row {
    let mut row = Row::with_capacity(columns.len());
    for (idx, name) in columns.iter().enumerate() {
        // later duplicates overwrite earlier ones
        row.insert(name.clone(), value_at(idx).unwrap_or_default().to_owned());
    }
    row
}

/// Parses an in-memory file, choosing the decoder from the file name.
///
/// # Errors
///
/// Returns [`PrepError::UnsupportedFormat`] for unknown extensions,
/// [`PrepError::Parse`] for non-UTF-8 text and any decoder error.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Table> {
    let kind = FileKind::from_name(name)
        .ok_or_else(|| PrepError::UnsupportedFormat(extension_of(name)))?;

    let table = match kind {
        FileKind::Csv => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| PrepError::Parse(format!("{name} is not valid UTF-8: {e}")))?;
            parse_delimited(text)?
        }
        FileKind::Spreadsheet => parse_spreadsheet(bytes)?,
    };

    tracing::debug!(
        file = name,
        rows = table.row_count(),
        columns = table.column_count(),
        "Parsed input"
    );
    Ok(table)
}

/// Reads and parses a file from disk.
///
/// # Errors
///
/// Returns [`PrepError::InvalidPath`] when the path has no file name, plus any
/// read or [`load_bytes`] error.
pub fn load_path(path: &Path) -> Result<Table> {
    let name = file_name_of(path)?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    load_bytes(&name, &bytes)
}

pub(crate) fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| PrepError::InvalidPath(path.display().to_string()))
}

fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_owned())
        .unwrap_or_else(|| name.to_owned())
}

/// Serializes the table as RFC-4180 CSV: header line, then one line per row.
///
/// # Errors
///
/// Returns [`PrepError::Parse`] if the CSV writer fails.
pub fn write_csv(table: &Table) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(
            table
                .columns
                .iter()
                .map(|c| row.get(c).map(String::as_str).unwrap_or_default()),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PrepError::Parse(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PrepError::Parse(e.to_string()))
}

/// Writes [`write_csv`] output to `path`.
///
/// # Errors
///
/// Returns serialization or write errors.
pub fn save_csv(table: &Table, path: &Path) -> Result<()> {
    let csv = write_csv(table)?;
    std::fs::write(path, csv).with_context(|| format!("Failed to write {}", path.display()))
}

/// Download name for the preprocessed export of `source`.
pub fn export_file_name(source: Option<&str>) -> String {
    format!("preprocessed_{}", source.unwrap_or("data.csv"))
}
