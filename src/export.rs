//! CSV serialization of projected tables

use crate::{
    error::{SearchError, SearchResult},
    projection::{ProjectedRow, ProjectedTable},
    types::PROJECTED_COLUMNS,
};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Write the header row followed by one row per result
///
/// The header is written even when the table is empty.
pub fn write_csv<W: Write>(table: &ProjectedTable, writer: W) -> SearchResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(PROJECTED_COLUMNS)?;
    for row in table.rows() {
        csv_writer.write_record(row.cells())?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render the table as CSV text
pub fn to_csv_string(table: &ProjectedTable) -> SearchResult<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| SearchError::ExportError(format!("CSV output is not UTF-8: {e}")))
}

/// Write the table to `path`, creating or truncating the file
pub fn export_to_path<P: AsRef<Path>>(table: &ProjectedTable, path: P) -> SearchResult<PathBuf> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_csv(table, file)?;
    log::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(path.to_path_buf())
}

/// Parse CSV produced by [`write_csv`]
pub fn read_csv<R: Read>(reader: R) -> SearchResult<ProjectedTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let rows = csv_reader
        .deserialize::<ProjectedRow>()
        .collect::<Result<Vec<_>, csv::Error>>()?;
    Ok(ProjectedTable::from_rows(rows))
}

/// `<prefix>_YYYYmmdd_HHMMSS.csv` in local time
pub fn timestamped_file_name(prefix: &str) -> String {
    format!(
        "{prefix}_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}
