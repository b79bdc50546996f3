//! Reading and writing CSV files.
//!
//! The store reads straight into an immutable [`Table`]; the cleaner needs
//! to rewrite cells, so it works on a [`RawTable`] instead.

use std::path::Path;

use warden_core::table::Table;

use crate::Result;

// ─── RawTable ────────────────────────────────────────────────────────────────

/// A mutable, header-aligned copy of a CSV file. Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
  pub headers: Vec<String>,
  pub rows:    Vec<Vec<Option<String>>>,
}

impl RawTable {
  pub fn column(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| h == name)
  }
}

// ─── Reading ─────────────────────────────────────────────────────────────────

fn read_records(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .trim(csv::Trim::Headers)
    .from_path(path)?;

  let headers: Vec<String> =
    reader.headers()?.iter().map(str::to_string).collect();
  let mut rows = Vec::new();
  for record in reader.records() {
    let record = record?;
    rows.push(record.iter().map(str::to_string).collect());
  }
  Ok((headers, rows))
}

/// Read `path` into a [`Table`]. Ragged rows are tolerated.
pub fn read_table(path: &Path) -> Result<Table> {
  let (headers, rows) = read_records(path)?;
  Ok(Table::new(headers, rows))
}

/// Read `path` into a [`RawTable`], padding short rows.
pub fn read_raw(path: &Path) -> Result<RawTable> {
  let (headers, records) = read_records(path)?;
  let width = headers.len();
  let rows = records
    .into_iter()
    .map(|record| {
      let mut cells: Vec<Option<String>> = record
        .into_iter()
        .take(width)
        .map(|c| {
          let c = c.trim();
          (!c.is_empty()).then(|| c.to_string())
        })
        .collect();
      cells.resize(width, None);
      cells
    })
    .collect();
  Ok(RawTable { headers, rows })
}

// ─── Writing ─────────────────────────────────────────────────────────────────

/// Write `table` to `path`, replacing any existing file.
pub fn write_raw(path: &Path, table: &RawTable) -> Result<()> {
  let mut writer = csv::Writer::from_path(path)?;
  writer.write_record(&table.headers)?;
  for row in &table.rows {
    writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
  }
  writer.flush()?;
  Ok(())
}
