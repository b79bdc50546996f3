//! In-memory tables: one per flat file.
//!
//! A table is loaded once and never mutated afterwards. Cells are optional
//! strings: an empty (or whitespace-only) cell is stored as `None`, which is
//! how the rest of the crate tells "absent" apart from a real value.

// ─── Table ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
  headers: Vec<String>,
  rows:    Vec<Vec<Option<String>>>,
}

impl Table {
  /// Build a table from raw cells. Rows are padded or truncated to the
  /// header width; headers are trimmed.
  pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
    let headers: Vec<String> =
      headers.into_iter().map(|h| h.trim().to_string()).collect();
    let width = headers.len();
    let rows = rows
      .into_iter()
      .map(|row| {
        let mut cells: Vec<Option<String>> =
          row.into_iter().take(width).map(non_empty).collect();
        cells.resize(width, None);
        cells
      })
      .collect();
    Self { headers, rows }
  }

  pub fn headers(&self) -> &[String] { &self.headers }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Index of `column`, if the table has it.
  pub fn column(&self, column: &str) -> Option<usize> {
    self.headers.iter().position(|h| h == column)
  }

  pub fn has_column(&self, column: &str) -> bool {
    self.column(column).is_some()
  }

  pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
    self.rows.iter().map(move |cells| Row { table: self, cells })
  }

  /// Rows whose `column` matches `value` after join-key normalization on
  /// both sides. A missing column yields nothing.
  pub fn rows_matching<'a>(
    &'a self,
    column: &str,
    value: &str,
  ) -> impl Iterator<Item = Row<'a>> + use<'a> {
    let idx = self.column(column);
    let wanted = join_key(value);
    self.rows().filter(move |row| match idx {
      Some(i) => row.cells[i].as_deref().map(join_key).as_deref()
        == Some(wanted.as_str()),
      None => false,
    })
  }
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// A borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
  table: &'a Table,
  cells: &'a [Option<String>],
}

impl<'a> Row<'a> {
  /// The cell under `column`; `None` for a missing column or empty cell.
  pub fn get(&self, column: &str) -> Option<&'a str> {
    let idx = self.table.column(column)?;
    self.cells[idx].as_deref()
  }

  /// Iterate `(header, cell)` pairs in column order.
  pub fn cells(&self) -> impl Iterator<Item = (&'a str, Option<&'a str>)> + use<'a> {
    let table: &'a Table = self.table;
    let cells: &'a [Option<String>] = self.cells;
    table
      .headers
      .iter()
      .map(String::as_str)
      .zip(cells.iter().map(Option::as_deref))
  }
}

// ─── Join-key normalization ──────────────────────────────────────────────────

/// Normalize a join value so string and numeric renderings of the same
/// identifier compare equal: trims whitespace and turns integral floats such
/// as `"1234.0"` into `"1234"`.
pub fn join_key(raw: &str) -> String {
  let trimmed = raw.trim();
  if trimmed.contains('.')
    && let Ok(n) = trimmed.parse::<f64>()
    && n.is_finite()
    && n.fract() == 0.0
    && n.abs() < 1e15
  {
    return format!("{}", n as i64);
  }
  trimmed.to_string()
}

fn non_empty(cell: String) -> Option<String> {
  let trimmed = cell.trim();
  if trimmed.is_empty() {
    None
  } else if trimmed.len() == cell.len() {
    Some(cell)
  } else {
    Some(trimmed.to_string())
  }
}
