//! [`CsvStore`]: the flat-file implementation of [`ActivityStore`].

use std::{
  collections::BTreeMap,
  fmt,
  path::{Path, PathBuf},
};

use serde::Serialize;
use warden_core::{
  profile::Profile,
  source::LogSource,
  store::ActivityStore,
  table::Table,
};

use crate::{Error, Result, csv_io::read_table};

/// File name of the cleaned profiles table.
pub const PROFILES_FILE: &str = "profiles_cleaned.csv";

// ─── Warnings ────────────────────────────────────────────────────────────────

/// Why a registered source is degraded. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum WarningKind {
  MissingFile,
  Unreadable(String),
  MissingJoinColumn(&'static str),
  MissingTimestampColumn(&'static str),
  /// The source is still queried; the column renders as `N/A`.
  MissingDetailColumn(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceWarning {
  pub source: LogSource,
  pub kind:   WarningKind,
}

impl SourceWarning {
  /// Whether this warning stops the source from contributing events.
  pub fn disables_source(&self) -> bool {
    !matches!(self.kind, WarningKind::MissingDetailColumn(_))
  }
}

impl fmt::Display for SourceWarning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let file = self.source.file_name();
    match &self.kind {
      WarningKind::MissingFile => write!(f, "{}: '{file}' not found", self.source),
      WarningKind::Unreadable(reason) => {
        write!(f, "{}: '{file}' could not be read: {reason}", self.source)
      }
      WarningKind::MissingJoinColumn(col) => {
        write!(f, "{}: '{file}' has no join column '{col}'", self.source)
      }
      WarningKind::MissingTimestampColumn(col) => {
        write!(f, "{}: '{file}' has no timestamp column '{col}'", self.source)
      }
      WarningKind::MissingDetailColumn(col) => {
        write!(f, "{}: '{file}' has no column '{col}'", self.source)
      }
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Every table from one cleaned data directory, held in memory.
#[derive(Debug, Clone)]
pub struct CsvStore {
  dir:      PathBuf,
  profiles: Vec<Profile>,
  logs:     BTreeMap<LogSource, Table>,
  warnings: Vec<SourceWarning>,
}

impl CsvStore {
  /// Load every table under `dir`.
  ///
  /// Fails only when the directory or the profiles table is unusable; each
  /// log source that cannot be loaded becomes a [`SourceWarning`].
  pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    if !dir.is_dir() {
      return Err(Error::DataDirMissing(dir));
    }

    let profiles_path = dir.join(PROFILES_FILE);
    let profiles_table =
      read_table(&profiles_path).map_err(|e| Error::ProfilesUnavailable {
        path:   profiles_path.clone(),
        reason: e.to_string(),
      })?;
    let profiles: Vec<Profile> =
      profiles_table.rows().map(|row| Profile::from_row(&row)).collect();
    tracing::info!(count = profiles.len(), "loaded '{PROFILES_FILE}'");

    let mut logs = BTreeMap::new();
    let mut warnings = Vec::new();
    for source in LogSource::ALL {
      let path = dir.join(source.file_name());
      if !path.is_file() {
        warnings.push(SourceWarning { source, kind: WarningKind::MissingFile });
        continue;
      }
      match read_table(&path) {
        Ok(table) => {
          tracing::info!(%source, rows = table.len(), "loaded '{}'", source.file_name());
          warnings.extend(validate(source, &table));
          logs.insert(source, table);
        }
        Err(e) => {
          tracing::error!(%source, error = %e, "failed to load '{}'", source.file_name());
          warnings.push(SourceWarning {
            source,
            kind: WarningKind::Unreadable(e.to_string()),
          });
        }
      }
    }

    for w in &warnings {
      tracing::warn!("{w}");
    }

    Ok(Self { dir, profiles, logs, warnings })
  }

  /// Re-read the directory this store was opened from. On failure the
  /// current tables are kept.
  pub fn reload(&mut self) -> Result<()> {
    *self = Self::open(&self.dir)?;
    Ok(())
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Registry validation findings from the last load.
  pub fn warnings(&self) -> &[SourceWarning] { &self.warnings }

  /// Whether timeline assembly will query `source`.
  pub fn is_usable(&self, source: LogSource) -> bool {
    self.logs.contains_key(&source)
      && !self
        .warnings
        .iter()
        .any(|w| w.source == source && w.disables_source())
  }
}

impl ActivityStore for CsvStore {
  fn profiles(&self) -> &[Profile] { &self.profiles }

  fn log_table(&self, source: LogSource) -> Option<&Table> {
    self.logs.get(&source)
  }
}

/// Check a loaded table against its registry descriptor.
fn validate(source: LogSource, table: &Table) -> Vec<SourceWarning> {
  let desc = source.descriptor();
  let mut out = Vec::new();
  if !table.has_column(desc.join_key) {
    out.push(WarningKind::MissingJoinColumn(desc.join_key));
  }
  if !table.has_column(desc.timestamp_field) {
    out.push(WarningKind::MissingTimestampColumn(desc.timestamp_field));
  }
  for &field in desc.descriptive_fields {
    if !table.has_column(field) {
      out.push(WarningKind::MissingDetailColumn(field));
    }
  }
  out
    .into_iter()
    .map(|kind| SourceWarning { source, kind })
    .collect()
}
