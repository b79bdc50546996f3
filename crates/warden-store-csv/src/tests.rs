//! Integration tests for `CsvStore` and `Cleaner` against temporary
//! directories.

use std::{fs, path::Path};

use tempfile::TempDir;
use warden_core::{
  resolve::{find_by_entity_id, search},
  source::LogSource,
  store::ActivityStore,
  timeline::assemble,
};

use crate::{
  Cleaner, CleanerConfig, CsvStore, Error, PROFILES_FILE, WarningKind,
  clean::RAW_PROFILES_FILE,
};

fn write(dir: &Path, name: &str, contents: &str) {
  fs::write(dir.join(name), contents).expect("write fixture");
}

const PROFILES: &str = "\
entity_id,name,email,card_id,device_hash,face_id,student_id,staff_id,role,department
E1,Alice Smith,alice@campus.edu,C1,D1,F1,S10,,student,Physics
E2,Bob Jones,bob@campus.edu,2002.0,,F2,,T1,staff,IT
";

fn data_dir() -> TempDir {
  let dir = tempfile::tempdir().expect("tempdir");
  write(dir.path(), PROFILES_FILE, PROFILES);
  write(
    dir.path(),
    "campus card_swipes.csv",
    "card_id,timestamp,location_id\n\
     C1,2024-01-01 09:00:00,GATE1\n\
     2002,2024-01-01 08:00:00,GATE2\n",
  );
  write(
    dir.path(),
    "wifi_associations_logs.csv",
    "device_hash,timestamp,ap_id\n\
     D1,2024-01-01 08:30:00,AP-LIB\n",
  );
  write(
    dir.path(),
    "library_checkouts.csv",
    "entity_id,timestamp\n\
     E1,2024-01-02 10:00:00\n",
  );
  // cctv_frames.csv deliberately absent; lab bookings lack the join column.
  write(
    dir.path(),
    "lab_bookings.csv",
    "student,start_time,room_id,end_time,attended (YES/NO)\n\
     E1,2024-01-01 07:00:00,LAB1,2024-01-01 08:00:00,YES\n",
  );
  dir
}

// ─── Loading ─────────────────────────────────────────────────────────────────

#[test]
fn open_loads_profiles_and_reports_registry_warnings() {
  let dir = data_dir();
  let store = CsvStore::open(dir.path()).unwrap();

  assert_eq!(store.profiles().len(), 2);
  assert!(store.log_table(LogSource::CardSwipes).is_some());
  assert!(store.log_table(LogSource::CameraFrames).is_none());

  let kinds: Vec<_> = store
    .warnings()
    .iter()
    .map(|w| (w.source, w.kind.clone()))
    .collect();
  assert!(kinds.contains(&(LogSource::CameraFrames, WarningKind::MissingFile)));
  assert!(kinds.contains(&(
    LogSource::LabBookings,
    WarningKind::MissingJoinColumn("entity_id")
  )));
  assert!(kinds.contains(&(
    LogSource::LibraryCheckouts,
    WarningKind::MissingDetailColumn("book_id")
  )));

  assert!(store.is_usable(LogSource::CardSwipes));
  assert!(store.is_usable(LogSource::LibraryCheckouts));
  assert!(!store.is_usable(LogSource::LabBookings));
  assert!(!store.is_usable(LogSource::CameraFrames));
}

#[test]
fn missing_directory_and_missing_profiles_are_fatal() {
  let dir = tempfile::tempdir().unwrap();
  let gone = dir.path().join("nope");
  assert!(matches!(CsvStore::open(&gone), Err(Error::DataDirMissing(_))));
  assert!(matches!(
    CsvStore::open(dir.path()),
    Err(Error::ProfilesUnavailable { .. })
  ));
}

#[test]
fn reload_picks_up_new_files() {
  let dir = data_dir();
  let mut store = CsvStore::open(dir.path()).unwrap();
  assert!(store.log_table(LogSource::CameraFrames).is_none());

  write(
    dir.path(),
    "cctv_frames.csv",
    "face_id,timestamp,location_id\nF1,2024-01-01 12:00:00,CAM-QUAD\n",
  );
  store.reload().unwrap();
  assert!(store.is_usable(LogSource::CameraFrames));
}

// ─── End-to-end correlation ──────────────────────────────────────────────────

#[test]
fn timeline_over_files_degrades_and_orders() {
  let dir = data_dir();
  let store = CsvStore::open(dir.path()).unwrap();

  let alice = search(&store, "alice").pop().unwrap();
  let timeline = assemble(&store, &alice);
  let sources: Vec<_> = timeline.events.iter().map(|e| e.source).collect();
  // Lab booking at 07:00 is skipped (no join column); camera file absent.
  assert_eq!(sources, vec![
    LogSource::WifiAssociations,
    LogSource::CardSwipes,
    LogSource::LibraryCheckouts,
  ]);
  assert!(timeline.to_string().contains("    Book Id: N/A"));
}

#[test]
fn numeric_identifiers_join_regardless_of_rendering() {
  let dir = data_dir();
  let store = CsvStore::open(dir.path()).unwrap();

  let bob = find_by_entity_id(&store, "E2").unwrap();
  let timeline = assemble(&store, &bob);
  assert_eq!(timeline.events.len(), 1);
  assert_eq!(timeline.events[0].details[0].value, "GATE2");
  // Bob has no device hash: no Wi-Fi events.
  assert!(timeline.events.iter().all(|e| e.source != LogSource::WifiAssociations));
}

// ─── Cleaning ────────────────────────────────────────────────────────────────

#[test]
fn cleaner_produces_a_loadable_directory() {
  let raw = tempfile::tempdir().unwrap();
  let out = tempfile::tempdir().unwrap();
  let clean_dir = out.path().join("clean");

  write(
    raw.path(),
    RAW_PROFILES_FILE,
    "entity_id,name,student_id,staff_id,card_id\n\
     E1,Alice,S10,,C1\n\
     E2,Ann,S10,,C2\n\
     E3,Tom,,T7,C3\n",
  );
  write(
    raw.path(),
    "campus card_swipes.csv",
    "card_id,timestamp,location_id\n\
     C1,2024-01-01T09:00:00,GATE1\n\
     C2,garbage,GATE2\n",
  );
  write(
    raw.path(),
    "lab_bookings.csv",
    "entity_id,start_time,room_id,end_time,attended (YES/NO)\n\
     E1,01/03/2024 10:00,LAB1,01/03/2024 12:00,NO\n",
  );

  let report = Cleaner::new(CleanerConfig::new(raw.path(), &clean_dir))
    .run()
    .unwrap();

  assert_eq!(report.written.len(), 3);
  assert!(report.skipped.iter().any(|(f, _)| f == "cctv_frames.csv"));
  assert_eq!(report.reassignments.len(), 1);
  assert_eq!(report.reassignments[0].old, "S10");
  assert_eq!(report.reassignments[0].new, "S11");
  assert_eq!(report.reassignments[0].entity_id.as_deref(), Some("E2"));

  let store = CsvStore::open(&clean_dir).unwrap();
  let alice = find_by_entity_id(&store, "E1").unwrap();
  assert_eq!(alice.get("student_id"), Some("S10"));
  let ann = find_by_entity_id(&store, "E2").unwrap();
  assert_eq!(ann.get("student_id"), Some("S11"));

  let swipes = fs::read_to_string(clean_dir.join("campus card_swipes.csv")).unwrap();
  assert!(swipes.contains("C1,2024-01-01 09:00:00,GATE1"));
  assert!(swipes.contains("C2,,GATE2"));

  let labs = fs::read_to_string(clean_dir.join("lab_bookings.csv")).unwrap();
  assert!(labs.contains("E1,2024-01-03 10:00:00,LAB1,2024-01-03 12:00:00,NO"));
}

#[test]
fn unusable_timestamp_format_fails_before_writing() {
  let raw = tempfile::tempdir().unwrap();
  let out = tempfile::tempdir().unwrap();
  let clean_dir = out.path().join("clean");
  write(
    raw.path(),
    "campus card_swipes.csv",
    "card_id,timestamp,location_id\nC1,2024-01-01 09:00:00,GATE1\n",
  );

  let config = CleanerConfig {
    timestamp_format: "%Y-%m-%d %Q".into(),
    ..CleanerConfig::new(raw.path(), &clean_dir)
  };
  let err = Cleaner::new(config).run().unwrap_err();
  assert!(matches!(
    err,
    Error::Core(warden_core::Error::InvalidTimeFormat(_))
  ));
  assert!(!clean_dir.exists());
}
