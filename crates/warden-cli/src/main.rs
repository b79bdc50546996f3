//! `warden`: correlate campus activity logs around a person.
//!
//! # Usage
//!
//! ```
//! warden                      # interactive terminal UI
//! warden search "ada"         # profile summaries
//! warden timeline E1001       # chronological activity report
//! warden predict E1001        # last sighting and next-location guess
//! warden --config ~/.config/warden/warden.toml sources
//! ```

mod app;
mod session;
mod settings;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use session::Session;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use warden_core::source::LogSource;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "warden", version, about = "Campus activity correlation")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "warden.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Find profiles by name or any identifier.
  Search {
    term: String,
    /// Print matching profiles as JSON.
    #[arg(long)]
    json: bool,
  },
  /// Print the activity timeline for an entity.
  Timeline { entity_id: String },
  /// Print the last known location and the predicted next one.
  Predict { entity_id: String },
  /// Print where the entity's face image is expected.
  Face { entity_id: String },
  /// Report problems found in the loaded log files.
  Sources {
    /// Only this source (card_swipes, wifi, camera, lab_bookings, library,
    /// notes).
    source: Option<LogSource>,
  },
  /// Clean raw exports into the data directory.
  Clean,
  /// Retrain the location predictor and save it.
  Train,
  /// Interactive terminal UI (the default).
  Tui,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  let args = Args::parse();
  let settings = Settings::load(&args.config)?;
  let command = args.command.unwrap_or(Command::Tui);

  init_tracing(matches!(command, Command::Tui), settings.log_file.as_deref())?;

  match command {
    Command::Clean => {
      let report = session::clean(&settings)?;
      for path in &report.written {
        println!("wrote {}", path.display());
      }
      for (file, reason) in &report.skipped {
        println!("skipped '{file}': {reason}");
      }
      for r in &report.reassignments {
        println!(
          "reassigned {} {} -> {} (entity {})",
          r.column,
          r.old,
          r.new,
          r.entity_id.as_deref().unwrap_or("N/A")
        );
      }
      Ok(())
    }
    Command::Tui => run_tui(Session::open(settings)?),
    command => run_command(Session::open(settings)?, command),
  }
}

fn init_tracing(tui: bool, log_file: Option<&Path>) -> Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  let builder = tracing_subscriber::fmt().with_env_filter(filter);

  match (tui, log_file) {
    (false, _) => builder.with_writer(io::stderr).init(),
    (true, Some(path)) => {
      let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }
    // Anything written to the terminal would tear the UI.
    (true, None) => builder.with_writer(io::sink).init(),
  }
  Ok(())
}

// ─── One-shot commands ────────────────────────────────────────────────────────

fn run_command(mut session: Session, command: Command) -> Result<()> {
  match command {
    Command::Search { term, json } => {
      let result = session.search(&term);
      if json {
        println!(
          "{}",
          serde_json::to_string_pretty(result.matches())
            .context("serialising matches")?
        );
      } else {
        println!("{result}");
      }
    }
    Command::Timeline { entity_id } => match session.timeline(&entity_id) {
      Ok(timeline) => println!("{timeline}"),
      Err(e) => println!("{e}"),
    },
    Command::Predict { entity_id } => match session.predict_for(&entity_id) {
      Ok(report) => println!("{report}"),
      Err(e) => println!("{e}"),
    },
    Command::Face { entity_id } => match session.face_image(&entity_id) {
      Ok(face) => println!("{face}"),
      Err(e) => println!("{e}"),
    },
    Command::Sources { source: only } => {
      let store = session.store();
      for source in LogSource::ALL.into_iter().filter(|s| only.is_none_or(|o| o == *s)) {
        let status = if store.is_usable(source) { "ok" } else { "disabled" };
        println!("{:<20} {:<9} {}", source.label(), status, source.file_name());
        for warning in store.warnings().iter().filter(|w| w.source == source) {
          println!("    {warning}");
        }
      }
    }
    Command::Train => println!("{}", session.retrain()?),
    Command::Clean | Command::Tui => {}
  }
  Ok(())
}

// ─── Terminal UI ──────────────────────────────────────────────────────────────

fn run_tui(session: Session) -> Result<()> {
  let mut app = App::new(session);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app);

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    if !event::poll(Duration::from_millis(250)).context("polling events")? {
      continue;
    }
    match event::read().context("reading event")? {
      Event::Key(key) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key) {
          break;
        }
      }
      // Terminal will redraw on next iteration.
      _ => {}
    }
  }
  Ok(())
}

// ─── Shared test helpers ──────────────────────────────────────────────────────
