//! segrev: segment review TUI for translation projects.
//!
//! Entry point for the `segrev` binary. Wires together configuration (`config`), the
//! terminal lifecycle (`tui`), the unified event bus (`event`), the local engine thread
//! (`engine`), UI state (`app`) and rendering (`ui`).
//!
//! # Startup sequence
//!
//! 1. Parse CLI flags and load the config file. Read-only, safe before terminal init.
//! 2. Start file logging. The terminal belongs to the TUI, so nothing is logged to stdout.
//! 3. `install_panic_hook()` so it is the innermost hook, then `register_sigterm()`.
//! 4. Open the WAL-mode database and, when a document was given, import it.
//! 5. `init_tui()`, spawn the event task and the engine, send the first segment request.
//!
//! `restore_tui()` is called after the event loop exits. The `?` operator is only used
//! before `init_tui()` or inside the Render arm, whose errors propagate out of the loop
//! after `break`.

mod app;
mod config;
mod engine;
mod event;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use clap::Parser;
use segrev_core::error::Notice;
use segrev_core::protocol::{EngineContext, EngineRequest};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::event::AppEvent;
use crate::ui::keybindings::{KeyAction, handle_key, handle_mouse};

#[derive(Debug, Parser)]
#[command(name = "segrev", version, about = "Review translation segments in the terminal")]
struct Args {
    /// Document (TOML) to import, replacing whatever the database holds.
    document: Option<PathBuf>,

    /// SQLite database path.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Config file to read instead of the XDG default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project name sent as the engine context.
    #[arg(long)]
    project: Option<String>,
}

/// Sends all `tracing` output to the configured log file.
///
/// `RUST_LOG` overrides the default `info` level. Failure to open the file disables
/// logging rather than aborting startup.
fn init_logging(path: &Path) {
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    let config_file = args.config.clone().unwrap_or_else(config::config_path);
    let (mut config, config_warning) = Config::load(&config_file);
    if let Some(db) = args.db {
        config.database = db;
    }

    init_logging(&config.log_path());
    if let Some(warning) = config_warning {
        tracing::warn!(path = %config_file.display(), "{warning}");
    }
    let theme = theme::Theme::from_name(&config.theme);

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;

    // Import before the engine starts so its first query sees the new document.
    if let Some(parent) = config.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let db_path = config.database.to_string_lossy().into_owned();
    let db = segrev_core::db::open_db(&db_path).await.map_err(io_error)?;

    let project = match &args.document {
        Some(path) => {
            let document = segrev_core::document::load_document(path).map_err(io_error)?;
            let project = args
                .project
                .clone()
                .or(document.project)
                .unwrap_or_else(|| config.project.clone());
            let imported = segrev_core::db::import_document(
                &db,
                &project,
                &path.display().to_string(),
                document.segments,
            )
            .await
            .map_err(io_error)?;
            tracing::info!(%project, imported, path = %path.display(), "document imported");
            project
        }
        None => match args.project.clone() {
            Some(project) => project,
            None => segrev_core::db::stored_project(&db)
                .await
                .map_err(io_error)?
                .unwrap_or_else(|| config.project.clone()),
        },
    };
    drop(db);

    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let engine_tx =
        engine::spawn_engine(config.database.clone(), project.clone(), handler.tx.clone())?;
    let mut state = app::AppState::new(
        EngineContext::new(project),
        engine_tx,
        config.stall_after(),
        config.double_click(),
    );
    state.send(EngineRequest::GetSegments);

    'event_loop: loop {
        tokio::select! {
            // Heartbeat: SIGTERM is checked at least every 50ms even when the bus is quiet.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        terminal.draw(|frame| ui::render(frame, &mut state, &theme))?;
                    }
                    Some(AppEvent::Key(key)) => {
                        if handle_key(key, &mut state) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Mouse(mouse)) => {
                        if handle_mouse(mouse, &mut state) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Tick) => state.tick(Instant::now()),
                    Some(AppEvent::Engine(reply)) => state.apply_reply(*reply),
                    Some(AppEvent::EngineStopped(reason)) => {
                        tracing::error!(%reason, "engine stopped");
                        state.engine_down = true;
                        state.notify(Notice::error("Engine", reason));
                    }
                    // ratatui picks up the new size on the next Render.
                    Some(AppEvent::Resize(_, _)) => {}
                    None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    tracing::info!("exited");
    Ok(())
}
