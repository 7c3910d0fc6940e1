//! Local engine for segrev.
//!
//! A background `std::thread` owns its own blocking `rusqlite::Connection` for its
//! lifetime and answers [`Envelope`]s in FIFO order. The UI never touches that connection;
//! it only holds the crossbeam sender returned by [`spawn_engine`].

pub mod worker;

use std::path::PathBuf;

use crossbeam_channel::Sender;
use segrev_core::protocol::Envelope;
use tokio::sync::mpsc::UnboundedSender;

use crate::event::AppEvent;

/// Starts the engine worker thread. Dropping the returned sender stops it.
///
/// # Errors
///
/// Returns `Err` if the OS cannot spawn the thread.
pub fn spawn_engine(
    db_path: PathBuf,
    project: String,
    event_tx: UnboundedSender<AppEvent>,
) -> std::io::Result<Sender<Envelope>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::Builder::new()
        .name("segrev-engine".into())
        .spawn(move || worker::engine_worker_loop(db_path, project, rx, event_tx))?;
    Ok(tx)
}
