mod archive;
mod conflict;
mod error;
mod mutations;
mod queries;

pub use archive::{is_expired, partition_expired, ArchiveCutoff};
pub use conflict::{today_utc, ConflictPolicy};
pub use error::{Locator, StoreError};

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, OwnedRwLockWriteGuard, RwLock};
use tracing::info;

use crate::model::StoreDocument;
use crate::observability;
use crate::persist;

/// Behavior switches for a store instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub conflict_policy: ConflictPolicy,
    pub archive_cutoff: ArchiveCutoff,
}

// ── Persistence writer ───────────────────────────────────

struct WriteCommand {
    bytes: Vec<u8>,
    response: oneshot::Sender<io::Result<()>>,
}

/// Background task that owns the data file. Each command replaces the whole
/// document; the caller is answered only after the rename has landed.
async fn writer_loop(path: PathBuf, mut rx: mpsc::Receiver<WriteCommand>) {
    while let Some(WriteCommand { bytes, response }) = rx.recv().await {
        let size = bytes.len();
        let start = std::time::Instant::now();
        let target = path.clone();
        let result = tokio::task::spawn_blocking(move || persist::write_atomic(&target, &bytes))
            .await
            .unwrap_or_else(|e| Err(io::Error::other(e)));
        metrics::histogram!(observability::PERSIST_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        if result.is_ok() {
            metrics::histogram!(observability::PERSIST_BYTES).record(size as f64);
        }
        let _ = response.send(result);
    }
}

/// Hand serialized bytes to the writer and wait for the result.
async fn write(writer_tx: &mpsc::Sender<WriteCommand>, bytes: Vec<u8>) -> Result<(), StoreError> {
    let (tx, rx) = oneshot::channel();
    writer_tx
        .send(WriteCommand { bytes, response: tx })
        .await
        .map_err(|_| StoreError::Persist("writer shut down".into()))?;
    rx.await
        .map_err(|_| StoreError::Persist("writer dropped response".into()))?
        .map_err(|e| StoreError::Persist(e.to_string()))
}

/// Exclusive access to the document, owned so it can move into a commit task.
pub(super) type StateGuard = OwnedRwLockWriteGuard<StoreDocument>;

/// The booking store: active and archived bookings behind a single lock.
///
/// Every mutation builds the next document from a copy, persists it, and only
/// then installs it, so a failed write leaves memory and disk in agreement.
/// Persist and install run in their own task: dropping the caller's future
/// cannot separate them.
pub struct BookingStore {
    state: Arc<RwLock<StoreDocument>>,
    writer_tx: mpsc::Sender<WriteCommand>,
    options: StoreOptions,
    path: PathBuf,
}

impl BookingStore {
    /// Load the document at `path` and start its writer task.
    /// Must be called inside a tokio runtime.
    pub fn open(path: PathBuf, options: StoreOptions) -> Self {
        let doc = persist::load(&path);
        info!(
            active = doc.bookings.len(),
            past = doc.past.len(),
            "loaded {}",
            path.display()
        );
        observability::record_sizes(&doc);

        let (writer_tx, writer_rx) = mpsc::channel(64);
        tokio::spawn(writer_loop(path.clone(), writer_rx));

        Self {
            state: Arc::new(RwLock::new(doc)),
            writer_tx,
            options,
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub(super) async fn lock(&self) -> StateGuard {
        self.state.clone().write_owned().await
    }

    /// Persist `next`, install it behind `guard`, and hand the guard back.
    pub(super) async fn commit(&self, mut guard: StateGuard, next: StoreDocument) -> Result<StateGuard, StoreError> {
        let writer_tx = self.writer_tx.clone();
        let path = self.path.clone();
        let task = tokio::spawn(async move {
            let bytes = persist::encode(&next).map_err(|e| StoreError::Persist(e.to_string()))?;
            if let Err(e) = write(&writer_tx, bytes).await {
                tracing::error!("failed to persist {}: {e}", path.display());
                return Err(e);
            }
            *guard = next;
            observability::record_sizes(&guard);
            Ok(guard)
        });
        task.await.map_err(|e| StoreError::Persist(e.to_string()))?
    }
}
