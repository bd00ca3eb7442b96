//! Per-collection write queue.
//!
//! One task per collection kind drains an unbounded channel and performs
//! one backend write at a time. Snapshots queued behind an in-flight write
//! are coalesced so only the newest one is written.

use super::notice::StoreNotice;
use crate::kv::KvError;
use crate::storage::{CollectionStorage, Record, StorageCause, StorageError};
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

enum WriteJob<T> {
    Save(Arc<Vec<T>>),
    Flush(oneshot::Sender<()>),
}

pub(crate) struct CollectionWriter<T: Record> {
    tx: mpsc::UnboundedSender<WriteJob<T>>,
    task: JoinHandle<()>,
}

impl<T: Record> CollectionWriter<T> {
    /// Spawns the writer task on the current Tokio runtime.
    pub(crate) fn spawn(
        storage: CollectionStorage,
        notices: broadcast::Sender<StoreNotice>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_writer::<T>(storage, rx, notices));
        Self { tx, task }
    }

    /// Queues a full-collection write. Never blocks.
    pub(crate) fn enqueue(&self, items: Arc<Vec<T>>) {
        if self.tx.send(WriteJob::Save(items)).is_err() {
            warn!(
                "event=collection_save module=store status=dropped kind={} reason=writer_closed",
                T::KIND
            );
        }
    }

    /// Resolves once every write queued before this call has been attempted.
    pub(crate) async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(WriteJob::Flush(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    /// Stops accepting jobs and waits for queued writes to finish.
    pub(crate) async fn close(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}

async fn run_writer<T: Record>(
    storage: CollectionStorage,
    mut rx: mpsc::UnboundedReceiver<WriteJob<T>>,
    notices: broadcast::Sender<StoreNotice>,
) {
    while let Some(job) = rx.recv().await {
        let mut latest = None;
        let mut acks = Vec::new();
        let mut coalesced = 0usize;

        absorb(job, &mut latest, &mut acks, &mut coalesced);
        while let Ok(job) = rx.try_recv() {
            absorb(job, &mut latest, &mut acks, &mut coalesced);
        }

        if let Some(items) = latest {
            if coalesced > 1 {
                debug!(
                    "event=collection_save module=store status=coalesced kind={} skipped={}",
                    T::KIND,
                    coalesced - 1
                );
            }
            if let Err(err) = write_blocking(storage.clone(), items).await {
                warn!(
                    "event=collection_save module=store status=error kind={} error={}",
                    T::KIND,
                    err
                );
                let _ = notices.send(StoreNotice::from(&err));
            }
        }

        for ack in acks {
            let _ = ack.send(());
        }
    }
}

fn absorb<T>(
    job: WriteJob<T>,
    latest: &mut Option<Arc<Vec<T>>>,
    acks: &mut Vec<oneshot::Sender<()>>,
    coalesced: &mut usize,
) {
    match job {
        WriteJob::Save(items) => {
            *latest = Some(items);
            *coalesced += 1;
        }
        WriteJob::Flush(ack) => acks.push(ack),
    }
}

async fn write_blocking<T: Record>(
    storage: CollectionStorage,
    items: Arc<Vec<T>>,
) -> Result<(), StorageError> {
    match tokio::task::spawn_blocking(move || storage.save::<T>(&items)).await {
        Ok(result) => result,
        Err(join_err) => Err(StorageError::Write {
            kind: T::KIND,
            cause: StorageCause::Backend(KvError::Unavailable(format!(
                "write task aborted: {join_err}"
            ))),
        }),
    }
}
