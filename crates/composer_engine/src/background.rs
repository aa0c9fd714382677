use std::sync::{mpsc, Arc};
use std::thread;

use composer_core::QueuedMessage;
use composer_logging::composer_warn;

use crate::QueueStore;

enum WriterCommand<T> {
    Write(T),
    Flush(mpsc::Sender<()>),
}

/// Worker thread that applies snapshots in the order they were submitted,
/// so callers never wait on the disk.
///
/// Dropping the writer lets it finish everything already submitted.
pub struct BackgroundWriter<T> {
    cmd_tx: Option<mpsc::Sender<WriterCommand<T>>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl<T: Send + 'static> BackgroundWriter<T> {
    pub fn spawn<F>(mut write: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<WriterCommand<T>>();
        let worker = thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    WriterCommand::Write(snapshot) => write(snapshot),
                    WriterCommand::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });

        Self {
            cmd_tx: Some(cmd_tx),
            worker: Some(worker),
        }
    }

    /// Queues `snapshot` for writing. `false` if the worker has gone away.
    pub fn submit(&self, snapshot: T) -> bool {
        self.cmd_tx
            .as_ref()
            .is_some_and(|cmd_tx| cmd_tx.send(WriterCommand::Write(snapshot)).is_ok())
    }

    /// Blocks until every snapshot submitted so far has been written.
    pub fn flush(&self) {
        let Some(cmd_tx) = &self.cmd_tx else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::channel();
        if cmd_tx.send(WriterCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl<T> Drop for BackgroundWriter<T> {
    fn drop(&mut self) {
        self.cmd_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Fire-and-forget queue store: saves go through a [`BackgroundWriter`].
pub struct BackgroundStore<S> {
    inner: Arc<S>,
    writer: BackgroundWriter<Vec<QueuedMessage>>,
}

impl<S> BackgroundStore<S>
where
    S: QueueStore + Sync + 'static,
{
    pub fn new(inner: S) -> Self {
        let inner = Arc::new(inner);
        let store = inner.clone();
        let writer = BackgroundWriter::spawn(move |messages: Vec<QueuedMessage>| {
            store.save(&messages)
        });
        Self { inner, writer }
    }

    /// Blocks until every save issued so far has been written.
    pub fn flush(&self) {
        self.writer.flush();
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S> QueueStore for BackgroundStore<S>
where
    S: QueueStore + Sync + 'static,
{
    fn load(&self) -> Vec<QueuedMessage> {
        self.flush();
        self.inner.load()
    }

    fn save(&self, messages: &[QueuedMessage]) {
        if !self.writer.submit(messages.to_vec()) {
            composer_warn!("Queue writer is gone, dropping save of {} message(s)", messages.len());
        }
    }
}
