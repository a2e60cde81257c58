//! Background highlight worker.
//!
//! Owns a [`HighlightSource`] on a dedicated thread. Requests arriving faster
//! than the source can answer are coalesced: only the newest queued snapshot
//! is computed.

use crate::{DocumentIdentity, HighlightError, HighlightRequest, HighlightSource, HighlightSpan};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Worker answer for one snapshot.
#[derive(Debug)]
pub struct HighlightReply {
    pub identity: DocumentIdentity,
    pub spans: Result<Vec<HighlightSpan>, HighlightError>,
}

pub struct HighlightWorker {
    tx: Option<Sender<HighlightRequest>>,
    rx: Receiver<HighlightReply>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for HighlightWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightWorker")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl HighlightWorker {
    pub fn spawn<S>(mut source: S) -> Result<Self, HighlightError>
    where
        S: HighlightSource + 'static,
    {
        let (tx, rx_cmd) = crossbeam_channel::unbounded::<HighlightRequest>();
        let (tx_evt, rx_evt) = crossbeam_channel::unbounded();
        let handle = thread::Builder::new()
            .name("quill-highlight".to_string())
            .spawn(move || {
                for req in rx_cmd.iter() {
                    let mut latest = req;
                    let mut skipped = 0usize;
                    while let Ok(next) = rx_cmd.try_recv() {
                        latest = next;
                        skipped += 1;
                    }
                    let started = Instant::now();
                    let spans = source.get_highlights(latest.identity.buffer_id, &latest.text);
                    trace!(
                        target: "syntax.worker",
                        buffer = %latest.identity.buffer_id,
                        revision = latest.identity.revision,
                        skipped,
                        elapsed_ms = started.elapsed().as_secs_f32() * 1000.0,
                        "highlight pass"
                    );
                    let reply = HighlightReply {
                        identity: latest.identity,
                        spans,
                    };
                    if tx_evt.send(reply).is_err() {
                        break;
                    }
                }
                debug!(target: "syntax.worker", "highlight worker stopped");
            })?;
        Ok(Self {
            tx: Some(tx),
            rx: rx_evt,
            handle: Some(handle),
        })
    }

    pub fn submit(&self, request: HighlightRequest) -> Result<(), HighlightError> {
        self.tx
            .as_ref()
            .ok_or(HighlightError::WorkerDisconnected)?
            .send(request)
            .map_err(|_| HighlightError::WorkerDisconnected)
    }

    /// Non-blocking poll for a finished reply.
    pub fn try_recv(&self) -> Option<HighlightReply> {
        match self.rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for a reply.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<HighlightReply> {
        match self.rx.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for HighlightWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
