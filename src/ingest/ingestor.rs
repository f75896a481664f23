//! Ingestion thread handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::ingest_loop::run_ingest_loop;
use super::types::{IngestError, IngestReport, IngestStats};
use crate::handoff::OrientationHandoff;
use crate::telemetry::Grammar;
use crate::transport::RecordSource;

/// Runs the ingestion loop on a background thread.
///
/// The transport moves into the thread and comes back out of
/// [`stop`](Self::stop), so the caller stays responsible for closing it.
pub struct Ingestor<S> {
    /// Cooperative stop request, checked before each read
    stop_signal: Arc<AtomicBool>,
    thread: JoinHandle<IngestReport<S>>,
}

impl<S> Ingestor<S>
where
    S: RecordSource + Send + 'static,
{
    /// Start ingesting records from `source` into `handoff`.
    pub fn spawn(
        source: S,
        grammar: Grammar,
        handoff: Arc<OrientationHandoff>,
        max_record_len: usize,
    ) -> Result<Self, IngestError> {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&stop_signal);

        let thread = thread::Builder::new()
            .name("ingest".into())
            .spawn(move || {
                let mut source = source;
                let mut stats = IngestStats::default();
                let result = run_ingest_loop(
                    &mut source,
                    grammar,
                    &handoff,
                    &stop,
                    max_record_len,
                    &mut stats,
                );
                IngestReport {
                    source,
                    stats,
                    result,
                }
            })?;

        log::debug!("Ingestion thread started ({} grammar)", grammar);

        Ok(Self {
            stop_signal,
            thread,
        })
    }
}

impl<S> Ingestor<S> {
    /// Ask the loop to stop before its next read.
    pub fn request_stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Whether the loop has exited (stop observed or link failed).
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Request a stop and wait for the loop to exit.
    ///
    /// Blocks for as long as the source's current read blocks.
    pub fn stop(self) -> Result<IngestReport<S>, IngestError> {
        self.request_stop();
        self.thread.join().map_err(|_| IngestError::Panicked)
    }
}

impl<S> std::fmt::Debug for Ingestor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("stop_requested", &self.stop_signal.load(Ordering::SeqCst))
            .field("finished", &self.is_finished())
            .finish()
    }
}
