//! The producer loop: read, decode, publish.

use std::sync::atomic::{AtomicBool, Ordering};

use super::types::IngestStats;
use crate::handoff::OrientationHandoff;
use crate::telemetry::Grammar;
use crate::transport::{ReadOutcome, RecordSource, TransportError};

/// Decode one record and publish it if it is well formed.
///
/// A malformed record leaves the handoff untouched, so the last good sample
/// stays visible.
pub fn ingest_record(grammar: Grammar, record: &[u8], handoff: &OrientationHandoff) -> bool {
    match grammar.decode(record) {
        Some(sample) => {
            handoff.publish(sample);
            true
        }
        None => false,
    }
}

/// Run until `stop` is observed or the transport fails.
///
/// The flag is checked before each read, never during one: how quickly a
/// stop takes effect depends on the source's own wait bound.
pub fn run_ingest_loop<S: RecordSource + ?Sized>(
    source: &mut S,
    grammar: Grammar,
    handoff: &OrientationHandoff,
    stop: &AtomicBool,
    max_record_len: usize,
    stats: &mut IngestStats,
) -> Result<(), TransportError> {
    // One buffer for the life of the loop
    let mut buf = vec![0u8; max_record_len.max(1)];
    // Set while the rest of an overlong line is still arriving
    let mut skipping_tail = false;

    while !stop.load(Ordering::SeqCst) {
        match source.read_record(&mut buf) {
            Ok(ReadOutcome::Idle) => {
                stats.idle_polls += 1;
            }
            Ok(ReadOutcome::Record(n)) => {
                let record = &buf[..n.min(buf.len())];
                let line_ended = record.last() == Some(&b'\n');

                if skipping_tail {
                    skipping_tail = !line_ended;
                    log::trace!("Skipped {} bytes of an overlong record", record.len());
                    continue;
                }

                stats.records += 1;
                if record.len() == buf.len() && !line_ended {
                    // The line did not fit: this is only its head
                    stats.misses += 1;
                    skipping_tail = true;
                    log::debug!("Discarded record longer than {} bytes", buf.len());
                } else if ingest_record(grammar, record, handoff) {
                    stats.decoded += 1;
                } else {
                    stats.misses += 1;
                    log::trace!("Discarded record: {:?}", String::from_utf8_lossy(record));
                }
            }
            Err(e) => {
                if e.is_disconnect() {
                    log::warn!("Telemetry link lost: {}", e);
                } else {
                    log::error!("Telemetry read failed: {}", e);
                }
                return Err(e);
            }
        }
    }

    log::debug!("Ingestion stopped on request");
    Ok(())
}
