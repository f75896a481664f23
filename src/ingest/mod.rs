//! Telemetry ingestion - the producer side.
//!
//! - [`Ingestor`] owns the background thread
//! - [`run_ingest_loop`] is the loop body, usable on any [`RecordSource`]
//!
//! [`RecordSource`]: crate::transport::RecordSource

mod ingest_loop;
mod ingestor;
mod types;

pub use ingest_loop::{ingest_record, run_ingest_loop};
pub use ingestor::Ingestor;
pub use types::{IngestError, IngestReport, IngestStats};
