//! Latest-value handoff between the ingestion thread and the render loop.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::telemetry::OrientationSample;

struct Slot {
    sample: OrientationSample,
    published: u64,
}

/// Holds the single most recent orientation sample.
///
/// One thread publishes, one thread snapshots. Values are copied in and out
/// whole under the lock, so a reader can never see fields from two
/// different publishes. Nothing is queued: a slow reader skips samples and a
/// slow writer leaves the reader looking at the same one.
pub struct OrientationHandoff {
    slot: Mutex<Slot>,
}

impl OrientationHandoff {
    /// Create a handoff holding `initial` until the first publish.
    pub fn new(initial: OrientationSample) -> Self {
        Self {
            slot: Mutex::new(Slot {
                sample: initial,
                published: 0,
            }),
        }
    }

    /// Replace the held sample.
    pub fn publish(&self, sample: OrientationSample) {
        let mut slot = self.lock();
        slot.sample = sample;
        slot.published += 1;
    }

    /// Copy out the most recently published sample.
    pub fn snapshot(&self) -> OrientationSample {
        self.lock().sample
    }

    /// Number of completed publishes. Diagnostics only.
    pub fn publish_count(&self) -> u64 {
        self.lock().published
    }

    // The slot is always whole, so a panic elsewhere cannot leave it torn.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for OrientationHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.lock();
        f.debug_struct("OrientationHandoff")
            .field("sample", &slot.sample)
            .field("published", &slot.published)
            .finish()
    }
}
