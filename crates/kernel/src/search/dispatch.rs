//! Latest-wins search dispatch.
//!
//! Starting a search through [`LatestSearch`] cancels whichever search was
//! previously in flight on the same dispatcher. A cancelled search resolves
//! to `None`, so a slow, stale result can never land after a newer one.

use std::future::Future;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Default)]
pub struct LatestSearch {
    slot: Mutex<Slot>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    token: Option<CancellationToken>,
}

impl LatestSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut` as the newest search, superseding any earlier one.
    ///
    /// Returns `None` if a later call superseded this one before it finished.
    pub async fn run<F, T>(&self, fut: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let token = CancellationToken::new();
        let generation = {
            let mut slot = self.slot.lock();
            slot.generation += 1;
            if let Some(previous) = slot.token.replace(token.clone()) {
                previous.cancel();
            }
            slot.generation
        };

        let result = tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!(generation, "search superseded");
                None
            }
            value = fut => Some(value),
        };

        let mut slot = self.slot.lock();
        if slot.generation == generation {
            slot.token = None;
        }
        result
    }

    /// Whether a search is currently in flight.
    pub fn in_flight(&self) -> bool {
        self.slot.lock().token.is_some()
    }
}
