//! Subscription to the remote change feed. Any insert/update/delete on the
//! order relations, from any client, triggers a reconciling fetch through
//! the store. One reconciliation per burst is enough: each fetch fully
//! replaces local state, so later results supersede earlier ones.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::remote::ChangeEvent;
use crate::store::StoreClient;

/// Handle to the running listener task. The subscription is released exactly
/// once: either through [`stop`](ChangeListener::stop) or on drop, even when
/// teardown races the setup.
pub struct ChangeListener {
    handle: Option<JoinHandle<()>>,
}

impl ChangeListener {
    pub fn spawn(feed: broadcast::Receiver<ChangeEvent>, store: StoreClient) -> Self {
        let handle = tokio::spawn(run(feed, store));
        Self {
            handle: Some(handle),
        }
    }

    /// Explicit teardown. Idempotent with drop by construction.
    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ChangeListener {
    fn drop(&mut self) {
        self.release();
    }
}

#[instrument(name = "change_listener", skip_all)]
async fn run(mut feed: broadcast::Receiver<ChangeEvent>, store: StoreClient) {
    info!("ChangeListener starting");

    loop {
        let mut relevant = match feed.recv().await {
            Ok(event) => event.concerns_orders(),
            Err(RecvError::Lagged(missed)) => {
                // Events were dropped; we cannot know what changed, so
                // reconcile unconditionally.
                warn!(missed, "Change feed lagged, forcing reconciliation");
                true
            }
            Err(RecvError::Closed) => break,
        };

        // Coalesce whatever queued up behind the first event into one fetch.
        loop {
            match feed.try_recv() {
                Ok(event) => relevant |= event.concerns_orders(),
                Err(TryRecvError::Lagged(_)) => relevant = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if !relevant {
            continue;
        }
        if let Err(e) = store.fetch_orders().await {
            // No direct caller to report to; stale state stands until the
            // next change event.
            warn!(error = %e, "Reconciling fetch failed, keeping stale state");
        }
    }

    info!("ChangeListener stopped");
}
