use std::sync::Arc;

use tracing::{error, info};

use crate::listener::ChangeListener;
use crate::notify::Notifier;
use crate::remote::RemoteBackend;
use crate::session::Authenticator;
use crate::store::{OrderStore, StoreClient};

const STORE_MAILBOX: usize = 64;

/// The assembled point-of-sale system: the store actor plus the change
/// listener wired to the backend's feed.
///
/// Responsible for starting the pieces in order, handing out the store
/// client, and shutting everything down cleanly.
pub struct PosSystem {
    pub store: StoreClient,
    listener: ChangeListener,
    store_handle: tokio::task::JoinHandle<()>,
}

impl PosSystem {
    pub fn new(
        backend: Arc<dyn RemoteBackend>,
        auth: Arc<dyn Authenticator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        info!("Starting POS system");

        // Subscribe before the store goes live so no change slips past the
        // listener during startup.
        let feed = backend.changes();

        let (store_actor, store) = OrderStore::new(STORE_MAILBOX, backend, auth, notifier);
        let store_handle = tokio::spawn(store_actor.run());
        let listener = ChangeListener::spawn(feed, store.clone());

        info!("POS system started");
        Self {
            store,
            listener,
            store_handle,
        }
    }

    /// Stops the listener first so no reconciling fetch lands in a closing
    /// mailbox, then drains the store actor.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down POS system");

        self.listener.stop();
        let _ = self.store.shutdown().await;
        if let Err(e) = self.store_handle.await {
            error!(error = ?e, "Store task failed during shutdown");
            return Err(format!("store task failed: {:?}", e));
        }

        info!("POS system shutdown complete");
        Ok(())
    }
}
