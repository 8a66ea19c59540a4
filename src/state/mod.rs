pub mod lifecycle;
mod sse;

use std::{future::Future, sync::Arc};

use tokio::sync::{Mutex, RwLock, watch};
use tokio::time::timeout;
use tracing::warn;

use crate::{config::AppConfig, dao::league_store::LeagueStore, error::ServiceError};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Central application state holding the storage handle, the SSE hub and the lifecycle gate.
pub struct AppState {
    store: RwLock<Option<Arc<dyn LeagueStore>>>,
    sse: SseHub,
    degraded: watch::Sender<bool>,
    lifecycle_gate: Mutex<()>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            sse: SseHub::new(config.sse_capacity()),
            degraded: degraded_tx,
            lifecycle_gate: Mutex::new(()),
            config,
        })
    }

    /// Build a state with `store` already installed.
    pub async fn with_store(config: AppConfig, store: Arc<dyn LeagueStore>) -> SharedState {
        let state = Self::new(config);
        state.install_store(store).await;
        state
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn LeagueStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store or [`ServiceError::Degraded`] when none is installed or it is unhealthy.
    pub async fn require_store(&self) -> Result<Arc<dyn LeagueStore>, ServiceError> {
        if *self.degraded.borrow() {
            return Err(ServiceError::Degraded);
        }
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn LeagueStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag, notifying watchers only when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    #[cfg(test)]
    pub(crate) async fn hold_lifecycle_gate(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lifecycle_gate.lock().await
    }

    /// Run a lifecycle-mutating unit of work while holding the lifecycle gate.
    ///
    /// The timeout covers both waiting for the gate and running `work`; on expiry the
    /// work future is dropped and [`ServiceError::Timeout`] is returned.
    pub async fn run_gated<F, Fut, T>(
        &self,
        operation: &'static str,
        work: F,
    ) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let gated = async {
            let _gate = self.lifecycle_gate.lock().await;
            work().await
        };

        match self.config.gate_timeout() {
            Some(limit) => match timeout(limit, gated).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(operation, timeout = ?limit, "lifecycle operation timed out");
                    Err(ServiceError::Timeout)
                }
            },
            None => gated.await,
        }
    }
}
