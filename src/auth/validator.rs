// Token validator: the cached validation context plus its refresh loop.
//
// The current context lives in a watch channel. Readers clone the Arc and
// validate without holding anything; the refresh task swaps in a whole new
// snapshot with send_replace. A failed refresh keeps the previous snapshot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::backend::ValidationBackend;
use super::context::{TokenClaims, ValidationContext};
use crate::error::AuthError;

pub struct TokenValidator {
    backend: Arc<dyn ValidationBackend>,
    refresh_interval: Duration,
    current: watch::Sender<Arc<ValidationContext>>,
}

impl TokenValidator {
    /// Fetch the first context synchronously. Failure here is fatal to startup.
    pub async fn initialize(
        backend: Arc<dyn ValidationBackend>,
        refresh_interval: Duration,
    ) -> Result<Self, AuthError> {
        let context = backend
            .fetch_context()
            .await
            .map_err(|e| AuthError::Initialization(e.to_string()))?;
        info!(keys = context.key_count(), "Token validator initialized");

        let (current, _) = watch::channel(Arc::new(context));
        Ok(Self {
            backend,
            refresh_interval,
            current,
        })
    }

    /// Validate a raw bearer credential against the latest snapshot.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.context().validate(token)
    }

    /// The latest published snapshot.
    pub fn context(&self) -> Arc<ValidationContext> {
        self.current.borrow().clone()
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Fetch and publish a new snapshot.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let context = self.backend.fetch_context().await?;
        self.current.send_replace(Arc::new(context));
        Ok(())
    }

    /// Run `refresh` every `refresh_interval` until the task is aborted.
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let validator = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(validator.refresh_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; initialize already fetched.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match validator.refresh().await {
                    Ok(()) => info!(
                        keys = validator.context().key_count(),
                        "Refreshed validation context"
                    ),
                    Err(e) => warn!(
                        error = %e,
                        retry_in = ?validator.refresh_interval,
                        "Validation context refresh failed, keeping cached context"
                    ),
                }
            }
        })
    }
}
