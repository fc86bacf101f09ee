// Bulk filter orchestrator: one engine pass per message, results in input order.
//
// The service holds no per-call state. Each batch is processed sequentially
// inside its own call; independent batches may run concurrently. Work yields
// to the runtime every YIELD_EVERY messages so a caller deadline can cancel a
// long batch between chunks.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use super::models::{
    Action, ChatMessage, ChatMessageBulk, HealthCheckResponse, MessageBatchResult, MessageResult,
    ServingStatus,
};
use crate::error::ModerationError;
use crate::profanity::traits::ProfanityFilter;

const YIELD_EVERY: usize = 64;

/// Orchestrates `FilterBulk` and `Check` over a shared profanity filter.
#[derive(Clone)]
pub struct FilterService {
    filter: Arc<dyn ProfanityFilter>,
}

impl FilterService {
    pub fn new(filter: Arc<dyn ProfanityFilter>) -> Self {
        Self { filter }
    }

    /// Liveness probe.
    pub fn check(&self) -> HealthCheckResponse {
        HealthCheckResponse {
            status: ServingStatus::Serving,
        }
    }

    /// Moderate a single message.
    ///
    /// Clean messages pass through untouched. Profane messages are censored
    /// and stamped with the moderation time (unix seconds).
    pub fn moderate(&self, message: &ChatMessage) -> MessageResult {
        if !self.filter.is_profane(&message.message) {
            return MessageResult {
                id: message.id.clone(),
                timestamp: message.timestamp,
                action: Action::Pass,
                classification: Vec::new(),
                message: message.message.clone(),
            };
        }

        MessageResult {
            id: message.id.clone(),
            timestamp: Utc::now().timestamp(),
            action: Action::Censored,
            classification: Vec::new(),
            message: self.filter.censor(&message.message),
        }
    }

    /// Moderate a batch. `None` means the caller sent no batch at all.
    ///
    /// Every message yields exactly one result at the same index; there is
    /// no per-message failure.
    pub async fn filter_bulk(
        &self,
        bulk: Option<ChatMessageBulk>,
    ) -> Result<MessageBatchResult, ModerationError> {
        let bulk = bulk.ok_or_else(|| {
            ModerationError::InvalidArgument("request carries no message batch".to_string())
        })?;

        let mut data = Vec::with_capacity(bulk.messages.len());
        for (index, message) in bulk.messages.iter().enumerate() {
            if index > 0 && index % YIELD_EVERY == 0 {
                tokio::task::yield_now().await;
            }
            data.push(self.moderate(message));
        }

        let censored = data.iter().filter(|r| r.action == Action::Censored).count();
        debug!(messages = data.len(), censored, "Filtered message batch");

        Ok(MessageBatchResult { data })
    }

    /// `filter_bulk` bounded by a deadline. An elapsed deadline abandons the
    /// remaining messages and fails the whole call with `Cancelled`.
    pub async fn filter_bulk_within(
        &self,
        bulk: Option<ChatMessageBulk>,
        deadline: Duration,
    ) -> Result<MessageBatchResult, ModerationError> {
        tokio::time::timeout(deadline, self.filter_bulk(bulk))
            .await
            .map_err(|_| {
                ModerationError::Cancelled(format!("deadline of {deadline:?} elapsed"))
            })?
    }
}
