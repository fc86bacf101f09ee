// Bulk filtering: wire models and the orchestrator that drives the engine.

pub mod models;
pub mod service;

pub use models::{
    Action, ChatMessage, ChatMessageBulk, HealthCheckResponse, MessageBatchResult, MessageResult,
    ServingStatus,
};
pub use service::FilterService;
