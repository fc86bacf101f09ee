// Wire models: the request and response shapes of the filter RPCs.
//
// Field names follow the RPC contract (`id`, `message`, `timestamp`, ...).
// Absent scalar fields decode to their zero value, matching protobuf
// defaults, so a sparse message still gets a result instead of an error.

use serde::{Deserialize, Serialize};

/// A single chat message submitted for moderation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    /// Unix seconds, as supplied by the caller.
    #[serde(default)]
    pub timestamp: i64,
}

/// Request body of `FilterBulk`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageBulk {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// What the filter did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Pass,
    Censored,
}

/// Moderation outcome for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResult {
    pub id: String,
    /// Original timestamp on PASS, moderation time on CENSORED.
    pub timestamp: i64,
    pub action: Action,
    /// Category tags. Always empty: no taxonomy is computed yet.
    pub classification: Vec<String>,
    pub message: String,
}

/// Results of `FilterBulk`, index-aligned with the request's messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBatchResult {
    pub data: Vec<MessageResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    Serving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: ServingStatus,
}
