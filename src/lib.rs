// chat-filter: dictionary-driven chat moderation service.
//
// This is the library root. Each module corresponds to one part of the
// moderation path: inbound call -> auth gate -> bulk filter -> engine.

pub mod auth;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod filter;
pub mod profanity;
pub mod web;
