// Profanity detection: dictionary-driven matching and censorship.

pub mod detector;
pub mod traits;
