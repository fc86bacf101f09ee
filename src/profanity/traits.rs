// Profanity filter trait: the seam between the orchestrator and the engine.
//
// The dictionary detector is the only implementation today. Tests substitute
// counting or panicking filters to observe how the orchestrator drives it.

/// Character that replaces every censored character.
pub const MASK: char = '*';

/// Classifies and censors free text.
///
/// Implementations are pure with respect to calls: they hold no per-call
/// state and must be safe to share across any number of concurrent tasks.
pub trait ProfanityFilter: Send + Sync {
    /// True if the text contains at least one profane term.
    fn is_profane(&self, text: &str) -> bool;

    /// Replace every matched span with `MASK`, one per character.
    ///
    /// Returns the input unchanged when `is_profane` would return false.
    fn censor(&self, text: &str) -> String;
}
