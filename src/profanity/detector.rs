// Dictionary detector: word-boundary matching with override lists.
//
// Three kinds of pattern, one compiled regex per term:
//   - profanities match only when not glued to a neighbouring letter or digit
//   - false negatives match anywhere, even inside longer words
//   - false positives never match; any hit lying inside one of their
//     occurrences is dropped
//
// All occurrences are found, including overlapping ones, so censoring masks
// the union of every span detection would report.

use std::ops::Range;

use regex::Regex;

use super::traits::{ProfanityFilter, MASK};
use crate::dictionary::ProfanityDictionary;
use crate::error::LoadError;

/// Profanity engine backed by a `ProfanityDictionary`.
#[derive(Debug)]
pub struct DictionaryDetector {
    words: Vec<Regex>,
    forced: Vec<Regex>,
    suppressors: Vec<Regex>,
}

impl DictionaryDetector {
    /// Compile the dictionary into matchers.
    pub fn new(dictionary: &ProfanityDictionary) -> Result<Self, LoadError> {
        // A term forced by a false negative already matches everywhere.
        let words = dictionary
            .profanities()
            .iter()
            .filter(|t| !dictionary.false_negatives().contains(*t));

        Ok(Self {
            words: compile_all(words)?,
            forced: compile_all(dictionary.false_negatives())?,
            suppressors: compile_all(dictionary.false_positives())?,
        })
    }

    /// Byte ranges of every match in `text`, in no particular order.
    ///
    /// Lazy: `is_profane` stops at the first span.
    fn matched_spans<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Range<usize>> + 't {
        let suppressed: Vec<Range<usize>> = self
            .suppressors
            .iter()
            .flat_map(|re| occurrences(re, text))
            .collect();

        let words = self
            .words
            .iter()
            .flat_map(move |re| occurrences(re, text))
            .filter(move |span| on_word_boundary(text, span));
        let forced = self.forced.iter().flat_map(move |re| occurrences(re, text));

        words.chain(forced).filter(move |span| {
            !suppressed
                .iter()
                .any(|s| s.start <= span.start && span.end <= s.end)
        })
    }
}

impl ProfanityFilter for DictionaryDetector {
    fn is_profane(&self, text: &str) -> bool {
        self.matched_spans(text).next().is_some()
    }

    fn censor(&self, text: &str) -> String {
        let mut masked = vec![false; text.len()];
        let mut any = false;
        for span in self.matched_spans(text) {
            masked[span].fill(true);
            any = true;
        }
        if !any {
            return text.to_string();
        }

        text.char_indices()
            .map(|(i, c)| if masked[i] { MASK } else { c })
            .collect()
    }
}

fn compile_all<'a>(terms: impl IntoIterator<Item = &'a String>) -> Result<Vec<Regex>, LoadError> {
    terms
        .into_iter()
        .map(|term| {
            Regex::new(&format!("(?i){}", regex::escape(term))).map_err(|source| {
                LoadError::Pattern {
                    term: term.clone(),
                    source,
                }
            })
        })
        .collect()
}

/// Every occurrence of `re` in `text`, overlapping ones included.
fn occurrences<'t>(re: &'t Regex, text: &'t str) -> impl Iterator<Item = Range<usize>> + 't {
    let mut pos = 0;
    std::iter::from_fn(move || {
        if pos > text.len() {
            return None;
        }
        let m = re.find_at(text, pos)?;
        // Resume one character past the match start.
        pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
        Some(m.range())
    })
    .filter(|span| !span.is_empty())
}

/// A match must not continue a word on either side. The check only applies
/// at ends where the matched text itself is a letter or digit, so terms
/// like "f*ck" still bound correctly on their alphanumeric ends.
fn on_word_boundary(text: &str, span: &Range<usize>) -> bool {
    let matched = &text[span.clone()];
    let is_word = |c: char| c.is_alphanumeric();

    let left_ok = match (matched.chars().next(), text[..span.start].chars().next_back()) {
        (Some(first), Some(prev)) if is_word(first) => !is_word(prev),
        _ => true,
    };
    let right_ok = match (matched.chars().next_back(), text[span.end..].chars().next()) {
        (Some(last), Some(next)) if is_word(last) => !is_word(next),
        _ => true,
    };
    left_ok && right_ok
}
