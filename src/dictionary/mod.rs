// Dictionary store: the immutable term sets the detection engine matches against.
//
// The built-in document is compiled into the binary. A custom document with
// the same three lists can be merged on top at startup:
//
//   effective = (built-in ∪ custom.profanities ∪ custom.falseNegatives) − falsePositives
//
// Every term is trimmed and lowercased here, so matching never has to fold
// the dictionary side again.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::LoadError;

const BUILT_IN: &str = include_str!("../../data/default_dictionary.json");

/// On-disk dictionary document. Missing lists are treated as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryDocument {
    #[serde(default)]
    pub profanities: Vec<String>,
    #[serde(default)]
    pub false_positives: Vec<String>,
    #[serde(default)]
    pub false_negatives: Vec<String>,
}

impl DictionaryDocument {
    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse a document from a file.
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| LoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Term counts, for startup logs and the `dictionary` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryStats {
    pub profanities: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub effective: usize,
}

/// Case-normalized profanity dictionary with override lists applied.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfanityDictionary {
    profanities: BTreeSet<String>,
    false_positives: BTreeSet<String>,
    false_negatives: BTreeSet<String>,
}

impl ProfanityDictionary {
    /// The dictionary compiled into the binary.
    pub fn built_in() -> Result<Self, LoadError> {
        let doc = DictionaryDocument::from_json(BUILT_IN).map_err(LoadError::BuiltIn)?;
        Ok(Self::default().merge(doc))
    }

    /// Load the built-in dictionary, merging the custom document at `custom`
    /// when one is given.
    pub fn load(custom: Option<&Path>) -> Result<Self, LoadError> {
        let dictionary = Self::built_in()?;
        let Some(path) = custom else {
            return Ok(dictionary);
        };

        let doc = DictionaryDocument::read(path)?;
        let dictionary = dictionary.merge(doc);
        info!(
            path = %path.display(),
            effective_terms = dictionary.stats().effective,
            "Merged custom dictionary"
        );
        Ok(dictionary)
    }

    /// Build a dictionary from a single document, without the built-in terms.
    pub fn from_document(doc: DictionaryDocument) -> Self {
        Self::default().merge(doc)
    }

    /// Merge an override document into this dictionary.
    ///
    /// False positives win over everything: a suppressed term is removed
    /// from both match lists no matter which document contributed it.
    pub fn merge(mut self, doc: DictionaryDocument) -> Self {
        self.profanities.extend(normalize(doc.profanities));
        self.false_negatives.extend(normalize(doc.false_negatives));
        self.false_positives.extend(normalize(doc.false_positives));

        for term in &self.false_positives {
            self.profanities.remove(term);
            self.false_negatives.remove(term);
        }
        self
    }

    /// Terms matched on word boundaries.
    pub fn profanities(&self) -> &BTreeSet<String> {
        &self.profanities
    }

    /// Terms whose occurrences suppress any match inside them.
    pub fn false_positives(&self) -> &BTreeSet<String> {
        &self.false_positives
    }

    /// Terms forced to match anywhere, including inside longer words.
    pub fn false_negatives(&self) -> &BTreeSet<String> {
        &self.false_negatives
    }

    /// Every term the engine treats as profane.
    pub fn effective_match_set(&self) -> BTreeSet<&str> {
        self.profanities
            .iter()
            .chain(&self.false_negatives)
            .map(String::as_str)
            .collect()
    }

    pub fn stats(&self) -> DictionaryStats {
        DictionaryStats {
            profanities: self.profanities.len(),
            false_positives: self.false_positives.len(),
            false_negatives: self.false_negatives.len(),
            effective: self.effective_match_set().len(),
        }
    }
}

fn normalize(terms: Vec<String>) -> impl Iterator<Item = String> {
    terms
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
}
