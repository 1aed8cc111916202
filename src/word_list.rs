use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;
use std::fs;
use std::path::Path;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::types::WordId;
use crate::MAX_SLOT_LENGTH;

/// A struct representing a word in the word list.
#[derive(Debug, Clone)]
pub struct Word {
    /// The word as it would appear in a grid -- lowercase, NFC-normalized, no whitespace.
    pub string: String,

    /// The characters making up `string`, cached so that overlap checks don't have to re-decode
    /// UTF-8 on every comparison.
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

/// Given a raw word from a dictionary file, turn it into the normalized form used everywhere
/// else in the solver.
#[must_use]
pub fn normalize_word(raw: &str) -> String {
    raw.to_lowercase()
        .nfc() // Normalize Unicode combining forms
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone, Error)]
pub enum WordListError {
    #[error("can’t read file: “{0}”")]
    InvalidPath(String),

    #[error("word list contains invalid word: “{0}”")]
    InvalidWord(String),
}

/// The candidate vocabulary shared by every slot in a grid. Words are deduplicated by their
/// normalized form; the `WordId`s used everywhere else are indices into `words`.
pub struct WordList {
    /// All loaded words, in insertion order.
    pub words: Vec<Word>,

    /// The inverse of `words`: a map from a normalized string to the id of the word
    /// representing it.
    pub word_id_by_string: HashMap<String, WordId>,
}

impl WordList {
    /// Construct a `WordList` from raw word strings, normalizing each one and collapsing
    /// duplicates. A word that normalizes to the empty string is an error.
    pub fn from_words<I, S>(raw_words: I) -> Result<WordList, WordListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut word_list = WordList {
            words: vec![],
            word_id_by_string: HashMap::new(),
        };

        for raw in raw_words {
            let raw = raw.as_ref();
            let normalized = normalize_word(raw);
            if normalized.is_empty() {
                return Err(WordListError::InvalidWord(raw.into()));
            }

            if word_list.word_id_by_string.contains_key(&normalized) {
                continue;
            }

            let word_id = word_list.words.len();
            word_list.words.push(Word {
                chars: normalized.chars().collect(),
                string: normalized.clone(),
            });
            word_list.word_id_by_string.insert(normalized, word_id);
        }

        Ok(word_list)
    }

    /// Construct a `WordList` from a dictionary file with one candidate word per line. Blank
    /// lines are skipped.
    pub fn from_file(path: &Path) -> Result<WordList, WordListError> {
        let contents = fs::read_to_string(path)
            .map_err(|_| WordListError::InvalidPath(path.to_string_lossy().into()))?;

        WordList::from_words(contents.lines().filter(|line| !line.trim().is_empty()))
    }

    /// Borrow an existing word using its id.
    #[must_use]
    pub fn get(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Debug for WordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordList")
            .field("words", &self.words.len())
            .finish_non_exhaustive()
    }
}
