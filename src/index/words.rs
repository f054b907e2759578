//! Deduplicated word indexes with per-word occurrence lists.
//!
//! Two tables are built over the same text: one keyed by the exact word and
//! one keyed by its upper-cased form. Each table entry accumulates the verse
//! references where the word occurs; [`WordTable::finalize`] sorts and
//! deduplicates those lists, and [`WordTable::forward_order`] /
//! [`WordTable::reverse_order`] produce the two physical orderings the
//! binary format stores.

use std::collections::HashMap;

use crate::error::{BuildError, Result};
use crate::index::collation::{Collation, CASE_INSENSITIVE, CASE_SENSITIVE};
use crate::model::{Document, VerseRef};

/// A unique word plus its occurrence list and assigned forward index.
#[derive(Debug, Clone)]
pub struct WordEntry {
    word: String,
    verse_refs: Vec<VerseRef>,
    forward_index: u32,
}

impl WordEntry {
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn verse_refs(&self) -> &[VerseRef] {
        &self.verse_refs
    }

    /// Position in the forward-sorted word list. Valid only after
    /// [`WordTable::forward_order`] has run.
    pub fn forward_index(&self) -> u32 {
        self.forward_index
    }

    fn sort_and_dedup(&mut self) {
        self.verse_refs.sort_unstable();
        self.verse_refs.dedup();
        self.verse_refs.shrink_to_fit();
    }
}

/// One of the two word tables.
#[derive(Debug)]
pub struct WordTable {
    case_insensitive: bool,
    collation: Collation,
    lookup: HashMap<String, usize>,
    entries: Vec<WordEntry>,
}

impl WordTable {
    pub fn new(case_insensitive: bool) -> Self {
        WordTable {
            case_insensitive,
            collation: if case_insensitive {
                CASE_INSENSITIVE
            } else {
                CASE_SENSITIVE
            },
            lookup: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, idx: usize) -> &WordEntry {
        &self.entries[idx]
    }

    /// Record one occurrence of `text[start..start + len]` in `verse_ref`.
    pub fn add_occurrence(
        &mut self,
        text: &str,
        start: usize,
        len: usize,
        verse_ref: VerseRef,
    ) -> Result<()> {
        if len == 0 {
            return Err(BuildError::EmptyWord);
        }
        let word = &text[start..start + len];
        let key = if self.case_insensitive {
            word.to_ascii_uppercase()
        } else {
            word.to_string()
        };

        let idx = match self.lookup.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push(WordEntry {
                    word: key.clone(),
                    verse_refs: Vec::new(),
                    forward_index: 0,
                });
                self.lookup.insert(key, idx);
                idx
            }
        };
        self.entries[idx].verse_refs.push(verse_ref);
        Ok(())
    }

    /// Sort each entry's occurrence list, drop duplicate references
    /// (a word appearing more than once in the same verse), and release
    /// excess capacity.
    pub fn finalize(&mut self) {
        for entry in &mut self.entries {
            entry.sort_and_dedup();
        }
    }

    /// Entry indices in collation order. Assigns every entry's forward
    /// index as a side effect; call this before [`Self::reverse_order`].
    pub fn forward_order(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        let collation = self.collation;
        order.sort_unstable_by(|&a, &b| {
            collation.compare(&self.entries[a].word, &self.entries[b].word)
        });
        for (pos, &idx) in order.iter().enumerate() {
            self.entries[idx].forward_index = pos as u32;
        }
        order
    }

    /// The same entries reordered by the collation applied to each word
    /// reversed end to start. Forward indices are left untouched.
    pub fn reverse_order(&self, forward: &[usize]) -> Vec<usize> {
        let mut order = forward.to_vec();
        order.sort_unstable_by(|&a, &b| {
            self.collation
                .compare_reversed(&self.entries[a].word, &self.entries[b].word)
        });
        order
    }

    /// Total bytes of word text across all entries.
    pub fn word_data_size(&self) -> usize {
        self.entries.iter().map(|e| e.word.len()).sum()
    }

    /// Total occurrence references across all entries.
    pub fn occurrence_count(&self) -> usize {
        self.entries.iter().map(|e| e.verse_refs.len()).sum()
    }
}

/// The case-sensitive / case-insensitive table pair.
#[derive(Debug)]
pub struct WordIndex {
    pub case_sensitive: WordTable,
    pub case_insensitive: WordTable,
}

impl WordIndex {
    pub fn new() -> Self {
        WordIndex {
            case_sensitive: WordTable::new(false),
            case_insensitive: WordTable::new(true),
        }
    }

    /// Scan every unit of `doc` in document order and populate both tables.
    pub fn index_document(&mut self, doc: &Document) -> Result<()> {
        for id in doc.walk_units() {
            let unit = doc.unit(id);
            self.scan_text(&unit.text, unit.verse_ref)?;
        }
        Ok(())
    }

    /// Walk `text` with the index's word-boundary rule and feed each word
    /// to both tables.
    ///
    /// A word is a maximal run of letters and apostrophes. A hyphen joins
    /// two word runs only when immediately followed by another word
    /// character; otherwise it ends the word and is discarded, like
    /// whitespace and the fixed punctuation set. Any other character is a
    /// fatal format error.
    pub fn scan_text(&mut self, text: &str, verse_ref: VerseRef) -> Result<()> {
        let bytes = text.as_bytes();
        let mut start = 0usize;
        let mut len = 0usize;

        for (i, &b) in bytes.iter().enumerate() {
            if is_punct_or_space(b) {
                if len > 0 {
                    self.add_word(text, start, len, verse_ref)?;
                    len = 0;
                }
                continue;
            }

            if b == b'-' {
                // Absorb the hyphen only mid-word with a word char after it.
                if len > 0 && i + 1 < bytes.len() && is_word_byte(bytes[i + 1]) {
                    len += 1;
                    continue;
                }
                if len > 0 {
                    self.add_word(text, start, len, verse_ref)?;
                    len = 0;
                }
                continue;
            }

            if is_word_byte(b) {
                if len == 0 {
                    start = i;
                }
                len += 1;
                continue;
            }

            return Err(BuildError::BadCharacter {
                ch: text[i..].chars().next().unwrap_or('\u{fffd}'),
                verse_ref,
            });
        }

        if len > 0 {
            self.add_word(text, start, len, verse_ref)?;
        }
        Ok(())
    }

    fn add_word(&mut self, text: &str, start: usize, len: usize, verse_ref: VerseRef) -> Result<()> {
        self.case_sensitive
            .add_occurrence(text, start, len, verse_ref)?;
        self.case_insensitive
            .add_occurrence(text, start, len, verse_ref)
    }

    pub fn finalize(&mut self) {
        self.case_sensitive.finalize();
        self.case_insensitive.finalize();
    }
}

impl Default for WordIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'\''
}

fn is_punct_or_space(b: u8) -> bool {
    matches!(
        b,
        b' ' | b':' | b';' | b'.' | b'?' | b',' | b'[' | b']' | b'(' | b')' | b'!'
    )
}
