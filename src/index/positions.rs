//! Positional index streams.
//!
//! Two auxiliary per-unit streams let a reader reconstruct rendering
//! without re-scanning verse text:
//!
//! - the italic position index records `[`..`]` supplied-word spans and
//!   strips the brackets from the stored text;
//! - the word position index records per-word length, adjacent punctuation
//!   counts, and the gap back to the previous word.
//!
//! Both serialize as packed 16-bit entries with hard field-width limits;
//! any value that does not fit is a fatal error, never silently masked.

use crate::error::{BuildError, Result};
use crate::model::{Span, VerseRef};

/// One bracket-delimited span, in post-strip character positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItalicPos {
    pub start: u32,
    pub len: u32,
}

impl ItalicPos {
    /// Pack as 10 bits start | 6 bits length.
    pub fn pack(&self) -> Result<u16> {
        let start = fit(self.start as u64, 0x3FF, "italic span start")?;
        let len = fit(self.len as u64, 0x3F, "italic span length")?;
        Ok((start | (len << 10)) as u16)
    }
}

/// Accumulated italic spans across all units, in document order.
#[derive(Debug, Default)]
pub struct ItalicIndex {
    entries: Vec<ItalicPos>,
    max_per_unit: u32,
}

impl ItalicIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ItalicPos] {
        &self.entries
    }

    /// Largest number of spans recorded for a single unit.
    pub fn max_per_unit(&self) -> u32 {
        self.max_per_unit
    }

    /// Scan `text` for bracketed spans, record them scaled to the stripped
    /// text, and return the stripped text plus this unit's slice of the
    /// stream. Nested or unbalanced brackets are fatal.
    pub fn process_unit(&mut self, text: &str, verse_ref: VerseRef) -> Result<(String, Span)> {
        let first = self.entries.len();
        let mut stripped = String::with_capacity(text.len());
        let mut out_pos = 0u32;
        let mut open: Option<u32> = None;

        for ch in text.chars() {
            match ch {
                '[' => {
                    if open.is_some() {
                        return Err(BuildError::UnbalancedBrackets { verse_ref });
                    }
                    open = Some(out_pos);
                }
                ']' => {
                    let start = open
                        .take()
                        .ok_or(BuildError::UnbalancedBrackets { verse_ref })?;
                    self.entries.push(ItalicPos {
                        start,
                        len: out_pos - start,
                    });
                }
                _ => {
                    stripped.push(ch);
                    out_pos += 1;
                }
            }
        }
        if open.is_some() {
            return Err(BuildError::UnbalancedBrackets { verse_ref });
        }

        let count = (self.entries.len() - first) as u32;
        self.max_per_unit = self.max_per_unit.max(count);
        Ok((
            stripped,
            Span {
                start: first as u32,
                len: count,
            },
        ))
    }
}

/// Word-boundary metadata for one recorded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordPos {
    /// Word length in characters (hyphens included).
    pub len: u32,
    /// Non-word, non-space characters immediately before the word.
    pub pre_punct: u32,
    /// Non-word, non-space characters immediately after the word.
    pub post_punct: u32,
    /// Characters between the previous recorded word's end and this word's
    /// start; counted from the unit start for the first word.
    pub prev_chars: u32,
    /// True for the first word of its unit.
    pub new_unit: bool,
}

impl WordPos {
    /// Pack as 5 bits length | 3 bits prev chars | 2 bits pre punct |
    /// 2 bits post punct | 1 bit new-unit flag.
    pub fn pack(&self) -> Result<u16> {
        let len = fit(self.len as u64, 0x1F, "word position length")?;
        let prev = fit(self.prev_chars as u64, 0x07, "word position prev chars")?;
        let pre = fit(self.pre_punct as u64, 0x03, "word position pre punct")?;
        let post = fit(self.post_punct as u64, 0x03, "word position post punct")?;
        let flag = u64::from(self.new_unit);
        Ok((len | (prev << 5) | (pre << 8) | (post << 10) | (flag << 12)) as u16)
    }
}

/// Accumulated word positions across all units, in document order.
#[derive(Debug, Default)]
pub struct WordPosIndex {
    entries: Vec<WordPos>,
    max_per_unit: u32,
}

impl WordPosIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[WordPos] {
        &self.entries
    }

    pub fn max_per_unit(&self) -> u32 {
        self.max_per_unit
    }

    /// Walk post-strip `text` with the index word/hyphen rule and record a
    /// [`WordPos`] per word. Returns this unit's slice of the stream.
    pub fn process_unit(&mut self, text: &str) -> Result<Span> {
        let first = self.entries.len();
        let chars: Vec<char> = text.chars().collect();

        let mut word_begin = 0usize;
        let mut in_word = false;
        let mut prev_stop = 0usize;
        let mut new_unit = true;

        let mut i = 0usize;
        loop {
            if i == chars.len() {
                if in_word && i > word_begin {
                    self.push_word(&chars, word_begin, i, prev_stop, new_unit);
                }
                break;
            }
            let ch = chars[i];
            if in_word {
                // A hyphen continues the word only when a word char follows.
                let joins = ch == '-' && i + 1 < chars.len() && is_word_char(chars[i + 1]);
                if !joins && !is_word_char(ch) {
                    self.push_word(&chars, word_begin, i, prev_stop, new_unit);
                    new_unit = false;
                    prev_stop = i;
                    in_word = false;
                }
            } else if is_word_char(ch) {
                word_begin = i;
                in_word = true;
            }
            i += 1;
        }

        let count = (self.entries.len() - first) as u32;
        self.max_per_unit = self.max_per_unit.max(count);
        Ok(Span {
            start: first as u32,
            len: count,
        })
    }

    fn push_word(&mut self, chars: &[char], begin: usize, stop: usize, prev_stop: usize, new_unit: bool) {
        self.entries.push(WordPos {
            len: (stop - begin) as u32,
            pre_punct: pre_punct(chars, begin),
            post_punct: post_punct(chars, stop),
            prev_chars: (begin - prev_stop) as u32,
            new_unit,
        });
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '\''
}

/// Count punctuation immediately before `start`, stopping at a space or
/// word character.
fn pre_punct(chars: &[char], start: usize) -> u32 {
    chars[..start]
        .iter()
        .rev()
        .take_while(|&&ch| !is_word_char(ch) && ch != ' ')
        .count() as u32
}

/// Count punctuation at and after `stop`, stopping at a space or word
/// character.
fn post_punct(chars: &[char], stop: usize) -> u32 {
    chars[stop..]
        .iter()
        .take_while(|&&ch| !is_word_char(ch) && ch != ' ')
        .count() as u32
}

fn fit(value: u64, limit: u64, field: &'static str) -> Result<u64> {
    if value > limit {
        return Err(BuildError::FieldOverflow {
            field,
            value,
            limit,
        });
    }
    Ok(value)
}
