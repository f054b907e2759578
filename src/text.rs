//! Word/non-word tokenization of verse text.
//!
//! A word token is a maximal run of ASCII letters and apostrophes. Every
//! character outside a word run is emitted as its own single-character
//! token — runs of punctuation or spaces are not coalesced. Concatenating
//! all token texts reproduces the input exactly.
//!
//! This tokenizer is deliberately looser than the word-boundary scanner in
//! [`crate::index::words`]: it preserves every character (for display and
//! reconstruction), while the index scanner discards separators and treats
//! unknown characters as fatal.

/// One token produced by [`tokenize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub is_word: bool,
}

/// True for characters that may appear inside a word token.
pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '\''
}

/// Lazily tokenize `text` into alternating word and single-character
/// non-word tokens.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens {
        text,
        chars: text.char_indices(),
        word_start: None,
        pending: None,
    }
}

pub struct Tokens<'a> {
    text: &'a str,
    chars: std::str::CharIndices<'a>,
    /// Byte offset where the current word run began, if inside a word.
    word_start: Option<usize>,
    /// A non-word token held back while the preceding word token is emitted.
    pending: Option<Token<'a>>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if let Some(tok) = self.pending.take() {
            return Some(tok);
        }

        for (pos, ch) in self.chars.by_ref() {
            match (self.word_start, is_word_char(ch)) {
                (None, true) => self.word_start = Some(pos),
                (None, false) => {
                    return Some(Token {
                        text: &self.text[pos..pos + ch.len_utf8()],
                        is_word: false,
                    });
                }
                (Some(_), true) => {}
                (Some(start), false) => {
                    self.word_start = None;
                    self.pending = Some(Token {
                        text: &self.text[pos..pos + ch.len_utf8()],
                        is_word: false,
                    });
                    return Some(Token {
                        text: &self.text[start..pos],
                        is_word: true,
                    });
                }
            }
        }

        // Flush a trailing word run.
        self.word_start.take().map(|start| Token {
            text: &self.text[start..],
            is_word: true,
        })
    }
}
