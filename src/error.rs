use thiserror::Error;

/// Errors raised while parsing input or emitting an archive.
///
/// Every variant is fatal: the build aborts immediately and no partial
/// output file is produced.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Malformed or out-of-sequence input line.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A character outside the letter/apostrophe/hyphen/punctuation set
    /// was found while scanning verse text for words.
    #[error("bad character {ch:?} in verse text (verse ref {verse_ref})")]
    BadCharacter { ch: char, verse_ref: u32 },

    /// A `[` without a matching `]` (or vice versa) in verse text.
    #[error("unbalanced italics bracket in verse text (verse ref {verse_ref})")]
    UnbalancedBrackets { verse_ref: u32 },

    /// Contract violation: a word handed to the index must be non-empty.
    #[error("word length must be greater than 0")]
    EmptyWord,

    /// A value does not fit the binary format's field width.
    #[error("{field} is {value}, exceeds the format limit of {limit}")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        limit: u64,
    },

    /// Walk-order verse references stopped being sequential. Indicates a
    /// bug in tree construction, not bad input.
    #[error("verse reference {found} out of order during emission, expected {expected}")]
    ReferenceOrder { expected: u32, found: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;

impl BuildError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        BuildError::Parse {
            line,
            message: message.into(),
        }
    }
}
