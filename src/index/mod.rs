pub mod collation;
pub mod positions;
pub mod words;

pub use positions::{ItalicIndex, ItalicPos, WordPos, WordPosIndex};
pub use words::{WordEntry, WordIndex, WordTable};
