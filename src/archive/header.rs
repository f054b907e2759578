//! Fixed-layout archive header.
//!
//! The file opens with a 16-byte identifier and thirty little-endian u32
//! fields: a `(start, element-or-byte count)` pair for every section, in
//! the exact order the sections appear in the file. Each start offset is
//! the running sum of all previous sections' byte sizes, beginning right
//! after the header block.

use std::io::Write;

use crate::error::{BuildError, Result};

/// 16-byte file identifier, including the format version.
pub const FILE_ID: &[u8; 16] = b"AvBible 1.3.0.0 ";

/// Total header bytes: identifier plus 30 u32 fields.
pub const HEADER_SIZE: u32 = 136;

/// Word index row: word length (u8) + occurrence count (i16).
pub const WORD_INDEX_ROW_SIZE: u32 = 3;
/// Reverse word index row: forward index (i16).
pub const WORD_INDEX_REV_ROW_SIZE: u32 = 2;
/// Occurrence reference: verse ref (i16).
pub const VERSE_REF_ROW_SIZE: u32 = 2;
/// Book index row: chapter count (u8).
pub const BOOK_INDEX_ROW_SIZE: u32 = 1;
/// Chapter index row: verse slot count (u8) + extra flags (u8).
pub const CHAPTER_INDEX_ROW_SIZE: u32 = 2;
/// Verse index row: text len 10 bits | word-pos span 7 bits | italic span
/// 4 bits, packed into 3 bytes.
pub const VERSE_INDEX_ROW_SIZE: u32 = 3;
/// Word position row: packed u16.
pub const WORD_POS_ROW_SIZE: u32 = 2;
/// Italic position row: packed u16.
pub const ITALIC_POS_ROW_SIZE: u32 = 2;

/// Chapter extra-flag bits.
pub const CHAPTER_HAS_PREFACE: u8 = 1;
pub const CHAPTER_HAS_POSTSCRIPT: u8 = 2;

/// One header entry: where a section starts and how many elements (or,
/// for blob sections, bytes) it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub start: u32,
    pub count: u32,
}

/// Element counts and blob sizes gathered during the measure phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct Measure {
    pub cs_words: u32,
    pub cs_word_data_size: u32,
    pub cs_verse_refs: u32,
    pub ci_words: u32,
    pub ci_word_data_size: u32,
    pub ci_verse_refs: u32,
    pub books: u32,
    pub chapters: u32,
    pub verse_units: u32,
    pub verse_data_size: u32,
    pub extra_markup_size: u32,
    pub word_positions: u32,
    pub italic_positions: u32,
}

/// The complete computed header, one [`Section`] per file section in
/// emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub word_cs_index: Section,
    pub word_cs_rev: Section,
    pub word_cs_data: Section,
    pub verse_cs_refs: Section,
    pub word_ci_index: Section,
    pub word_ci_rev: Section,
    pub word_ci_data: Section,
    pub verse_ci_refs: Section,
    pub book_index: Section,
    pub chapter_index: Section,
    pub verse_index: Section,
    pub verse_data: Section,
    pub extra_markup: Section,
    pub word_pos_index: Section,
    pub italic_pos_index: Section,
}

impl Header {
    /// Derive every section's offset from the measured counts. Pure
    /// arithmetic; writes nothing.
    pub fn compute(m: &Measure) -> Result<Header> {
        let mut cursor = Cursor::new(HEADER_SIZE);

        let word_cs_index = cursor.section(m.cs_words, WORD_INDEX_ROW_SIZE)?;
        let word_cs_rev = cursor.section(m.cs_words, WORD_INDEX_REV_ROW_SIZE)?;
        let word_cs_data = cursor.blob(m.cs_word_data_size)?;
        let verse_cs_refs = cursor.section(m.cs_verse_refs, VERSE_REF_ROW_SIZE)?;

        let word_ci_index = cursor.section(m.ci_words, WORD_INDEX_ROW_SIZE)?;
        let word_ci_rev = cursor.section(m.ci_words, WORD_INDEX_REV_ROW_SIZE)?;
        let word_ci_data = cursor.blob(m.ci_word_data_size)?;
        let verse_ci_refs = cursor.section(m.ci_verse_refs, VERSE_REF_ROW_SIZE)?;

        let book_index = cursor.section(m.books, BOOK_INDEX_ROW_SIZE)?;
        let chapter_index = cursor.section(m.chapters, CHAPTER_INDEX_ROW_SIZE)?;
        let verse_index = cursor.section(m.verse_units, VERSE_INDEX_ROW_SIZE)?;
        let verse_data = cursor.blob(m.verse_data_size)?;
        let extra_markup = cursor.blob(m.extra_markup_size)?;
        let word_pos_index = cursor.section(m.word_positions, WORD_POS_ROW_SIZE)?;
        let italic_pos_index = cursor.section(m.italic_positions, ITALIC_POS_ROW_SIZE)?;

        Ok(Header {
            word_cs_index,
            word_cs_rev,
            word_cs_data,
            verse_cs_refs,
            word_ci_index,
            word_ci_rev,
            word_ci_data,
            verse_ci_refs,
            book_index,
            chapter_index,
            verse_index,
            verse_data,
            extra_markup,
            word_pos_index,
            italic_pos_index,
        })
    }

    /// Total file size implied by the layout.
    pub fn file_size(&self) -> u64 {
        self.italic_pos_index.start as u64
            + self.italic_pos_index.count as u64 * ITALIC_POS_ROW_SIZE as u64
    }

    /// Sections with their display names, in file order.
    pub fn sections(&self) -> [(&'static str, Section); 15] {
        [
            ("word index (cs)", self.word_cs_index),
            ("word index rev (cs)", self.word_cs_rev),
            ("word data (cs)", self.word_cs_data),
            ("verse refs (cs)", self.verse_cs_refs),
            ("word index (ci)", self.word_ci_index),
            ("word index rev (ci)", self.word_ci_rev),
            ("word data (ci)", self.word_ci_data),
            ("verse refs (ci)", self.verse_ci_refs),
            ("book index", self.book_index),
            ("chapter index", self.chapter_index),
            ("verse index", self.verse_index),
            ("verse data", self.verse_data),
            ("extra markup", self.extra_markup),
            ("word pos index", self.word_pos_index),
            ("italic pos index", self.italic_pos_index),
        ]
    }

    /// Emit the identifier and all thirty fields.
    pub fn write_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        out.write_all(FILE_ID)?;
        for (_, section) in self.sections() {
            out.write_all(&section.start.to_le_bytes())?;
            out.write_all(&section.count.to_le_bytes())?;
        }
        Ok(())
    }
}

/// Running byte offset with checked arithmetic.
struct Cursor {
    offset: u64,
}

impl Cursor {
    fn new(start: u32) -> Self {
        Cursor {
            offset: start as u64,
        }
    }

    fn section(&mut self, count: u32, row_size: u32) -> Result<Section> {
        self.advance(count, count as u64 * row_size as u64)
    }

    fn blob(&mut self, size: u32) -> Result<Section> {
        self.advance(size, size as u64)
    }

    fn advance(&mut self, count: u32, bytes: u64) -> Result<Section> {
        let start = self.offset;
        if start > u32::MAX as u64 {
            return Err(BuildError::FieldOverflow {
                field: "section offset",
                value: start,
                limit: u32::MAX as u64,
            });
        }
        self.offset = start + bytes;
        Ok(Section {
            start: start as u32,
            count,
        })
    }
}
