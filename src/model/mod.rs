//! Arena-based document tree.
//!
//! Books, chapters, and text units live in plain vectors and refer to each
//! other through integer ids, so the tree carries no back-pointers. Every
//! verse, chapter preface, and book postscript is a [`TextUnit`] and receives
//! a globally unique, monotonically increasing [`VerseRef`] at creation time,
//! in document order.

pub mod books;

pub use books::{book_id, book_name, BOOK_COUNT};

use crate::error::{BuildError, Result};

/// Globally unique, zero-based id for a verse or non-verse unit,
/// assigned in document order.
pub type VerseRef = u32;

/// Index into [`Document::units`].
pub type UnitId = u32;

/// Zero-based book ordinal (0 = Genesis in the canonical table).
pub type BookId = u8;

/// Half-open slice into one of the positional index streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub len: u32,
}

/// One indexed run of text: a verse, a chapter preface, or a book postscript.
///
/// `text` starts out as parsed and is rewritten in place when italics
/// brackets are stripped; `italic_span` and `word_span` are filled during
/// positional processing and describe this unit's slices of the italic and
/// word position streams.
#[derive(Debug, Clone)]
pub struct TextUnit {
    pub text: String,
    pub verse_ref: VerseRef,
    pub word_span: Span,
    pub italic_span: Span,
}

#[derive(Debug, Clone)]
pub struct Chapter {
    /// Zero-based chapter-in-book index.
    pub index: u32,
    pub preface: Option<UnitId>,
    pub verses: Vec<UnitId>,
}

impl Chapter {
    pub fn new(index: u32) -> Self {
        Chapter {
            index,
            preface: None,
            verses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Book {
    pub id: BookId,
    pub chapters: Vec<Chapter>,
    pub postscript: Option<UnitId>,
}

impl Book {
    pub fn new(id: BookId) -> Self {
        Book {
            id,
            chapters: Vec::new(),
            postscript: None,
        }
    }
}

/// The whole parsed corpus plus the unit arena.
#[derive(Debug)]
pub struct Document {
    books: Vec<Option<Book>>,
    units: Vec<TextUnit>,
}

impl Document {
    /// A document with the canonical number of book slots.
    pub fn new() -> Self {
        Self::with_book_slots(BOOK_COUNT)
    }

    /// A document with a caller-chosen number of book slots. Slots without
    /// a book are emitted as zero-chapter entries in the book index.
    pub fn with_book_slots(slots: usize) -> Self {
        Document {
            books: (0..slots).map(|_| None).collect(),
            units: Vec::new(),
        }
    }

    pub fn book_slots(&self) -> usize {
        self.books.len()
    }

    /// Allocate a unit and assign the next verse reference.
    pub fn new_unit(&mut self, text: String) -> UnitId {
        let id = self.units.len() as UnitId;
        self.units.push(TextUnit {
            text,
            verse_ref: id,
            word_span: Span::default(),
            italic_span: Span::default(),
        });
        id
    }

    pub fn unit(&self, id: UnitId) -> &TextUnit {
        &self.units[id as usize]
    }

    pub fn unit_mut(&mut self, id: UnitId) -> &mut TextUnit {
        &mut self.units[id as usize]
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn insert_book(&mut self, id: BookId) -> Result<&mut Book> {
        let slot = id as usize;
        if slot >= self.books.len() {
            return Err(BuildError::FieldOverflow {
                field: "book ordinal",
                value: slot as u64,
                limit: self.books.len() as u64 - 1,
            });
        }
        if self.books[slot].is_some() {
            return Err(BuildError::parse(
                0,
                format!("duplicate book '{}'", book_name(id)),
            ));
        }
        self.books[slot] = Some(Book::new(id));
        Ok(self.books[slot].as_mut().unwrap())
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.get(id as usize).and_then(|b| b.as_ref())
    }

    pub fn book_mut(&mut self, id: BookId) -> Option<&mut Book> {
        self.books.get_mut(id as usize).and_then(|b| b.as_mut())
    }

    /// Books that are present, in slot order.
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.iter().filter_map(|b| b.as_ref())
    }

    /// Unit ids in document walk order: per book, each chapter's preface
    /// then its verses, then the book postscript.
    pub fn walk_units(&self) -> Vec<UnitId> {
        let mut order = Vec::with_capacity(self.units.len());
        for book in self.books() {
            for chapter in &book.chapters {
                if let Some(pre) = chapter.preface {
                    order.push(pre);
                }
                order.extend_from_slice(&chapter.verses);
            }
            if let Some(post) = book.postscript {
                order.push(post);
            }
        }
        order
    }

    pub fn chapter_count(&self) -> usize {
        self.books().map(|b| b.chapters.len()).sum()
    }

    pub fn verse_count(&self) -> usize {
        self.books()
            .flat_map(|b| b.chapters.iter())
            .map(|c| c.verses.len())
            .sum()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_refs_increase_in_creation_order() {
        let mut doc = Document::new();
        let a = doc.new_unit("In the beginning".into());
        let b = doc.new_unit("And the earth".into());
        assert_eq!(doc.unit(a).verse_ref, 0);
        assert_eq!(doc.unit(b).verse_ref, 1);
    }

    #[test]
    fn duplicate_book_rejected() {
        let mut doc = Document::new();
        doc.insert_book(0).unwrap();
        assert!(doc.insert_book(0).is_err());
    }

    #[test]
    fn walk_order_puts_preface_first_and_postscript_last() {
        let mut doc = Document::new();
        let pre = doc.new_unit("preface".into());
        let v1 = doc.new_unit("verse one".into());
        let v2 = doc.new_unit("verse two".into());
        let post = doc.new_unit("postscript".into());

        let book = doc.insert_book(0).unwrap();
        let mut chapter = Chapter::new(0);
        chapter.preface = Some(pre);
        chapter.verses = vec![v1, v2];
        book.chapters.push(chapter);
        book.postscript = Some(post);

        assert_eq!(doc.walk_units(), vec![pre, v1, v2, post]);
    }
}
