//! Two-phase archive emission.
//!
//! Phase 1 measures: every section's element count is taken from the
//! finalized word tables, document tree, and positional indexes, and the
//! header's offsets are derived as running sums. Phase 2 emits the header
//! and all sections into one in-memory buffer in file order. No byte is
//! written before the layout is final, so the output never needs patching.
//!
//! Every narrowing write is a checked conversion; an out-of-range value
//! fails the build with the offending field named, never a silent wrap.

use crate::archive::header::{Header, Measure, CHAPTER_HAS_POSTSCRIPT, CHAPTER_HAS_PREFACE};
use crate::error::{BuildError, Result};
use crate::index::{ItalicIndex, WordIndex, WordPosIndex, WordTable};
use crate::model::Document;

/// Forward and reverse entry orderings for both word tables, as produced
/// by [`WordTable::forward_order`] / [`WordTable::reverse_order`].
#[derive(Debug)]
pub struct WordOrders {
    pub cs_forward: Vec<usize>,
    pub cs_reverse: Vec<usize>,
    pub ci_forward: Vec<usize>,
    pub ci_reverse: Vec<usize>,
}

impl WordOrders {
    /// Sort both tables, assigning forward indices as a side effect.
    pub fn compute(index: &mut WordIndex) -> WordOrders {
        let cs_forward = index.case_sensitive.forward_order();
        let cs_reverse = index.case_sensitive.reverse_order(&cs_forward);
        let ci_forward = index.case_insensitive.forward_order();
        let ci_reverse = index.case_insensitive.reverse_order(&ci_forward);
        WordOrders {
            cs_forward,
            cs_reverse,
            ci_forward,
            ci_reverse,
        }
    }
}

/// Everything the writer consumes. The document must already be
/// positionally processed (italics stripped, spans assigned) and the word
/// index finalized.
pub struct ArchiveInputs<'a> {
    pub doc: &'a Document,
    pub index: &'a WordIndex,
    pub orders: &'a WordOrders,
    pub word_pos: &'a WordPosIndex,
    pub italics: &'a ItalicIndex,
    pub extra_markup: &'a [u8],
}

/// Phase 1: derive the complete header from the finalized inputs.
pub fn measure(inputs: &ArchiveInputs<'_>) -> Result<Header> {
    let m = Measure {
        cs_words: fit_u32(inputs.index.case_sensitive.len(), "case-sensitive word count")?,
        cs_word_data_size: fit_u32(
            inputs.index.case_sensitive.word_data_size(),
            "case-sensitive word data size",
        )?,
        cs_verse_refs: fit_u32(
            inputs.index.case_sensitive.occurrence_count(),
            "case-sensitive verse reference count",
        )?,
        ci_words: fit_u32(
            inputs.index.case_insensitive.len(),
            "case-insensitive word count",
        )?,
        ci_word_data_size: fit_u32(
            inputs.index.case_insensitive.word_data_size(),
            "case-insensitive word data size",
        )?,
        ci_verse_refs: fit_u32(
            inputs.index.case_insensitive.occurrence_count(),
            "case-insensitive verse reference count",
        )?,
        books: fit_u32(inputs.doc.book_slots(), "book count")?,
        chapters: fit_u32(inputs.doc.chapter_count(), "chapter count")?,
        verse_units: fit_u32(inputs.doc.unit_count(), "verse unit count")?,
        verse_data_size: fit_u32(
            inputs
                .doc
                .walk_units()
                .iter()
                .map(|&id| inputs.doc.unit(id).text.len())
                .sum::<usize>(),
            "verse data size",
        )?,
        extra_markup_size: fit_u32(inputs.extra_markup.len(), "extra markup size")?,
        word_positions: fit_u32(inputs.word_pos.len(), "word position count")?,
        italic_positions: fit_u32(inputs.italics.len(), "italic position count")?,
    };
    Header::compute(&m)
}

/// Phase 2: emit the full archive. Returns the complete file image.
pub fn emit(inputs: &ArchiveInputs<'_>, header: &Header) -> Result<Vec<u8>> {
    let expected = header.file_size();
    if expected > usize::MAX as u64 {
        return Err(BuildError::FieldOverflow {
            field: "file size",
            value: expected,
            limit: usize::MAX as u64,
        });
    }
    let mut out = Vec::with_capacity(expected as usize);
    header.write_to(&mut out)?;

    write_word_group(&mut out, &inputs.index.case_sensitive, &inputs.orders.cs_forward, &inputs.orders.cs_reverse)?;
    write_word_group(&mut out, &inputs.index.case_insensitive, &inputs.orders.ci_forward, &inputs.orders.ci_reverse)?;

    write_book_index(&mut out, inputs.doc)?;
    write_chapter_index(&mut out, inputs.doc)?;
    write_verse_index(&mut out, inputs.doc)?;
    write_verse_data(&mut out, inputs.doc);

    out.extend_from_slice(inputs.extra_markup);

    for pos in inputs.word_pos.entries() {
        out.extend_from_slice(&pos.pack()?.to_le_bytes());
    }
    for pos in inputs.italics.entries() {
        out.extend_from_slice(&pos.pack()?.to_le_bytes());
    }

    debug_assert_eq!(out.len() as u64, expected);
    Ok(out)
}

/// One table's four consecutive sections: index rows, reverse rows, word
/// character data, occurrence references.
fn write_word_group(
    out: &mut Vec<u8>,
    table: &WordTable,
    forward: &[usize],
    reverse: &[usize],
) -> Result<()> {
    for &i in forward {
        let entry = table.entry(i);
        out.push(fit_u8(entry.word().len(), "word length")?);
        let refs = fit_i16(entry.verse_refs().len(), "occurrences per word")?;
        out.extend_from_slice(&refs.to_le_bytes());
    }
    for &i in reverse {
        let fwd = fit_i16(table.entry(i).forward_index() as usize, "forward word index")?;
        out.extend_from_slice(&fwd.to_le_bytes());
    }
    for &i in forward {
        out.extend_from_slice(table.entry(i).word().as_bytes());
    }
    for &i in forward {
        for &verse_ref in table.entry(i).verse_refs() {
            let packed = fit_i16(verse_ref as usize, "verse reference")?;
            out.extend_from_slice(&packed.to_le_bytes());
        }
    }
    Ok(())
}

fn write_book_index(out: &mut Vec<u8>, doc: &Document) -> Result<()> {
    for slot in 0..doc.book_slots() {
        let chapters = doc
            .book(slot as u8)
            .map(|b| b.chapters.len())
            .unwrap_or(0);
        out.push(fit_u8(chapters, "chapters per book")?);
    }
    Ok(())
}

fn write_chapter_index(out: &mut Vec<u8>, doc: &Document) -> Result<()> {
    for book in doc.books() {
        let last = book.chapters.len().saturating_sub(1);
        for (j, chapter) in book.chapters.iter().enumerate() {
            let mut slots = chapter.verses.len();
            let mut extra = 0u8;
            if chapter.preface.is_some() {
                extra |= CHAPTER_HAS_PREFACE;
                slots += 1;
            }
            if j == last && book.postscript.is_some() {
                extra |= CHAPTER_HAS_POSTSCRIPT;
                slots += 1;
            }
            out.push(fit_u8(slots, "verses per chapter")?);
            out.push(extra);
        }
    }
    Ok(())
}

fn write_verse_index(out: &mut Vec<u8>, doc: &Document) -> Result<()> {
    let mut expected = 0u32;
    for id in doc.walk_units() {
        let unit = doc.unit(id);
        if unit.verse_ref != expected {
            return Err(BuildError::ReferenceOrder {
                expected,
                found: unit.verse_ref,
            });
        }
        expected += 1;

        let len = fit(unit.text.len() as u64, 0x3FF, "verse text length")?;
        let words = fit(unit.word_span.len as u64, 0x7F, "word positions per verse")?;
        let italics = fit(unit.italic_span.len as u64, 0x0F, "italic positions per verse")?;
        let packed = (len | (words << 10) | (italics << 17)) as u32;
        out.extend_from_slice(&packed.to_le_bytes()[..3]);
    }
    Ok(())
}

fn write_verse_data(out: &mut Vec<u8>, doc: &Document) {
    for id in doc.walk_units() {
        out.extend_from_slice(doc.unit(id).text.as_bytes());
    }
}

fn fit(value: u64, limit: u64, field: &'static str) -> Result<u64> {
    if value > limit {
        return Err(BuildError::FieldOverflow { field, value, limit });
    }
    Ok(value)
}

fn fit_u8(value: usize, field: &'static str) -> Result<u8> {
    Ok(fit(value as u64, u8::MAX as u64, field)? as u8)
}

fn fit_i16(value: usize, field: &'static str) -> Result<i16> {
    Ok(fit(value as u64, i16::MAX as u64, field)? as i16)
}

fn fit_u32(value: usize, field: &'static str) -> Result<u32> {
    Ok(fit(value as u64, u32::MAX as u64, field)? as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::WordIndex;
    use crate::model::{Chapter, Document};

    fn tiny_doc() -> (Document, WordIndex, WordPosIndex, ItalicIndex) {
        let mut doc = Document::new();
        let v1 = doc.new_unit("In the beginning".into());
        let v2 = doc.new_unit("And the [earth] was".into());
        let book = doc.insert_book(0).unwrap();
        let mut chapter = Chapter::new(0);
        chapter.verses = vec![v1, v2];
        book.chapters.push(chapter);

        let mut italics = ItalicIndex::new();
        let mut word_pos = WordPosIndex::new();
        for &id in &doc.walk_units() {
            let vref = doc.unit(id).verse_ref;
            let (stripped, span) = italics.process_unit(&doc.unit(id).text, vref).unwrap();
            doc.unit_mut(id).text = stripped;
            doc.unit_mut(id).italic_span = span;
            let span = word_pos.process_unit(&doc.unit(id).text).unwrap();
            doc.unit_mut(id).word_span = span;
        }

        let mut index = WordIndex::new();
        index.index_document(&doc).unwrap();
        index.finalize();
        (doc, index, word_pos, italics)
    }

    #[test]
    fn emitted_size_matches_measured_layout() {
        let (doc, mut index, word_pos, italics) = tiny_doc();
        let orders = WordOrders::compute(&mut index);
        let inputs = ArchiveInputs {
            doc: &doc,
            index: &index,
            orders: &orders,
            word_pos: &word_pos,
            italics: &italics,
            extra_markup: b"markup",
        };
        let header = measure(&inputs).unwrap();
        let bytes = emit(&inputs, &header).unwrap();
        assert_eq!(bytes.len() as u64, header.file_size());
        assert_eq!(&bytes[..16], crate::archive::header::FILE_ID);
    }

    #[test]
    fn verse_data_section_holds_stripped_text() {
        let (doc, mut index, word_pos, italics) = tiny_doc();
        let orders = WordOrders::compute(&mut index);
        let inputs = ArchiveInputs {
            doc: &doc,
            index: &index,
            orders: &orders,
            word_pos: &word_pos,
            italics: &italics,
            extra_markup: &[],
        };
        let header = measure(&inputs).unwrap();
        let bytes = emit(&inputs, &header).unwrap();
        let start = header.verse_data.start as usize;
        let end = start + header.verse_data.count as usize;
        assert_eq!(
            &bytes[start..end],
            b"In the beginningAnd the earth was".as_slice()
        );
    }

    #[test]
    fn too_many_chapters_overflows() {
        let mut doc = Document::new();
        let book = doc.insert_book(0).unwrap();
        for i in 0..256 {
            book.chapters.push(Chapter::new(i));
        }
        let mut out = Vec::new();
        let err = write_book_index(&mut out, &doc).unwrap_err();
        assert!(matches!(
            err,
            BuildError::FieldOverflow { field: "chapters per book", value: 256, .. }
        ));
    }

    #[test]
    fn occurrence_overflow_detected_before_truncation() {
        let mut table = WordTable::new(false);
        for vref in 0..40_000u32 {
            table.add_occurrence("word", 0, 4, vref).unwrap();
        }
        table.finalize();
        let forward = table.forward_order();
        let reverse = table.reverse_order(&forward);
        let mut out = Vec::new();
        let err = write_word_group(&mut out, &table, &forward, &reverse).unwrap_err();
        assert!(matches!(
            err,
            BuildError::FieldOverflow { field: "occurrences per word", .. }
        ));
    }
}
