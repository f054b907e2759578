//! The build pipeline.
//!
//! One [`build_from_reader`] call owns every phase and all intermediate
//! state; nothing lives in statics, so builds are reentrant and
//! test-isolated. Phases, in order:
//!
//! 1. parse the canonical text into a document tree;
//! 2. scan every unit into the case-sensitive and case-insensitive word
//!    tables, then finalize (sort + dedup occurrence lists);
//! 3. positional processing in document order: strip italics brackets
//!    (rewriting unit text), then scan word positions against the
//!    post-strip text;
//! 4. compute the forward/reverse word orderings;
//! 5. measure the binary layout, then emit it into one buffer.
//!
//! Any error aborts the whole build; the output file is written via a
//! temporary path and atomic rename so readers never observe a partial
//! archive.

use std::fs;
use std::io::BufRead;
use std::path::Path;

use crate::archive::{self, ArchiveInputs, Header, WordOrders};
use crate::error::Result;
use crate::index::{ItalicIndex, WordIndex, WordPosIndex};
use crate::model::Document;
use crate::parser::Parser;
use crate::stats::BuildStats;

/// A finished build: the complete file image plus its layout and
/// statistics.
pub struct BuildOutput {
    pub bytes: Vec<u8>,
    pub header: Header,
    pub stats: BuildStats,
}

/// Build an archive from canonical text, with an optional extra-markup
/// blob embedded verbatim.
pub fn build_from_reader(input: impl BufRead, extra_markup: &[u8]) -> Result<BuildOutput> {
    let doc = Parser::new().parse(input)?;
    build_document(doc, extra_markup)
}

/// [`build_from_reader`] over an in-memory string.
pub fn build_str(input: &str, extra_markup: &[u8]) -> Result<BuildOutput> {
    build_from_reader(input.as_bytes(), extra_markup)
}

/// Build from an already-parsed document tree.
pub fn build_document(mut doc: Document, extra_markup: &[u8]) -> Result<BuildOutput> {
    let mut index = WordIndex::new();
    index.index_document(&doc)?;
    index.finalize();

    let (word_pos, italics) = process_positions(&mut doc)?;
    let orders = WordOrders::compute(&mut index);

    let inputs = ArchiveInputs {
        doc: &doc,
        index: &index,
        orders: &orders,
        word_pos: &word_pos,
        italics: &italics,
        extra_markup,
    };
    let header = archive::measure(&inputs)?;
    let bytes = archive::emit(&inputs, &header)?;
    let stats = BuildStats::gather(&doc, &index, &word_pos, &italics, &header);

    Ok(BuildOutput {
        bytes,
        header,
        stats,
    })
}

/// Strip italics and scan word positions for every unit, in document
/// order. Bracket stripping must precede the word-position scan: word
/// offsets are recorded against the post-strip text.
fn process_positions(doc: &mut Document) -> Result<(WordPosIndex, ItalicIndex)> {
    let mut italics = ItalicIndex::new();
    let mut word_pos = WordPosIndex::new();

    for id in doc.walk_units() {
        let unit = doc.unit(id);
        let (stripped, italic_span) = italics.process_unit(&unit.text, unit.verse_ref)?;
        let unit = doc.unit_mut(id);
        unit.text = stripped;
        unit.italic_span = italic_span;
        let word_span = word_pos.process_unit(&doc.unit(id).text)?;
        doc.unit_mut(id).word_span = word_span;
    }
    Ok((word_pos, italics))
}

/// Write a finished archive to `path` atomically: the bytes land in a
/// sibling temporary file which is renamed over the target only once
/// fully written.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "B:Genesis\n\
                          1:1 In the beginning God created the heaven and the earth.\n\
                          1:2 And the earth was without form, and void.\n\
                          2:1 Thus the heavens and the earth were finished.\n\
                          B:Exodus\n\
                          1:1 Now these [are] the names.\n\
                          Post: Written by Moses.\n";

    #[test]
    fn build_produces_consistent_layout() {
        let out = build_str(SAMPLE, b"").unwrap();
        assert_eq!(out.bytes.len() as u64, out.header.file_size());
        assert_eq!(out.stats.verse_units, 5);
        assert_eq!(out.stats.chapters, 3);
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let a = build_str(SAMPLE, b"extra").unwrap();
        let b = build_str(SAMPLE, b"extra").unwrap();
        assert_eq!(a.bytes, b.bytes);
    }

    #[test]
    fn italics_are_stripped_before_word_positions() {
        let out = build_str("B:Genesis\n1:1 And [he] said.\n", b"").unwrap();
        // "And he said." is 12 chars post-strip; the verse data section
        // must hold the stripped text.
        let start = out.header.verse_data.start as usize;
        let end = start + out.header.verse_data.count as usize;
        assert_eq!(&out.bytes[start..end], b"And he said.");
        assert_eq!(out.header.italic_pos_index.count, 1);
        assert_eq!(out.header.word_pos_index.count, 3);
    }

    #[test]
    fn bad_character_aborts_build() {
        assert!(build_str("B:Genesis\n1:1 seven % eight\n", b"").is_err());
    }
}
