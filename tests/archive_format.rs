//! End-to-end checks of the archive layout against hand-computed offsets.

use versepack::archive::{FILE_ID, HEADER_SIZE};
use versepack::build::{build_str, write_file};

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

/// Header field pairs in file order, starting right after the 16-byte id.
fn header_fields(bytes: &[u8]) -> Vec<(u32, u32)> {
    (0..15)
        .map(|i| {
            let off = 16 + i * 8;
            (u32_at(bytes, off), u32_at(bytes, off + 4))
        })
        .collect()
}

/// Three words with lengths 3/4/5 and 2/1/3 deduplicated occurrences.
const SYNTHETIC: &str = "B:Genesis\n\
                         1:1 aaa bbbb ccccc\n\
                         1:2 aaa ccccc\n\
                         1:3 ccccc\n";

#[test]
fn synthetic_corpus_layout_matches_hand_computation() {
    let out = build_str(SYNTHETIC, b"").unwrap();
    let bytes = &out.bytes;

    assert_eq!(&bytes[..16], FILE_ID);

    let fields = header_fields(bytes);
    // (start, count) per section, computed by hand:
    // verse data = 14 + 9 + 5 = 28 bytes; word positions = 3 + 2 + 1 = 6.
    let expected = [
        (136, 3),  // cs word index, 3 rows of 3 bytes
        (145, 3),  // cs reverse index, 3 rows of 2 bytes
        (151, 12), // cs word data, 3+4+5 bytes
        (163, 6),  // cs verse refs, 6 rows of 2 bytes
        (175, 3),  // ci word index
        (184, 3),  // ci reverse index
        (190, 12), // ci word data
        (202, 6),  // ci verse refs
        (214, 66), // book index, one byte per slot
        (280, 1),  // chapter index, 2 bytes per chapter
        (282, 3),  // verse index, 3 bytes per unit
        (291, 28), // verse data
        (319, 0),  // extra markup
        (319, 6),  // word position index
        (331, 0),  // italic position index
    ];
    assert_eq!(fields.as_slice(), expected.as_slice());
    assert_eq!(bytes.len(), 331);

    // Word index rows: (len u8, occurrence count i16), forward order.
    assert_eq!(&bytes[136..145], &[3, 2, 0, 4, 1, 0, 5, 3, 0]);
    // Reverse ordering coincides with forward here; rows hold forward indices.
    assert_eq!(&bytes[145..151], &[0, 0, 1, 0, 2, 0]);
    // Concatenated word characters, no delimiters.
    assert_eq!(&bytes[151..163], b"aaabbbbccccc");
    // Occurrence refs: aaa -> 0,1; bbbb -> 0; ccccc -> 0,1,2.
    assert_eq!(
        &bytes[163..175],
        &[0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 2, 0]
    );
    // Case-insensitive data is the upper-cased mirror.
    assert_eq!(&bytes[190..202], b"AAABBBBCCCCC");

    // Book index: Genesis has 1 chapter, all other slots zero.
    assert_eq!(bytes[214], 1);
    assert!(bytes[215..280].iter().all(|&b| b == 0));
    // Chapter index: 3 verse slots, no extra flags.
    assert_eq!(&bytes[280..282], &[3, 0]);

    // Verse data in document order.
    assert_eq!(&bytes[291..319], b"aaa bbbb cccccaaa cccccccccc");
}

#[test]
fn verse_index_packs_len_and_span_counts() {
    let out = build_str(SYNTHETIC, b"").unwrap();
    let start = out.header.verse_index.start as usize;
    let rows: Vec<u32> = (0..3)
        .map(|i| {
            let off = start + i * 3;
            u32::from_le_bytes([
                out.bytes[off],
                out.bytes[off + 1],
                out.bytes[off + 2],
                0,
            ])
        })
        .collect();
    let lens: Vec<u32> = rows.iter().map(|r| r & 0x3FF).collect();
    let words: Vec<u32> = rows.iter().map(|r| (r >> 10) & 0x7F).collect();
    let italics: Vec<u32> = rows.iter().map(|r| (r >> 17) & 0x0F).collect();
    assert_eq!(lens, vec![14, 9, 5]);
    assert_eq!(words, vec![3, 2, 1]);
    assert_eq!(italics, vec![0, 0, 0]);
}

#[test]
fn extra_markup_blob_is_passed_through_verbatim() {
    let markup = b"Book Genesis\nTitle0 The First Book of Moses\n";
    let out = build_str(SYNTHETIC, markup).unwrap();
    let start = out.header.extra_markup.start as usize;
    let end = start + out.header.extra_markup.count as usize;
    assert_eq!(&out.bytes[start..end], markup);
    // Sections after the blob shift by its size.
    let without = build_str(SYNTHETIC, b"").unwrap();
    assert_eq!(
        out.header.word_pos_index.start,
        without.header.word_pos_index.start + markup.len() as u32
    );
}

#[test]
fn prefaces_and_postscripts_claim_verse_slots() {
    let input = "B:Genesis\n\
                 Pre 1: The creation week.\n\
                 1:1 In the beginning.\n\
                 Post: So ends the record.\n";
    let out = build_str(input, b"").unwrap();
    // One preface + one verse + one postscript.
    assert_eq!(out.header.verse_index.count, 3);
    let chap_start = out.header.chapter_index.start as usize;
    // Verse slot count includes preface and postscript; both flag bits set.
    assert_eq!(out.bytes[chap_start], 3);
    assert_eq!(out.bytes[chap_start + 1], 1 | 2);
}

#[test]
fn rebuilds_are_byte_identical() {
    let input = "B:Genesis\n\
                 1:1 And God said, Let there be light: and there was light.\n\
                 1:2 And God saw the light, that [it was] good.\n\
                 B:Exodus\n\
                 1:1 Now these [are] the names of the children of Israel.\n";
    let first = build_str(input, b"markup").unwrap();
    for _ in 0..3 {
        assert_eq!(build_str(input, b"markup").unwrap().bytes, first.bytes);
    }
}

#[test]
fn sequencing_errors_fail_the_build() {
    assert!(build_str("B:Genesis\n1:1 First\n1:3 Third?\n", b"").is_err());
    assert!(build_str("B:Genesis\n1:1 y\nPost: x\n1:2 z\n", b"").is_err());
    assert!(build_str("B:Genesis\n2:1 skipped chapter\n", b"").is_err());
}

#[test]
fn header_size_constant_matches_emitted_prefix() {
    let out = build_str(SYNTHETIC, b"").unwrap();
    assert_eq!(out.header.word_cs_index.start, HEADER_SIZE);
}

#[test]
fn write_file_is_atomic_and_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.bin");
    let out = build_str(SYNTHETIC, b"").unwrap();
    write_file(&path, &out.bytes).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), out.bytes);
    // No temporary file left behind.
    assert!(!dir.path().join("corpus.tmp").exists());
}
