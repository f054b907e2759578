//! Build statistics and console reporting.

use serde::Serialize;

use crate::archive::Header;
use crate::index::{ItalicIndex, WordIndex, WordPosIndex, WordTable};
use crate::model::Document;

/// Aggregate numbers for one word table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WordTableStats {
    pub words: usize,
    pub verse_refs: usize,
    pub word_bytes: usize,
    pub max_refs_per_word: usize,
    pub min_refs_per_word: usize,
}

impl WordTableStats {
    fn gather(table: &WordTable) -> Self {
        let mut max_refs = 0usize;
        let mut min_refs = usize::MAX;
        for i in 0..table.len() {
            let refs = table.entry(i).verse_refs().len();
            max_refs = max_refs.max(refs);
            min_refs = min_refs.min(refs);
        }
        WordTableStats {
            words: table.len(),
            verse_refs: table.occurrence_count(),
            word_bytes: table.word_data_size(),
            max_refs_per_word: max_refs,
            min_refs_per_word: if table.is_empty() { 0 } else { min_refs },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionStats {
    pub name: &'static str,
    pub start: u32,
    pub count: u32,
}

/// Everything the CLI reports after a build, also serializable as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct BuildStats {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
    pub verse_units: usize,
    pub case_sensitive: WordTableStats,
    pub case_insensitive: WordTableStats,
    pub max_chapters_per_book: usize,
    pub min_chapters_per_book: usize,
    pub max_verses_per_chapter: usize,
    pub min_verses_per_chapter: usize,
    pub max_verse_len: usize,
    pub min_verse_len: usize,
    pub max_words_per_unit: u32,
    pub max_italics_per_unit: u32,
    pub file_size: u64,
    pub sections: Vec<SectionStats>,
}

impl BuildStats {
    pub fn gather(
        doc: &Document,
        index: &WordIndex,
        word_pos: &WordPosIndex,
        italics: &ItalicIndex,
        header: &Header,
    ) -> Self {
        let mut max_chapters = 0usize;
        let mut min_chapters = usize::MAX;
        let mut max_verses = 0usize;
        let mut min_verses = usize::MAX;
        let mut max_verse_len = 0usize;
        let mut min_verse_len = usize::MAX;
        let mut book_count = 0usize;

        for book in doc.books() {
            book_count += 1;
            max_chapters = max_chapters.max(book.chapters.len());
            min_chapters = min_chapters.min(book.chapters.len());
            for chapter in &book.chapters {
                max_verses = max_verses.max(chapter.verses.len());
                min_verses = min_verses.min(chapter.verses.len());
                for &id in &chapter.verses {
                    let len = doc.unit(id).text.len();
                    max_verse_len = max_verse_len.max(len);
                    min_verse_len = min_verse_len.min(len);
                }
            }
        }
        if book_count == 0 {
            min_chapters = 0;
        }
        if doc.chapter_count() == 0 {
            min_verses = 0;
        }
        if doc.verse_count() == 0 {
            min_verse_len = 0;
        }

        let sections = header
            .sections()
            .iter()
            .map(|&(name, s)| SectionStats {
                name,
                start: s.start,
                count: s.count,
            })
            .collect();

        BuildStats {
            books: book_count,
            chapters: doc.chapter_count(),
            verses: doc.verse_count(),
            verse_units: doc.unit_count(),
            case_sensitive: WordTableStats::gather(&index.case_sensitive),
            case_insensitive: WordTableStats::gather(&index.case_insensitive),
            max_chapters_per_book: max_chapters,
            min_chapters_per_book: min_chapters,
            max_verses_per_chapter: max_verses,
            min_verses_per_chapter: min_verses,
            max_verse_len,
            min_verse_len,
            max_words_per_unit: word_pos.max_per_unit(),
            max_italics_per_unit: italics.max_per_unit(),
            file_size: header.file_size(),
            sections,
        }
    }

    /// Human-readable report.
    pub fn print(&self) {
        println!("Build Statistics");
        println!("================");
        println!();
        println!("Books:            {}", self.books);
        println!("Chapters:         {}", self.chapters);
        println!("Verses:           {}", self.verses);
        println!("Indexed units:    {}", self.verse_units);
        println!();

        for (label, t) in [
            ("Case-sensitive index", &self.case_sensitive),
            ("Case-insensitive index", &self.case_insensitive),
        ] {
            println!("{label}:");
            println!("  Words:                 {}", t.words);
            println!("  Verse references:      {}", t.verse_refs);
            println!("  Word bytes:            {}", t.word_bytes);
            println!("  Refs per word (max):   {}", t.max_refs_per_word);
            println!("  Refs per word (min):   {}", t.min_refs_per_word);
        }

        println!();
        println!("Chapters per book:    {}..{}", self.min_chapters_per_book, self.max_chapters_per_book);
        println!("Verses per chapter:   {}..{}", self.min_verses_per_chapter, self.max_verses_per_chapter);
        println!("Verse length:         {}..{}", self.min_verse_len, self.max_verse_len);
        println!("Max words per unit:   {}", self.max_words_per_unit);
        println!("Max italics per unit: {}", self.max_italics_per_unit);
        println!();
        println!("Sections:");
        for s in &self.sections {
            println!("  {:08} {:20} {:8} elements", s.start, s.name, s.count);
        }
        println!();
        println!("File size:        {} bytes", self.file_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_str;

    #[test]
    fn stats_reflect_document_shape() {
        let out = build_str(
            "B:Genesis\n1:1 In the beginning\n1:2 And the earth\n2:1 Thus\n",
            b"",
        )
        .unwrap();
        let s = out.stats;
        assert_eq!(s.books, 1);
        assert_eq!(s.chapters, 2);
        assert_eq!(s.verses, 3);
        assert_eq!(s.max_verses_per_chapter, 2);
        assert_eq!(s.min_verses_per_chapter, 1);
        assert_eq!(s.sections.len(), 15);
        assert_eq!(s.file_size, out.bytes.len() as u64);
    }

    #[test]
    fn stats_serialize_to_json() {
        let out = build_str("B:Genesis\n1:1 Light\n", b"").unwrap();
        let json = serde_json::to_string_pretty(&out.stats).unwrap();
        assert!(json.contains("\"case_sensitive\""));
        assert!(json.contains("\"file_size\""));
    }
}
