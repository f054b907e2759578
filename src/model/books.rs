//! Canonical book name table.

use super::BookId;

/// Number of books in the canonical table.
pub const BOOK_COUNT: usize = 66;

/// Canonical book identifiers in ordinal order. Numbered books use the
/// `Name1`/`Name2` form so the identifier is a single word.
pub const BOOK_NAMES: [&str; BOOK_COUNT] = [
    "Genesis",
    "Exodus",
    "Leviticus",
    "Numbers",
    "Deuteronomy",
    "Joshua",
    "Judges",
    "Ruth",
    "Samuel1",
    "Samuel2",
    "Kings1",
    "Kings2",
    "Chronicles1",
    "Chronicles2",
    "Ezra",
    "Nehemiah",
    "Esther",
    "Job",
    "Psalms",
    "Proverbs",
    "Ecclesiastes",
    "SongOfSolomon",
    "Isaiah",
    "Jeremiah",
    "Lamentations",
    "Ezekiel",
    "Daniel",
    "Hosea",
    "Joel",
    "Amos",
    "Obadiah",
    "Jonah",
    "Micah",
    "Nahum",
    "Habakkuk",
    "Zephaniah",
    "Haggai",
    "Zechariah",
    "Malachi",
    "Matthew",
    "Mark",
    "Luke",
    "John",
    "Acts",
    "Romans",
    "Corinthians1",
    "Corinthians2",
    "Galatians",
    "Ephesians",
    "Philippians",
    "Colossians",
    "Thessalonians1",
    "Thessalonians2",
    "Timothy1",
    "Timothy2",
    "Titus",
    "Philemon",
    "Hebrews",
    "James",
    "Peter1",
    "Peter2",
    "John1",
    "John2",
    "John3",
    "Jude",
    "Revelation",
];

/// Look up a book ordinal by its canonical name (case-insensitive).
pub fn book_id(name: &str) -> Option<BookId> {
    BOOK_NAMES
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name))
        .map(|i| i as BookId)
}

/// Canonical name for a book ordinal. Panics on an out-of-range id, which
/// cannot come from a parsed document.
pub fn book_name(id: BookId) -> &'static str {
    BOOK_NAMES[id as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(book_id("genesis"), Some(0));
        assert_eq!(book_id("Revelation"), Some(65));
        assert_eq!(book_id("songofsolomon"), Some(21));
        assert_eq!(book_id("Ezekiel2"), None);
    }

    #[test]
    fn names_round_trip() {
        for (i, name) in BOOK_NAMES.iter().enumerate() {
            assert_eq!(book_id(name), Some(i as BookId));
        }
    }
}
