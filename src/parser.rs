//! Canonical line-format parser.
//!
//! Input is one entry per line:
//!
//! - `B:<BookName>` — switch to a book (canonical name, each at most once,
//!   in ascending canonical order);
//! - `<chapter>:<verse> <text>` — a verse; chapters and verses are
//!   1-based and strictly sequential;
//! - `Pre <chapter>: <text>` — a chapter preface, only immediately before
//!   that chapter's first verse;
//! - `Post: <text>` — a book postscript, only after the current chapter
//!   has verse data, and final for its book.
//!
//! Text payloads have internal whitespace runs collapsed to single spaces
//! and are trimmed before storage. All sequencing violations fail here,
//! with the offending line number, before the index builder ever sees the
//! tree.

use std::io::BufRead;

use crate::error::{BuildError, Result};
use crate::model::{book_id, Chapter, Document};

pub struct Parser {
    doc: Document,
    line_no: usize,
    current_book: Option<u8>,
    /// Pending `Pre` payload (chapter number, text) waiting for its
    /// chapter's first verse.
    pre_accum: Option<(u32, String)>,
    /// Set once the current book has a postscript; nothing may follow.
    book_closed: bool,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            doc: Document::new(),
            line_no: 0,
            current_book: None,
            pre_accum: None,
            book_closed: false,
        }
    }

    /// Parse an entire canonical text stream into a document tree.
    pub fn parse(mut self, input: impl BufRead) -> Result<Document> {
        for line in input.lines() {
            let line = line?;
            self.line(&line)?;
        }
        self.finish()
    }

    /// Feed one line. Callers that already have the text split can use
    /// this directly instead of [`Self::parse`].
    pub fn line(&mut self, line: &str) -> Result<()> {
        self.line_no += 1;
        let line = line.trim_end();
        if line.is_empty() {
            return Ok(());
        }

        let first = line.chars().next().unwrap();
        if first.is_ascii_digit() {
            self.verse_line(line)
        } else if let Some(name) = line.strip_prefix("B:") {
            self.book_line(name)
        } else if let Some(rest) = line.strip_prefix("Pre ") {
            self.pre_line(rest)
        } else if let Some(text) = line.strip_prefix("Post:") {
            self.post_line(text)
        } else {
            Err(self.err(format!("invalid input line: '{line}'")))
        }
    }

    /// Validate terminal state and hand the tree over.
    pub fn finish(self) -> Result<Document> {
        if self.pre_accum.is_some() {
            return Err(BuildError::parse(
                self.line_no,
                "preface without a following chapter",
            ));
        }
        Ok(self.doc)
    }

    fn err(&self, message: impl Into<String>) -> BuildError {
        BuildError::parse(self.line_no, message)
    }

    fn book_line(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        let id = book_id(name)
            .ok_or_else(|| self.err(format!("unknown book name '{name}'")))?;
        if self.pre_accum.is_some() {
            return Err(self.err("preface without a following chapter"));
        }
        // Ascending book order keeps verse references monotonic in the
        // document walk.
        if let Some(cur) = self.current_book {
            if id <= cur {
                return Err(self.err(format!(
                    "book '{name}' out of canonical order"
                )));
            }
        }
        self.doc.insert_book(id).map_err(|e| match e {
            BuildError::Parse { message, .. } => BuildError::Parse {
                line: self.line_no,
                message,
            },
            other => other,
        })?;
        self.current_book = Some(id);
        self.book_closed = false;
        Ok(())
    }

    fn verse_line(&mut self, line: &str) -> Result<()> {
        let book = self
            .current_book
            .ok_or_else(|| self.err("verse data before any book line"))?;
        if self.book_closed {
            return Err(self.err("verse data after book postscript"));
        }

        let colon = line
            .find(':')
            .ok_or_else(|| self.err("invalid verse line: missing colon"))?;
        let space = line
            .find(' ')
            .filter(|&s| s > colon)
            .ok_or_else(|| self.err("invalid verse line: missing space"))?;
        let chapter_num: u32 = line[..colon]
            .parse()
            .map_err(|_| self.err("invalid chapter number"))?;
        let verse_num: u32 = line[colon + 1..space]
            .parse()
            .map_err(|_| self.err("invalid verse number"))?;
        if chapter_num == 0 || verse_num == 0 {
            return Err(self.err("chapter and verse numbers start at 1"));
        }
        let text = normalize_text(&line[space + 1..]);
        if text.is_empty() {
            return Err(self.err("empty verse text"));
        }

        let chapter_count = self.doc.book(book).map(|b| b.chapters.len() as u32).unwrap_or(0);
        if chapter_num == chapter_count + 1 {
            // First verse of a new chapter.
            if verse_num != 1 {
                return Err(self.err("expected first verse of the chapter"));
            }
            self.start_chapter(book, chapter_num - 1)?;
        } else if chapter_num != chapter_count {
            return Err(self.err("chapter index out of sequence"));
        } else if self.pre_accum.is_some() {
            // A preface may only open a chapter.
            return Err(self.err("unexpected preface data"));
        }

        let unit = self.doc.new_unit(text);
        let chapter = self
            .doc
            .book_mut(book)
            .and_then(|b| b.chapters.last_mut())
            .expect("chapter exists after sequencing checks");
        if chapter.verses.len() as u32 != verse_num - 1 {
            return Err(BuildError::parse(self.line_no, "verse index out of sequence"));
        }
        chapter.verses.push(unit);
        Ok(())
    }

    fn start_chapter(&mut self, book: u8, index: u32) -> Result<()> {
        let preface = match self.pre_accum.take() {
            Some((chapter_num, text)) => {
                if chapter_num != index + 1 {
                    return Err(self.err(format!(
                        "preface names chapter {chapter_num} but chapter {} follows",
                        index + 1
                    )));
                }
                Some(self.doc.new_unit(text))
            }
            None => None,
        };
        let mut chapter = Chapter::new(index);
        chapter.preface = preface;
        self.doc
            .book_mut(book)
            .expect("current book exists")
            .chapters
            .push(chapter);
        Ok(())
    }

    fn pre_line(&mut self, rest: &str) -> Result<()> {
        if self.current_book.is_none() {
            return Err(self.err("preface before any book line"));
        }
        if self.book_closed {
            return Err(self.err("preface after book postscript"));
        }
        if self.pre_accum.is_some() {
            return Err(self.err("consecutive preface lines"));
        }
        let colon = rest
            .find(':')
            .ok_or_else(|| self.err("invalid preface line: missing colon"))?;
        let chapter_num: u32 = rest[..colon]
            .trim()
            .parse()
            .map_err(|_| self.err("invalid preface chapter number"))?;
        let text = normalize_text(&rest[colon + 1..]);
        if text.is_empty() {
            return Err(self.err("empty preface text"));
        }
        self.pre_accum = Some((chapter_num, text));
        Ok(())
    }

    fn post_line(&mut self, payload: &str) -> Result<()> {
        let book = self
            .current_book
            .ok_or_else(|| self.err("postscript before any book line"))?;
        if self.book_closed {
            return Err(self.err("duplicate book postscript"));
        }
        if self.pre_accum.is_some() {
            return Err(self.err("preface without a following chapter"));
        }
        let has_verses = self
            .doc
            .book(book)
            .and_then(|b| b.chapters.last())
            .map(|c| !c.verses.is_empty())
            .unwrap_or(false);
        if !has_verses {
            return Err(self.err("postscript before any verse data"));
        }

        let mut text = normalize_text(payload);
        // A fully bracketed postscript is stored unbracketed.
        if text.starts_with('[') && text.ends_with(']') && text.len() >= 2 {
            text = text[1..text.len() - 1].to_string();
        }
        if text.is_empty() {
            return Err(self.err("empty postscript text"));
        }

        let unit = self.doc.new_unit(text);
        self.doc
            .book_mut(book)
            .expect("current book exists")
            .postscript = Some(unit);
        self.book_closed = true;
        Ok(())
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim and collapse internal whitespace runs to single spaces.
fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for part in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

/// Parse a complete canonical document from a string.
pub fn parse_str(input: &str) -> Result<Document> {
    Parser::new().parse(input.as_bytes())
}
