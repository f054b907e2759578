//! # versepack — binary archive builder for versified texts
//!
//! versepack ingests a line-oriented canonical markup describing a
//! book → chapter → verse document (with optional chapter prefaces and
//! book postscripts), builds case-sensitive and case-insensitive word
//! indexes over the text, and serializes the whole structure into a
//! compact fixed-layout binary file.
//!
//! ## Architecture
//!
//! - [`parser`] - canonical line-format parsing into the document tree
//! - [`model`] - arena document tree with monotonic verse references
//! - [`text`] - word/non-word tokenization
//! - [`index`] - word tables, collation, and positional index streams
//! - [`archive`] - fixed-layout header arithmetic and two-phase emission
//! - [`build`] - the end-to-end build pipeline
//! - [`stats`] - build statistics reporting
//!
//! ## Quick start
//!
//! ```
//! let out = versepack::build::build_str(
//!     "B:Genesis\n1:1 In the beginning God created the heaven and the earth.\n",
//!     b"",
//! )
//! .unwrap();
//! assert_eq!(out.bytes.len() as u64, out.header.file_size());
//! ```
//!
//! The whole build is single-threaded and all-or-nothing: any format
//! error aborts without producing output.

pub mod archive;
pub mod build;
pub mod error;
pub mod index;
pub mod model;
pub mod parser;
pub mod stats;
pub mod text;

pub use build::{build_from_reader, build_str, BuildOutput};
pub use error::{BuildError, Result};
