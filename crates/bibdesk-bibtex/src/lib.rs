//! BibTeX parsing and formatting
//!
//! This crate reads BibDesk-flavored BibTeX files and writes entries back out
//! in plain BibTeX that Zotero's importer accepts.
//!
//! Features:
//! - Nom-based parser for robust BibTeX parsing
//! - Field names kept verbatim (BibDesk's `Bdsk-File-1` stays `Bdsk-File-1`)
//! - Standard month macro expansion
//! - Round-trip formatting

mod entry;
mod formatter;
mod month_macros;
pub mod parser;

pub use entry::{BibTeXEntry, BibTeXEntryType, BibTeXField};
pub use formatter::{format_complete, format_entries, format_entry};
pub use month_macros::{expand_month_macro, is_month_macro};
pub use parser::{parse, parse_entry, BibTeXParseError, BibTeXParseResult, ParseError};
