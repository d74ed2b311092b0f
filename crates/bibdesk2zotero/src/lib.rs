//! bibdesk2zotero: migrate BibDesk BibTeX libraries to Zotero 7
//!
//! BibDesk keeps attachments in `Bdsk-File-N` fields (base64 binary plists
//! holding a relative path) and links in `Bdsk-Url-N` fields. Zotero's BibTeX
//! importer instead expects one `file` field listing `title:path:mimetype`
//! triples. This crate rewrites records from the former to the latter.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        bibdesk2zotero                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  bdsk_file     │ Bdsk-File blob -> absolute attachment path  │
//! │  fields        │ text vs. control field classification      │
//! │  record        │ typed record (ID, ENTRYTYPE, fields)        │
//! │  transform     │ per-record rewrite steps                    │
//! │  zotero_file   │ Zotero `file` field formatting              │
//! │  mime          │ MIME type guessing                          │
//! │  diagnostics   │ warnings raised during migration            │
//! │  migrate       │ whole-file driver                           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use bibdesk2zotero::{Record, Transformer};
//!
//! let mut record = Record::new("besold2017", "article")
//!     .with_field("shorttitle", r"Neural-{\{}Symbolic{\}} Learning");
//! let mut transformer = Transformer::new("/Users/me/Papers", false).unwrap();
//! transformer.transform(&mut record).unwrap();
//!
//! assert_eq!(record.get("shorttitle"), Some("Neural-Symbolic Learning"));
//! assert!(transformer.is_modified());
//! ```

pub mod bdsk_file;
pub mod diagnostics;
pub mod error;
pub mod fields;
pub mod migrate;
pub mod mime;
pub mod record;
pub mod transform;
pub mod zotero_file;

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use error::{DecodeError, MigrateError, TransformError};
pub use fields::is_text_field;
pub use migrate::{
    migrate_file, migrate_str, ErrorPolicy, MigrateOptions, Migration, MigrationReport,
};
pub use record::Record;
pub use transform::{Transformer, ZOTERO_FILE_FIELD};
