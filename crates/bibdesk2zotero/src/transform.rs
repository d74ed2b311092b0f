//! Per-record BibDesk to Zotero transformation.
//!
//! [`Transformer::transform`] runs four steps in a fixed order:
//!
//! 1. [`strip_existing_file`](Transformer::strip_existing_file), only when
//!    configured, so the converted `file` field is never stripped afterwards
//! 2. [`cleanup_messy_brackets`](Transformer::cleanup_messy_brackets)
//! 3. [`convert_bdsk_files`](Transformer::convert_bdsk_files)
//! 4. [`warn_bdsk_urls`](Transformer::warn_bdsk_urls)
//!
//! Each step is public so that callers can run them individually.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bdsk_file::decode_attachment_reference;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::TransformError;
use crate::fields::{attachment_index, cmp_index, is_legacy_url_field, is_text_field};
use crate::record::Record;
use crate::zotero_file::{format_file_field, ZoteroAttachment};

/// Brace-escaping artifacts left in text fields by some BibTeX writers.
const MESSY_BRACKETS: [&str; 2] = [r"{\{}", r"{\}}"];

/// Name of the consolidated Zotero attachment field.
pub const ZOTERO_FILE_FIELD: &str = "file";

/// Spellings of a pre-existing attachment field removed by
/// [`Transformer::strip_existing_file`].
const EXISTING_FILE_FIELDS: [&str; 2] = ["file", "File"];

/// Rewrites BibDesk records into Zotero's conventions.
///
/// `modified` becomes true the first time any step changes a record and
/// never resets. Scope a transformer to one record to get a per-record flag.
#[derive(Debug)]
pub struct Transformer {
    base_dir: PathBuf,
    strip_existing_file: bool,
    modified: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Transformer {
    /// Create a transformer resolving attachments under `base_dir`, which
    /// must be absolute.
    pub fn new(
        base_dir: impl Into<PathBuf>,
        strip_existing_file: bool,
    ) -> Result<Self, TransformError> {
        let base_dir = base_dir.into();
        if !base_dir.is_absolute() {
            return Err(TransformError::RelativeBaseDir(base_dir));
        }
        Ok(Self {
            base_dir,
            strip_existing_file,
            modified: false,
            diagnostics: Vec::new(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Warnings and errors raised so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Run all steps in order.
    ///
    /// A decode error aborts before the attachment fields are touched, but
    /// earlier steps will already have been applied to `record`.
    pub fn transform(&mut self, record: &mut Record) -> Result<(), TransformError> {
        if self.strip_existing_file {
            self.strip_existing_file(record);
        }
        self.cleanup_messy_brackets(record);
        self.convert_bdsk_files(record)?;
        self.warn_bdsk_urls(record);
        Ok(())
    }

    /// Remove a pre-existing `file` and/or `File` field.
    pub fn strip_existing_file(&mut self, record: &mut Record) {
        for name in EXISTING_FILE_FIELDS {
            if record.remove_if_present(name).is_some() {
                self.modified = true;
                debug!(id = %record.id, "Stripped field `{}`", name);
            }
        }
    }

    /// Remove `{\{}` and `{\}}` from every text field.
    pub fn cleanup_messy_brackets(&mut self, record: &mut Record) {
        let id = record.id.clone();
        for (name, value) in record.iter_mut() {
            if !is_text_field(name) || !MESSY_BRACKETS.iter().any(|m| value.contains(m)) {
                continue;
            }
            let cleaned = strip_messy_brackets(value);
            if cleaned != *value {
                *value = cleaned;
                self.modified = true;
                debug!(id = %id, "Stripped messy bracket escapes in `{}`", name);
            }
        }
    }

    /// Replace all `bdsk-file-N` fields with one Zotero `file` field.
    ///
    /// Attachments are ordered by N numerically. Every reference is decoded
    /// before the record is changed, so a decode error leaves the attachment
    /// fields intact.
    pub fn convert_bdsk_files(&mut self, record: &mut Record) -> Result<(), TransformError> {
        let mut references: Vec<(&str, &str, &str)> = record
            .iter()
            .filter_map(|(name, value)| attachment_index(name).map(|index| (index, name, value)))
            .collect();
        if references.is_empty() {
            return Ok(());
        }
        references.sort_by(|a, b| cmp_index(a.0, b.0));

        let paths = references
            .iter()
            .map(|&(_, name, value)| {
                decode_attachment_reference(&self.base_dir, value).map_err(|source| {
                    TransformError::Decode {
                        field: name.to_string(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut raised = Vec::new();
        for path in &paths {
            if !path.is_file() {
                raised.push(Diagnostic::warning(
                    &record.id,
                    DiagnosticKind::MissingAttachment { path: path.clone() },
                ));
            }
        }

        let attachments: Vec<ZoteroAttachment> =
            paths.into_iter().map(ZoteroAttachment::from_path).collect();
        for attachment in attachments.iter().filter(|a| a.mime_type.is_none()) {
            raised.push(Diagnostic::error(
                &record.id,
                DiagnosticKind::UnknownMimeType {
                    path: attachment.path.clone(),
                },
            ));
        }
        for diagnostic in raised {
            self.raise(diagnostic);
        }

        record.set(ZOTERO_FILE_FIELD, format_file_field(&attachments));
        record.retain(|name, _| attachment_index(name).is_none());
        self.modified = true;
        debug!(id = %record.id, "Converted {} bdsk-file(s)", attachments.len());
        Ok(())
    }

    /// Warn about every `bdsk-url-N` field. The record is not changed.
    pub fn warn_bdsk_urls(&mut self, record: &Record) {
        for (name, value) in record.iter() {
            if is_legacy_url_field(name) {
                self.raise(Diagnostic::warning(
                    &record.id,
                    DiagnosticKind::LegacyUrl {
                        field: name.to_string(),
                        value: value.to_string(),
                    },
                ));
            }
        }
    }

    fn raise(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }
}

/// Remove bracket artifacts until none are left.
///
/// A single pass can splice a new artifact together (`{\{{\{}}`), so repeat
/// until the value stops changing.
fn strip_messy_brackets(value: &str) -> String {
    let mut current = value.to_string();
    loop {
        let mut next = current.clone();
        for pattern in MESSY_BRACKETS {
            next = next.replace(pattern, "");
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bdsk_file::encode_relative_path;
    use crate::diagnostics::Severity;

    fn transformer(strip: bool) -> Transformer {
        Transformer::new("/path/to/papers", strip).unwrap()
    }

    fn bdsk(relative_path: &str) -> String {
        encode_relative_path(relative_path).unwrap()
    }

    #[test]
    fn rejects_relative_base_dir() {
        assert!(matches!(
            Transformer::new("papers", false),
            Err(TransformError::RelativeBaseDir(_))
        ));
    }

    #[test]
    fn strip_removes_both_spellings() {
        let mut t = transformer(true);
        let mut record = Record::new("X", "article")
            .with_field("file", "a")
            .with_field("File", "b")
            .with_field("FILE", "c");
        t.strip_existing_file(&mut record);
        assert!(t.is_modified());
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["FILE"]);
    }

    #[test]
    fn strip_without_field_is_noop() {
        let mut t = transformer(true);
        let mut record = Record::new("X", "article").with_field("title", "T");
        let before = record.clone();
        t.strip_existing_file(&mut record);
        assert!(!t.is_modified());
        assert_eq!(record, before);
    }

    #[test]
    fn cleanup_skips_control_fields() {
        let mut t = transformer(false);
        let mut record = Record::new("X", "article")
            .with_field("url", r"http://x/{\{}")
            .with_field("Bdsk-Url-1", r"{\}}");
        let before = record.clone();
        t.cleanup_messy_brackets(&mut record);
        assert!(!t.is_modified());
        assert_eq!(record, before);
    }

    #[test]
    fn cleanup_keeps_other_escapes() {
        let mut t = transformer(false);
        let mut record =
            Record::new("X", "article").with_field("author", r"P{\'{e}}rez-Escudero, Alfonso");
        t.cleanup_messy_brackets(&mut record);
        assert!(!t.is_modified());
        assert_eq!(record.get("author"), Some(r"P{\'{e}}rez-Escudero, Alfonso"));
    }

    #[test]
    fn strip_messy_brackets_removes_spliced_artifacts() {
        assert_eq!(strip_messy_brackets(r"x{\{{\{}}y"), "xy");
        assert_eq!(strip_messy_brackets(r"{\}}plain"), "plain");
        assert_eq!(strip_messy_brackets(r"{\'{e}}"), r"{\'{e}}");
    }

    #[test]
    fn convert_missing_files_warns_and_continues() {
        let mut t = transformer(false);
        let mut record = Record::new("X", "article")
            .with_field("Bdsk-File-1", bdsk("missing.pdf"))
            .with_field("title", "T");
        t.convert_bdsk_files(&mut record).unwrap();

        assert!(t.is_modified());
        assert_eq!(
            record.get("file"),
            Some("missing:/path/to/papers/missing.pdf:application/pdf")
        );
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["title", "file"]);
        assert_eq!(t.diagnostics().len(), 1);
        assert_eq!(
            t.diagnostics()[0].kind,
            DiagnosticKind::MissingAttachment {
                path: PathBuf::from("/path/to/papers/missing.pdf")
            }
        );
    }

    #[test]
    fn convert_unknown_mime_is_error() {
        let mut t = transformer(false);
        let mut record = Record::new("X", "article").with_field("bdsk-file-1", bdsk("notes"));
        t.convert_bdsk_files(&mut record).unwrap();

        assert_eq!(record.get("file"), Some("notes:/path/to/papers/notes:"));
        let severities: Vec<_> = t.diagnostics().iter().map(|d| d.severity).collect();
        assert_eq!(severities, vec![Severity::Warning, Severity::Error]);
    }

    #[test]
    fn convert_overwrites_existing_file_field() {
        let mut t = transformer(false);
        let mut record = Record::new("X", "article")
            .with_field("file", ":old.pdf:pdf")
            .with_field("bdsk-file-1", bdsk("new.pdf"));
        t.convert_bdsk_files(&mut record).unwrap();
        assert_eq!(
            record.get("file"),
            Some("new:/path/to/papers/new.pdf:application/pdf")
        );
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn convert_decode_error_leaves_fields() {
        let mut t = transformer(false);
        let mut record = Record::new("X", "article")
            .with_field("bdsk-file-1", bdsk("a.pdf"))
            .with_field("bdsk-file-2", "%%%garbage");
        let before = record.clone();

        let err = t.convert_bdsk_files(&mut record).unwrap_err();
        assert!(matches!(err, TransformError::Decode { ref field, .. } if field == "bdsk-file-2"));
        assert_eq!(record, before);
        assert!(!t.is_modified());
    }

    #[test]
    fn warn_urls_in_record_order() {
        let mut t = transformer(false);
        let record = Record::new("X", "article")
            .with_field("bdsk-url-2", "http://b")
            .with_field("Bdsk-Url-1", "http://a");
        t.warn_bdsk_urls(&record);

        let fields: Vec<_> = t
            .diagnostics()
            .iter()
            .map(|d| match &d.kind {
                DiagnosticKind::LegacyUrl { field, .. } => field.as_str(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(fields, vec!["bdsk-url-2", "Bdsk-Url-1"]);
        assert!(!t.is_modified());
    }

    #[test]
    fn transform_without_strip_keeps_file_field() {
        let mut t = transformer(false);
        let mut record = Record::new("X", "article").with_field("file", "old.pdf");
        t.transform(&mut record).unwrap();
        assert_eq!(record.get("file"), Some("old.pdf"));
        assert!(!t.is_modified());
    }

    #[test]
    fn take_diagnostics_drains() {
        let mut t = transformer(false);
        let record = Record::new("X", "article").with_field("bdsk-url-1", "http://x");
        t.warn_bdsk_urls(&record);
        assert_eq!(t.take_diagnostics().len(), 1);
        assert!(t.diagnostics().is_empty());
    }
}
