//! Data-quality diagnostics raised during migration.
//!
//! Each diagnostic is logged through `tracing` when it is raised and also kept
//! so that the run can be summarized (see [`crate::migrate::MigrationReport`]).

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A decoded attachment path is not an existing file.
    MissingAttachment { path: PathBuf },
    /// No MIME type could be guessed; the file field carries an empty type.
    UnknownMimeType { path: PathBuf },
    /// A `bdsk-url-N` field that is left in place for manual review.
    LegacyUrl { field: String, value: String },
    /// An attachment reference could not be decoded and the record was
    /// emitted unchanged.
    DecodeFailed { field: String, message: String },
    /// A BibTeX entry could not be parsed and was dropped.
    Parse { line: u32, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Citation key of the record, empty for file-level problems
    pub record_id: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn warning(record_id: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            severity: Severity::Warning,
            record_id: record_id.into(),
            kind,
        }
    }

    pub fn error(record_id: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            severity: Severity::Error,
            record_id: record_id.into(),
            kind,
        }
    }

    /// Log through `tracing` at the matching level.
    pub(crate) fn emit(&self) {
        match self.severity {
            Severity::Warning => tracing::warn!(id = %self.record_id, "{}", self.kind),
            Severity::Error => tracing::error!(id = %self.record_id, "{}", self.kind),
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MissingAttachment { path } => {
                write!(f, "bdsk_file is not a file: {}", path.display())
            }
            DiagnosticKind::UnknownMimeType { path } => {
                write!(f, "failed to guess MIME type for path: {}", path.display())
            }
            DiagnosticKind::LegacyUrl { field, value } => {
                write!(f, "{} will not be migrated: {}", field, value)
            }
            DiagnosticKind::DecodeFailed { field, message } => {
                write!(f, "record left unchanged, cannot decode {}: {}", field, message)
            }
            DiagnosticKind::Parse { line, message } => {
                write!(f, "entry dropped at line {}: {}", line, message)
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        if self.record_id.is_empty() {
            write!(f, "{}: {}", level, self.kind)
        } else {
            write!(f, "{}: record ID={}: {}", level, self.record_id, self.kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_record() {
        let diag = Diagnostic::warning(
            "X",
            DiagnosticKind::LegacyUrl {
                field: "bdsk-url-1".to_string(),
                value: "http://x".to_string(),
            },
        );
        assert_eq!(
            diag.to_string(),
            "warning: record ID=X: bdsk-url-1 will not be migrated: http://x"
        );
    }

    #[test]
    fn serializes_flat() {
        let diag = Diagnostic::error(
            "Y",
            DiagnosticKind::UnknownMimeType {
                path: PathBuf::from("/p/a.xyz"),
            },
        );
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "severity": "error",
                "record_id": "Y",
                "kind": "unknown_mime_type",
                "path": "/p/a.xyz",
            })
        );
    }
}
