//! Whole-file migration: parse, transform every entry, format.

use std::fs;
use std::path::{Path, PathBuf};

use bibdesk_bibtex::{format_complete, parse, BibTeXEntry};
use serde::Serialize;
use tracing::{error, info};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::{MigrateError, Result, TransformError};
use crate::record::Record;
use crate::transform::Transformer;

/// What to do when a record cannot be migrated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop at the first undecodable attachment or BibTeX syntax error.
    #[default]
    Abort,
    /// Emit an undecodable record exactly as it was read, drop unparsable
    /// entries, and record an error diagnostic for each.
    SkipRecord,
}

#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Directory BibDesk attachment paths are relative to (absolute)
    pub base_dir: PathBuf,
    /// Remove `file`/`File` fields already present in the source
    pub strip_existing_file: bool,
    pub on_error: ErrorPolicy,
}

impl MigrateOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            strip_existing_file: false,
            on_error: ErrorPolicy::default(),
        }
    }
}

/// Summary of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Entries written to the output
    pub entries: usize,
    pub modified_entries: usize,
    /// Entries written unchanged or dropped because of errors
    pub skipped_entries: usize,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct Migration {
    /// Migrated BibTeX text
    pub output: String,
    pub report: MigrationReport,
}

/// Migrate BibTeX source text.
pub fn migrate_str(input: &str, options: &MigrateOptions) -> Result<Migration> {
    if !options.base_dir.is_absolute() {
        return Err(MigrateError::RelativeBaseDir(options.base_dir.clone()));
    }

    let parsed = parse(input.to_string()).map_err(|e| MigrateError::Parse {
        line: 1,
        message: e.to_string(),
    })?;

    let mut report = MigrationReport::default();

    for parse_error in parsed.errors {
        match options.on_error {
            ErrorPolicy::Abort => {
                return Err(MigrateError::Parse {
                    line: parse_error.line,
                    message: parse_error.message,
                });
            }
            ErrorPolicy::SkipRecord => {
                let diagnostic = Diagnostic::error(
                    "",
                    DiagnosticKind::Parse {
                        line: parse_error.line,
                        message: parse_error.message,
                    },
                );
                diagnostic.emit();
                report.diagnostics.push(diagnostic);
                report.skipped_entries += 1;
            }
        }
    }

    let mut entries: Vec<BibTeXEntry> = Vec::with_capacity(parsed.entries.len());
    for entry in parsed.entries {
        let original = Record::from(entry);
        let mut record = original.clone();
        let mut transformer = Transformer::new(options.base_dir.clone(), options.strip_existing_file)
            .map_err(|_| MigrateError::RelativeBaseDir(options.base_dir.clone()))?;

        match transformer.transform(&mut record) {
            Ok(()) => {
                if transformer.is_modified() {
                    report.modified_entries += 1;
                }
                report.diagnostics.extend(transformer.take_diagnostics());
                entries.push(record.into());
            }
            Err(source) => match options.on_error {
                ErrorPolicy::Abort => {
                    return Err(MigrateError::Transform {
                        id: original.id,
                        source,
                    });
                }
                ErrorPolicy::SkipRecord => {
                    let diagnostic = Diagnostic::error(&original.id, decode_failure(source));
                    diagnostic.emit();
                    report.diagnostics.push(diagnostic);
                    report.skipped_entries += 1;
                    entries.push(original.into());
                }
            },
        }
    }
    report.entries = entries.len();

    let mut strings: Vec<(String, String)> = parsed.strings.into_iter().collect();
    strings.sort();
    let output = format_complete(&strings, &parsed.preambles, &entries);

    info!(
        entries = report.entries,
        modified = report.modified_entries,
        skipped = report.skipped_entries,
        "Migration finished"
    );
    Ok(Migration { output, report })
}

fn decode_failure(err: TransformError) -> DiagnosticKind {
    match err {
        TransformError::Decode { field, source } => DiagnosticKind::DecodeFailed {
            field,
            message: source.to_string(),
        },
        other => DiagnosticKind::DecodeFailed {
            field: String::new(),
            message: other.to_string(),
        },
    }
}

/// Migrate `source` into `destination`.
///
/// Nothing is written when the migration fails.
pub fn migrate_file(
    source: &Path,
    destination: &Path,
    options: &MigrateOptions,
) -> Result<MigrationReport> {
    if is_same_file(source, destination) {
        return Err(MigrateError::SameFile(destination.to_path_buf()));
    }

    let input = fs::read_to_string(source).map_err(|e| MigrateError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;

    let migration = migrate_str(&input, options).inspect_err(|e| {
        error!(source = %source.display(), "Migration failed: {}", e);
    })?;

    fs::write(destination, migration.output).map_err(|e| MigrateError::Io {
        path: destination.to_path_buf(),
        source: e,
    })?;
    info!(destination = %destination.display(), "Wrote migrated library");

    Ok(migration.report)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_base_dir() {
        let options = MigrateOptions::new("papers");
        assert!(matches!(
            migrate_str("", &options),
            Err(MigrateError::RelativeBaseDir(_))
        ));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let migration = migrate_str("", &MigrateOptions::new("/papers")).unwrap();
        assert_eq!(migration.output, "");
        assert_eq!(migration.report, MigrationReport::default());
    }

    #[test]
    fn decode_failure_keeps_field_name() {
        let err = TransformError::Decode {
            field: "Bdsk-File-3".to_string(),
            source: crate::error::DecodeError::MissingRelativePath,
        };
        assert_eq!(
            decode_failure(err),
            DiagnosticKind::DecodeFailed {
                field: "Bdsk-File-3".to_string(),
                message: "property list has no string `relativePath` entry".to_string(),
            }
        );
    }
}
