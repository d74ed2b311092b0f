//! Zotero `file` field construction.
//!
//! Zotero's BibTeX importer reads attachments from a single `file` field of
//! the form `title1:path1:mime1;title2:path2:mime2`. Colons and semicolons
//! inside titles or paths are not escaped; Zotero does not support escaping.

use std::path::PathBuf;

use crate::mime::guess_mime_type;

/// One attachment entry of a Zotero `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoteroAttachment {
    /// File name without its last extension
    pub title: String,
    pub path: PathBuf,
    pub mime_type: Option<&'static str>,
}

impl ZoteroAttachment {
    pub fn from_path(path: PathBuf) -> Self {
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = guess_mime_type(&path);
        Self {
            title,
            path,
            mime_type,
        }
    }
}

/// Join attachments into a Zotero `file` field value, preserving order.
///
/// An unknown MIME type is written as an empty string.
pub fn format_file_field(attachments: &[ZoteroAttachment]) -> String {
    attachments
        .iter()
        .map(|a| {
            format!(
                "{}:{}:{}",
                a.title,
                a.path.display(),
                a.mime_type.unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_drops_last_extension_only() {
        let a = ZoteroAttachment::from_path(PathBuf::from("/p/Smith 2024.v2.pdf"));
        assert_eq!(a.title, "Smith 2024.v2");
        assert_eq!(a.mime_type, Some("application/pdf"));
    }

    #[test]
    fn formats_multiple_entries() {
        let field = format_file_field(&[
            ZoteroAttachment::from_path(PathBuf::from("/p/a.pdf")),
            ZoteroAttachment::from_path(PathBuf::from("/p/b.png")),
        ]);
        assert_eq!(field, "a:/p/a.pdf:application/pdf;b:/p/b.png:image/png");
    }

    #[test]
    fn unknown_mime_is_empty() {
        let field = format_file_field(&[ZoteroAttachment::from_path(PathBuf::from("/p/notes"))]);
        assert_eq!(field, "notes:/p/notes:");
    }
}
