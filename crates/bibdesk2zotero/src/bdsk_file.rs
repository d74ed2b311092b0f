//! BibDesk file reference encoding/decoding
//!
//! BibDesk stores file references in `Bdsk-File-*` fields as base64-encoded
//! binary plists. The plist is a dictionary whose `relativePath` entry is the
//! attachment path relative to the library's attachment directory (the alias
//! data stored next to it is ignored).

use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use plist::{Dictionary, Value};
use unicode_normalization::UnicodeNormalization;

use crate::error::DecodeError;

/// Decode a Bdsk-File-* field value to extract the relative path
///
/// ASCII whitespace inside the value is ignored, since some writers wrap long
/// base64 lines.
///
/// # Example
/// ```
/// use bibdesk2zotero::bdsk_file::decode_relative_path;
///
/// assert!(decode_relative_path("not valid base64!!!").is_err());
/// ```
pub fn decode_relative_path(value: &str) -> Result<String, DecodeError> {
    let compact: String = value.split_ascii_whitespace().collect();
    let data = STANDARD.decode(compact)?;

    let plist: Value = plist::from_reader(Cursor::new(data))?;

    match plist {
        Value::Dictionary(dict) => match dict.get("relativePath") {
            Some(Value::String(path)) => Ok(path.clone()),
            _ => Err(DecodeError::MissingRelativePath),
        },
        _ => Err(DecodeError::NotADictionary),
    }
}

/// Resolve a Bdsk-File-* field value into an absolute path under `base_dir`.
///
/// The relative path is NFC-normalized (HFS+ stores names decomposed) and the
/// joined path is normalized lexically; nothing is looked up on disk.
pub fn decode_attachment_reference(base_dir: &Path, value: &str) -> Result<PathBuf, DecodeError> {
    if !base_dir.is_absolute() {
        return Err(DecodeError::RelativeBaseDir(base_dir.to_path_buf()));
    }

    let relative: String = decode_relative_path(value)?.nfc().collect();
    Ok(normalize_path(&base_dir.join(relative)))
}

/// Encode a relative path as a Bdsk-File-* field value
pub fn encode_relative_path(relative_path: &str) -> Option<String> {
    let mut dict = Dictionary::new();
    dict.insert(
        "relativePath".to_string(),
        Value::String(relative_path.to_string()),
    );

    let mut buffer = Vec::new();
    plist::to_writer_binary(&mut buffer, &Value::Dictionary(dict)).ok()?;

    Some(STANDARD.encode(&buffer))
}

/// Collapse `.`, `..` and repeated separators without touching the filesystem.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            // `..` at the root stays at the root
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(name) => normalized.push(name),
        }
    }
    normalized
}
