//! Extension-based MIME type guessing for attachments.

use std::path::Path;

/// Suffixes that name a compression encoding rather than a content type.
const ENCODING_SUFFIXES: [&str; 5] = ["gz", "bz2", "xz", "Z", "br"];

/// Guess the MIME type of a file from its extension.
///
/// The extension is matched case-insensitively. A trailing compression suffix
/// is skipped, so `paper.ps.gz` guesses as PostScript and a bare `data.gz`
/// has no guess.
pub fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    if ENCODING_SUFFIXES.contains(&ext) {
        let inner = Path::new(path.file_stem()?).extension()?.to_str()?;
        return mime_from_extension(inner);
    }
    mime_from_extension(ext)
}

fn mime_from_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext.to_lowercase().as_str() {
        // Documents
        "pdf" => "application/pdf",
        "ps" | "eps" | "ai" => "application/postscript",
        "dvi" => "application/x-dvi",
        "djvu" | "djv" => "image/vnd.djvu",
        "epub" => "application/epub+zip",
        "rtf" => "application/rtf",
        // Office formats
        "doc" | "dot" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" | "pps" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "odt" => "application/vnd.oasis.opendocument.text",
        "odp" => "application/vnd.oasis.opendocument.presentation",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        // Text and markup
        "txt" | "text" => "text/plain",
        "html" | "htm" => "text/html",
        "xml" => "text/xml",
        "csv" => "text/csv",
        "md" | "markdown" => "text/markdown",
        "json" => "application/json",
        "tex" | "latex" => "application/x-tex",
        "bib" => "text/x-bibtex",
        // Images
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "heic" => "image/heic",
        // Archives
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        // Audio and video
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/x-wav",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        _ => return None,
    };
    Some(mime)
}
