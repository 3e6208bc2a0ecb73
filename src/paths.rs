//! Path decomposition for the source book and its converted sibling.
//!
//! These are deliberately *string* functions, not [`std::path::Path`]
//! manipulation: the hook receives the book path as an opaque string from
//! Readarr and must reproduce exact, predictable names (the converted file
//! lands next to the source, and the attachment filename must match what the
//! poll loop looks for). `Path::file_stem` treats `foo.tar.gz` differently
//! than the split-on-dots rule below, so it is not a drop-in here.
//!
//! The only I/O in this module is [`list_filenames`], a single-level
//! directory listing used by the idempotence guard and the poll loop.

use std::io;
use std::path::Path;

/// Directory portion of `path` with a trailing `/` guaranteed.
///
/// The trailing separator is what lets [`filename`] strip the folder as a
/// plain prefix and get a bare name rather than one with a leading `/`.
pub fn folder(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// `path` with the [`folder`] prefix removed exactly once.
pub fn filename(path: &str) -> String {
    let prefix = folder(path);
    path.strip_prefix(prefix.as_str()).unwrap_or(path).to_string()
}

/// All dot-delimited segments except the final one, rejoined with `.`.
///
/// `War.and.Peace.epub` → `War.and.Peace`: interior dots stay, only the
/// last segment is treated as the extension. A name with no dot yields an
/// empty stem (see [`extension`]).
pub fn stem(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) => filename[..idx].to_string(),
        None => String::new(),
    }
}

/// The final dot-delimited segment of `filename`.
///
/// A name with no dot at all yields the whole name: `extension("README")`
/// is `"README"`. Callers tolerate this rather than special-casing it —
/// the ignored-extension check still sees a sensible token, and the
/// converted name degrades to `".<format>"`.
pub fn extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) => &filename[idx + 1..],
        None => filename,
    }
}

/// The name the converter's output will carry: `<stem>.<format>`.
pub fn converted_filename(filename: &str, format: &str) -> String {
    format!("{}.{}", stem(filename), format)
}

/// Bare filenames of every entry directly inside `dir`, one level deep.
///
/// Callers re-invoke this on every poll attempt; the listing must be taken
/// fresh each time because the converter writes asynchronously.
pub fn list_filenames(dir: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// The fully derived names for one source book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPaths {
    /// Directory containing the source, trailing `/` guaranteed.
    pub folder: String,
    /// Bare source filename.
    pub filename: String,
    /// Source extension as written (case preserved; compare lowercased).
    pub extension: String,
    /// Bare name of the converter's output.
    pub converted_filename: String,
    /// Full destination path handed to the converter.
    pub destination: String,
}

impl BookPaths {
    /// Decompose a source path for the given target format.
    pub fn resolve(source_path: &str, format: &str) -> Self {
        let folder = folder(source_path);
        let filename = filename(source_path);
        let extension = extension(&filename).to_string();
        let converted_filename = converted_filename(&filename, format);
        let destination = format!("{folder}{converted_filename}");
        Self {
            folder,
            filename,
            extension,
            converted_filename,
            destination,
        }
    }
}
