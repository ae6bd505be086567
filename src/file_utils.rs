use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;

// @module: File and path utilities

/// Extension appended to outputs whose base name has no dot left
const HTML_ERB_EXTENSION: &str = ".html.erb";
/// Extension appended when the base name still carries an inner extension
const ERB_EXTENSION: &str = ".erb";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    /// Derive the ERB sibling path for a template file.
    ///
    /// `.<source_format>` is stripped from the file name (unless nothing would
    /// remain). A base name that still contains a dot keeps its inner extension
    /// and gets `.erb`; otherwise `.html.erb` is appended:
    /// `index.html.haml` -> `index.html.erb`, `header.haml` -> `header.html.erb`.
    ///
    /// Returns `None` for paths without a UTF-8 file name.
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, source_format: &str) -> Option<PathBuf> {
        let input_file = input_file.as_ref();
        let file_name = input_file.file_name()?.to_str()?;

        let suffix = format!(".{}", source_format);
        let base_name = match file_name.strip_suffix(suffix.as_str()) {
            Some(stem) if !stem.is_empty() => stem,
            _ => file_name,
        };

        let extension = if base_name.contains('.') {
            ERB_EXTENSION
        } else {
            HTML_ERB_EXTENSION
        };

        Some(input_file.with_file_name(format!("{}{}", base_name, extension)))
    }

    /// Write `content` to `path` so that `path` is either absent or complete.
    ///
    /// The data goes to a temporary file in the same directory, is synced to
    /// disk, and is then renamed onto `path`; the directory is synced so the
    /// rename itself survives a crash. With `overwrite == false` the rename
    /// fails with `AlreadyExists` instead of replacing an existing file.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str, overwrite: bool) -> io::Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = Builder::new().prefix(".erbify-").suffix(".tmp").tempfile_in(dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;

        if overwrite {
            temp.persist(path).map_err(|e| e.error)?;
        } else {
            temp.persist_noclobber(path).map_err(|e| e.error)?;
        }

        // Directories can't be opened for syncing on every platform
        if let Ok(dir) = File::open(dir) {
            let _ = dir.sync_all();
        }

        Ok(())
    }
}
