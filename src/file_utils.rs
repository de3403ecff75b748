use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Read a whole file as raw bytes
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file, creating the parent directory first
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }

    // @returns: Whether a file name already carries the translated-output marker
    pub fn has_marker(path: &Path, marker: &str) -> bool {
        if marker.is_empty() {
            return false;
        }
        path.file_name()
            .map(|name| name.to_string_lossy().to_lowercase().contains(&marker.to_lowercase()))
            .unwrap_or(false)
    }

    /// Find files with a specific extension under `dir`, skipping already translated ones.
    ///
    /// Entries are returned in directory-walk order (sorted by file name per directory).
    pub fn find_documents<P: AsRef<Path>>(dir: P, extension: &str, marker: &str) -> Result<Vec<PathBuf>> {
        let extension = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() || Self::has_marker(path, marker) {
                continue;
            }

            let matches = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
            if matches {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    // @generates: Sibling output path with the marker before the extension
    // e.g. movie.srt + "_zh" -> movie_zh.srt
    pub fn derive_output_path<P: AsRef<Path>>(input_file: P, marker: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        let mut file_name = format!("{}{}", stem, marker);
        if let Some(ext) = input_file.extension() {
            file_name.push('.');
            file_name.push_str(&ext.to_string_lossy());
        }

        input_file.with_file_name(file_name)
    }

    // @generates: Output path inside `output_dir`, keeping the path relative to `input_root`
    pub fn mirrored_output_path<P1: AsRef<Path>, P2: AsRef<Path>, P3: AsRef<Path>>(
        input_file: P1,
        input_root: P2,
        output_dir: P3,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let relative = input_file
            .strip_prefix(input_root.as_ref())
            .ok()
            .filter(|rel| !rel.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(input_file.file_name().unwrap_or_default()));

        output_dir.as_ref().join(relative)
    }
}
