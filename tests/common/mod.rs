/*!
 * Common test utilities for the lingosub test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use lingosub::app_config::{Config, JobConfig};
use lingosub::document::FileMode;

/// Route library logs to the test output; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Canonical SRT with `count` blocks, two seconds apart, numbered from 1
pub fn sample_srt(count: usize) -> String {
    let mut out = String::new();
    for i in 0..count {
        let start = i * 2;
        out.push_str(&format!(
            "{}\n00:00:{:02},000 --> 00:00:{:02},500\nLine {}\n\n",
            i + 1,
            start,
            start + 1,
            i + 1
        ));
    }
    out
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
"#;
    create_test_file(dir, filename, content)
}

/// Job settings for engine tests
pub fn job_config(batch_size: usize, file_mode: FileMode, target_lang: &str) -> JobConfig {
    JobConfig {
        source_lang: "English".to_string(),
        target_lang: target_lang.to_string(),
        model: "mock-model".to_string(),
        persona_instruction: "You are a professional translator.".to_string(),
        batch_size,
        file_mode,
    }
}

/// Application config for controller tests
pub fn test_config(batch_size: usize, file_mode: FileMode) -> Config {
    let mut config = Config::default();
    config.target_language = "French".to_string();
    config.file_mode = file_mode;
    config.translation.batch_size = batch_size;
    config
}

/// Read a file as UTF-8
pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}
