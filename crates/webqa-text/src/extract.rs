//! Local-file content source.
//!
//! Accepts `file://` URLs and plain paths. The document is prefixed with a
//! `# <title>` line taken from the file stem, the way a page title would lead
//! scraped content. Other URL schemes are rejected as acquisition errors.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};
use walkdir::WalkDir;
use webqa_core::config::expand_path;
use webqa_core::traits::ContentExtractor;
use webqa_core::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct FileExtractor;

impl FileExtractor {
    pub fn new() -> Self { Self }

    fn path_for(url: &str) -> Result<PathBuf> {
        if let Some(rest) = url.strip_prefix("file://") {
            return Ok(expand_path(rest));
        }
        if let Some((scheme, _)) = url.split_once("://") {
            return Err(Error::acquisition(url, format!("unsupported scheme '{scheme}'")));
        }
        Ok(expand_path(url))
    }
}

impl ContentExtractor for FileExtractor {
    fn extract(&self, url: &str) -> Result<String> {
        info!("Extracting content from {}", url);
        let path = Self::path_for(url)?;
        let bytes = fs::read(&path).map_err(|e| {
            error!("Error reading {}: {}", path.display(), e);
            Error::acquisition(url, e)
        })?;
        let text = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        match path.file_stem().and_then(|s| s.to_str()) {
            Some(title) if !title.is_empty() => Ok(format!("# {title}\n\n{text}")),
            _ => Ok(text),
        }
    }
}

/// Text-like files under `root`, sorted, as paths usable with [`FileExtractor`].
pub fn discover_files(root: &Path, extensions: &[&str]) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|x| x.to_str())
                .is_some_and(|x| extensions.iter().any(|want| want.eq_ignore_ascii_case(x)))
        })
        .map(|e| e.path().display().to_string())
        .collect();
    files.sort();
    files
}
