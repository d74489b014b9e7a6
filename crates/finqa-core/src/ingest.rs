//! Plain-text directory ingestion.
//!
//! Format conversion (PDF/office/OCR) happens upstream; by the time files
//! land here they are `.txt`, with tables pre-serialized to pipe-delimited
//! lines. The loader only maps files to [`Document`]s: id and title from the
//! file stem, doc_type from the parent directory.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::Document;

#[derive(Debug, Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load_directory(&self, data_dir: &Path) -> Result<Vec<Document>> {
        self.load_files(self.list_txt_files(data_dir), data_dir)
    }

    /// Same as [`load_directory`](Self::load_directory) but stops after
    /// `limit` files (directory order is sorted, so the cut is stable).
    pub fn load_directory_limited(&self, data_dir: &Path, limit: usize) -> Result<Vec<Document>> {
        let mut files = self.list_txt_files(data_dir);
        if files.len() > limit {
            files.truncate(limit);
            tracing::info!(limit, "limited ingestion to first {limit} files");
        }
        self.load_files(files, data_dir)
    }

    fn load_files(&self, files: Vec<PathBuf>, data_dir: &Path) -> Result<Vec<Document>> {
        if files.is_empty() {
            tracing::warn!(dir = %data_dir.display(), "no .txt files found");
            return Ok(vec![]);
        }
        let mut documents = Vec::with_capacity(files.len());
        for (i, path) in files.iter().enumerate() {
            tracing::info!("loading file {}/{}: {}", i + 1, files.len(), path.display());
            let raw_text = self.read_file_content(path)?;
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| format!("doc-{i}"));
            documents.push(Document {
                id: stem.clone(),
                title: stem,
                doc_type: self.doc_type_from_path(path, data_dir),
                raw_text,
            });
        }
        tracing::info!("loaded {} documents", documents.len());
        Ok(documents)
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            // Not valid UTF-8; salvage what we can rather than dropping the file.
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
        }
    }

    fn doc_type_from_path(&self, file_path: &Path, data_dir: &Path) -> String {
        let relative = file_path.strip_prefix(data_dir).unwrap_or(file_path);
        relative
            .parent()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "misc".to_string())
    }

    fn list_txt_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
            .collect();
        txt_files.sort();
        txt_files
    }
}
