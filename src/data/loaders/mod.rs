//! Document loaders
//!
//! Plain text and markdown are always supported; PDF extraction is behind the
//! `pdf` feature. Richer formats (scanned forms, tables) go through the
//! parsing service instead, see `crate::parse`.

use crate::data::{document_id_for, Document};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Loads documents from files of one format.
pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document>;

    fn can_load(&self, path: &Path) -> bool;
}

fn load_plain(path: &Path, file_type: &str) -> Result<Document> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {:?}", file_type, path))?;

    Ok(Document::new(
        document_id_for(path),
        path.to_string_lossy(),
        content,
        file_type,
    ))
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext))
        .unwrap_or(false)
}

/// Plain text loader.
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> Result<Document> {
        load_plain(path, "txt")
    }

    fn can_load(&self, path: &Path) -> bool {
        has_extension(path, &["txt"])
    }
}

/// Markdown loader.
pub struct MarkdownLoader;

impl DocumentLoader for MarkdownLoader {
    fn load(&self, path: &Path) -> Result<Document> {
        load_plain(path, "md")
    }

    fn can_load(&self, path: &Path) -> bool {
        has_extension(path, &["md", "markdown"])
    }
}

/// PDF loader via pdf-extract.
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, _path: &Path) -> Result<Document> {
        #[cfg(feature = "pdf")]
        {
            let content = pdf_extract::extract_text(_path)
                .with_context(|| format!("Failed to extract text from PDF: {:?}", _path))?;

            Ok(Document::new(
                document_id_for(_path),
                _path.to_string_lossy(),
                content,
                "pdf",
            ))
        }

        #[cfg(not(feature = "pdf"))]
        {
            anyhow::bail!("PDF support not enabled. Compile with --features pdf")
        }
    }

    fn can_load(&self, path: &Path) -> bool {
        has_extension(path, &["pdf"])
    }
}

/// Format-dispatching loader over a directory tree.
pub struct MultiFormatLoader {
    loaders: Vec<Box<dyn DocumentLoader>>,
}

impl MultiFormatLoader {
    pub fn new() -> Self {
        Self {
            loaders: vec![
                Box::new(TextLoader),
                Box::new(MarkdownLoader),
                Box::new(PdfLoader),
            ],
        }
    }

    /// Load one file with whichever loader claims its extension.
    pub fn load(&self, path: &Path) -> Result<Document> {
        for loader in &self.loaders {
            if loader.can_load(path) {
                return loader.load(path);
            }
        }
        anyhow::bail!("No loader found for file: {:?}", path)
    }

    /// Load every supported file under a directory, recursively. Unsupported
    /// or unreadable files are skipped with a warning.
    pub fn load_directory(&self, dir: &Path) -> Result<Vec<Document>> {
        let mut documents = Vec::new();

        for entry in
            fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?
        {
            let path = entry?.path();
            if path.is_dir() {
                documents.extend(self.load_directory(&path)?);
            } else if !self.loaders.iter().any(|loader| loader.can_load(&path)) {
                tracing::warn!("Skipping unsupported file: {:?}", path);
            } else {
                match self.load(&path) {
                    Ok(doc) => documents.push(doc),
                    Err(err) => tracing::warn!("Failed to load file {:?}: {:#}", path, err),
                }
            }
        }

        // Directory iteration order is platform-dependent; keep passes deterministic.
        documents.sort_by(|a, b| a.source.cmp(&b.source));
        Ok(documents)
    }
}

impl Default for MultiFormatLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_text_loader() {
        let mut file = NamedTempFile::with_suffix(".txt").unwrap();
        writeln!(file, "Hello, world!").unwrap();

        let doc = TextLoader.load(file.path()).unwrap();
        assert!(doc.content.contains("Hello, world!"));
        assert_eq!(doc.file_type, "txt");
    }

    #[test]
    fn test_markdown_loader_extensions() {
        assert!(MarkdownLoader.can_load(Path::new("notes.md")));
        assert!(MarkdownLoader.can_load(Path::new("notes.markdown")));
        assert!(!MarkdownLoader.can_load(Path::new("notes.txt")));
    }

    #[test]
    fn test_directory_load_is_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "second").unwrap();
        fs::write(dir.path().join("a.txt"), "first").unwrap();
        fs::write(dir.path().join("ignored.bin"), [0u8, 1u8]).unwrap();

        let docs = MultiFormatLoader::new().load_directory(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].source.ends_with("a.txt"));
        assert!(docs[1].source.ends_with("b.txt"));
    }

    #[test]
    fn test_unreadable_file_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.txt"), "readable").unwrap();
        // Supported extension, invalid UTF-8 content
        fs::write(dir.path().join("bad.txt"), [0xffu8, 0xfe, 0xfd]).unwrap();

        let docs = MultiFormatLoader::new().load_directory(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].source.ends_with("good.txt"));
    }

    #[test]
    fn test_unknown_format_is_an_error() {
        let file = NamedTempFile::with_suffix(".bin").unwrap();
        assert!(MultiFormatLoader::new().load(file.path()).is_err());
    }
}
