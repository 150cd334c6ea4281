//! Document loading — enumerates resume files and extracts their raw text.
//!
//! Supported formats are a closed set: `.pdf`, `.docx`, `.txt`. Anything
//! else is skipped at enumeration time and rejected at load time.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::errors::PipelineError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported file format: {0}")]
    Unsupported(String),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF extraction failed for {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("DOCX extraction failed for {path}: {message}")]
    Docx { path: PathBuf, message: String },

    #[error("Document {0} contained no extractable text")]
    Empty(PathBuf),
}

/// One of the supported resume file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Infers the format from a path's extension; `None` for anything
    /// outside the supported set.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("pdf") => Some(Self::Pdf),
            Some("docx") => Some(Self::Docx),
            Some("txt") => Some(Self::Txt),
            _ => None,
        }
    }

    /// Dotted lowercase extension, used as the `file_type` metadata key.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
            Self::Txt => ".txt",
        }
    }
}

/// A reference to one resume source file. Immutable once enumerated.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub path: PathBuf,
    pub format: DocumentFormat,
}

impl DocumentRef {
    pub fn new(path: PathBuf) -> Option<Self> {
        let format = DocumentFormat::from_path(&path)?;
        Some(Self { path, format })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string()
    }
}

/// Text-extraction collaborator. The pipeline only ever sees raw text
/// through this seam, so tests can substitute an in-memory source.
pub trait DocumentSource: Send + Sync {
    fn load(&self, doc: &DocumentRef) -> Result<String, LoadError>;
}

/// Filesystem-backed loader for the supported formats.
pub struct FsDocumentLoader;

impl DocumentSource for FsDocumentLoader {
    fn load(&self, doc: &DocumentRef) -> Result<String, LoadError> {
        if !doc.path.exists() {
            return Err(LoadError::NotFound(doc.path.clone()));
        }

        let text = match doc.format {
            DocumentFormat::Pdf => load_pdf(&doc.path)?,
            DocumentFormat::Docx => load_docx(&doc.path)?,
            DocumentFormat::Txt => fs::read_to_string(&doc.path).map_err(|e| LoadError::Io {
                path: doc.path.clone(),
                source: e,
            })?,
        };

        if text.trim().is_empty() {
            return Err(LoadError::Empty(doc.path.clone()));
        }

        debug!("Loaded {} ({} chars)", doc.file_name(), text.len());
        Ok(text)
    }
}

fn load_pdf(path: &Path) -> Result<String, LoadError> {
    pdf_extract::extract_text(path).map_err(|e| LoadError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// A .docx file is a ZIP of XML; docx-rs exposes a typed tree over it.
/// We collect the text runs of every paragraph, one line per paragraph.
fn load_docx(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let docx = docx_rs::read_docx(&bytes).map_err(|e| LoadError::Docx {
        path: path.to_path_buf(),
        message: format!("{e:?}"),
    })?;

    let mut paragraphs: Vec<String> = Vec::new();
    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(para) = child {
            let mut parts: Vec<String> = Vec::new();
            for pc in &para.children {
                if let docx_rs::ParagraphChild::Run(run) = pc {
                    for rc in &run.children {
                        if let docx_rs::RunChild::Text(t) = rc {
                            parts.push(t.text.clone());
                        }
                    }
                }
            }
            let line = parts.join("");
            if !line.trim().is_empty() {
                paragraphs.push(line);
            }
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Enumerates every supported document in `dir`, sorted by file name so
/// chunk membership is stable across runs. Unsupported files are skipped.
/// Fails hard only if the directory itself cannot be read.
pub fn enumerate_documents(dir: &Path) -> Result<Vec<DocumentRef>, PipelineError> {
    let mut docs: Vec<DocumentRef> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match DocumentRef::new(path.clone()) {
            Some(doc) => docs.push(doc),
            None => debug!("Skipping unsupported file {}", path.display()),
        }
    }
    docs.sort_by_key(|d| d.file_name());
    Ok(docs)
}
