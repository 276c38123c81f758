//! File selection: decides which paths become uploads.
//!
//! The controller accepts any file handle; the format and size limits live here.

use desglose_core::FileRef;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct Selection {
    pub accepted: Vec<FileRef>,
    pub rejected: Vec<Rejected>,
}

pub struct FilePicker {
    extensions: Vec<String>,
    max_bytes: u64,
}

impl FilePicker {
    pub fn new(extensions: &[String], max_bytes: u64) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.trim_start_matches('.').to_lowercase()).collect(),
            max_bytes,
        }
    }

    pub fn select(&self, paths: &[PathBuf]) -> Selection {
        let mut selection = Selection::default();
        for path in paths {
            match self.check(path) {
                Ok(file) => selection.accepted.push(file),
                Err(reason) => selection.rejected.push(Rejected {
                    path: path.clone(),
                    reason,
                }),
            }
        }
        selection
    }

    fn check(&self, path: &Path) -> Result<FileRef, String> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !self.extensions.iter().any(|allowed| *allowed == ext) {
            return Err(format!(
                "unsupported format (allowed: {})",
                self.extensions.join(", ")
            ));
        }

        let meta = fs::metadata(path).map_err(|e| format!("cannot read file: {e}"))?;
        if !meta.is_file() {
            return Err("not a regular file".to_string());
        }
        if meta.len() > self.max_bytes {
            return Err(format!(
                "{:.2} MB exceeds the {:.0} MB limit",
                meta.len() as f64 / 1024.0 / 1024.0,
                self.max_bytes as f64 / 1024.0 / 1024.0
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(FileRef::new(name, meta.len()).with_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker(max_bytes: u64) -> FilePicker {
        FilePicker::new(&["pdf".to_string(), ".TXT".to_string()], max_bytes)
    }

    #[test]
    fn test_select_filters_by_extension_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let ok_pdf = dir.path().join("enero.PDF");
        let ok_txt = dir.path().join("febrero.txt");
        let big = dir.path().join("marzo.pdf");
        let doc = dir.path().join("notas.docx");
        fs::write(&ok_pdf, b"%PDF-1.4").unwrap();
        fs::write(&ok_txt, b"15-Ene-24").unwrap();
        fs::write(&big, vec![0u8; 64]).unwrap();
        fs::write(&doc, b"x").unwrap();

        let sel = picker(32).select(&[ok_pdf, ok_txt.clone(), big.clone(), doc.clone()]);

        let names: Vec<&str> = sel.accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["enero.PDF", "febrero.txt"]);
        assert_eq!(sel.accepted[1].path.as_deref(), Some(ok_txt.as_path()));
        assert_eq!(sel.accepted[1].size, 9);

        assert_eq!(sel.rejected.len(), 2);
        assert_eq!(sel.rejected[0].path, big);
        assert!(sel.rejected[0].reason.contains("limit"));
        assert_eq!(sel.rejected[1].path, doc);
        assert!(sel.rejected[1].reason.contains("unsupported"));
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sel = picker(1024).select(&[dir.path().join("nope.pdf")]);
        assert!(sel.accepted.is_empty());
        assert!(sel.rejected[0].reason.starts_with("cannot read file"));
    }
}
