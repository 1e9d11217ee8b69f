use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

/// Snapshot of the learner's open file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    path: PathBuf,
    language_id: Option<String>,
    text: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let language_id = detect_language(&path);
        Self {
            path,
            language_id,
            text: text.into(),
        }
    }

    /// Read the file and tag it with the language detected from its extension.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CaptureError> {
        let path = path.into();
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| CaptureError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        // decoded the same way as interpreter output
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Self::new(path, text))
    }

    /// Explicit language tag; wins over extension detection.
    pub fn with_language(mut self, language_id: impl Into<String>) -> Self {
        self.language_id = Some(language_id.into().to_lowercase());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language_id(&self) -> Option<&str> {
        self.language_id.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Language tag for a path, from its extension.
pub fn detect_language(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let language = match ext.as_str() {
        "py" | "pyw" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" => "typescript",
        "rb" => "ruby",
        "rs" => "rust",
        "sh" | "bash" => "shellscript",
        _ => return None,
    };
    Some(language.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Path::new("a/b.py")).as_deref(), Some("python"));
        assert_eq!(detect_language(Path::new("B.PY")).as_deref(), Some("python"));
        assert_eq!(detect_language(Path::new("run.sh")).as_deref(), Some("shellscript"));
        assert_eq!(detect_language(Path::new("notes.txt")), None);
        assert_eq!(detect_language(Path::new("Makefile")), None);
    }

    #[test]
    fn test_with_language_overrides_detection() {
        let doc = Document::new("script.txt", "print(1)").with_language("Python");
        assert_eq!(doc.language_id(), Some("python"));
        assert_eq!(doc.text(), "print(1)");
    }

    #[tokio::test]
    async fn test_open_reads_text() {
        let mut file = tempfile::Builder::new().suffix(".py").tempfile().unwrap();
        writeln!(file, "def f(): return 1/0").unwrap();

        let doc = Document::open(file.path()).await.unwrap();
        assert_eq!(doc.text(), "def f(): return 1/0\n");
        assert_eq!(doc.language_id(), Some("python"));
    }

    #[tokio::test]
    async fn test_open_non_utf8_file_is_lossy() {
        let mut file = tempfile::Builder::new().suffix(".py").tempfile().unwrap();
        file.write_all(b"s = '\xff'\nprint(s)\n").unwrap();

        let doc = Document::open(file.path()).await.unwrap();
        assert_eq!(doc.text(), "s = '\u{FFFD}'\nprint(s)\n");
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let err = Document::open("/definitely/not/here.py").await.unwrap_err();
        assert!(matches!(err, CaptureError::ReadFailed { .. }));
        assert!(err.to_string().contains("/definitely/not/here.py"));
    }
}
