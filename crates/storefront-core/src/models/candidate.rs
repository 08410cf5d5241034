use std::fmt;
use std::path::Path;

use bytes::Bytes;

/// File payload currently considered for upload.
///
/// Owned by exactly one upload controller for the duration of one ingestion attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub data: Bytes,
    pub name: String,
    pub content_type: String,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            data: data.into(),
            name: name.into(),
            content_type: content_type.into(),
        }
    }

    /// Read a file from disk, deriving the content type from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        Ok(Self {
            data: Bytes::from(data),
            name,
            content_type: content_type_for_path(path).to_string(),
        })
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Lowercase extension of the declared name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

// Payload bytes are never printed.
impl fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Guess a MIME type from a file extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// The two input surfaces a candidate file can come from.
///
/// Both carry the full list of files the surface delivered; only the first one is
/// ingested. A drop is fully consumed here and never reaches any default handler.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// File-picker change event.
    Picker(Vec<CandidateFile>),
    /// Drag-and-drop payload.
    Drop(Vec<CandidateFile>),
}

impl FileSource {
    pub fn kind(&self) -> &'static str {
        match self {
            FileSource::Picker(_) => "picker",
            FileSource::Drop(_) => "drop",
        }
    }

    /// First delivered file, or `None` for an empty payload.
    pub fn into_first(self) -> Option<CandidateFile> {
        match self {
            FileSource::Picker(files) | FileSource::Drop(files) => files.into_iter().next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn first_file_wins() {
        let source = FileSource::Drop(vec![
            CandidateFile::new("a.png", "image/png", vec![1u8]),
            CandidateFile::new("b.png", "image/png", vec![2u8]),
        ]);
        assert_eq!(source.kind(), "drop");
        assert_eq!(source.into_first().unwrap().name, "a.png");
        assert!(FileSource::Picker(Vec::new()).into_first().is_none());
    }

    #[test]
    fn content_type_guess() {
        assert_eq!(content_type_for_path(Path::new("photo.PNG")), "image/png");
        assert_eq!(content_type_for_path(Path::new("x.jpeg")), "image/jpeg");
        assert_eq!(
            content_type_for_path(Path::new("bad.exe")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for_path(Path::new("noext")),
            "application/octet-stream"
        );
    }

    #[test]
    fn debug_hides_payload() {
        let file = CandidateFile::new("secret.png", "image/png", vec![42u8; 3]);
        let printed = format!("{:?}", file);
        assert!(printed.contains("size: 3"));
        assert!(!printed.contains("42"));
        assert_eq!(file.extension().as_deref(), Some("png"));
    }

    #[tokio::test]
    async fn from_path_reads_bytes_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.webp");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"webp-bytes")
            .unwrap();

        let file = CandidateFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "banner.webp");
        assert_eq!(file.content_type, "image/webp");
        assert_eq!(&file.data[..], b"webp-bytes");
    }
}
