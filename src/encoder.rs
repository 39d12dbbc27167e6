//! Turns a user-selected file into a transport-safe payload.

use crate::error::{Result, StatementError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use std::path::Path;
use tokio::fs;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// 20 MiB.
pub const MAX_DOCUMENT_BYTES: u64 = 20 * 1024 * 1024;

/// A file as handed over by the user, before any checks.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// Base64 payload of an accepted document. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    filename: String,
    media_type: String,
    size: u64,
    data: String,
}

impl EncodedDocument {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Size of the original file in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Standard base64, no data-URL prefix.
    pub fn data(&self) -> &str {
        &self.data
    }
}

pub struct DocumentEncoder;

impl DocumentEncoder {
    pub fn check(media_type: &str, size: u64) -> Result<()> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if essence != PDF_MEDIA_TYPE {
            return Err(StatementError::InvalidFileType(media_type.to_string()));
        }
        if size == 0 {
            return Err(StatementError::EmptyFile);
        }
        if size > MAX_DOCUMENT_BYTES {
            return Err(StatementError::FileTooLarge {
                size,
                limit: MAX_DOCUMENT_BYTES,
            });
        }
        Ok(())
    }

    pub fn encode(file: &FileCandidate) -> Result<EncodedDocument> {
        let size = file.bytes.len() as u64;
        Self::check(&file.media_type, size)?;

        let data = STANDARD.encode(&file.bytes);
        debug!("Encoded '{}' ({} bytes)", file.name, size);

        Ok(EncodedDocument {
            filename: file.name.clone(),
            media_type: PDF_MEDIA_TYPE.to_string(),
            size,
            data,
        })
    }

    /// Reads and encodes a file from disk; the media type is guessed from the extension.
    pub async fn read_path(path: &Path) -> Result<EncodedDocument> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StatementError::MissingInput("Invalid file name".to_string()))?
            .to_string();
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        // Reject before reading anything large into memory.
        let size = fs::metadata(path).await?.len();
        Self::check(&media_type, size)?;

        let bytes = fs::read(path).await?;
        Self::encode(&FileCandidate::new(name, media_type, bytes))
    }
}
