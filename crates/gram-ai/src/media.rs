//! Inline binary attachments (photos, voice notes) sent alongside prompts.

use base64::{engine::general_purpose, Engine as _};

use crate::error::AdapterError;
use crate::Result;

/// Binary payload tagged with its declared MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct Media {
    /// Declared MIME type (e.g. "image/jpeg", "audio/webm")
    pub mime_type: String,
    /// Raw bytes
    pub bytes: Vec<u8>,
}

impl Media {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Decode standard base64 data with an explicitly declared MIME type.
    pub fn from_base64(data: &str, mime_type: &str) -> Result<Self> {
        let mime_type = mime_type.trim();
        if mime_type.is_empty() {
            return Err(AdapterError::InvalidMedia("missing MIME type".to_string()));
        }
        let bytes = general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| AdapterError::InvalidMedia(format!("bad base64 payload: {e}")))?;
        if bytes.is_empty() {
            return Err(AdapterError::InvalidMedia("empty payload".to_string()));
        }
        Ok(Self::new(mime_type, bytes))
    }

    /// Decode a `data:<mime>;base64,<payload>` URL, as produced by canvas captures.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| AdapterError::InvalidMedia("not a data URL".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| AdapterError::InvalidMedia("data URL has no payload".to_string()))?;
        let mime_type = header.strip_suffix(";base64").ok_or_else(|| {
            AdapterError::InvalidMedia("only base64 data URLs are supported".to_string())
        })?;
        Self::from_base64(payload, mime_type)
    }

    /// Accept either a data URL or bare base64 with a fallback MIME type.
    pub fn decode(data: &str, mime_type: Option<&str>) -> Result<Self> {
        if data.trim_start().starts_with("data:") {
            return Self::from_data_url(data);
        }
        let mime_type = mime_type
            .ok_or_else(|| AdapterError::InvalidMedia("missing MIME type".to_string()))?;
        Self::from_base64(data, mime_type)
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension conventionally used for this MIME type.
    pub fn extension(&self) -> &'static str {
        extension_for(&self.mime_type)
    }
}

impl std::fmt::Debug for Media {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Media")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Map a MIME type to a file extension ("bin" when unknown).
pub fn extension_for(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        "audio/webm" => "webm",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        "audio/mpeg" => "mp3",
        _ => "bin",
    }
}
