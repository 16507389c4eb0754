// src/capture/source.rs
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};

/// Base64 image payload as it crosses into the classification client.
/// `data` never carries a data-URL prefix; `mime_type` is declared to the
/// service alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub data: String,
    pub mime_type: String,
}

impl ImagePayload {
    /// Accepts bare base64 or a browser-style data URL
    /// (`data:image/jpeg;base64,...`) and normalizes to the bare form.
    pub fn from_base64(input: &str, fallback_mime: &str) -> Result<Self> {
        let (mime_type, data) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, body) = rest
                    .split_once(',')
                    .ok_or_else(|| anyhow!("malformed data URL: no comma separator"))?;
                let mime = header
                    .split(';')
                    .next()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(fallback_mime);
                (mime.to_string(), body.to_string())
            }
            None => (fallback_mime.to_string(), input.to_string()),
        };

        if data.trim().is_empty() {
            return Err(anyhow!("image payload is empty"));
        }

        Ok(Self { data, mime_type })
    }

    pub fn from_jpeg_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(anyhow!("image payload is empty"));
        }
        Ok(Self {
            data: general_purpose::STANDARD.encode(bytes),
            mime_type: "image/jpeg".to_string(),
        })
    }
}

/// Anything that can hand the scanner a base64 image: a file picker, a live
/// camera snapshot, a test fixture. Camera acquisition failures are advisory
/// and never reach the classification client.
pub trait ImageSource: Send {
    fn acquire(&mut self) -> Result<ImagePayload>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_url_prefix() {
        let p = ImagePayload::from_base64("data:image/png;base64,aGVsbG8=", "image/jpeg").unwrap();
        assert_eq!(p.mime_type, "image/png");
        assert_eq!(p.data, "aGVsbG8=");
    }

    #[test]
    fn bare_base64_uses_fallback_mime() {
        let p = ImagePayload::from_base64("aGVsbG8=", "image/jpeg").unwrap();
        assert_eq!(p.mime_type, "image/jpeg");
        assert_eq!(p.data, "aGVsbG8=");
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(ImagePayload::from_base64("", "image/jpeg").is_err());
        assert!(ImagePayload::from_base64("data:image/jpeg;base64,", "image/jpeg").is_err());
        assert!(ImagePayload::from_jpeg_bytes(&[]).is_err());
    }

    #[test]
    fn jpeg_bytes_round_trip() {
        let p = ImagePayload::from_jpeg_bytes(b"notajpeg").unwrap();
        let decoded = general_purpose::STANDARD.decode(&p.data).unwrap();
        assert_eq!(decoded, b"notajpeg");
        assert_eq!(p.mime_type, "image/jpeg");
    }
}
