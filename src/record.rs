//! Image records: self-describing data URIs.
//!
//! A record is the exact encoded string `data:<mime>;base64,<payload>`.
//! Two records are the same image only when their encoded strings are equal;
//! pixel-identical images encoded differently are distinct records.

use std::fmt;
use std::hash::{Hash, Hasher};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{GalleryError, Result};

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// Number of hex characters in a record's display id.
pub const ID_LEN: usize = 12;

/// One stored image, encoded as a data URI.
#[derive(Clone)]
pub struct ImageRecord {
    encoded: String,
    decoded_len: u64,
}

impl ImageRecord {
    /// Encode raw file bytes as a record.
    #[must_use]
    pub fn from_bytes(media_type: &str, bytes: &[u8]) -> Self {
        let media_type = media_type.trim().to_ascii_lowercase();
        let encoded = format!(
            "{DATA_PREFIX}{media_type}{BASE64_MARKER},{}",
            STANDARD.encode(bytes)
        );
        Self {
            encoded,
            decoded_len: bytes.len() as u64,
        }
    }

    /// Parse a stored data URI.
    ///
    /// The decoded size is computed from everything after the first `,`.
    pub fn parse(encoded: impl Into<String>) -> Result<Self> {
        let encoded = encoded.into();
        let payload = Self::split(&encoded)?.1;
        let decoded = STANDARD
            .decode(payload)
            .map_err(|e| GalleryError::Other(format!("invalid base64 payload: {e}")))?;
        Ok(Self {
            decoded_len: decoded.len() as u64,
            encoded,
        })
    }

    fn split(encoded: &str) -> Result<(&str, &str)> {
        let rest = encoded
            .strip_prefix(DATA_PREFIX)
            .ok_or_else(|| GalleryError::Other("record is not a data URI".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| GalleryError::Other("data URI has no payload separator".to_string()))?;
        let media_type = header
            .strip_suffix(BASE64_MARKER)
            .ok_or_else(|| GalleryError::Other("data URI is not base64 encoded".to_string()))?;
        Ok((media_type, payload))
    }

    /// The full encoded string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// The declared media type, e.g. `image/png`.
    #[must_use]
    pub fn media_type(&self) -> &str {
        Self::split(&self.encoded).map_or("", |(media_type, _)| media_type)
    }

    /// Size of the decoded payload in bytes.
    #[must_use]
    pub const fn decoded_len(&self) -> u64 {
        self.decoded_len
    }

    /// Decode the payload back into raw bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let (_, payload) = Self::split(&self.encoded)?;
        STANDARD
            .decode(payload)
            .map_err(|e| GalleryError::Other(format!("invalid base64 payload: {e}")))
    }

    /// Short hex id derived from the encoded string, for display and selection.
    #[must_use]
    pub fn id(&self) -> String {
        let digest = Sha256::digest(self.encoded.as_bytes());
        let mut id = hex::encode(digest);
        id.truncate(ID_LEN);
        id
    }
}

impl PartialEq for ImageRecord {
    fn eq(&self, other: &Self) -> bool {
        self.encoded == other.encoded
    }
}

impl Eq for ImageRecord {}

impl Hash for ImageRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encoded.hash(state);
    }
}

impl fmt::Debug for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRecord")
            .field("id", &self.id())
            .field("media_type", &self.media_type())
            .field("decoded_len", &self.decoded_len)
            .finish()
    }
}

impl fmt::Display for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {} bytes)", self.id(), self.media_type(), self.decoded_len)
    }
}

impl Serialize for ImageRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encoded)
    }
}

impl<'de> Deserialize<'de> for ImageRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::parse(encoded).map_err(serde::de::Error::custom)
    }
}
