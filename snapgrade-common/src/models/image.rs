use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::Error;

/// Raw image bytes plus the MIME type they were declared with.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    name: Option<String>,
    mime_type: String,
    data: Vec<u8>,
}

impl ImagePayload {
    /// Builds a payload, rejecting anything whose MIME type is not `image/*`.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Result<Self, Error> {
        let mime_type = mime_type.into();
        if !is_image_mime(&mime_type) {
            return Err(Error::InvalidImage(format!(
                "'{}' is not an image MIME type",
                mime_type
            )));
        }
        if data.is_empty() {
            return Err(Error::InvalidImage("image data is empty".to_string()));
        }
        Ok(Self {
            name: None,
            mime_type,
            data,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for logs and listings; falls back to the MIME type.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.mime_type)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Standard base64 of the bytes, without any `data:` URL prefix.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

// Image bytes are never dumped into logs.
impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .get(..6)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("image/"))
        && mime_type.len() > 6
}
