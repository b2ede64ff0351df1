use tracing::debug;

use snapgrade_common::models::ImagePayload;
use snapgrade_common::models::image::is_image_mime;

use crate::error::SelectionError;

/// A file handed to the selection before it is known to be an image.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// The images queued for the next scan.
///
/// In single mode a new pick replaces the selection; in bulk mode picks
/// accumulate.
#[derive(Debug, Default)]
pub struct ImageSelection {
    images: Vec<ImagePayload>,
    bulk_mode: bool,
}

impl ImageSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bulk_mode(&self) -> bool {
        self.bulk_mode
    }

    /// Switching modes starts over with an empty selection; setting the
    /// current mode again keeps it.
    pub fn set_bulk_mode(&mut self, bulk: bool) {
        if self.bulk_mode != bulk {
            self.images.clear();
            self.bulk_mode = bulk;
        }
    }

    /// Adds the image files among `files`, silently dropping the rest.
    /// Returns how many were added.
    pub fn add(&mut self, files: Vec<CandidateFile>) -> Result<usize, SelectionError> {
        let mut valid: Vec<ImagePayload> = files
            .into_iter()
            .filter(|f| is_image_mime(&f.mime_type))
            .filter_map(|f| {
                ImagePayload::new(f.data, f.mime_type)
                    .ok()
                    .map(|p| p.with_name(f.name))
            })
            .collect();

        if valid.is_empty() {
            return Err(SelectionError::NoValidImages);
        }

        if self.bulk_mode {
            let added = valid.len();
            self.images.append(&mut valid);
            debug!("Bulk selection now holds {} image(s)", self.images.len());
            Ok(added)
        } else {
            valid.truncate(1);
            self.images = valid;
            Ok(1)
        }
    }

    pub fn remove(&mut self, index: usize) -> Result<ImagePayload, SelectionError> {
        if index >= self.images.len() {
            return Err(SelectionError::OutOfRange {
                index,
                len: self.images.len(),
            });
        }
        Ok(self.images.remove(index))
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn images(&self) -> &[ImagePayload] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
