use std::io::Cursor;

use async_trait::async_trait;
use image::{ImageFormat, ImageReader};
use tracing::{debug, error};

use snapgrade_common::BackendError;
use snapgrade_common::models::{AnalysisCriteria, AnalysisResult, ImagePayload};
use snapgrade_common::traits::BasicAnalysisBackend;

use crate::basic::FALLBACK_OVERALL_SCORE;

/// Images at least this wide pass the resolution check.
pub const MIN_GOOD_WIDTH: u32 = 1000;

/// What the image header says about the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFacts {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageFacts {
    /// Upper-case format name, e.g. `PNG` or `JPEG`.
    pub fn format_name(&self) -> String {
        format!("{:?}", self.format).to_uppercase()
    }
}

/// Reads format and dimensions without decoding the pixel data.
pub fn inspect_image(bytes: &[u8]) -> Result<ImageFacts, BackendError> {
    let decode_err = |e: &dyn std::fmt::Display| {
        BackendError::unavailable(format!("Failed to decode or open image: {}", e))
    };

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_err(&e))?;
    let format = reader
        .format()
        .ok_or_else(|| decode_err(&"unrecognised image format"))?;
    let (width, height) = reader.into_dimensions().map_err(|e| decode_err(&e))?;

    Ok(ImageFacts { width, height, format })
}

/// The report the hosted basic endpoint returns for an image with these facts.
pub fn local_report(facts: &ImageFacts) -> AnalysisResult {
    let resolution_score = if facts.width >= MIN_GOOD_WIDTH { 8 } else { 4 };
    AnalysisResult {
        overall_score: FALLBACK_OVERALL_SCORE,
        summary: "This is a basic analysis from your AWS backend. It checks for common issues \
                  like resolution and aspect ratio. The AI-powered report is handled separately \
                  by the frontend."
            .to_string(),
        report: vec![
            AnalysisCriteria::new(
                "Resolution Check (Backend)",
                resolution_score,
                format!("Image resolution is {}px by {}px.", facts.width, facts.height),
            ),
            AnalysisCriteria::new(
                "File Format (Backend)",
                9,
                format!("Image format is {}.", facts.format_name()),
            ),
        ],
        is_mock: true,
    }
}

/// Basic analysis computed in-process from the image header.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalBasicProvider;

impl LocalBasicProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BasicAnalysisBackend for LocalBasicProvider {
    async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, BackendError> {
        let facts = inspect_image(image.data()).map_err(|e| {
            error!("Local basic analysis failed for '{}': {}", image.display_name(), e);
            e
        })?;
        debug!(
            "'{}' is {} {}x{}",
            image.display_name(),
            facts.format_name(),
            facts.width,
            facts.height
        );
        Ok(local_report(&facts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::new(width, height).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_inspect_reads_header() {
        let facts = inspect_image(&encode(1200, 800, ImageFormat::Png)).unwrap();
        assert_eq!((facts.width, facts.height), (1200, 800));
        assert_eq!(facts.format_name(), "PNG");

        let facts = inspect_image(&encode(64, 48, ImageFormat::Jpeg)).unwrap();
        assert_eq!(facts.format_name(), "JPEG");
    }

    #[tokio::test]
    async fn test_wide_image_passes_resolution_check() {
        let image = ImagePayload::new(encode(1200, 800, ImageFormat::Png), "image/png").unwrap();
        let result = LocalBasicProvider::new().analyze(&image).await.unwrap();

        assert_eq!(result.overall_score, 78);
        assert!(result.is_mock);
        assert_eq!(result.report.len(), 2);
        assert_eq!(result.report[0].criteria, "Resolution Check (Backend)");
        assert_eq!(result.report[0].score, 8);
        assert_eq!(result.report[0].explanation, "Image resolution is 1200px by 800px.");
        assert_eq!(result.report[1].score, 9);
        assert_eq!(result.report[1].explanation, "Image format is PNG.");
    }

    #[tokio::test]
    async fn test_narrow_image_scores_low() {
        let image = ImagePayload::new(encode(999, 999, ImageFormat::Jpeg), "image/jpeg").unwrap();
        let result = LocalBasicProvider::new().analyze(&image).await.unwrap();
        assert_eq!(result.report[0].score, 4);
        assert_eq!(result.report[1].explanation, "Image format is JPEG.");
    }

    #[tokio::test]
    async fn test_undecodable_bytes_are_reported() {
        let image = ImagePayload::new(vec![1, 2, 3, 4], "image/png").unwrap();
        let err = LocalBasicProvider::new().analyze(&image).await.unwrap_err();
        match err {
            BackendError::Unavailable(msg) => {
                assert!(msg.starts_with("Failed to decode or open image: "), "{}", msg)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
