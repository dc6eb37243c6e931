// src/extract.rs

use std::time::Instant;

use image::DynamicImage;
use log::info;

use crate::geometry::{PixelSize, SourceRect};
use crate::ocr::{OcrError, Recognizer};

pub const NO_TEXT_MESSAGE: &str = "No text detected. Try selecting a different area.";

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("crop rectangle has zero width or height")]
    ZeroDimension,

    #[error("crop rectangle {requested} exceeds image bounds ({}x{})", image_size.width, image_size.height)]
    OutOfBounds { requested: SourceRect, image_size: PixelSize },
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Crop(#[from] CropError),

    #[error(transparent)]
    Ocr(#[from] OcrError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Text(String),
    NoText,
}

impl Extraction {
    /// What the text area shows for this result.
    pub fn display_text(&self) -> &str {
        match self {
            Extraction::Text(text) => text,
            Extraction::NoText => NO_TEXT_MESSAGE,
        }
    }
}

/// Cuts `rect` out of `image`. The rectangle must already be in source pixels.
pub fn crop(image: &DynamicImage, rect: SourceRect) -> Result<DynamicImage, CropError> {
    if rect.is_empty() {
        return Err(CropError::ZeroDimension);
    }
    let image_size = PixelSize::of(image);
    if !rect.fits_within(image_size) {
        return Err(CropError::OutOfBounds { requested: rect, image_size });
    }
    Ok(image.crop_imm(rect.x, rect.y, rect.width, rect.height))
}

/// Crops the selection and runs it through the recognizer.
pub fn extract_text(image: &DynamicImage, rect: SourceRect, recognizer: &dyn Recognizer) -> Result<Extraction, ExtractError> {
    let start = Instant::now();
    let cropped = crop(image, rect)?;
    let text = recognizer.recognize(&cropped)?;
    let text = text.trim();

    info!("recognized {} chars from {rect} in {}ms", text.chars().count(), start.elapsed().as_millis());

    if text.is_empty() {
        Ok(Extraction::NoText)
    } else {
        Ok(Extraction::Text(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureSource;
    use crate::capture::tests::FakeScreen;
    use image::GenericImageView;
    use std::sync::Mutex;

    /// Returns canned text and remembers the size of every image it saw.
    struct ScriptedOcr {
        reply: Result<String, String>,
        seen: Mutex<Vec<(u32, u32)>>,
    }

    impl ScriptedOcr {
        fn replying(text: &str) -> Self {
            ScriptedOcr { reply: Ok(text.to_string()), seen: Mutex::new(Vec::new()) }
        }

        fn failing(msg: &str) -> Self {
            ScriptedOcr { reply: Err(msg.to_string()), seen: Mutex::new(Vec::new()) }
        }
    }

    impl Recognizer for ScriptedOcr {
        fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
            self.seen.lock().unwrap().push(image.dimensions());
            self.reply.clone().map_err(OcrError::Engine)
        }
    }

    fn screenshot() -> DynamicImage {
        FakeScreen::new(3000, 2000).capture_full_screen().unwrap()
    }

    #[test]
    fn crops_exact_region() {
        let img = screenshot();
        let out = crop(&img, SourceRect::new(500, 500, 1000, 500)).unwrap();
        assert_eq!(out.dimensions(), (1000, 500));
        // gradient encodes x % 256 in red, y % 256 in green
        assert_eq!(out.get_pixel(0, 0).0, [(500 % 256) as u8, (500 % 256) as u8, 0, 255]);
    }

    #[test]
    fn crop_up_to_far_edge_is_allowed() {
        let img = screenshot();
        assert!(crop(&img, SourceRect::new(0, 0, 3000, 250)).is_ok());
    }

    #[test]
    fn crop_rejects_empty_and_oversized_rects() {
        let img = screenshot();
        assert!(matches!(crop(&img, SourceRect::new(10, 10, 0, 5)), Err(CropError::ZeroDimension)));
        let err = crop(&img, SourceRect::new(2900, 0, 101, 10)).unwrap_err();
        assert!(matches!(err, CropError::OutOfBounds { .. }));
        assert_eq!(err.to_string(), "crop rectangle 101x10 at (2900, 0) exceeds image bounds (3000x2000)");
    }

    #[test]
    fn recognizer_gets_the_cropped_image() {
        let ocr = ScriptedOcr::replying("  Hello,\nworld \n");
        let out = extract_text(&screenshot(), SourceRect::new(0, 0, 3000, 250), &ocr).unwrap();
        assert_eq!(out, Extraction::Text("Hello,\nworld".to_string()));
        assert_eq!(*ocr.seen.lock().unwrap(), vec![(3000, 250)]);
    }

    #[test]
    fn blank_recognition_means_no_text() {
        let ocr = ScriptedOcr::replying(" \n\t ");
        let out = extract_text(&screenshot(), SourceRect::new(1, 1, 5, 5), &ocr).unwrap();
        assert_eq!(out, Extraction::NoText);
        assert_eq!(out.display_text(), NO_TEXT_MESSAGE);
    }

    #[test]
    fn ocr_failure_is_passed_to_caller() {
        let ocr = ScriptedOcr::failing("tesseract not found");
        let err = extract_text(&screenshot(), SourceRect::new(1, 1, 5, 5), &ocr).unwrap_err();
        assert!(matches!(err, ExtractError::Ocr(OcrError::Engine(_))));
        assert_eq!(err.to_string(), "tesseract failed: tesseract not found");
    }

    #[test]
    fn bad_rect_never_reaches_the_recognizer() {
        let ocr = ScriptedOcr::replying("unused");
        let err = extract_text(&screenshot(), SourceRect::new(0, 0, 0, 0), &ocr).unwrap_err();
        assert!(matches!(err, ExtractError::Crop(CropError::ZeroDimension)));
        assert!(ocr.seen.lock().unwrap().is_empty());
    }
}
