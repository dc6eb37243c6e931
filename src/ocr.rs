// src/ocr.rs

use std::collections::HashMap;
use std::io::Write;

use image::{DynamicImage, ImageOutputFormat};
use rusty_tesseract::{Args, Image};

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("could not stage image for OCR: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode image for OCR: {0}")]
    Encode(String),

    #[error("tesseract failed: {0}")]
    Engine(String),
}

/// The OCR engine as seen from the app: an image goes in, text comes out.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    pub language: String,
    pub dpi: Option<i32>,
    pub psm: Option<i32>,
    pub oem: Option<i32>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        OcrSettings { language: "eng".to_string(), dpi: None, psm: None, oem: None }
    }
}

/// Runs the `tesseract` executable found on PATH.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    settings: OcrSettings,
}

impl TesseractRecognizer {
    pub fn new(settings: OcrSettings) -> Self {
        TesseractRecognizer { settings }
    }

    fn args(&self) -> Args {
        let defaults = Args::default();
        Args {
            lang: self.settings.language.clone(),
            config_variables: HashMap::new(),
            dpi: self.settings.dpi.or(defaults.dpi),
            psm: self.settings.psm.or(defaults.psm),
            oem: self.settings.oem.or(defaults.oem),
        }
    }
}

impl Recognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        // tesseract reads from disk; the file is removed when `staged` drops
        let mut staged = tempfile::Builder::new().prefix("rivera-").suffix(".png").tempfile()?;
        image
            .write_to(staged.as_file_mut(), ImageOutputFormat::Png)
            .map_err(|e| OcrError::Encode(e.to_string()))?;
        staged.as_file_mut().flush()?;

        let input = Image::from_path(staged.path()).map_err(|e| OcrError::Engine(e.to_string()))?;
        rusty_tesseract::image_to_string(&input, &self.args()).map_err(|e| OcrError::Engine(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_options_fall_back_to_engine_defaults() {
        let defaults = Args::default();
        let args = TesseractRecognizer::new(OcrSettings::default()).args();
        assert_eq!(args.lang, "eng");
        assert_eq!(args.dpi, defaults.dpi);
        assert_eq!(args.psm, defaults.psm);
        assert_eq!(args.oem, defaults.oem);
    }

    #[test]
    fn explicit_options_are_passed_through() {
        let settings = OcrSettings { language: "deu+eng".into(), dpi: Some(300), psm: Some(6), oem: Some(1) };
        let args = TesseractRecognizer::new(settings).args();
        assert_eq!(args.lang, "deu+eng");
        assert_eq!((args.dpi, args.psm, args.oem), (Some(300), Some(6), Some(1)));
    }

    #[test]
    fn errors_read_well() {
        let err = OcrError::Engine("no such language".into());
        assert_eq!(err.to_string(), "tesseract failed: no such language");
    }
}
