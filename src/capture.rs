// src/capture.rs

use image::{DynamicImage, ImageBuffer};
use log::info;
use xcap::Monitor;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("no display available to capture")]
    NoDisplay,

    #[error("screen capture failed: {0}")]
    CaptureFailed(String),
}

/// Anything that can hand over a still image of the whole screen.
pub trait CaptureSource: Send + Sync {
    fn capture_full_screen(&self) -> Result<DynamicImage, CaptureError>;
}

/// Captures the first monitor xcap reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScreenCapture;

impl CaptureSource for ScreenCapture {
    fn capture_full_screen(&self) -> Result<DynamicImage, CaptureError> {
        let mons = Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;
        let mon = mons.first().ok_or(CaptureError::NoDisplay)?;
        let img = mon
            .capture_image()
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

        let (w, h) = (img.width(), img.height());
        if w == 0 || h == 0 {
            return Err(CaptureError::NoDisplay);
        }
        // xcap may link a different `image` release; go through raw RGBA bytes
        let raw = img.into_raw();
        let buf = ImageBuffer::from_raw(w, h, raw)
            .ok_or_else(|| CaptureError::CaptureFailed(format!("{w}x{h} capture has a short pixel buffer")))?;

        info!("captured primary display at {w}x{h}");
        Ok(DynamicImage::ImageRgba8(buf))
    }
}
