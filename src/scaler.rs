// src/scaler.rs

use image::DynamicImage;
use image::imageops::FilterType;

use crate::geometry::{DisplayArea, DisplaySize, PixelSize, WidgetPoint};

/// Where the preview sits inside the target area when it doesn't fill it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    TopLeft,
    #[default]
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewLayout {
    /// preview / source, identical on both axes.
    pub scale: f64,
    pub preview: PixelSize,
    pub display_area: DisplayArea,
}

impl PreviewLayout {
    /// 1:1 layout covering the whole source, anchored at the widget origin.
    pub fn identity(source: PixelSize) -> Option<Self> {
        if source.is_empty() {
            return None;
        }
        Some(PreviewLayout {
            scale: 1.0,
            preview: source,
            display_area: DisplayArea::new(
                WidgetPoint::default(),
                DisplaySize::new(source.width as f64, source.height as f64),
            ),
        })
    }
}

/// Fits `source` into `target` without cropping or stretching.
///
/// Returns `None` when there is nothing to select: an empty source, an empty
/// target, or a target so small the preview rounds down to zero pixels.
pub fn fit_contain(source: PixelSize, target: DisplaySize, alignment: Alignment) -> Option<PreviewLayout> {
    if source.is_empty() || target.is_empty() {
        return None;
    }

    let (w, h) = (source.width as f64, source.height as f64);
    let scale = (target.width / w).min(target.height / h);
    let preview = PixelSize::new((w * scale).round() as u32, (h * scale).round() as u32);
    if preview.is_empty() {
        return None;
    }

    // rounding may push one axis a fraction past the target
    let size = DisplaySize::new(
        (preview.width as f64).min(target.width),
        (preview.height as f64).min(target.height),
    );
    let origin = match alignment {
        Alignment::TopLeft => WidgetPoint::new(0.0, 0.0),
        Alignment::Center => WidgetPoint::new(
            ((target.width - size.width) / 2.0).floor(),
            ((target.height - size.height) / 2.0).floor(),
        ),
    };

    Some(PreviewLayout {
        scale,
        preview,
        display_area: DisplayArea::new(origin, size),
    })
}

/// Produces the downscaled image drawn inside the display area.
pub fn render_preview(image: &DynamicImage, layout: &PreviewLayout) -> DynamicImage {
    if PixelSize::of(image) == layout.preview {
        return image.clone();
    }
    image.resize_exact(layout.preview.width, layout.preview.height, FilterType::Triangle)
}
