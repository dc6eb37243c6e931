// src/mapper.rs

use crate::geometry::{DisplayRect, DisplaySize, PixelSize, SourceRect};
use crate::scaler::PreviewLayout;

/// Converts display-local rectangles to source pixels for one fixed layout.
///
/// Each axis has its own factor taken from the size the preview is actually
/// drawn at. The fitted scale is rounded into the preview size, so on the
/// axis that doesn't limit the fit the two can differ by a fraction of a pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    scale_x: f64,
    scale_y: f64,
    source: PixelSize,
}

impl CoordinateMapper {
    /// `display` is the drawn preview size; both it and `source` must be non-empty.
    pub fn new(display: DisplaySize, source: PixelSize) -> Self {
        debug_assert!(!display.is_empty() && !source.is_empty(), "empty mapping {display:?} -> {source:?}");
        CoordinateMapper {
            scale_x: display.width / source.width as f64,
            scale_y: display.height / source.height as f64,
            source,
        }
    }

    pub fn for_layout(layout: &PreviewLayout, source: PixelSize) -> Self {
        Self::new(layout.display_area.size, source)
    }

    pub fn source(&self) -> PixelSize {
        self.source
    }

    /// Maps `r` into source pixels, clamped to the source bounds.
    ///
    /// Edges are rounded independently, so a rectangle touching the far edge
    /// of the preview always maps to one touching the far edge of the source.
    pub fn to_source(&self, r: DisplayRect) -> SourceRect {
        let x0 = edge(r.x / self.scale_x, self.source.width);
        let y0 = edge(r.y / self.scale_y, self.source.height);
        let x1 = edge(r.right() / self.scale_x, self.source.width);
        let y1 = edge(r.bottom() / self.scale_y, self.source.height);

        SourceRect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    pub fn to_display(&self, r: SourceRect) -> DisplayRect {
        DisplayRect::new(
            r.x as f64 * self.scale_x,
            r.y as f64 * self.scale_y,
            r.width as f64 * self.scale_x,
            r.height as f64 * self.scale_y,
        )
    }
}

fn edge(source: f64, limit: u32) -> u32 {
    // NaN lands on 0 through the cast
    source.round().clamp(0.0, limit as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaler::{Alignment, fit_contain};

    fn session_3000x2000() -> CoordinateMapper {
        let source = PixelSize::new(3000, 2000);
        let layout = fit_contain(source, DisplaySize::new(600.0, 600.0), Alignment::TopLeft).expect("layout");
        CoordinateMapper::for_layout(&layout, source)
    }

    #[test]
    fn maps_drag_into_source_pixels() {
        let mapper = session_3000x2000();
        let r = DisplayRect::new(100.0, 100.0, 200.0, 100.0);
        assert_eq!(mapper.to_source(r), SourceRect::new(500, 500, 1000, 500));
    }

    #[test]
    fn full_width_drag_reaches_source_edge() {
        let mapper = session_3000x2000();
        let r = DisplayRect::new(0.0, 0.0, 600.0, 50.0);
        assert_eq!(mapper.to_source(r), SourceRect::new(0, 0, 3000, 250));
    }

    #[test]
    fn overshoot_is_clamped() {
        let mapper = session_3000x2000();
        let r = DisplayRect::new(550.0, 390.0, 100.0, 100.0);
        let s = mapper.to_source(r);
        assert_eq!(s, SourceRect::new(2750, 1950, 250, 50));
        assert!(s.fits_within(mapper.source()));

        let outside = DisplayRect::new(-50.0, -10.0, 20.0, 5.0);
        assert_eq!(mapper.to_source(outside), SourceRect::new(0, 0, 0, 0));
    }

    #[test]
    fn rounding_never_leaves_bounds() {
        // 1001 px into 333 px: the scale has no exact binary representation
        let source = PixelSize::new(1001, 777);
        let layout = fit_contain(source, DisplaySize::new(333.0, 333.0), Alignment::TopLeft).expect("layout");
        let mapper = CoordinateMapper::for_layout(&layout, source);
        let size = layout.display_area.size;

        let whole = mapper.to_source(DisplayRect::new(0.0, 0.0, size.width, size.height));
        assert!(whole.fits_within(source));
        assert_eq!(whole.right(), 1001);
        assert_eq!(whole.bottom(), 777);
    }

    #[test]
    fn far_edge_reached_on_the_axis_that_does_not_limit_the_fit() {
        // 2001 rows at 0.2 would be 400.2 display px; the preview is drawn 400 high
        let source = PixelSize::new(3000, 2001);
        let layout = fit_contain(source, DisplaySize::new(600.0, 600.0), Alignment::TopLeft).expect("layout");
        assert_eq!(layout.preview, PixelSize::new(600, 400));
        let mapper = CoordinateMapper::for_layout(&layout, source);

        let whole = mapper.to_source(DisplayRect::new(0.0, 0.0, 600.0, 400.0));
        assert_eq!(whole, SourceRect::new(0, 0, 3000, 2001));

        let bottom_strip = mapper.to_source(DisplayRect::new(100.0, 390.0, 200.0, 10.0));
        assert_eq!(bottom_strip.bottom(), 2001);
    }

    #[test]
    fn round_trip_stays_within_a_pixel() {
        let source = PixelSize::new(2560, 1440);
        let layout = fit_contain(source, DisplaySize::new(700.0, 500.0), Alignment::Center).expect("layout");
        let mapper = CoordinateMapper::for_layout(&layout, source);
        let area = layout.display_area.size;

        let mut x = 0.0;
        while x < area.width {
            let mut y = 0.0;
            while y < area.height {
                let r = DisplayRect::new(x, y, (area.width - x) * 0.7, (area.height - y) * 0.3);
                let back = mapper.to_display(mapper.to_source(r));
                assert!((back.x - r.x).abs() <= 1.0, "{r:?} -> {back:?}");
                assert!((back.y - r.y).abs() <= 1.0, "{r:?} -> {back:?}");
                assert!((back.width - r.width).abs() <= 1.0, "{r:?} -> {back:?}");
                assert!((back.height - r.height).abs() <= 1.0, "{r:?} -> {back:?}");
                y += 37.3;
            }
            x += 41.9;
        }
    }

    #[test]
    fn mapping_is_idempotent() {
        let mapper = session_3000x2000();
        let r = DisplayRect::new(12.3, 45.6, 78.9, 10.1);
        assert_eq!(mapper.to_source(r), mapper.to_source(r));
    }

    #[test]
    fn identity_scale_is_exact() {
        let mapper = CoordinateMapper::new(DisplaySize::new(1920.0, 1080.0), PixelSize::new(1920, 1080));
        let r = DisplayRect::new(10.0, 20.0, 300.0, 400.0);
        assert_eq!(mapper.to_source(r), SourceRect::new(10, 20, 300, 400));
        assert_eq!(mapper.to_display(SourceRect::new(10, 20, 300, 400)), r);
    }
}
