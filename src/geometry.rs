// src/geometry.rs
//
// Every coordinate carries the space it lives in:
// - WidgetPoint: pointer positions as delivered to the selector widget
// - Display*: local to the preview's display area, origin at its top-left
// - SourceRect / PixelSize: pixels of the original capture
//
// The only way from display space to source space is `mapper::CoordinateMapper`.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WidgetPoint {
    pub x: f64,
    pub y: f64,
}

impl WidgetPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        WidgetPoint { x, y }
    }
}

impl From<druid::Point> for WidgetPoint {
    fn from(p: druid::Point) -> Self {
        WidgetPoint::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        DisplayPoint { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub const fn new(width: f64, height: f64) -> Self {
        DisplaySize { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

impl From<druid::Size> for DisplaySize {
    fn from(s: druid::Size) -> Self {
        DisplaySize::new(s.width, s.height)
    }
}

/// Rectangle in display-local coordinates, always normalized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        DisplayRect { x, y, width, height }
    }

    /// Builds the rectangle spanned by two arbitrary corners.
    pub fn from_corners(a: DisplayPoint, b: DisplayPoint) -> Self {
        DisplayRect {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        PixelSize { width, height }
    }

    pub fn of(image: &image::DynamicImage) -> Self {
        use image::GenericImageView;
        let (width, height) = image.dimensions();
        PixelSize { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rectangle in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SourceRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        SourceRect { x, y, width, height }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn fits_within(&self, bounds: PixelSize) -> bool {
        self.right() <= bounds.width && self.bottom() <= bounds.height
    }
}

impl std::fmt::Display for SourceRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

/// The part of the selector widget covered by the preview image.
/// Pointer events are only meaningful relative to this area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayArea {
    pub origin: WidgetPoint,
    pub size: DisplaySize,
}

impl DisplayArea {
    pub const fn new(origin: WidgetPoint, size: DisplaySize) -> Self {
        DisplayArea { origin, size }
    }

    pub fn contains(&self, p: WidgetPoint) -> bool {
        p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x <= self.origin.x + self.size.width
            && p.y <= self.origin.y + self.size.height
    }

    pub fn to_local(&self, p: WidgetPoint) -> DisplayPoint {
        DisplayPoint::new(p.x - self.origin.x, p.y - self.origin.y)
    }

    /// Like `to_local`, but snaps points outside the area to its nearest edge.
    pub fn clamp_local(&self, p: WidgetPoint) -> DisplayPoint {
        let local = self.to_local(p);
        DisplayPoint::new(
            local.x.clamp(0.0, self.size.width),
            local.y.clamp(0.0, self.size.height),
        )
    }

    /// Converts a display-local rectangle back into widget space for painting.
    pub fn to_widget_rect(&self, r: DisplayRect) -> druid::Rect {
        druid::Rect::from_origin_size(
            (self.origin.x + r.x, self.origin.y + r.y),
            (r.width, r.height),
        )
    }

    pub fn widget_rect(&self) -> druid::Rect {
        druid::Rect::from_origin_size(
            (self.origin.x, self.origin.y),
            (self.size.width, self.size.height),
        )
    }
}
