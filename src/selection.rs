// src/selection.rs

use std::fmt;
use std::str::FromStr;

use log::{debug, trace};

use crate::geometry::{DisplayArea, DisplayPoint, DisplayRect, DisplaySize, PixelSize, SourceRect, WidgetPoint};
use crate::mapper::CoordinateMapper;
use crate::scaler::{Alignment, PreviewLayout, fit_contain};

/// How the screenshot is presented for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorMode {
    /// Translucent full-screen window over the capture at 1:1.
    Overlay,
    /// Downscaled preview embedded next to the extracted text.
    #[default]
    Pane,
}

impl SelectorMode {
    pub fn layout(self, source: PixelSize, target: DisplaySize, alignment: Alignment) -> Option<PreviewLayout> {
        match self {
            SelectorMode::Overlay => PreviewLayout::identity(source),
            SelectorMode::Pane => fit_contain(source, target, alignment),
        }
    }
}

impl FromStr for SelectorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overlay" | "fullscreen" => Ok(SelectorMode::Overlay),
            "pane" | "preview" => Ok(SelectorMode::Pane),
            other => Err(format!("unknown selector mode '{other}', expected 'pane' or 'overlay'")),
        }
    }
}

impl fmt::Display for SelectorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SelectorMode::Overlay => "overlay",
            SelectorMode::Pane => "pane",
        })
    }
}

/// One press-move-release gesture, in display-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub origin: DisplayPoint,
    pub current: DisplayPoint,
}

impl DragSession {
    pub fn rect(&self) -> DisplayRect {
        DisplayRect::from_corners(self.origin, self.current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Selected(SourceRect),
    /// The gesture covered less than the minimum extent; nothing to crop.
    Cancelled,
}

/// Selection state for one captured image.
///
/// Owns the preview layout, the scale derived from it and at most one drag.
/// A new capture means a new `RegionSelector`; nothing carries over.
#[derive(Debug, Clone)]
pub struct RegionSelector {
    mode: SelectorMode,
    alignment: Alignment,
    source: PixelSize,
    target: DisplaySize,
    min_extent: u32,
    layout: Option<PreviewLayout>,
    drag: Option<DragSession>,
}

impl RegionSelector {
    pub fn new(mode: SelectorMode, source: PixelSize, target: DisplaySize) -> Self {
        let mut selector = RegionSelector {
            mode,
            alignment: Alignment::default(),
            source,
            target,
            min_extent: 1,
            layout: None,
            drag: None,
        };
        selector.relayout();
        selector
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self.relayout();
        self
    }

    /// Selections narrower or shorter than this many source pixels are cancelled.
    pub fn with_min_extent(mut self, min_extent: u32) -> Self {
        self.min_extent = min_extent.max(1);
        self
    }

    pub fn layout(&self) -> Option<&PreviewLayout> {
        self.layout.as_ref()
    }

    pub fn display_area(&self) -> Option<DisplayArea> {
        self.layout.map(|l| l.display_area)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Recomputes the layout for a new target size. Any drag in progress is
    /// dropped since its coordinates belong to the old scale.
    pub fn resize(&mut self, target: DisplaySize) {
        self.cancel();
        self.target = target;
        self.relayout();
    }

    fn relayout(&mut self) {
        self.layout = self.mode.layout(self.source, self.target, self.alignment);
        match &self.layout {
            Some(l) => debug!(
                "{} layout: {}x{} -> {}x{} (scale {:.4}) at ({}, {})",
                self.mode,
                self.source.width,
                self.source.height,
                l.preview.width,
                l.preview.height,
                l.scale,
                l.display_area.origin.x,
                l.display_area.origin.y
            ),
            None => debug!(
                "{} layout: nothing selectable for {}x{} in {}x{}",
                self.mode, self.source.width, self.source.height, self.target.width, self.target.height
            ),
        }
    }

    pub fn mapper(&self) -> Option<CoordinateMapper> {
        self.layout.map(|l| CoordinateMapper::for_layout(&l, self.source))
    }

    /// Starts a drag if `p` lies on the preview. Returns whether it did.
    pub fn pointer_down(&mut self, p: WidgetPoint) -> bool {
        let Some(area) = self.display_area() else {
            return false;
        };
        if !area.contains(p) {
            trace!("pointer down outside display area at ({}, {})", p.x, p.y);
            return false;
        }
        let origin = area.to_local(p);
        self.drag = Some(DragSession { origin, current: origin });
        true
    }

    /// Tracks the pointer, snapping to the display area's edge when it leaves it.
    pub fn pointer_move(&mut self, p: WidgetPoint) -> Option<DisplayRect> {
        let area = self.display_area()?;
        let drag = self.drag.as_mut()?;
        drag.current = area.clamp_local(p);
        Some(drag.rect())
    }

    /// Ends the drag and maps it into source pixels. `None` when no drag was active.
    pub fn pointer_up(&mut self, p: WidgetPoint) -> Option<SelectionOutcome> {
        let (area, mapper) = (self.display_area()?, self.mapper()?);
        let mut drag = self.drag.take()?;
        drag.current = area.clamp_local(p);

        let rect = mapper.to_source(drag.rect());
        if rect.width < self.min_extent || rect.height < self.min_extent {
            debug!("selection {rect} below minimum extent {}, cancelled", self.min_extent);
            return Some(SelectionOutcome::Cancelled);
        }
        Some(SelectionOutcome::Selected(rect))
    }

    /// Drops the active drag without producing a selection.
    pub fn cancel(&mut self) -> bool {
        let had_drag = self.drag.take().is_some();
        if had_drag {
            debug!("drag cancelled");
        }
        had_drag
    }

    /// Normalized rectangle of the drag in progress.
    pub fn visible_selection(&self) -> Option<DisplayRect> {
        self.drag.map(|d| d.rect())
    }
}
