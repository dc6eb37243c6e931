// src/widget.rs

use std::sync::Arc;

use druid::piet::{ImageFormat, InterpolationMode, PietImage};
use druid::{
    BoxConstraints, Color, Data, Env, Event, EventCtx, KbKey, LayoutCtx, LifeCycle, LifeCycleCtx, PaintCtx, Rect,
    RenderContext, Size, UpdateCtx, Widget, commands,
};
use image::DynamicImage;
use log::debug;

use crate::app::{AppState, REGION_SELECTED, RegionSelection};
use crate::geometry::{DisplayArea, DisplayRect, DisplaySize, PixelSize};
use crate::scaler::{Alignment, PreviewLayout, render_preview};
use crate::selection::{RegionSelector, SelectionOutcome, SelectorMode};

/// Shows the current capture and turns left-button drags over it into
/// `REGION_SELECTED` commands.
pub struct SelectionPane {
    mode: SelectorMode,
    alignment: Alignment,
    min_extent: u32,
    target: DisplaySize,
    /// Rebuilt from scratch whenever the screenshot changes.
    selector: Option<RegionSelector>,
    cached_image: Option<PietImage>,
    previous_rect: Option<Rect>,
    /// Last emitted selection, kept visible until the next press.
    committed: Option<DisplayRect>,
}

impl SelectionPane {
    pub fn new(mode: SelectorMode, alignment: Alignment, min_extent: u32) -> Self {
        SelectionPane {
            mode,
            alignment,
            min_extent,
            target: DisplaySize::default(),
            selector: None,
            cached_image: None,
            previous_rect: None,
            committed: None,
        }
    }

    fn selector(&mut self, data: &AppState) -> Option<&mut RegionSelector> {
        if self.selector.is_none() {
            let image = data.screenshot.as_ref()?;
            let selector = RegionSelector::new(self.mode, PixelSize::of(image), self.target)
                .with_alignment(self.alignment)
                .with_min_extent(self.min_extent);
            self.selector = Some(selector);
        }
        self.selector.as_mut()
    }

    /// Drops everything tied to the old capture when the screenshot changes.
    fn screenshot_changed(&mut self, old: &Option<Arc<DynamicImage>>, new: &Option<Arc<DynamicImage>>) -> bool {
        if old.same(new) {
            return false;
        }
        self.reset();
        true
    }

    /// Returns whether a selector existed and was rescaled.
    fn set_target(&mut self, target: DisplaySize) -> bool {
        self.target = target;
        let Some(selector) = self.selector.as_mut() else {
            return false;
        };
        selector.resize(target);
        self.cached_image = None;
        self.committed = None;
        self.previous_rect = None;
        true
    }

    fn reset(&mut self) {
        self.selector = None;
        self.cached_image = None;
        self.previous_rect = None;
        self.committed = None;
    }

    fn area(&self) -> Option<DisplayArea> {
        self.selector.as_ref().and_then(|s| s.display_area())
    }

    fn widget_selection(&self) -> Option<Rect> {
        let area = self.area()?;
        let rect = self.selector.as_ref()?.visible_selection().or(self.committed)?;
        Some(area.to_widget_rect(rect))
    }
}

impl Widget<AppState> for SelectionPane {
    fn event(&mut self, ctx: &mut EventCtx, event: &Event, data: &mut AppState, _env: &Env) {
        match event {
            Event::WindowConnected => ctx.request_focus(),

            Event::MouseDown(e) if e.button.is_left() => {
                let Some(selector) = self.selector(data) else {
                    return;
                };
                if selector.pointer_down(e.pos.into()) {
                    ctx.set_active(true);
                    ctx.request_focus();
                    self.committed = None;
                    self.previous_rect = self.widget_selection();
                    ctx.request_paint();
                }
            }

            Event::MouseMove(e) if ctx.is_active() => {
                let Some(selector) = self.selector.as_mut() else {
                    return;
                };
                if selector.pointer_move(e.pos.into()).is_some() {
                    let new_rect = self.widget_selection();
                    match (self.previous_rect, new_rect) {
                        (Some(old), Some(new)) => ctx.request_paint_rect(old.union(new).inset(2.0)),
                        _ => ctx.request_paint(),
                    }
                    self.previous_rect = new_rect;
                }
            }

            Event::MouseUp(e) if e.button.is_left() && ctx.is_active() => {
                ctx.set_active(false);
                let Some(selector) = self.selector.as_mut() else {
                    return;
                };
                match selector.pointer_up(e.pos.into()) {
                    Some(SelectionOutcome::Selected(rect)) => {
                        self.committed = selector.mapper().map(|m| m.to_display(rect));
                        if let Some(image) = data.screenshot.clone() {
                            ctx.submit_command(REGION_SELECTED.with(RegionSelection {
                                image,
                                rect,
                                window: ctx.window_id(),
                            }));
                        }
                    }
                    Some(SelectionOutcome::Cancelled) => debug!("empty selection ignored"),
                    None => {}
                }
                self.previous_rect = None;
                ctx.request_paint();
            }

            Event::KeyDown(k) if k.key == KbKey::Escape => {
                let cancelled = self.selector.as_mut().is_some_and(|s| s.cancel());
                if cancelled {
                    ctx.set_active(false);
                    self.previous_rect = None;
                    ctx.request_paint();
                } else if self.mode == SelectorMode::Overlay {
                    ctx.submit_command(commands::CLOSE_WINDOW);
                }
            }

            _ => {}
        }
    }

    fn lifecycle(&mut self, ctx: &mut LifeCycleCtx, event: &LifeCycle, _data: &AppState, _env: &Env) {
        match event {
            LifeCycle::BuildFocusChain => ctx.register_for_focus(),
            LifeCycle::Size(size) => {
                self.set_target((*size).into());
            }
            _ => {}
        }
    }

    fn update(&mut self, ctx: &mut UpdateCtx, old: &AppState, data: &AppState, _env: &Env) {
        if self.screenshot_changed(&old.screenshot, &data.screenshot) {
            ctx.request_layout();
            ctx.request_paint();
        }
    }

    fn layout(&mut self, _ctx: &mut LayoutCtx, bc: &BoxConstraints, data: &AppState, _env: &Env) -> Size {
        match (self.mode, data.screenshot.as_ref()) {
            (SelectorMode::Overlay, Some(image)) => {
                let size = PixelSize::of(image);
                bc.constrain(Size::new(size.width as f64, size.height as f64))
            }
            _ => bc.max(),
        }
    }

    fn paint(&mut self, ctx: &mut PaintCtx, data: &AppState, _env: &Env) {
        let full_rect = ctx.size().to_rect();
        if self.mode == SelectorMode::Pane {
            ctx.fill(full_rect, &Color::rgb8(0xf0, 0xf0, 0xf0));
        }

        let Some(image) = data.screenshot.clone() else {
            return;
        };
        let Some(layout) = self.selector(data).and_then(|s| s.layout().copied()) else {
            return;
        };
        let PreviewLayout { preview, display_area, .. } = layout;

        if self.cached_image.is_none() {
            let buf = render_preview(&image, &layout).to_rgba8();
            self.cached_image = ctx
                .make_image(
                    preview.width as usize,
                    preview.height as usize,
                    buf.as_raw(),
                    ImageFormat::RgbaSeparate,
                )
                .ok();
        }
        let area_rect = display_area.widget_rect();
        if let Some(img) = &self.cached_image {
            ctx.draw_image(img, area_rect, InterpolationMode::Bilinear);
        }

        if let Some(r) = self.widget_selection() {
            let mask = Color::rgba8(0, 0, 0, 128);
            let a = area_rect;
            ctx.fill(Rect::new(a.x0, a.y0, a.x1, r.y0), &mask);
            ctx.fill(Rect::new(a.x0, r.y1, a.x1, a.y1), &mask);
            ctx.fill(Rect::new(a.x0, r.y0, r.x0, r.y1), &mask);
            ctx.fill(Rect::new(r.x1, r.y0, a.x1, r.y1), &mask);
            ctx.stroke(r, &Color::WHITE, 1.0);
        } else if self.mode == SelectorMode::Overlay {
            ctx.fill(area_rect, &Color::rgba8(0, 0, 0, 72));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{SourceRect, WidgetPoint};
    use image::RgbaImage;

    fn shot(width: u32, height: u32) -> Option<Arc<DynamicImage>> {
        Some(Arc::new(DynamicImage::ImageRgba8(RgbaImage::new(width, height))))
    }

    fn pane() -> SelectionPane {
        let mut pane = SelectionPane::new(SelectorMode::Pane, Alignment::TopLeft, 1);
        pane.set_target(DisplaySize::new(600.0, 600.0));
        pane
    }

    #[test]
    fn new_screenshot_discards_drag_in_progress() {
        let mut pane = pane();
        let first = AppState::new(shot(3000, 2000));
        let selector = pane.selector(&first).expect("selector");
        assert!(selector.pointer_down(WidgetPoint::new(50.0, 50.0)));
        selector.pointer_move(WidgetPoint::new(80.0, 90.0));
        pane.committed = Some(DisplayRect::new(1.0, 1.0, 2.0, 2.0));

        let second = AppState::new(shot(1200, 1200));
        assert!(pane.screenshot_changed(&first.screenshot, &second.screenshot));
        assert!(pane.selector.is_none());
        assert!(pane.committed.is_none());
        assert!(pane.widget_selection().is_none());

        let selector = pane.selector(&second).expect("rebuilt selector");
        assert!(!selector.is_dragging());
        assert_eq!(selector.mapper().map(|m| m.source()), Some(PixelSize::new(1200, 1200)));
        assert_eq!(selector.pointer_up(WidgetPoint::new(80.0, 90.0)), None);

        assert!(selector.pointer_down(WidgetPoint::new(0.0, 0.0)));
        selector.pointer_move(WidgetPoint::new(300.0, 300.0));
        let out = selector.pointer_up(WidgetPoint::new(300.0, 300.0));
        assert_eq!(out, Some(SelectionOutcome::Selected(SourceRect::new(0, 0, 600, 600))));
    }

    #[test]
    fn same_screenshot_keeps_the_drag() {
        let mut pane = pane();
        let state = AppState::new(shot(3000, 2000));
        assert!(pane.selector(&state).expect("selector").pointer_down(WidgetPoint::new(50.0, 50.0)));

        let unchanged = state.screenshot.clone();
        assert!(!pane.screenshot_changed(&state.screenshot, &unchanged));
        assert!(pane.selector.as_ref().is_some_and(|s| s.is_dragging()));
    }

    #[test]
    fn clearing_the_screenshot_resets() {
        let mut pane = pane();
        let state = AppState::new(shot(800, 600));
        assert!(pane.selector(&state).is_some());

        assert!(pane.screenshot_changed(&state.screenshot, &None));
        assert!(pane.selector.is_none());
        assert!(pane.selector(&AppState::new(None)).is_none());
    }

    #[test]
    fn resize_rescales_existing_selector() {
        let mut pane = SelectionPane::new(SelectorMode::Pane, Alignment::TopLeft, 1);
        assert!(!pane.set_target(DisplaySize::new(600.0, 600.0)));

        let state = AppState::new(shot(3000, 2000));
        assert!(pane.selector(&state).expect("selector").pointer_down(WidgetPoint::new(10.0, 10.0)));
        assert!(pane.set_target(DisplaySize::new(300.0, 300.0)));

        let selector = pane.selector.as_ref().expect("selector kept");
        assert!(!selector.is_dragging());
        assert_eq!(selector.display_area().map(|a| a.size), Some(DisplaySize::new(300.0, 200.0)));
    }
}
