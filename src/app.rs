// src/app.rs

use std::sync::Arc;
use std::thread;

use druid::widget::{Button, CrossAxisAlignment, Flex, Label, TextBox};
use druid::{
    AppDelegate, Command, Data, DelegateCtx, Env, ExtEventSink, Handled, Lens, Selector, Target, Widget,
    WidgetExt, WindowDesc, WindowId, commands,
};
use image::DynamicImage;
use log::{debug, info, warn};

use crate::capture::{CaptureError, CaptureSource};
use crate::config::Config;
use crate::extract::{Extraction, extract_text};
use crate::geometry::{PixelSize, SourceRect};
use crate::ocr::Recognizer;
use crate::selection::SelectorMode;
use crate::widget::SelectionPane;

pub const START_CAPTURE: Selector = Selector::new("rivera.start-capture");
pub const CAPTURE_FINISHED: Selector<Result<Arc<DynamicImage>, CaptureError>> =
    Selector::new("rivera.capture-finished");
pub const REGION_SELECTED: Selector<RegionSelection> = Selector::new("rivera.region-selected");
pub const TEXT_EXTRACTED: Selector<ExtractionDone> = Selector::new("rivera.text-extracted");

const IDLE_STATUS: &str = "Press \"Start Rivera\" to capture the screen.";
const SELECT_STATUS: &str = "Drag over the screenshot to select text.";

/// A finished gesture: the capture it was made on and where, in source pixels.
#[derive(Debug, Clone)]
pub struct RegionSelection {
    pub image: Arc<DynamicImage>,
    pub rect: SourceRect,
    pub window: WindowId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionDone {
    pub job: u64,
    pub result: Result<Extraction, String>,
}

#[derive(Clone, Data, Lens)]
pub struct AppState {
    /// The capture currently offered for selection. Replacing the `Arc`
    /// resets every selector showing it.
    pub screenshot: Option<Arc<DynamicImage>>,
    pub text: String,
    pub status: String,
    pub capturing: bool,
    /// Sequence number of the latest OCR request.
    pub job: u64,
}

impl AppState {
    pub fn new(screenshot: Option<Arc<DynamicImage>>) -> Self {
        let status = if screenshot.is_some() { SELECT_STATUS } else { IDLE_STATUS };
        AppState {
            screenshot,
            text: String::new(),
            status: status.to_string(),
            capturing: false,
            job: 0,
        }
    }

    /// Drops the previous capture before a new one is taken.
    pub fn begin_capture(&mut self) -> bool {
        if self.capturing {
            return false;
        }
        self.screenshot = None;
        self.capturing = true;
        self.status = "Capturing screen...".to_string();
        true
    }

    pub fn finish_capture(&mut self, result: &Result<Arc<DynamicImage>, CaptureError>) -> Option<Arc<DynamicImage>> {
        self.capturing = false;
        match result {
            Ok(image) => {
                self.screenshot = Some(Arc::clone(image));
                self.status = SELECT_STATUS.to_string();
                Some(Arc::clone(image))
            }
            Err(e) => {
                warn!("screen capture failed: {e}");
                self.status = format!("Capture failed: {e}");
                None
            }
        }
    }

    /// Registers a new OCR request; any request still running becomes stale.
    pub fn begin_extraction(&mut self, rect: SourceRect) -> u64 {
        self.job += 1;
        self.status = format!("Recognizing text in {rect}...");
        self.job
    }

    /// Applies an OCR result unless a newer request superseded it.
    pub fn finish_extraction(&mut self, done: &ExtractionDone) -> bool {
        if done.job != self.job {
            debug!("dropping stale OCR result for job {} (latest is {})", done.job, self.job);
            return false;
        }
        match &done.result {
            Ok(extraction) => {
                self.text = extraction.display_text().to_string();
                self.status = SELECT_STATUS.to_string();
            }
            Err(e) => {
                warn!("OCR failed: {e}");
                self.text = format!("Error: {e}");
                self.status = "OCR failed.".to_string();
            }
        }
        true
    }
}

pub struct Delegate {
    config: Config,
    capture: Arc<dyn CaptureSource>,
    recognizer: Arc<dyn Recognizer>,
    sink: ExtEventSink,
    results_window: Option<WindowId>,
}

impl Delegate {
    pub fn new(config: Config, capture: Arc<dyn CaptureSource>, recognizer: Arc<dyn Recognizer>, sink: ExtEventSink) -> Self {
        Delegate { config, capture, recognizer, sink, results_window: None }
    }

    fn spawn_capture(&self) {
        let capture = Arc::clone(&self.capture);
        let sink = self.sink.clone();
        thread::spawn(move || {
            let result = capture.capture_full_screen().map(Arc::new);
            if let Err(e) = sink.submit_command(CAPTURE_FINISHED, Box::new(result), Target::Auto) {
                warn!("could not deliver capture result: {e}");
            }
        });
    }

    fn spawn_extraction(&self, job: u64, selection: RegionSelection) {
        let recognizer = Arc::clone(&self.recognizer);
        let sink = self.sink.clone();
        thread::spawn(move || {
            let result = extract_text(&selection.image, selection.rect, recognizer.as_ref()).map_err(|e| e.to_string());
            if let Err(e) = sink.submit_command(TEXT_EXTRACTED, Box::new(ExtractionDone { job, result }), Target::Auto) {
                warn!("could not deliver OCR result: {e}");
            }
        });
    }

    fn show_results(&mut self, ctx: &mut DelegateCtx) {
        if self.results_window.is_some() {
            return;
        }
        let window = results_window();
        self.results_window = Some(window.id);
        ctx.new_window(window);
    }
}

impl AppDelegate<AppState> for Delegate {
    fn command(&mut self, ctx: &mut DelegateCtx, _target: Target, cmd: &Command, data: &mut AppState, _env: &Env) -> Handled {
        if cmd.is(START_CAPTURE) {
            if data.begin_capture() {
                self.spawn_capture();
            }
            return Handled::Yes;
        }

        if let Some(result) = cmd.get(CAPTURE_FINISHED) {
            if let Some(image) = data.finish_capture(result) {
                if self.config.mode == SelectorMode::Overlay {
                    ctx.new_window(overlay_window(&self.config, PixelSize::of(&image)));
                }
            }
            return Handled::Yes;
        }

        if let Some(selection) = cmd.get(REGION_SELECTED) {
            let size = PixelSize::of(&selection.image);
            info!("selected {} of {}x{} capture", selection.rect, size.width, size.height);
            let job = data.begin_extraction(selection.rect);
            self.spawn_extraction(job, selection.clone());

            if self.config.mode == SelectorMode::Overlay {
                self.show_results(ctx);
                ctx.submit_command(commands::CLOSE_WINDOW.to(selection.window));
            }
            return Handled::Yes;
        }

        if let Some(done) = cmd.get(TEXT_EXTRACTED) {
            data.finish_extraction(done);
            return Handled::Yes;
        }

        Handled::No
    }

    fn window_removed(&mut self, id: WindowId, _data: &mut AppState, _env: &Env, _ctx: &mut DelegateCtx) {
        if self.results_window == Some(id) {
            self.results_window = None;
        }
    }
}

/// Start button, status line and the extracted text.
fn text_column() -> impl Widget<AppState> {
    let start = Button::new("Start Rivera")
        .on_click(|ctx, _data: &mut AppState, _env| ctx.submit_command(START_CAPTURE))
        .disabled_if(|data: &AppState, _| data.capturing);
    let status = Label::dynamic(|data: &AppState, _| data.status.clone());
    let text = TextBox::multiline()
        .with_placeholder("Extracted text will appear here...")
        .lens(AppState::text)
        .expand();

    Flex::column()
        .cross_axis_alignment(CrossAxisAlignment::Fill)
        .with_child(start)
        .with_spacer(8.0)
        .with_child(status)
        .with_spacer(8.0)
        .with_flex_child(text, 1.0)
        .padding(10.0)
}

/// Text on the left, screenshot preview on the right.
pub fn main_window(config: &Config) -> WindowDesc<AppState> {
    let pane = SelectionPane::new(SelectorMode::Pane, config.alignment, config.min_selection);
    let root = Flex::row()
        .with_flex_child(text_column(), 1.0)
        .with_flex_child(pane, 1.0);

    WindowDesc::new(root)
        .title("Rivera")
        .window_size((config.window_width, config.window_height))
        .with_min_size((800.0, 500.0))
}

/// Borderless window covering the screen with the capture at 1:1.
pub fn overlay_window(config: &Config, size: PixelSize) -> WindowDesc<AppState> {
    let pane = SelectionPane::new(SelectorMode::Overlay, config.alignment, config.min_selection);
    WindowDesc::new(pane)
        .window_size((size.width as f64, size.height as f64))
        .set_position((0.0, 0.0))
        .show_titlebar(false)
        .resizable(false)
}

fn results_window() -> WindowDesc<AppState> {
    WindowDesc::new(text_column())
        .title("Rivera")
        .window_size((500.0, 400.0))
}
