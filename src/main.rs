#![windows_subsystem = "windows"]

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use druid::AppLauncher;
use log::info;
use rfd::MessageDialog;

mod app;
mod capture;
mod config;
mod extract;
mod geometry;
mod mapper;
mod ocr;
mod scaler;
mod selection;
mod widget;

use app::{AppState, Delegate};
use capture::{CaptureSource, ScreenCapture};
use config::{Cli, Config};
use geometry::PixelSize;
use ocr::TesseractRecognizer;
use selection::SelectorMode;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().apply_cli(Cli::parse());
    info!("starting in {} mode, OCR language '{}'", config.mode, config.ocr.language);

    let capture: Arc<dyn CaptureSource> = Arc::new(ScreenCapture);
    let recognizer = Arc::new(TesseractRecognizer::new(config.ocr.clone()));

    let (window, init) = match config.mode {
        SelectorMode::Pane => (app::main_window(&config), AppState::new(None)),
        SelectorMode::Overlay => {
            // grab the screen before any window of ours is on it
            let shot = match capture.capture_full_screen() {
                Ok(shot) => shot,
                Err(e) => {
                    MessageDialog::new().set_title("Rivera").set_description(format!("Screen capture failed: {e}")).show();
                    return Err(e.into());
                }
            };
            let window = app::overlay_window(&config, PixelSize::of(&shot));
            (window, AppState::new(Some(Arc::new(shot))))
        }
    };

    let launcher = AppLauncher::with_window(window);
    let delegate = Delegate::new(config, capture, recognizer, launcher.get_external_handle());
    launcher.delegate(delegate).launch(init)?;
    Ok(())
}
