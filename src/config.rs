// src/config.rs

use std::env;
use std::str::FromStr;

use clap::Parser;
use log::warn;

use crate::ocr::OcrSettings;
use crate::scaler::Alignment;
use crate::selection::SelectorMode;

#[derive(Debug, Parser)]
#[command(name = "rivera", version, about = "Snip a region of the screen and extract its text")]
pub struct Cli {
    /// `pane` shows a preview next to the text, `overlay` selects directly on the screen
    #[arg(long)]
    pub mode: Option<SelectorMode>,

    /// Tesseract language(s), e.g. `eng` or `deu+eng`
    #[arg(long)]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: SelectorMode,
    pub alignment: Alignment,
    /// Initial window size in pane mode.
    pub window_width: f64,
    pub window_height: f64,
    /// Smallest selection, in source pixels, that is sent to OCR.
    pub min_selection: u32,
    pub ocr: OcrSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: SelectorMode::Pane,
            alignment: Alignment::Center,
            window_width: 1000.0,
            window_height: 600.0,
            min_selection: 1,
            ocr: OcrSettings::default(),
        }
    }
}

impl Config {
    /// Reads `RIVERA_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        Config {
            mode: parse_var(&lookup, "RIVERA_MODE").unwrap_or(defaults.mode),
            alignment: lookup("RIVERA_ALIGN")
                .and_then(|raw| parse_alignment(&raw))
                .unwrap_or(defaults.alignment),
            window_width: parse_var(&lookup, "RIVERA_WINDOW_WIDTH")
                .filter(|w: &f64| *w > 0.0)
                .unwrap_or(defaults.window_width),
            window_height: parse_var(&lookup, "RIVERA_WINDOW_HEIGHT")
                .filter(|h: &f64| *h > 0.0)
                .unwrap_or(defaults.window_height),
            min_selection: parse_var(&lookup, "RIVERA_MIN_SELECTION").unwrap_or(defaults.min_selection),
            ocr: OcrSettings {
                language: lookup("RIVERA_OCR_LANG")
                    .filter(|l| !l.trim().is_empty())
                    .unwrap_or(defaults.ocr.language),
                dpi: parse_var(&lookup, "RIVERA_OCR_DPI"),
                psm: parse_var(&lookup, "RIVERA_OCR_PSM"),
                oem: parse_var(&lookup, "RIVERA_OCR_OEM"),
            },
        }
    }

    /// Command-line flags win over the environment.
    pub fn apply_cli(mut self, cli: Cli) -> Self {
        if let Some(mode) = cli.mode {
            self.mode = mode;
        }
        if let Some(lang) = cli.lang {
            self.ocr.language = lang;
        }
        self
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        warn!("ignoring {key}={raw:?}: not a valid value");
    }
    parsed
}

fn parse_alignment(raw: &str) -> Option<Alignment> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "center" | "centre" => Some(Alignment::Center),
        "top-left" | "topleft" | "left" => Some(Alignment::TopLeft),
        other => {
            warn!("ignoring RIVERA_ALIGN={other:?}: expected 'center' or 'top-left'");
            None
        }
    }
}
