//! Terminal busy indicator.
//!
//! A `Spinner` is a scoped resource: `indicatif` ticks it in the background
//! while the caller blocks, and it is finished with `ok()` / `fail()`.
//! Dropping it unfinished (early return, unwinding) still stops the ticker and
//! clears the line, so the terminal is never left mid-frame.

use std::io;
use std::time::Duration;

use crossterm::{style::Stylize, tty::IsTty};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Animation frames; the last entry is shown once the spinner is finished.
const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ";
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

pub const OK_GLYPH: &str = "✔";
pub const FAIL_GLYPH: &str = "✘";

pub struct Spinner {
    text: String,
    interactive: bool,
    bar: ProgressBar,
}

impl Spinner {
    /// Start animating `text`. Frames are only drawn when stdout is a terminal.
    pub fn start(text: impl Into<String>) -> Self {
        let text = text.into();
        let interactive = io::stdout().is_tty();

        let bar = if interactive {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
            bar.set_style(spinner_style());
            bar.set_message(text.clone());
            bar.enable_steady_tick(FRAME_INTERVAL);
            bar
        } else {
            ProgressBar::hidden()
        };

        Self { text, interactive, bar }
    }

    /// Finish with the success glyph.
    pub fn ok(self) {
        self.finish(OK_GLYPH, true);
    }

    /// Finish with the failure glyph.
    pub fn fail(self) {
        self.finish(FAIL_GLYPH, false);
    }

    fn finish(self, glyph: &str, success: bool) {
        if self.interactive {
            let glyph = if success { glyph.green() } else { glyph.red() };
            self.bar.set_style(finished_style());
            self.bar.finish_with_message(format!("{glyph}{}", self.text));
        } else {
            self.bar.finish();
            println!("{glyph}{}", self.text);
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.yellow}{msg:.yellow}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(TICK_CHARS)
}

fn finished_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}
