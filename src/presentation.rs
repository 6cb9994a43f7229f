use crate::constants::{
    COPY_FAILED_MESSAGE, COPY_OK_MESSAGE, NOTHING_TO_COPY_MESSAGE, STATUS_VISIBLE_MS,
};
use crate::errors::AppError;
use crate::util::escape_markup;
use arboard::Clipboard;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const LINE_BREAK: &str = "<br>";

/// Destination for the copy action.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), String>;
}

/// The OS clipboard. A fresh handle is opened per write.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        let mut clipboard = Clipboard::new().map_err(|e| e.to_string())?;
        clipboard.set_text(text.to_string()).map_err(|e| e.to_string())
    }
}

/// Keeps the last copied text in memory; used headless and in tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    fail_with: Option<String>,
}

impl MemoryClipboard {
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            contents: None,
            fail_with: Some(reason.into()),
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        if let Some(reason) = &self.fail_with {
            return Err(reason.clone());
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// A single transient message. Showing a new one replaces the old one and
/// restarts the visibility window.
#[derive(Debug, Clone)]
pub struct StatusBar {
    message: Option<String>,
    shown_at: Option<Instant>,
    visible_for: Duration,
    revision: u64,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::with_duration(Duration::from_millis(STATUS_VISIBLE_MS))
    }
}

impl StatusBar {
    pub fn with_duration(visible_for: Duration) -> Self {
        Self {
            message: None,
            shown_at: None,
            visible_for,
            revision: 0,
        }
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.show_at(message, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, at: Instant) {
        self.message = Some(message.into());
        self.shown_at = Some(at);
        self.revision += 1;
    }

    pub fn visible_at(&self, now: Instant) -> Option<&str> {
        let shown_at = self.shown_at?;
        if now.saturating_duration_since(shown_at) < self.visible_for {
            self.message.as_deref()
        } else {
            None
        }
    }

    pub fn visible(&self) -> Option<&str> {
        self.visible_at(Instant::now())
    }

    /// Bumped on every `show`, so a host can tell whether a new message arrived.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Output area, copy action and status line.
#[derive(Debug, Default)]
pub struct Presentation<C: ClipboardSink = SystemClipboard> {
    markup: String,
    text: String,
    copy_visible: bool,
    status: StatusBar,
    clipboard: C,
}

impl<C: ClipboardSink> Presentation<C> {
    pub fn new(clipboard: C) -> Self {
        Self {
            markup: String::new(),
            text: String::new(),
            copy_visible: false,
            status: StatusBar::default(),
            clipboard,
        }
    }

    /// Replaces the output. Every newline becomes a visual break, so a
    /// paragraph marker (`\n\n`) shows as two.
    pub fn render(&mut self, text: &str) {
        self.markup = escape_markup(text).replace('\n', LINE_BREAK);
        self.text = text.to_string();
        self.copy_visible = true;
        info!("Rendered {} characters", text.chars().count());
    }

    pub fn copy(&mut self) -> Result<(), AppError> {
        if !self.copy_visible {
            self.show_status(NOTHING_TO_COPY_MESSAGE);
            return Err(AppError::Clipboard(NOTHING_TO_COPY_MESSAGE.to_string()));
        }
        match self.clipboard.write_text(&self.text) {
            Ok(()) => {
                self.show_status(COPY_OK_MESSAGE);
                Ok(())
            }
            Err(err) => {
                warn!("Clipboard write failed: {}", err);
                self.show_status(COPY_FAILED_MESSAGE);
                Err(AppError::Clipboard(err))
            }
        }
    }

    pub fn show_status(&mut self, message: impl Into<String>) {
        self.status.show(message);
    }

    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// The rendered output as plain text, break markers intact.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn copy_visible(&self) -> bool {
        self.copy_visible
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }
}
