use crossterm::event::{Event, KeyEvent};
use unicode_width::UnicodeWidthStr;

use tui_input::{backend::crossterm::EventHandler, Input};

/// The filter line under the menu: a fixed prompt followed by what the user
/// has typed so far.
pub(crate) struct FilterInput {
    input: Input,
    prompt: &'static str,
}

impl FilterInput {
    pub fn new(prompt: &'static str) -> Self {
        Self {
            input: Input::default(),
            prompt,
        }
    }

    pub(crate) fn pattern(&self) -> &str {
        self.input.value()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    pub(crate) fn line(&self) -> String {
        format!("{}{}", self.prompt, self.input.value())
    }

    pub(crate) fn visual_cursor(&self) -> usize {
        UnicodeWidthStr::width(self.prompt) + self.input.visual_cursor()
    }

    pub(crate) fn reset(&mut self) {
        self.input.reset();
    }

    /// Returns true if the pattern changed.
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.input
            .handle_event(&Event::Key(key))
            .map_or(false, |change| change.value)
    }
}
