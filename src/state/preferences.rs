//! Topic categories and display-mode flags.
//!
//! Categories are a full-replace set (order irrelevant, any string accepted;
//! the server does no validation either). Dark mode is a plain flag; applying
//! the global "dark" marker is the presentation layer's job, which observes
//! the value through the state container.
use serde::{Deserialize, Serialize};

/// User preferences independent of favorites, co-persisted with them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferencesState {
    categories: Vec<String>,
    dark_mode: bool,
}

impl PreferencesState {
    /// Empty categories, light mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(categories: Vec<String>, dark_mode: bool) -> Self {
        Self {
            categories,
            dark_mode,
        }
    }

    /// Full replace. Any strings are accepted; no validation against a known
    /// category list.
    pub fn set_categories(&mut self, categories: Vec<String>) {
        self.categories = categories;
    }

    /// Flip dark mode, returning the new value.
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    /// Absolute set.
    pub fn set_dark_mode(&mut self, on: bool) {
        self.dark_mode = on;
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }
}
