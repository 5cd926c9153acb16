//! Editing surfaces the config editor can drive.

use crate::domain::{ConfigKey, Configuration};

/// Visual validity of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Valid,
    Invalid,
}

/// A form with one text field per configuration key plus an accept gate.
pub trait ConfigForm {
    fn set_text(&mut self, key: ConfigKey, value: &str);

    fn text(&self, key: ConfigKey) -> String;

    /// Highlight (or clear the highlight of) a field.
    fn mark_field(&mut self, key: ConfigKey, state: FieldState);

    fn set_accept_enabled(&mut self, enabled: bool);

    /// Ask whether an invalid configuration should be saved anyway.
    fn confirm_invalid_save(&mut self) -> bool;
}

/// In-memory form for headless hosts and tests.
#[derive(Debug, Clone)]
pub struct FieldForm {
    values: Configuration,
    states: [FieldState; ConfigKey::COUNT],
    accept_enabled: bool,
    /// Answer given to `confirm_invalid_save`.
    pub confirm_answer: bool,
    /// How many times a confirmation was requested.
    pub confirmations: usize,
}

impl FieldForm {
    pub fn new() -> Self {
        Self {
            values: Configuration::from_fn(|_| String::new()),
            states: [FieldState::Valid; ConfigKey::COUNT],
            accept_enabled: true,
            confirm_answer: false,
            confirmations: 0,
        }
    }

    pub fn field_state(&self, key: ConfigKey) -> FieldState {
        self.states[key.index()]
    }

    pub fn accept_enabled(&self) -> bool {
        self.accept_enabled
    }
}

impl Default for FieldForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigForm for FieldForm {
    fn set_text(&mut self, key: ConfigKey, value: &str) {
        self.values.set(key, value);
    }

    fn text(&self, key: ConfigKey) -> String {
        self.values.get(key).to_string()
    }

    fn mark_field(&mut self, key: ConfigKey, state: FieldState) {
        self.states[key.index()] = state;
    }

    fn set_accept_enabled(&mut self, enabled: bool) {
        self.accept_enabled = enabled;
    }

    fn confirm_invalid_save(&mut self) -> bool {
        self.confirmations += 1;
        self.confirm_answer
    }
}
