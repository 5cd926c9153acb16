//! Configuration editor.
//!
//! The editor moves a `Configuration` in and out of an editing surface
//! (`ConfigForm`) and decides whether what is on the form may be accepted.
//! The only rule with teeth is identifier uniqueness: the host counts how
//! often an identifier is used across the workflow, and the editor compares
//! that count against the identifier it last loaded or read.

use tracing::{debug, info};

use crate::domain::{ConfigKey, Configuration};

pub mod form;

pub use form::*;

/// Counts identifier usage across the enclosing workflow.
pub trait IdentifierRegistry {
    fn identifier_occurs_count(&self, identifier: &str) -> usize;
}

impl<T: IdentifierRegistry + ?Sized> IdentifierRegistry for &T {
    fn identifier_occurs_count(&self, identifier: &str) -> usize {
        (**self).identifier_occurs_count(identifier)
    }
}

/// How `validate` judges a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// The identifier must not be used by any other step.
    #[default]
    UniqueIdentifier,
    /// Every configuration is valid.
    AlwaysValid,
}

/// How an editing session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Accepted,
    Rejected,
}

pub struct ConfigEditor<F, R> {
    form: F,
    registry: R,
    policy: ValidationPolicy,
    previous_identifier: String,
}

impl<F: ConfigForm, R: IdentifierRegistry> ConfigEditor<F, R> {
    pub fn new(form: F, registry: R) -> Self {
        Self::with_policy(form, registry, ValidationPolicy::default())
    }

    pub fn with_policy(form: F, registry: R, policy: ValidationPolicy) -> Self {
        Self {
            form,
            registry,
            policy,
            previous_identifier: String::new(),
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn into_form(self) -> F {
        self.form
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Identifier the uniqueness check compares against.
    pub fn previous_identifier(&self) -> &str {
        &self.previous_identifier
    }

    /// Push every value onto the form and take its identifier as the baseline.
    pub fn load(&mut self, config: &Configuration) {
        self.previous_identifier = config.identifier().to_string();
        for (key, value) in config.iter() {
            self.form.set_text(key, value);
        }
        debug!(identifier = %self.previous_identifier, "loaded configuration into editor");
    }

    /// Recompute validity, update the identifier highlight and the accept gate.
    pub fn validate(&mut self) -> bool {
        let valid = match self.policy {
            ValidationPolicy::AlwaysValid => true,
            ValidationPolicy::UniqueIdentifier => {
                let identifier = self.form.text(ConfigKey::Identifier);
                let count = self.registry.identifier_occurs_count(&identifier);
                count == 0 || (count == 1 && identifier == self.previous_identifier)
            }
        };

        let state = if valid { FieldState::Valid } else { FieldState::Invalid };
        self.form.mark_field(ConfigKey::Identifier, state);
        self.form.set_accept_enabled(valid);
        valid
    }

    /// Confirm action. An invalid configuration needs an explicit "yes".
    pub fn accept(&mut self) -> DialogOutcome {
        if self.validate() || self.form.confirm_invalid_save() {
            info!("configuration accepted");
            DialogOutcome::Accepted
        } else {
            info!("saving invalid configuration declined");
            DialogOutcome::Rejected
        }
    }

    /// Snapshot the form and move the baseline to the extracted identifier.
    pub fn read(&mut self) -> Configuration {
        let config = Configuration::from_fn(|key| self.form.text(key));
        self.previous_identifier = config.identifier().to_string();
        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::defaults;

    #[derive(Default)]
    struct Counts(HashMap<String, usize>);

    impl Counts {
        fn with(pairs: &[(&str, usize)]) -> Self {
            Self(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
        }
    }

    impl IdentifierRegistry for Counts {
        fn identifier_occurs_count(&self, identifier: &str) -> usize {
            self.0.get(identifier).copied().unwrap_or(0)
        }
    }

    fn config_with_id(id: &str) -> Configuration {
        let mut config = defaults();
        config.set(ConfigKey::Identifier, id);
        config
    }

    #[test]
    fn unused_identifier_is_valid_regardless_of_text() {
        let mut editor = ConfigEditor::new(FieldForm::new(), Counts::default());
        editor.load(&config_with_id("fit"));
        editor.form_mut().set_text(ConfigKey::Identifier, "anything");
        assert!(editor.validate());
        assert_eq!(editor.form().field_state(ConfigKey::Identifier), FieldState::Valid);
        assert!(editor.form().accept_enabled());
    }

    #[test]
    fn single_occurrence_is_valid_only_for_own_identifier() {
        let registry = Counts::with(&[("fit", 1), ("other", 1)]);
        let mut editor = ConfigEditor::new(FieldForm::new(), &registry);
        editor.load(&config_with_id("fit"));
        assert!(editor.validate());

        editor.form_mut().set_text(ConfigKey::Identifier, "other");
        assert!(!editor.validate());
        assert_eq!(editor.form().field_state(ConfigKey::Identifier), FieldState::Invalid);
        assert!(!editor.form().accept_enabled());

        editor.form_mut().set_text(ConfigKey::Identifier, "fit");
        assert!(editor.validate());
        assert_eq!(editor.form().field_state(ConfigKey::Identifier), FieldState::Valid);
    }

    #[test]
    fn duplicated_identifier_is_invalid() {
        let registry = Counts::with(&[("fit", 2)]);
        let mut editor = ConfigEditor::new(FieldForm::new(), &registry);
        editor.load(&config_with_id("fit"));
        assert!(!editor.validate());
    }

    #[test]
    fn always_valid_policy_skips_registry() {
        let registry = Counts::with(&[("fit", 5)]);
        let mut editor =
            ConfigEditor::with_policy(FieldForm::new(), &registry, ValidationPolicy::AlwaysValid);
        editor.load(&config_with_id("fit"));
        assert!(editor.validate());
    }

    #[test]
    fn accept_asks_before_saving_invalid_config() {
        let registry = Counts::with(&[("taken", 1)]);
        let mut editor = ConfigEditor::new(FieldForm::new(), &registry);
        editor.load(&config_with_id("mine"));
        editor.form_mut().set_text(ConfigKey::Identifier, "taken");

        assert_eq!(editor.accept(), DialogOutcome::Rejected);
        assert_eq!(editor.form().confirmations, 1);

        editor.form_mut().confirm_answer = true;
        assert_eq!(editor.accept(), DialogOutcome::Accepted);
        assert_eq!(editor.form().confirmations, 2);
    }

    #[test]
    fn accept_valid_config_without_prompt() {
        let mut editor = ConfigEditor::new(FieldForm::new(), Counts::default());
        editor.load(&defaults());
        assert_eq!(editor.accept(), DialogOutcome::Accepted);
        assert_eq!(editor.form().confirmations, 0);
    }

    #[test]
    fn read_moves_baseline() {
        let registry = Counts::with(&[("renamed", 1)]);
        let mut editor = ConfigEditor::new(FieldForm::new(), &registry);
        editor.load(&config_with_id("fit"));
        editor.form_mut().set_text(ConfigKey::Identifier, "renamed");
        assert!(!editor.validate());

        let config = editor.read();
        assert_eq!(config.identifier(), "renamed");
        assert_eq!(editor.previous_identifier(), "renamed");
        assert!(editor.validate());
    }

    #[test]
    fn load_read_round_trip_is_stable() {
        let mut config = defaults();
        config.set(ConfigKey::Identifier, "femur");
        config.set(ConfigKey::FixedNodes, "1,5-7");
        config.set(ConfigKey::KdtreeArgs, "{'leafsize': 8}");

        let mut editor = ConfigEditor::new(FieldForm::new(), Counts::default());
        editor.load(&config);
        let first = editor.read();
        editor.load(&first);
        let second = editor.read();

        assert_eq!(first, config);
        assert_eq!(second, config);
    }
}
