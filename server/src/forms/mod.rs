//! Form binding and validation for submitted `application/x-www-form-urlencoded` data.
//!
//! Every form works on the raw string values of a submission ([`FormData`]) and produces
//! either cleaned, typed values or a [`FormErrors`] map keyed by field name. The
//! [`FormView`] returned to clients echoes what was submitted alongside the errors so a
//! page can be re-rendered without losing input.

pub mod fields;
pub mod formset;
pub mod ingredient;
pub mod instruction;
pub mod recipe;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

pub use formset::{FormSet, FormSetView, RowForm};
pub use ingredient::{IngredientFields, IngredientForm};
pub use instruction::{InstructionFields, InstructionForm};
pub use recipe::{RecipeFields, RecipeForm};

/// Key under which errors that belong to no single field are collected.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Raw submitted values, keyed by (possibly prefixed) field name.
#[derive(Debug, Clone, Default)]
pub struct FormData(HashMap<String, String>);

impl FormData {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Values of `fields` under `prefix`, keyed by the unprefixed field name.
    pub fn echo(&self, prefix: Option<&str>, fields: &[&str]) -> BTreeMap<String, String> {
        fields
            .iter()
            .filter_map(|field| {
                self.get(&field_key(prefix, field))
                    .map(|value| (field.to_string(), value.to_string()))
            })
            .collect()
    }
}

impl From<HashMap<String, String>> for FormData {
    fn from(values: HashMap<String, String>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FormData {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// `title` for a bare form, `ingredients-0-name` for a formset row.
pub fn field_key(prefix: Option<&str>, field: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}-{field}"),
        None => field.to_string(),
    }
}

/// Validation messages grouped by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    #[cfg(test)]
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    /// Record the outcome of cleaning one field, returning the value if it was valid.
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }
}

/// A single form as sent back to the client: submitted values plus any errors.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct FormView {
    pub data: BTreeMap<String, String>,
    pub errors: FormErrors,
}

/// One selectable value of a choice field.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_key() {
        assert_eq!(field_key(None, "title"), "title");
        assert_eq!(field_key(Some("ingredients-0"), "name"), "ingredients-0-name");
    }

    #[test]
    fn test_echo_only_returns_submitted_fields() {
        let data = FormData::from([
            ("ingredients-0-name", "Rice"),
            ("ingredients-0-unit", ""),
            ("title", "ignored"),
        ]);
        let echoed = data.echo(Some("ingredients-0"), &["name", "quantity", "unit"]);
        assert_eq!(echoed.len(), 2);
        assert_eq!(echoed["name"], "Rice");
        assert_eq!(echoed["unit"], "");
    }

    #[test]
    fn test_form_errors_collects_messages() {
        let mut errors = FormErrors::default();
        assert!(errors.is_empty());

        assert_eq!(errors.check::<i32>("step", Err("bad".to_string())), None);
        assert_eq!(errors.check("title", Ok("Soup")), Some("Soup"));
        errors.add_non_field("whole form is wrong");

        assert!(errors.has("step"));
        assert!(!errors.has("title"));
        assert_eq!(errors.get(NON_FIELD_ERRORS), ["whole form is wrong"]);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"__all__": ["whole form is wrong"], "step": ["bad"]})
        );
    }
}
