//! Declarative field rules: required/optional, length bounds, integer parsing, choice sets.
//!
//! Each `clean` takes the raw submitted value (`None` when the key was absent) and returns
//! the cleaned value or a single user-facing message.

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_INTEGER: &str = "Enter a whole number.";

/// Text input. Surrounding whitespace is stripped before any other check.
#[derive(Debug, Clone, Copy)]
pub struct CharField {
    pub required: bool,
    pub max_length: Option<usize>,
}

impl CharField {
    pub const fn required(max_length: usize) -> Self {
        Self {
            required: true,
            max_length: Some(max_length),
        }
    }

    pub const fn optional(max_length: Option<usize>) -> Self {
        Self {
            required: false,
            max_length,
        }
    }

    /// Blank optional values clean to an empty string.
    pub fn clean(&self, raw: Option<&str>) -> Result<String, String> {
        let value = raw.map(str::trim).unwrap_or_default();

        if value.is_empty() {
            return if self.required {
                Err(REQUIRED.to_string())
            } else {
                Ok(String::new())
            };
        }

        if let Some(max) = self.max_length {
            let length = value.chars().count();
            if length > max {
                return Err(format!(
                    "Ensure this value has at most {max} characters (it has {length})."
                ));
            }
        }

        Ok(value.to_string())
    }
}

/// Whole-number input stored in a 32-bit column.
#[derive(Debug, Clone, Copy)]
pub struct IntegerField {
    pub required: bool,
}

impl IntegerField {
    pub const fn required() -> Self {
        Self { required: true }
    }

    pub const fn optional() -> Self {
        Self { required: false }
    }

    /// Accepts `"7"`, `" 7 "` and `"7.0"`; blank optional input cleans to `None`.
    pub fn clean(&self, raw: Option<&str>) -> Result<Option<i32>, String> {
        let value = raw.map(str::trim).unwrap_or_default();

        if value.is_empty() {
            return if self.required {
                Err(REQUIRED.to_string())
            } else {
                Ok(None)
            };
        }

        let parsed: i64 = strip_zero_fraction(value)
            .parse()
            .map_err(|_| INVALID_INTEGER.to_string())?;

        if parsed > i64::from(i32::MAX) {
            return Err(format!(
                "Ensure this value is less than or equal to {}.",
                i32::MAX
            ));
        }
        if parsed < i64::from(i32::MIN) {
            return Err(format!(
                "Ensure this value is greater than or equal to {}.",
                i32::MIN
            ));
        }

        Ok(Some(parsed as i32))
    }
}

/// "12.000" -> "12"; anything else is returned unchanged.
fn strip_zero_fraction(value: &str) -> &str {
    match value.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        _ => value,
    }
}

/// Input restricted to a fixed set of values. An empty value is only accepted when the
/// field is optional.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceField {
    pub required: bool,
    pub choices: &'static [(&'static str, &'static str)],
}

impl ChoiceField {
    pub fn clean(&self, raw: Option<&str>) -> Result<String, String> {
        let value = raw.map(str::trim).unwrap_or_default();

        if value.is_empty() {
            return if self.required {
                Err(REQUIRED.to_string())
            } else {
                Ok(String::new())
            };
        }

        if self.choices.iter().any(|(choice, _)| *choice == value) {
            Ok(value.to_string())
        } else {
            Err(invalid_choice(value))
        }
    }
}

pub fn invalid_choice(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

/// Checkbox semantics: missing, empty and "false" are unchecked, anything else is checked.
pub fn checkbox(raw: Option<&str>) -> bool {
    match raw {
        None => false,
        Some(value) => !value.is_empty() && !value.eq_ignore_ascii_case("false"),
    }
}
