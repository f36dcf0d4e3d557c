//! Prefixed, counted collections of row forms submitted alongside a parent form.
//!
//! A formset named `ingredients` is described by a management block
//! (`ingredients-TOTAL_FORMS`, `ingredients-INITIAL_FORMS`, and optionally
//! `ingredients-MIN_NUM_FORMS` / `ingredients-MAX_NUM_FORMS`) followed by rows
//! `ingredients-0-name`, `ingredients-1-name`, ... Any row may carry
//! `ingredients-<i>-DELETE` to drop it from the submission.
//!
//! Collection-level rules:
//! - at least [`MIN_NUM_FORMS`] rows must remain once deleted rows are removed
//! - no more than [`MAX_NUM_FORMS`] rows are accepted
//! - the form's [`RowForm::UNIQUE_FIELD`] must not repeat among the remaining rows

use super::fields::checkbox;
use super::{FormData, FormErrors, FormView};
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

pub const MIN_NUM_FORMS: usize = 1;
pub const MAX_NUM_FORMS: usize = 1000;
pub const DELETE_FIELD: &str = "DELETE";

const TOTAL_FORMS: &str = "TOTAL_FORMS";
const INITIAL_FORMS: &str = "INITIAL_FORMS";

/// A form that can appear as one row of a [`FormSet`], or stand alone with no prefix.
pub trait RowForm {
    type Cleaned;

    const FIELDS: &'static [&'static str];

    /// Field whose value may appear at most once per parent record.
    const UNIQUE_FIELD: &'static str;

    /// Reported when storage rejects a row as a duplicate of an existing one.
    const STORAGE_CONFLICT: &'static str;

    fn clean(data: &FormData, prefix: Option<&str>) -> Result<Self::Cleaned, FormErrors>;

    fn unique_value(cleaned: &Self::Cleaned) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ManagementData {
    pub total_forms: usize,
    pub initial_forms: usize,
    pub min_num_forms: usize,
    pub max_num_forms: usize,
}

impl ManagementData {
    fn blank() -> Self {
        Self {
            total_forms: 1,
            initial_forms: 0,
            min_num_forms: MIN_NUM_FORMS,
            max_num_forms: MAX_NUM_FORMS,
        }
    }
}

struct Row<T> {
    view: FormView,
    deleted: bool,
    cleaned: Option<T>,
}

impl<T> Row<T> {
    fn is_valid(&self) -> bool {
        self.deleted || (self.cleaned.is_some() && self.view.errors.is_empty())
    }
}

/// A bound formset: every row cleaned, plus collection-level errors.
pub struct FormSet<F: RowForm> {
    prefix: String,
    management: Option<ManagementData>,
    rows: Vec<Row<F::Cleaned>>,
    non_form_errors: Vec<String>,
}

impl<F: RowForm> FormSet<F> {
    pub fn bind(data: &FormData, prefix: &str) -> Self {
        let mut formset = Self {
            prefix: prefix.to_string(),
            management: None,
            rows: Vec::new(),
            non_form_errors: Vec::new(),
        };

        let management = match formset.read_management(data) {
            Ok(management) => management,
            Err(message) => {
                formset.non_form_errors.push(message);
                return formset;
            }
        };
        formset.management = Some(management);

        let mut total = management.total_forms;
        if total > MAX_NUM_FORMS {
            formset
                .non_form_errors
                .push(format!("Please submit at most {MAX_NUM_FORMS} forms."));
            total = MAX_NUM_FORMS;
        }

        formset.rows = (0..total)
            .map(|index| bind_row::<F>(data, &format!("{prefix}-{index}")))
            .collect();

        let remaining = formset.rows.iter().filter(|row| !row.deleted).count();
        if remaining < MIN_NUM_FORMS {
            formset
                .non_form_errors
                .push(format!("Please submit at least {MIN_NUM_FORMS} form."));
        }

        formset.check_duplicates();
        formset
    }

    fn read_management(&self, data: &FormData) -> Result<ManagementData, String> {
        let read = |name: &str| -> Option<usize> {
            data.get(&format!("{}-{}", self.prefix, name))
                .and_then(|v| v.trim().parse().ok())
        };

        let total = read(TOTAL_FORMS);
        let initial = read(INITIAL_FORMS);

        match (total, initial) {
            (Some(total_forms), Some(initial_forms)) => Ok(ManagementData {
                total_forms,
                initial_forms,
                min_num_forms: read("MIN_NUM_FORMS").unwrap_or(MIN_NUM_FORMS),
                max_num_forms: read("MAX_NUM_FORMS").unwrap_or(MAX_NUM_FORMS),
            }),
            _ => {
                let missing: Vec<String> = [(TOTAL_FORMS, total), (INITIAL_FORMS, initial)]
                    .iter()
                    .filter(|(_, value)| value.is_none())
                    .map(|(name, _)| format!("{}-{}", self.prefix, name))
                    .collect();
                Err(format!(
                    "ManagementForm data is missing or has been tampered with. Missing fields: {}.",
                    missing.join(", ")
                ))
            }
        }
    }

    fn check_duplicates(&mut self) {
        let mut seen = HashSet::new();
        let mut found = false;

        for row in self.rows.iter_mut().filter(|r| !r.deleted && r.view.errors.is_empty()) {
            let Some(cleaned) = row.cleaned.as_ref() else {
                continue;
            };
            if !seen.insert(F::unique_value(cleaned)) {
                row.view
                    .errors
                    .add_non_field("Please correct the duplicate values below.");
                found = true;
            }
        }

        if found {
            self.non_form_errors.push(format!(
                "Please correct the duplicate data for recipe and {}, which must be unique.",
                F::UNIQUE_FIELD
            ));
        }
    }

    pub fn is_valid(&self) -> bool {
        self.non_form_errors.is_empty() && self.rows.iter().all(Row::is_valid)
    }

    /// Cleaned values of the rows that were not deleted, in submission order.
    pub fn cleaned_rows(&self) -> impl Iterator<Item = &F::Cleaned> {
        self.rows
            .iter()
            .filter(|row| !row.deleted)
            .filter_map(|row| row.cleaned.as_ref())
    }

    #[cfg(test)]
    pub fn non_form_errors(&self) -> &[String] {
        &self.non_form_errors
    }

    pub fn add_non_form_error(&mut self, message: impl Into<String>) {
        self.non_form_errors.push(message.into());
    }

    pub fn view(&self) -> FormSetView {
        FormSetView {
            prefix: self.prefix.clone(),
            management: self.management,
            forms: self.rows.iter().map(|row| row.view.clone()).collect(),
            non_form_errors: self.non_form_errors.clone(),
        }
    }

    /// The unbound formset: one empty row.
    pub fn blank(prefix: &str) -> FormSetView {
        FormSetView {
            prefix: prefix.to_string(),
            management: Some(ManagementData::blank()),
            forms: vec![FormView::default()],
            non_form_errors: Vec::new(),
        }
    }
}

fn bind_row<F: RowForm>(data: &FormData, row_prefix: &str) -> Row<F::Cleaned> {
    let mut echoed = data.echo(Some(row_prefix), F::FIELDS);
    let delete_raw = data.get(&format!("{row_prefix}-{DELETE_FIELD}"));
    if let Some(raw) = delete_raw {
        echoed.insert(DELETE_FIELD.to_string(), raw.to_string());
    }

    let deleted = checkbox(delete_raw);
    let (cleaned, errors) = if deleted {
        (None, FormErrors::default())
    } else {
        match F::clean(data, Some(row_prefix)) {
            Ok(cleaned) => (Some(cleaned), FormErrors::default()),
            Err(errors) => (None, errors),
        }
    };

    Row {
        view: FormView {
            data: echoed,
            errors,
        },
        deleted,
        cleaned,
    }
}

/// A formset as sent back to the client.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormSetView {
    pub prefix: String,
    pub management: Option<ManagementData>,
    pub forms: Vec<FormView>,
    pub non_form_errors: Vec<String>,
}
