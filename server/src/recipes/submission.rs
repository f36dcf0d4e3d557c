use crate::forms::{
    Choice, FormData, FormErrors, FormSet, FormSetView, FormView, IngredientFields,
    IngredientForm, InstructionFields, InstructionForm, RecipeFields, RecipeForm, RowForm,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::save::SaveError;

pub const INGREDIENTS_PREFIX: &str = "ingredients";
pub const INSTRUCTIONS_PREFIX: &str = "instructions";

/// Everything needed to render the create page: the recipe form, both formsets and the
/// choice lists for the select boxes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeCreatePage {
    pub form: FormView,
    pub ingredient_formset: FormSetView,
    pub instruction_formset: FormSetView,
    pub difficulty_choices: Vec<Choice>,
    pub unit_choices: Vec<Choice>,
}

impl RecipeCreatePage {
    pub fn blank() -> Self {
        Self {
            form: RecipeForm::initial(),
            ingredient_formset: FormSet::<IngredientForm>::blank(INGREDIENTS_PREFIX),
            instruction_formset: FormSet::<InstructionForm>::blank(INSTRUCTIONS_PREFIX),
            difficulty_choices: RecipeForm::difficulty_choices(),
            unit_choices: IngredientForm::unit_choices(),
        }
    }
}

/// Cleaned values of a valid submission, ready to persist.
pub struct CleanedRecipe<'a> {
    pub recipe: &'a RecipeFields,
    pub ingredients: Vec<&'a IngredientFields>,
    pub instructions: Vec<&'a InstructionFields>,
}

/// A recipe with its ingredient and instruction rows, bound and validated together.
pub struct RecipeSubmission {
    data: FormData,
    recipe: Result<RecipeFields, FormErrors>,
    ingredients: FormSet<IngredientForm>,
    instructions: FormSet<InstructionForm>,
}

impl RecipeSubmission {
    /// All three parts are always validated so every error is reported at once.
    pub fn bind(data: FormData) -> Self {
        let recipe = RecipeForm::clean(&data);
        let ingredients = FormSet::bind(&data, INGREDIENTS_PREFIX);
        let instructions = FormSet::bind(&data, INSTRUCTIONS_PREFIX);

        Self {
            data,
            recipe,
            ingredients,
            instructions,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.recipe.is_ok() && self.ingredients.is_valid() && self.instructions.is_valid()
    }

    pub fn cleaned(&self) -> Option<CleanedRecipe<'_>> {
        if !self.is_valid() {
            return None;
        }
        let recipe = self.recipe.as_ref().ok()?;

        Some(CleanedRecipe {
            recipe,
            ingredients: self.ingredients.cleaned_rows().collect(),
            instructions: self.instructions.cleaned_rows().collect(),
        })
    }

    /// Attach a storage-level conflict to the collection that caused it.
    pub fn reject(&mut self, error: &SaveError) {
        match error {
            SaveError::DuplicateIngredient => self
                .ingredients
                .add_non_form_error(IngredientForm::STORAGE_CONFLICT),
            SaveError::DuplicateInstruction => self
                .instructions
                .add_non_form_error(InstructionForm::STORAGE_CONFLICT),
            SaveError::Database(_) => {}
        }
    }

    /// The submitted values and all errors, for re-rendering.
    pub fn page(&self) -> RecipeCreatePage {
        let errors = match &self.recipe {
            Ok(_) => FormErrors::default(),
            Err(errors) => errors.clone(),
        };

        RecipeCreatePage {
            form: RecipeForm::view(&self.data, errors),
            ingredient_formset: self.ingredients.view(),
            instruction_formset: self.instructions.view(),
            difficulty_choices: RecipeForm::difficulty_choices(),
            unit_choices: IngredientForm::unit_choices(),
        }
    }
}
