//! Creating a recipe together with its ingredients and instructions as one unit.

mod save;
mod submission;

pub use save::{save_recipe, SaveError};
pub use submission::{CleanedRecipe, RecipeCreatePage, RecipeSubmission};

/// Queued for the author once a recipe is stored.
pub const RECIPE_CREATED: &str = "Recipe created!";
