use crate::db::is_unique_violation;
use crate::models::{NewIngredient, NewInstruction, NewRecipe, Recipe};
use crate::schema::{ingredients, instructions, recipes};
use diesel::prelude::*;
use thiserror::Error;
use uuid::Uuid;

use super::submission::CleanedRecipe;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("an ingredient with this name already exists on the recipe")]
    DuplicateIngredient,

    #[error("an instruction with this step already exists on the recipe")]
    DuplicateInstruction,

    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

/// Insert the recipe, then its ingredients in submission order, then its instructions.
/// Runs in one transaction: on any error nothing is kept.
pub fn save_recipe(
    conn: &mut PgConnection,
    author_id: Uuid,
    cleaned: &CleanedRecipe<'_>,
) -> Result<Recipe, SaveError> {
    conn.transaction(|conn| {
        let fields = cleaned.recipe;
        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(NewRecipe {
                author_id,
                title: &fields.title,
                description: &fields.description,
                difficulty: fields.difficulty.as_i32(),
                image: fields.image.as_deref(),
                time: fields.time,
            })
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        let new_ingredients: Vec<NewIngredient> = cleaned
            .ingredients
            .iter()
            .zip(0..)
            .map(|(ingredient, position)| NewIngredient {
                recipe_id: recipe.id,
                name: &ingredient.name,
                quantity: ingredient.quantity,
                unit: &ingredient.unit,
                position,
            })
            .collect();

        if !new_ingredients.is_empty() {
            diesel::insert_into(ingredients::table)
                .values(&new_ingredients)
                .execute(conn)
                .map_err(|e| conflict_or(e, SaveError::DuplicateIngredient))?;
        }

        let new_instructions: Vec<NewInstruction> = cleaned
            .instructions
            .iter()
            .map(|instruction| NewInstruction {
                recipe_id: Some(recipe.id),
                step: instruction.step,
                description: &instruction.description,
                image: instruction.image.as_deref(),
            })
            .collect();

        if !new_instructions.is_empty() {
            diesel::insert_into(instructions::table)
                .values(&new_instructions)
                .execute(conn)
                .map_err(|e| conflict_or(e, SaveError::DuplicateInstruction))?;
        }

        Ok(recipe)
    })
}

fn conflict_or(error: diesel::result::Error, conflict: SaveError) -> SaveError {
    if is_unique_violation(&error) {
        conflict
    } else {
        SaveError::Database(error)
    }
}
