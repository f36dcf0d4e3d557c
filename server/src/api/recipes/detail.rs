use crate::api::ingredients::IngredientResponse;
use crate::api::instructions::InstructionResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::models::{Ingredient, Instruction, Recipe};
use crate::schema::{ingredients, instructions, recipes, users};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub difficulty: i32,
    /// "Easy", "Medium" or "Hard"
    pub difficulty_label: String,
    pub image: Option<String>,
    pub time: i32,
    /// Cooking time for display, e.g. "45 mins" or "1.5 hrs"
    pub display_time: String,
    pub author: AuthorSummary,
    pub created_at: DateTime<Utc>,
    pub ingredients: Vec<IngredientResponse>,
    pub instructions: Vec<InstructionResponse>,
}

#[utoipa::path(
    get,
    path = "/recipe/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeDetailResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetailResponse>, ApiError> {
    let mut conn = pool.get()?;
    Ok(Json(load_detail(&mut conn, id)?))
}

pub fn load_detail(conn: &mut PgConnection, id: Uuid) -> Result<RecipeDetailResponse, ApiError> {
    let (recipe, username): (Recipe, String) = recipes::table
        .inner_join(users::table)
        .filter(recipes::id.eq(id))
        .select((Recipe::as_select(), users::username))
        .first(conn)
        .optional()?
        .ok_or(ApiError::NotFound("Recipe"))?;

    let ingredient_rows: Vec<Ingredient> = ingredients::table
        .filter(ingredients::recipe_id.eq(id))
        .order((ingredients::position.asc(), ingredients::id.asc()))
        .select(Ingredient::as_select())
        .load(conn)?;

    let instruction_rows: Vec<Instruction> = instructions::table
        .filter(instructions::recipe_id.eq(id))
        .order((instructions::step.asc(), instructions::id.asc()))
        .select(Instruction::as_select())
        .load(conn)?;

    Ok(RecipeDetailResponse {
        id: recipe.id,
        difficulty_label: recipe
            .difficulty()
            .map(|d| d.label().to_string())
            .unwrap_or_default(),
        display_time: recipe.display_time(),
        author: AuthorSummary {
            id: recipe.author_id,
            username,
        },
        ingredients: ingredient_rows.iter().map(IngredientResponse::from).collect(),
        instructions: instruction_rows
            .iter()
            .map(|i| InstructionResponse::new(i, Some(&recipe.title)))
            .collect(),
        title: recipe.title,
        description: recipe.description,
        difficulty: recipe.difficulty,
        image: recipe.image,
        time: recipe.time,
        created_at: recipe.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_recipe, insert_user, test_connection};
    use crate::models::{NewIngredient, NewInstruction};

    #[test]
    fn test_detail_orders_children() {
        let Some(mut conn) = test_connection() else {
            return;
        };
        let user = insert_user(&mut conn, "@johndoe", false);
        let recipe = insert_recipe(&mut conn, user.id, "Pancakes");

        diesel::insert_into(ingredients::table)
            .values(&vec![
                NewIngredient {
                    recipe_id: recipe.id,
                    name: "Milk",
                    quantity: None,
                    unit: "",
                    position: 1,
                },
                NewIngredient {
                    recipe_id: recipe.id,
                    name: "Flour",
                    quantity: Some(2),
                    unit: "cups",
                    position: 0,
                },
            ])
            .execute(&mut conn)
            .unwrap();
        diesel::insert_into(instructions::table)
            .values(&vec![
                NewInstruction {
                    recipe_id: Some(recipe.id),
                    step: 2,
                    description: "Fry",
                    image: None,
                },
                NewInstruction {
                    recipe_id: Some(recipe.id),
                    step: 1,
                    description: "Mix",
                    image: None,
                },
            ])
            .execute(&mut conn)
            .unwrap();

        let detail = load_detail(&mut conn, recipe.id).unwrap();
        assert_eq!(detail.author.username, "@johndoe");
        assert_eq!(detail.difficulty_label, "Easy");
        assert_eq!(detail.display_time, "30 mins");

        let texts: Vec<&str> = detail.ingredients.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, ["2 cups Flour", "Milk"]);

        let labels: Vec<&str> = detail.instructions.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Instruction 1 for Pancakes", "Instruction 2 for Pancakes"]
        );
    }

    #[test]
    fn test_missing_recipe_is_not_found() {
        let Some(mut conn) = test_connection() else {
            return;
        };
        let result = load_detail(&mut conn, Uuid::new_v4());
        assert!(matches!(result, Err(ApiError::NotFound("Recipe"))));
    }
}
