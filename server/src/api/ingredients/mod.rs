pub mod create;
pub mod delete;
pub mod update;

use crate::api::ApiError;
use crate::models::Ingredient;
use crate::schema::{ingredients, recipes};
use crate::AppState;
use axum::routing::{post, put};
use axum::Router;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientResponse {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub name: String,
    pub quantity: Option<i32>,
    pub unit: String,
    pub position: i32,
    /// e.g. "2 cups Flour"
    pub text: String,
}

impl From<&Ingredient> for IngredientResponse {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.id,
            recipe_id: ingredient.recipe_id,
            name: ingredient.name.clone(),
            quantity: ingredient.quantity,
            unit: ingredient.unit.clone(),
            position: ingredient.position,
            text: ingredient.to_string(),
        }
    }
}

/// The ingredient and the author of the recipe it belongs to.
fn find_with_owner(conn: &mut PgConnection, id: Uuid) -> Result<(Ingredient, Uuid), ApiError> {
    ingredients::table
        .inner_join(recipes::table)
        .filter(ingredients::id.eq(id))
        .select((Ingredient::as_select(), recipes::author_id))
        .first(conn)
        .optional()?
        .ok_or(ApiError::NotFound("Ingredient"))
}

/// Single-ingredient maintenance on an existing recipe.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipe/{id}/ingredients", post(create::create_ingredient))
        .route(
            "/ingredients/{id}",
            put(update::update_ingredient).delete(delete::delete_ingredient),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_ingredient,
        update::update_ingredient,
        delete::delete_ingredient,
    ),
    components(schemas(IngredientResponse))
)]
pub struct ApiDoc;
