use super::find_with_owner;
use crate::api::{authorize_edit, ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::schema::ingredients;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 302, description = "Not logged in; redirect to the login page"),
        (status = 403, description = "Not the recipe's author", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = pool.get()?;

    let (ingredient, author_id) = find_with_owner(&mut conn, id)?;
    authorize_edit(&user, Some(author_id), "ingredient")?;

    diesel::delete(ingredients::table.find(id)).execute(&mut conn)?;
    tracing::info!(ingredient_id = %id, recipe_id = %ingredient.recipe_id, "ingredient deleted");

    Ok(StatusCode::NO_CONTENT)
}
