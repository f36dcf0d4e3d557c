use super::IngredientResponse;
use crate::api::recipes::find_owner;
use crate::api::{authorize_edit, ApiError, ErrorResponse, RowFormPage};
use crate::auth::AuthUser;
use crate::db::{is_unique_violation, DbPool};
use crate::forms::{FormData, FormErrors, IngredientForm, RowForm};
use crate::models::{Ingredient, NewIngredient};
use crate::schema::ingredients;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use diesel::dsl::max;
use diesel::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/recipe/{id}/ingredients",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body(
        content = HashMap<String, String>,
        content_type = "application/x-www-form-urlencoded",
        description = "`name`, `quantity` and `unit`"
    ),
    responses(
        (status = 201, description = "Ingredient added at the end of the list", body = IngredientResponse),
        (status = 200, description = "Rejected; the form with its errors", body = RowFormPage),
        (status = 302, description = "Not logged in; redirect to the login page"),
        (status = 403, description = "Not the recipe's author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(recipe_id): Path<Uuid>,
    Form(values): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let mut conn = pool.get()?;

    let (author_id, _) = find_owner(&mut conn, recipe_id)?;
    authorize_edit(&user, Some(author_id), "recipe")?;

    let data = FormData::new(values);
    let fields = match IngredientForm::clean(&data, None) {
        Ok(fields) => fields,
        Err(errors) => return Ok(RowFormPage::new::<IngredientForm>(&data, errors).into_response()),
    };

    let inserted = conn.transaction(|conn| {
        let last: Option<i32> = ingredients::table
            .filter(ingredients::recipe_id.eq(recipe_id))
            .select(max(ingredients::position))
            .first(conn)?;

        diesel::insert_into(ingredients::table)
            .values(NewIngredient {
                recipe_id,
                name: &fields.name,
                quantity: fields.quantity,
                unit: &fields.unit,
                position: last.map_or(0, |p| p + 1),
            })
            .returning(Ingredient::as_returning())
            .get_result(conn)
    });

    match inserted {
        Ok(ingredient) => {
            tracing::info!(ingredient_id = %ingredient.id, %recipe_id, "ingredient added");
            Ok((
                StatusCode::CREATED,
                Json(IngredientResponse::from(&ingredient)),
            )
                .into_response())
        }
        Err(e) if is_unique_violation(&e) => {
            let mut errors = FormErrors::default();
            errors.add_non_field(IngredientForm::STORAGE_CONFLICT);
            Ok(RowFormPage::new::<IngredientForm>(&data, errors).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
