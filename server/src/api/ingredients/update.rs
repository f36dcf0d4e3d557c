use super::{find_with_owner, IngredientResponse};
use crate::api::{authorize_edit, ApiError, ErrorResponse, RowFormPage};
use crate::auth::AuthUser;
use crate::db::{is_unique_violation, DbPool};
use crate::forms::{FormData, FormErrors, IngredientForm, RowForm};
use crate::models::Ingredient;
use crate::schema::ingredients;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form, Json,
};
use diesel::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    put,
    path = "/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID")
    ),
    request_body(
        content = HashMap<String, String>,
        content_type = "application/x-www-form-urlencoded",
        description = "`name`, `quantity` and `unit`"
    ),
    responses(
        (status = 200, description = "The updated ingredient, or the form with its errors", body = IngredientResponse),
        (status = 302, description = "Not logged in; redirect to the login page"),
        (status = 403, description = "Not the recipe's author", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Form(values): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let mut conn = pool.get()?;

    let (_, author_id) = find_with_owner(&mut conn, id)?;
    authorize_edit(&user, Some(author_id), "ingredient")?;

    let data = FormData::new(values);
    let fields = match IngredientForm::clean(&data, None) {
        Ok(fields) => fields,
        Err(errors) => return Ok(RowFormPage::new::<IngredientForm>(&data, errors).into_response()),
    };

    let updated = diesel::update(ingredients::table.find(id))
        .set((
            ingredients::name.eq(&fields.name),
            ingredients::quantity.eq(fields.quantity),
            ingredients::unit.eq(&fields.unit),
        ))
        .returning(Ingredient::as_returning())
        .get_result(&mut conn);

    match updated {
        Ok(ingredient) => Ok(Json(IngredientResponse::from(&ingredient)).into_response()),
        Err(e) if is_unique_violation(&e) => {
            let mut errors = FormErrors::default();
            errors.add_non_field(IngredientForm::STORAGE_CONFLICT);
            Ok(RowFormPage::new::<IngredientForm>(&data, errors).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
