use super::{find_with_owner, InstructionResponse};
use crate::api::{authorize_edit, ApiError, ErrorResponse, RowFormPage};
use crate::auth::AuthUser;
use crate::db::{is_unique_violation, DbPool};
use crate::forms::{FormData, FormErrors, InstructionForm, RowForm};
use crate::models::Instruction;
use crate::schema::instructions;
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
    path = "/instructions/{id}",
    tag = "instructions",
    params(
        ("id" = Uuid, Path, description = "Instruction ID")
    ),
    request_body(
        content = HashMap<String, String>,
        content_type = "application/x-www-form-urlencoded",
        description = "`step`, `description` and `image`"
    ),
    responses(
        (status = 200, description = "The updated instruction, or the form with its errors", body = InstructionResponse),
        (status = 302, description = "Not logged in; redirect to the login page"),
        (status = 403, description = "Not the recipe's author, or a detached instruction and not staff", body = ErrorResponse),
        (status = 404, description = "Instruction not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_instruction(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Form(values): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let mut conn = pool.get()?;

    let owned = find_with_owner(&mut conn, id)?;
    authorize_edit(&user, owned.author_id, "instruction")?;

    let data = FormData::new(values);
    let fields = match InstructionForm::clean(&data, None) {
        Ok(fields) => fields,
        Err(errors) => {
            return Ok(RowFormPage::new::<InstructionForm>(&data, errors).into_response())
        }
    };

    let updated = diesel::update(instructions::table.find(id))
        .set((
            instructions::step.eq(fields.step),
            instructions::description.eq(&fields.description),
            instructions::image.eq(fields.image.as_deref()),
        ))
        .returning(Instruction::as_returning())
        .get_result(&mut conn);

    match updated {
        Ok(instruction) => Ok(Json(InstructionResponse::new(
            &instruction,
            owned.recipe_title.as_deref(),
        ))
        .into_response()),
        Err(e) if is_unique_violation(&e) => {
            let mut errors = FormErrors::default();
            errors.add_non_field(InstructionForm::STORAGE_CONFLICT);
            Ok(RowFormPage::new::<InstructionForm>(&data, errors).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
