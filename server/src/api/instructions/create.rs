use super::InstructionResponse;
use crate::api::recipes::find_owner;
use crate::api::{authorize_edit, ApiError, ErrorResponse, RowFormPage};
use crate::auth::AuthUser;
use crate::db::{is_unique_violation, DbPool};
use crate::forms::{FormData, FormErrors, InstructionForm, RowForm};
use crate::models::{Instruction, NewInstruction};
use crate::schema::instructions;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use diesel::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/recipe/{id}/instructions",
    tag = "instructions",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body(
        content = HashMap<String, String>,
        content_type = "application/x-www-form-urlencoded",
        description = "`step`, `description` and `image`"
    ),
    responses(
        (status = 201, description = "Instruction added", body = InstructionResponse),
        (status = 200, description = "Rejected; the form with its errors", body = RowFormPage),
        (status = 302, description = "Not logged in; redirect to the login page"),
        (status = 403, description = "Not the recipe's author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_instruction(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(recipe_id): Path<Uuid>,
    Form(values): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let mut conn = pool.get()?;

    let (author_id, title) = find_owner(&mut conn, recipe_id)?;
    authorize_edit(&user, Some(author_id), "recipe")?;

    let data = FormData::new(values);
    let fields = match InstructionForm::clean(&data, None) {
        Ok(fields) => fields,
        Err(errors) => {
            return Ok(RowFormPage::new::<InstructionForm>(&data, errors).into_response())
        }
    };

    let inserted = diesel::insert_into(instructions::table)
        .values(NewInstruction {
            recipe_id: Some(recipe_id),
            step: fields.step,
            description: &fields.description,
            image: fields.image.as_deref(),
        })
        .returning(Instruction::as_returning())
        .get_result(&mut conn);

    match inserted {
        Ok(instruction) => {
            tracing::info!(instruction_id = %instruction.id, %recipe_id, "instruction added");
            Ok((
                StatusCode::CREATED,
                Json(InstructionResponse::new(&instruction, Some(&title))),
            )
                .into_response())
        }
        Err(e) if is_unique_violation(&e) => {
            let mut errors = FormErrors::default();
            errors.add_non_field(InstructionForm::STORAGE_CONFLICT);
            Ok(RowFormPage::new::<InstructionForm>(&data, errors).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
