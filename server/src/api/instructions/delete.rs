use super::find_with_owner;
use crate::api::{authorize_edit, ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::schema::instructions;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/instructions/{id}",
    tag = "instructions",
    params(
        ("id" = Uuid, Path, description = "Instruction ID")
    ),
    responses(
        (status = 204, description = "Instruction deleted"),
        (status = 302, description = "Not logged in; redirect to the login page"),
        (status = 403, description = "Not the recipe's author, or a detached instruction and not staff", body = ErrorResponse),
        (status = 404, description = "Instruction not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_instruction(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = pool.get()?;

    let owned = find_with_owner(&mut conn, id)?;
    authorize_edit(&user, owned.author_id, "instruction")?;

    diesel::delete(instructions::table.find(id)).execute(&mut conn)?;
    tracing::info!(instruction_id = %id, recipe_id = ?owned.instruction.recipe_id, "instruction deleted");

    Ok(StatusCode::NO_CONTENT)
}
