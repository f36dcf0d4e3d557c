pub mod create;
pub mod delete;
pub mod update;

use crate::api::ApiError;
use crate::models::Instruction;
use crate::schema::{instructions, recipes};
use crate::AppState;
use axum::routing::{post, put};
use axum::Router;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstructionResponse {
    pub id: Uuid,
    /// Null once the recipe has been deleted
    pub recipe_id: Option<Uuid>,
    pub step: i32,
    pub description: String,
    pub image: Option<String>,
    /// e.g. "Instruction 2 for Pancakes"
    pub label: String,
}

impl InstructionResponse {
    pub fn new(instruction: &Instruction, recipe_title: Option<&str>) -> Self {
        Self {
            id: instruction.id,
            recipe_id: instruction.recipe_id,
            step: instruction.step,
            description: instruction.description.clone(),
            image: instruction.image.clone(),
            label: instruction.label(recipe_title),
        }
    }
}

/// An instruction together with its recipe's author and title, which are absent for
/// detached instructions.
struct OwnedInstruction {
    instruction: Instruction,
    author_id: Option<Uuid>,
    recipe_title: Option<String>,
}

fn find_with_owner(conn: &mut PgConnection, id: Uuid) -> Result<OwnedInstruction, ApiError> {
    let (instruction, author_id, recipe_title) = instructions::table
        .left_join(recipes::table)
        .filter(instructions::id.eq(id))
        .select((
            Instruction::as_select(),
            recipes::author_id.nullable(),
            recipes::title.nullable(),
        ))
        .first::<(Instruction, Option<Uuid>, Option<String>)>(conn)
        .optional()?
        .ok_or(ApiError::NotFound("Instruction"))?;

    Ok(OwnedInstruction {
        instruction,
        author_id,
        recipe_title,
    })
}

/// Single-instruction maintenance. Detached instructions stay editable by staff.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipe/{id}/instructions", post(create::create_instruction))
        .route(
            "/instructions/{id}",
            put(update::update_instruction).delete(delete::delete_instruction),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_instruction,
        update::update_instruction,
        delete::delete_instruction,
    ),
    components(schemas(InstructionResponse))
)]
pub struct ApiDoc;
