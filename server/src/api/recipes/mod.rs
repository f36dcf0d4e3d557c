pub mod create;
pub mod delete;
pub mod detail;

use crate::api::ApiError;
use crate::schema::recipes;
use crate::AppState;
use axum::routing::get;
use axum::Router;
use diesel::prelude::*;
use utoipa::OpenApi;
use uuid::Uuid;

/// Recipe pages: the composite create form, the public detail view and deletion.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/recipe/create",
            get(create::create_form).post(create::create_recipe),
        )
        .route(
            "/recipe/{id}",
            get(detail::get_recipe).delete(delete::delete_recipe),
        )
}

/// Author and title of a recipe, for permission checks on its rows.
pub fn find_owner(conn: &mut PgConnection, recipe_id: Uuid) -> Result<(Uuid, String), ApiError> {
    recipes::table
        .find(recipe_id)
        .select((recipes::author_id, recipes::title))
        .first(conn)
        .optional()?
        .ok_or(ApiError::NotFound("Recipe"))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_form,
        create::create_recipe,
        detail::get_recipe,
        delete::delete_recipe,
    ),
    components(schemas(
        crate::recipes::RecipeCreatePage,
        crate::forms::FormView,
        crate::forms::FormErrors,
        crate::forms::FormSetView,
        crate::forms::formset::ManagementData,
        crate::forms::Choice,
        detail::RecipeDetailResponse,
        detail::AuthorSummary,
    ))
)]
pub struct ApiDoc;
