use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::flash;
use crate::models::{FlashMessage, Recipe};
use crate::schema::recipes;
use crate::AppState;
use axum::routing::get;
use axum::{extract::State, Json, Router};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub difficulty_label: String,
    pub display_time: String,
    pub created_at: DateTime<Utc>,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            difficulty_label: recipe
                .difficulty()
                .map(|d| d.label().to_string())
                .unwrap_or_default(),
            display_time: recipe.display_time(),
            title: recipe.title,
            created_at: recipe.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub username: String,
    pub recipes: Vec<RecipeSummary>,
    /// Pending notifications; each is returned once.
    pub messages: Vec<FlashMessage>,
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "The caller's recipes, newest first, and pending messages", body = DashboardResponse),
        (status = 302, description = "Not logged in; redirect to the login page"),
        (status = 500, description = "Internal error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn dashboard(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let mut conn = pool.get()?;

    let own: Vec<Recipe> = recipes::table
        .filter(recipes::author_id.eq(user.id))
        .order((recipes::created_at.desc(), recipes::id.desc()))
        .select(Recipe::as_select())
        .load(&mut conn)?;

    let messages = flash::take(&mut conn, user.id)?;

    Ok(Json(DashboardResponse {
        username: user.username,
        recipes: own.into_iter().map(RecipeSummary::from).collect(),
        messages,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[derive(OpenApi)]
#[openapi(
    paths(dashboard),
    components(schemas(DashboardResponse, RecipeSummary, FlashMessage))
)]
pub struct ApiDoc;
