pub mod list;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Staff-only user roster.
pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(list::list_users))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_users),
    components(schemas(list::ListUsersResponse, list::UserSummary, list::PageInfo))
)]
pub struct ApiDoc;
