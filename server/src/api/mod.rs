pub mod dashboard;
pub mod ingredients;
pub mod instructions;
pub mod public;
pub mod recipes;
pub mod users;

use crate::forms::{FormData, FormErrors, FormView, RowForm};
use crate::models::User;
use crate::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use diesel::r2d2::PoolError;
use serde::Serialize;
use thiserror::Error;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// A single row form sent back with its errors after a rejected edit.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RowFormPage {
    pub form: FormView,
}

impl RowFormPage {
    pub fn new<F: RowForm>(data: &FormData, errors: FormErrors) -> Self {
        Self {
            form: FormView {
                data: data.echo(None, F::FIELDS),
                errors,
            },
        }
    }
}

impl IntoResponse for RowFormPage {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("You do not have permission to modify this {0}")]
    Forbidden(&'static str),

    #[error("Database connection unavailable")]
    Pool(#[from] PoolError),

    #[error("Database error")]
    Database(#[from] diesel::result::Error),

    #[error("{0}")]
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Pool(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                tracing::error!(error = ?self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Recipe authors may change their own recipes; staff may change anything. A `None`
/// owner is a detached row, which only staff may touch.
pub fn authorize_edit(user: &User, owner: Option<Uuid>, what: &'static str) -> Result<(), ApiError> {
    if user.is_privileged() || owner == Some(user.id) {
        Ok(())
    } else {
        tracing::info!(user_id = %user.id, ?owner, "rejected edit of {}", what);
        Err(ApiError::Forbidden(what))
    }
}

/// All application routes, before state is attached.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(public::router())
        .merge(recipes::router())
        .merge(ingredients::router())
        .merge(instructions::router())
        .merge(users::router())
        .merge(dashboard::router())
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(components(schemas(ErrorResponse, RowFormPage)))]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        public::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        instructions::ApiDoc::openapi(),
        users::ApiDoc::openapi(),
        dashboard::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
pub mod test_support {
    //! Router-level fixtures. The pool is built lazily, so requests that are rejected
    //! before touching the database work without one.

    use crate::config::Config;
    use crate::db::DbPool;
    use crate::AppState;
    use axum::Router;
    use diesel::r2d2::{ConnectionManager, Pool};
    use diesel::PgConnection;
    use std::sync::Arc;

    pub fn lazy_app() -> Router {
        let manager = ConnectionManager::<PgConnection>::new("postgres://invalid:5432/none");
        let pool: DbPool = Pool::builder()
            .max_size(1)
            .connection_timeout(std::time::Duration::from_millis(50))
            .build_unchecked(manager);
        app(pool)
    }

    pub fn app(pool: DbPool) -> Router {
        let config = Config {
            database_url: String::new(),
            bind_addr: "127.0.0.1:0".to_string(),
            pool_size: 1,
            users_per_page: 10,
        };

        super::router().with_state(AppState {
            pool: Arc::new(pool),
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn user(is_staff: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "@johndoe".to_string(),
            password_hash: String::new(),
            is_staff,
            is_superuser: false,
        }
    }

    #[test]
    fn test_authors_and_staff_may_edit() {
        let author = user(false);
        let stranger = user(false);
        let staff = user(true);

        assert!(authorize_edit(&author, Some(author.id), "recipe").is_ok());
        assert!(authorize_edit(&staff, Some(author.id), "recipe").is_ok());
        assert!(matches!(
            authorize_edit(&stranger, Some(author.id), "recipe"),
            Err(ApiError::Forbidden("recipe"))
        ));
    }

    #[test]
    fn test_detached_rows_are_staff_only() {
        assert!(authorize_edit(&user(true), None, "instruction").is_ok());
        assert!(authorize_edit(&user(false), None, "instruction").is_err());
    }

    #[test]
    fn test_not_found_renders_json() {
        let response = ApiError::NotFound("Recipe").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_openapi_lists_recipe_routes() {
        let spec = openapi();
        assert!(spec.paths.paths.contains_key("/recipe/create"));
        assert!(spec.paths.paths.contains_key("/recipe/{id}"));
        assert!(spec.paths.paths.contains_key("/users"));
    }

    #[tokio::test]
    async fn test_unauthenticated_create_redirects_to_login() {
        let response = test_support::lazy_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/recipe/create")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("title=Pancakes"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/log_in?next=%2Frecipe%2Fcreate"
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_roster_redirects_to_login() {
        let response = test_support::lazy_app()
            .oneshot(
                Request::builder()
                    .uri("/users?page=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/log_in?next=%2Fusers%3Fpage%3D2"
        );
    }

    #[tokio::test]
    async fn test_login_page_is_public() {
        let response = test_support::lazy_app()
            .oneshot(
                Request::builder()
                    .uri("/log_in?next=%2Frecipe%2Fcreate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let page: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(page["next"], "/recipe/create");
        assert_eq!(page["action"], "/api/auth/login");
    }
}
