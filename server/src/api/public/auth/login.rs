use crate::api::{ApiError, ErrorResponse};
use crate::auth::{create_session, verify_password, SESSION_COOKIE};
use crate::db::DbPool;
use crate::models::User;
use crate::schema::users;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Where a login without a usable `next` lands.
pub const DEFAULT_NEXT: &str = "/dashboard";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LoginPageParams {
    /// Path to return to after logging in
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginPage {
    /// Where to POST credentials
    pub action: String,
    /// Where to go once logged in
    pub next: String,
}

// Only same-site paths are honored as a post-login destination.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => DEFAULT_NEXT,
    }
}

#[utoipa::path(
    get,
    path = "/log_in",
    tag = "auth",
    params(LoginPageParams),
    responses(
        (status = 200, description = "Login page", body = LoginPage)
    )
)]
pub async fn login_page(Query(params): Query<LoginPageParams>) -> Json<LoginPage> {
    Json(LoginPage {
        action: "/api/auth/login".to_string(),
        next: safe_next(params.next.as_deref()).to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body(content = LoginRequest, example = json!({"username": "user", "password": "password"})),
    responses(
        (status = 200, description = "Login successful; the token is also set as the session cookie", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(pool): State<Arc<DbPool>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let mut conn = pool.get()?;

    let user: Option<User> = users::table
        .filter(
            diesel::dsl::sql::<diesel::sql_types::Bool>("LOWER(username) = LOWER(")
                .bind::<diesel::sql_types::Text, _>(&req.username)
                .sql(")"),
        )
        .select(User::as_select())
        .first(&mut conn)
        .optional()?;

    let Some(user) = user.filter(|u| verify_password(&req.password, &u.password_hash)) else {
        tracing::info!(username = %req.username, "failed login");
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid credentials".to_string(),
            }),
        )
            .into_response());
    };

    let token = create_session(&mut conn, user.id)?;
    tracing::info!(user_id = %user.id, "logged in");

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Json(LoginResponse { token })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::app;
    use crate::db::test_support::test_pool;
    use crate::models::NewUser;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    #[test]
    fn test_safe_next_keeps_local_paths() {
        assert_eq!(safe_next(Some("/recipe/create")), "/recipe/create");
        assert_eq!(safe_next(Some("/users?page=2")), "/users?page=2");
    }

    #[test]
    fn test_safe_next_rejects_other_sites() {
        assert_eq!(safe_next(Some("https://example.com/")), DEFAULT_NEXT);
        assert_eq!(safe_next(Some("//example.com/")), DEFAULT_NEXT);
        assert_eq!(safe_next(None), DEFAULT_NEXT);
    }

    #[tokio::test]
    async fn test_login_ignores_username_case() {
        let Some(pool) = test_pool() else {
            return;
        };
        {
            let mut conn = pool.get().unwrap();
            let password_hash = crate::auth::hash_password("hunter22").unwrap();
            diesel::insert_into(users::table)
                .values(NewUser {
                    username: "Alice",
                    password_hash: &password_hash,
                    first_name: "",
                    last_name: "",
                    email: "",
                    is_staff: false,
                    is_superuser: false,
                })
                .execute(&mut conn)
                .unwrap();
        }

        let body = serde_json::json!({"username": "alice", "password": "hunter22"});
        let response = app(pool)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }
}
