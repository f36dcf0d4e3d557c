use crate::api::{ApiError, ErrorResponse};
use crate::auth::{create_session, hash_password};
use crate::db::{is_unique_violation, DbPool};
use crate::models::{NewUser, User};
use crate::schema::users;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignupResponse {
    pub user_id: Uuid,
    pub token: String,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body(content = SignupRequest, example = json!({"username": "user", "password": "password"})),
    responses(
        (status = 201, description = "User created successfully", body = SignupResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Ok(bad_request("Username cannot be empty"));
    }
    if req.password.is_empty() {
        return Ok(bad_request("Password cannot be empty"));
    }

    let password_hash =
        hash_password(&req.password).map_err(|_| ApiError::Internal("Failed to hash password"))?;

    let mut conn = pool.get()?;

    let inserted = diesel::insert_into(users::table)
        .values(NewUser {
            username,
            password_hash: &password_hash,
            first_name: req.first_name.trim(),
            last_name: req.last_name.trim(),
            email: req.email.trim(),
            is_staff: false,
            is_superuser: false,
        })
        .returning(User::as_returning())
        .get_result(&mut conn);

    let user = match inserted {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Ok((
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: "Username already exists".to_string(),
                }),
            )
                .into_response())
        }
        Err(e) => return Err(e.into()),
    };

    let token = create_session(&mut conn, user.id)?;
    tracing::info!(user_id = %user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id: user.id,
            token,
        }),
    )
        .into_response())
}
