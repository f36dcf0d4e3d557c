use crate::db::DbPool;
use crate::models::User;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use super::db::get_user_from_token;

/// Where unauthenticated callers are sent.
pub const LOGIN_URL: &str = "/log_in";

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "session";

/// Extractor that resolves the caller's session and provides the authenticated user.
///
/// The token is read from `Authorization: Bearer <token>` or, failing that, the
/// `session` cookie. Callers without a valid session are redirected to the login page
/// with a `next` parameter pointing back at the original request.
/// ```ignore
/// async fn my_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     // user is the authenticated User
/// }
/// ```
pub struct AuthUser(pub User);

/// Like [`AuthUser`], but only staff and superusers get through.
pub struct StaffUser(pub User);

#[derive(Debug)]
pub enum AuthError {
    MissingCredentials { next: String },
    InvalidHeader { next: String },
    InvalidToken { next: String },
    NotStaff { next: String },
}

impl AuthError {
    fn next(&self) -> &str {
        match self {
            AuthError::MissingCredentials { next }
            | AuthError::InvalidHeader { next }
            | AuthError::InvalidToken { next }
            | AuthError::NotStaff { next } => next,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(reason = ?self, "redirecting to login");
        login_redirect(self.next())
    }
}

/// 302 to the login page, remembering where the caller was headed.
pub fn login_redirect(next: &str) -> Response {
    let query = serde_urlencoded::to_string([("next", next)]).unwrap_or_default();
    let location = format!("{LOGIN_URL}?{query}");
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Path and query of the current request, used as the post-login destination.
fn request_next(parts: &Parts) -> String {
    parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string())
}

fn bearer_token(parts: &Parts, next: &str) -> Result<Option<String>, AuthError> {
    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidHeader {
        next: next.to_string(),
    })?;

    auth_str
        .strip_prefix("Bearer ")
        .map(|t| Some(t.to_string()))
        .ok_or_else(|| AuthError::InvalidHeader {
            next: next.to_string(),
        })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let next = request_next(parts);

        let token = match bearer_token(parts, &next)? {
            Some(token) => token,
            None => CookieJar::from_headers(&parts.headers)
                .get(SESSION_COOKIE)
                .map(|c| c.value().to_string())
                .ok_or_else(|| AuthError::MissingCredentials { next: next.clone() })?,
        };

        let pool = Arc::<DbPool>::from_ref(state);
        let user = get_user_from_token(&pool, &token)
            .await
            .ok_or(AuthError::InvalidToken { next })?;

        Ok(AuthUser(user))
    }
}

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_privileged() {
            return Err(AuthError::NotStaff {
                next: request_next(parts),
            });
        }

        Ok(StaffUser(user))
    }
}
