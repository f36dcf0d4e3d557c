use crate::api::{ApiError, ErrorResponse};
use crate::auth::StaffUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::schema::{recipes, users};
use axum::{
    extract::{Query, State},
    Json,
};
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// 1-based page number. Anything unparseable means the first page; a page below 1 or
    /// past the end means the last.
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub recipe_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageInfo {
    pub number: i64,
    pub num_pages: i64,
    pub per_page: i64,
    pub total: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageInfo {
    /// Resolve the requested page leniently against `total` rows.
    pub fn resolve(requested: Option<&str>, total: i64, per_page: i64) -> Self {
        let per_page = per_page.max(1);
        let num_pages = ((total + per_page - 1) / per_page).max(1);

        let number = requested
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map_or(1, |p| if (1..=num_pages).contains(&p) { p } else { num_pages });

        Self {
            number,
            num_pages,
            per_page,
            total,
            has_previous: number > 1,
            has_next: number < num_pages,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListUsersResponse {
    pub users: Vec<UserSummary>,
    pub page: PageInfo,
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(ListUsersParams),
    responses(
        (status = 200, description = "One page of users with their recipe counts", body = ListUsersResponse),
        (status = 302, description = "Not logged in or not staff; redirect to the login page"),
        (status = 500, description = "Internal error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    StaffUser(_staff): StaffUser,
    State(pool): State<Arc<DbPool>>,
    State(config): State<Arc<Config>>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let mut conn = pool.get()?;
    let response = load_page(&mut conn, params.page.as_deref(), config.users_per_page)?;
    Ok(Json(response))
}

pub fn load_page(
    conn: &mut PgConnection,
    requested: Option<&str>,
    per_page: i64,
) -> Result<ListUsersResponse, ApiError> {
    let total: i64 = users::table.count().get_result(conn)?;
    let page = PageInfo::resolve(requested, total, per_page);

    let rows: Vec<(Uuid, String, String, String, String, bool)> = users::table
        .order((users::last_name.asc(), users::first_name.asc(), users::id.asc()))
        .select((
            users::id,
            users::username,
            users::first_name,
            users::last_name,
            users::email,
            users::is_staff,
        ))
        .limit(page.per_page)
        .offset(page.offset())
        .load(conn)?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.0).collect();
    let counts: HashMap<Uuid, i64> = recipes::table
        .filter(recipes::author_id.eq_any(&ids))
        .group_by(recipes::author_id)
        .select((recipes::author_id, count_star()))
        .load::<(Uuid, i64)>(conn)?
        .into_iter()
        .collect();

    let users = rows
        .into_iter()
        .map(
            |(id, username, first_name, last_name, email, is_staff)| UserSummary {
                recipe_count: counts.get(&id).copied().unwrap_or(0),
                id,
                username,
                first_name,
                last_name,
                email,
                is_staff,
            },
        )
        .collect();

    Ok(ListUsersResponse { users, page })
}
