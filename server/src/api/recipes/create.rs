use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::flash;
use crate::forms::FormData;
use crate::models::Recipe;
use crate::recipes::{
    save_recipe, CleanedRecipe, RecipeCreatePage, RecipeSubmission, SaveError, RECIPE_CREATED,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use diesel::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub const SUCCESS_URL: &str = "/dashboard";

#[utoipa::path(
    get,
    path = "/recipe/create",
    tag = "recipes",
    responses(
        (status = 200, description = "Blank recipe form with one ingredient and one instruction row", body = RecipeCreatePage),
        (status = 302, description = "Not logged in; redirect to the login page")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_form(AuthUser(_user): AuthUser) -> Json<RecipeCreatePage> {
    Json(RecipeCreatePage::blank())
}

#[utoipa::path(
    post,
    path = "/recipe/create",
    tag = "recipes",
    request_body(
        content = HashMap<String, String>,
        content_type = "application/x-www-form-urlencoded",
        description = "Recipe fields plus the `ingredients` and `instructions` formsets"
    ),
    responses(
        (status = 302, description = "Recipe created; redirect to the dashboard"),
        (status = 200, description = "Submission rejected; the form with its errors", body = RecipeCreatePage),
        (status = 500, description = "Internal error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Form(values): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let mut submission = RecipeSubmission::bind(FormData::new(values));

    let Some(cleaned) = submission.cleaned() else {
        tracing::info!(user_id = %user.id, "recipe submission failed validation");
        return Ok(render(&submission));
    };

    let mut conn = pool.get()?;
    match persist(&mut conn, user.id, &cleaned) {
        Ok(recipe) => {
            tracing::info!(recipe_id = %recipe.id, user_id = %user.id, "recipe created");
            Ok((StatusCode::FOUND, [(header::LOCATION, SUCCESS_URL)]).into_response())
        }
        Err(SaveError::Database(e)) => Err(e.into()),
        Err(conflict) => {
            tracing::info!(user_id = %user.id, error = %conflict, "recipe rejected by storage");
            submission.reject(&conflict);
            Ok(render(&submission))
        }
    }
}

/// Store the recipe and queue the author's success message in one transaction.
fn persist(
    conn: &mut PgConnection,
    author_id: Uuid,
    cleaned: &CleanedRecipe<'_>,
) -> Result<Recipe, SaveError> {
    conn.transaction(|conn| {
        let recipe = save_recipe(conn, author_id, cleaned)?;
        flash::push(conn, author_id, flash::SUCCESS, RECIPE_CREATED)?;
        Ok(recipe)
    })
}

fn render(submission: &RecipeSubmission) -> Response {
    (StatusCode::OK, Json(submission.page())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::app;
    use crate::auth::create_session;
    use crate::db::test_support::{insert_user, test_connection, test_pool};
    use crate::schema::{flash_messages, ingredients, instructions, recipes};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_created_recipe_queues_flash_message() {
        let Some(mut conn) = test_connection() else {
            return;
        };
        let user = insert_user(&mut conn, "@johndoe", false);
        let submission = RecipeSubmission::bind(form(&[
            ("title", "Omelette"),
            ("difficulty", "1"),
            ("time", "10"),
            ("ingredients-TOTAL_FORMS", "1"),
            ("ingredients-INITIAL_FORMS", "0"),
            ("ingredients-0-name", "Eggs"),
            ("ingredients-0-quantity", "3"),
            ("instructions-TOTAL_FORMS", "1"),
            ("instructions-INITIAL_FORMS", "0"),
            ("instructions-0-step", "1"),
            ("instructions-0-description", "Whisk and fry."),
        ]));
        let cleaned = submission.cleaned().unwrap();

        let recipe = persist(&mut conn, user.id, &cleaned).unwrap();
        assert_eq!(recipe.author_id, user.id);

        let titles: Vec<String> = recipes::table
            .filter(recipes::author_id.eq(user.id))
            .select(recipes::title)
            .load(&mut conn)
            .unwrap();
        assert_eq!(titles, ["Omelette"]);

        let messages: Vec<String> = flash_messages::table
            .filter(flash_messages::user_id.eq(user.id))
            .select(flash_messages::message)
            .load(&mut conn)
            .unwrap();
        assert_eq!(messages, [RECIPE_CREATED]);
    }

    const PANCAKES: &[(&str, &str)] = &[
        ("title", "Pancakes"),
        ("difficulty", "2"),
        ("time", "20"),
        ("ingredients-TOTAL_FORMS", "2"),
        ("ingredients-INITIAL_FORMS", "0"),
        ("ingredients-0-name", "Flour"),
        ("ingredients-0-quantity", "200"),
        ("ingredients-1-name", "Milk"),
        ("ingredients-1-quantity", "0"),
        ("instructions-TOTAL_FORMS", "1"),
        ("instructions-INITIAL_FORMS", "0"),
        ("instructions-0-step", "1"),
        ("instructions-0-description", "Mix and fry."),
    ];

    fn counts(pool: &DbPool) -> (i64, i64, i64) {
        let mut conn = pool.get().unwrap();
        (
            recipes::table.count().get_result(&mut conn).unwrap(),
            ingredients::table.count().get_result(&mut conn).unwrap(),
            instructions::table.count().get_result(&mut conn).unwrap(),
        )
    }

    fn logged_in(pool: &DbPool) -> String {
        let mut conn = pool.get().unwrap();
        let user = insert_user(&mut conn, "@johndoe", false);
        create_session(&mut conn, user.id).unwrap()
    }

    fn post_recipe(token: &str, pairs: &[(&str, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/recipe/create")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string(pairs).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_submission_redirects_to_dashboard() {
        let Some(pool) = test_pool() else {
            return;
        };
        let token = logged_in(&pool);
        let before = counts(&pool);

        let response = app(pool.clone())
            .oneshot(post_recipe(&token, PANCAKES))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], SUCCESS_URL);
        assert_eq!(counts(&pool), (before.0 + 1, before.1 + 2, before.2 + 1));
    }

    #[tokio::test]
    async fn test_rejected_submission_echoes_errors_and_saves_nothing() {
        let Some(pool) = test_pool() else {
            return;
        };
        let token = logged_in(&pool);
        let before = counts(&pool);

        let mut pairs = PANCAKES.to_vec();
        pairs.retain(|(k, _)| *k != "instructions-TOTAL_FORMS");
        pairs.extend([
            ("instructions-TOTAL_FORMS", "2"),
            ("instructions-1-step", "1"),
            ("instructions-1-description", "Serve."),
        ]);

        let response = app(pool.clone())
            .oneshot(post_recipe(&token, &pairs))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let page: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            page["instruction_formset"]["non_form_errors"][0],
            "Please correct the duplicate data for recipe and step, which must be unique."
        );
        assert_eq!(page["form"]["data"]["title"], "Pancakes");
        assert_eq!(counts(&pool), before);
    }
}
