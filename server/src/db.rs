use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[derive(Debug, thiserror::Error)]
pub enum DbSetupError {
    #[error("Failed to create database pool: {0}")]
    Pool(#[from] r2d2::PoolError),

    #[error("Failed to run database migrations: {0}")]
    Migrations(String),
}

pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool, DbSetupError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().max_size(max_size).build(manager)?;

    // Run pending migrations on startup
    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    Ok(pool)
}

pub fn run_migrations(conn: &mut PgConnection) -> Result<(), DbSetupError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbSetupError::Migrations(e.to_string()))?;
    if !applied.is_empty() {
        tracing::info!("Applied {} database migration(s)", applied.len());
    }
    Ok(())
}

pub fn is_unique_violation(error: &diesel::result::Error) -> bool {
    matches!(
        error,
        diesel::result::Error::DatabaseError(diesel::result::DatabaseErrorKind::UniqueViolation, _)
    )
}

#[cfg(test)]
pub mod test_support {
    //! Database fixtures for tests that need a live PostgreSQL.
    //!
    //! Tests call [`test_connection`] and bail out early when it returns `None`, so the
    //! suite still passes on machines without `TEST_DATABASE_URL`.

    use super::*;
    use crate::models::{NewRecipe, NewUser, Recipe, User};
    use crate::schema::{recipes, users};
    use std::sync::Mutex;
    use uuid::Uuid;

    static MIGRATED: Mutex<bool> = Mutex::new(false);

    /// A connection inside a test transaction that is rolled back on drop.
    pub fn test_connection() -> Option<PgConnection> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        };

        migrate_once(&url);

        let mut conn = PgConnection::establish(&url).expect("connect to test database");
        conn.begin_test_transaction()
            .expect("begin test transaction");
        Some(conn)
    }

    fn migrate_once(url: &str) {
        let mut migrated = MIGRATED.lock().unwrap_or_else(|e| e.into_inner());
        if !*migrated {
            let mut conn = PgConnection::establish(url).expect("connect to test database");
            run_migrations(&mut conn).expect("migrate test database");
            *migrated = true;
        }
    }

    #[derive(Debug)]
    struct RollbackOnRelease;

    impl r2d2::CustomizeConnection<PgConnection, r2d2::Error> for RollbackOnRelease {
        fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
            conn.begin_test_transaction().map_err(r2d2::Error::QueryError)
        }
    }

    /// A single-connection pool whose connection sits inside a test transaction, so
    /// handlers and assertions see the same uncommitted rows.
    pub fn test_pool() -> Option<DbPool> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        };
        migrate_once(&url);

        let pool = r2d2::Pool::builder()
            .max_size(1)
            .connection_customizer(Box::new(RollbackOnRelease))
            .build(ConnectionManager::<PgConnection>::new(url))
            .expect("build test pool");
        Some(pool)
    }

    pub fn insert_user(conn: &mut PgConnection, username: &str, is_staff: bool) -> User {
        diesel::insert_into(users::table)
            .values(NewUser {
                username,
                password_hash: "not-a-real-hash",
                first_name: "",
                last_name: "",
                email: "",
                is_staff,
                is_superuser: false,
            })
            .returning(User::as_returning())
            .get_result(conn)
            .expect("insert user")
    }

    pub fn insert_recipe(conn: &mut PgConnection, author_id: Uuid, title: &str) -> Recipe {
        diesel::insert_into(recipes::table)
            .values(NewRecipe {
                author_id,
                title,
                description: "",
                difficulty: 1,
                image: None,
                time: 30,
            })
            .returning(Recipe::as_returning())
            .get_result(conn)
            .expect("insert recipe")
    }
}
