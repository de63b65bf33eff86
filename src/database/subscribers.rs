//! Queries on the `subscribers` table. Every value is a bound parameter.

use chrono::Utc;
use sqlx::{postgres::PgDatabaseError, PgPool};
use uuid::Uuid;

use super::Result;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The `UNIQUE` constraint on `email` rejected the row.
    AlreadyExists,
}

#[tracing::instrument(name = "Counting subscribers with email", skip(db_pool))]
pub async fn count_by_email(db_pool: &PgPool, email: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM subscribers WHERE email = $1"#)
        .bind(email)
        .fetch_one(db_pool)
        .await?;

    Ok(count)
}

#[tracing::instrument(name = "Inserting subscriber", skip(db_pool))]
pub async fn insert(db_pool: &PgPool, email: &str) -> Result<InsertOutcome> {
    let query_result = sqlx::query(
        r#"
        INSERT INTO subscribers (id, email, date_added)
        VALUES ($1, $2, $3)
    "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(Utc::now())
    .execute(db_pool)
    .await;

    match query_result {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(sqlx::Error::Database(er))
            if er
                .try_downcast_ref::<PgDatabaseError>()
                .is_some_and(|er| er.code() == UNIQUE_VIOLATION) =>
        {
            Ok(InsertOutcome::AlreadyExists)
        }
        Err(er) => Err(er.into()),
    }
}
