use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::info;

use crate::{
    database::{self, subscribers, subscribers::InsertOutcome},
    web::{
        types::{DataParsingError, SubscribeBody, SubscriberEmail},
        WebResult,
    },
    AppState,
};

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),
    #[error("email is already subscribed")]
    AlreadySubscribed,

    #[error("database not available: {0}")]
    DbUnavailable(#[source] database::Error),
    #[error("database error: {0}")]
    Database(#[from] database::Error),
}

// ###################################
// ->   API
// ###################################
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub message: &'static str,
}

pub const SUBSCRIBE_SUCCESS_MSG: &str = "Subscription successful";

/// Validates the email, then inserts it unless it is already subscribed.
/// The body may be JSON or form-encoded.
///
/// The pre-check answers the common duplicate case without attempting a write; the `UNIQUE`
/// constraint on `subscribers.email` settles two requests racing past the pre-check.
#[tracing::instrument(
    name = "Subscribing a new email",
    skip_all,
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    SubscribeBody(subscriber): SubscribeBody,
) -> WebResult<(StatusCode, Json<SubscribeResponse>)> {
    let email = SubscriberEmail::try_from(subscriber).map_err(SubscribeError::DataParsing)?;
    tracing::Span::current().record("subscriber_email", tracing::field::display(&email));

    let db_pool = app_state
        .database_mgr
        .pool()
        .await
        .map_err(SubscribeError::DbUnavailable)?;

    let existing = subscribers::count_by_email(&db_pool, email.as_ref())
        .await
        .map_err(SubscribeError::Database)?;
    if existing > 0 {
        info!("email already subscribed");
        return Err(SubscribeError::AlreadySubscribed.into());
    }

    match subscribers::insert(&db_pool, email.as_ref())
        .await
        .map_err(SubscribeError::Database)?
    {
        InsertOutcome::Inserted => {}
        InsertOutcome::AlreadyExists => {
            info!("email subscribed concurrently");
            return Err(SubscribeError::AlreadySubscribed.into());
        }
    }

    info!("new subscriber added to the list");

    Ok((
        StatusCode::OK,
        Json(SubscribeResponse {
            message: SUBSCRIBE_SUCCESS_MSG,
        }),
    ))
}
