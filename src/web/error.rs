use axum::{
    extract::rejection::{BytesRejection, FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use super::{routes::SubscribeError, types::DataParsingError};

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),
    #[error("json body rejected: {0}")]
    BodyRejected(#[from] JsonRejection),
    #[error("form body rejected: {0}")]
    FormRejected(#[from] FormRejection),
    #[error("body could not be read: {0}")]
    BodyUnreadable(#[from] BytesRejection),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::BodyRejected(_) | Error::FormRejected(_) | Error::BodyUnreadable(_) => {
                (StatusCode::BAD_REQUEST, InvalidBody)
            }
            Error::Subscribe(sub_er) => match sub_er {
                SubscribeError::DataParsing(DataParsingError::EmailMissing) => {
                    (StatusCode::BAD_REQUEST, EmailRequired)
                }
                SubscribeError::DataParsing(_) => (StatusCode::BAD_REQUEST, EmailInvalid),
                SubscribeError::AlreadySubscribed => (StatusCode::CONFLICT, EmailAlreadyExists),
                SubscribeError::DbUnavailable(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, DatabaseUnavailable)
                }
                SubscribeError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ServiceError),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the client gets to see, rendered as `{"error": "<Display>"}`.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("Email is required")]
    EmailRequired,
    #[display("Email is invalid")]
    EmailInvalid,
    #[display("Invalid request body")]
    InvalidBody,
    #[display("Email already exists")]
    EmailAlreadyExists,
    #[display("Database connection not available")]
    DatabaseUnavailable,
    #[display("Failed to save subscription")]
    ServiceError,
}
