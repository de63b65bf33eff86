//! Request payloads of the `web` module, their parsing implementations and tests for those.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::Deserialize;
use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;
use validator::ValidateEmail;

use crate::web;

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable Subscriber
/// The body of `POST /api/subscribe`. The email is kept as any JSON value so that
/// `null`, `false`, `0` and `""` all count as a missing email instead of a bad body.
#[derive(Debug, Default, Deserialize)]
pub struct DeserSubscriber {
    pub email: Option<Value>,
}

/// Extracts a `DeserSubscriber` from a JSON or a form-encoded body.
///
/// A body that is neither, or that is empty, is treated as an empty object.
/// Only a JSON body that fails to parse is rejected.
#[derive(Debug)]
pub struct SubscribeBody(pub DeserSubscriber);

impl<S> FromRequest<S> for SubscribeBody
where
    S: Send + Sync,
{
    type Rejection = web::Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
            .unwrap_or_default();

        if content_type == "application/x-www-form-urlencoded" {
            let Form(subscriber) = Form::<DeserSubscriber>::from_request(req, state).await?;
            return Ok(Self(subscriber));
        }

        let is_json = content_type == "application/json"
            || (content_type.starts_with("application/") && content_type.ends_with("+json"));
        if !is_json {
            return Ok(Self(DeserSubscriber::default()));
        }

        let body = Bytes::from_request(req, state).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(DeserSubscriber::default()));
        }

        let Json(subscriber) = Json::<DeserSubscriber>::from_bytes(&body)?;
        Ok(Self(subscriber))
    }
}

/// Validated Subscriber Email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl SubscriberEmail {
    /// Kept exactly as passed, so matching stays case-sensitive and whitespace is not stripped.
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.is_empty() {
            return Err(DataParsingError::EmailMissing);
        }

        if value.graphemes(true).count() > 256 {
            return Err(DataParsingError::EmailTooLong);
        }

        if value.validate_email() {
            Ok(SubscriberEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }
}

impl TryFrom<DeserSubscriber> for SubscriberEmail {
    type Error = DataParsingError;

    fn try_from(deser_sub: DeserSubscriber) -> Result<Self, Self::Error> {
        match deser_sub.email {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Err(DataParsingError::EmailMissing),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(DataParsingError::EmailMissing),
            Some(Value::String(email)) => SubscriberEmail::parse(email),
            // `true`, other numbers, arrays and objects
            Some(_) => Err(DataParsingError::EmailInvalid),
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("email missing")]
    EmailMissing,
    #[error("email invalid")]
    EmailInvalid,
    #[error("email too long")]
    EmailTooLong,
}
