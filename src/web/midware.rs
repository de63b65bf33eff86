use std::sync::Arc;

use axum::{
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::web::{log, Error, REQUEST_ID_HEADER};

/// Turns an `Error` stashed in the response extensions into the client-facing
/// `{"error": ...}` body and writes one log line per request.
pub async fn response_mapper(
    req_method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    resp: Response,
) -> Response {
    let req_id_header = req_headers.get(REQUEST_ID_HEADER);
    let req_id = req_id_header
        .and_then(|id| id.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let web_error = resp.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error.as_ref().map(|(status, cl_err)| {
        let client_error_body = json!({
            "error": cl_err.to_string(),
        });

        let mut err_resp = (*status, Json(client_error_body)).into_response();
        // The rebuilt response has to carry the request id on its own.
        if let Some(id) = req_id_header {
            err_resp.headers_mut().insert(REQUEST_ID_HEADER, id.clone());
        }
        err_resp
    });

    log::log_request(
        &req_id,
        &req_method,
        &uri,
        resp.status(),
        web_error,
        client_status_and_error.as_ref(),
    );

    err_resp.unwrap_or(resp)
}
