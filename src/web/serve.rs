use std::{future::Future, time::Duration};

use axum::{
    body::Body,
    http::{HeaderName, Request, Response},
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::{info, Span};

use crate::{app::shutdown_signal, App, AppState, Result};

use super::{midware, routes::routes, REQUEST_ID_HEADER};

/// The core async function serving this application until Ctrl-C or SIGTERM.
///
/// Once the server stopped accepting connections and in-flight requests have finished,
/// the database pool is closed.
pub async fn serve(app: App) -> Result<()> {
    serve_with_shutdown(app, shutdown_signal()).await
}

/// Like [`serve`], but stops when `shutdown` resolves.
pub async fn serve_with_shutdown<F>(app: App, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let App {
        app_state,
        listener,
    } = app;

    let router = build_router(app_state.clone());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("{:<20} - Server stopped", "serve");
    app_state.database_mgr.close().await;

    Ok(())
}

/// The application `Router` with the request-id, tracing and response mapping layers.
pub fn build_router(app_state: AppState) -> Router {
    let x_request_id: HeaderName = HeaderName::from_static(REQUEST_ID_HEADER);

    let trace_layer = build_trace_layer();

    Router::new().merge(routes(app_state)).layer(
        ServiceBuilder::new()
            // Set UUID per request
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                MakeRequestUuid,
            ))
            .layer(trace_layer)
            // This has to be in front of the Propagation layer because while the request goes through
            // middleware as listed in the ServiceBuilder, the response goes through the middleware stack from the bottom up.
            .layer(middleware::map_response(midware::response_mapper))
            // Propagate UUID to response, keep it last so it processes the response first!
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// A helper function that sets up the `tower_http::TraceLayer` - tracing configuration.
fn build_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    impl OnRequest<Body> + Clone,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let uuid = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .map(|uuid| uuid.to_str().unwrap_or("").to_string());

            tracing::error_span!(
                "serve",
                id = uuid,
                method = req.method().to_string(),
                path = req.uri().path()
            )
        })
        .on_request(|req: &Request<Body>, _s: &Span| tracing::info!("START @ {}", req.uri()))
        .on_response(|res: &Response<Body>, latency: Duration, _s: &Span| {
            let st_code = res.status().as_u16();

            if (500..=599).contains(&st_code) {
                tracing::error!("END in: {:?} - STATUS: {st_code}", latency)
            } else {
                tracing::info!("END in: {:?} - STATUS: {st_code}", latency)
            }
        })
}
