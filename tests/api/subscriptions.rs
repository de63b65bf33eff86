use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::{assert_error_body, TestApp};

// ###################################
// ->   WITHOUT A DATABASE
// ###################################

#[tokio::test]
async fn api_subscribe_missing_email_is_400_without_touching_the_store() -> Result<()> {
    // If the store were queried, the dead database would turn these into 500s.
    let app = TestApp::spawn_without_db().await?;

    let cases = [
        (json!({}), "Empty json"),
        (json!({ "email": null }), "Null email"),
        (json!({ "email": "" }), "Empty email"),
        (json!({ "email": false }), "False email"),
        (json!({ "email": 0 }), "Zero email"),
        (json!({ "name": "John Doe" }), "Unrelated field only"),
    ];

    for (body, description) in cases {
        let res = app.post_subscriptions(&body).await?;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "Wrong response: ({}), Expected: ({}); for request with: {description}",
            res.status(),
            StatusCode::BAD_REQUEST
        );
        assert!(
            res.headers().contains_key("x-request-id"),
            "x-request-id header missing from the error response"
        );
        assert_error_body(res, "Email is required").await?;
    }

    let res = app.post_subscriptions_empty().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_error_body(res, "Email is required").await?;

    let raw_cases = [
        ("", "application/json"),
        (r#"{"email": "a@b.com"}"#, "text/plain"),
        ("email=", "application/x-www-form-urlencoded"),
        ("name=John", "application/x-www-form-urlencoded"),
    ];
    for (body, content_type) in raw_cases {
        let res = app.post_subscriptions_raw(body, content_type).await?;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "Expected 400 for body {body:?} sent as {content_type}"
        );
        assert_error_body(res, "Email is required").await?;
    }

    Ok(())
}

#[tokio::test]
async fn api_subscribe_invalid_email_is_400() -> Result<()> {
    let app = TestApp::spawn_without_db().await?;

    let cases = [
        (json!({ "email": "not an email" }), "Invalid email"),
        (json!({ "email": "ursuladomain.com" }), "Missing @"),
        (json!({ "email": "@domain.com" }), "Missing subject"),
        (json!({ "email": "   " }), "Whitespace email"),
        (json!({ "email": " a@b.com" }), "Leading whitespace"),
        (json!({ "email": 42 }), "Number email"),
        (json!({ "email": true }), "True email"),
    ];

    for (body, description) in cases {
        let res = app.post_subscriptions(&body).await?;
        assert_eq!(
            400,
            res.status().as_u16(),
            "The API did not return a 400 BAD REQUEST the payload was {description}."
        );
        assert_error_body(res, "Email is invalid").await?;
    }

    Ok(())
}

#[tokio::test]
async fn api_subscribe_malformed_body_is_400() -> Result<()> {
    let app = TestApp::spawn_without_db().await?;

    let cases = [
        ("{not json", "application/json"),
        (r#"{"email": "a@b.com""#, "application/json"),
        ("[1, 2", "application/json; charset=utf-8"),
    ];

    for (body, content_type) in cases {
        let res = app.post_subscriptions_raw(body, content_type).await?;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "Expected 400 for body {body} sent as {content_type}"
        );
        assert_error_body(res, "Invalid request body").await?;
    }

    Ok(())
}

#[tokio::test]
async fn api_subscribe_unreachable_store_is_500_with_generic_body() -> Result<()> {
    let app = TestApp::spawn_without_db().await?;

    let res = app.post_subscriptions(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_error_body(res, "Database connection not available").await?;

    Ok(())
}

#[tokio::test]
async fn api_subscribe_form_body_reaches_the_store() -> Result<()> {
    let app = TestApp::spawn_without_db().await?;

    let res = app
        .post_subscriptions_raw("email=a%40b.com", "application/x-www-form-urlencoded")
        .await?;

    // A parsed, valid email goes on to the dead store.
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_error_body(res, "Database connection not available").await?;

    let res = app
        .post_subscriptions_raw("email=not-an-email", "application/x-www-form-urlencoded")
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_error_body(res, "Email is invalid").await?;

    Ok(())
}

#[tokio::test]
async fn api_subscribe_failing_queries_are_500_with_generic_body() -> Result<()> {
    let app = TestApp::spawn_with_broken_db().await?;

    let res = app.post_subscriptions(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "error": "Failed to save subscription" }));

    Ok(())
}

// ###################################
// ->   WITH A DATABASE
// ###################################

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn api_subscribe_ok() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.post_subscriptions(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(
        res.status(),
        StatusCode::OK,
        "Wrong response StatusCode: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "message": "Subscription successful" }));

    let db_pool = app.dm.pool().await?;
    let (email, date_added): (String, chrono::DateTime<chrono::Utc>) =
        sqlx::query_as("SELECT email, date_added FROM subscribers")
            .fetch_one(&db_pool)
            .await?;
    assert_eq!(email, "a@b.com");
    assert!(date_added <= chrono::Utc::now());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn api_subscribe_twice_is_409_and_keeps_one_row() -> Result<()> {
    let app = TestApp::spawn().await?;
    let body = json!({ "email": "le_guin@gmail.com" });

    let first = app.post_subscriptions(&body).await?;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.post_subscriptions(&body).await?;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_error_body(second, "Email already exists").await?;

    assert_eq!(1, app.subscriber_count("le_guin@gmail.com").await?);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn api_subscribe_form_ok() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_subscriptions_raw("email=form%40example.com", "application/x-www-form-urlencoded")
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(1, app.subscriber_count("form@example.com").await?);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn api_subscribe_email_match_is_case_sensitive() -> Result<()> {
    let app = TestApp::spawn().await?;

    let lower = app
        .post_subscriptions(&json!({ "email": "ursula@example.com" }))
        .await?;
    let upper = app
        .post_subscriptions(&json!({ "email": "Ursula@example.com" }))
        .await?;

    assert_eq!(lower.status(), StatusCode::OK);
    assert_eq!(upper.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn api_subscribe_concurrent_duplicates_insert_once() -> Result<()> {
    let app = TestApp::spawn().await?;
    let body = json!({ "email": "race@example.com" });

    let mut set = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let client = app.http_client.clone();
        let url = app.url("/api/subscribe");
        let body = body.clone();
        set.spawn(async move { client.post(url).json(&body).send().await });
    }

    let mut ok = 0;
    while let Some(res) = set.join_next().await {
        match res??.status() {
            StatusCode::OK => ok += 1,
            StatusCode::CONFLICT => {}
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(1, ok, "exactly one request should have inserted the email");
    assert_eq!(1, app.subscriber_count("race@example.com").await?);

    Ok(())
}
