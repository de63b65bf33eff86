//! The subscription form and its assets are served without touching the database.

use anyhow::Result;
use reqwest::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn home_serves_the_subscription_form() -> Result<()> {
    let app = TestApp::spawn_without_db().await?;

    let res = app.http_client.get(app.url("/")).send().await?;

    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(
        content_type.starts_with("text/html"),
        "unexpected content type: {content_type}"
    );

    let body = res.text().await?;
    assert!(body.contains(r#"id="emailForm""#));
    assert!(body.contains("/js/form.js"));
    assert!(body.contains(r#"action="/api/subscribe" method="post""#));

    Ok(())
}

#[tokio::test]
async fn static_assets_are_served() -> Result<()> {
    let app = TestApp::spawn_without_db().await?;

    for path in ["/js/form.js", "/css/style.css", "/index.html"] {
        let res = app.http_client.get(app.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::OK, "asset {path} not served");
    }

    Ok(())
}
