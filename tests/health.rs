use anyhow::Result;
use axum::http::StatusCode;

mod common;

#[tokio::test]
async fn health_reports_db_ok() -> Result<()> {
    let harness = common::spawn_app().await?;

    let (status, body) = common::request(&harness.app, "GET", "/api/health", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db_ok"], true);

    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_anonymous_requests() -> Result<()> {
    let harness = common::spawn_app().await?;

    for uri in ["/roles", "/users", "/audit-logs", "/session/bootstrap"] {
        let (status, _) = common::request(&harness.app, "GET", uri, None, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} leaked");
    }

    Ok(())
}
