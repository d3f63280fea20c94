use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn mutations_land_in_the_durable_trail() -> Result<()> {
    let harness = common::spawn_app().await?;

    let admin_role = common::seed_role(&harness.pool, "TI", json!({}), true).await?;
    common::seed_user(
        &harness.pool,
        "Alice Admin",
        "alice@empresa.com.br",
        &admin_role,
        "senha-segura-1",
    )
    .await?;
    let token = common::login(&harness.app, "alice@empresa.com.br", "senha-segura-1").await?;

    let (status, _) = common::request(
        &harness.app,
        "POST",
        "/units",
        Some(&token),
        Some(json!({ "name": "Filial Centro" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = common::request(
        &harness.app,
        "POST",
        "/departments",
        Some(&token),
        Some(json!({ "name": "Financeiro" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = common::request(
        &harness.app,
        "PUT",
        "/settings",
        Some(&token),
        Some(json!({ "company_name": "Empresa Exemplo LTDA" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    // Persistence is detached from the mutation; wait for it to settle.
    common::wait_for_count(&harness.pool, "SELECT COUNT(1) FROM audit_logs", 3).await?;

    // The session's in-memory view serves immediately, newest first.
    let (status, trail) =
        common::request(&harness.app, "GET", "/audit-logs", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let entries = trail.as_array().context("trail not an array")?;
    assert_eq!(entries.len(), 3);
    assert!(entries[0]["details"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Atualizou as configuracoes"));
    assert_eq!(entries[2]["module"], "unidades");
    assert_eq!(entries[2]["action"], "create");
    assert_eq!(entries[2]["user_name"], "Alice Admin");

    Ok(())
}

#[tokio::test]
async fn trail_survives_session_teardown_via_hydration() -> Result<()> {
    let harness = common::spawn_app().await?;

    let admin_role = common::seed_role(&harness.pool, "TI", json!({}), true).await?;
    common::seed_user(
        &harness.pool,
        "Alice Admin",
        "alice@empresa.com.br",
        &admin_role,
        "senha-segura-1",
    )
    .await?;
    let token = common::login(&harness.app, "alice@empresa.com.br", "senha-segura-1").await?;

    let (status, _) = common::request(
        &harness.app,
        "POST",
        "/units",
        Some(&token),
        Some(json!({ "name": "Filial Norte" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    common::wait_for_count(&harness.pool, "SELECT COUNT(1) FROM audit_logs", 1).await?;

    let (status, _) = common::request(&harness.app, "POST", "/auth/logout", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);

    // A fresh session is hydrated from the durable rows.
    let token = common::login(&harness.app, "alice@empresa.com.br", "senha-segura-1").await?;
    let (status, trail) =
        common::request(&harness.app, "GET", "/audit-logs", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let entries = trail.as_array().context("trail not an array")?;
    assert!(entries
        .iter()
        .any(|entry| entry["details"] == "Criou a unidade 'Filial Norte'"));

    Ok(())
}
