use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn full_api_flow() -> Result<()> {
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

    let admin_token = common::login(&harness.app, "alice@empresa.com.br", "senha-segura-1").await?;

    // Bootstrap bundle carries the role table.
    let (status, bundle) = common::request(
        &harness.app,
        "GET",
        "/session/bootstrap",
        Some(&admin_token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let roles = bundle["roles"].as_array().context("roles missing")?;
    assert!(roles.iter().any(|role| role["name"] == "TI"));

    // Create a restricted role.
    let (status, role) = common::request(
        &harness.app,
        "POST",
        "/roles",
        Some(&admin_token),
        Some(json!({
            "name": "Financeiro",
            "permissions": {
                "lancamentos": ["view", "create"],
                "tarefas": ["view"]
            }
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{role}");
    let finance_role_id = role["id"].as_str().context("missing role id")?.to_string();

    // Provision a collaborator on it; the temporary password appears once.
    let (status, created) = common::request(
        &harness.app,
        "POST",
        "/users",
        Some(&admin_token),
        Some(json!({
            "name": "Bruno Financeiro",
            "email": "bruno@empresa.com.br",
            "role_id": finance_role_id
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let temp_password = created["temp_password"]
        .as_str()
        .context("missing temp password")?
        .to_string();

    // The profile listing never exposes credential material.
    let (status, users) =
        common::request(&harness.app, "GET", "/users", Some(&admin_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let listing = users.to_string();
    assert!(!listing.contains(&temp_password));
    assert!(!listing.contains("password"));

    // The collaborator can sign in with the one-shot password.
    let member_token = common::login(&harness.app, "bruno@empresa.com.br", &temp_password).await?;

    // Ungranted modules deny with 403.
    for uri in ["/roles", "/audit-logs", "/dashboard", "/users"] {
        let (status, _) = common::request(&harness.app, "GET", uri, Some(&member_token), None).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri} leaked");
    }

    // Granted module works.
    let (status, expense) = common::request(
        &harness.app,
        "POST",
        "/expenses",
        Some(&member_token),
        Some(json!({
            "description": "Material de escritorio",
            "amount": 150.0,
            "expense_date": "2025-08-01T12:00:00Z"
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{expense}");
    assert_eq!(expense["status"], "pending");
    let expense_id = expense["id"].as_str().context("missing expense id")?.to_string();

    // Approval requires a grant the collaborator does not hold.
    let (status, _) = common::request(
        &harness.app,
        "POST",
        &format!("/expenses/{expense_id}/decision"),
        Some(&member_token),
        Some(json!({ "status": "approved" })),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The system admin can decide it.
    let (status, decided) = common::request(
        &harness.app,
        "POST",
        &format!("/expenses/{expense_id}/decision"),
        Some(&admin_token),
        Some(json!({ "status": "approved" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{decided}");
    assert_eq!(decided["status"], "approved");

    // The admin session's trail lists its own actions newest first.
    let (status, trail) =
        common::request(&harness.app, "GET", "/audit-logs", Some(&admin_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let entries = trail.as_array().context("trail not an array")?;
    assert!(entries.len() >= 3);
    assert!(entries[0]["details"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Aprovou"));

    let mut previous: Option<chrono::DateTime<chrono::Utc>> = None;
    for entry in entries {
        let timestamp = entry["timestamp"].as_str().context("missing timestamp")?;
        let timestamp = chrono::DateTime::parse_from_rfc3339(timestamp)?.with_timezone(&chrono::Utc);
        if let Some(newer) = previous {
            assert!(newer >= timestamp, "trail out of order");
        }
        previous = Some(timestamp);
    }

    Ok(())
}

#[tokio::test]
async fn deactivated_accounts_cannot_sign_in() -> Result<()> {
    let harness = common::spawn_app().await?;

    let admin_role = common::seed_role(&harness.pool, "TI", json!({}), true).await?;
    let user_id = common::seed_user(
        &harness.pool,
        "Carla",
        "carla@empresa.com.br",
        &admin_role,
        "senha-segura-1",
    )
    .await?;

    sqlx::query("UPDATE user_profiles SET is_active = 0 WHERE id = ?")
        .bind(&user_id)
        .execute(&harness.pool)
        .await?;

    let (status, _) = common::request(
        &harness.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "carla@empresa.com.br", "password": "senha-segura-1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn legacy_admin_role_name_grants_full_access() -> Result<()> {
    let harness = common::spawn_app().await?;

    // Flag off, empty grants; only the name carries the carve-out.
    let role = common::seed_role(&harness.pool, "Administrador", json!({}), false).await?;
    common::seed_user(
        &harness.pool,
        "Dona Admin",
        "dona@empresa.com.br",
        &role,
        "senha-segura-1",
    )
    .await?;

    let token = common::login(&harness.app, "dona@empresa.com.br", "senha-segura-1").await?;

    for uri in ["/roles", "/users", "/audit-logs", "/dashboard"] {
        let (status, _) = common::request(&harness.app, "GET", uri, Some(&token), None).await?;
        assert_eq!(status, StatusCode::OK, "{uri} denied");
    }

    Ok(())
}
