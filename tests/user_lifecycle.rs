use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn temp_password_is_one_shot_and_resettable() -> Result<()> {
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

    let member_role = common::seed_role(
        &harness.pool,
        "Operacional",
        json!({ "tarefas": ["view"] }),
        false,
    )
    .await?;

    let (status, created) = common::request(
        &harness.app,
        "POST",
        "/users",
        Some(&admin_token),
        Some(json!({
            "name": "Bruno",
            "email": "bruno@empresa.com.br",
            "role_id": member_role
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let user_id = created["user"]["id"].as_str().context("missing id")?.to_string();
    let temp_password = created["temp_password"]
        .as_str()
        .context("missing temp password")?
        .to_string();

    // Works once issued.
    common::login(&harness.app, "bruno@empresa.com.br", &temp_password).await?;

    // Admin replaces it out-of-band.
    let (status, _) = common::request(
        &harness.app,
        "POST",
        &format!("/users/{user_id}/password"),
        Some(&admin_token),
        Some(json!({ "new_password": "NovaSenhaForte1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    // Old credential is dead, the new one signs in.
    let (status, _) = common::request(
        &harness.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "bruno@empresa.com.br", "password": temp_password })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::login(&harness.app, "bruno@empresa.com.br", "NovaSenhaForte1").await?;

    Ok(())
}

#[tokio::test]
async fn self_deletion_is_rejected_before_any_write() -> Result<()> {
    let harness = common::spawn_app().await?;

    let admin_role = common::seed_role(&harness.pool, "TI", json!({}), true).await?;
    let admin_id = common::seed_user(
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
        "DELETE",
        &format!("/users/{admin_id}"),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was deleted, durably or in the session.
    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM user_profiles WHERE id = ?")
        .bind(&admin_id)
        .fetch_one(&harness.pool)
        .await?;
    assert_eq!(profiles, 1);
    let credentials: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM credentials WHERE user_id = ?")
        .bind(&admin_id)
        .fetch_one(&harness.pool)
        .await?;
    assert_eq!(credentials, 1);

    let (status, _) = common::request(&harness.app, "GET", "/users", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn deleting_a_collaborator_revokes_the_account() -> Result<()> {
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
    let member_role = common::seed_role(&harness.pool, "Operacional", json!({}), false).await?;
    let member_id = common::seed_user(
        &harness.pool,
        "Bruno",
        "bruno@empresa.com.br",
        &member_role,
        "senha-segura-2",
    )
    .await?;

    let token = common::login(&harness.app, "alice@empresa.com.br", "senha-segura-1").await?;

    let (status, _) = common::request(
        &harness.app,
        "DELETE",
        &format!("/users/{member_id}"),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM user_profiles WHERE id = ?")
        .bind(&member_id)
        .fetch_one(&harness.pool)
        .await?;
    assert_eq!(profiles, 0);

    let (status, _) = common::request(
        &harness.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "bruno@empresa.com.br", "password": "senha-segura-2" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}
