#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use gestor::create_app;
use gestor::utils::hash_password;

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn spawn_app() -> Result<TestApp> {
    let dir = TempDir::new().context("failed to create tempdir")?;
    let db_path = dir.path().join("test.db");
    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"),
    )
    .await?;
    migrator.run(&pool).await?;

    std::env::set_var("JWT_SECRET", "test-secret");
    let app = create_app(pool.clone()).await?;

    Ok(TestApp {
        app,
        pool,
        _dir: dir,
    })
}

/// Insert a role row; `permissions` is the JSON grant table.
pub async fn seed_role(
    pool: &SqlitePool,
    name: &str,
    permissions: Value,
    is_system_admin: bool,
) -> Result<String> {
    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now();

    sqlx::query(
        "INSERT INTO roles (id, name, description, permissions, is_system_admin, created_at, updated_at) \
         VALUES (?, ?, NULL, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(permissions.to_string())
    .bind(is_system_admin)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Insert a profile plus a matching credential so the user can sign in.
pub async fn seed_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    role_id: &str,
    password: &str,
) -> Result<String> {
    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now();

    sqlx::query(
        "INSERT INTO user_profiles (id, name, email, avatar, role_id, department, position, \
                                    is_active, dark_mode, created_at, updated_at) \
         VALUES (?, ?, ?, NULL, ?, NULL, NULL, 1, 0, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(email)
    .bind(role_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let password_hash = hash_password(password).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    sqlx::query(
        "INSERT INTO credentials (user_id, email, password_hash, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Sign in over HTTP and return the bearer token.
pub async fn login(app: &Router, email: &str, password: &str) -> Result<String> {
    let (status, body) = request(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::OK, "login failed: {status} - {body}");

    body.get("token")
        .and_then(|value| value.as_str())
        .map(|token| token.to_string())
        .context("missing token in login response")
}

/// One-shot request helper. Returns the status and the parsed JSON body (or
/// `Value::Null` when the body is empty).
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    payload: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let body = match payload {
        Some(payload) => Body::from(payload.to_string()),
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body)?).await?;
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), 10_485_760).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
    };

    Ok((status, value))
}

/// Poll the database until `count_sql` reaches `expected`, or time out.
/// Background persistence is fire-and-forget, so tests wait rather than race.
pub async fn wait_for_count(pool: &SqlitePool, count_sql: &str, expected: i64) -> Result<()> {
    for _ in 0..50 {
        let count: i64 = sqlx::query_scalar(count_sql).fetch_one(pool).await?;
        if count >= expected {
            return Ok(());
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    anyhow::bail!("timed out waiting for `{count_sql}` to reach {expected}")
}
