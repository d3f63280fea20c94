use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use gestor::utils::hash_password;

#[derive(Parser, Debug)]
#[command(author, version, about = "gestor admin and migration tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new empty migration with the provided name
    MakeMigration { name: String },
    /// Apply pending migrations
    MigrateRun,
    /// Show migration status against the current database
    MigrateStatus,
    /// Roll back the last applied migration
    MigrateRollback,
    /// Create the first administrator account and its role
    SeedAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Administrador")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The binary may run from a different CWD (e.g. in Docker); fall back to
    // the crate-local .env.
    if dotenv().is_err() {
        let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::MakeMigration { name } => {
            let path = make_migration_file(&name)?;
            println!("Created migration: {}", path.display());
        }
        Commands::MigrateRun => {
            let pool = get_pool().await?;
            let migrator = get_migrator().await?;
            migrator.run(&pool).await?;
            println!("Migrations applied");
        }
        Commands::MigrateStatus => {
            let pool = get_pool().await?;
            let migrator = get_migrator().await?;
            print_status(&pool, &migrator).await?;
        }
        Commands::MigrateRollback => {
            let pool = get_pool().await?;
            let migrator = get_migrator().await?;
            migrator
                .undo(&pool, 1)
                .await
                .context("no migrations were rolled back")?;
            println!("Rolled back last migration");
        }
        Commands::SeedAdmin {
            email,
            password,
            name,
        } => {
            let pool = get_pool().await?;
            let migrator = get_migrator().await?;
            migrator.run(&pool).await?;
            seed_admin(&pool, &email, &password, &name).await?;
        }
    }

    Ok(())
}

fn make_migration_file(name: &str) -> anyhow::Result<PathBuf> {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let sanitized = sanitize_name(name);
    let filename = format!("{}_{}.sql", timestamp, sanitized);
    let path = Path::new("migrations").join(filename);

    if path.exists() {
        anyhow::bail!("migration already exists: {}", path.display());
    }

    fs::write(&path, "-- Write your migration SQL here\n")
        .with_context(|| format!("failed to create migration at {}", path.display()))?;

    Ok(path)
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

async fn get_pool() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to database")
}

async fn get_migrator() -> anyhow::Result<sqlx::migrate::Migrator> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    sqlx::migrate::Migrator::new(dir)
        .await
        .context("failed to load migrations directory")
}

async fn print_status(pool: &SqlitePool, migrator: &sqlx::migrate::Migrator) -> anyhow::Result<()> {
    // If the migrations table doesn't exist, nothing is applied yet
    let table_exists = sqlx::query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'",
    )
    .fetch_optional(pool)
    .await?;

    let applied_versions: HashSet<i64> = if table_exists.is_some() {
        let rows = sqlx::query("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;
        rows.iter()
            .filter_map(|row| row.try_get::<i64, _>("version").ok())
            .collect()
    } else {
        HashSet::new()
    };

    println!("{:<8} {:<20} {}", "Status", "Version", "Name");
    for migration in migrator.iter() {
        let version = migration.version;
        let applied = applied_versions.contains(&version);
        let status = if applied { "applied" } else { "pending" };
        let desc = migration.description.as_ref().trim();
        println!("{:<8} {:<20} {}", status, version, desc);
    }

    Ok(())
}

/// Bootstrap a system administrator: a role with the admin flag, a profile on
/// it and a credential. Idempotent on the role, strict on the email.
async fn seed_admin(pool: &SqlitePool, email: &str, password: &str, name: &str) -> anyhow::Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM credentials WHERE email = ?")
        .bind(email)
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        anyhow::bail!("an account for {email} already exists");
    }

    let now = Utc::now();

    let role_id: Option<String> =
        sqlx::query_scalar("SELECT id FROM roles WHERE is_system_admin = 1 LIMIT 1")
            .fetch_optional(pool)
            .await?;
    let role_id = match role_id {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO roles (id, name, description, permissions, is_system_admin, created_at, updated_at) \
                 VALUES (?, 'Administrador', 'Acesso total ao sistema', '{}', 1, ?, ?)",
            )
            .bind(&id)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await?;
            id
        }
    };

    let user_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO user_profiles (id, name, email, avatar, role_id, department, position, \
                                    is_active, dark_mode, created_at, updated_at) \
         VALUES (?, ?, ?, NULL, ?, NULL, NULL, 1, 0, ?, ?)",
    )
    .bind(&user_id)
    .bind(name)
    .bind(email)
    .bind(&role_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let password_hash = hash_password(password).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    sqlx::query(
        "INSERT INTO credentials (user_id, email, password_hash, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user_id)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    println!("Administrator {email} created");

    Ok(())
}
