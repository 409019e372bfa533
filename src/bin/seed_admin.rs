//! One-shot bootstrap: seeds the initial admin account so there is someone
//! able to call the admin-only registration endpoint.

use authgate::{auth::password::hash_password, config::AppConfig, db, users::repo::User};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await?;

    db::ensure_schema(&pool).await?;

    let hash = hash_password(ADMIN_PASSWORD)?;
    match User::create(&pool, ADMIN_USERNAME, &hash, "admin").await {
        Ok(user) => info!(user_id = user.id, "admin user created"),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            info!("admin user already exists, nothing to do");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
