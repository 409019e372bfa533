use sqlx::PgPool;

/// Create the users table if it does not exist yet.
///
/// Username uniqueness lives in the UNIQUE constraint so that two concurrent
/// registrations for the same name cannot both commit; the application layer
/// only translates the violation into a conflict response.
pub async fn ensure_schema(db: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(db)
    .await?;
    Ok(())
}
