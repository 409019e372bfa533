use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. The UNIQUE constraint on username is the single
    /// source of truth for duplicates; a violation surfaces as sqlx's
    /// unique-violation database error.
    pub async fn create(
        db: &PgPool,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, role, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(db)
        .await
    }

    /// One page of users ordered by id, plus the total row count.
    /// An out-of-range page yields an empty vec with the true total.
    pub async fn list_page(
        db: &PgPool,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<User>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;

        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page)
        .bind(page_offset(page, per_page))
        .fetch_all(db)
        .await?;

        Ok((rows, total))
    }
}

/// Row offset for a 1-based page. Saturates instead of overflowing so an
/// absurd page number degrades to an empty page, not a panic or a negative
/// OFFSET.
pub fn page_offset(page: i64, per_page: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

/// Number of pages needed for `total` rows at `per_page` rows each.
pub fn page_count(total: i64, per_page: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total + per_page - 1) / per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(5, 2), 3);
        assert_eq!(page_count(4, 2), 2);
        assert_eq!(page_count(1, 2), 1);
    }

    #[test]
    fn page_count_of_empty_store_is_zero() {
        assert_eq!(page_count(0, 2), 0);
    }

    #[test]
    fn page_offset_is_zero_based() {
        assert_eq!(page_offset(1, 2), 0);
        assert_eq!(page_offset(10, 2), 18);
    }

    #[test]
    fn page_offset_saturates_on_huge_pages() {
        assert_eq!(page_offset(i64::MAX, 100), i64::MAX);
        assert!(page_offset(i64::MAX - 1, i64::MAX) >= 0);
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: 1,
            username: "alice".into(),
            password_hash: "$argon2id$secret".into(),
            role: ROLE_USER.into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("alice"));
    }
}
