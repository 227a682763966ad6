//! User Repository

use super::{RepoError, RepoResult, Tx};
use shared::models::{Role, User};
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, email, password_hash, role, verified, verification_pin_hash, verification_pin_expires_at, verification_pin_attempts, created_at, updated_at FROM users";

/// Fields for a new account
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub verified: bool,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE email = ? COLLATE NOCASE"))
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn insert(tx: &mut Tx<'_>, data: NewUser<'_>) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, role, verified, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    )
    .bind(id)
    .bind(data.email)
    .bind(data.password_hash)
    .bind(data.role)
    .bind(data.verified)
    .bind(now)
    .execute(&mut **tx)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("User with email {} already exists", data.email))
        }
        other => other,
    })?;
    Ok(id)
}

pub async fn create(pool: &SqlitePool, data: NewUser<'_>) -> RepoResult<User> {
    let mut tx = pool.begin().await?;
    let id = insert(&mut tx, data).await?;
    tx.commit().await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(password_hash)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

/// Store a hashed PIN for verification or password reset
pub async fn set_pin(
    tx: &mut Tx<'_>,
    id: i64,
    pin_hash: &str,
    expires_at: i64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE users SET verification_pin_hash = ?1, verification_pin_expires_at = ?2, verification_pin_attempts = 0, updated_at = ?3 WHERE id = ?4",
    )
    .bind(pin_hash)
    .bind(expires_at)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(&mut **tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

/// Consume the PIN and mark the account verified, optionally replacing the password
pub async fn consume_pin(
    pool: &SqlitePool,
    id: i64,
    new_password_hash: Option<&str>,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE users SET verified = 1, verification_pin_hash = NULL, verification_pin_expires_at = NULL, verification_pin_attempts = 0, password_hash = COALESCE(?1, password_hash), updated_at = ?2 WHERE id = ?3",
    )
    .bind(new_password_hash)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Count one guess against the current PIN
///
/// Returns false once `max_attempts` guesses have been made.
pub async fn claim_pin_attempt(pool: &SqlitePool, id: i64, max_attempts: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE users SET verification_pin_attempts = verification_pin_attempts + 1 WHERE id = ?1 AND verification_pin_attempts < ?2",
    )
    .bind(id)
    .bind(max_attempts)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

pub async fn update_role(tx: &mut Tx<'_>, id: i64, role: Role) -> RepoResult<()> {
    sqlx::query("UPDATE users SET role = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(role)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Ids of every user holding one of `roles`
pub async fn find_ids_by_roles(tx: &mut Tx<'_>, roles: &[Role]) -> RepoResult<Vec<i64>> {
    if roles.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; roles.len()].join(", ");
    let sql = format!("SELECT id FROM users WHERE role IN ({placeholders}) ORDER BY id");
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for role in roles {
        query = query.bind(*role);
    }
    Ok(query.fetch_all(&mut **tx).await?)
}

/// Addresses of every user holding one of `roles`
pub async fn find_emails_by_roles(tx: &mut Tx<'_>, roles: &[Role]) -> RepoResult<Vec<String>> {
    if roles.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; roles.len()].join(", ");
    let sql = format!("SELECT email FROM users WHERE role IN ({placeholders}) ORDER BY id");
    let mut query = sqlx::query_scalar::<_, String>(&sql);
    for role in roles {
        query = query.bind(*role);
    }
    Ok(query.fetch_all(&mut **tx).await?)
}

pub async fn find_all_emails(tx: &mut Tx<'_>) -> RepoResult<Vec<String>> {
    let emails = sqlx::query_scalar::<_, String>("SELECT email FROM users ORDER BY id")
        .fetch_all(&mut **tx)
        .await?;
    Ok(emails)
}

pub async fn find_all_ids(tx: &mut Tx<'_>) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM users ORDER BY id")
        .fetch_all(&mut **tx)
        .await?;
    Ok(ids)
}

pub async fn exists(tx: &mut Tx<'_>, id: i64) -> RepoResult<bool> {
    let found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(found > 0)
}
