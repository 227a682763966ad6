//! Announcement Repository

use super::{RepoError, RepoResult, Tx};
use shared::models::{Announcement, AnnouncementCreate, AnnouncementUpdate};
use sqlx::SqlitePool;

const ANNOUNCEMENT_SELECT: &str =
    "SELECT id, title, body, created_by, created_at, updated_at FROM announcements";

pub async fn insert(tx: &mut Tx<'_>, created_by: i64, data: &AnnouncementCreate) -> RepoResult<Announcement> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO announcements (id, title, body, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    )
    .bind(id)
    .bind(&data.title)
    .bind(&data.body)
    .bind(created_by)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(Announcement {
        id,
        title: data.title.clone(),
        body: data.body.clone(),
        created_by,
        created_at: now,
        updated_at: now,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Announcement>> {
    let announcement =
        sqlx::query_as::<_, Announcement>(&format!("{ANNOUNCEMENT_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(announcement)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Announcement>> {
    let announcements =
        sqlx::query_as::<_, Announcement>(&format!("{ANNOUNCEMENT_SELECT} ORDER BY created_at DESC"))
            .fetch_all(pool)
            .await?;
    Ok(announcements)
}

pub async fn update(pool: &SqlitePool, id: i64, data: &AnnouncementUpdate) -> RepoResult<Announcement> {
    let rows = sqlx::query(
        "UPDATE announcements SET title = COALESCE(?1, title), body = COALESCE(?2, body), updated_at = ?3 WHERE id = ?4",
    )
    .bind(&data.title)
    .bind(&data.body)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Announcement {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Announcement {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM announcements WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Announcement {id} not found")));
    }
    Ok(())
}
