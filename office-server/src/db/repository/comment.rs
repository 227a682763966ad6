//! Comment and Attachment Repository
//!
//! Both hang off either a project or a ticket.

use super::{RepoError, RepoResult};
use shared::models::{Attachment, AttachmentCreate, Comment, CommentCreate};
use sqlx::SqlitePool;

/// Which parent a listing is for
#[derive(Debug, Clone, Copy)]
pub enum Parent {
    Project(i64),
    Ticket(i64),
}

impl Parent {
    fn column(&self) -> (&'static str, i64) {
        match self {
            Parent::Project(id) => ("project_id", *id),
            Parent::Ticket(id) => ("ticket_id", *id),
        }
    }
}

pub async fn insert_comment(pool: &SqlitePool, user_id: i64, data: &CommentCreate) -> RepoResult<Comment> {
    let comment = Comment {
        id: shared::util::snowflake_id(),
        comment: data.comment.clone(),
        user_id,
        project_id: data.project_id,
        ticket_id: data.ticket_id,
        created_at: shared::util::now_millis(),
    };
    sqlx::query(
        "INSERT INTO comments (id, comment, user_id, project_id, ticket_id, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(comment.id)
    .bind(&comment.comment)
    .bind(comment.user_id)
    .bind(comment.project_id)
    .bind(comment.ticket_id)
    .bind(comment.created_at)
    .execute(pool)
    .await?;
    Ok(comment)
}

pub async fn list_comments(pool: &SqlitePool, parent: Parent) -> RepoResult<Vec<Comment>> {
    let (column, id) = parent.column();
    let comments = sqlx::query_as::<_, Comment>(&format!(
        "SELECT id, comment, user_id, project_id, ticket_id, created_at FROM comments WHERE {column} = ? ORDER BY created_at"
    ))
    .bind(id)
    .fetch_all(pool)
    .await?;
    Ok(comments)
}

pub async fn delete_comment(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Comment {id} not found")));
    }
    Ok(())
}

pub async fn insert_attachment(
    pool: &SqlitePool,
    user_id: i64,
    data: &AttachmentCreate,
) -> RepoResult<Attachment> {
    let attachment = Attachment {
        id: shared::util::snowflake_id(),
        attachment: data.attachment.clone(),
        user_id,
        project_id: data.project_id,
        ticket_id: data.ticket_id,
        created_at: shared::util::now_millis(),
    };
    sqlx::query(
        "INSERT INTO attachments (id, attachment, user_id, project_id, ticket_id, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(attachment.id)
    .bind(&attachment.attachment)
    .bind(attachment.user_id)
    .bind(attachment.project_id)
    .bind(attachment.ticket_id)
    .bind(attachment.created_at)
    .execute(pool)
    .await?;
    Ok(attachment)
}

pub async fn list_attachments(pool: &SqlitePool, parent: Parent) -> RepoResult<Vec<Attachment>> {
    let (column, id) = parent.column();
    let attachments = sqlx::query_as::<_, Attachment>(&format!(
        "SELECT id, attachment, user_id, project_id, ticket_id, created_at FROM attachments WHERE {column} = ? ORDER BY created_at"
    ))
    .bind(id)
    .fetch_all(pool)
    .await?;
    Ok(attachments)
}

pub async fn delete_attachment(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM attachments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Attachment {id} not found")));
    }
    Ok(())
}
