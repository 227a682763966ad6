//! Project Repository

use super::{RepoError, RepoResult, Tx};
use chrono::NaiveDate;
use shared::models::{Project, ProjectCounts, ProjectCreate, ProjectUpdate, WorkStatus};
use sqlx::SqlitePool;

const PROJECT_SELECT: &str = "SELECT p.id, p.title, p.description, p.start_date, p.end_date, p.user_id, p.progress, p.status, p.estimated_time, p.github_repo, p.created_at, p.updated_at FROM projects p";

/// Owner or assignee of the project
const MEMBER_CLAUSE: &str = "(?1 IS NULL OR p.user_id = ?1 OR EXISTS (SELECT 1 FROM project_assignees pa WHERE pa.project_id = p.id AND pa.user_id = ?1))";

const UNSETTLED_CLAUSE: &str = "p.status NOT IN ('completed', 'cancelled', 'overdue')";

async fn load_assignees(pool: &SqlitePool, project: &mut Project) -> RepoResult<()> {
    project.assignees = find_assignees(pool, project.id).await?;
    Ok(())
}

pub async fn find_assignees(pool: &SqlitePool, project_id: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT user_id FROM project_assignees WHERE project_id = ? ORDER BY user_id",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

async fn with_assignees(pool: &SqlitePool, mut projects: Vec<Project>) -> RepoResult<Vec<Project>> {
    for project in &mut projects {
        load_assignees(pool, project).await?;
    }
    Ok(projects)
}

pub async fn insert(pool: &SqlitePool, owner_id: i64, data: &ProjectCreate) -> RepoResult<Project> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO projects (id, title, description, start_date, end_date, user_id, progress, status, estimated_time, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(owner_id)
    .bind(data.progress.unwrap_or(0))
    .bind(data.status.unwrap_or_default())
    .bind(&data.estimated_time)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    add_assignees(&mut tx, id, &data.assignees).await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create project".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Project>> {
    let project = sqlx::query_as::<_, Project>(&format!("{PROJECT_SELECT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match project {
        Some(mut project) => {
            load_assignees(pool, &mut project).await?;
            Ok(Some(project))
        }
        None => Ok(None),
    }
}

/// All projects, or only those `member` owns or is assigned to
pub async fn list(pool: &SqlitePool, member: Option<i64>) -> RepoResult<Vec<Project>> {
    let projects = sqlx::query_as::<_, Project>(&format!(
        "{PROJECT_SELECT} WHERE {MEMBER_CLAUSE} ORDER BY p.created_at DESC"
    ))
    .bind(member)
    .fetch_all(pool)
    .await?;
    with_assignees(pool, projects).await
}

pub async fn update(pool: &SqlitePool, id: i64, data: &ProjectUpdate) -> RepoResult<Project> {
    let rows = sqlx::query(
        "UPDATE projects SET title = COALESCE(?1, title), description = COALESCE(?2, description), start_date = COALESCE(?3, start_date), end_date = COALESCE(?4, end_date), progress = COALESCE(?5, progress), status = COALESCE(?6, status), estimated_time = COALESCE(?7, estimated_time), updated_at = ?8 WHERE id = ?9",
    )
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.progress)
    .bind(data.status)
    .bind(&data.estimated_time)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Project {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Project {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Project {id} not found")));
    }
    Ok(())
}

/// Add assignees, ignoring ones already present; returns the newly added ids
pub async fn add_assignees(tx: &mut Tx<'_>, project_id: i64, user_ids: &[i64]) -> RepoResult<Vec<i64>> {
    let mut added = Vec::new();
    for user_id in user_ids {
        let result = sqlx::query(
            "INSERT INTO project_assignees (project_id, user_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
        if result.rows_affected() > 0 {
            added.push(*user_id);
        }
    }
    Ok(added)
}

pub async fn exists(tx: &mut Tx<'_>, id: i64) -> RepoResult<bool> {
    let found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE id = ?")
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(found > 0)
}

pub async fn set_github_repo(pool: &SqlitePool, id: i64, url: &str) -> RepoResult<Project> {
    let rows = sqlx::query("UPDATE projects SET github_repo = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(url)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Project {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Project {id} not found")))
}

/// Projects per status, optionally restricted to one member
pub async fn count_by_status(pool: &SqlitePool, member: Option<i64>) -> RepoResult<ProjectCounts> {
    let rows = sqlx::query_as::<_, (WorkStatus, i64)>(&format!(
        "SELECT p.status, COUNT(*) FROM projects p WHERE {MEMBER_CLAUSE} GROUP BY p.status"
    ))
    .bind(member)
    .fetch_all(pool)
    .await?;

    let mut counts = ProjectCounts::default();
    for (status, n) in rows {
        counts.add(status, n);
    }
    Ok(counts)
}

/// Unsettled projects whose end date is before `today`
pub async fn find_past_due(pool: &SqlitePool, today: NaiveDate) -> RepoResult<Vec<Project>> {
    let projects = sqlx::query_as::<_, Project>(&format!(
        "{PROJECT_SELECT} WHERE p.end_date < ? AND {UNSETTLED_CLAUSE} ORDER BY p.end_date"
    ))
    .bind(today)
    .fetch_all(pool)
    .await?;
    with_assignees(pool, projects).await
}

/// Unsettled projects ending in `[from, to]`
pub async fn find_due_between(
    pool: &SqlitePool,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<Vec<Project>> {
    let projects = sqlx::query_as::<_, Project>(&format!(
        "{PROJECT_SELECT} WHERE p.end_date >= ? AND p.end_date <= ? AND {UNSETTLED_CLAUSE} ORDER BY p.end_date"
    ))
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    with_assignees(pool, projects).await
}

/// Flip to overdue; `false` if the project was settled in the meantime
pub async fn mark_overdue(tx: &mut Tx<'_>, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE projects SET status = 'overdue', updated_at = ?1 WHERE id = ?2 AND status NOT IN ('completed', 'cancelled', 'overdue')",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// (assigned, completed) project counts for a user
pub async fn count_for_member(pool: &SqlitePool, user_id: i64) -> RepoResult<(i64, i64)> {
    let counts = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COALESCE(SUM(p.status = 'completed'), 0) FROM projects p JOIN project_assignees pa ON pa.project_id = p.id WHERE pa.user_id = ?",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(counts)
}
