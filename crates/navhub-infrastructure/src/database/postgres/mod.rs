//! PostgreSQL repository implementations

pub mod user_repo_impl;
pub mod menu_repo_impl;
pub mod node_repo_impl;
pub mod health;

pub use user_repo_impl::PgUserRepository;
pub use menu_repo_impl::PgMenuRepository;
pub use node_repo_impl::PgNodeRepository;
pub use health::PgStoreHealth;

use navhub_core::error::DomainError;
use tracing::error;

/// Maps a driver error to `DatabaseError`, logging it with `context`.
pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e: sqlx::Error| {
        error!("Database error {}: {}", context, e);
        DomainError::DatabaseError(e.to_string())
    }
}

use navhub_core::domain::ParentRef;
use sqlx::PgConnection;
use uuid::Uuid;

/// Advisory key shared by every node move.
pub(crate) const MOVE_LOCK_KEY: &str = "node-moves";

/// Serializes writers on `key` until the surrounding transaction ends.
pub(crate) async fn lock_key(conn: &mut PgConnection, key: &str) -> Result<(), DomainError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(key)
        .execute(&mut *conn)
        .await
        .map_err(db_error("acquiring advisory lock"))?;
    Ok(())
}

/// Resolves `parent` and holds a key-share lock on its row until the
/// transaction ends, so a concurrent delete of the parent waits for us or
/// makes us see it gone.
pub(crate) async fn parent_exists(conn: &mut PgConnection, parent: &ParentRef) -> Result<bool, DomainError> {
    let sql = match parent {
        ParentRef::Menu(_) => "SELECT id FROM menus WHERE id = $1 FOR KEY SHARE",
        ParentRef::Node(_) => "SELECT id FROM nodes WHERE id = $1 FOR KEY SHARE",
    };
    let found: Option<Uuid> = sqlx::query_scalar(sql)
        .bind(parent.id())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("resolving parent"))?;
    Ok(found.is_some())
}

/// Children of `parent`, leaving out `exclude` when given.
pub(crate) async fn count_children(
    conn: &mut PgConnection,
    parent: &ParentRef,
    exclude: Option<Uuid>,
) -> Result<usize, DomainError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM nodes
        WHERE parent_kind = $1 AND parent_id = $2 AND ($3::uuid IS NULL OR id <> $3)
        "#,
    )
    .bind(parent.kind().as_str())
    .bind(parent.id())
    .bind(exclude)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error("counting children"))?;

    Ok(usize::try_from(count).unwrap_or_default())
}

/// Deletes every node below `parent`, returning how many were removed.
///
/// Rows are locked one level at a time. An insert that already holds a key
/// share on a doomed node commits before its level is read and is collected;
/// a later one waits for this transaction and then finds its parent gone.
pub(crate) async fn delete_subtree(conn: &mut PgConnection, parent: &ParentRef) -> Result<usize, DomainError> {
    let mut doomed: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM nodes WHERE parent_kind = $1 AND parent_id = $2 FOR UPDATE",
    )
    .bind(parent.kind().as_str())
    .bind(parent.id())
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error("locking subtree"))?;

    let mut frontier = doomed.clone();
    while !frontier.is_empty() {
        let next: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM nodes
            WHERE parent_kind = 'Node' AND parent_id = ANY($1) AND id <> ALL($2)
            FOR UPDATE
            "#,
        )
        .bind(&frontier)
        .bind(&doomed)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error("locking subtree"))?;
        doomed.extend(next.iter().copied());
        frontier = next;
    }

    if doomed.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query("DELETE FROM nodes WHERE id = ANY($1)")
        .bind(&doomed)
        .execute(&mut *conn)
        .await
        .map_err(db_error("deleting subtree"))?;

    Ok(result.rows_affected() as usize)
}
