// ============================================================================
// NavHub Infrastructure - PostgreSQL Menu Repository
// File: crates/navhub-infrastructure/src/database/postgres/menu_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use tracing::{debug, info};
use chrono::{DateTime, Utc};

use navhub_core::domain::{DeleteOutcome, Menu, NewMenu, OrphanPolicy, ParentRef};
use navhub_core::error::DomainError;
use navhub_core::repositories::MenuRepository;
use navhub_core::services::CapacityPolicy;
use navhub_shared::constants::MENU_SEQUENCE_NAME;

use super::{count_children, db_error, delete_subtree, lock_key};

/// Advisory lock shared by every menu insert.
const MENU_TABLE_LOCK: &str = "menus";

pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct MenuRow {
    pub id: Uuid,
    pub sequence_number: i64,
    pub name: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Menu {
            id: row.id,
            sequence_number: row.sequence_number,
            name: row.name,
            display_order: row.display_order,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn list(&self) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = sqlx::query_as(
            r#"
            SELECT id, sequence_number, name, display_order, created_at, modified_at
            FROM menus
            ORDER BY display_order, sequence_number
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing menus"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Menu>, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(
            r#"
            SELECT id, sequence_number, name, display_order, created_at, modified_at
            FROM menus
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding menu by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, menu: &NewMenu, capacity: &CapacityPolicy) -> Result<Menu, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting menu insert"))?;

        lock_key(&mut tx, MENU_TABLE_LOCK).await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menus")
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("counting menus"))?;
        capacity.check_menu_capacity(usize::try_from(existing).unwrap_or_default())?;

        let sequence_number: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sequence_counters (name, current_value)
            VALUES ($1, 1)
            ON CONFLICT (name) DO UPDATE SET current_value = sequence_counters.current_value + 1
            RETURNING current_value
            "#
        )
        .bind(MENU_SEQUENCE_NAME)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("advancing menu sequence"))?;

        let row: MenuRow = sqlx::query_as(
            r#"
            INSERT INTO menus (id, sequence_number, name, display_order, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, sequence_number, name, display_order, created_at, modified_at
            "#
        )
        .bind(menu.id)
        .bind(sequence_number)
        .bind(&menu.name)
        .bind(menu.display_order)
        .bind(menu.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("inserting menu"))?;

        tx.commit().await.map_err(db_error("committing menu insert"))?;

        info!("Menu created: {} (#{})", row.id, row.sequence_number);
        Ok(row.into())
    }

    async fn update(&self, menu: &Menu) -> Result<Menu, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(
            r#"
            UPDATE menus
            SET name = $2, display_order = $3, modified_at = $4
            WHERE id = $1
            RETURNING id, sequence_number, name, display_order, created_at, modified_at
            "#
        )
        .bind(menu.id)
        .bind(&menu.name)
        .bind(menu.display_order)
        .bind(menu.modified_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating menu"))?;

        row.map(Into::into).ok_or(DomainError::MenuNotFound(menu.id))
    }

    async fn delete(&self, id: &Uuid, policy: OrphanPolicy) -> Result<DeleteOutcome, DomainError> {
        let as_parent = ParentRef::Menu(*id);
        let mut tx = self.pool.begin().await.map_err(db_error("starting menu delete"))?;

        // Blocks node inserts under this menu until the delete commits.
        lock_key(&mut tx, &as_parent.lock_key()).await?;

        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM menus WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("locking menu"))?;
        if locked.is_none() {
            return Err(DomainError::MenuNotFound(*id));
        }

        let mut outcome = DeleteOutcome::default();
        match policy {
            OrphanPolicy::Orphan => {}
            OrphanPolicy::Cascade => {
                outcome.removed_descendants = delete_subtree(&mut tx, &as_parent).await?;
            }
            OrphanPolicy::Reparent => {
                let children = count_children(&mut tx, &as_parent, None).await?;
                if children > 0 {
                    return Err(DomainError::ValidationError(format!(
                        "Menu still has {children} child nodes. Move or delete them first."
                    )));
                }
            }
        }

        sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deleting menu"))?;

        tx.commit().await.map_err(db_error("committing menu delete"))?;

        debug!(menu_id = %id, removed_descendants = outcome.removed_descendants, "Menu row deleted");
        Ok(outcome)
    }
}
