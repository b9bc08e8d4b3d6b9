// ============================================================================
// NavHub Infrastructure - PostgreSQL Node Repository
// File: crates/navhub-infrastructure/src/database/postgres/node_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use tracing::{debug, info};
use chrono::{DateTime, Utc};

use navhub_core::domain::{
    ContentItem, DeleteOutcome, Node, NodeChanges, OrphanPolicy, ParentKind, ParentRef, TemplateType,
};
use navhub_core::error::DomainError;
use navhub_core::repositories::NodeRepository;
use navhub_core::services::CapacityPolicy;

use super::{count_children, db_error, delete_subtree, lock_key, parent_exists, MOVE_LOCK_KEY};

pub struct PgNodeRepository {
    pool: PgPool,
}

impl PgNodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct NodeRow {
    pub id: Uuid,
    pub name: String,
    pub parent_kind: String,
    pub parent_id: Uuid,
    pub template_type: String,
    pub display_order: i32,
    pub content_items: Json<Vec<ContentItem>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl TryFrom<NodeRow> for Node {
    type Error = DomainError;

    fn try_from(row: NodeRow) -> Result<Self, Self::Error> {
        let kind = ParentKind::from_str(&row.parent_kind).ok_or_else(|| {
            DomainError::DatabaseError(format!("node {} has unknown parent kind {}", row.id, row.parent_kind))
        })?;
        let template_type = TemplateType::from_str(&row.template_type).ok_or_else(|| {
            DomainError::DatabaseError(format!("node {} has unknown template {}", row.id, row.template_type))
        })?;

        Ok(Node {
            id: row.id,
            name: row.name,
            parent: ParentRef::new(kind, row.parent_id),
            template_type,
            display_order: row.display_order,
            content_items: row.content_items.0,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

fn into_nodes(rows: Vec<NodeRow>) -> Result<Vec<Node>, DomainError> {
    rows.into_iter().map(Node::try_from).collect()
}

const NODE_COLUMNS: &str = "id, name, parent_kind, parent_id, template_type, display_order, content_items, created_at, modified_at";

impl PgNodeRepository {
    async fn fetch_for_update(conn: &mut PgConnection, id: &Uuid) -> Result<Option<Node>, DomainError> {
        let row: Option<NodeRow> = sqlx::query_as(&format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_error("locking node"))?;

        row.map(Node::try_from).transpose()
    }

    /// Checks that `parent` exists and has room for one more child other than `exclude`.
    async fn admit_child(
        conn: &mut PgConnection,
        parent: &ParentRef,
        exclude: Option<Uuid>,
        capacity: &CapacityPolicy,
    ) -> Result<(), DomainError> {
        lock_key(conn, &parent.lock_key()).await?;

        if !parent_exists(conn, parent).await? {
            return Err(DomainError::ParentNotFound(*parent));
        }
        let siblings = count_children(conn, parent, exclude).await?;
        capacity.check_parent_capacity(parent, siblings)
    }

    /// True when `node_id` is `start` or one of its ancestors.
    async fn is_ancestor_or_self(conn: &mut PgConnection, start: &Uuid, node_id: &Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            WITH RECURSIVE ancestors AS (
                SELECT id, parent_kind, parent_id FROM nodes WHERE id = $1
                UNION
                SELECT n.id, n.parent_kind, n.parent_id FROM nodes n
                JOIN ancestors a ON a.parent_kind = 'Node' AND n.id = a.parent_id
            )
            SELECT EXISTS (SELECT 1 FROM ancestors WHERE id = $2)
            "#,
        )
        .bind(start)
        .bind(node_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error("walking ancestors"))
    }
}

#[async_trait]
impl NodeRepository for PgNodeRepository {
    async fn list_all(&self) -> Result<Vec<Node>, DomainError> {
        let rows: Vec<NodeRow> = sqlx::query_as(&format!(
            "SELECT {NODE_COLUMNS} FROM nodes ORDER BY display_order, created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing nodes"))?;

        into_nodes(rows)
    }

    async fn list_by_parent(&self, parent: &ParentRef) -> Result<Vec<Node>, DomainError> {
        let rows: Vec<NodeRow> = sqlx::query_as(&format!(
            r#"
            SELECT {NODE_COLUMNS} FROM nodes
            WHERE parent_kind = $1 AND parent_id = $2
            ORDER BY display_order, created_at
            "#
        ))
        .bind(parent.kind().as_str())
        .bind(parent.id())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing nodes by parent"))?;

        into_nodes(rows)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Node>, DomainError> {
        let row: Option<NodeRow> = sqlx::query_as(&format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("finding node by id"))?;

        row.map(Node::try_from).transpose()
    }

    async fn create(&self, node: &Node, capacity: &CapacityPolicy) -> Result<Node, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting node insert"))?;

        Self::admit_child(&mut tx, &node.parent, None, capacity).await?;

        let row: NodeRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO nodes (id, name, parent_kind, parent_id, template_type, display_order, content_items, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {NODE_COLUMNS}
            "#
        ))
        .bind(node.id)
        .bind(&node.name)
        .bind(node.parent.kind().as_str())
        .bind(node.parent.id())
        .bind(node.template_type.as_str())
        .bind(node.display_order)
        .bind(Json(&node.content_items))
        .bind(node.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("inserting node"))?;

        tx.commit().await.map_err(db_error("committing node insert"))?;

        info!("Node created: {} under {}", row.id, node.parent);
        Node::try_from(row)
    }

    async fn update(&self, id: &Uuid, changes: &NodeChanges, capacity: &CapacityPolicy) -> Result<Node, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting node update"))?;

        if let Some(target) = &changes.parent {
            // Moves run one at a time so two of them cannot close a loop.
            lock_key(&mut tx, MOVE_LOCK_KEY).await?;
            lock_key(&mut tx, &target.lock_key()).await?;
        }

        let mut node = Self::fetch_for_update(&mut tx, id)
            .await?
            .ok_or(DomainError::NodeNotFound(*id))?;

        let moved = node.apply_changes(changes)?;
        if moved {
            if let ParentRef::Node(parent_id) = node.parent {
                if Self::is_ancestor_or_self(&mut tx, &parent_id, id).await? {
                    return Err(DomainError::HierarchyCycle(*id));
                }
            }
            Self::admit_child(&mut tx, &node.parent, Some(*id), capacity).await?;
        }
        let new_parent = moved.then_some(node.parent);

        let row: NodeRow = sqlx::query_as(&format!(
            r#"
            UPDATE nodes
            SET name = $2,
                parent_kind = COALESCE($3, parent_kind),
                parent_id = COALESCE($4, parent_id),
                template_type = $5,
                display_order = $6,
                content_items = $7,
                modified_at = $8
            WHERE id = $1
            RETURNING {NODE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&node.name)
        .bind(new_parent.map(|p| p.kind().as_str()))
        .bind(new_parent.map(|p| p.id()))
        .bind(node.template_type.as_str())
        .bind(node.display_order)
        .bind(Json(&node.content_items))
        .bind(node.modified_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("updating node"))?;

        tx.commit().await.map_err(db_error("committing node update"))?;

        if moved {
            info!("Node moved: {} under {}", id, node.parent);
        }
        Node::try_from(row)
    }

    async fn delete(
        &self,
        id: &Uuid,
        policy: OrphanPolicy,
        capacity: &CapacityPolicy,
    ) -> Result<DeleteOutcome, DomainError> {
        let as_parent = ParentRef::Node(*id);
        let mut tx = self.pool.begin().await.map_err(db_error("starting node delete"))?;

        // Blocks inserts under this node until the delete commits.
        lock_key(&mut tx, &as_parent.lock_key()).await?;

        let node = Self::fetch_for_update(&mut tx, id)
            .await?
            .ok_or(DomainError::NodeNotFound(*id))?;

        let mut outcome = DeleteOutcome::default();
        match policy {
            OrphanPolicy::Orphan => {}
            OrphanPolicy::Cascade => {
                outcome.removed_descendants = delete_subtree(&mut tx, &as_parent).await?;
            }
            OrphanPolicy::Reparent => {
                let children = count_children(&mut tx, &as_parent, None).await?;
                if children > 0 {
                    lock_key(&mut tx, &node.parent.lock_key()).await?;
                    let siblings = count_children(&mut tx, &node.parent, Some(*id)).await?;
                    capacity.check_adoption(&node.parent, siblings, children)?;

                    let moved = sqlx::query(
                        r#"
                        UPDATE nodes
                        SET parent_kind = $3, parent_id = $4, modified_at = NOW()
                        WHERE parent_kind = $1 AND parent_id = $2
                        "#
                    )
                    .bind(as_parent.kind().as_str())
                    .bind(as_parent.id())
                    .bind(node.parent.kind().as_str())
                    .bind(node.parent.id())
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error("reparenting children"))?;
                    outcome.reparented = moved.rows_affected() as usize;
                }
            }
        }

        sqlx::query("DELETE FROM nodes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deleting node"))?;

        tx.commit().await.map_err(db_error("committing node delete"))?;

        debug!(node_id = %id, ?outcome, "Node row deleted");
        Ok(outcome)
    }
}
