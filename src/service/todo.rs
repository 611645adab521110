//! CRUD over the `todos` table.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::model::{Todo, TodoError};

const INSERT: &str = "INSERT INTO todos(subject, description) VALUES(?, ?)";
const CONFIRM: &str =
    "SELECT id, subject, description, created_at, updated_at FROM todos WHERE id = ?";
const READ: &str =
    "SELECT id, subject, description, created_at, updated_at FROM todos ORDER BY id DESC LIMIT ?";
const READ_BEFORE: &str = "SELECT id, subject, description, created_at, updated_at FROM todos \
                           WHERE id < ? ORDER BY id DESC LIMIT ?";
const UPDATE: &str = "UPDATE todos SET subject = ?, description = ? WHERE id = ?";

/// Ids bound per `DELETE` statement; SQLite caps host parameters at 32766.
const DELETE_CHUNK: usize = 10_000;

/// TODO persistence service backed by a SQLite pool.
#[derive(Debug, Clone)]
pub struct TodoService {
    pool: SqlitePool,
}

impl TodoService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a TODO and read it back so store-assigned fields are populated.
    pub async fn create_todo(&self, subject: &str, description: &str) -> Result<Todo, TodoError> {
        let result = sqlx::query(INSERT)
            .bind(subject)
            .bind(description)
            .execute(&self.pool)
            .await?;
        let id = result.last_insert_rowid();

        let todo = sqlx::query_as::<_, Todo>(CONFIRM)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(id, "TODO created");
        Ok(todo)
    }

    /// Keyset pagination, newest first.
    ///
    /// `prev_id == 0` starts from the newest row; otherwise only rows with
    /// `id < prev_id` are returned. `size <= 0` yields an empty page without
    /// touching the store.
    pub async fn read_todos(&self, prev_id: i64, size: i64) -> Result<Vec<Todo>, TodoError> {
        if size <= 0 {
            return Ok(Vec::new());
        }

        let todos = if prev_id > 0 {
            sqlx::query_as::<_, Todo>(READ_BEFORE)
                .bind(prev_id)
                .bind(size)
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query_as::<_, Todo>(READ)
                .bind(size)
                .fetch_all(&self.pool)
                .await?
        };

        Ok(todos)
    }

    /// Update subject and description, returning the row as committed.
    ///
    /// The UPDATE and the read-back share one transaction.
    pub async fn update_todo(
        &self,
        id: i64,
        subject: &str,
        description: &str,
    ) -> Result<Todo, TodoError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(UPDATE)
            .bind(subject)
            .bind(description)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(TodoError::NotFound);
        }

        let todo = sqlx::query_as::<_, Todo>(CONFIRM)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(id, "TODO updated");
        Ok(todo)
    }

    /// Delete every row whose id is in `ids`.
    ///
    /// Ids are bound in chunks below SQLite's variable limit, all inside one
    /// transaction. Fails with `NotFound` only when nothing was deleted; a
    /// partial match succeeds.
    pub async fn delete_todos(&self, ids: &[i64]) -> Result<(), TodoError> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        let mut deleted = 0;
        for chunk in ids.chunks(DELETE_CHUNK) {
            let mut query: QueryBuilder<Sqlite> =
                QueryBuilder::new("DELETE FROM todos WHERE id IN (");
            let mut separated = query.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");

            deleted += query.build().execute(&mut *tx).await?.rows_affected();
        }

        if deleted == 0 {
            tx.rollback().await?;
            return Err(TodoError::NotFound);
        }
        tx.commit().await?;

        tracing::debug!(requested = ids.len(), deleted, "TODOs deleted");
        Ok(())
    }
}
