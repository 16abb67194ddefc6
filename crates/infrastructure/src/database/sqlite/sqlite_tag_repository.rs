use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use todox_domain::entities::Tag;
use todox_domain::errors::{TodoError, TodoResult};
use todox_domain::repositories::TagRepository;

pub struct SqliteTagRepository {
    pool: SqlitePool,
}

impl SqliteTagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_tag(row: &SqliteRow) -> TodoResult<Tag> {
        Ok(Tag {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            color: row.try_get("color")?,
        })
    }

    async fn fetch_required(&self, id: i64) -> TodoResult<Tag> {
        let row = sqlx::query("SELECT id, name, color FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref()
            .map(Self::row_to_tag)
            .transpose()?
            .ok_or(TodoError::TagNotFound { id })
    }
}

#[async_trait]
impl TagRepository for SqliteTagRepository {
    async fn list(&self) -> TodoResult<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, color FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_tag).collect()
    }

    async fn create(&self, name: &str) -> TodoResult<Tag> {
        let result = sqlx::query("INSERT INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        self.fetch_required(result.last_insert_rowid()).await
    }

    async fn rename(&self, id: i64, name: &str) -> TodoResult<Tag> {
        let result = sqlx::query("UPDATE tags SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TodoError::TagNotFound { id });
        }
        self.fetch_required(id).await
    }

    async fn delete(&self, id: i64) -> TodoResult<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_todo_tags(&self, todo_id: i64, tag_ids: &[i64]) -> TodoResult<()> {
        // 覆盖式写入：删旧插新放在同一事务里
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM todo_tags WHERE todo_id = ?")
            .bind(todo_id)
            .execute(&mut *tx)
            .await?;

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO todo_tags (todo_id, tag_id) VALUES (?, ?)")
                .bind(todo_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_todo_tags(&self, todo_id: i64) -> TodoResult<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT tg.id, tg.name, tg.color FROM tags tg \
             INNER JOIN todo_tags tt ON tt.tag_id = tg.id \
             WHERE tt.todo_id = ? ORDER BY tg.name",
        )
        .bind(todo_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_tag).collect()
    }
}
