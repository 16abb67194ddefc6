use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use todox_domain::entities::Category;
use todox_domain::errors::{TodoError, TodoResult};
use todox_domain::repositories::CategoryRepository;

pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_category(row: &SqliteRow) -> TodoResult<Category> {
        Ok(Category {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            color: row.try_get("color")?,
        })
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn list(&self) -> TodoResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, color FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_category).collect()
    }

    async fn create(&self, name: &str, color: &str) -> TodoResult<Category> {
        let result = sqlx::query("INSERT INTO categories (name, color) VALUES (?, ?)")
            .bind(name)
            .bind(color)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        let row = sqlx::query("SELECT id, name, color FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref()
            .map(Self::row_to_category)
            .transpose()?
            .ok_or(TodoError::CategoryNotFound { id })
    }

    async fn delete(&self, id: i64) -> TodoResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
