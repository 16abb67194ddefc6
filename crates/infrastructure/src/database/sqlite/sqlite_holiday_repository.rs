use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use todox_domain::entities::Holiday;
use todox_domain::errors::{TodoError, TodoResult};
use todox_domain::repositories::HolidayRepository;

/// 全局假期表的SQLite实现
///
/// 注意：到期判定只读待办自身的假期列表，这张表目前只服务于
/// 假期管理界面，两套数据相互独立。
pub struct SqliteHolidayRepository {
    pool: SqlitePool,
}

impl SqliteHolidayRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_holiday(row: &SqliteRow) -> TodoResult<Holiday> {
        Ok(Holiday {
            id: row.try_get("id")?,
            date: row.try_get("date")?,
            name: row.try_get("name")?,
        })
    }
}

#[async_trait]
impl HolidayRepository for SqliteHolidayRepository {
    async fn list(&self) -> TodoResult<Vec<Holiday>> {
        let rows = sqlx::query("SELECT id, date, name FROM holidays ORDER BY date")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_holiday).collect()
    }

    async fn add(&self, date: NaiveDate, name: Option<&str>) -> TodoResult<Holiday> {
        let result = sqlx::query("INSERT INTO holidays (date, name) VALUES (?, ?)")
            .bind(date)
            .bind(name)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        let row = sqlx::query("SELECT id, date, name FROM holidays WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref()
            .map(Self::row_to_holiday)
            .transpose()?
            .ok_or(TodoError::HolidayNotFound { id })
    }

    async fn remove(&self, id: i64) -> TodoResult<bool> {
        let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_holiday(&self, date: NaiveDate) -> TodoResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM holidays WHERE date = ?")
            .bind(date)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}
