use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use todox_domain::entities::{Priority, RecurringType, Todo, TodoFilter, TodoStats, TodoUpdate};
use todox_domain::errors::{TodoError, TodoResult};
use todox_domain::repositories::TodoRepository;

use crate::database::mapping::MappingHelpers;

const TODO_COLUMNS: &str = "id, title, description, priority, category_id, reminder_time, \
     created_at, completed_at, completed, is_recurring, recurring_type, recurring_time, \
     recurring_weekdays, exclude_holidays, holiday_json";

pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_todo(row: &SqliteRow) -> TodoResult<Todo> {
        let priority: i64 = row.try_get("priority")?;
        let recurring_type: Option<String> = row.try_get("recurring_type")?;
        let weekdays_raw: String = row.try_get("recurring_weekdays")?;
        let holiday_raw: String = row.try_get("holiday_json")?;

        Ok(Todo {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            priority: Priority::from_i64(priority),
            category_id: row.try_get("category_id")?,
            reminder_time: row.try_get("reminder_time")?,
            created_at: row.try_get("created_at")?,
            completed_at: row.try_get("completed_at")?,
            completed: row.try_get("completed")?,
            is_recurring: row.try_get("is_recurring")?,
            recurring_type: recurring_type.as_deref().and_then(RecurringType::parse),
            recurring_time: row.try_get("recurring_time")?,
            recurring_weekdays: MappingHelpers::parse_weekdays(&weekdays_raw),
            exclude_holidays: row.try_get("exclude_holidays")?,
            holiday_dates: MappingHelpers::parse_holiday_dates(&holiday_raw),
        })
    }

    async fn fetch_required(&self, id: i64) -> TodoResult<Todo> {
        self.get_by_id(id)
            .await?
            .ok_or(TodoError::TodoNotFound { id })
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn create(&self, todo: &Todo) -> TodoResult<Todo> {
        let result = sqlx::query(
            r#"
            INSERT INTO todos (
                title, description, priority, category_id, reminder_time, created_at,
                completed_at, completed, is_recurring, recurring_type, recurring_time,
                recurring_weekdays, exclude_holidays, holiday_json
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.priority.as_i64())
        .bind(todo.category_id)
        .bind(todo.reminder_time)
        .bind(todo.created_at)
        .bind(todo.completed_at)
        .bind(todo.completed)
        .bind(todo.is_recurring)
        .bind(todo.recurring_type.map(|recurring| recurring.as_str()))
        .bind(todo.recurring_time)
        .bind(MappingHelpers::weekdays_to_json(&todo.recurring_weekdays))
        .bind(todo.exclude_holidays)
        .bind(MappingHelpers::holiday_dates_to_json(&todo.holiday_dates))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("创建待办 {id}: {}", todo.title);
        self.fetch_required(id).await
    }

    async fn get_by_id(&self, id: i64) -> TodoResult<Option<Todo>> {
        let row = sqlx::query(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_todo).transpose()
    }

    async fn list(&self, filter: &TodoFilter) -> TodoResult<Vec<Todo>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT t.id, t.title, t.description, t.priority, t.category_id, t.reminder_time, \
             t.created_at, t.completed_at, t.completed, t.is_recurring, t.recurring_type, \
             t.recurring_time, t.recurring_weekdays, t.exclude_holidays, t.holiday_json \
             FROM todos t",
        );

        if filter.tag_id.is_some() {
            builder.push(" INNER JOIN todo_tags tt ON tt.todo_id = t.id");
        }
        builder.push(" WHERE 1 = 1");

        if !filter.include_completed {
            builder.push(" AND t.completed = 0");
        }
        if let Some(keyword) = &filter.keyword {
            let pattern = format!("%{keyword}%");
            builder
                .push(" AND (t.title LIKE ")
                .push_bind(pattern.clone())
                .push(" OR t.description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category_id) = filter.category_id {
            builder.push(" AND t.category_id = ").push_bind(category_id);
        }
        if let Some(tag_id) = filter.tag_id {
            builder.push(" AND tt.tag_id = ").push_bind(tag_id);
        }

        builder.push(" ORDER BY t.completed, t.priority, t.created_at DESC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_todo).collect()
    }

    async fn update(&self, todo: &Todo) -> TodoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE todos SET
                title = ?, description = ?, priority = ?, category_id = ?, reminder_time = ?,
                completed_at = ?, completed = ?, is_recurring = ?, recurring_type = ?,
                recurring_time = ?, recurring_weekdays = ?, exclude_holidays = ?, holiday_json = ?
            WHERE id = ?
            "#,
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.priority.as_i64())
        .bind(todo.category_id)
        .bind(todo.reminder_time)
        .bind(todo.completed_at)
        .bind(todo.completed)
        .bind(todo.is_recurring)
        .bind(todo.recurring_type.map(|recurring| recurring.as_str()))
        .bind(todo.recurring_time)
        .bind(MappingHelpers::weekdays_to_json(&todo.recurring_weekdays))
        .bind(todo.exclude_holidays)
        .bind(MappingHelpers::holiday_dates_to_json(&todo.holiday_dates))
        .bind(todo.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TodoError::TodoNotFound { id: todo.id });
        }
        Ok(())
    }

    async fn apply_update(&self, id: i64, update: &TodoUpdate) -> TodoResult<Todo> {
        if update.is_empty() {
            return self.fetch_required(id).await;
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE todos SET ");
        let mut assignments = builder.separated(", ");
        if let Some(reminder_time) = update.reminder_time {
            assignments
                .push("reminder_time = ")
                .push_bind_unseparated(reminder_time);
        }
        if let Some(completed) = update.completed {
            assignments
                .push("completed = ")
                .push_bind_unseparated(completed);
        }
        if let Some(completed_at) = update.completed_at {
            assignments
                .push("completed_at = ")
                .push_bind_unseparated(completed_at);
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(TodoError::TodoNotFound { id });
        }
        self.fetch_required(id).await
    }

    async fn update_reminder_time(
        &self,
        id: i64,
        reminder_time: Option<NaiveDateTime>,
    ) -> TodoResult<Todo> {
        let result = sqlx::query("UPDATE todos SET reminder_time = ? WHERE id = ?")
            .bind(reminder_time)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TodoError::TodoNotFound { id });
        }
        self.fetch_required(id).await
    }

    async fn delete(&self, id: i64) -> TodoResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn batch_complete(&self, ids: &[i64], now: NaiveDateTime) -> TodoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "UPDATE todos SET completed = 1, completed_at = ?, reminder_time = NULL \
             WHERE id IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql).bind(now);
        for id in ids {
            query = query.bind(id);
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn batch_delete(&self, ids: &[i64]) -> TodoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM todos WHERE id IN ({placeholders})");

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn find_overdue_one_shot(&self, now: NaiveDateTime) -> TodoResult<Vec<Todo>> {
        let rows = sqlx::query(&format!(
            "SELECT {TODO_COLUMNS} FROM todos \
             WHERE completed = 0 AND reminder_time IS NOT NULL AND reminder_time <= ? \
             ORDER BY id"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_todo).collect()
    }

    async fn find_active_recurring(&self) -> TodoResult<Vec<Todo>> {
        let rows = sqlx::query(&format!(
            "SELECT {TODO_COLUMNS} FROM todos \
             WHERE completed = 0 AND is_recurring = 1 AND recurring_time IS NOT NULL \
             ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_todo).collect()
    }

    async fn get_stats(&self, now: NaiveDateTime) -> TodoResult<TodoStats> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos")
            .fetch_one(&self.pool)
            .await?;
        let completed: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE completed = 1")
            .fetch_one(&self.pool)
            .await?;
        let overdue: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM todos \
             WHERE completed = 0 AND reminder_time IS NOT NULL AND reminder_time < ?",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(TodoStats {
            total,
            completed,
            pending: total - completed,
            overdue,
        })
    }
}
