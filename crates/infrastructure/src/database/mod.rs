pub mod mapping;
pub mod sqlite;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use todox_domain::errors::TodoResult;

/// 创建嵌入式SQLite连接池，启用外键约束和WAL模式
pub async fn create_sqlite_pool(database_url: &str, max_connections: u32) -> TodoResult<SqlitePool> {
    debug!("创建SQLite连接池: {database_url}");

    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .connect_with(connect_options)
        .await?;

    run_migrations(&pool).await?;
    ensure_defaults(&pool).await?;

    Ok(pool)
}

/// 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> TodoResult<()> {
    debug!("运行SQLite数据库迁移");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            color TEXT NOT NULL DEFAULT '#4A90D9'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '#FF9800'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            priority INTEGER NOT NULL DEFAULT 2,
            category_id INTEGER REFERENCES categories(id),
            reminder_time DATETIME,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            completed_at DATETIME,
            completed BOOLEAN NOT NULL DEFAULT 0,
            is_recurring BOOLEAN NOT NULL DEFAULT 0,
            recurring_type TEXT,
            recurring_time TIME,
            recurring_weekdays TEXT NOT NULL DEFAULT '[]',
            exclude_holidays BOOLEAN NOT NULL DEFAULT 0,
            holiday_json TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS todo_tags (
            todo_id INTEGER NOT NULL REFERENCES todos(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (todo_id, tag_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS holidays (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date DATE NOT NULL UNIQUE,
            name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_todos_completed ON todos(completed)",
        "CREATE INDEX IF NOT EXISTS idx_todos_reminder_time ON todos(reminder_time)",
        "CREATE INDEX IF NOT EXISTS idx_todos_is_recurring ON todos(is_recurring)",
        "CREATE INDEX IF NOT EXISTS idx_todos_category_id ON todos(category_id)",
        "CREATE INDEX IF NOT EXISTS idx_todo_tags_tag_id ON todo_tags(tag_id)",
        "CREATE INDEX IF NOT EXISTS idx_holidays_date ON holidays(date)",
    ];

    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    debug!("SQLite数据库迁移完成");
    Ok(())
}

/// 确保默认分类和标签存在
async fn ensure_defaults(pool: &SqlitePool) -> TodoResult<()> {
    let category_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;
    if category_count == 0 {
        for (name, color) in [("工作", "#4A90D9"), ("日常", "#4CAF50"), ("学习", "#FF9800")] {
            sqlx::query("INSERT INTO categories (name, color) VALUES (?, ?)")
                .bind(name)
                .bind(color)
                .execute(pool)
                .await?;
        }
    }

    let tag_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
        .fetch_one(pool)
        .await?;
    if tag_count == 0 {
        for name in ["紧急", "重要", "日常"] {
            sqlx::query("INSERT INTO tags (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}
