//! 存储层实现
//!
//! 基于嵌入式SQLite的仓储实现与数据库初始化。

pub mod database;

pub use database::sqlite::{
    SqliteCategoryRepository, SqliteHolidayRepository, SqliteTagRepository, SqliteTodoRepository,
};
pub use database::{create_sqlite_pool, run_migrations};
