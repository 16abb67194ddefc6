use thiserror::Error;

/// 提醒引擎错误类型定义
#[derive(Debug, Error)]
pub enum TodoError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),

    #[error("待办未找到: {id}")]
    TodoNotFound { id: i64 },

    #[error("分类未找到: {id}")]
    CategoryNotFound { id: i64 },

    #[error("标签未找到: {id}")]
    TagNotFound { id: i64 },

    #[error("假期未找到: {id}")]
    HolidayNotFound { id: i64 },

    #[error("无效的稍后提醒时长: {minutes}分钟")]
    InvalidSnooze { minutes: i64 },

    #[error("待办 {todo_id} 的循环规则无效: {message}")]
    InvalidRecurrence { todo_id: i64, message: String },

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type TodoResult<T> = std::result::Result<T, TodoError>;
