//! 存储层仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则：
//! 提醒引擎只依赖这些trait，不依赖具体的数据库实现。

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::entities::{Category, Holiday, Tag, Todo, TodoFilter, TodoStats, TodoUpdate};
use crate::errors::TodoResult;

/// 待办仓储抽象
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn create(&self, todo: &Todo) -> TodoResult<Todo>;
    async fn get_by_id(&self, id: i64) -> TodoResult<Option<Todo>>;
    async fn list(&self, filter: &TodoFilter) -> TodoResult<Vec<Todo>>;
    async fn update(&self, todo: &Todo) -> TodoResult<()>;
    /// 应用类型化的部分更新，待办不存在时返回 `TodoNotFound`
    async fn apply_update(&self, id: i64, update: &TodoUpdate) -> TodoResult<Todo>;
    /// 设置或清空一次性提醒时间，待办不存在时返回 `TodoNotFound`
    async fn update_reminder_time(
        &self,
        id: i64,
        reminder_time: Option<NaiveDateTime>,
    ) -> TodoResult<Todo>;
    async fn delete(&self, id: i64) -> TodoResult<bool>;
    async fn batch_complete(&self, ids: &[i64], now: NaiveDateTime) -> TodoResult<u64>;
    async fn batch_delete(&self, ids: &[i64]) -> TodoResult<u64>;

    /// 未完成且 `reminder_time <= now` 的一次性提醒候选集
    async fn find_overdue_one_shot(&self, now: NaiveDateTime) -> TodoResult<Vec<Todo>>;
    /// 未完成且配置了循环规则的候选集
    async fn find_active_recurring(&self) -> TodoResult<Vec<Todo>>;

    async fn get_stats(&self, now: NaiveDateTime) -> TodoResult<TodoStats>;
}

/// 分类仓储抽象
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> TodoResult<Vec<Category>>;
    async fn create(&self, name: &str, color: &str) -> TodoResult<Category>;
    async fn delete(&self, id: i64) -> TodoResult<bool>;
}

/// 标签仓储抽象
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn list(&self) -> TodoResult<Vec<Tag>>;
    async fn create(&self, name: &str) -> TodoResult<Tag>;
    async fn rename(&self, id: i64, name: &str) -> TodoResult<Tag>;
    async fn delete(&self, id: i64) -> TodoResult<bool>;
    /// 覆盖式设置待办的标签集合
    async fn set_todo_tags(&self, todo_id: i64, tag_ids: &[i64]) -> TodoResult<()>;
    async fn get_todo_tags(&self, todo_id: i64) -> TodoResult<Vec<Tag>>;
}

/// 全局假期仓储抽象
///
/// 注意：循环到期判定只读取待办自身的 `holiday_dates`，不查询全局假期表，
/// 两套假期数据相互独立。
#[async_trait]
pub trait HolidayRepository: Send + Sync {
    async fn list(&self) -> TodoResult<Vec<Holiday>>;
    async fn add(&self, date: NaiveDate, name: Option<&str>) -> TodoResult<Holiday>;
    async fn remove(&self, id: i64) -> TodoResult<bool>;
    async fn is_holiday(&self, date: NaiveDate) -> TodoResult<bool>;
}
