//! 用户动作控制器
//!
//! 处理来自通知弹窗的用户决定（稍后提醒、完成、取消完成、删除），
//! 写回存储层并同步清理调度器的投递水位。

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime};
use tracing::{debug, info};

use todox_domain::entities::{Todo, TodoUpdate};
use todox_domain::errors::{TodoError, TodoResult};
use todox_domain::repositories::TodoRepository;

use crate::watermark::WatermarkStore;

pub struct TodoController {
    todo_repo: Arc<dyn TodoRepository>,
    watermarks: Arc<WatermarkStore>,
}

impl TodoController {
    pub fn new(todo_repo: Arc<dyn TodoRepository>, watermarks: Arc<WatermarkStore>) -> Self {
        Self {
            todo_repo,
            watermarks,
        }
    }

    /// 稍后提醒：把一次性提醒时间推迟 `minutes` 分钟
    ///
    /// 只写 reminder_time，不触碰循环规则——来自循环通道的提醒被
    /// 稍后处理时，下一个符合条件的循环触发不受影响。
    pub async fn snooze(&self, todo_id: i64, minutes: i64) -> TodoResult<Todo> {
        self.snooze_at(todo_id, minutes, Local::now().naive_local())
            .await
    }

    pub async fn snooze_at(
        &self,
        todo_id: i64,
        minutes: i64,
        now: NaiveDateTime,
    ) -> TodoResult<Todo> {
        if minutes <= 0 {
            return Err(TodoError::InvalidSnooze { minutes });
        }

        let new_time = now + Duration::minutes(minutes);
        let todo = self
            .todo_repo
            .update_reminder_time(todo_id, Some(new_time))
            .await?;

        // 清掉旧的出现键，让新时间到点可以触发
        self.watermarks.clear_one_shot(todo_id);
        info!("待办 {todo_id} 稍后提醒 {minutes} 分钟，新提醒时间 {new_time}");
        Ok(todo)
    }

    /// 完成待办：置完成标记、清空一次性提醒时间、清除全部水位
    pub async fn complete(&self, todo_id: i64) -> TodoResult<Todo> {
        self.complete_at(todo_id, Local::now().naive_local()).await
    }

    pub async fn complete_at(&self, todo_id: i64, now: NaiveDateTime) -> TodoResult<Todo> {
        let todo = self
            .todo_repo
            .apply_update(todo_id, &TodoUpdate::mark_completed(now))
            .await?;
        self.watermarks.clear(todo_id);
        info!("待办 {todo_id} 已完成");
        Ok(todo)
    }

    /// 取消完成。完成时一次性提醒已被清空，这里不会复活过期提醒
    pub async fn uncomplete(&self, todo_id: i64) -> TodoResult<Todo> {
        let todo = self
            .todo_repo
            .apply_update(todo_id, &TodoUpdate::mark_uncompleted())
            .await?;
        debug!("待办 {todo_id} 已取消完成");
        Ok(todo)
    }

    /// 删除待办并清除水位
    pub async fn delete(&self, todo_id: i64) -> TodoResult<bool> {
        let deleted = self.todo_repo.delete(todo_id).await?;
        if deleted {
            self.watermarks.clear(todo_id);
            info!("待办 {todo_id} 已删除");
        }
        Ok(deleted)
    }
}
