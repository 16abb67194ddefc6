//! 到期待办选取

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::debug;

use todox_domain::entities::Todo;
use todox_domain::errors::{TodoError, TodoResult};
use todox_domain::recurrence::RecurrenceEvaluator;
use todox_domain::repositories::TodoRepository;

/// 一次评估得到的到期集合
#[derive(Debug, Default)]
pub struct DueSet {
    pub one_shot: Vec<Todo>,
    pub recurring: Vec<Todo>,
    /// 循环规则损坏的待办，按"永不到期"处理，由调度器负责去重上报
    pub invalid: Vec<(i64, TodoError)>,
}

impl DueSet {
    pub fn is_empty(&self) -> bool {
        self.one_shot.is_empty() && self.recurring.is_empty()
    }
}

/// 从存储层取候选并套用到期判定，只读不写
pub struct DueSetSelector {
    todo_repo: Arc<dyn TodoRepository>,
}

impl DueSetSelector {
    pub fn new(todo_repo: Arc<dyn TodoRepository>) -> Self {
        Self { todo_repo }
    }

    pub async fn select_due(&self, now: NaiveDateTime) -> TodoResult<DueSet> {
        let mut due = DueSet::default();

        // 存储层已按 reminder_time <= now 过滤，这里再经判定函数复核
        for todo in self.todo_repo.find_overdue_one_shot(now).await? {
            if RecurrenceEvaluator::is_one_shot_due(&todo, now) {
                due.one_shot.push(todo);
            }
        }

        for todo in self.todo_repo.find_active_recurring().await? {
            match RecurrenceEvaluator::is_due_now(&todo, now) {
                Ok(true) => due.recurring.push(todo),
                Ok(false) => {}
                // 单个待办的数据损坏不中断整轮评估
                Err(error) => due.invalid.push((todo.id, error)),
            }
        }

        if !due.is_empty() {
            debug!(
                "到期评估完成: 一次性 {} 个, 循环 {} 个",
                due.one_shot.len(),
                due.recurring.len()
            );
        }

        Ok(due)
    }
}
