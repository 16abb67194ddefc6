//! 测试数据构造器
//!
//! 提供带合理默认值的Builder，测试只需覆盖自己关心的字段。

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use todox_domain::entities::{Priority, RecurringType, Todo};

/// 构造测试用 Todo 实体
pub struct TodoBuilder {
    todo: Todo,
}

impl TodoBuilder {
    pub fn new() -> Self {
        Self {
            todo: Todo {
                id: 1,
                title: "测试待办".to_string(),
                description: String::new(),
                priority: Priority::Medium,
                category_id: None,
                reminder_time: None,
                created_at: default_now(),
                completed_at: None,
                completed: false,
                is_recurring: false,
                recurring_type: None,
                recurring_time: None,
                recurring_weekdays: vec![],
                exclude_holidays: false,
                holiday_dates: vec![],
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.todo.id = id;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.todo.title = title.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.todo.description = description.to_string();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.todo.priority = priority;
        self
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.todo.category_id = Some(category_id);
        self
    }

    pub fn with_reminder_time(mut self, reminder_time: NaiveDateTime) -> Self {
        self.todo.reminder_time = Some(reminder_time);
        self
    }

    pub fn completed(mut self, now: NaiveDateTime) -> Self {
        self.todo.completed = true;
        self.todo.completed_at = Some(now);
        self
    }

    /// 每天 `time` 触发的循环规则
    pub fn recurring_daily(mut self, time: NaiveTime) -> Self {
        self.todo.is_recurring = true;
        self.todo.recurring_type = Some(RecurringType::Daily);
        self.todo.recurring_time = Some(time);
        self
    }

    /// 每周指定周几（周一=0…周日=6）在 `time` 触发的循环规则
    pub fn recurring_weekly(mut self, time: NaiveTime, weekdays: Vec<u8>) -> Self {
        self.todo.is_recurring = true;
        self.todo.recurring_type = Some(RecurringType::Weekly);
        self.todo.recurring_time = Some(time);
        self.todo.recurring_weekdays = weekdays;
        self
    }

    pub fn excluding_holidays(mut self, holiday_dates: Vec<NaiveDate>) -> Self {
        self.todo.exclude_holidays = true;
        self.todo.holiday_dates = holiday_dates;
        self
    }

    pub fn build(self) -> Todo {
        self.todo
    }
}

impl Default for TodoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .expect("合法日期")
        .and_hms_opt(0, 0, 0)
        .expect("合法时间")
}
