use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// 优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Priority {
    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => Priority::High,
            3 => Priority::Low,
            _ => Priority::Medium,
        }
    }

    pub fn as_i64(&self) -> i64 {
        *self as i64
    }
}

/// 循环类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringType {
    Daily,
    Weekly,
}

impl RecurringType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(RecurringType::Daily),
            "weekly" => Some(RecurringType::Weekly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringType::Daily => "daily",
            RecurringType::Weekly => "weekly",
        }
    }
}

/// 待办事项
///
/// 调度相关字段说明：
/// - `reminder_time` 是一次性提醒的绝对时间戳，仅由稍后提醒和编辑修改；
/// - 循环提醒由 `is_recurring` / `recurring_type` / `recurring_time` /
///   `recurring_weekdays` 描述，引擎只读不写；
/// - `recurring_weekdays` 使用周一=0…周日=6 的编号，仅在 Weekly 时生效；
/// - `holiday_dates` 是本待办自己的排除日期列表，与全局假期表相互独立。
///
/// 所有时间戳均为本地墙上时钟的 naive 时间，与存储层共享同一时钟域。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category_id: Option<i64>,
    pub reminder_time: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub completed: bool,
    pub is_recurring: bool,
    pub recurring_type: Option<RecurringType>,
    pub recurring_time: Option<NaiveTime>,
    pub recurring_weekdays: Vec<u8>,
    pub exclude_holidays: bool,
    pub holiday_dates: Vec<NaiveDate>,
}

impl Todo {
    /// 创建新待办
    pub fn new(title: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            id: 0, // 将由数据库生成
            title: title.into(),
            description: String::new(),
            priority: Priority::Medium,
            category_id: None,
            reminder_time: None,
            created_at: now,
            completed_at: None,
            completed: false,
            is_recurring: false,
            recurring_type: None,
            recurring_time: None,
            recurring_weekdays: Vec::new(),
            exclude_holidays: false,
            holiday_dates: Vec::new(),
        }
    }

    /// 是否配置了有效的循环提醒通道
    pub fn has_recurring_rule(&self) -> bool {
        self.is_recurring && self.recurring_time.is_some()
    }

    /// 是否配置了一次性提醒
    pub fn has_one_shot_reminder(&self) -> bool {
        self.reminder_time.is_some()
    }
}

/// 分类
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
}

/// 标签
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
}

/// 全局假期
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    pub id: i64,
    pub date: NaiveDate,
    pub name: Option<String>,
}

/// 待办查询过滤器
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub keyword: Option<String>,
    pub category_id: Option<i64>,
    pub tag_id: Option<i64>,
    pub include_completed: bool,
}

/// 待办统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub overdue: i64,
}

/// 类型化的部分更新结构
///
/// 只枚举调度引擎关心的字段，取代任意键值对的动态更新。
/// 外层 `None` 表示不修改该字段，内层 `None` 表示清空。
#[derive(Debug, Clone, Default)]
pub struct TodoUpdate {
    pub reminder_time: Option<Option<NaiveDateTime>>,
    pub completed: Option<bool>,
    pub completed_at: Option<Option<NaiveDateTime>>,
}

impl TodoUpdate {
    /// 设置新的一次性提醒时间
    pub fn set_reminder(time: NaiveDateTime) -> Self {
        Self {
            reminder_time: Some(Some(time)),
            ..Default::default()
        }
    }

    /// 标记完成：同时清空一次性提醒时间，避免残留的过期时间戳
    /// 在取消完成后立即重新触发
    pub fn mark_completed(now: NaiveDateTime) -> Self {
        Self {
            reminder_time: Some(None),
            completed: Some(true),
            completed_at: Some(Some(now)),
        }
    }

    /// 取消完成
    pub fn mark_uncompleted() -> Self {
        Self {
            reminder_time: None,
            completed: Some(false),
            completed_at: Some(None),
        }
    }

    /// 是否不会修改任何字段
    pub fn is_empty(&self) -> bool {
        self.reminder_time.is_none() && self.completed.is_none() && self.completed_at.is_none()
    }

    /// 应用到实体
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(reminder_time) = self.reminder_time {
            todo.reminder_time = reminder_time;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(completed_at) = self.completed_at {
            todo.completed_at = completed_at;
        }
    }
}
