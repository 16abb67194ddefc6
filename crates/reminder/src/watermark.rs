//! 每任务的已投递水位
//!
//! 固定间隔轮询会在用户响应前反复看到同一个到期条件，没有已投递
//! 状态的话同一提醒会每秒重复弹出。水位记录每个待办最近一次投递
//! 的触发点：一次性通道记录 reminder_time 本身作为出现键，循环通
//! 道记录 (日历日, 规则指纹)。reminder_time 变化、新的日历日或被
//! 编辑过的循环规则都会让该待办重新获得投递资格。

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use todox_domain::entities::{RecurringType, Todo};

/// 循环规则指纹，规则被编辑后水位失效
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFingerprint {
    recurring_type: Option<RecurringType>,
    recurring_time: Option<NaiveTime>,
    weekdays: Vec<u8>,
}

impl RuleFingerprint {
    pub fn of(todo: &Todo) -> Self {
        let mut weekdays = todo.recurring_weekdays.clone();
        weekdays.sort_unstable();
        Self {
            recurring_type: todo.recurring_type,
            recurring_time: todo.recurring_time,
            weekdays,
        }
    }
}

#[derive(Debug, Default)]
struct TodoWatermark {
    one_shot: Option<NaiveDateTime>,
    recurring: Option<(NaiveDate, RuleFingerprint)>,
}

/// 全部待办的水位集合
///
/// 唯一的常规写入方是tick循环；稍后提醒/完成操作只做清除。
#[derive(Debug, Default)]
pub struct WatermarkStore {
    inner: Mutex<HashMap<i64, TodoWatermark>>,
}

impl WatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 该一次性出现键是否已投递过
    pub fn one_shot_already_sent(&self, todo_id: i64, occurrence: NaiveDateTime) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .get(&todo_id)
            .is_some_and(|mark| mark.one_shot == Some(occurrence))
    }

    pub fn mark_one_shot(&self, todo_id: i64, occurrence: NaiveDateTime) {
        let mut inner = self.inner.lock().unwrap();
        inner.entry(todo_id).or_default().one_shot = Some(occurrence);
    }

    /// 该 (日历日, 规则) 的循环出现是否已投递过
    pub fn recurring_already_sent(
        &self,
        todo_id: i64,
        day: NaiveDate,
        fingerprint: &RuleFingerprint,
    ) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.get(&todo_id).is_some_and(|mark| {
            mark.recurring
                .as_ref()
                .is_some_and(|(marked_day, marked_rule)| {
                    *marked_day == day && marked_rule == fingerprint
                })
        })
    }

    pub fn mark_recurring(&self, todo_id: i64, day: NaiveDate, fingerprint: RuleFingerprint) {
        let mut inner = self.inner.lock().unwrap();
        inner.entry(todo_id).or_default().recurring = Some((day, fingerprint));
    }

    /// 仅清除一次性水位（稍后提醒后让新时间可以触发，
    /// 不影响当天循环通道的去重）
    pub fn clear_one_shot(&self, todo_id: i64) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(mark) = inner.get_mut(&todo_id) {
            mark.one_shot = None;
        }
    }

    /// 清除该待办的全部水位（完成或删除时）
    pub fn clear(&self, todo_id: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.remove(&todo_id);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}
