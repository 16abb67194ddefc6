use chrono::{Datelike, NaiveDateTime};

use crate::entities::{RecurringType, Todo};
use crate::errors::{TodoError, TodoResult};

/// 循环与提醒到期判定
///
/// 纯函数集合：无副作用、无I/O，对同一 `(todo, now)` 输入总是返回相同结果。
/// `now` 与待办中的时间戳处于同一本地时钟域。
pub struct RecurrenceEvaluator;

impl RecurrenceEvaluator {
    /// 判断一次性提醒是否到期
    pub fn is_one_shot_due(todo: &Todo, now: NaiveDateTime) -> bool {
        if todo.completed {
            return false;
        }
        matches!(todo.reminder_time, Some(reminder) if reminder <= now)
    }

    /// 判断循环提醒在当前时刻是否到期
    ///
    /// 周几编号为周一=0…周日=6。Weekly 且周几集合为空视为每天都提醒。
    /// 集合中出现 0-6 之外的值属于损坏数据，返回 `InvalidRecurrence`，
    /// 调用方将该待办视为永不到期。
    pub fn is_due_now(todo: &Todo, now: NaiveDateTime) -> TodoResult<bool> {
        if todo.completed {
            return Ok(false);
        }

        let recurring_time = match (todo.is_recurring, todo.recurring_time) {
            (true, Some(time)) => time,
            // 循环通道未配置
            _ => return Ok(false),
        };

        // 今天的计划触发时刻尚未到达
        let scheduled = now.date().and_time(recurring_time);
        if scheduled > now {
            return Ok(false);
        }

        if todo.recurring_type == Some(RecurringType::Weekly) {
            Self::validate_weekdays(todo)?;
            let today_weekday = now.date().weekday().num_days_from_monday() as u8;
            if !todo.recurring_weekdays.is_empty()
                && !todo.recurring_weekdays.contains(&today_weekday)
            {
                return Ok(false);
            }
        }

        if todo.exclude_holidays && todo.holiday_dates.contains(&now.date()) {
            return Ok(false);
        }

        Ok(true)
    }

    fn validate_weekdays(todo: &Todo) -> TodoResult<()> {
        if let Some(&bad) = todo.recurring_weekdays.iter().find(|&&day| day > 6) {
            return Err(TodoError::InvalidRecurrence {
                todo_id: todo.id,
                message: format!("周几编号超出范围 0-6: {bad}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(day: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        day.and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
    }

    fn daily_todo(hour: u32, minute: u32) -> Todo {
        let mut todo = Todo::new("每日站会", at(date(2025, 6, 2), 0, 0));
        todo.id = 1;
        todo.is_recurring = true;
        todo.recurring_type = Some(RecurringType::Daily);
        todo.recurring_time = NaiveTime::from_hms_opt(hour, minute, 0);
        todo
    }

    // 2025-06-04 是周三（weekday=2）
    const WEDNESDAY: (i32, u32, u32) = (2025, 6, 4);

    #[test]
    fn test_completed_todo_is_never_due() {
        let mut todo = daily_todo(9, 0);
        todo.completed = true;
        todo.reminder_time = Some(at(date(2025, 6, 2), 8, 0));

        let now = at(date(2025, 6, 2), 10, 0);
        assert!(!RecurrenceEvaluator::is_one_shot_due(&todo, now));
        assert!(!RecurrenceEvaluator::is_due_now(&todo, now).unwrap());
    }

    #[test]
    fn test_one_shot_due_at_and_after_reminder_time() {
        let mut todo = Todo::new("交报告", at(date(2025, 6, 2), 0, 0));
        let reminder = at(date(2025, 6, 2), 9, 30);
        todo.reminder_time = Some(reminder);

        assert!(!RecurrenceEvaluator::is_one_shot_due(&todo, at(date(2025, 6, 2), 9, 29)));
        assert!(RecurrenceEvaluator::is_one_shot_due(&todo, reminder));
        assert!(RecurrenceEvaluator::is_one_shot_due(&todo, at(date(2025, 6, 2), 9, 31)));
    }

    #[test]
    fn test_one_shot_without_reminder_time_is_silent() {
        let todo = Todo::new("无提醒", at(date(2025, 6, 2), 0, 0));
        assert!(!RecurrenceEvaluator::is_one_shot_due(&todo, at(date(2025, 6, 2), 23, 59)));
    }

    #[test]
    fn test_non_recurring_channel_is_silent() {
        let mut todo = Todo::new("普通待办", at(date(2025, 6, 2), 0, 0));
        todo.reminder_time = Some(at(date(2025, 6, 2), 8, 0));
        assert!(!RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 2), 9, 0)).unwrap());

        // is_recurring 为真但缺少 recurring_time 同样静默
        todo.is_recurring = true;
        todo.recurring_type = Some(RecurringType::Daily);
        assert!(!RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 2), 9, 0)).unwrap());
    }

    #[test]
    fn test_daily_due_only_after_time_of_day() {
        let todo = daily_todo(9, 0);
        assert!(!RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 2), 8, 59)).unwrap());
        assert!(RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 2), 9, 0)).unwrap());
        assert!(RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 2), 21, 0)).unwrap());
    }

    #[test]
    fn test_weekly_wednesday_nine_oclock() {
        let mut todo = daily_todo(9, 0);
        todo.recurring_type = Some(RecurringType::Weekly);
        todo.recurring_weekdays = vec![2];

        let (y, m, d) = WEDNESDAY;
        // 周三 09:00 之后到期
        assert!(RecurrenceEvaluator::is_due_now(&todo, at(date(y, m, d), 9, 0)).unwrap());
        // 周三 09:00 之前不到期
        assert!(!RecurrenceEvaluator::is_due_now(&todo, at(date(y, m, d), 8, 59)).unwrap());
        // 周二不到期
        assert!(!RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 3), 10, 0)).unwrap());
    }

    #[test]
    fn test_weekly_multi_weekday_set() {
        let mut todo = daily_todo(8, 0);
        todo.recurring_type = Some(RecurringType::Weekly);
        todo.recurring_weekdays = vec![0, 2, 4];

        // 周二（weekday=1）08:01 不到期
        assert!(!RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 3), 8, 1)).unwrap());
        // 周三（weekday=2）08:01 到期
        assert!(RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 4), 8, 1)).unwrap());
        // 周三 07:59 不到期
        assert!(!RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 4), 7, 59)).unwrap());
    }

    #[test]
    fn test_weekly_empty_weekday_set_means_every_day() {
        let mut todo = daily_todo(8, 0);
        todo.recurring_type = Some(RecurringType::Weekly);
        todo.recurring_weekdays = Vec::new();

        // 周二和周日都到期
        assert!(RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 3), 8, 1)).unwrap());
        assert!(RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 8), 8, 1)).unwrap());
    }

    #[test]
    fn test_daily_excludes_per_todo_holiday() {
        let mut todo = daily_todo(9, 0);
        todo.exclude_holidays = true;
        todo.holiday_dates = vec![date(2025, 6, 2)];

        assert!(!RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 2), 10, 0)).unwrap());
        // 非假期日正常到期
        assert!(RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 3), 10, 0)).unwrap());
    }

    #[test]
    fn test_holiday_list_ignored_without_exclude_flag() {
        let mut todo = daily_todo(9, 0);
        todo.exclude_holidays = false;
        todo.holiday_dates = vec![date(2025, 6, 2)];

        assert!(RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 2), 10, 0)).unwrap());
    }

    #[test]
    fn test_malformed_weekday_is_invalid_recurrence() {
        let mut todo = daily_todo(8, 0);
        todo.recurring_type = Some(RecurringType::Weekly);
        todo.recurring_weekdays = vec![1, 9];

        let result = RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 3), 9, 0));
        assert!(matches!(
            result,
            Err(TodoError::InvalidRecurrence { todo_id: 1, .. })
        ));
    }

    #[test]
    fn test_malformed_weekday_ignored_for_daily_rule() {
        // 周几集合只对 Weekly 生效，Daily 规则下即使损坏也不解释
        let mut todo = daily_todo(8, 0);
        todo.recurring_weekdays = vec![9];
        assert!(RecurrenceEvaluator::is_due_now(&todo, at(date(2025, 6, 3), 9, 0)).unwrap());
    }

    #[test]
    fn test_is_due_now_is_pure() {
        let todo = daily_todo(9, 0);
        let now = at(date(2025, 6, 2), 9, 30);
        let before = todo.clone();
        for _ in 0..5 {
            assert!(RecurrenceEvaluator::is_due_now(&todo, now).unwrap());
        }
        assert_eq!(format!("{before:?}"), format!("{todo:?}"));
    }

    #[test]
    fn test_both_channels_evaluated_independently() {
        let mut todo = daily_todo(9, 0);
        todo.reminder_time = Some(at(date(2025, 6, 2), 14, 0));

        let now = at(date(2025, 6, 2), 9, 30);
        assert!(RecurrenceEvaluator::is_due_now(&todo, now).unwrap());
        assert!(!RecurrenceEvaluator::is_one_shot_due(&todo, now));

        let later = at(date(2025, 6, 2), 14, 30);
        assert!(RecurrenceEvaluator::is_due_now(&todo, later).unwrap());
        assert!(RecurrenceEvaluator::is_one_shot_due(&todo, later));
    }
}
