//! 端到端流程：SQLite存储 + 调度器 + 控制器的组合验证

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use tempfile::TempDir;

    use todox_domain::repositories::TodoRepository;
    use todox_infrastructure::{create_sqlite_pool, SqliteTodoRepository};
    use todox_reminder::{
        reminder_channel, ReminderChannel, ReminderReceiver, ReminderScheduler, SchedulerConfig,
        TodoController,
    };
    use todox_testing_utils::TodoBuilder;

    async fn setup() -> (TempDir, Arc<dyn TodoRepository>) {
        let dir = TempDir::new().expect("创建临时目录");
        let url = format!("sqlite://{}", dir.path().join("todox.db").display());
        let pool = create_sqlite_pool(&url, 2).await.expect("初始化测试数据库");
        (dir, Arc::new(SqliteTodoRepository::new(pool)))
    }

    fn at(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn drain(rx: &mut ReminderReceiver) -> Vec<(i64, ReminderChannel)> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push((event.todo.id, event.channel));
        }
        events
    }

    #[tokio::test]
    async fn test_one_shot_snooze_complete_lifecycle() {
        let (_dir, repo) = setup().await;
        let (tx, mut rx) = reminder_channel();
        let scheduler = ReminderScheduler::new(
            Arc::clone(&repo),
            tx,
            SchedulerConfig::default(),
        );
        let controller = TodoController::new(Arc::clone(&repo), scheduler.watermarks());

        let todo = repo
            .create(
                &TodoBuilder::new()
                    .with_title("交季度报告")
                    .with_reminder_time(at(2, 9, 0))
                    .build(),
            )
            .await
            .unwrap();

        // 到期后只投递一次
        assert_eq!(scheduler.run_tick(at(2, 9, 1)).await.unwrap(), 1);
        assert_eq!(scheduler.run_tick(at(2, 9, 2)).await.unwrap(), 0);
        assert_eq!(drain(&mut rx), vec![(todo.id, ReminderChannel::OneShot)]);

        // 稍后10分钟，到点再投递一次
        controller.snooze_at(todo.id, 10, at(2, 9, 2)).await.unwrap();
        assert_eq!(scheduler.run_tick(at(2, 9, 5)).await.unwrap(), 0);
        assert_eq!(scheduler.run_tick(at(2, 9, 12)).await.unwrap(), 1);
        assert_eq!(drain(&mut rx), vec![(todo.id, ReminderChannel::OneShot)]);

        // 完成后彻底安静
        controller.complete_at(todo.id, at(2, 9, 13)).await.unwrap();
        assert_eq!(scheduler.run_tick(at(2, 9, 14)).await.unwrap(), 0);
        assert!(drain(&mut rx).is_empty());

        let stored = repo.get_by_id(todo.id).await.unwrap().unwrap();
        assert!(stored.completed);
        assert!(stored.reminder_time.is_none());
    }

    #[tokio::test]
    async fn test_recurring_weekly_fires_once_per_matching_day() {
        let (_dir, repo) = setup().await;
        let (tx, mut rx) = reminder_channel();
        let scheduler = ReminderScheduler::new(
            Arc::clone(&repo),
            tx,
            SchedulerConfig::default(),
        );

        // 周一/周三规则，2025-06-04 是周三
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let todo = repo
            .create(
                &TodoBuilder::new()
                    .with_title("周会")
                    .recurring_weekly(nine, vec![0, 2])
                    .build(),
            )
            .await
            .unwrap();

        // 周二全天不触发
        assert_eq!(scheduler.run_tick(at(3, 9, 30)).await.unwrap(), 0);

        // 周三触发一次，当天不重复
        assert_eq!(scheduler.run_tick(at(4, 9, 0)).await.unwrap(), 1);
        assert_eq!(scheduler.run_tick(at(4, 18, 0)).await.unwrap(), 0);
        assert_eq!(drain(&mut rx), vec![(todo.id, ReminderChannel::Recurring)]);
    }
}
