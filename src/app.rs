use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::info;

use todox_domain::repositories::TodoRepository;
use todox_infrastructure::{create_sqlite_pool, SqliteTodoRepository};
use todox_reminder::{
    reminder_channel, ReminderChannel, ReminderEvent, ReminderReceiver, ReminderScheduler,
    SchedulerConfig,
};

use crate::config::AppConfig;

/// 应用实例：数据库、调度器和控制台通知消费者的组装
pub struct Application {
    pool: SqlitePool,
    scheduler: Arc<ReminderScheduler>,
    events_rx: ReminderReceiver,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let pool = create_sqlite_pool(&config.database.url, config.database.max_connections)
            .await
            .with_context(|| format!("初始化数据库失败: {}", config.database.url))?;

        let todo_repo: Arc<dyn TodoRepository> = Arc::new(SqliteTodoRepository::new(pool.clone()));

        let stats = todo_repo.get_stats(Local::now().naive_local()).await?;
        info!(
            "待办统计: 总计{} 未完成{} 已完成{} 逾期{}",
            stats.total, stats.pending, stats.completed, stats.overdue
        );

        let (events_tx, events_rx) = reminder_channel();
        let scheduler_config = SchedulerConfig {
            tick_interval: Duration::from_secs(config.reminder.tick_interval_seconds),
            tick_timeout: Duration::from_secs(config.reminder.tick_timeout_seconds),
        };
        let scheduler = Arc::new(ReminderScheduler::new(todo_repo, events_tx, scheduler_config));

        Ok(Self {
            pool,
            scheduler,
            events_rx,
        })
    }

    /// 运行调度器并消费提醒事件，直到收到关闭信号
    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        self.scheduler.start().await;

        loop {
            tokio::select! {
                maybe_event = self.events_rx.recv() => {
                    match maybe_event {
                        Some(event) => notify(&event),
                        None => break,
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }

        self.scheduler.stop().await;

        // 停止后通道里可能还有已投递未消费的事件，补发后再退出
        while let Ok(event) = self.events_rx.try_recv() {
            notify(&event);
        }

        self.pool.close().await;
        info!("应用资源已释放");
        Ok(())
    }
}

/// 控制台通知：桌面通知的占位实现
fn notify(event: &ReminderEvent) {
    match event.channel {
        ReminderChannel::OneShot => {
            let scheduled = event
                .todo
                .reminder_time
                .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            info!("待办提醒: {} (计划时间 {scheduled})", event.todo.title);
        }
        ReminderChannel::Recurring => {
            let scheduled = event
                .todo
                .recurring_time
                .map(|time| time.format("%H:%M").to_string())
                .unwrap_or_default();
            info!("循环提醒: {} (每日时刻 {scheduled})", event.todo.title);
        }
    }
}
