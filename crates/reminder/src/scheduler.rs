//! 提醒调度器
//!
//! 后台tick循环：固定间隔评估到期集合，按水位去重后把事件发往
//! 通知通道。循环内的存储错误只作废当轮评估，绝不终止循环。

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use todox_domain::errors::{TodoError, TodoResult};
use todox_domain::repositories::TodoRepository;

use crate::due_selector::DueSetSelector;
use crate::events::{ReminderChannel, ReminderEvent, ReminderSender};
use crate::watermark::{RuleFingerprint, WatermarkStore};

/// 调度参数
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// tick间隔，默认1秒，保证提醒延迟接近即时
    pub tick_interval: Duration,
    /// 单轮评估的超时上限，超时后放弃本轮、下一轮重试
    pub tick_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            tick_timeout: Duration::from_secs(5),
        }
    }
}

struct Worker {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// 提醒调度器
///
/// 生命周期 `Stopped → Running → Stopped`；`start` 在运行中幂等，
/// `stop` 等待在途tick结束后返回，返回后保证不再有事件投递。
pub struct ReminderScheduler {
    selector: DueSetSelector,
    watermarks: Arc<WatermarkStore>,
    events_tx: ReminderSender,
    config: SchedulerConfig,
    /// 已上报过规则损坏的待办，避免每秒刷一条日志
    reported_invalid: Mutex<HashSet<i64>>,
    worker: tokio::sync::Mutex<Option<Worker>>,
}

impl ReminderScheduler {
    pub fn new(
        todo_repo: Arc<dyn TodoRepository>,
        events_tx: ReminderSender,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            selector: DueSetSelector::new(todo_repo),
            watermarks: Arc::new(WatermarkStore::new()),
            events_tx,
            config,
            reported_invalid: Mutex::new(HashSet::new()),
            worker: tokio::sync::Mutex::new(None),
        }
    }

    /// 共享水位句柄，供控制器在稍后提醒/完成时清除
    pub fn watermarks(&self) -> Arc<WatermarkStore> {
        Arc::clone(&self.watermarks)
    }

    pub async fn is_running(&self) -> bool {
        let worker = self.worker.lock().await;
        worker
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    /// 启动后台tick循环，运行中重复调用是空操作
    pub async fn start(self: &Arc<Self>) {
        let mut worker = self.worker.lock().await;
        if worker
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
        {
            debug!("提醒调度器已在运行，忽略重复启动");
            return;
        }

        info!(
            "启动提醒调度器，tick间隔 {:?}，单轮超时 {:?}",
            self.config.tick_interval, self.config.tick_timeout
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scheduler = Arc::clone(self);
        let handle = tokio::spawn(async move {
            scheduler.run_loop(shutdown_rx).await;
        });

        *worker = Some(Worker {
            shutdown_tx,
            handle,
        });
    }

    /// 停止调度，任意状态下可调用
    ///
    /// 返回前等待在途tick完成，返回后不会再有任何事件发出。
    pub async fn stop(&self) {
        let mut worker = self.worker.lock().await;
        let Some(active) = worker.take() else {
            debug!("提醒调度器未在运行");
            return;
        };

        info!("停止提醒调度器");
        let _ = active.shutdown_tx.send(true);
        if let Err(join_error) = active.handle.await {
            error!("提醒调度循环异常退出: {join_error}");
        }
        info!("提醒调度器已停止");
    }

    async fn run_loop(&self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.tick_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = Local::now().naive_local();
                    match timeout(self.config.tick_timeout, self.run_tick(now)).await {
                        Ok(Ok(dispatched)) => {
                            if dispatched > 0 {
                                debug!("本轮投递了 {dispatched} 条提醒");
                            }
                        }
                        Ok(Err(error)) => {
                            error!("本轮提醒评估失败: {error}");
                        }
                        Err(_) => {
                            warn!("本轮提醒评估超时，放弃本轮，下一轮重试");
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    info!("提醒调度循环收到关闭信号");
                    break;
                }
            }
        }
    }

    /// 执行一轮评估与分发，返回投递的事件数
    ///
    /// 一次性通道先于循环通道评估；两个通道各自按水位去重。
    pub async fn run_tick(&self, now: NaiveDateTime) -> TodoResult<usize> {
        let due = self.selector.select_due(now).await?;
        let mut dispatched = 0;

        for todo in due.one_shot {
            // 出现键就是当前的 reminder_time，稍后提醒会写入新值
            let Some(occurrence) = todo.reminder_time else {
                continue;
            };
            if self.watermarks.one_shot_already_sent(todo.id, occurrence) {
                continue;
            }
            self.watermarks.mark_one_shot(todo.id, occurrence);
            self.dispatch(ReminderEvent {
                todo,
                channel: ReminderChannel::OneShot,
            });
            dispatched += 1;
        }

        for todo in due.recurring {
            let fingerprint = RuleFingerprint::of(&todo);
            if self
                .watermarks
                .recurring_already_sent(todo.id, now.date(), &fingerprint)
            {
                continue;
            }
            self.watermarks
                .mark_recurring(todo.id, now.date(), fingerprint);
            self.dispatch(ReminderEvent {
                todo,
                channel: ReminderChannel::Recurring,
            });
            dispatched += 1;
        }

        self.report_invalid(&due.invalid);
        Ok(dispatched)
    }

    /// 发而不管：无界通道的send不阻塞tick循环
    fn dispatch(&self, event: ReminderEvent) {
        let todo_id = event.todo.id;
        if self.events_tx.send(event).is_err() {
            warn!("提醒事件接收端已关闭，待办 {todo_id} 的通知被丢弃");
        }
    }

    /// 规则损坏的待办只上报一次；恢复有效或被删除后重置上报状态
    fn report_invalid(&self, invalid: &[(i64, TodoError)]) {
        let mut reported = self.reported_invalid.lock().unwrap();
        let current: HashSet<i64> = invalid.iter().map(|(id, _)| *id).collect();
        reported.retain(|id| current.contains(id));

        for (todo_id, error) in invalid {
            if reported.insert(*todo_id) {
                warn!("待办 {todo_id} 的循环规则无效，按永不到期处理: {error}");
            }
        }
    }
}
