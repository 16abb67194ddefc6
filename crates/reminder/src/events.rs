//! 提醒事件与分发通道
//!
//! 调度器通过消息通道把到期事件交给UI所属线程，自己不直接触碰
//! 任何UI状态。无界通道保证分发永不阻塞tick循环。

use tokio::sync::mpsc;

use todox_domain::entities::Todo;

/// 触发本次提醒的通道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderChannel {
    /// 一次性提醒（reminder_time）
    OneShot,
    /// 循环提醒（recurring_*规则）
    Recurring,
}

/// 一次到期提醒
#[derive(Debug, Clone)]
pub struct ReminderEvent {
    pub todo: Todo,
    pub channel: ReminderChannel,
}

pub type ReminderSender = mpsc::UnboundedSender<ReminderEvent>;
pub type ReminderReceiver = mpsc::UnboundedReceiver<ReminderEvent>;

/// 创建提醒事件通道
pub fn reminder_channel() -> (ReminderSender, ReminderReceiver) {
    mpsc::unbounded_channel()
}
