//! 提醒调度引擎
//!
//! 固定间隔评估待办的一次性与循环提醒、按出现去重、向通知通道
//! 分发事件，并处理稍后提醒/完成等用户决定。

pub mod controller;
pub mod due_selector;
pub mod events;
pub mod scheduler;
pub mod watermark;

pub use controller::TodoController;
pub use due_selector::{DueSet, DueSetSelector};
pub use events::{reminder_channel, ReminderChannel, ReminderEvent, ReminderReceiver, ReminderSender};
pub use scheduler::{ReminderScheduler, SchedulerConfig};
pub use watermark::{RuleFingerprint, WatermarkStore};
