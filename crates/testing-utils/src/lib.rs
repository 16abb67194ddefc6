//! 测试工具集
//!
//! 提供内存版的仓储Mock和测试数据构造器，供各crate的单元测试
//! 和集成测试使用，避免依赖真实数据库。

pub mod builders;
pub mod mocks;

pub use builders::TodoBuilder;
pub use mocks::MockTodoRepository;
