//! 仓储trait的内存Mock实现
//!
//! 不需要真实数据库连接即可运行单元测试；`set_failing` 可以模拟
//! 存储层临时不可用，用于验证调度循环的容错行为。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use todox_domain::entities::{Todo, TodoFilter, TodoStats, TodoUpdate};
use todox_domain::errors::{TodoError, TodoResult};
use todox_domain::repositories::TodoRepository;

/// TodoRepository 的内存Mock
#[derive(Debug, Clone)]
pub struct MockTodoRepository {
    todos: Arc<Mutex<HashMap<i64, Todo>>>,
    next_id: Arc<Mutex<i64>>,
    failing: Arc<Mutex<bool>>,
}

impl MockTodoRepository {
    pub fn new() -> Self {
        Self {
            todos: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
            failing: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let mut todo_map = HashMap::new();
        let mut max_id = 0;

        for todo in todos {
            if todo.id > max_id {
                max_id = todo.id;
            }
            todo_map.insert(todo.id, todo);
        }

        Self {
            todos: Arc::new(Mutex::new(todo_map)),
            next_id: Arc::new(Mutex::new(max_id + 1)),
            failing: Arc::new(Mutex::new(false)),
        }
    }

    /// 让后续所有操作返回存储错误
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn clear(&self) {
        self.todos.lock().unwrap().clear();
        *self.next_id.lock().unwrap() = 1;
    }

    pub fn count(&self) -> usize {
        self.todos.lock().unwrap().len()
    }

    pub fn get_all(&self) -> Vec<Todo> {
        self.todos.lock().unwrap().values().cloned().collect()
    }

    fn check_available(&self) -> TodoResult<()> {
        if *self.failing.lock().unwrap() {
            return Err(TodoError::DatabaseOperation("模拟的存储故障".to_string()));
        }
        Ok(())
    }
}

impl Default for MockTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoRepository for MockTodoRepository {
    async fn create(&self, todo: &Todo) -> TodoResult<Todo> {
        self.check_available()?;
        let mut todos = self.todos.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();

        let mut new_todo = todo.clone();
        new_todo.id = *next_id;
        *next_id += 1;

        todos.insert(new_todo.id, new_todo.clone());
        Ok(new_todo)
    }

    async fn get_by_id(&self, id: i64) -> TodoResult<Option<Todo>> {
        self.check_available()?;
        let todos = self.todos.lock().unwrap();
        Ok(todos.get(&id).cloned())
    }

    async fn list(&self, filter: &TodoFilter) -> TodoResult<Vec<Todo>> {
        self.check_available()?;
        let todos = self.todos.lock().unwrap();
        let mut result: Vec<Todo> = todos
            .values()
            .filter(|todo| filter.include_completed || !todo.completed)
            .filter(|todo| match &filter.keyword {
                Some(keyword) => {
                    todo.title.contains(keyword.as_str())
                        || todo.description.contains(keyword.as_str())
                }
                None => true,
            })
            .filter(|todo| match filter.category_id {
                Some(category_id) => todo.category_id == Some(category_id),
                None => true,
            })
            .cloned()
            .collect();
        result.sort_by_key(|todo| todo.id);
        Ok(result)
    }

    async fn update(&self, todo: &Todo) -> TodoResult<()> {
        self.check_available()?;
        let mut todos = self.todos.lock().unwrap();
        if !todos.contains_key(&todo.id) {
            return Err(TodoError::TodoNotFound { id: todo.id });
        }
        todos.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn apply_update(&self, id: i64, update: &TodoUpdate) -> TodoResult<Todo> {
        self.check_available()?;
        let mut todos = self.todos.lock().unwrap();
        let todo = todos
            .get_mut(&id)
            .ok_or(TodoError::TodoNotFound { id })?;
        update.apply_to(todo);
        Ok(todo.clone())
    }

    async fn update_reminder_time(
        &self,
        id: i64,
        reminder_time: Option<NaiveDateTime>,
    ) -> TodoResult<Todo> {
        self.check_available()?;
        let mut todos = self.todos.lock().unwrap();
        let todo = todos
            .get_mut(&id)
            .ok_or(TodoError::TodoNotFound { id })?;
        todo.reminder_time = reminder_time;
        Ok(todo.clone())
    }

    async fn delete(&self, id: i64) -> TodoResult<bool> {
        self.check_available()?;
        let mut todos = self.todos.lock().unwrap();
        Ok(todos.remove(&id).is_some())
    }

    async fn batch_complete(&self, ids: &[i64], now: NaiveDateTime) -> TodoResult<u64> {
        self.check_available()?;
        let mut todos = self.todos.lock().unwrap();
        let mut affected = 0;
        for id in ids {
            if let Some(todo) = todos.get_mut(id) {
                todo.completed = true;
                todo.completed_at = Some(now);
                todo.reminder_time = None;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn batch_delete(&self, ids: &[i64]) -> TodoResult<u64> {
        self.check_available()?;
        let mut todos = self.todos.lock().unwrap();
        let mut affected = 0;
        for id in ids {
            if todos.remove(id).is_some() {
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn find_overdue_one_shot(&self, now: NaiveDateTime) -> TodoResult<Vec<Todo>> {
        self.check_available()?;
        let todos = self.todos.lock().unwrap();
        let mut result: Vec<Todo> = todos
            .values()
            .filter(|todo| {
                !todo.completed && matches!(todo.reminder_time, Some(reminder) if reminder <= now)
            })
            .cloned()
            .collect();
        result.sort_by_key(|todo| todo.id);
        Ok(result)
    }

    async fn find_active_recurring(&self) -> TodoResult<Vec<Todo>> {
        self.check_available()?;
        let todos = self.todos.lock().unwrap();
        let mut result: Vec<Todo> = todos
            .values()
            .filter(|todo| !todo.completed && todo.is_recurring && todo.recurring_time.is_some())
            .cloned()
            .collect();
        result.sort_by_key(|todo| todo.id);
        Ok(result)
    }

    async fn get_stats(&self, now: NaiveDateTime) -> TodoResult<TodoStats> {
        self.check_available()?;
        let todos = self.todos.lock().unwrap();
        let total = todos.len() as i64;
        let completed = todos.values().filter(|todo| todo.completed).count() as i64;
        let overdue = todos
            .values()
            .filter(|todo| {
                !todo.completed && matches!(todo.reminder_time, Some(reminder) if reminder < now)
            })
            .count() as i64;
        Ok(TodoStats {
            total,
            completed,
            pending: total - completed,
            overdue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::TodoBuilder;

    #[tokio::test]
    async fn test_mock_repository_create_assigns_ids() {
        let repo = MockTodoRepository::new();
        let first = repo.create(&TodoBuilder::new().build()).await.unwrap();
        let second = repo.create(&TodoBuilder::new().build()).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.count(), 2);
    }

    #[tokio::test]
    async fn test_mock_repository_failing_mode() {
        let repo = MockTodoRepository::new();
        repo.set_failing(true);
        let result = repo.get_by_id(1).await;
        assert!(matches!(result, Err(TodoError::DatabaseOperation(_))));

        repo.set_failing(false);
        assert!(repo.get_by_id(1).await.unwrap().is_none());
    }
}
