mod sqlite_category_repository;
mod sqlite_holiday_repository;
mod sqlite_tag_repository;
mod sqlite_todo_repository;

pub use sqlite_category_repository::SqliteCategoryRepository;
pub use sqlite_holiday_repository::SqliteHolidayRepository;
pub use sqlite_tag_repository::SqliteTagRepository;
pub use sqlite_todo_repository::SqliteTodoRepository;
