pub mod sqlite_channel_repository;
pub mod sqlite_task_repository;
pub mod sqlite_user_repository;

pub use sqlite_channel_repository::SqliteChannelRepository;
pub use sqlite_task_repository::SqliteTaskRepository;
pub use sqlite_user_repository::SqliteUserRepository;
