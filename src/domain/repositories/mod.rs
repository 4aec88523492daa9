pub mod channel_repository;
pub mod task_repository;
pub mod user_repository;

pub use channel_repository::ChannelRepository;
pub use task_repository::TaskRepository;
pub use user_repository::UserRepository;
