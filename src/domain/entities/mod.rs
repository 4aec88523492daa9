pub mod channel;
pub mod removal_task;
pub mod user;

pub use channel::Channel;
pub use removal_task::{RemovalTask, TaskStatus, TimeUnit};
pub use user::User;
