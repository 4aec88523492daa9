pub mod countdown;
pub mod removal_executor;
pub mod removal_scheduler;

#[cfg(test)]
pub mod test_support;

pub use removal_executor::{BulkRemovalExecutor, RemovalReport};
pub use removal_scheduler::{RemovalScheduler, ScheduleError, TaskHandle};
