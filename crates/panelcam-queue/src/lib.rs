pub mod error;
pub mod memory;
pub mod queue;
pub mod redis_queue;
pub mod types;

pub use error::QueueError;
pub use memory::InMemoryQueue;
pub use queue::{ensure_idempotency_key, JobQueue};
pub use redis_queue::RedisJobQueue;
pub use types::{DlqEntry, QueueName, RedisQueueKey, DLQ_REDIS_KEY};
