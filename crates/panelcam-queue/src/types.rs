pub use panelcam_core::JobKind as QueueName;

/// Redis key naming for each queue, kept local to this crate: the key
/// scheme is an implementation detail of the Redis backend, not part of
/// the shared job vocabulary in `panelcam-core`.
pub trait RedisQueueKey {
    fn redis_key(self) -> String;
    fn from_redis_key(key: &str) -> Option<QueueName>;
}

impl RedisQueueKey for QueueName {
    fn redis_key(self) -> String {
        format!("panelcam:queue:{}", self.queue_name())
    }

    fn from_redis_key(key: &str) -> Option<QueueName> {
        let name = key.strip_prefix("panelcam:queue:")?;
        QueueName::ALL.into_iter().find(|q| q.queue_name() == name)
    }
}

pub const DLQ_REDIS_KEY: &str = "panelcam:queue:dlq";

/// A message pulled off the DLQ list.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DlqEntry {
    pub source_queue: String,
    pub error: String,
    pub payload: serde_json::Value,
    pub trace: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redis_key_round_trips_through_from_redis_key() {
        for q in QueueName::ALL {
            assert_eq!(QueueName::from_redis_key(&q.redis_key()), Some(q));
        }
    }
}
