use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::QueueError;
use crate::types::QueueName;

/// Durable FIFO queue abstraction, backed by Redis lists in production and
/// an in-memory fake in tests.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Append `payload` to `queue`. If the payload object has no
    /// `idempotency_key` field, one is assigned before it is stored.
    /// Never blocks.
    async fn enqueue(&self, queue: QueueName, payload: Value) -> Result<(), QueueError>;

    /// Blocking pop with `timeout` over the given active queue set,
    /// first-ready-wins. Returns `None` on timeout.
    async fn dequeue(&self, queues: &[QueueName], timeout: Duration) -> Result<Option<(QueueName, Value)>, QueueError>;

    /// Push a failed job onto the dead-letter queue.
    async fn dead_letter(&self, source_queue: QueueName, error: String, payload: Value, trace: String) -> Result<(), QueueError>;
}

/// Insert a fresh `idempotency_key` into `payload` only if it doesn't
/// already carry one.
pub fn ensure_idempotency_key(payload: &mut Value) {
    if let Value::Object(map) = payload {
        let missing = !matches!(map.get("idempotency_key"), Some(Value::String(_)));
        if missing {
            map.insert("idempotency_key".to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assigns_key_only_when_absent() {
        let mut payload = json!({"job_id": "abc"});
        ensure_idempotency_key(&mut payload);
        let key = payload["idempotency_key"].as_str().unwrap().to_string();
        assert!(!key.is_empty());

        ensure_idempotency_key(&mut payload);
        assert_eq!(payload["idempotency_key"].as_str().unwrap(), key);
    }

    #[test]
    fn preserves_caller_supplied_key() {
        let mut payload = json!({"idempotency_key": "caller-key"});
        ensure_idempotency_key(&mut payload);
        assert_eq!(payload["idempotency_key"], "caller-key");
    }
}
