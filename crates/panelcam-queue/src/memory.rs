use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::QueueError;
use crate::queue::{ensure_idempotency_key, JobQueue};
use crate::types::{DlqEntry, QueueName};

/// In-memory stand-in for `JobQueue`, used by worker/pipeline tests. FIFO
/// per queue; `dequeue` polls the given queues in order and returns
/// immediately if any is non-empty — it never actually blocks for
/// `timeout`, since tests don't want to wait on real time.
#[derive(Default)]
pub struct InMemoryQueue {
    queues: Mutex<std::collections::HashMap<&'static str, VecDeque<Value>>>,
    dlq: Mutex<Vec<DlqEntry>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dlq_len(&self) -> usize {
        self.dlq.lock().unwrap().len()
    }

    pub fn drain_dlq(&self) -> Vec<DlqEntry> {
        std::mem::take(&mut self.dlq.lock().unwrap())
    }
}

#[async_trait]
impl JobQueue for InMemoryQueue {
    async fn enqueue(&self, queue: QueueName, mut payload: Value) -> Result<(), QueueError> {
        ensure_idempotency_key(&mut payload);
        self.queues.lock().unwrap().entry(queue.queue_name()).or_default().push_back(payload);
        Ok(())
    }

    async fn dequeue(&self, queues: &[QueueName], _timeout: Duration) -> Result<Option<(QueueName, Value)>, QueueError> {
        let mut guard = self.queues.lock().unwrap();
        for queue in queues {
            if let Some(list) = guard.get_mut(queue.queue_name()) {
                if let Some(payload) = list.pop_front() {
                    return Ok(Some((*queue, payload)));
                }
            }
        }
        Ok(None)
    }

    async fn dead_letter(&self, source_queue: QueueName, error: String, payload: Value, trace: String) -> Result<(), QueueError> {
        self.dlq.lock().unwrap().push(DlqEntry {
            source_queue: source_queue.queue_name().to_string(),
            error,
            payload,
            trace,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn fifo_per_queue() {
        let queue = InMemoryQueue::new();
        queue.enqueue(QueueName::Dxf, json!({"job_id": "1"})).await.unwrap();
        queue.enqueue(QueueName::Dxf, json!({"job_id": "2"})).await.unwrap();

        let (q, first) = queue.dequeue(&QueueName::ALL, Duration::from_millis(1)).await.unwrap().unwrap();
        assert_eq!(q, QueueName::Dxf);
        assert_eq!(first["job_id"], "1");

        let (_, second) = queue.dequeue(&QueueName::ALL, Duration::from_millis(1)).await.unwrap().unwrap();
        assert_eq!(second["job_id"], "2");
    }

    #[tokio::test]
    async fn first_ready_wins_across_queues() {
        let queue = InMemoryQueue::new();
        queue.enqueue(QueueName::Gcode, json!({"job_id": "g"})).await.unwrap();
        let active = [QueueName::Dxf, QueueName::Gcode, QueueName::Drilling, QueueName::Zip];
        let (q, _) = queue.dequeue(&active, Duration::from_millis(1)).await.unwrap().unwrap();
        assert_eq!(q, QueueName::Gcode);
    }

    #[tokio::test]
    async fn empty_queues_return_none() {
        let queue = InMemoryQueue::new();
        let result = queue.dequeue(&QueueName::ALL, Duration::from_millis(1)).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn dead_letter_records_source_and_error() {
        let queue = InMemoryQueue::new();
        queue.dead_letter(QueueName::Zip, "boom".to_string(), json!({"job_id": "z"}), "trace".to_string()).await.unwrap();
        assert_eq!(queue.dlq_len(), 1);
        let entries = queue.drain_dlq();
        assert_eq!(entries[0].error, "boom");
        assert_eq!(entries[0].source_queue, "zip");
    }
}
