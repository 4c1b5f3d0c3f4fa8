use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;

use crate::error::QueueError;
use crate::queue::{ensure_idempotency_key, JobQueue};
use crate::types::{DlqEntry, QueueName, RedisQueueKey, DLQ_REDIS_KEY};

pub struct RedisJobQueue {
    conn: ConnectionManager,
}

impl RedisJobQueue {
    pub async fn connect(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url).map_err(|e| QueueError::Unavailable(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| QueueError::Unavailable(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, queue: QueueName, mut payload: Value) -> Result<(), QueueError> {
        ensure_idempotency_key(&mut payload);
        let body = serde_json::to_string(&payload).map_err(|e| QueueError::Malformed(e.to_string()))?;
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(queue.redis_key(), body)
            .await
            .map_err(|e| QueueError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn dequeue(&self, queues: &[QueueName], timeout: Duration) -> Result<Option<(QueueName, Value)>, QueueError> {
        if queues.is_empty() {
            return Err(QueueError::UnknownQueue("no active queues given".to_string()));
        }

        let keys: Vec<String> = queues.iter().map(|q| q.redis_key()).collect();
        let mut cmd = redis::cmd("BLMPOP");
        cmd.arg(timeout.as_secs_f64()).arg(keys.len());
        for key in &keys {
            cmd.arg(key);
        }
        cmd.arg("LEFT").arg("COUNT").arg(1);

        let mut conn = self.conn.clone();
        let reply: Option<(String, Vec<String>)> = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| QueueError::Unavailable(e.to_string()))?;

        let Some((key, mut elements)) = reply else {
            return Ok(None);
        };
        let Some(body) = elements.pop() else {
            return Ok(None);
        };
        let queue = QueueName::from_redis_key(&key).ok_or_else(|| QueueError::UnknownQueue(key.clone()))?;
        let payload: Value = serde_json::from_str(&body).map_err(|e| QueueError::Malformed(e.to_string()))?;
        Ok(Some((queue, payload)))
    }

    async fn dead_letter(&self, source_queue: QueueName, error: String, payload: Value, trace: String) -> Result<(), QueueError> {
        let entry = DlqEntry { source_queue: source_queue.queue_name().to_string(), error, payload, trace };
        let body = serde_json::to_string(&entry).map_err(|e| QueueError::Malformed(e.to_string()))?;
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(DLQ_REDIS_KEY, body)
            .await
            .map_err(|e| QueueError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
