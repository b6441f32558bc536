//! Redis store provider implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, error, info, warn};

use roomkey_core::error::{AppError, ErrorKind};
use roomkey_core::result::AppResult;
use roomkey_core::traits::{MessageStream, ReleaseOutcome, StoreProvider};
use roomkey_core::types::{RoomId, RoomKey};

use super::client::RedisClient;
use super::scripts::{self, Scripts};
use crate::keys;

/// Number of keys fetched per `SCAN` round during reset.
const RESET_SCAN_COUNT: u64 = 500;

/// Redis-backed store provider.
#[derive(Debug, Clone)]
pub struct RedisStoreProvider {
    /// Redis client.
    client: RedisClient,
    /// Atomic procedure scripts.
    scripts: Scripts,
}

impl RedisStoreProvider {
    /// Create a new Redis store provider.
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            scripts: Scripts::new(),
        }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Store, format!("Redis error: {e}"), e)
    }

    /// Run a single command against the shared connection.
    async fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> AppResult<T> {
        let mut conn = self.client.conn_mut();
        cmd.query_async(&mut conn).await.map_err(Self::map_err)
    }

    fn key(&self, key: &str) -> String {
        self.client.prefixed_key(key)
    }
}

#[async_trait]
impl StoreProvider for RedisStoreProvider {
    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool> {
        let added: i64 = self
            .query(redis::cmd("SADD").arg(self.key(key)).arg(member))
            .await?;
        Ok(added > 0)
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool> {
        let removed: i64 = self
            .query(redis::cmd("SREM").arg(self.key(key)).arg(member))
            .await?;
        Ok(removed > 0)
    }

    async fn set_is_member(&self, key: &str, member: &str) -> AppResult<bool> {
        self.query(redis::cmd("SISMEMBER").arg(self.key(key)).arg(member))
            .await
    }

    async fn set_pop(&self, key: &str) -> AppResult<Option<String>> {
        self.query(redis::cmd("SPOP").arg(self.key(key))).await
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        self.query(redis::cmd("SMEMBERS").arg(self.key(key))).await
    }

    async fn set_card(&self, key: &str) -> AppResult<u64> {
        self.query(redis::cmd("SCARD").arg(self.key(key))).await
    }

    async fn hash_get(&self, key: &str, field: &str) -> AppResult<Option<String>> {
        self.query(redis::cmd("HGET").arg(self.key(key)).arg(field))
            .await
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> AppResult<()> {
        let _: i64 = self
            .query(redis::cmd("HSET").arg(self.key(key)).arg(field).arg(value))
            .await?;
        Ok(())
    }

    async fn hash_set_many(&self, key: &str, fields: &[(String, String)]) -> AppResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut cmd = redis::cmd("HSET");
        cmd.arg(self.key(key));
        for (field, value) in fields {
            cmd.arg(field).arg(value);
        }
        let _: i64 = self.query(&cmd).await?;
        Ok(())
    }

    async fn hash_delete(&self, key: &str, field: &str) -> AppResult<bool> {
        let removed: i64 = self
            .query(redis::cmd("HDEL").arg(self.key(key)).arg(field))
            .await?;
        Ok(removed > 0)
    }

    async fn hash_get_all(&self, key: &str) -> AppResult<HashMap<String, String>> {
        self.query(redis::cmd("HGETALL").arg(self.key(key))).await
    }

    async fn list_push(&self, key: &str, value: &str) -> AppResult<u64> {
        self.query(redis::cmd("RPUSH").arg(self.key(key)).arg(value))
            .await
    }

    async fn list_remove(&self, key: &str, value: &str) -> AppResult<u64> {
        self.query(redis::cmd("LREM").arg(self.key(key)).arg(0).arg(value))
            .await
    }

    async fn list_index(&self, key: &str, index: i64) -> AppResult<Option<String>> {
        self.query(redis::cmd("LINDEX").arg(self.key(key)).arg(index))
            .await
    }

    async fn list_position(&self, key: &str, value: &str) -> AppResult<Option<u64>> {
        self.query(redis::cmd("LPOS").arg(self.key(key)).arg(value))
            .await
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> AppResult<Vec<String>> {
        self.query(redis::cmd("LRANGE").arg(self.key(key)).arg(start).arg(stop))
            .await
    }

    async fn publish(&self, channel: &str, payload: &str) -> AppResult<u64> {
        let receivers: u64 = self
            .query(redis::cmd("PUBLISH").arg(self.key(channel)).arg(payload))
            .await?;
        debug!(channel, receivers, "Published message");
        Ok(receivers)
    }

    async fn subscribe(&self, channel: &str) -> AppResult<MessageStream> {
        let full_channel = self.key(channel);
        let mut pubsub = self.client.pubsub().await?;
        pubsub
            .subscribe(&full_channel)
            .await
            .map_err(Self::map_err)?;
        info!(channel = %full_channel, "Subscribed to Redis channel");

        let stream = pubsub
            .into_on_message()
            .filter_map(|msg| async move {
                match msg.get_payload::<String>() {
                    Ok(payload) => Some(payload),
                    Err(e) => {
                        warn!(error = %e, "Dropping non-UTF-8 pub/sub payload");
                        None
                    }
                }
            })
            .boxed();
        Ok(stream)
    }

    async fn reset(&self) -> AppResult<()> {
        if self.client.prefix().is_empty() {
            let _: () = self.query(&redis::cmd("FLUSHDB")).await?;
            info!("Redis database flushed");
            return Ok(());
        }

        // Only remove keys with our prefix, not the entire database.
        let pattern = format!("{}*", self.client.prefix());
        let mut cursor: u64 = 0;
        let mut deleted = 0u64;
        loop {
            let (next, batch): (u64, Vec<String>) = self
                .query(
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(RESET_SCAN_COUNT),
                )
                .await?;
            if !batch.is_empty() {
                let removed: u64 = self.query(redis::cmd("DEL").arg(&batch)).await?;
                deleted += removed;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        info!(pattern = %pattern, deleted, "Redis keys reset");
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        let pong: String = self.query(&redis::cmd("PING")).await?;
        Ok(pong == "PONG")
    }

    async fn init_counter(&self) -> AppResult<()> {
        let _: () = self
            .query(redis::cmd("SET").arg(self.key(keys::NEXT_ROOM_ID)).arg(0))
            .await?;
        Ok(())
    }

    async fn next_room_id(&self) -> AppResult<RoomId> {
        let mut conn = self.client.conn_mut();
        let id: u64 = self
            .scripts
            .next_room_id
            .key(self.key(keys::NEXT_ROOM_ID))
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(RoomId(id))
    }

    async fn populate_key_pool(&self, candidates: &[RoomKey]) -> AppResult<u64> {
        if candidates.is_empty() {
            return Ok(0);
        }
        let mut conn = self.client.conn_mut();
        let mut invocation = self.scripts.populate_key_pool.key(self.key(keys::ROOM_KEYS));
        invocation.key(self.key(keys::ROOM_ID_FOR_KEY));
        for candidate in candidates {
            invocation.arg(candidate.as_str());
        }
        invocation
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)
    }

    async fn claim_key_for_room(&self, room_id: RoomId) -> AppResult<Option<RoomKey>> {
        let mut conn = self.client.conn_mut();
        let key: Option<String> = self
            .scripts
            .claim_key_for_room
            .key(self.key(keys::ROOM_KEYS))
            .key(self.key(keys::ROOM_ID_FOR_KEY))
            .key(self.key(keys::KEY_FOR_ROOM_ID))
            .arg(room_id.get())
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(key.map(RoomKey))
    }

    async fn release_key(&self, room_id: RoomId, key: &RoomKey) -> AppResult<ReleaseOutcome> {
        let mut conn = self.client.conn_mut();
        let (status, bound): (i64, String) = self
            .scripts
            .release_key
            .key(self.key(keys::ROOM_KEYS))
            .key(self.key(keys::ROOM_ID_FOR_KEY))
            .key(self.key(keys::KEY_FOR_ROOM_ID))
            .arg(room_id.get())
            .arg(key.as_str())
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        match status {
            scripts::RELEASE_OK => Ok(ReleaseOutcome::Released),
            scripts::RELEASE_NOT_FOUND => Ok(ReleaseOutcome::NotFound),
            scripts::RELEASE_MISMATCH => {
                let bound_to = bound.parse::<RoomId>().map_err(|_| {
                    AppError::internal(format!("Key '{key}' is bound to malformed room '{bound}'"))
                })?;
                Ok(ReleaseOutcome::Mismatch { bound_to })
            }
            other => {
                error!(result = other, "Unexpected Lua script result");
                Err(AppError::internal(format!(
                    "Unexpected key release result: {other}"
                )))
            }
        }
    }
}
