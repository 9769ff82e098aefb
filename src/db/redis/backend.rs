use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};

use crate::db::KeyValueBackend;
use crate::error::AppResult;

/// Keys requested per SCAN round trip
const SCAN_BATCH: usize = 500;

/// Check-and-set run server side so it is atomic on a shared connection.
///
/// KEYS[1] key, ARGV[1] "1" when the key must be absent, ARGV[2] expected
/// value, ARGV[3] new value. Returns 1 when written, 0 otherwise.
const COMPARE_AND_SET_SCRIPT: &str = r"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '1' then
    if current then
        return 0
    end
elseif current ~= ARGV[2] then
    return 0
end
redis.call('SET', KEYS[1], ARGV[3])
return 1
";

/// Redis-backed key-value store
///
/// Every command goes through one shared, auto-reconnecting
/// [`ConnectionManager`] opened at startup.
#[derive(Clone)]
pub struct RedisBackend {
    manager: ConnectionManager,
    compare_and_set: Script,
}

impl RedisBackend {
    /// Connects to Redis and keeps the connection for the life of the handle
    pub async fn connect(client: Client) -> AppResult<Self> {
        let addr = client.get_connection_info().addr.to_string();
        let manager = ConnectionManager::new(client).await?;
        tracing::info!(addr = %addr, "Connected to Redis");
        Ok(Self {
            manager,
            compare_and_set: Script::new(COMPARE_AND_SET_SCRIPT),
        })
    }
}

#[async_trait::async_trait]
impl KeyValueBackend for RedisBackend {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            tracing::warn!(error = %e, key, "Redis get failed");
            e
        })?;
        Ok(value)
    }

    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.manager.clone();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, key_count = keys.len(), "Redis MGET failed");
                e
            })?;
        Ok(values)
    }

    async fn scan_keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let mut conn = self.manager.clone();
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        tracing::debug!(pattern, count = keys.len(), "Scanned keys");
        Ok(keys)
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> AppResult<bool> {
        let mut conn = self.manager.clone();
        let must_be_absent = if expected.is_none() { "1" } else { "0" };

        let written: i64 = self
            .compare_and_set
            .key(key)
            .arg(must_be_absent)
            .arg(expected.unwrap_or_default())
            .arg(value)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, key, "Redis compare-and-set failed");
                e
            })?;

        Ok(written == 1)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
