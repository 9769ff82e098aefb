pub mod memory;
pub mod redis;

pub use self::memory::InMemoryBackend;
pub use self::redis::create_redis_client;
pub use self::redis::RedisBackend;

use crate::error::AppResult;

/// Handle to the remote key-value store holding serialized recommendation lists
///
/// The handle is created once at startup and injected into the store; nothing
/// here keeps per-request state. Implementations must be safe to share across
/// concurrently running requests.
#[async_trait::async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Reads the raw value stored at `key`
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Reads several keys in one round trip, preserving the order of `keys`
    ///
    /// Keys that no longer exist come back as `None`.
    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>>;

    /// Enumerates every key matching a glob-style `pattern`
    ///
    /// This is a full scan of the keyspace and is not paginated.
    async fn scan_keys(&self, pattern: &str) -> AppResult<Vec<String>>;

    /// Writes `value` only if the key currently holds `expected`
    ///
    /// `expected == None` means the key must be absent. Returns `false` when
    /// another writer got there first and nothing was written.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> AppResult<bool>;

    /// Checks that the backend is reachable
    async fn ping(&self) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
