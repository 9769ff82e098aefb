pub mod backend;

pub use backend::RedisBackend;

use redis::Client;

/// Creates a Redis client for the recommendation backend
///
/// Only parses the URL; no connection is made until the backend connects.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}
