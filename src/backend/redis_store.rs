//! Redis Backing Store
//!
//! Blocking Redis client used by the cache worker on a miss.

use redis::{Client, Commands, Connection, RedisError};
use tracing::{debug, warn};

use super::{BackendError, BackingStore, StoreStats};

impl From<RedisError> for BackendError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            BackendError::Unavailable(err.to_string())
        } else {
            BackendError::Protocol(err.to_string())
        }
    }
}

// == Redis Store ==
/// Backing store reading string values from a single Redis database.
///
/// The connection is opened on first use. After any failed command it is
/// dropped, so the next fetch reconnects.
pub struct RedisStore {
    client: Client,
    conn: Option<Connection>,
    stats: StoreStats,
}

impl RedisStore {
    // == Constructor ==
    /// Creates a store for the Redis server at `host:port`, database 0.
    ///
    /// Only validates the address; no connection is made until the first fetch.
    pub fn new(host: &str, port: u16) -> Result<Self, BackendError> {
        let url = format!("redis://{}:{}/0", host, port);
        let client = Client::open(url.as_str())?;
        Ok(Self {
            client,
            conn: None,
            stats: StoreStats::default(),
        })
    }

    fn connection(&mut self) -> Result<&mut Connection, BackendError> {
        if self.conn.is_none() {
            debug!("Opening Redis connection");
            self.conn = Some(self.client.get_connection()?);
        }
        self.conn
            .as_mut()
            .ok_or_else(|| BackendError::Unavailable("no connection".to_string()))
    }

    fn fetch(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        let conn = self.connection()?;
        let value: Option<String> = conn.get(key)?;
        Ok(value)
    }
}

impl BackingStore for RedisStore {
    fn get(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        match self.fetch(key) {
            Ok(Some(value)) => {
                self.stats.hits += 1;
                Ok(Some(value))
            }
            Ok(None) => {
                self.stats.misses += 1;
                Ok(None)
            }
            Err(err) => {
                warn!("Redis lookup for '{}' failed: {}", key, err);
                self.stats.errors += 1;
                self.conn = None;
                Err(err)
            }
        }
    }

    fn stats(&self) -> StoreStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_does_not_connect() {
        // Port 1 is never a Redis server; construction must still succeed.
        let store = RedisStore::new("127.0.0.1", 1).unwrap();
        assert_eq!(store.stats(), StoreStats::default());
    }

    #[test]
    fn test_unreachable_server_is_an_error_not_a_miss() {
        let mut store = RedisStore::new("127.0.0.1", 1).unwrap();

        let result = store.get("some_key");
        assert!(matches!(result, Err(BackendError::Unavailable(_))));

        let stats = store.stats();
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.hits, 0);
    }
}
