//! Daily cache manager for feature results
//!
//! Provides a `DailyCache` that stores serializable results in the key-value
//! store stamped with the local date they were produced on, and serves them
//! back only on that same date.

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

use super::Clock;
use crate::store::{KeyValueStore, StoreError};

/// Logical slot a feature's result is cached under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The last generated meal plan
    MealPlan,
    /// The last ingredient search and its nutrition data
    SavedSearch,
}

impl CacheKey {
    /// Storage key for the slot
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::MealPlan => "mealPlan",
            CacheKey::SavedSearch => "savedSearch",
        }
    }

    pub fn all() -> [CacheKey; 2] {
        [CacheKey::MealPlan, CacheKey::SavedSearch]
    }
}

/// Persisted record: the payload fields sit next to the date stamp
#[derive(Debug, Serialize)]
pub struct CachedResult<T> {
    /// Local calendar date the payload was produced on
    pub date: NaiveDate,
    #[serde(flatten)]
    pub payload: T,
}

/// A record as read back, with the payload fields still undecoded
///
/// Flattened fields lose serde_json's map-key coercion, so the payload is
/// decoded separately from a `Value` to keep integer-keyed maps readable.
#[derive(Deserialize)]
struct StoredRecord {
    date: NaiveDate,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// Errors that can occur when reading or writing cached results
#[derive(Debug, Error)]
pub enum CacheError {
    /// The key-value store failed
    #[error("Cache storage failed: {0}")]
    Store(#[from] StoreError),

    /// The stored record could not be decoded
    #[error("Cached record '{key}' is unreadable: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The payload could not be encoded
    #[error("Failed to encode cache record: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Where a value returned by [`DailyCache::get_or_fetch`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Served from today's cached record
    Cache,
    /// Freshly fetched from the remote service
    Remote,
}

/// A value plus how it was obtained
#[derive(Debug)]
pub struct Fetched<T> {
    pub value: T,
    pub origin: Origin,
    /// Set when a fresh value could not be written back to the cache
    pub write_error: Option<CacheError>,
}

/// Reads and writes date-stamped results, one slot per [`CacheKey`]
pub struct DailyCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    /// Serializes writes per slot so the last call wins
    write_locks: Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl DailyCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The date records are currently stamped with and compared against
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn write_lock(&self, key: CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.write_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(key).or_default().clone()
    }

    /// Reads today's payload for `key`
    ///
    /// # Returns
    /// * `Ok(Some(T))` if a record exists and was produced today
    /// * `Ok(None)` if there is no record or it is from another date; the
    ///   stale record is left in place
    /// * `Err(CacheError)` if the store fails or the record is unreadable
    pub async fn load<T: DeserializeOwned>(&self, key: CacheKey) -> Result<Option<T>, CacheError> {
        let Some(raw) = self.store.get(key.as_str()).await? else {
            debug!(key = key.as_str(), "cache miss: no record");
            return Ok(None);
        };

        let corrupt = |source: serde_json::Error| CacheError::Corrupt {
            key: key.as_str(),
            source,
        };
        let record: StoredRecord = serde_json::from_str(&raw).map_err(corrupt)?;

        let today = self.clock.today();
        if record.date != today {
            debug!(key = key.as_str(), stamped = %record.date, %today, "cache miss: expired");
            return Ok(None);
        }

        let payload = serde_json::from_value(Value::Object(record.fields)).map_err(corrupt)?;
        debug!(key = key.as_str(), "cache hit");
        Ok(Some(payload))
    }

    /// Like [`load`](Self::load), but any error is logged and treated as a miss
    pub async fn load_or_miss<T: DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
        match self.load(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Replaces the record for `key` with `payload` stamped with today's date
    pub async fn store<T: Serialize>(&self, key: CacheKey, payload: &T) -> Result<(), CacheError> {
        let lock = self.write_lock(key);
        let _guard = lock.lock().await;

        let record = CachedResult {
            date: self.clock.today(),
            payload,
        };
        let json = serde_json::to_string(&record).map_err(CacheError::Encode)?;

        self.store.set(key.as_str(), &json).await?;
        debug!(key = key.as_str(), date = %record.date, "cache record stored");
        Ok(())
    }

    /// Removes the record for `key`
    pub async fn invalidate(&self, key: CacheKey) -> Result<(), CacheError> {
        let lock = self.write_lock(key);
        let _guard = lock.lock().await;

        self.store.remove(key.as_str()).await?;
        debug!(key = key.as_str(), "cache record removed");
        Ok(())
    }

    /// Serves today's record for `key` if `accept` agrees, otherwise runs `fetch`
    ///
    /// A fresh value is written back to the cache. A failed write is reported
    /// through [`Fetched::write_error`] and never hides the fetched value.
    /// Fetch errors are returned unchanged and leave the cache untouched.
    pub async fn get_or_fetch<T, E, A, F, Fut>(
        &self,
        key: CacheKey,
        accept: A,
        fetch: F,
    ) -> Result<Fetched<T>, E>
    where
        T: Serialize + DeserializeOwned,
        A: FnOnce(&T) -> bool,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.load_or_miss::<T>(key).await {
            if accept(&cached) {
                return Ok(Fetched {
                    value: cached,
                    origin: Origin::Cache,
                    write_error: None,
                });
            }
            debug!(key = key.as_str(), "cached record not applicable, fetching");
        }

        let value = fetch().await?;

        let write_error = match self.store(key, &value).await {
            Ok(()) => None,
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "failed to cache fetched result");
                Some(e)
            }
        };

        Ok(Fetched {
            value,
            origin: Origin::Remote,
            write_error,
        })
    }
}
