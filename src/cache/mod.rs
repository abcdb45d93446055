//! Daily cache for feature results
//!
//! Each cacheable feature (generated meal plan, last ingredient search) owns a
//! single persisted slot. A slot holds the latest result together with the
//! local calendar date it was produced on, and is only served on that same
//! date. Older records are ignored rather than deleted and get overwritten by
//! the next successful fetch.

mod clock;
mod manager;

pub use clock::{Clock, FixedClock, LocalClock};
pub use manager::{CacheError, CacheKey, CachedResult, DailyCache, Fetched, Origin};
