// Car park search: TTL-cached lots/meta feeds and the query engine on top of them

pub mod cache_entry;
pub mod config;
pub mod facility;
pub mod feed_cache;
pub mod feed_source;
pub mod query;
pub mod xml_feed;

#[cfg(test)]
mod mock_feed;

// Re-export key types for convenience
pub use cache_entry::{CacheEntry, CacheStatsReport, TtlCache};
pub use config::{ConfigError, FeedConfig};
pub use facility::{District, FacilityRecord};
pub use feed_cache::{FeedCache, Records, SearchError};
pub use feed_source::{FeedError, FeedKind, FeedSource, HttpFeedSource};
pub use query::{filter_and_sort, QueryEngine, SortColumn, SortKey};
