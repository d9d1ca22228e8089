// Feed cache: decides when to hit the network and stitches lots and meta together

use crate::cache_entry::{CacheStatsReport, TtlCache};
use crate::config::FeedConfig;
use crate::facility::{District, FacilityRecord};
use crate::feed_source::{FeedError, FeedKind, FeedSource};
use crate::xml_feed::{parse_lots, parse_meta, XmlLot};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

// The only error callers ever see; transport and parse details are logged, not returned
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("Unable to download data!")]
    DataUnavailable,
}

pub type Records = Arc<Vec<FacilityRecord>>;
pub type DistrictLookup = Arc<HashMap<String, District>>;

pub struct FeedCache<S: FeedSource> {
    source: S,
    lots: TtlCache<Records>,
    // Absent when the deployment only publishes the lots feed
    meta: Option<TtlCache<DistrictLookup>>,
}

impl<S: FeedSource> FeedCache<S> {
    pub fn new(config: &FeedConfig, source: S) -> Self {
        Self {
            source,
            lots: TtlCache::new(config.lots_ttl()),
            meta: config
                .has_meta_feed()
                .then(|| TtlCache::new(config.meta_ttl())),
        }
    }

    /// Current unified record set. Within the lots TTL this returns the cached
    /// list without any I/O. Otherwise the stale feeds are refetched and both
    /// caches are written only once the whole pipeline succeeded.
    pub async fn get_records(&self) -> Result<Records, SearchError> {
        let result = match &self.meta {
            Some(meta) => self.get_joined(meta).await,
            None => {
                self.lots
                    .get_or_fetch(|| async {
                        let lots = self.fetch_lots().await?;
                        Ok::<_, FeedError>(Arc::new(join_records(lots, &HashMap::new())))
                    })
                    .await
            }
        };

        result.map_err(|e| {
            warn!("Could not refresh car park data: {}", e);
            SearchError::DataUnavailable
        })
    }

    async fn get_joined(&self, meta: &TtlCache<DistrictLookup>) -> Result<Records, FeedError> {
        if let Some(records) = self.lots.fresh() {
            debug!("Serving {} facilities from cache", records.len());
            return Ok(records);
        }

        let meta_stage = async {
            if let Some(districts) = meta.fresh() {
                return Ok((districts, false));
            }
            let result = self.fetch_meta().await;
            meta.record_fetch(result.is_ok());
            result.map(|districts| (Arc::new(districts), true))
        };
        let lots_stage = async {
            let result = self.fetch_lots().await;
            self.lots.record_fetch(result.is_ok());
            result
        };

        let ((districts, meta_refreshed), lots) =
            futures::future::try_join(meta_stage, lots_stage).await?;
        let records = Arc::new(join_records(lots, &districts));

        if meta_refreshed {
            debug!("Fetched district metadata for {} facilities", districts.len());
            meta.commit(districts);
        }
        debug!("Fetched {} facilities", records.len());
        self.lots.commit(records.clone());

        Ok(records)
    }

    async fn fetch_lots(&self) -> Result<Vec<XmlLot>, FeedError> {
        let raw = self.source.fetch(FeedKind::Lots).await?;
        parse_lots(&raw)
    }

    async fn fetch_meta(&self) -> Result<HashMap<String, District>, FeedError> {
        let raw = self.source.fetch(FeedKind::Meta).await?;
        parse_meta(&raw)
    }

    pub fn lots_stats(&self) -> CacheStatsReport {
        self.lots.stats()
    }

    pub fn meta_stats(&self) -> Option<CacheStatsReport> {
        self.meta.as_ref().map(TtlCache::stats)
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }
}

fn join_records(lots: Vec<XmlLot>, districts: &HashMap<String, District>) -> Vec<FacilityRecord> {
    lots.into_iter()
        .map(|lot| {
            let district = districts.get(&lot.id);
            FacilityRecord::join(lot, district)
        })
        .collect()
}
