// Search over the unified record set: maintenance/term filter plus a stable sort

use crate::facility::FacilityRecord;
use crate::feed_cache::{FeedCache, SearchError};
use crate::feed_source::FeedSource;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Car,
    Motorbike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    NameAsc,
    NameDesc,
    CarAsc,
    CarDesc,
    MotorbikeAsc,
    MotorbikeDesc,
}

impl SortKey {
    // Unknown or missing keys fall back to name_asc
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("name_asc") => SortKey::NameAsc,
            Some("name_desc") => SortKey::NameDesc,
            Some("car_asc") => SortKey::CarAsc,
            Some("car_desc") => SortKey::CarDesc,
            Some("mb_asc") => SortKey::MotorbikeAsc,
            Some("mb_desc") => SortKey::MotorbikeDesc,
            _ => SortKey::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::NameAsc => "name_asc",
            SortKey::NameDesc => "name_desc",
            SortKey::CarAsc => "car_asc",
            SortKey::CarDesc => "car_desc",
            SortKey::MotorbikeAsc => "mb_asc",
            SortKey::MotorbikeDesc => "mb_desc",
        }
    }

    pub fn column(&self) -> SortColumn {
        match self {
            SortKey::NameAsc | SortKey::NameDesc => SortColumn::Name,
            SortKey::CarAsc | SortKey::CarDesc => SortColumn::Car,
            SortKey::MotorbikeAsc | SortKey::MotorbikeDesc => SortColumn::Motorbike,
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(
            self,
            SortKey::NameDesc | SortKey::CarDesc | SortKey::MotorbikeDesc
        )
    }

    fn with(column: SortColumn, descending: bool) -> Self {
        match (column, descending) {
            (SortColumn::Name, false) => SortKey::NameAsc,
            (SortColumn::Name, true) => SortKey::NameDesc,
            (SortColumn::Car, false) => SortKey::CarAsc,
            (SortColumn::Car, true) => SortKey::CarDesc,
            (SortColumn::Motorbike, false) => SortKey::MotorbikeAsc,
            (SortColumn::Motorbike, true) => SortKey::MotorbikeDesc,
        }
    }

    /// Key after the user clicks a column header: the current column flips
    /// its direction, any other column starts out descending.
    pub fn toggled(self, column: SortColumn) -> Self {
        if self.column() == column {
            SortKey::with(column, !self.is_descending())
        } else {
            SortKey::with(column, true)
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total order used for result lists.
///
/// Names compare by code point. Space counts compare numerically; a count
/// that cannot be read sorts before every readable one when ascending (and
/// so after them when descending). Two unreadable counts, or two equal ones,
/// compare equal, which keeps feed order for them.
pub fn compare(sort_key: SortKey, a: &FacilityRecord, b: &FacilityRecord) -> Ordering {
    let ascending = match sort_key.column() {
        SortColumn::Name => a.name_local.cmp(&b.name_local),
        SortColumn::Car => a.car_count().cmp(&b.car_count()),
        SortColumn::Motorbike => a.motorbike_count().cmp(&b.motorbike_count()),
    };

    if sort_key.is_descending() {
        ascending.reverse()
    } else {
        ascending
    }
}

// Open facilities whose name or district contains the already-trimmed term
pub fn matches(record: &FacilityRecord, term: &str) -> bool {
    if !record.is_available() {
        return false;
    }

    term.is_empty() || record.name_local.contains(term) || record.district_local.contains(term)
}

pub fn filter_and_sort(
    records: &[FacilityRecord],
    term: &str,
    sort_key: SortKey,
) -> Vec<FacilityRecord> {
    let term = term.trim();

    let mut results: Vec<FacilityRecord> = records
        .iter()
        .filter(|record| matches(record, term))
        .cloned()
        .collect();

    // sort_by is stable
    results.sort_by(|a, b| compare(sort_key, a, b));
    results
}

pub struct QueryEngine<S: FeedSource> {
    feeds: Arc<FeedCache<S>>,
}

impl<S: FeedSource> QueryEngine<S> {
    pub fn new(feeds: Arc<FeedCache<S>>) -> Self {
        Self { feeds }
    }

    pub async fn search(
        &self,
        term: &str,
        sort_param: Option<&str>,
    ) -> Result<Vec<FacilityRecord>, SearchError> {
        let sort_key = SortKey::from_param(sort_param);
        let records = self.feeds.get_records().await?;

        let results = filter_and_sort(&records, term, sort_key);
        debug!(
            "Search {:?} sorted by {} matched {} of {} facilities",
            term.trim(),
            sort_key,
            results.len(),
            records.len()
        );
        Ok(results)
    }

    pub fn feeds(&self) -> &FeedCache<S> {
        &self.feeds
    }
}
