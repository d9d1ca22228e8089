// Unified facility model: live occupancy from the lots feed joined with district metadata

use crate::xml_feed::XmlLot;

// Maintenance flag value for a facility that is open
pub const AVAILABLE_FLAG: &str = "0";

// District names for one facility, as published by the meta feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct District {
    pub local: String,
    pub alt1: String,
    pub alt2: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacilityRecord {
    pub id: String,
    pub name_local: String,
    pub name_alt1: String,
    pub name_alt2: String,
    // Counts stay as published; the feed uses placeholders for "unknown"
    pub car_spaces: String,
    pub motorbike_spaces: String,
    pub in_maintenance: String,
    pub last_updated: String,
    pub district_local: String,
    pub district_alt1: String,
    pub district_alt2: String,
}

impl FacilityRecord {
    /// Builds the unified record for one lots entry. A facility with no meta
    /// entry gets empty district names.
    pub fn join(lot: XmlLot, district: Option<&District>) -> Self {
        let district = district.cloned().unwrap_or_default();

        FacilityRecord {
            id: lot.id,
            name_local: lot.name,
            name_alt1: lot.name_en,
            name_alt2: lot.name_pt,
            car_spaces: lot.car_count,
            motorbike_spaces: lot.motorbike_count,
            in_maintenance: lot.maintenance,
            last_updated: lot.time,
            district_local: district.local,
            district_alt1: district.alt1,
            district_alt2: district.alt2,
        }
    }

    pub fn is_available(&self) -> bool {
        self.in_maintenance == AVAILABLE_FLAG
    }

    pub fn car_count(&self) -> Option<i64> {
        parse_space_count(&self.car_spaces)
    }

    pub fn motorbike_count(&self) -> Option<i64> {
        parse_space_count(&self.motorbike_spaces)
    }
}

/// Reads a space count the way the feed's consumers always have: leading
/// whitespace and an optional sign are accepted, then as many decimal digits
/// as follow. Anything after the digits is ignored ("12 spaces" is 12).
/// Returns `None` when no digit is present, which marks the count as unknown.
pub fn parse_space_count(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Saturate instead of failing on absurdly long digit runs
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}
