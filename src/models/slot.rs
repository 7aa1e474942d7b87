// Slot model grouping orders by delivery date

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Key of the slot that collects undated or unparseable orders
pub const FLEX_SLOT: &str = "flex";

/// Display label of the flex slot
pub const FLEX_LABEL: &str = "Flexible Lieferung";

/// Priority of the flex slot; sorts after every dated slot
pub const FLEX_PRIORITY: i64 = i64::MAX;

/// Delivery slot an order belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// `flex` or an ISO date `YYYY-MM-DD`
    pub key: String,

    /// Human readable label
    pub label: String,

    /// Ordering value: milliseconds since the Unix epoch, or `FLEX_PRIORITY`
    pub priority: i64,
}

impl Slot {
    /// The slot for orders without a usable delivery date
    pub fn flex() -> Self {
        Self {
            key: FLEX_SLOT.to_string(),
            label: FLEX_LABEL.to_string(),
            priority: FLEX_PRIORITY,
        }
    }

    /// The slot for a concrete delivery date
    pub fn for_date(date: NaiveDate) -> Self {
        let priority = date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp_millis())
            .unwrap_or(FLEX_PRIORITY);

        Self {
            key: date.format("%Y-%m-%d").to_string(),
            label: date.format("%-d.%-m.%Y").to_string(),
            priority,
        }
    }

    pub fn is_flex(&self) -> bool {
        self.key == FLEX_SLOT
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::flex()
    }
}

/// Maps a delivery-date string to its slot
pub fn classify_slot(value: &str) -> Slot {
    parse_delivery_date(value)
        .map(Slot::for_date)
        .unwrap_or_else(Slot::flex)
}

/// Parses `D.M.YY`/`DD.MM.YYYY` first, then a handful of generic calendar formats
pub fn parse_delivery_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    parse_german_date(trimmed).or_else(|| parse_generic_date(trimmed))
}

fn parse_german_date(value: &str) -> Option<NaiveDate> {
    let mut parts = value.split('.');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let is_numeric = |part: &str, min: usize, max: usize| {
        (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    };
    if !is_numeric(day, 1, 2) || !is_numeric(month, 1, 2) || !is_numeric(year, 2, 4) {
        return None;
    }

    let year: i32 = if year.len() == 2 {
        2000 + year.parse::<i32>().ok()?
    } else {
        year.parse().ok()?
    };

    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn parse_generic_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|timestamp| timestamp.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_german_date_padded_and_unpadded() {
        let padded = classify_slot("05.03.2024");
        let unpadded = classify_slot("5.3.24");

        assert_eq!(padded.key, "2024-03-05");
        assert_eq!(padded.label, "5.3.2024");
        assert_eq!(padded, unpadded);
    }

    #[test]
    fn test_generic_formats() {
        assert_eq!(classify_slot("2024-03-05").key, "2024-03-05");
        assert_eq!(classify_slot("2024/03/05").key, "2024-03-05");
        assert_eq!(classify_slot("2024-03-05T08:30:00Z").key, "2024-03-05");
        assert_eq!(classify_slot("2024-03-05T08:30:00").key, "2024-03-05");
    }

    #[test]
    fn test_invalid_dates_are_flex() {
        assert!(classify_slot("").is_flex());
        assert!(classify_slot("   ").is_flex());
        assert!(classify_slot("31.02.2024").is_flex());
        assert!(classify_slot("morgen").is_flex());
        assert!(classify_slot("1.2.3.4").is_flex());
    }

    #[test]
    fn test_flex_sorts_last() {
        let mut slots = vec![
            Slot::flex(),
            classify_slot("07.03.2024"),
            classify_slot("9999-12-31"),
            classify_slot("05.03.2024"),
        ];
        slots.sort_by_key(|slot| slot.priority);
        let keys: Vec<&str> = slots.iter().map(|slot| slot.key.as_str()).collect();

        assert_eq!(keys, vec!["2024-03-05", "2024-03-07", "9999-12-31", "flex"]);
    }

    #[test]
    fn test_priority_is_epoch_millis() {
        assert_eq!(classify_slot("1.1.1970").priority, 0);
        assert_eq!(classify_slot("2.1.1970").priority, 86_400_000);
    }
}
