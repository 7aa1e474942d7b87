//! Postal-code geocoding with layered fallbacks.
//!
//! The index is built once from a reference dataset and answers lookups in
//! four tiers: the exact code, the centroid of its 3-digit prefix, the
//! centroid of its 2-digit prefix and finally a hand-authored regional
//! centroid for the leading digit. A missing or malformed dataset leaves only
//! the last tier active.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::GeoIndexError;
use crate::models::{Coordinate, GeoSource, Scalar};

/// Approximate regional centroid (lat, lon) per leading postal-code digit
const DIGIT_FALLBACK: [(f64, f64); 10] = [
    (51.2, 13.5),
    (52.5, 13.4),
    (53.5, 9.9),
    (51.0, 11.5),
    (52.1, 7.6),
    (50.9, 7.1),
    (50.2, 8.6),
    (48.8, 8.4),
    (48.0, 10.9),
    (49.6, 11.0),
];

/// Step between jitter positions of digit-fallback coordinates, in degrees
const FALLBACK_JITTER_STEP: f64 = 0.04;

/// One record of the reference dataset, tolerating both field spellings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plz: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<Scalar>,
}

impl ReferenceRecord {
    pub fn new<S: Into<String>>(zipcode: S, lat: f64, lon: f64) -> Self {
        Self {
            zipcode: Some(Scalar::Text(zipcode.into())),
            latitude: Some(Scalar::Number(lat)),
            longitude: Some(Scalar::Number(lon)),
            ..Self::default()
        }
    }

    /// Code and coordinate, or `None` when any of them is missing or unparseable
    fn parse(&self) -> Option<(String, f64, f64)> {
        let zipcode = [&self.zipcode, &self.plz]
            .into_iter()
            .flatten()
            .map(Scalar::to_text)
            .find(|code| !code.is_empty())?;
        let lat = [&self.latitude, &self.lat]
            .into_iter()
            .flatten()
            .find_map(Scalar::as_f64)?;
        let lon = [&self.longitude, &self.lng]
            .into_iter()
            .flatten()
            .find_map(Scalar::as_f64)?;

        Some((zipcode, lat, lon))
    }
}

/// Running latitude/longitude sums of one prefix
#[derive(Debug, Default)]
struct CentroidAccumulator {
    lat_sum: f64,
    lon_sum: f64,
    count: usize,
}

impl CentroidAccumulator {
    fn add(&mut self, lat: f64, lon: f64) {
        self.lat_sum += lat;
        self.lon_sum += lon;
        self.count += 1;
    }

    fn finish(&self, source: GeoSource) -> Option<Coordinate> {
        (self.count > 0).then(|| {
            Coordinate::new(
                self.lat_sum / self.count as f64,
                self.lon_sum / self.count as f64,
                source,
            )
        })
    }
}

/// Read-only postal-code index; build once and share between planning calls
#[derive(Debug, Clone, Default)]
pub struct GeoIndex {
    exact: HashMap<String, Coordinate>,
    prefix3: HashMap<String, Coordinate>,
    prefix2: HashMap<String, Coordinate>,
}

impl GeoIndex {
    /// An index without reference data; only the digit fallback answers
    pub fn fallback_only() -> Self {
        Self::default()
    }

    /// Builds all tiers from reference records. Unusable records are skipped.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ReferenceRecord>,
    {
        let mut exact = HashMap::new();
        let mut prefix3_stats: HashMap<String, CentroidAccumulator> = HashMap::new();
        let mut prefix2_stats: HashMap<String, CentroidAccumulator> = HashMap::new();

        for (zipcode, lat, lon) in records.into_iter().filter_map(|record| record.parse()) {
            if let Some(prefix) = full_prefix(&zipcode, 3) {
                prefix3_stats.entry(prefix.to_string()).or_default().add(lat, lon);
            }
            if let Some(prefix) = full_prefix(&zipcode, 2) {
                prefix2_stats.entry(prefix.to_string()).or_default().add(lat, lon);
            }
            // first record for a code wins
            exact
                .entry(zipcode)
                .or_insert_with(|| Coordinate::new(lat, lon, GeoSource::Exact));
        }

        Self {
            exact,
            prefix3: finish_centroids(prefix3_stats, GeoSource::Prefix3),
            prefix2: finish_centroids(prefix2_stats, GeoSource::Prefix2),
        }
    }

    /// Parses a JSON array of reference records
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<ReferenceRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Loads the dataset at `path`, failing on I/O or format errors
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, GeoIndexError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| GeoIndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json_str(&json).map_err(|source| GeoIndexError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the dataset at `path`; on failure logs a warning and falls back
    /// to the digit tier only
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_path(path.as_ref()) {
            Ok(index) => {
                info!(
                    dataset = %path.as_ref().display(),
                    exact = index.exact.len(),
                    prefix3 = index.prefix3.len(),
                    prefix2 = index.prefix2.len(),
                    "postal-code index built"
                );
                index
            }
            Err(err) => {
                warn!(error = %err, "postal-code dataset unavailable, using digit fallbacks only");
                Self::fallback_only()
            }
        }
    }

    /// Resolves a postal code: exact, 3-digit centroid, 2-digit centroid, digit fallback
    pub fn resolve(&self, zip: &str) -> Option<Coordinate> {
        let normalized = zip.trim();
        if normalized.is_empty() {
            return None;
        }

        self.exact
            .get(normalized)
            .or_else(|| self.prefix3.get(prefix(normalized, 3)))
            .or_else(|| self.prefix2.get(prefix(normalized, 2)))
            .copied()
            .or_else(|| digit_fallback(normalized))
    }

    /// Number of distinct exact codes
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    /// True when no reference data was loaded
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

/// Regional centroid for the leading digit, spread by the remaining digits so
/// that codes sharing a leading digit do not collapse onto one point
pub fn digit_fallback(zip: &str) -> Option<Coordinate> {
    let mut chars = zip.chars();
    let digit = chars.next()?.to_digit(10)?;
    let (base_lat, base_lon) = DIGIT_FALLBACK[digit as usize];

    let tail = leading_number(chars.as_str());
    let lat_offset = ((tail % 7) as f64 - 3.0) * FALLBACK_JITTER_STEP;
    let lon_offset = (((tail / 7) % 7) as f64 - 3.0) * FALLBACK_JITTER_STEP;

    Some(Coordinate::new(
        base_lat + lat_offset,
        base_lon + lon_offset,
        GeoSource::DigitFallback,
    ))
}

/// Integer value of the leading ASCII digit run, 0 when there is none
fn leading_number(text: &str) -> u64 {
    text.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_u64, |acc, b| {
            acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
        })
}

/// First `len` characters, or the whole string when shorter
fn prefix(text: &str, len: usize) -> &str {
    text.char_indices()
        .nth(len)
        .map(|(end, _)| &text[..end])
        .unwrap_or(text)
}

/// First `len` characters, only when the string has at least that many
fn full_prefix(text: &str, len: usize) -> Option<&str> {
    (text.chars().count() >= len).then(|| prefix(text, len))
}

fn finish_centroids(
    stats: HashMap<String, CentroidAccumulator>,
    source: GeoSource,
) -> HashMap<String, Coordinate> {
    stats
        .into_iter()
        .filter_map(|(key, acc)| acc.finish(source).map(|coordinate| (key, coordinate)))
        .collect()
}
