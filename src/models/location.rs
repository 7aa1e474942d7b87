// Location model representing resolved geographic coordinates

use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolution tier that produced a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeoSource {
    /// Postal code present verbatim in the reference dataset
    Exact,
    /// Mean of all dataset codes sharing the first three digits
    Prefix3,
    /// Mean of all dataset codes sharing the first two digits
    Prefix2,
    /// Hand-authored regional centroid for the leading digit
    DigitFallback,
}

impl GeoSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoSource::Exact => "exact",
            GeoSource::Prefix3 => "prefix3",
            GeoSource::Prefix2 => "prefix2",
            GeoSource::DigitFallback => "digit-fallback",
        }
    }
}

impl fmt::Display for GeoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a latitude/longitude pair together with its provenance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
    pub source: GeoSource,
}

impl Coordinate {
    /// Creates a new coordinate with the given provenance
    pub fn new(lat: f64, lon: f64, source: GeoSource) -> Self {
        Self { lat, lon, source }
    }

    /// Converts to a `geo` point (x = longitude, y = latitude)
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}
