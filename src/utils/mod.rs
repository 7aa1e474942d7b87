pub mod distance;
pub mod geo_index;

pub use self::geo_index::{GeoIndex, ReferenceRecord};
