// Route models for representing planned delivery tours

use crate::models::{Degrees, Kilograms, Order};
use serde::{Deserialize, Serialize};

/// Represents a finished tour as returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    /// `<slot key>-<running number>`
    pub id: String,

    pub name: String,

    /// Compass direction label of the tour's mean bearing
    pub region: String,

    /// 1-based position of the tour within its slot group
    pub line_index: usize,

    /// Slot label the tour is delivered in
    pub delivery_window: String,

    /// Member orders in visiting order, public fields only
    pub orders: Vec<Order>,

    pub weight: Kilograms,

    pub stops: usize,

    /// Estimated straight-line chain distance in whole kilometres
    pub distance: u32,

    /// Blend of load, stop count and compactness in [0, 100]
    pub score: u8,

    pub zips: Vec<String>,

    pub meta: TourMeta,
}

/// Auxiliary tour metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourMeta {
    pub slot: String,
    pub slot_label: String,
    pub slot_priority: i64,
    pub load_factor: f64,
    pub direction: String,
    pub angle_span: Degrees,
    pub estimated_distance: u32,
    pub strategy: String,
}

impl Tour {
    /// Sum of member weights, computed from the orders rather than the rounded field
    pub fn total_weight(&self) -> Kilograms {
        self.orders.iter().map(|order| order.weight).sum()
    }

    /// Checks that the tour stays within the given payload
    pub fn fits(&self, capacity: Kilograms) -> bool {
        self.total_weight() <= capacity
    }
}
