// Request and response models of a planning call

use crate::models::{Kilograms, RawOrder, Tour};
use serde::{Deserialize, Serialize};

/// Reason reported when no order survives normalization
pub const NO_ORDERS_REASON: &str = "no_orders_after_normalization";

/// Depot the tours start from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Depot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub street: String,
    #[serde(alias = "plz")]
    pub zip: String,
    #[serde(default, alias = "ort")]
    pub city: String,
}

impl Depot {
    pub fn new<S: Into<String>>(zip: S) -> Self {
        Self {
            zip: zip.into(),
            ..Self::default()
        }
    }
}

/// A planning request; depot and capacity fall back to the configuration when absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depot: Option<Depot>,

    #[serde(default, alias = "maxTourKg", skip_serializing_if = "Option::is_none")]
    pub max_weight_kg: Option<Kilograms>,

    #[serde(default)]
    pub orders: Vec<RawOrder>,
}

impl PlanRequest {
    pub fn new(orders: Vec<RawOrder>) -> Self {
        Self {
            orders,
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: Kilograms) -> Self {
        self.max_weight_kg = Some(capacity);
        self
    }

    pub fn with_depot(mut self, depot: Depot) -> Self {
        self.depot = Some(depot);
        self
    }
}

/// Summary block of a planning response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMeta {
    pub max_tour_kg: Kilograms,
    pub depot_zip: String,
    /// Provenance of the depot coordinate, `configured` for the fallback
    pub depot_source: String,
    pub orders_input: usize,
    pub tours_planned: usize,
    pub slot_groups: usize,
    pub strategy: String,
    pub orders_with_geo: usize,
    pub orders_missing_geo: usize,
    pub auto_planned_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Response of a planning call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub depot: Depot,
    pub tours: Vec<Tour>,
    pub meta: PlanMeta,
}
