//! Request-level planning pipeline.
//!
//! normalize → geocode → classify slot → group by slot → build tours per
//! slot → format and score → summarize. The pipeline is synchronous and keeps
//! no state between calls; the `GeoIndex` it reads is shared and immutable.

use chrono::{DateTime, SecondsFormat, Utc};
use geo::Point;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::algorithms::scoring::TourFormatter;
use crate::algorithms::sweep::SweepPlanner;
use crate::algorithms::TourBuilder;
use crate::config::PlannerConfig;
use crate::error::{PlanError, PlanResult};
use crate::models::{
    classify_slot, normalize_orders, Depot, Kilograms, Order, PlanMeta, PlanRequest,
    PlanResponse, PlannedOrder, Slot, NO_ORDERS_REASON,
};
use crate::utils::distance::{haversine_km, initial_bearing};
use crate::utils::GeoIndex;

/// Provenance reported when the configured depot coordinate is used
pub const CONFIGURED_DEPOT_SOURCE: &str = "configured";

/// Orders of one slot, in first-encounter order
#[derive(Debug, Clone)]
pub struct SlotGroup {
    pub slot: Slot,
    pub orders: Vec<PlannedOrder>,
}

/// Result of geocoding the normalized orders of one request
#[derive(Debug, Clone, Default)]
pub struct Geocoded {
    pub planned: Vec<PlannedOrder>,
    pub missing: Vec<Order>,
}

/// Plans tours for requests against a shared postal-code index
pub struct Planner<'a, B = SweepPlanner> {
    index: &'a GeoIndex,
    config: &'a PlannerConfig,
    builder: B,
}

impl<'a> Planner<'a, SweepPlanner> {
    /// Planner using the sweep builder tuned by the configuration
    pub fn new(index: &'a GeoIndex, config: &'a PlannerConfig) -> Self {
        Self::with_builder(index, config, SweepPlanner::new(config.planner.balance))
    }
}

impl<'a, B: TourBuilder + Sync> Planner<'a, B> {
    pub fn with_builder(index: &'a GeoIndex, config: &'a PlannerConfig, builder: B) -> Self {
        Self {
            index,
            config,
            builder,
        }
    }

    /// Plans one request, stamped with the current time
    pub fn plan(&self, request: &PlanRequest) -> PlanResult<PlanResponse> {
        self.plan_at(request, Utc::now())
    }

    /// Plans independent requests in parallel
    pub fn plan_batch(&self, requests: &[PlanRequest]) -> Vec<PlanResult<PlanResponse>> {
        requests.par_iter().map(|request| self.plan(request)).collect()
    }

    /// Plans one request with an explicit planning timestamp
    pub fn plan_at(
        &self,
        request: &PlanRequest,
        planned_at: DateTime<Utc>,
    ) -> PlanResult<PlanResponse> {
        let capacity = self.capacity_for(request)?;
        let depot = self.depot_for(request);
        let orders = normalize_orders(&request.orders);
        let strategy = self.config.planner.strategy.clone();
        let auto_planned_at = planned_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let (depot_point, depot_source) = self.locate_depot(&depot);

        if orders.is_empty() {
            info!(raw_orders = request.orders.len(), "no orders left after normalization");
            return Ok(PlanResponse {
                meta: PlanMeta {
                    max_tour_kg: capacity,
                    depot_zip: depot.zip.clone(),
                    depot_source,
                    orders_input: 0,
                    tours_planned: 0,
                    slot_groups: 0,
                    strategy,
                    orders_with_geo: 0,
                    orders_missing_geo: 0,
                    auto_planned_at,
                    reason: Some(NO_ORDERS_REASON.to_string()),
                },
                depot,
                tours: Vec::new(),
            });
        }

        let orders_input = orders.len();
        let geocoded = geocode_orders(self.index, &depot_point, orders);
        let orders_with_geo = geocoded.planned.len();
        let orders_missing_geo = geocoded.missing.len();
        let groups = group_by_slot(geocoded.planned);

        let formatter = TourFormatter {
            depot: depot_point,
            capacity,
            scoring: self.config.planner.scoring,
            strategy: &strategy,
            line_prefix: &self.config.planner.line_prefix,
        };

        let slot_groups = groups.len();
        let mut tours = Vec::new();
        for group in groups {
            let built = self.builder.build_tours(group.orders, capacity);
            debug!(slot = %group.slot.key, tours = built.len(), "slot group planned");

            for (sequence, tour_orders) in built.into_iter().enumerate() {
                let tour_number = tours.len() + 1;
                tours.push(formatter.format(tour_orders, &group.slot, tour_number, sequence + 1));
            }
        }

        info!(
            orders_input,
            orders_with_geo,
            orders_missing_geo,
            slot_groups,
            tours = tours.len(),
            "planning finished"
        );

        Ok(PlanResponse {
            meta: PlanMeta {
                max_tour_kg: capacity,
                depot_zip: depot.zip.clone(),
                depot_source,
                orders_input,
                tours_planned: tours.len(),
                slot_groups,
                strategy,
                orders_with_geo,
                orders_missing_geo,
                auto_planned_at,
                reason: None,
            },
            depot,
            tours,
        })
    }

    fn capacity_for(&self, request: &PlanRequest) -> PlanResult<Kilograms> {
        let capacity = request
            .max_weight_kg
            .unwrap_or(self.config.planner.capacity_kg);
        if capacity.is_finite() && capacity > 0.0 {
            Ok(capacity)
        } else {
            Err(PlanError::InvalidCapacity(capacity))
        }
    }

    fn depot_for(&self, request: &PlanRequest) -> Depot {
        request
            .depot
            .as_ref()
            .filter(|depot| !depot.zip.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| self.config.depot.to_depot())
    }

    fn locate_depot(&self, depot: &Depot) -> (Point<f64>, String) {
        match self.index.resolve(&depot.zip) {
            Some(coordinate) => (coordinate.point(), coordinate.source.to_string()),
            None => {
                warn!(zip = %depot.zip, "depot postal code not resolvable, using configured coordinate");
                let settings = &self.config.depot;
                (
                    Point::new(settings.fallback_lon, settings.fallback_lat),
                    CONFIGURED_DEPOT_SOURCE.to_string(),
                )
            }
        }
    }
}

/// Resolves coordinates and slots; orders without a coordinate are set aside
pub fn geocode_orders(index: &GeoIndex, depot: &Point<f64>, orders: Vec<Order>) -> Geocoded {
    let resolved: Vec<Result<PlannedOrder, Order>> = orders
        .into_par_iter()
        .enumerate()
        .map(|(node, order)| match index.resolve(&order.zip) {
            Some(coordinate) => {
                let point = coordinate.point();
                Ok(PlannedOrder {
                    node,
                    coordinate,
                    bearing: initial_bearing(depot, &point),
                    distance_from_depot: haversine_km(depot, &point),
                    slot: classify_slot(&order.delivery_date),
                    order,
                })
            }
            None => Err(order),
        })
        .collect();

    let mut geocoded = Geocoded::default();
    for entry in resolved {
        match entry {
            Ok(planned) => geocoded.planned.push(planned),
            Err(order) => {
                debug!(order = %order.id, zip = %order.zip, "no coordinate for order");
                geocoded.missing.push(order);
            }
        }
    }

    geocoded
}

/// Groups orders by slot key, keeping the order in which keys first appear
pub fn group_by_slot(orders: Vec<PlannedOrder>) -> Vec<SlotGroup> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<SlotGroup> = Vec::new();

    for order in orders {
        let position = *positions.entry(order.slot.key.clone()).or_insert_with(|| {
            groups.push(SlotGroup {
                slot: order.slot.clone(),
                orders: Vec::new(),
            });
            groups.len() - 1
        });
        groups[position].orders.push(order);
    }

    groups
}

/// Plans one request with the default sweep builder
pub fn plan(
    request: &PlanRequest,
    index: &GeoIndex,
    config: &PlannerConfig,
) -> PlanResult<PlanResponse> {
    Planner::new(index, config).plan(request)
}
