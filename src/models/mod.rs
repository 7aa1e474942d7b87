// Models module - exports all model types

mod location;
mod order;
mod plan;
mod route;
mod slot;

// Re-export model types
pub use self::location::{Coordinate, GeoSource};
pub use self::order::{normalize_orders, Order, PlannedOrder, RawOrder, Scalar};
pub use self::plan::{Depot, PlanMeta, PlanRequest, PlanResponse, NO_ORDERS_REASON};
pub use self::route::{Tour, TourMeta};
pub use self::slot::{classify_slot, Slot, FLEX_LABEL, FLEX_PRIORITY, FLEX_SLOT};

// Common type aliases for improved code readability
pub type Kilograms = f64;
pub type Kilometers = f64;
pub type Degrees = f64;
