// Public modules
pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod planner;
pub mod utils;

// Re-exports for convenience
pub use algorithms::sweep::SweepPlanner;
pub use algorithms::TourBuilder;
pub use config::PlannerConfig;
pub use error::{ConfigError, GeoIndexError, PlanError};
pub use models::{Coordinate, GeoSource, Order, PlanRequest, PlanResponse, RawOrder, Slot, Tour};
pub use planner::{plan, Planner};
pub use utils::GeoIndex;
