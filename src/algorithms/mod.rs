pub mod scoring;
pub mod sweep;

// Common algorithm traits
use crate::models::{Kilograms, PlannedOrder};

/// Trait for strategies that split the orders of one delivery slot into tours
pub trait TourBuilder {
    /// Partition the orders into capacity-bounded tours.
    ///
    /// Every input order must land in exactly one returned tour, no returned
    /// tour may be empty, and each tour is returned in visiting order.
    fn build_tours(&self, orders: Vec<PlannedOrder>, capacity: Kilograms) -> Vec<Vec<PlannedOrder>>;
}
