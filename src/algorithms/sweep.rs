//! Angular sweep planner.
//!
//! Orders of one slot are sorted by their bearing from the depot and packed
//! greedily into tours up to the payload limit. When the next order in sweep
//! order does not fit, the first later order that does is pulled forward
//! before the tour is closed. A second pass then walks adjacent tours, lends
//! one order from each tour to its predecessor when there is room, and folds
//! small trailing tours into a neighbour heading roughly the same way.

use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::algorithms::TourBuilder;
use crate::config::BalanceSettings;
use crate::models::{Degrees, Kilograms, PlannedOrder};
use crate::utils::distance::{angular_difference, circular_mean};

/// Sweep-pack-balance tour builder
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepPlanner {
    balance: BalanceSettings,
}

impl SweepPlanner {
    pub fn new(balance: BalanceSettings) -> Self {
        Self { balance }
    }

    /// Greedy capacity packing of the orders in ascending bearing order
    pub fn pack(&self, orders: Vec<PlannedOrder>, capacity: Kilograms) -> Vec<Vec<PlannedOrder>> {
        let mut sorted = orders;
        sort_by_bearing(&mut sorted);

        let mut queue: VecDeque<PlannedOrder> = sorted.into();
        let mut tours = Vec::new();
        while !queue.is_empty() {
            tours.push(pick_tour(&mut queue, capacity));
        }

        tours
    }

    /// Moves and merges orders between adjacent tours, in construction order
    pub fn balance(
        &self,
        mut tours: Vec<Vec<PlannedOrder>>,
        capacity: Kilograms,
    ) -> Vec<Vec<PlannedOrder>> {
        let mut i = 0;
        while i + 1 < tours.len() {
            let (head, tail) = tours.split_at_mut(i + 1);
            let current = &mut head[i];
            let next = &mut tail[0];

            let spare = capacity - total_weight(current);
            if spare > 0.0 && next.len() > 1 {
                if let Some(pos) = next.iter().position(|order| order.weight() <= spare) {
                    let moved = next.remove(pos);
                    current.push(moved);
                    sort_by_bearing(current);
                }
            }

            if self.should_absorb(current, next, capacity) {
                let absorbed = tours.remove(i + 1);
                debug!(
                    position = i,
                    orders = absorbed.len(),
                    "absorbing small tour into its predecessor"
                );
                let current = &mut tours[i];
                current.extend(absorbed);
                sort_by_bearing(current);
                // the merged tour is compared with its new neighbour next
                continue;
            }

            i += 1;
        }

        tours.retain(|tour| !tour.is_empty());
        tours
    }

    fn should_absorb(
        &self,
        current: &[PlannedOrder],
        next: &[PlannedOrder],
        capacity: Kilograms,
    ) -> bool {
        let current_weight = total_weight(current);
        let next_weight = total_weight(next);

        next_weight > 0.0
            && next_weight < capacity * self.balance.absorb_ratio
            && current_weight + next_weight <= capacity
            && angular_difference(mean_bearing(current), mean_bearing(next))
                <= self.balance.merge_angle_deg
    }
}

impl TourBuilder for SweepPlanner {
    fn build_tours(&self, orders: Vec<PlannedOrder>, capacity: Kilograms) -> Vec<Vec<PlannedOrder>> {
        if orders.is_empty() {
            return Vec::new();
        }

        let packed = self.pack(orders, capacity);
        self.balance(packed, capacity)
    }
}

/// Fills one tour from the front of the queue
fn pick_tour(queue: &mut VecDeque<PlannedOrder>, capacity: Kilograms) -> Vec<PlannedOrder> {
    let mut tour = Vec::new();
    let mut weight = 0.0;

    while let Some(head) = queue.front() {
        if weight + head.weight() <= capacity {
            if let Some(order) = queue.pop_front() {
                weight += order.weight();
                tour.push(order);
            }
            continue;
        }

        let remaining = capacity - weight;
        if remaining <= 0.0 {
            break;
        }

        // the head already failed this test, start behind it
        let substitute = queue
            .iter()
            .skip(1)
            .position(|order| order.weight() <= remaining)
            .map(|offset| offset + 1);
        match substitute.and_then(|pos| queue.remove(pos)) {
            Some(order) => {
                weight += order.weight();
                tour.push(order);
            }
            None => break,
        }
    }

    if tour.is_empty() {
        if let Some(order) = queue.pop_front() {
            warn!(
                order = %order.order.id,
                weight = order.weight(),
                capacity,
                "order exceeds tour capacity, planning it alone"
            );
            tour.push(order);
        }
    }

    sort_by_bearing(&mut tour);
    tour
}

/// Stable ascending sort by bearing
pub fn sort_by_bearing(orders: &mut [PlannedOrder]) {
    orders.sort_by(|a, b| a.bearing.total_cmp(&b.bearing));
}

pub fn total_weight(orders: &[PlannedOrder]) -> Kilograms {
    orders.iter().map(PlannedOrder::weight).sum()
}

/// Circular mean of the orders' bearings
pub fn mean_bearing(orders: &[PlannedOrder]) -> Degrees {
    circular_mean(orders.iter().map(|order| order.bearing))
}
