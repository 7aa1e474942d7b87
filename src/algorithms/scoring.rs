//! Tour formatting and scoring.

use geo::Point;

use crate::config::ScoringSettings;
use crate::models::{Degrees, Kilograms, Kilometers, PlannedOrder, Slot, Tour, TourMeta};
use crate::utils::distance::{angular_spread, haversine_km, normalize_degrees};

use super::sweep::{mean_bearing, total_weight};

/// Eight 45° compass sectors, north centred on 0°
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    const SECTORS: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Sector containing the bearing; each sector is half-open `[start, start + 45)`
    pub fn from_bearing(bearing: Degrees) -> Self {
        let shifted = normalize_degrees(bearing + 22.5);
        let sector = ((shifted / 45.0) as usize).min(7);
        Self::SECTORS[sector]
    }

    /// German display label used in tour names
    pub fn label(&self) -> &'static str {
        match self {
            Direction::North => "Nord",
            Direction::NorthEast => "Nordost",
            Direction::East => "Ost",
            Direction::SouthEast => "Südost",
            Direction::South => "Süd",
            Direction::SouthWest => "Südwest",
            Direction::West => "West",
            Direction::NorthWest => "Nordwest",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
        }
    }
}

/// Depot to first stop, then stop to stop, in visiting order
pub fn estimate_distance(depot: &Point<f64>, orders: &[PlannedOrder]) -> Kilometers {
    let Some(first) = orders.first() else {
        return 0.0;
    };

    let lead = haversine_km(depot, &first.coordinate.point());
    let chain: Kilometers = orders
        .windows(2)
        .map(|pair| haversine_km(&pair[0].coordinate.point(), &pair[1].coordinate.point()))
        .sum();

    lead + chain
}

/// Weighted blend of load ratio, stop ratio and compactness, rounded into [0, 100]
pub fn score(
    settings: &ScoringSettings,
    weight: Kilograms,
    capacity: Kilograms,
    stops: usize,
    angle_span: Degrees,
) -> u8 {
    let load = (weight / capacity).clamp(0.0, 1.0);
    let stop_ratio = (stops as f64 / f64::from(settings.stop_norm)).min(1.0);
    let compactness = 1.0 - (angle_span / settings.span_norm_deg).clamp(0.0, 1.0);

    let weighted = load * settings.load_weight
        + stop_ratio * settings.stop_weight
        + compactness * settings.compactness_weight;

    (weighted * 100.0).round().clamp(0.0, 100.0) as u8
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Turns finished order groups into output tour records
#[derive(Debug, Clone)]
pub struct TourFormatter<'a> {
    pub depot: Point<f64>,
    pub capacity: Kilograms,
    pub scoring: ScoringSettings,
    pub strategy: &'a str,
    pub line_prefix: &'a str,
}

impl TourFormatter<'_> {
    /// Formats one tour. `tour_number` runs across all slots, `line_index`
    /// counts within the slot; both start at 1.
    pub fn format(
        &self,
        orders: Vec<PlannedOrder>,
        slot: &Slot,
        tour_number: usize,
        line_index: usize,
    ) -> Tour {
        let total = total_weight(&orders);
        let direction = Direction::from_bearing(mean_bearing(&orders)).label();
        let bearings: Vec<Degrees> = orders.iter().map(|order| order.bearing).collect();
        let angle_span = angular_spread(&bearings);
        let distance = estimate_distance(&self.depot, &orders).round() as u32;
        let score = score(&self.scoring, total, self.capacity, orders.len(), angle_span);

        let name = if slot.is_flex() {
            format!("{} {}", self.line_prefix, direction)
        } else {
            format!("{} {} · {}", self.line_prefix, direction, slot.label)
        };

        let orders: Vec<_> = orders.into_iter().map(PlannedOrder::into_order).collect();
        let zips = orders.iter().map(|order| order.zip.clone()).collect();

        Tour {
            id: format!("{}-{}", slot.key, tour_number),
            name,
            region: direction.to_string(),
            line_index,
            delivery_window: slot.label.clone(),
            weight: round_to(total, 2),
            stops: orders.len(),
            distance,
            score,
            zips,
            orders,
            meta: TourMeta {
                slot: slot.key.clone(),
                slot_label: slot.label.clone(),
                slot_priority: slot.priority,
                load_factor: round_to(total / self.capacity, 3),
                direction: direction.to_string(),
                angle_span,
                estimated_distance: distance,
                strategy: self.strategy.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{classify_slot, Coordinate, GeoSource, Order};

    fn planned(id: &str, weight: Kilograms, lat: f64, lon: f64, bearing: Degrees) -> PlannedOrder {
        PlannedOrder {
            order: Order {
                id: id.to_string(),
                customer_name: id.to_string(),
                customer_number: String::new(),
                zip: format!("33{}", id),
                city: String::new(),
                delivery_date: String::new(),
                weight,
            },
            node: 0,
            coordinate: Coordinate::new(lat, lon, GeoSource::Exact),
            bearing,
            distance_from_depot: 0.0,
            slot: Slot::flex(),
        }
    }

    #[test]
    fn test_direction_sectors() {
        assert_eq!(Direction::from_bearing(0.0), Direction::North);
        assert_eq!(Direction::from_bearing(359.9), Direction::North);
        assert_eq!(Direction::from_bearing(337.5), Direction::North);
        assert_eq!(Direction::from_bearing(22.4), Direction::North);
        assert_eq!(Direction::from_bearing(22.5), Direction::NorthEast);
        assert_eq!(Direction::from_bearing(90.0), Direction::East);
        assert_eq!(Direction::from_bearing(180.0), Direction::South);
        assert_eq!(Direction::from_bearing(250.0), Direction::West);
        assert_eq!(Direction::from_bearing(337.4), Direction::NorthWest);
        assert_eq!(Direction::SouthWest.label(), "Südwest");
        assert_eq!(Direction::SouthWest.abbreviation(), "SW");
    }

    #[test]
    fn test_score_blend() {
        let settings = ScoringSettings::default();

        // full load, 8 stops, zero spread
        assert_eq!(score(&settings, 1200.0, 1200.0, 8, 0.0), 100);
        // empty-ish tour spanning the whole compass
        assert_eq!(score(&settings, 0.0, 1200.0, 0, 360.0), 0);
        // 50% load, 4 stops, 70° spread: 27.5 + 7.5 + 15
        assert_eq!(score(&settings, 600.0, 1200.0, 4, 70.0), 50);
        // overload is capped
        assert_eq!(score(&settings, 5000.0, 1200.0, 20, 0.0), 100);
    }

    #[test]
    fn test_estimate_distance_follows_visiting_order() {
        let depot = Point::new(8.0, 51.0);
        let orders = vec![
            planned("1", 10.0, 52.0, 8.0, 0.0),
            planned("2", 10.0, 53.0, 8.0, 0.0),
        ];

        let distance = estimate_distance(&depot, &orders);

        assert!((distance - 2.0 * 111.195).abs() < 0.1);
        assert_eq!(estimate_distance(&depot, &[]), 0.0);
    }

    #[test]
    fn test_format_dated_tour() {
        let formatter = TourFormatter {
            depot: Point::new(8.0, 51.0),
            capacity: 1000.0,
            scoring: ScoringSettings::default(),
            strategy: "navio_ai_geo_sweep",
            line_prefix: "Navio Linie",
        };
        let slot = classify_slot("05.03.2024");
        let orders = vec![
            planned("101", 250.125, 51.5, 8.0, 0.0),
            planned("102", 250.0, 51.6, 8.01, 1.0),
        ];

        let tour = formatter.format(orders, &slot, 7, 2);

        assert_eq!(tour.id, "2024-03-05-7");
        assert_eq!(tour.name, "Navio Linie Nord · 5.3.2024");
        assert_eq!(tour.region, "Nord");
        assert_eq!(tour.line_index, 2);
        assert_eq!(tour.delivery_window, "5.3.2024");
        assert_eq!(tour.weight, 500.13);
        assert_eq!(tour.stops, 2);
        assert_eq!(tour.zips, vec!["33101", "33102"]);
        assert_eq!(tour.meta.load_factor, 0.5);
        assert_eq!(tour.meta.slot_priority, slot.priority);
        assert_eq!(tour.meta.estimated_distance, tour.distance);
        assert!((tour.meta.angle_span - 1.0).abs() < 1e-9);
        assert_eq!(tour.orders[0].id, "101");
    }

    #[test]
    fn test_format_flex_tour_name() {
        let formatter = TourFormatter {
            depot: Point::new(8.0, 51.0),
            capacity: 1000.0,
            scoring: ScoringSettings::default(),
            strategy: "navio_ai_geo_sweep",
            line_prefix: "Navio Linie",
        };

        let tour = formatter.format(
            vec![planned("1", 100.0, 50.0, 8.0, 180.0)],
            &Slot::flex(),
            1,
            1,
        );

        assert_eq!(tour.id, "flex-1");
        assert_eq!(tour.name, "Navio Linie Süd");
        assert_eq!(tour.delivery_window, "Flexible Lieferung");
    }
}
