// Great-circle distance and circular statistics on bearings

use crate::models::{Degrees, Kilometers};
use geo::{HaversineBearing, HaversineDistance, Point};

/// Great-circle distance between two points in kilometres
pub fn haversine_km(from: &Point<f64>, to: &Point<f64>) -> Kilometers {
    from.haversine_distance(to) / 1000.0
}

/// Initial great-circle bearing from `from` to `to`, in [0, 360)
pub fn initial_bearing(from: &Point<f64>, to: &Point<f64>) -> Degrees {
    normalize_degrees(from.haversine_bearing(*to))
}

/// Wraps any finite angle into [0, 360)
pub fn normalize_degrees(angle: Degrees) -> Degrees {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid may round up to the modulus itself for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Circular mean of a set of bearings, in [0, 360). Empty input yields 0.
pub fn circular_mean<I>(bearings: I) -> Degrees
where
    I: IntoIterator<Item = Degrees>,
{
    let (sin_sum, cos_sum, count) = bearings.into_iter().fold(
        (0.0_f64, 0.0_f64, 0_usize),
        |(sin_sum, cos_sum, count), bearing| {
            let radians = bearing.to_radians();
            (sin_sum + radians.sin(), cos_sum + radians.cos(), count + 1)
        },
    );

    if count == 0 {
        return 0.0;
    }

    normalize_degrees(sin_sum.atan2(cos_sum).to_degrees())
}

/// 360° minus the largest gap between consecutive bearings, wraparound included
pub fn angular_spread(bearings: &[Degrees]) -> Degrees {
    if bearings.is_empty() {
        return 0.0;
    }

    let mut sorted = bearings.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let largest_inner_gap = sorted
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold(0.0_f64, f64::max);
    let wrap_gap = sorted[0] + 360.0 - sorted[sorted.len() - 1];

    360.0 - largest_inner_gap.max(wrap_gap)
}

/// Smallest angle between two bearings, in [0, 180]
pub fn angular_difference(a: Degrees, b: Degrees) -> Degrees {
    let diff = normalize_degrees(a - b);
    diff.min(360.0 - diff)
}
