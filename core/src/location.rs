//! Geographic point and the one distance computation the core needs
//! outside of the precomputed travel matrices (feature extraction for
//! the ML resolution oracle).

use serde::{Deserialize, Serialize};

/// An immutable geographic point. Never mutated after construction —
/// stations, apparatus depots, and incidents all carry one by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to another point, in meters.
    ///
    /// The only caller is the ML oracle's feature extractor (distance from
    /// a reference center); everything else in the simulation relies on
    /// the precomputed duration/distance matrices instead. Delegates to
    /// `geoutils`, the same crate the corpus reaches for elsewhere to
    /// compute a haversine distance between two `lat`/`lon` pairs.
    pub fn haversine_distance_meters(&self, other: &Location) -> f64 {
        let here = geoutils::Location::new(self.lat, self.lon);
        let there = geoutils::Location::new(other.lat, other.lon);
        here.haversine_distance_to(&there).meters()
    }

    /// Even-odd ray-casting point-in-polygon test. `polygon` is a closed or
    /// open ring of (lon, lat) vertices, matching GeoJSON's coordinate order.
    pub fn inside_polygon(&self, polygon: &[(f64, f64)]) -> bool {
        if polygon.len() < 3 {
            return false;
        }
        let (x, y) = (self.lon, self.lat);
        let mut inside = false;
        let n = polygon.len();
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = polygon[i];
            let (xj, yj) = polygon[j];
            let crosses = (yi > y) != (yj > y);
            if crosses {
                let x_intersect = xj + (y - yj) / (yi - yj) * (xi - xj);
                if x < x_intersect {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_of_a_point_with_itself_is_zero() {
        let p = Location::new(37.77, -122.42);
        assert_eq!(p.haversine_distance_meters(&p), 0.0);
    }

    #[test]
    fn haversine_matches_a_known_reference_distance() {
        // San Francisco to Los Angeles, roughly 559 km great-circle.
        let sf = Location::new(37.7749, -122.4194);
        let la = Location::new(34.0522, -118.2437);
        let d_km = sf.haversine_distance_meters(&la) / 1000.0;
        assert!((d_km - 559.0).abs() < 10.0, "got {d_km} km");
    }

    #[test]
    fn point_inside_a_unit_square_is_detected() {
        let square = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
        assert!(Location::new(0.5, 0.5).inside_polygon(&square));
        assert!(!Location::new(2.0, 2.0).inside_polygon(&square));
    }
}
