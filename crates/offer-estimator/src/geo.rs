//! Great-circle distance helpers used by the comparable search.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a point only when both coordinates are present and within range.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        let point = Self::new(latitude?, longitude?);
        point.is_valid().then_some(point)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Anything that may carry a usable coordinate.
pub trait Located {
    fn location(&self) -> Option<GeoPoint>;
}

impl Located for GeoPoint {
    fn location(&self) -> Option<GeoPoint> {
        self.is_valid().then_some(*self)
    }
}

/// Haversine distance between two points in miles.
pub fn distance_miles(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for near-antipodal points.
    let a = a.clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Returns the candidates within `radius_miles` of `origin`.
///
/// A candidate sitting exactly on the origin coordinates is treated as the
/// origin itself and dropped. Candidates without a usable location are skipped.
pub fn filter_within_radius<T: Located>(
    origin: GeoPoint,
    candidates: &[T],
    radius_miles: f64,
) -> Vec<&T> {
    let within: Vec<&T> = candidates
        .iter()
        .filter(|candidate| match candidate.location() {
            Some(point) => {
                !is_origin(origin, point) && distance_miles(origin, point) <= radius_miles
            }
            None => false,
        })
        .collect();

    tracing::debug!(
        total = candidates.len(),
        within = within.len(),
        radius_miles,
        "filtered candidates by radius"
    );

    within
}

pub(crate) fn is_origin(origin: GeoPoint, point: GeoPoint) -> bool {
    point.latitude == origin.latitude && point.longitude == origin.longitude
}
