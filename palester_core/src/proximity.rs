//! Gym proximity checks.

use crate::GymLocation;
use geo::{Distance, Haversine, Point};

/// Default distance from the gym within which a workout may be logged
pub const DEFAULT_GYM_RADIUS_M: f64 = 50.0;

/// Great-circle distance between two coordinates in metres
pub fn distance_m(a: &GymLocation, b: &GymLocation) -> f64 {
    let p1 = Point::new(a.lng, a.lat);
    let p2 = Point::new(b.lng, b.lat);
    Haversine::distance(p1, p2)
}

/// Whether the device is within `radius_m` of the gym
pub fn is_at_gym(device: &GymLocation, gym: &GymLocation, radius_m: f64) -> bool {
    let distance = distance_m(device, gym);
    tracing::debug!("Device is {:.1} m from the gym (radius {} m)", distance, radius_m);
    distance <= radius_m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero_for_same_point() {
        let gym = GymLocation {
            lat: 35.6892,
            lng: 51.3890,
        };
        assert!(distance_m(&gym, &gym) < 1e-6);
        assert!(is_at_gym(&gym, &gym, DEFAULT_GYM_RADIUS_M));
    }

    #[test]
    fn test_radius_boundary() {
        let gym = GymLocation { lat: 0.0, lng: 0.0 };
        // 0.0003 degrees of latitude is roughly 33 m
        let near = GymLocation {
            lat: 0.0003,
            lng: 0.0,
        };
        // 0.001 degrees is roughly 111 m
        let far = GymLocation { lat: 0.001, lng: 0.0 };

        let d = distance_m(&gym, &near);
        assert!((30.0..36.0).contains(&d), "distance was {}", d);
        assert!(is_at_gym(&near, &gym, DEFAULT_GYM_RADIUS_M));
        assert!(!is_at_gym(&far, &gym, DEFAULT_GYM_RADIUS_M));
        assert!(is_at_gym(&far, &gym, 150.0));
    }
}
