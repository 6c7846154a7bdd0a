//! Vector & coordinate kernel: XYZ/AED conversion and small-vector math.
//!
//! Pure, total functions — no failures, no allocation.

use serde::{Deserialize, Serialize};

/// A position in meters, Cartesian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn add(&self, other: &Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    #[inline]
    pub fn sub(&self, other: &Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    #[inline]
    pub fn scale(&self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    /// Linear interpolation between `self` and `other`.
    #[inline]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    /// Rotate around the Z axis (used by rotational multi-track modes).
    #[inline]
    pub fn rotate_z(&self, angle_deg: f64) -> Self {
        let rad = angle_deg.to_radians();
        let (sin, cos) = rad.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos, self.z)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

/// Azimuth/elevation/distance, device-native spherical coordinates.
///
/// `azimuth` in `[-180, 180]` degrees, `elevation` in `[-90, 90]` degrees,
/// `distance` in meters, `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aed {
    pub azimuth: f64,
    pub elevation: f64,
    pub distance: f64,
}

impl Aed {
    #[inline]
    pub fn new(azimuth: f64, elevation: f64, distance: f64) -> Self {
        Self { azimuth, elevation, distance }
    }
}

/// Wrap an azimuth in degrees into `[-180, 180]`.
#[inline]
pub fn wrap_azimuth(mut deg: f64) -> f64 {
    while deg > 180.0 {
        deg -= 360.0;
    }
    while deg < -180.0 {
        deg += 360.0;
    }
    deg
}

/// `distance = 0` maps to the origin.
pub fn aed_to_xyz(aed: Aed) -> Position {
    if aed.distance <= 0.0 {
        return Position::ORIGIN;
    }
    let az = aed.azimuth.to_radians();
    let el = aed.elevation.to_radians();
    let cos_el = el.cos();
    Position::new(
        aed.distance * az.sin() * cos_el,
        aed.distance * az.cos() * cos_el,
        aed.distance * el.sin(),
    )
}

/// The origin maps to `(0, 0, 0)`.
pub fn xyz_to_aed(pos: Position) -> Aed {
    let distance = pos.magnitude();
    if distance < 1e-12 {
        return Aed::new(0.0, 0.0, 0.0);
    }
    let azimuth = pos.x.atan2(pos.y).to_degrees();
    let elevation = (pos.z / distance).clamp(-1.0, 1.0).asin().to_degrees();
    Aed::new(azimuth, elevation, distance)
}

/// Linear interpolation in Cartesian space.
#[inline]
pub fn lerp_xyz(a: Position, b: Position, t: f64) -> Position {
    a.lerp(&b, t)
}

/// Linear interpolation in AED space, taking the shortest arc in azimuth.
pub fn lerp_aed(a: Aed, b: Aed, t: f64) -> Aed {
    let mut delta = b.azimuth - a.azimuth;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }
    Aed::new(
        wrap_azimuth(a.azimuth + delta * t),
        a.elevation + (b.elevation - a.elevation) * t,
        a.distance + (b.distance - a.distance) * t,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_round_trips_to_zero_aed() {
        assert_eq!(xyz_to_aed(Position::ORIGIN), Aed::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn zero_distance_aed_is_origin() {
        assert_eq!(aed_to_xyz(Aed::new(45.0, 10.0, 0.0)), Position::ORIGIN);
    }

    #[test]
    fn round_trip_accuracy() {
        let cases = [
            (10.0, 20.0, 1e-4),
            (-90.0, -45.0, 1.0),
            (179.9, 89.0, 1e3),
            (0.0, 0.0, 1.0),
            (-179.9, -89.0, 5.5),
        ];
        for (az, el, dist) in cases {
            let aed = Aed::new(az, el, dist);
            let xyz = aed_to_xyz(aed);
            let back = xyz_to_aed(xyz);
            assert!((back.azimuth - aed.azimuth).abs() < 1e-6, "azimuth {:?} vs {:?}", back, aed);
            assert!((back.elevation - aed.elevation).abs() < 1e-6, "elevation {:?} vs {:?}", back, aed);
            assert!((back.distance - aed.distance).abs() < 1e-6, "distance {:?} vs {:?}", back, aed);
        }
    }

    #[test]
    fn lerp_aed_takes_shortest_arc() {
        let a = Aed::new(170.0, 0.0, 1.0);
        let b = Aed::new(-170.0, 0.0, 1.0);
        let mid = lerp_aed(a, b, 0.5);
        // shortest arc crosses +/-180, not through 0
        assert!(mid.azimuth > 175.0 || mid.azimuth < -175.0, "mid = {:?}", mid);
    }

    #[test]
    fn wrap_azimuth_normalizes() {
        assert!((wrap_azimuth(190.0) - (-170.0)).abs() < 1e-9);
        assert!((wrap_azimuth(-190.0) - 170.0).abs() < 1e-9);
    }
}
