//! Planar coordinate type.
//!
//! Graph nodes carry abstract map coordinates, not WGS-84 positions, so all
//! distances are plain Euclidean and edge weights default to the straight
//! line between the two endpoints.

/// A point on the simulation map.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point2) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation: `t = 0` is `self`, `t = 1` is `other`.
    #[inline]
    pub fn lerp(self, other: Point2, t: f64) -> Point2 {
        Point2 {
            x: self.x + t * (other.x - self.x),
            y: self.y + t * (other.y - self.y),
        }
    }

    /// Midpoint of the segment `self`–`other` (where a roadblock marker sits).
    #[inline]
    pub fn midpoint(self, other: Point2) -> Point2 {
        self.lerp(other, 0.5)
    }

    /// Compass heading in degrees from `self` toward `other`.
    ///
    /// 0° points up (+y), angles grow clockwise, result is in `[0, 360)`.
    /// Renderers rotate agent sprites by this value.
    pub fn heading_to(self, other: Point2) -> f64 {
        let math_deg = (other.y - self.y).atan2(other.x - self.x).to_degrees();
        (450.0 - math_deg).rem_euclid(360.0)
    }
}

impl std::fmt::Display for Point2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
