//! Circular geometry helpers
//!
//! Angle convention throughout the crate: angle 0 points "up" (negative y),
//! angles increase clockwise, and normalized angles live in `[0, 2π)`.
//! These functions are pure and total; the polar/cartesian pair are exact
//! inverses up to floating-point tolerance.

pub use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

/// A point in screen/canvas space (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in polar space relative to some center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    pub radius: f64,
    pub angle_rad: f64,
}

impl PolarPoint {
    #[inline]
    pub fn new(radius: f64, angle_rad: f64) -> Self {
        Self { radius, angle_rad }
    }
}

/// Clamp a value into `[0, 1]`.
#[inline]
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Fold an angle into `[0, 2π)`.
#[inline]
pub fn normalize_angle(angle_rad: f64) -> f64 {
    let folded = angle_rad % TAU;
    if folded < 0.0 {
        folded + TAU
    } else {
        folded
    }
}

/// Signed minimal rotation from `from` to `to`, in `(-π, π]`.
///
/// Positive values rotate clockwise (in the direction of increasing angle).
#[inline]
pub fn shortest_angular_distance(from_rad: f64, to_rad: f64) -> f64 {
    let delta = normalize_angle(to_rad - from_rad);
    if delta > std::f64::consts::PI {
        delta - TAU
    } else {
        delta
    }
}

/// Convert a polar point around `center` to canvas coordinates.
#[inline]
pub fn polar_to_cartesian(polar: PolarPoint, center: Point) -> Point {
    Point {
        x: center.x + polar.radius * polar.angle_rad.sin(),
        y: center.y - polar.radius * polar.angle_rad.cos(),
    }
}

/// Convert a canvas point back to polar coordinates around `center`.
#[inline]
pub fn cartesian_to_polar(point: Point, center: Point) -> PolarPoint {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    PolarPoint {
        radius: (dx * dx + dy * dy).sqrt(),
        angle_rad: normalize_angle(dx.atan2(-dy)),
    }
}
