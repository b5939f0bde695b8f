//! Scalar and vector helpers shared by the force, proximity and effect passes

use glam::Vec2;

use crate::consts::MIN_DISTANCE;

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Unit vector from `from` toward `to`, plus the (unclamped) distance.
///
/// When the points coincide the distance is substituted with [`MIN_DISTANCE`]
/// and the direction falls back to +X, so callers never divide by zero.
#[inline]
pub fn direction_and_distance(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let dist = delta.length();
    if dist < MIN_DISTANCE || !dist.is_finite() {
        (Vec2::X, MIN_DISTANCE)
    } else {
        (delta / dist, dist)
    }
}

/// Linear falloff: 1 at distance 0, 0 at `range` and beyond
#[inline]
pub fn linear_falloff(dist: f32, range: f32) -> f32 {
    if range <= 0.0 {
        return 0.0;
    }
    (1.0 - dist / range).clamp(0.0, 1.0)
}

/// Quadratic falloff in distance: `1 - d²/r²`, clamped to [0, 1]
#[inline]
pub fn quadratic_falloff(dist: f32, range: f32) -> f32 {
    if range <= 0.0 {
        return 0.0;
    }
    (1.0 - (dist * dist) / (range * range)).clamp(0.0, 1.0)
}

/// Exponential approach: moves `current` a `1/k` fraction of the way to `target`.
///
/// For `k >= 1` this never overshoots, so repeated application converges.
#[inline]
pub fn relax_toward(current: Vec2, target: Vec2, k: f32) -> Vec2 {
    current + (target - current) / k.max(1.0)
}

/// Scalar version of [`relax_toward`]
#[inline]
pub fn relax_scalar(current: f32, target: f32, k: f32) -> f32 {
    current + (target - current) / k.max(1.0)
}

/// Same color with its alpha multiplied by `alpha`
#[inline]
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
}

/// Wrap a coordinate into `[-margin, extent + margin]`, teleporting across the edge
#[inline]
pub fn wrap_with_margin(value: f32, extent: f32, margin: f32) -> f32 {
    if value > extent + margin {
        -margin
    } else if value < -margin {
        extent + margin
    } else {
        value
    }
}

/// True when both components are finite
#[inline]
pub fn is_finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_guard_on_coincident_points() {
        let (dir, dist) = direction_and_distance(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0));
        assert_eq!(dir, Vec2::X);
        assert!(dist >= MIN_DISTANCE);
        assert!(is_finite(dir / dist));
    }

    #[test]
    fn test_direction_is_unit() {
        let (dir, dist) = direction_and_distance(Vec2::ZERO, Vec2::new(3.0, 4.0));
        assert!((dist - 5.0).abs() < 1e-5);
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_falloff_endpoints() {
        assert_eq!(linear_falloff(0.0, 100.0), 1.0);
        assert_eq!(linear_falloff(100.0, 100.0), 0.0);
        assert_eq!(quadratic_falloff(0.0, 100.0), 1.0);
        assert_eq!(quadratic_falloff(100.0, 100.0), 0.0);
        assert_eq!(linear_falloff(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_relax_never_overshoots() {
        let target = Vec2::new(100.0, -50.0);
        let mut p = Vec2::new(-300.0, 200.0);
        let mut last = distance(p, target);
        for _ in 0..200 {
            p = relax_toward(p, target, 10.0);
            let d = distance(p, target);
            assert!(d <= last);
            last = d;
        }
        assert!(last < 0.01);
    }

    #[test]
    fn test_wrap_with_margin() {
        assert_eq!(wrap_with_margin(910.0, 800.0, 100.0), -100.0);
        assert_eq!(wrap_with_margin(-101.0, 800.0, 100.0), 900.0);
        assert_eq!(wrap_with_margin(400.0, 800.0, 100.0), 400.0);
    }
}
