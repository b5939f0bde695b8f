//! Parametric silhouettes used to shape the initial entity distribution
//!
//! Shapes are described in a unit box (`[0,1]²`, y down) and fitted to the
//! surface on every resize. Membership is a pure predicate over pixel
//! coordinates.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::SILHOUETTE_SAMPLE_ATTEMPTS;
use crate::error::ConfigError;

/// Share of the smaller surface dimension the fitted box occupies
const FIT_FRACTION: f32 = 0.8;

/// Built-in wolf head outline (ears up, snout down), unit box coordinates
const WOLF_HEAD: &[[f32; 2]] = &[
    [0.50, 0.95],
    [0.40, 0.85],
    [0.30, 0.70],
    [0.18, 0.55],
    [0.12, 0.40],
    [0.15, 0.05],
    [0.32, 0.28],
    [0.50, 0.22],
    [0.68, 0.28],
    [0.85, 0.05],
    [0.88, 0.40],
    [0.82, 0.55],
    [0.70, 0.70],
    [0.60, 0.85],
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Silhouette {
    /// Ellipse centered in the box; radii in box units (0.5 touches the edge)
    Ellipse { rx: f32, ry: f32 },
    /// Annulus centered in the box
    Ring { inner: f32, outer: f32 },
    WolfHead,
    /// Arbitrary simple polygon, box units
    Polygon { points: Vec<[f32; 2]> },
}

impl Silhouette {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Silhouette::Ellipse { rx, ry } => {
                for (field, value) in [("silhouette.rx", *rx), ("silhouette.ry", *ry)] {
                    if !value.is_finite() || value <= 0.0 {
                        return Err(ConfigError::NonPositive { field, value });
                    }
                }
                Ok(())
            }
            Silhouette::Ring { inner, outer } => {
                if !inner.is_finite() || *inner < 0.0 {
                    return Err(ConfigError::NegativeThreshold {
                        field: "silhouette.inner",
                        value: *inner,
                    });
                }
                if !outer.is_finite() || outer <= inner {
                    return Err(ConfigError::InvertedRange {
                        field: "silhouette.ring",
                        min: *inner,
                        max: *outer,
                    });
                }
                Ok(())
            }
            Silhouette::WolfHead => Ok(()),
            Silhouette::Polygon { points } => {
                if points.len() < 3 {
                    return Err(ConfigError::DegenerateSilhouette(points.len()));
                }
                Ok(())
            }
        }
    }

    /// Membership test in unit box coordinates
    fn contains_unit(&self, p: Vec2) -> bool {
        let center = Vec2::splat(0.5);
        match self {
            Silhouette::Ellipse { rx, ry } => {
                let d = (p - center) / Vec2::new(*rx, *ry);
                d.length_squared() <= 1.0
            }
            Silhouette::Ring { inner, outer } => {
                let d = p.distance(center);
                d >= *inner && d <= *outer
            }
            Silhouette::WolfHead => point_in_polygon(p, WOLF_HEAD),
            Silhouette::Polygon { points } => point_in_polygon(p, points),
        }
    }

    /// A point that is always inside the shape (unit box)
    fn anchor_unit(&self) -> Vec2 {
        match self {
            Silhouette::Ellipse { .. } => Vec2::splat(0.5),
            Silhouette::Ring { inner, outer } => Vec2::new(0.5 + (inner + outer) * 0.5, 0.5),
            Silhouette::WolfHead => Vec2::new(0.5, 0.5),
            Silhouette::Polygon { points } => {
                let n = points.len().max(1) as f32;
                let centroid = points
                    .iter()
                    .fold(Vec2::ZERO, |acc, p| acc + Vec2::from(*p))
                    / n;
                if point_in_polygon(centroid, points) {
                    centroid
                } else {
                    // Concave polygon: nudge the first vertex toward the centroid
                    points
                        .first()
                        .map(|p| Vec2::from(*p).lerp(centroid, 0.01))
                        .unwrap_or(centroid)
                }
            }
        }
    }
}

/// Even-odd ray casting test
fn point_in_polygon(p: Vec2, points: &[[f32; 2]]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (points[i][0], points[i][1]);
        let (xj, yj) = (points[j][0], points[j][1]);
        if (yi > p.y) != (yj > p.y) && p.x < (xj - xi) * (p.y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A silhouette fitted to a concrete surface size
#[derive(Debug, Clone, PartialEq)]
pub struct SilhouetteMask {
    shape: Silhouette,
    origin: Vec2,
    side: f32,
}

impl SilhouetteMask {
    /// Fit the shape's unit box into the center of a `width x height` surface
    pub fn fit(shape: Silhouette, width: f32, height: f32) -> Self {
        let side = (width.min(height) * FIT_FRACTION).max(1.0);
        let origin = Vec2::new((width - side) * 0.5, (height - side) * 0.5);
        Self {
            shape,
            origin,
            side,
        }
    }

    pub fn shape(&self) -> &Silhouette {
        &self.shape
    }

    fn to_unit(&self, p: Vec2) -> Vec2 {
        (p - self.origin) / self.side
    }

    fn from_unit(&self, u: Vec2) -> Vec2 {
        self.origin + u * self.side
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.shape.contains_unit(self.to_unit(p))
    }

    pub fn anchor(&self) -> Vec2 {
        self.from_unit(self.shape.anchor_unit())
    }

    /// Rejection-sample a point inside the shape; falls back to the anchor
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec2 {
        for _ in 0..SILHOUETTE_SAMPLE_ATTEMPTS {
            let u = Vec2::new(rng.random::<f32>(), rng.random::<f32>());
            if self.shape.contains_unit(u) {
                return self.from_unit(u);
            }
        }
        self.anchor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_polygon_needs_three_points() {
        let shape = Silhouette::Polygon {
            points: vec![[0.0, 0.0], [1.0, 1.0]],
        };
        assert_eq!(shape.validate(), Err(ConfigError::DegenerateSilhouette(2)));
    }

    #[test]
    fn test_ring_must_have_width() {
        let shape = Silhouette::Ring {
            inner: 0.3,
            outer: 0.3,
        };
        assert!(matches!(
            shape.validate(),
            Err(ConfigError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_wolf_head_membership() {
        let mask = SilhouetteMask::fit(Silhouette::WolfHead, 1000.0, 1000.0);
        assert!(mask.contains(mask.anchor()));
        // Corners of the surface are outside the head
        assert!(!mask.contains(Vec2::new(0.0, 0.0)));
        assert!(!mask.contains(Vec2::new(999.0, 999.0)));
        // Between the ears is outside
        assert!(!mask.contains(mask.from_unit(Vec2::new(0.5, 0.1))));
    }

    #[test]
    fn test_samples_fall_inside() {
        let mask = SilhouetteMask::fit(Silhouette::WolfHead, 800.0, 600.0);
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            let p = mask.sample(&mut rng);
            assert!(mask.contains(p), "{p:?} outside silhouette");
            assert!(p.x >= 0.0 && p.x <= 800.0 && p.y >= 0.0 && p.y <= 600.0);
        }
    }

    #[test]
    fn test_tiny_shape_falls_back_to_anchor() {
        let mask = SilhouetteMask::fit(Silhouette::Ellipse { rx: 1e-6, ry: 1e-6 }, 400.0, 400.0);
        let mut rng = Pcg32::seed_from_u64(9);
        assert_eq!(mask.sample(&mut rng), mask.anchor());
    }

    #[test]
    fn test_ring_anchor_is_inside() {
        let mask = SilhouetteMask::fit(
            Silhouette::Ring {
                inner: 0.2,
                outer: 0.4,
            },
            500.0,
            300.0,
        );
        assert!(mask.contains(mask.anchor()));
        assert!(!mask.contains(Vec2::new(250.0, 150.0)));
    }
}
