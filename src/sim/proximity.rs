//! Spatial proximity pass
//!
//! Finds every entity pair closer than a threshold and annotates it with a
//! draw opacity. Two strategies produce identical results: full pairwise
//! comparison for small pools and threshold-sized grid buckets for large ones.

use std::collections::HashMap;

use glam::Vec2;

use super::field::Pointer;
use crate::config::{ConnectionConfig, Falloff, ProximityStrategy};
use crate::consts::GRID_PROXIMITY_THRESHOLD;
use crate::math::{linear_falloff, quadratic_falloff};

/// A connected pair, `a < b`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    pub opacity: f32,
}

/// Line from the pointer to one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerLink {
    pub index: usize,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityParams {
    pub threshold: f32,
    pub falloff: Falloff,
    pub max_opacity: f32,
}

impl From<&ConnectionConfig> for ProximityParams {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            threshold: config.threshold,
            falloff: config.falloff,
            max_opacity: config.max_opacity,
        }
    }
}

impl ProximityParams {
    /// `max_opacity` at distance 0, exactly 0 at the threshold
    pub fn opacity(&self, dist: f32) -> f32 {
        let t = match self.falloff {
            Falloff::Linear => linear_falloff(dist, self.threshold),
            Falloff::Quadratic => quadratic_falloff(dist, self.threshold),
        };
        t * self.max_opacity
    }

    fn connect(&self, positions: &[Vec2], a: usize, b: usize) -> Option<Connection> {
        let distance = positions[a].distance(positions[b]);
        if distance < self.threshold {
            Some(Connection {
                a,
                b,
                distance,
                opacity: self.opacity(distance),
            })
        } else {
            None
        }
    }
}

/// Full O(n²) comparison. Output is ordered by `(a, b)`.
pub fn pairwise(positions: &[Vec2], params: &ProximityParams) -> Vec<Connection> {
    let mut out = Vec::new();
    if params.threshold <= 0.0 {
        return out;
    }
    for a in 0..positions.len() {
        for b in (a + 1)..positions.len() {
            if let Some(c) = params.connect(positions, a, b) {
                out.push(c);
            }
        }
    }
    out
}

/// Bucket positions into cells one threshold wide and compare only
/// neighboring cells. Output is ordered by `(a, b)` like [`pairwise`].
pub fn bucketed(positions: &[Vec2], params: &ProximityParams) -> Vec<Connection> {
    let mut out = Vec::new();
    if params.threshold <= 0.0 || !params.threshold.is_finite() {
        return out;
    }

    // Slightly wider than the threshold so rounding never splits a pair
    // across non-adjacent cells
    let cell = params.threshold * 1.001;
    let cell_of = |p: Vec2| -> (i64, i64) {
        ((p.x / cell).floor() as i64, (p.y / cell).floor() as i64)
    };

    let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, p) in positions.iter().enumerate() {
        buckets.entry(cell_of(*p)).or_default().push(i);
    }

    for (a, p) in positions.iter().enumerate() {
        let (cx, cy) = cell_of(*p);
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                let key = (cx.saturating_add(dx), cy.saturating_add(dy));
                let Some(bucket) = buckets.get(&key) else {
                    continue;
                };
                for &b in bucket.iter().filter(|&&b| b > a) {
                    if let Some(c) = params.connect(positions, a, b) {
                        out.push(c);
                    }
                }
            }
        }
    }

    // Saturated cells can alias a neighbor; drop the duplicates
    out.sort_by(|x, y| (x.a, x.b).cmp(&(y.a, y.b)));
    out.dedup_by(|x, y| x.a == y.a && x.b == y.b);
    out
}

/// Run the pass with the configured strategy
pub fn connections(
    positions: &[Vec2],
    params: &ProximityParams,
    strategy: ProximityStrategy,
) -> Vec<Connection> {
    match strategy {
        ProximityStrategy::Pairwise => pairwise(positions, params),
        ProximityStrategy::Grid => bucketed(positions, params),
        ProximityStrategy::Auto if positions.len() > GRID_PROXIMITY_THRESHOLD => {
            bucketed(positions, params)
        }
        ProximityStrategy::Auto => pairwise(positions, params),
    }
}

/// Entities strictly inside the pointer radius, with a linear opacity
pub fn pointer_links(positions: &[Vec2], pointer: &Pointer, max_opacity: f32) -> Vec<PointerLink> {
    positions
        .iter()
        .enumerate()
        .filter_map(|(index, p)| {
            let dist = p.distance(pointer.pos);
            (dist < pointer.radius).then(|| PointerLink {
                index,
                opacity: linear_falloff(dist, pointer.radius) * max_opacity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(threshold: f32, falloff: Falloff) -> ProximityParams {
        ProximityParams {
            threshold,
            falloff,
            max_opacity: 0.8,
        }
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let p = params(150.0, Falloff::Linear);
        let at = vec![Vec2::ZERO, Vec2::new(150.0, 0.0)];
        assert!(pairwise(&at, &p).is_empty());
        assert!(bucketed(&at, &p).is_empty());

        let inside = vec![Vec2::ZERO, Vec2::new(149.9, 0.0)];
        assert_eq!(pairwise(&inside, &p).len(), 1);
        assert_eq!(bucketed(&inside, &p).len(), 1);
    }

    #[test]
    fn test_opacity_endpoints() {
        for falloff in [Falloff::Linear, Falloff::Quadratic] {
            let p = params(141.0, falloff);
            assert_eq!(p.opacity(0.0), 0.8);
            assert_eq!(p.opacity(141.0), 0.0);
        }
    }

    #[test]
    fn test_coincident_pair_gets_max_opacity() {
        let p = params(100.0, Falloff::Quadratic);
        let c = pairwise(&[Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0)], &p);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].opacity, 0.8);
    }

    #[test]
    fn test_quadratic_is_brighter_midrange() {
        let lin = params(100.0, Falloff::Linear);
        let quad = params(100.0, Falloff::Quadratic);
        assert!(quad.opacity(50.0) > lin.opacity(50.0));
    }

    #[test]
    fn test_zero_threshold_connects_nothing() {
        let p = params(0.0, Falloff::Linear);
        let pts = vec![Vec2::ZERO, Vec2::ZERO];
        assert!(connections(&pts, &p, ProximityStrategy::Pairwise).is_empty());
        assert!(connections(&pts, &p, ProximityStrategy::Grid).is_empty());
    }

    #[test]
    fn test_pointer_links() {
        let pointer = Pointer::at(Vec2::new(100.0, 100.0), 50.0);
        let pts = vec![Vec2::new(100.0, 100.0), Vec2::new(149.0, 100.0), Vec2::new(150.0, 100.0)];
        let links = pointer_links(&pts, &pointer, 1.0);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].opacity, 1.0);
        assert_eq!(links[1].index, 1);
    }

    proptest! {
        #[test]
        fn prop_pair_iff_closer_than_threshold(
            pts in prop::collection::vec((0.0f32..600.0, 0.0f32..400.0), 0..60),
            threshold in 1.0f32..200.0,
        ) {
            let positions: Vec<Vec2> = pts.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
            let p = params(threshold, Falloff::Linear);
            let found = pairwise(&positions, &p);
            let mut expected = 0;
            for a in 0..positions.len() {
                for b in (a + 1)..positions.len() {
                    if positions[a].distance(positions[b]) < threshold {
                        expected += 1;
                    }
                }
            }
            prop_assert_eq!(found.len(), expected);
            for c in &found {
                prop_assert!(c.a < c.b);
                prop_assert!(c.distance < threshold);
                prop_assert!(c.opacity >= 0.0 && c.opacity <= p.max_opacity);
            }
        }

        #[test]
        fn prop_strategies_agree(
            pts in prop::collection::vec((-300.0f32..900.0, -300.0f32..700.0), 0..120),
            threshold in 1.0f32..250.0,
        ) {
            let positions: Vec<Vec2> = pts.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
            let p = params(threshold, Falloff::Quadratic);
            prop_assert_eq!(pairwise(&positions, &p), bucketed(&positions, &p));
        }
    }
}
