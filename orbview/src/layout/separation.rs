//! Pairwise minimum-separation relaxation.
//!
//! Enforces `distance(a, b) >= min_distance` for every unpinned pair by
//! moving violating nodes apart along the pair axis. A fixed pass count
//! bounds the total displacement, so the resolver never diverges.

use glam::Vec3;
use rand::Rng;

use orbview_common::Node;

/// Draw a uniformly distributed unit vector. Used when a pair of nodes is
/// coincident and the pair axis is undefined.
pub fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.random::<f32>() * 2.0 - 1.0,
            rng.random::<f32>() * 2.0 - 1.0,
            rng.random::<f32>() * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-4 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Relax the node set in place until every pair is separated or the pass
/// budget runs out. Returns the number of violations in the final pass.
pub fn separate(
    nodes: &mut [Node],
    min_distance: f32,
    passes: usize,
    rng: &mut impl Rng,
) -> usize {
    let mut last_violations = 0;

    for pass in 0..passes {
        let mut violations = 0;

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let a_pinned = nodes[i].is_pinned();
                let b_pinned = nodes[j].is_pinned();
                if a_pinned && b_pinned {
                    continue;
                }

                let delta = nodes[j].position - nodes[i].position;
                let dist = delta.length();
                if dist >= min_distance {
                    continue;
                }
                violations += 1;

                let axis = if dist < 1e-4 {
                    random_unit_vector(rng)
                } else {
                    delta / dist
                };
                let depth = min_distance - dist;

                // Pinned nodes absorb none of the correction.
                match (a_pinned, b_pinned) {
                    (false, false) => {
                        nodes[i].position -= axis * (depth * 0.5);
                        nodes[j].position += axis * (depth * 0.5);
                    }
                    (true, false) => nodes[j].position += axis * depth,
                    (false, true) => nodes[i].position -= axis * depth,
                    (true, true) => unreachable!(),
                }
            }
        }

        last_violations = violations;
        if violations == 0 {
            tracing::debug!(pass, "separation converged");
            break;
        }
    }

    last_violations
}
