//! Perspective and axis-avoidance optimizer.
//!
//! Reduces the chance that nodes render hidden behind each other or behind
//! the center body when seen from the default camera direction (+Z looking
//! at the origin). Three heuristic passes: axis clearing, depth
//! de-stacking, and center-occlusion-cone clearing. This improves
//! visibility statistically; it is not a hard geometric guarantee.

use glam::{Mat3, Vec2, Vec3};
use rand::Rng;

use orbview_common::{Node, VisibilityConfig};

use super::separation;

/// Run all three passes in place.
pub fn optimize(nodes: &mut [Node], cfg: &VisibilityConfig, rng: &mut impl Rng) {
    if nodes.len() < 2 {
        return;
    }
    clear_view_axis(nodes, cfg, rng);
    destack_depth(nodes, cfg, rng);
    clear_center_cone(nodes, cfg, rng);
}

/// Push nodes sitting too close to the default view axis radially outward,
/// so they do not stack in the screen center.
fn clear_view_axis(nodes: &mut [Node], cfg: &VisibilityConfig, rng: &mut impl Rng) {
    for node in nodes.iter_mut() {
        if node.is_pinned() {
            continue;
        }
        let lateral = Vec2::new(node.position.x, node.position.y);
        let dist = lateral.length();
        if dist >= cfg.axis_clearance {
            continue;
        }
        let dir = if dist < 1e-4 {
            // Exactly on-axis: pick a random tangential direction.
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            Vec2::new(angle.cos(), angle.sin())
        } else {
            lateral / dist
        };
        node.position.x = dir.x * cfg.axis_clearance;
        node.position.y = dir.y * cfg.axis_clearance;
    }
}

/// Sort along the view direction and nudge nodes that hide behind a node
/// in front of them, deepest first. Ends with a light re-separation so the
/// nudges do not create new close neighbors.
fn destack_depth(nodes: &mut [Node], cfg: &VisibilityConfig, rng: &mut impl Rng) {
    // Front-to-back: the default camera sits at +Z, so larger z is closer.
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| {
        nodes[b]
            .position
            .z
            .partial_cmp(&nodes[a].position.z)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for (rank_from_front, oi) in order.iter().copied().enumerate().rev() {
        if nodes[oi].is_pinned() {
            continue;
        }
        let here = Vec2::new(nodes[oi].position.x, nodes[oi].position.y);

        // A node is occluded when some node in front shares its screen spot.
        let mut blocker: Option<Vec2> = None;
        for &fi in order.iter().take(rank_from_front) {
            let front = Vec2::new(nodes[fi].position.x, nodes[fi].position.y);
            if front.distance(here) < cfg.destack_threshold {
                blocker = Some(front);
                break;
            }
        }
        let Some(blocker) = blocker else { continue };

        let rank_from_back = (order.len() - 1 - rank_from_front) as f32;
        let magnitude = cfg.destack_step * (1.0 + 0.5 * rank_from_back);
        let away = (here - blocker).try_normalize().unwrap_or_else(|| {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            Vec2::new(angle.cos(), angle.sin())
        });

        nodes[oi].position.x += away.x * magnitude;
        nodes[oi].position.y += away.y * magnitude;
    }

    separation::separate(nodes, cfg.destack_min_distance, 2, rng);
}

/// Rotate nodes out of the occlusion cone directly behind the center,
/// preserving their outward distance from it.
fn clear_center_cone(nodes: &mut [Node], cfg: &VisibilityConfig, rng: &mut impl Rng) {
    for node in nodes.iter_mut() {
        if node.is_pinned() {
            continue;
        }
        let p = node.position;
        if p.z >= 0.0 {
            continue;
        }
        let lateral = Vec2::new(p.x, p.y).length();
        if lateral >= cfg.cone_ratio * -p.z {
            continue;
        }

        // Sideways rotation of up to 45 degrees, random sign.
        let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
        let angle = sign * std::f32::consts::FRAC_PI_4 * (0.5 + 0.5 * rng.random::<f32>());
        node.position = Mat3::from_rotation_y(angle) * p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbview_common::NodeGroup;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn node_at(id: &str, x: f32, y: f32, z: f32) -> Node {
        let mut node = Node::new(id, NodeGroup::Item, None);
        node.position = Vec3::new(x, y, z);
        node
    }

    fn cfg() -> VisibilityConfig {
        VisibilityConfig::default()
    }

    #[test]
    fn test_axis_clearing_pushes_outward() {
        let mut nodes = vec![
            node_at("near-axis", 5.0, 0.0, 200.0),
            node_at("far", 300.0, 0.0, 0.0),
        ];
        let mut rng = SmallRng::seed_from_u64(1);
        clear_view_axis(&mut nodes, &cfg(), &mut rng);

        let lateral = Vec2::new(nodes[0].position.x, nodes[0].position.y).length();
        assert!(lateral >= cfg().axis_clearance - 1e-3);
        // Depth is untouched by axis clearing.
        assert_eq!(nodes[0].position.z, 200.0);
        // Already-clear nodes are untouched.
        assert_eq!(nodes[1].position, Vec3::new(300.0, 0.0, 0.0));
    }

    #[test]
    fn test_axis_clearing_handles_on_axis_node() {
        let mut nodes = vec![node_at("on-axis", 0.0, 0.0, 150.0)];
        let mut rng = SmallRng::seed_from_u64(2);
        clear_view_axis(&mut nodes, &cfg(), &mut rng);
        let lateral = Vec2::new(nodes[0].position.x, nodes[0].position.y).length();
        assert!((lateral - cfg().axis_clearance).abs() < 1e-3);
        assert!(nodes[0].position.is_finite());
    }

    #[test]
    fn test_destack_moves_hidden_node() {
        // Two nodes sharing a screen position at different depths.
        let mut nodes = vec![
            node_at("front", 100.0, 50.0, 200.0),
            node_at("hidden", 102.0, 50.0, -100.0),
        ];
        let mut rng = SmallRng::seed_from_u64(3);
        destack_depth(&mut nodes, &cfg(), &mut rng);

        let front = Vec2::new(nodes[0].position.x, nodes[0].position.y);
        let back = Vec2::new(nodes[1].position.x, nodes[1].position.y);
        assert!(front.distance(back) > 2.0);
        // The front node keeps its spot; only the occluded one moves.
        assert_eq!(nodes[0].position, Vec3::new(100.0, 50.0, 200.0));
    }

    #[test]
    fn test_cone_clearing_preserves_radius() {
        let mut nodes = vec![node_at("behind", 4.0, 3.0, -400.0)];
        let radius_before = nodes[0].position.length();
        let mut rng = SmallRng::seed_from_u64(4);
        clear_center_cone(&mut nodes, &cfg(), &mut rng);

        let p = nodes[0].position;
        assert!((p.length() - radius_before).abs() < 1e-2);
        // Rotated sideways: no longer inside the cone.
        let lateral = Vec2::new(p.x, p.y).length();
        assert!(lateral >= cfg().cone_ratio * -p.z || p.z >= 0.0);
    }

    #[test]
    fn test_cone_clearing_ignores_front_nodes() {
        let mut nodes = vec![node_at("front", 1.0, 0.0, 300.0)];
        let mut rng = SmallRng::seed_from_u64(5);
        clear_center_cone(&mut nodes, &cfg(), &mut rng);
        assert_eq!(nodes[0].position, Vec3::new(1.0, 0.0, 300.0));
    }

    #[test]
    fn test_pinned_nodes_never_move() {
        let mut nodes = vec![node_at("pinned", 0.0, 0.0, -300.0), node_at("free", 200.0, 0.0, 0.0)];
        nodes[0].pin = Some(nodes[0].position);
        let mut rng = SmallRng::seed_from_u64(6);
        optimize(&mut nodes, &cfg(), &mut rng);
        assert_eq!(nodes[0].position, Vec3::new(0.0, 0.0, -300.0));
    }
}
