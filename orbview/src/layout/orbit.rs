//! Hierarchical orbit positioner.
//!
//! Assigns every node an initial 3D position before the physics engine
//! starts, processing hierarchy levels top-down. Children of each parent
//! are spread on a golden-angle spiral at a per-level radius, with a small
//! vertical bias per level so no shell collapses into a single plane.

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use rand::Rng;

use orbview_common::{GraphData, NodeGroup, OrbitConfig, Viewport};

/// Golden angle in radians, for even angular spread without visible
/// repeating patterns.
pub const GOLDEN_ANGLE: f32 = 2.399_963;

/// Per-level tilt off the equatorial plane, applied with alternating sign
/// by child index.
const PHI_BIAS: [f32; 5] = [0.0, 0.35, 0.28, 0.22, 0.18];

/// Place every node. Children of unplaced parents are skipped with a log;
/// sibling processing continues. All placed nodes start at rest.
pub fn place(graph: &mut GraphData, viewport: Viewport, cfg: &OrbitConfig, rng: &mut impl Rng) {
    if graph.is_empty() {
        return;
    }

    let scale = viewport.scale();
    let mut placed: HashMap<String, Vec3> = HashMap::with_capacity(graph.nodes.len());

    // Pin the center at the origin before anything orbits it.
    for node in &mut graph.nodes {
        if node.group == NodeGroup::Center {
            if let Some(pin) = node.pin {
                if pin != Vec3::ZERO {
                    tracing::debug!(node = %node.id, ?pin, "overriding center pin with origin");
                }
            }
            node.pin = Some(Vec3::ZERO);
            node.apply_pin();
            placed.insert(node.id.clone(), node.position);
        }
    }

    for depth in 1..=4 {
        // Group this level's nodes by parent. BTreeMap keeps parent order
        // (and therefore RNG consumption) deterministic.
        let mut by_parent: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, node) in graph.nodes.iter().enumerate() {
            if node.group.depth() != depth {
                continue;
            }
            match &node.parent {
                Some(parent_id) if placed.contains_key(parent_id) => {
                    by_parent.entry(parent_id.clone()).or_default().push(i);
                }
                Some(parent_id) => {
                    tracing::warn!(
                        node = %node.id,
                        parent = %parent_id,
                        "skipping node with unplaced parent"
                    );
                }
                None => {
                    tracing::warn!(node = %node.id, "skipping non-center node without parent");
                }
            }
        }

        for (parent_id, mut children) in by_parent {
            let parent_pos = placed[&parent_id];

            // Largest first for predictable layering; ties broken by id so
            // a seeded run reproduces exactly.
            children.sort_by(|&a, &b| {
                let (na, nb) = (&graph.nodes[a], &graph.nodes[b]);
                nb.weight()
                    .partial_cmp(&na.weight())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| na.id.cmp(&nb.id))
            });

            for (i, &idx) in children.iter().enumerate() {
                let group = graph.nodes[idx].group;
                let theta = cfg.base_angle + i as f32 * GOLDEN_ANGLE;
                let tier = if i % 2 == 0 { 1.0 } else { -1.0 };
                let phi = std::f32::consts::FRAC_PI_2 + PHI_BIAS[depth] * tier;
                let radius =
                    cfg.radius_for(group) * scale * (0.9 + cfg.jitter * rng.random::<f32>());

                let offset = Vec3::new(
                    radius * phi.sin() * theta.cos(),
                    radius * phi.cos(),
                    radius * phi.sin() * theta.sin(),
                );

                let node = &mut graph.nodes[idx];
                node.position = parent_pos + offset;
                node.velocity = Vec3::ZERO;
                node.apply_pin();
                placed.insert(node.id.clone(), node.position);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbview_common::{Node, NodeGroup};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn tree(categories: usize, subs_per_category: usize) -> GraphData {
        let mut nodes = vec![Node::new("center", NodeGroup::Center, None)];
        for c in 0..categories {
            let cat_id = format!("cat{}", c);
            nodes.push(Node::new(cat_id.clone(), NodeGroup::Category, Some("center".into())));
            for s in 0..subs_per_category {
                nodes.push(Node::new(
                    format!("cat{}-sub{}", c, s),
                    NodeGroup::Subcategory,
                    Some(cat_id.clone()),
                ));
            }
        }
        GraphData {
            nodes,
            links: Vec::new(),
        }
    }

    #[test]
    fn test_center_pinned_at_origin() {
        let mut graph = tree(3, 2);
        let mut rng = SmallRng::seed_from_u64(1);
        place(&mut graph, Viewport::default(), &OrbitConfig::default(), &mut rng);
        let center = graph.node("center").unwrap();
        assert_eq!(center.position, Vec3::ZERO);
        assert_eq!(center.pin, Some(Vec3::ZERO));
    }

    #[test]
    fn test_radii_within_jitter_band() {
        let mut graph = tree(5, 3);
        let cfg = OrbitConfig::default();
        let viewport = Viewport::default();
        let mut rng = SmallRng::seed_from_u64(7);
        place(&mut graph, viewport, &cfg, &mut rng);

        let scale = viewport.scale();
        for node in &graph.nodes {
            if node.group != NodeGroup::Category {
                continue;
            }
            let r = node.position.length();
            let base = cfg.category_radius * scale;
            assert!(r >= 0.85 * base && r <= 1.15 * base, "radius {} out of band", r);
        }
        for node in &graph.nodes {
            if node.group != NodeGroup::Subcategory {
                continue;
            }
            let parent = graph.node(node.parent.as_ref().unwrap()).unwrap();
            let r = node.position.distance(parent.position);
            let base = cfg.subcategory_radius * scale;
            assert!(r >= 0.85 * base && r <= 1.15 * base, "radius {} out of band", r);
        }
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let cfg = OrbitConfig::default();
        let viewport = Viewport::default();

        let mut first = tree(4, 2);
        let mut rng = SmallRng::seed_from_u64(42);
        place(&mut first, viewport, &cfg, &mut rng);

        let mut second = tree(4, 2);
        let mut rng = SmallRng::seed_from_u64(42);
        place(&mut second, viewport, &cfg, &mut rng);

        for (a, b) in first.nodes.iter().zip(second.nodes.iter()) {
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn test_zero_jitter_is_exact() {
        let cfg = OrbitConfig {
            jitter: 0.0,
            ..OrbitConfig::default()
        };
        let viewport = Viewport::default();
        let mut graph = tree(3, 0);
        let mut rng = SmallRng::seed_from_u64(3);
        place(&mut graph, viewport, &cfg, &mut rng);

        let expected = 0.9 * cfg.category_radius * viewport.scale();
        for node in &graph.nodes {
            if node.group == NodeGroup::Category {
                assert!((node.position.length() - expected).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_dangling_parent_is_skipped() {
        let mut graph = tree(1, 0);
        graph.nodes.push(Node::new(
            "orphan",
            NodeGroup::Subcategory,
            Some("missing".into()),
        ));
        let mut rng = SmallRng::seed_from_u64(5);
        place(&mut graph, Viewport::default(), &OrbitConfig::default(), &mut rng);
        // The orphan stays at the origin; its siblings are placed anyway.
        assert_eq!(graph.node("orphan").unwrap().position, Vec3::ZERO);
        assert!(graph.node("cat0").unwrap().position.length() > 1.0);
    }

    #[test]
    fn test_velocities_start_at_rest() {
        let mut graph = tree(3, 2);
        let mut rng = SmallRng::seed_from_u64(11);
        place(&mut graph, Viewport::default(), &OrbitConfig::default(), &mut rng);
        for node in &graph.nodes {
            assert_eq!(node.velocity, Vec3::ZERO);
        }
    }

    #[test]
    fn test_single_child_uses_spiral_start() {
        let cfg = OrbitConfig {
            jitter: 0.0,
            base_angle: 0.0,
            ..OrbitConfig::default()
        };
        let mut graph = tree(1, 0);
        let mut rng = SmallRng::seed_from_u64(9);
        place(&mut graph, Viewport::default(), &cfg, &mut rng);
        let cat = graph.node("cat0").unwrap();
        // Index 0 of the spiral: theta = 0, so the offset lies in the XY plane
        // tilted by the level bias, with no Z component.
        assert!(cat.position.z.abs() < 1e-4);
        assert!(cat.position.x > 0.0);
    }
}
