//! Placement pipeline and force parametrization.
//!
//! The pipeline runs synchronously and in order — orbit placement, overlap
//! resolution, visibility optimization — and must complete before the
//! physics engine starts iterating and before the first camera framing
//! call.

pub mod forces;
pub mod orbit;
pub mod separation;
pub mod visibility;

use rand::Rng;

use orbview_common::{EngineConfig, GraphData, Viewport};

pub use orbit::GOLDEN_ANGLE;
pub use separation::separate;

/// Run the full placement pipeline over the dataset in place.
pub fn place_all(
    graph: &mut GraphData,
    viewport: Viewport,
    config: &EngineConfig,
    rng: &mut impl Rng,
) {
    if graph.is_empty() {
        tracing::debug!("empty dataset, placement skipped");
        return;
    }

    orbit::place(graph, viewport, &config.orbit, rng);
    let unresolved = separation::separate(
        &mut graph.nodes,
        config.separation.min_distance,
        config.separation.passes,
        rng,
    );
    if unresolved > 0 {
        tracing::debug!(unresolved, "separation pass budget exhausted");
    }
    visibility::optimize(&mut graph.nodes, &config.visibility, rng);

    tracing::info!(nodes = graph.nodes.len(), links = graph.links.len(), "placement complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use orbview_common::{Node, NodeGroup};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_empty_dataset_is_a_noop() {
        let mut graph = GraphData::default();
        let mut rng = SmallRng::seed_from_u64(1);
        place_all(&mut graph, Viewport::default(), &EngineConfig::default(), &mut rng);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_pipeline_keeps_center_at_origin() {
        let mut graph = GraphData {
            nodes: vec![
                Node::new("center", NodeGroup::Center, None),
                Node::new("a", NodeGroup::Category, Some("center".into())),
                Node::new("b", NodeGroup::Category, Some("center".into())),
            ],
            links: Vec::new(),
        };
        let mut rng = SmallRng::seed_from_u64(2);
        place_all(&mut graph, Viewport::default(), &EngineConfig::default(), &mut rng);
        assert_eq!(graph.node("center").unwrap().position, Vec3::ZERO);
        // Unpinned siblings respect the separation floor.
        let a = graph.node("a").unwrap().position;
        let b = graph.node("b").unwrap().position;
        assert!(a.distance(b) >= EngineConfig::default().separation.min_distance - 1e-3);
    }
}
