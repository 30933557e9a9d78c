//! Graph metrics: bounding box, weighted centroid, bounding radius.
//!
//! Pure functions over a node slice, recomputed per framing call.

use glam::Vec3;

use orbview_common::{Bounds, GraphMetrics, Node};

/// Axis-aligned bounding box of all node positions.
pub fn bounds(nodes: &[Node]) -> Option<Bounds> {
    Bounds::from_points(nodes.iter().map(|n| n.position))
}

/// Importance-weighted centroid of the node set.
pub fn weighted_centroid(nodes: &[Node]) -> Option<Vec3> {
    if nodes.is_empty() {
        return None;
    }
    let mut sum = Vec3::ZERO;
    let mut total = 0.0f32;
    for node in nodes {
        let w = node.weight();
        sum += node.position * w;
        total += w;
    }
    Some(sum / total.max(f32::EPSILON))
}

/// Maximum node distance from the given centroid.
pub fn bounding_radius(nodes: &[Node], centroid: Vec3) -> f32 {
    nodes
        .iter()
        .map(|n| n.position.distance(centroid))
        .fold(0.0, f32::max)
}

/// Full metrics for a node set. `None` when the set is empty.
pub fn compute(nodes: &[Node]) -> Option<GraphMetrics> {
    let bounds = bounds(nodes)?;
    let centroid = weighted_centroid(nodes)?;
    let radius = bounding_radius(nodes, centroid);
    Some(GraphMetrics {
        bounds,
        centroid,
        radius,
    })
}
