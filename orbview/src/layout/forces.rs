//! Force simulation configurator.
//!
//! Derives per-node and per-link physics parameters as pure functions of
//! the viewport size and registers them with the port's pluggable force
//! slots. Re-invocation on resize replaces the registered functions, so
//! no state accumulates.

use orbview_common::{ForceConfig, NodeGroup, OrbitConfig, Viewport};

use crate::port::{LinkForceSlot, NodeForceSlot, SimulationPort};

/// Charge multiplier per hierarchy level; heavier shells repel harder.
pub fn charge_multiplier(group: NodeGroup) -> f32 {
    match group {
        NodeGroup::Center => 3.0,
        NodeGroup::Category => 2.2,
        NodeGroup::Subcategory => 1.6,
        NodeGroup::Cluster => 1.2,
        NodeGroup::Item => 1.0,
    }
}

/// Collision padding per hierarchy level.
pub fn collision_padding(group: NodeGroup) -> f32 {
    match group {
        NodeGroup::Center => 2.0,
        NodeGroup::Category => 1.5,
        NodeGroup::Subcategory => 1.25,
        NodeGroup::Cluster | NodeGroup::Item => 1.0,
    }
}

/// Canonical distance band from the origin per hierarchy level: the sum of
/// the orbit radii down to that level.
pub fn radial_band(group: NodeGroup, orbit: &OrbitConfig) -> f32 {
    NodeGroup::ALL
        .iter()
        .filter(|g| g.depth() > 0 && g.depth() <= group.depth())
        .map(|&g| orbit.radius_for(g))
        .sum()
}

/// Build and register all force parameter functions. Idempotent.
pub fn configure(
    port: &mut dyn SimulationPort,
    viewport: Viewport,
    forces: &ForceConfig,
    orbit: &OrbitConfig,
) {
    let scale = viewport.scale();
    let damping = if viewport.is_small() {
        forces.small_viewport_damping
    } else {
        1.0
    };
    let forces = *forces;
    let orbit = *orbit;

    port.set_node_force(
        NodeForceSlot::Charge,
        Box::new(move |node| {
            forces.charge_base * charge_multiplier(node.group) * node.weight().sqrt() * damping
        }),
    );

    port.set_node_force(
        NodeForceSlot::CollisionRadius,
        Box::new(move |node| {
            forces.node_radius
                * node.weight().sqrt()
                * collision_padding(node.group)
                * forces.collision_padding
        }),
    );

    port.set_node_force(
        NodeForceSlot::RadialDistance,
        Box::new(move |node| radial_band(node.group, &orbit) * scale),
    );

    port.set_node_force(
        NodeForceSlot::RadialStrength,
        Box::new(move |node| {
            if node.group == NodeGroup::Center {
                0.0
            } else {
                forces.radial_strength
            }
        }),
    );

    port.set_link_force(
        LinkForceSlot::Distance,
        Box::new(move |link, graph| {
            let source_w = graph.node(&link.source).map(|n| n.weight()).unwrap_or(1.0);
            let target_w = graph.node(&link.target).map(|n| n.weight()).unwrap_or(1.0);
            let mut distance = forces.link_distance_base * scale
                + forces.size_distance_gain * (source_w.sqrt() + target_w.sqrt());
            // Backbone edges into the upper shells get extra breathing room.
            let is_hierarchy = graph
                .node(&link.target)
                .map(|n| matches!(n.group, NodeGroup::Category | NodeGroup::Subcategory))
                .unwrap_or(false);
            if is_hierarchy {
                distance *= forces.hierarchy_boost;
            }
            // Heavier links pull their endpoints closer together.
            distance / link.value.max(1.0).sqrt()
        }),
    );

    tracing::debug!(
        scale,
        damping,
        width = viewport.width,
        height = viewport.height,
        "registered force parameters"
    );
}
