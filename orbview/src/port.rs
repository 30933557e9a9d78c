//! The boundary to the underlying 3D rendering and physics library.
//!
//! Layout and camera logic depend only on this trait, never on a concrete
//! library. The real host adapts its renderer to it; tests and the demo
//! binary use [`crate::mock::MockSimulation`].

use std::time::Duration;

use glam::Vec3;

use orbview_common::{CameraPose, Easing, GraphData, Link, Ndc, Node, Viewport};

/// Per-node force parameter function, registered into a pluggable slot.
pub type NodeForceFn = Box<dyn Fn(&Node) -> f32 + Send>;

/// Per-link force parameter function. Receives the graph so endpoint
/// properties can influence the parameter.
pub type LinkForceFn = Box<dyn Fn(&Link, &GraphData) -> f32 + Send>;

/// Pluggable per-node force slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeForceSlot {
    /// Charge/repulsion strength (negative = repulsive).
    Charge,
    /// Collision radius.
    CollisionRadius,
    /// Canonical distance band from the origin.
    RadialDistance,
    /// Strength of the pull towards the radial band.
    RadialStrength,
}

/// Pluggable per-link force slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkForceSlot {
    /// Target link distance.
    Distance,
}

/// Narrow interface over the simulation/rendering host.
///
/// Registering a force replaces any previous function in the same slot, so
/// re-configuration on resize never accumulates state. A new camera command
/// supersedes any in-flight pose animation.
pub trait SimulationPort {
    fn graph(&self) -> &GraphData;

    fn graph_mut(&mut self) -> &mut GraphData;

    /// Replace the dataset wholesale. Re-triggers nothing by itself; the
    /// engine drives the placement pipeline explicitly.
    fn set_graph(&mut self, data: GraphData);

    /// Current size of the rendering surface.
    fn viewport(&self) -> Viewport;

    fn set_node_force(&mut self, slot: NodeForceSlot, f: NodeForceFn);

    fn set_link_force(&mut self, slot: LinkForceSlot, f: LinkForceFn);

    fn camera_pose(&self) -> CameraPose;

    /// Command a camera move. Zero duration applies the pose immediately.
    fn set_camera_pose(&mut self, target: CameraPose, duration: Duration, easing: Easing);

    /// Whether a commanded camera move is still animating.
    fn camera_in_flight(&self) -> bool;

    /// Project a world position through the live camera.
    fn project(&self, point: Vec3) -> Ndc;

    /// Nudge the physics engine after manual position edits.
    fn reheat(&mut self);
}
