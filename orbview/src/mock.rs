//! Headless simulation port and dataset generator.
//!
//! `MockSimulation` stands in for the real rendering/physics host in tests
//! and demo mode: it stores the graph and registered force functions,
//! integrates a small 3D force step (charge repulsion, link springs,
//! radial anchors, collision separation, damping), animates camera
//! commands, and projects through a perspective camera.

use std::collections::HashMap;
use std::time::Duration;

use glam::Vec3;
use rand::Rng;

use orbview_common::{
    CameraPose, Easing, GraphData, Link, Ndc, Node, NodeGroup, Viewport, lerp_pose,
};

use crate::camera;
use crate::port::{LinkForceFn, LinkForceSlot, NodeForceFn, NodeForceSlot, SimulationPort};

/// Velocity damping per step.
const DAMPING: f32 = 0.85;
/// Velocity clamp per step.
const MAX_VELOCITY: f32 = 20.0;
/// Cooling decay per step.
const ALPHA_DECAY: f32 = 0.975;
/// Below this the simulation is considered settled.
const ALPHA_MIN: f32 = 0.02;
/// Spring constant for link attraction.
const SPRING: f32 = 0.01;

struct CameraAnimation {
    from: CameraPose,
    to: CameraPose,
    duration: Duration,
    easing: Easing,
    elapsed: Duration,
}

/// In-process stand-in for the 3D/physics library.
pub struct MockSimulation {
    graph: GraphData,
    viewport: Viewport,
    fov_deg: f32,
    node_forces: HashMap<NodeForceSlot, NodeForceFn>,
    link_forces: HashMap<LinkForceSlot, LinkForceFn>,
    camera: CameraPose,
    animation: Option<CameraAnimation>,
    alpha: f32,
}

impl MockSimulation {
    pub fn new(viewport: Viewport, fov_deg: f32) -> Self {
        Self {
            graph: GraphData::default(),
            viewport,
            fov_deg,
            node_forces: HashMap::new(),
            link_forces: HashMap::new(),
            camera: CameraPose::default(),
            animation: None,
            alpha: 0.0,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Remaining simulation energy, 0 when settled.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Where the camera is headed: the in-flight target, or the current
    /// pose when no animation is running.
    pub fn camera_target(&self) -> CameraPose {
        self.animation
            .as_ref()
            .map(|a| a.to)
            .unwrap_or(self.camera)
    }

    /// Evaluate a registered per-node force for a node id.
    pub fn node_force(&self, slot: NodeForceSlot, id: &str) -> Option<f32> {
        let f = self.node_forces.get(&slot)?;
        self.graph.node(id).map(|n| f(n))
    }

    /// Evaluate a registered per-link force for a link index.
    pub fn link_force(&self, slot: LinkForceSlot, index: usize) -> Option<f32> {
        let f = self.link_forces.get(&slot)?;
        self.graph.links.get(index).map(|l| f(l, &self.graph))
    }

    /// Advance the camera animation and, while hot, the force integrator.
    pub fn step(&mut self, dt: Duration) {
        self.advance_camera(dt);
        if self.alpha >= ALPHA_MIN {
            self.physics_step();
            self.alpha *= ALPHA_DECAY;
        }
    }

    fn advance_camera(&mut self, dt: Duration) {
        let Some(anim) = &mut self.animation else {
            return;
        };
        anim.elapsed += dt;
        let t = anim.elapsed.as_secs_f32() / anim.duration.as_secs_f32();
        if t >= 1.0 {
            self.camera = anim.to;
            self.animation = None;
        } else {
            self.camera = lerp_pose(&anim.from, &anim.to, anim.easing.apply(t));
        }
    }

    /// One force-directed iteration over all nodes.
    fn physics_step(&mut self) {
        let n = self.graph.nodes.len();
        if n < 2 {
            return;
        }

        let charge = self.node_forces.get(&NodeForceSlot::Charge);
        let collision = self.node_forces.get(&NodeForceSlot::CollisionRadius);
        let radial_distance = self.node_forces.get(&NodeForceSlot::RadialDistance);
        let radial_strength = self.node_forces.get(&NodeForceSlot::RadialStrength);
        let link_distance = self.link_forces.get(&LinkForceSlot::Distance);

        let charges: Vec<f32> = self
            .graph
            .nodes
            .iter()
            .map(|node| charge.map(|f| f(node)).unwrap_or(0.0))
            .collect();
        let radii: Vec<f32> = self
            .graph
            .nodes
            .iter()
            .map(|node| collision.map(|f| f(node)).unwrap_or(0.0))
            .collect();

        let mut forces = vec![Vec3::ZERO; n];

        // Charge repulsion between all pairs.
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = self.graph.nodes[i].position - self.graph.nodes[j].position;
                let dist = delta.length().max(1.0);
                let strength = (charges[i].abs() + charges[j].abs()) * 0.5;
                let push = delta / dist * (strength / (dist * dist)) * self.alpha;
                forces[i] += push;
                forces[j] -= push;
            }
        }

        // Spring attraction along links towards the target distance.
        if let Some(link_distance) = link_distance {
            let index = self.graph.index();
            let targets: Vec<(usize, usize, f32)> = self
                .graph
                .links
                .iter()
                .filter_map(|link| {
                    let si = *index.get(link.source.as_str())?;
                    let ti = *index.get(link.target.as_str())?;
                    Some((si, ti, link_distance(link, &self.graph)))
                })
                .collect();
            for (si, ti, target) in targets {
                let delta = self.graph.nodes[ti].position - self.graph.nodes[si].position;
                let dist = delta.length().max(1.0);
                let pull = delta / dist * (SPRING * (dist - target)) * self.alpha;
                forces[si] += pull;
                forces[ti] -= pull;
            }
        }

        // Radial anchor towards each group's canonical band.
        if let (Some(radial_distance), Some(radial_strength)) = (radial_distance, radial_strength) {
            for (i, node) in self.graph.nodes.iter().enumerate() {
                let r = node.position.length();
                if r < 1e-4 {
                    continue;
                }
                let target = radial_distance(node);
                let strength = radial_strength(node);
                forces[i] += node.position / r * ((target - r) * strength) * self.alpha;
            }
        }

        // Integrate.
        for (i, node) in self.graph.nodes.iter_mut().enumerate() {
            if node.is_pinned() {
                node.velocity = Vec3::ZERO;
                continue;
            }
            node.velocity = (node.velocity + forces[i]) * DAMPING;
            let speed = node.velocity.length();
            if speed > MAX_VELOCITY {
                node.velocity *= MAX_VELOCITY / speed;
            }
            node.position += node.velocity;
        }

        // Collision: positional separation of overlapping footprints.
        for i in 0..n {
            for j in (i + 1)..n {
                let min_dist = radii[i] + radii[j];
                if min_dist <= 0.0 {
                    continue;
                }
                let a_pinned = self.graph.nodes[i].is_pinned();
                let b_pinned = self.graph.nodes[j].is_pinned();
                if a_pinned && b_pinned {
                    continue;
                }
                let delta = self.graph.nodes[j].position - self.graph.nodes[i].position;
                let dist = delta.length();
                if dist >= min_dist || dist < 1e-4 {
                    continue;
                }
                let push = delta / dist * ((min_dist - dist) * 0.5);
                match (a_pinned, b_pinned) {
                    (false, false) => {
                        self.graph.nodes[i].position -= push;
                        self.graph.nodes[j].position += push;
                    }
                    (true, false) => self.graph.nodes[j].position += push * 2.0,
                    (false, true) => self.graph.nodes[i].position -= push * 2.0,
                    (true, true) => unreachable!(),
                }
            }
        }
    }
}

impl SimulationPort for MockSimulation {
    fn graph(&self) -> &GraphData {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut GraphData {
        &mut self.graph
    }

    fn set_graph(&mut self, data: GraphData) {
        self.graph = data;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_node_force(&mut self, slot: NodeForceSlot, f: NodeForceFn) {
        self.node_forces.insert(slot, f);
    }

    fn set_link_force(&mut self, slot: LinkForceSlot, f: LinkForceFn) {
        self.link_forces.insert(slot, f);
    }

    fn camera_pose(&self) -> CameraPose {
        self.camera
    }

    fn set_camera_pose(&mut self, target: CameraPose, duration: Duration, easing: Easing) {
        if duration.is_zero() {
            self.camera = target;
            self.animation = None;
            return;
        }
        // A new command supersedes any in-flight animation.
        self.animation = Some(CameraAnimation {
            from: self.camera,
            to: target,
            duration,
            easing,
            elapsed: Duration::ZERO,
        });
    }

    fn camera_in_flight(&self) -> bool {
        self.animation.is_some()
    }

    fn project(&self, point: Vec3) -> Ndc {
        camera::project_point(&self.camera, self.viewport, self.fov_deg, point)
    }

    fn reheat(&mut self) {
        self.alpha = 1.0;
    }
}

/// Generate a seeded hierarchical dataset for demo mode and tests.
pub fn dataset(
    rng: &mut impl Rng,
    categories: usize,
    subcategories_per_category: usize,
    items_per_subcategory: usize,
) -> GraphData {
    let mut nodes = Vec::new();
    let mut links = Vec::new();

    let mut center = Node::new("center", NodeGroup::Center, None);
    center.size = 20.0;
    nodes.push(center);

    for c in 0..categories {
        let cat_id = format!("cat-{}", c);
        let mut cat = Node::new(cat_id.clone(), NodeGroup::Category, Some("center".into()));
        cat.size = 8.0 + rng.random::<f32>() * 4.0;
        nodes.push(cat);
        links.push(Link {
            source: "center".into(),
            target: cat_id.clone(),
            value: 2.0,
        });

        for s in 0..subcategories_per_category {
            let sub_id = format!("{}-sub-{}", cat_id, s);
            let mut sub = Node::new(sub_id.clone(), NodeGroup::Subcategory, Some(cat_id.clone()));
            sub.size = 4.0 + rng.random::<f32>() * 2.0;
            nodes.push(sub);
            links.push(Link {
                source: cat_id.clone(),
                target: sub_id.clone(),
                value: 1.5,
            });

            for i in 0..items_per_subcategory {
                let item_id = format!("{}-item-{}", sub_id, i);
                let mut item = Node::new(item_id.clone(), NodeGroup::Item, Some(sub_id.clone()));
                item.size = 1.0 + rng.random::<f32>() * 1.5;
                nodes.push(item);
                links.push(Link {
                    source: sub_id.clone(),
                    target: item_id,
                    value: 1.0,
                });
            }
        }
    }

    GraphData { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn two_body_port() -> MockSimulation {
        let mut port = MockSimulation::new(Viewport::default(), 50.0);
        let mut a = Node::new("a", NodeGroup::Item, None);
        a.position = Vec3::new(-20.0, 0.0, 0.0);
        let mut b = Node::new("b", NodeGroup::Item, None);
        b.position = Vec3::new(20.0, 0.0, 0.0);
        port.set_graph(GraphData {
            nodes: vec![a, b],
            links: Vec::new(),
        });
        port.set_node_force(NodeForceSlot::Charge, Box::new(|_| -500.0));
        port
    }

    #[test]
    fn test_step_repulsion() {
        let mut port = two_body_port();
        port.reheat();
        port.step(Duration::from_millis(16));

        // Node a moves further left, node b further right.
        assert!(port.graph().nodes[0].velocity.x < 0.0);
        assert!(port.graph().nodes[1].velocity.x > 0.0);
    }

    #[test]
    fn test_pinned_node_stays_at_rest() {
        let mut port = two_body_port();
        port.graph_mut().nodes[0].pin = Some(Vec3::new(-20.0, 0.0, 0.0));
        port.reheat();
        for _ in 0..10 {
            port.step(Duration::from_millis(16));
        }
        assert_eq!(port.graph().nodes[0].position, Vec3::new(-20.0, 0.0, 0.0));
        assert_eq!(port.graph().nodes[0].velocity, Vec3::ZERO);
        assert!(port.graph().nodes[1].position.x > 20.0);
    }

    #[test]
    fn test_simulation_cools_down() {
        let mut port = two_body_port();
        port.reheat();
        assert_eq!(port.alpha(), 1.0);
        for _ in 0..200 {
            port.step(Duration::from_millis(16));
        }
        assert!(port.alpha() < ALPHA_MIN);
    }

    #[test]
    fn test_spring_pulls_to_target_distance() {
        let mut port = two_body_port();
        port.node_forces.clear();
        port.graph_mut().links.push(Link {
            source: "a".into(),
            target: "b".into(),
            value: 1.0,
        });
        // Endpoints start 40 apart; the spring wants 10.
        port.set_link_force(LinkForceSlot::Distance, Box::new(|_, _| 10.0));
        port.reheat();
        port.step(Duration::from_millis(16));
        assert!(port.graph().nodes[0].velocity.x > 0.0);
        assert!(port.graph().nodes[1].velocity.x < 0.0);
    }

    #[test]
    fn test_camera_animation_eases_to_target() {
        let mut port = MockSimulation::new(Viewport::default(), 50.0);
        let target = CameraPose::new(Vec3::new(0.0, 0.0, 1000.0), Vec3::ZERO);
        port.set_camera_pose(target, Duration::from_millis(400), Easing::CubicInOut);
        assert!(port.camera_in_flight());

        port.step(Duration::from_millis(200));
        assert!(port.camera_in_flight());
        let mid = port.camera_pose();
        assert!(mid.position.z > CameraPose::default().position.z);
        assert!(mid.position.z < 1000.0);

        port.step(Duration::from_millis(300));
        assert!(!port.camera_in_flight());
        assert_eq!(port.camera_pose().position, target.position);
    }

    #[test]
    fn test_new_camera_command_supersedes() {
        let mut port = MockSimulation::new(Viewport::default(), 50.0);
        let first = CameraPose::new(Vec3::new(0.0, 0.0, 1000.0), Vec3::ZERO);
        let second = CameraPose::new(Vec3::new(500.0, 0.0, 0.0), Vec3::ZERO);
        port.set_camera_pose(first, Duration::from_millis(400), Easing::CubicInOut);
        port.step(Duration::from_millis(100));
        port.set_camera_pose(second, Duration::from_millis(400), Easing::CubicInOut);
        assert_eq!(port.camera_target().position, second.position);

        port.step(Duration::from_millis(500));
        assert_eq!(port.camera_pose().position, second.position);
    }

    #[test]
    fn test_zero_duration_is_immediate() {
        let mut port = MockSimulation::new(Viewport::default(), 50.0);
        let target = CameraPose::new(Vec3::new(0.0, 200.0, 400.0), Vec3::ZERO);
        port.set_camera_pose(target, Duration::ZERO, Easing::CubicInOut);
        assert!(!port.camera_in_flight());
        assert_eq!(port.camera_pose().position, target.position);
    }

    #[test]
    fn test_dataset_shape() {
        let mut rng = SmallRng::seed_from_u64(1);
        let graph = dataset(&mut rng, 3, 2, 2);
        assert_eq!(graph.nodes.len(), 1 + 3 + 6 + 12);
        assert_eq!(graph.links.len(), 3 + 6 + 12);
        assert!(graph.validate().is_ok());
        assert_eq!(graph.center().unwrap().id, "center");
    }

    #[test]
    fn test_dataset_is_seed_deterministic() {
        let a = dataset(&mut SmallRng::seed_from_u64(9), 2, 2, 1);
        let b = dataset(&mut SmallRng::seed_from_u64(9), 2, 2, 1);
        for (x, y) in a.nodes.iter().zip(b.nodes.iter()) {
            assert_eq!(x.size, y.size);
        }
    }
}
