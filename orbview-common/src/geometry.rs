//! Geometry primitives shared by the layout, camera and monitor modules.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::graph::{Node, NodeId};

/// Size of the rendering surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height. Guards against a zero-height surface.
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    pub fn is_portrait(&self) -> bool {
        self.aspect() < 1.0
    }

    pub fn is_ultrawide(&self) -> bool {
        self.aspect() > 2.0
    }

    /// Surfaces under this size get damped forces and tighter radii.
    pub fn is_small(&self) -> bool {
        self.width.min(self.height) < 600.0
    }

    /// Viewport-derived layout scaling factor, clamped so extreme surfaces
    /// do not collapse or explode the orbit radii.
    pub fn scale(&self) -> f32 {
        (self.width.min(self.height) / 800.0).clamp(0.55, 1.6)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

/// Camera position and look-at target. The field of view is a fixed
/// engine constant; the distance is derived, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }

    /// Distance from the camera to its look-at target.
    pub fn distance(&self) -> f32 {
        self.position.distance(self.look_at)
    }

    /// Unit vector from the look-at target towards the camera.
    pub fn outward(&self) -> Vec3 {
        (self.position - self.look_at)
            .try_normalize()
            .unwrap_or(Vec3::Z)
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 600.0),
            look_at: Vec3::ZERO,
        }
    }
}

/// Normalized device coordinates of a projected point.
///
/// `x` and `y` are in `[-1, 1]` when the point is on screen; `depth` is the
/// normalized depth in `[0, 1]`, negative when the point sits behind the
/// near plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ndc {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl Ndc {
    /// Whether the point lies inside the screen margin.
    pub fn on_screen(&self, margin: f32) -> bool {
        self.depth >= 0.0
            && self.depth <= 1.0
            && self.x.abs() <= margin
            && self.y.abs() <= margin
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Bounding box of a point set. `None` for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full extents along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners, used for frustum-containment checks.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }
}

/// Ephemeral metrics of the current node set, recomputed per framing call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GraphMetrics {
    /// Axis-aligned bounding box of all node positions.
    pub bounds: Bounds,
    /// Importance-weighted centroid, the camera's look-at target.
    pub centroid: Vec3,
    /// Maximum node distance from the centroid.
    pub radius: f32,
}

/// The most-overlapping projected node pair found by a view check.
#[derive(Debug, Clone, Serialize)]
pub struct OverlapPair {
    pub a: NodeId,
    pub b: NodeId,
    /// Overlap ratio of the projected circles: 0 = touching, 1 = concentric.
    pub ratio: f32,
}

/// Result of sampling projected node positions against the live camera.
#[derive(Debug, Clone, Serialize)]
pub struct ViewCheck {
    /// Fraction of nodes projected outside the visibility margin.
    pub off_screen_fraction: f32,
    /// Worst projected circle-overlap pair, if the pair scan ran.
    pub worst_overlap: Option<OverlapPair>,
    /// Number of nodes sampled.
    pub sampled: usize,
}

/// Metrics/debug report attached to every framing plan.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub distance: f32,
    pub bounds: Bounds,
    pub centroid: Vec3,
    pub off_screen_fraction: Option<f32>,
    pub max_overlap: Option<f32>,
}

/// Easing applied to camera-pose transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Cubic ease-in-out, the default for framing moves.
    #[default]
    CubicInOut,
    Linear,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` to eased progress.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }
}

/// Linear interpolation between two camera poses at eased progress `t`.
pub fn lerp_pose(from: &CameraPose, to: &CameraPose, t: f32) -> CameraPose {
    CameraPose {
        position: from.position.lerp(to.position, t),
        look_at: from.look_at.lerp(to.look_at, t),
    }
}

/// Estimated world-space radius of a node's rendered footprint.
pub fn node_world_radius(node: &Node, base_radius: f32) -> f32 {
    base_radius * node.weight().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_scale_clamps() {
        assert_eq!(Viewport::new(80.0, 60.0).scale(), 0.55);
        assert_eq!(Viewport::new(4000.0, 4000.0).scale(), 1.6);
        let vp = Viewport::new(1024.0, 768.0);
        assert!((vp.scale() - 0.96).abs() < 1e-6);
    }

    #[test]
    fn test_viewport_aspect_flags() {
        assert!(Viewport::new(600.0, 900.0).is_portrait());
        assert!(Viewport::new(2600.0, 1080.0).is_ultrawide());
        assert!(!Viewport::default().is_portrait());
    }

    #[test]
    fn test_pose_distance() {
        let pose = CameraPose::new(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO);
        assert!((pose.distance() - 100.0).abs() < 1e-6);
        assert_eq!(pose.outward(), Vec3::Z);
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = Bounds::from_points([
            Vec3::new(-1.0, 2.0, 0.0),
            Vec3::new(3.0, -4.0, 5.0),
        ])
        .unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -4.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 2.0, 5.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, -1.0, 2.5));
        assert!(Bounds::from_points([]).is_none());
    }

    #[test]
    fn test_ndc_on_screen() {
        let inside = Ndc {
            x: 0.5,
            y: -0.5,
            depth: 0.4,
        };
        assert!(inside.on_screen(0.9));
        let outside = Ndc {
            x: 0.95,
            y: 0.0,
            depth: 0.4,
        };
        assert!(!outside.on_screen(0.9));
        let behind = Ndc {
            x: 0.0,
            y: 0.0,
            depth: -1.0,
        };
        assert!(!behind.on_screen(0.9));
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::CubicInOut, Easing::Linear] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
        // Cubic in-out crosses the midpoint at one half.
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-6);
        // Slow start compared to linear.
        assert!(Easing::CubicInOut.apply(0.2) < 0.2);
    }

    #[test]
    fn test_lerp_pose() {
        let from = CameraPose::new(Vec3::ZERO, Vec3::ZERO);
        let to = CameraPose::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let mid = lerp_pose(&from, &to, 0.5);
        assert_eq!(mid.position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(mid.look_at, Vec3::new(1.0, 0.0, 0.0));
    }
}
