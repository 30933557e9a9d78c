//! Camera framing engine.
//!
//! Computes camera poses that keep the whole node set inside the view
//! frustum, and plans eased transitions towards them. The fitting distance
//! is derived from the graph bounding box and a fixed vertical field of
//! view; a direction-independent bounding-sphere term makes the frustum
//! containment hold for any viewing angle.

use std::time::Duration;

use glam::{Mat4, Vec3};

use orbview_common::{
    CameraConfig, CameraPose, Easing, FrameReport, GraphMetrics, Ndc, Node, Viewport,
};

use crate::metrics;

/// Near clip plane used for projection checks.
pub const NEAR_PLANE: f32 = 0.1;
/// Far clip plane used for projection checks.
pub const FAR_PLANE: f32 = 50_000.0;

/// Project a world point through a camera pose. Shared by the headless
/// simulation and the view monitor's screen-position sampling.
pub fn project_point(pose: &CameraPose, viewport: Viewport, fov_deg: f32, point: Vec3) -> Ndc {
    let view = Mat4::look_at_rh(pose.position, pose.look_at, Vec3::Y);
    let proj = Mat4::perspective_rh(
        fov_deg.to_radians(),
        viewport.aspect(),
        NEAR_PLANE,
        FAR_PLANE,
    );
    let clip = proj * view * point.extend(1.0);
    if clip.w <= 1e-6 {
        // Behind the near plane; definitely off screen.
        return Ndc {
            x: 2.0,
            y: 2.0,
            depth: -1.0,
        };
    }
    Ndc {
        x: clip.x / clip.w,
        y: clip.y / clip.w,
        depth: clip.z / clip.w,
    }
}

/// Options for a framing call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FramingOptions {
    /// Keep the current camera direction and only rescale the distance.
    pub maintain_angle: bool,
    /// Apply the pose with zero duration instead of animating.
    pub immediate: bool,
}

/// A computed camera move: target pose, transition, and debug report.
#[derive(Debug, Clone)]
pub struct FramingPlan {
    pub target: CameraPose,
    pub duration: Duration,
    pub easing: Easing,
    pub report: FrameReport,
}

/// Computes camera poses that frame the current node set.
#[derive(Debug, Clone)]
pub struct CameraFramer {
    cfg: CameraConfig,
}

impl CameraFramer {
    pub fn new(cfg: CameraConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.cfg
    }

    /// Compute the pose that fits every node, or `None` for an empty set.
    pub fn fit_all_nodes(
        &self,
        nodes: &[Node],
        viewport: Viewport,
        current: CameraPose,
        options: FramingOptions,
    ) -> Option<FramingPlan> {
        let metrics = metrics::compute(nodes)?;
        let distance = self.required_distance(&metrics, viewport);

        let direction = if options.maintain_angle {
            (current.position - metrics.centroid)
                .try_normalize()
                .unwrap_or_else(|| self.default_direction())
        } else {
            self.default_direction()
        };

        let target = CameraPose {
            position: metrics.centroid + direction * distance,
            look_at: metrics.centroid,
        };
        let duration = if options.immediate {
            Duration::ZERO
        } else {
            Duration::from_millis(self.cfg.animate_ms)
        };

        Some(FramingPlan {
            target,
            duration,
            easing: Easing::CubicInOut,
            report: FrameReport {
                distance,
                bounds: metrics.bounds,
                centroid: metrics.centroid,
                off_screen_fraction: None,
                max_overlap: None,
            },
        })
    }

    /// Fixed parallax offset direction used in the default framing mode.
    fn default_direction(&self) -> Vec3 {
        Vec3::from_array(self.cfg.offset_ratios)
            .try_normalize()
            .unwrap_or(Vec3::Z)
    }

    /// Minimum camera distance that keeps the bounding box in the frustum.
    fn required_distance(&self, metrics: &GraphMetrics, viewport: Viewport) -> f32 {
        let half_v_angle = self.cfg.fov_deg.to_radians() * 0.5;
        let half_v = half_v_angle.tan();
        let half_h = half_v * viewport.aspect();
        let half_h_angle = half_h.atan();
        let half_min_angle = half_v_angle.min(half_h_angle);

        let extent = metrics.bounds.extent();
        // Fit the box face extents, plus depth allowance for the near face.
        let d_width = extent.x * 0.5 / half_h;
        let d_height = extent.y * 0.5 / half_v;
        let d_planar = d_width.max(d_height) + extent.z * 0.5;

        // Bounding-sphere fit over the box corners: holds regardless of the
        // viewing direction.
        let corner_radius = metrics
            .bounds
            .corners()
            .iter()
            .map(|c| c.distance(metrics.centroid))
            .fold(0.0, f32::max);
        let d_sphere = corner_radius / half_min_angle.sin().max(1e-4);

        let mut distance = d_planar.max(d_sphere) / self.cfg.fill_fraction;

        if viewport.is_portrait() {
            distance *= self.cfg.portrait_boost;
        } else if viewport.is_ultrawide() {
            distance *= self.cfg.ultrawide_trim;
        }

        distance.clamp(self.cfg.min_distance, self.cfg.max_distance)
    }
}
