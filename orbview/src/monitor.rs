//! Realtime view monitor.
//!
//! Periodically samples projected node screen positions against the live
//! camera and issues corrective camera moves when too many nodes leave the
//! screen or projected footprints overlap too much. Modeled as an explicit
//! three-phase machine (Idle → Checking → Adjusting) with a cooldown
//! timestamp and a capped consecutive-adjustment counter, so corrections
//! can never free-run or overlap.

use std::time::{Duration, Instant};

use glam::Mat3;

use orbview_common::{CameraPose, Easing, MonitorConfig, OverlapPair, ViewCheck};

use crate::camera::{CameraFramer, FramingOptions};
use crate::port::SimulationPort;

/// Monitor phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    Idle,
    Checking,
    Adjusting,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Not due, cooling down, or a camera move is still in flight.
    Skipped,
    /// Check ran; the view is fine.
    Stable,
    /// Targeted correction issued.
    Nudged,
    /// Full immediate reframe issued.
    Reframed,
    /// Consecutive-adjustment cap hit; extended cooldown started.
    Paused,
}

/// Periodic auditor of the live camera/projection.
pub struct ViewMonitor {
    cfg: MonitorConfig,
    phase: MonitorPhase,
    consecutive: u32,
    last_check: Option<Instant>,
    cooldown_until: Option<Instant>,
}

impl ViewMonitor {
    pub fn new(cfg: MonitorConfig) -> Self {
        Self {
            cfg,
            phase: MonitorPhase::Idle,
            consecutive: 0,
            last_check: None,
            cooldown_until: None,
        }
    }

    pub fn phase(&self) -> MonitorPhase {
        self.phase
    }

    pub fn consecutive_adjustments(&self) -> u32 {
        self.consecutive
    }

    /// Advance the monitor. Issues at most one camera command per call.
    pub fn tick(
        &mut self,
        now: Instant,
        port: &mut dyn SimulationPort,
        framer: &CameraFramer,
    ) -> MonitorOutcome {
        // A previous adjustment is still animating: stay in Adjusting so no
        // concurrent camera command can be issued.
        if self.phase == MonitorPhase::Adjusting {
            if port.camera_in_flight() {
                return MonitorOutcome::Skipped;
            }
            self.phase = MonitorPhase::Idle;
        }

        if let Some(last) = self.last_check {
            if now.duration_since(last) < Duration::from_millis(self.cfg.interval_ms) {
                return MonitorOutcome::Skipped;
            }
        }
        if let Some(until) = self.cooldown_until {
            if now < until {
                return MonitorOutcome::Skipped;
            }
        }

        self.last_check = Some(now);
        self.phase = MonitorPhase::Checking;

        let Some(check) = self.check_view(port, framer) else {
            self.phase = MonitorPhase::Idle;
            return MonitorOutcome::Stable;
        };

        let overlap = check.worst_overlap.as_ref().map(|p| p.ratio).unwrap_or(0.0);
        let off = check.off_screen_fraction;
        let violated = off > self.cfg.off_screen_threshold || overlap > self.cfg.overlap_threshold;
        if !violated {
            self.phase = MonitorPhase::Idle;
            self.consecutive = 0;
            return MonitorOutcome::Stable;
        }

        self.phase = MonitorPhase::Adjusting;
        let severe = off >= self.cfg.severe_off_screen || overlap >= self.cfg.severe_overlap;
        let outcome = if self.consecutive == 0 && !severe {
            self.targeted_correction(&check, port, framer);
            MonitorOutcome::Nudged
        } else {
            // A gentle nudge already failed, or the violation is severe:
            // re-frame everything at once, no animation.
            let viewport = port.viewport();
            let current = port.camera_pose();
            if let Some(plan) = framer.fit_all_nodes(
                &port.graph().nodes,
                viewport,
                current,
                FramingOptions {
                    maintain_angle: false,
                    immediate: true,
                },
            ) {
                port.set_camera_pose(plan.target, plan.duration, plan.easing);
            }
            MonitorOutcome::Reframed
        };

        tracing::debug!(
            off_screen = off,
            overlap,
            consecutive = self.consecutive,
            ?outcome,
            "view correction issued"
        );

        self.consecutive += 1;
        if self.consecutive >= self.cfg.max_consecutive {
            self.cooldown_until =
                Some(now + Duration::from_millis(self.cfg.extended_cooldown_ms));
            self.consecutive = 0;
            tracing::warn!(
                pause_ms = self.cfg.extended_cooldown_ms,
                "consecutive-adjustment cap reached, pausing corrections"
            );
            return MonitorOutcome::Paused;
        }
        self.cooldown_until = Some(now + Duration::from_millis(self.cfg.cooldown_ms));
        outcome
    }

    /// Sample every node through the live camera. `None` for an empty graph.
    pub fn check_view(
        &self,
        port: &dyn SimulationPort,
        framer: &CameraFramer,
    ) -> Option<ViewCheck> {
        let graph = port.graph();
        if graph.is_empty() {
            return None;
        }

        let mut off_screen = 0usize;
        let mut projected = Vec::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            let ndc = port.project(node.position);
            if !ndc.on_screen(self.cfg.margin) {
                off_screen += 1;
            }
            projected.push(ndc);
        }
        let off_screen_fraction = off_screen as f32 / graph.nodes.len() as f32;

        // Projected circle-overlap scan, bounded by the sample budget.
        let pose = port.camera_pose();
        let half_v = (framer.config().fov_deg.to_radians() * 0.5).tan();
        let scan = graph.nodes.len().min(self.cfg.sample_budget);
        if scan < graph.nodes.len() {
            tracing::debug!(
                scanned = scan,
                total = graph.nodes.len(),
                "overlap scan truncated to sample budget"
            );
        }

        let mut worst: Option<OverlapPair> = None;
        for i in 0..scan {
            if projected[i].depth < 0.0 {
                continue;
            }
            let r_i = self.ndc_radius(&graph.nodes[i], pose.position, half_v);
            for j in (i + 1)..scan {
                if projected[j].depth < 0.0 {
                    continue;
                }
                let r_j = self.ndc_radius(&graph.nodes[j], pose.position, half_v);
                let dx = projected[i].x - projected[j].x;
                let dy = projected[i].y - projected[j].y;
                let dist = (dx * dx + dy * dy).sqrt();
                let combined = r_i + r_j;
                if dist >= combined {
                    continue;
                }
                let ratio = (combined - dist) / combined;
                if worst.as_ref().map(|w| ratio > w.ratio).unwrap_or(true) {
                    worst = Some(OverlapPair {
                        a: graph.nodes[i].id.clone(),
                        b: graph.nodes[j].id.clone(),
                        ratio,
                    });
                }
            }
        }

        Some(ViewCheck {
            off_screen_fraction,
            worst_overlap: worst,
            sampled: graph.nodes.len(),
        })
    }

    /// Estimated NDC radius of a node's rendered footprint.
    fn ndc_radius(
        &self,
        node: &orbview_common::Node,
        camera_position: glam::Vec3,
        half_v: f32,
    ) -> f32 {
        let world_radius = orbview_common::node_world_radius(node, self.cfg.node_radius);
        let distance = node.position.distance(camera_position).max(1.0);
        world_radius / (distance * half_v)
    }

    /// Small correction for a mild first-time violation.
    fn targeted_correction(
        &self,
        check: &ViewCheck,
        port: &mut dyn SimulationPort,
        framer: &CameraFramer,
    ) {
        let pose = port.camera_pose();
        let nudge = Duration::from_millis(framer.config().nudge_ms);
        let overlap_pair = check.worst_overlap.as_ref().filter(|p| {
            p.ratio > self.cfg.overlap_threshold
                && check.off_screen_fraction <= self.cfg.off_screen_threshold
        });

        let target = if let Some(pair) = overlap_pair {
            // Overlap: swing the camera around the midpoint of the worst
            // pair so the two bodies separate on screen.
            let (pa, pb) = {
                let graph = port.graph();
                match (graph.node(&pair.a), graph.node(&pair.b)) {
                    (Some(a), Some(b)) => (a.position, b.position),
                    _ => return,
                }
            };
            let midpoint = (pa + pb) * 0.5;
            let sign = if port.project(pa).x <= port.project(pb).x {
                1.0
            } else {
                -1.0
            };
            let swing = Mat3::from_rotation_y(sign * 0.2);
            CameraPose {
                position: midpoint + swing * (pose.position - midpoint),
                look_at: pose.look_at,
            }
        } else {
            // Off-screen: zoom out proportionally with a slight angular
            // shift so re-checks see a genuinely different view.
            let distance = pose.distance() * (1.0 + check.off_screen_fraction);
            let shifted = Mat3::from_rotation_y(0.05) * pose.outward();
            CameraPose {
                position: pose.look_at + shifted * distance,
                look_at: pose.look_at,
            }
        };

        port.set_camera_pose(target, nudge, Easing::CubicInOut);
    }
}
