//! Engine façade.
//!
//! `ViewerEngine` owns the configuration, the seeded RNG, the camera
//! framer, the view monitor and the resize debouncer, and phase-gates the
//! placement pipeline: placement completes synchronously before forces are
//! registered and before the first framing call. Everything runs within
//! the host's timer callbacks; there are no threads and no locks.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use orbview_common::{EngineConfig, FrameReport, GraphData, Result, Viewport};

use crate::camera::{CameraFramer, FramingOptions};
use crate::layout;
use crate::monitor::{MonitorOutcome, ViewMonitor};
use crate::port::SimulationPort;

/// Coalesces bursts of resize events into a single recomputation.
#[derive(Debug)]
pub struct ResizeDebouncer {
    window: Duration,
    pending: Option<(Viewport, Instant)>,
}

impl ResizeDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a resize. Later events replace earlier ones and restart the
    /// coalescing window.
    pub fn signal(&mut self, viewport: Viewport, now: Instant) {
        self.pending = Some((viewport, now));
    }

    /// Take the matured resize, if the window has elapsed since the last
    /// event. Returns at most once per burst.
    pub fn poll(&mut self, now: Instant) -> Option<Viewport> {
        let (viewport, at) = self.pending?;
        if now.duration_since(at) < self.window {
            return None;
        }
        self.pending = None;
        Some(viewport)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// The engine instance the host constructs and drives. No ambient state:
/// all configuration lives here and is passed down by reference.
pub struct ViewerEngine {
    config: EngineConfig,
    rng: SmallRng,
    framer: CameraFramer,
    monitor: ViewMonitor,
    resize: ResizeDebouncer,
}

impl ViewerEngine {
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let framer = CameraFramer::new(config.camera);
        let monitor = ViewMonitor::new(config.monitor);
        let resize = ResizeDebouncer::new(Duration::from_millis(config.resize_debounce_ms()));
        Self {
            config,
            rng,
            framer,
            monitor,
            resize,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn framer(&self) -> &CameraFramer {
        &self.framer
    }

    pub fn monitor(&self) -> &ViewMonitor {
        &self.monitor
    }

    /// Install a dataset and run the full pipeline: placement, force
    /// registration, reheat, initial framing. Returns the framing report.
    ///
    /// Truly invalid shapes fail here with a diagnostic log; an empty
    /// dataset is a logged no-op.
    pub fn load(
        &mut self,
        port: &mut dyn SimulationPort,
        data: GraphData,
    ) -> Result<Option<FrameReport>> {
        if let Err(e) = data.validate() {
            tracing::error!(error = %e, "rejecting dataset");
            return Err(e);
        }
        if data.is_empty() {
            tracing::debug!("empty dataset, leaving prior state untouched");
            return Ok(None);
        }

        port.set_graph(data);
        let viewport = port.viewport();

        // The placement pipeline completes for every hierarchy level before
        // the physics engine starts and before the first framing call.
        layout::place_all(port.graph_mut(), viewport, &self.config, &mut self.rng);
        layout::forces::configure(port, viewport, &self.config.forces, &self.config.orbit);
        port.reheat();

        Ok(self.frame(port, viewport, FramingOptions::default()))
    }

    /// Queue a viewport change; bursts inside the debounce window coalesce
    /// into one recomputation at the next tick.
    pub fn handle_resize(&mut self, viewport: Viewport, now: Instant) {
        self.resize.signal(viewport, now);
    }

    /// Periodic driver: drains a matured resize, then runs the monitor.
    pub fn tick(&mut self, now: Instant, port: &mut dyn SimulationPort) -> MonitorOutcome {
        if let Some(viewport) = self.resize.poll(now) {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "applying debounced resize"
            );
            layout::forces::configure(port, viewport, &self.config.forces, &self.config.orbit);
            let _ = self.frame(
                port,
                viewport,
                FramingOptions {
                    maintain_angle: true,
                    immediate: false,
                },
            );
        }

        self.monitor.tick(now, port, &self.framer)
    }

    /// Compute and issue a framing move; returns its report.
    pub fn frame(
        &mut self,
        port: &mut dyn SimulationPort,
        viewport: Viewport,
        options: FramingOptions,
    ) -> Option<FrameReport> {
        let current = port.camera_pose();
        let plan = self
            .framer
            .fit_all_nodes(&port.graph().nodes, viewport, current, options)?;
        port.set_camera_pose(plan.target, plan.duration, plan.easing);
        tracing::info!(
            distance = plan.report.distance,
            centroid = ?plan.report.centroid,
            "camera framing issued"
        );
        Some(plan.report)
    }
}
