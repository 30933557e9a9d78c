//! Orbview - spatial layout and camera framing engine.
//!
//! Keeps a physically-simulated 3D point cloud legible: orbital placement
//! before the physics settles, overlap and occlusion resolution, viewport-
//! scaled force parametrization, frustum-fitting camera poses, and a
//! self-correcting realtime view monitor. The underlying 3D/physics
//! library sits behind [`port::SimulationPort`].

pub mod camera;
pub mod engine;
pub mod layout;
pub mod metrics;
pub mod mock;
pub mod monitor;
pub mod port;

// Re-export commonly used types
pub use camera::{CameraFramer, FramingOptions, FramingPlan};
pub use engine::{ResizeDebouncer, ViewerEngine};
pub use monitor::{MonitorOutcome, MonitorPhase, ViewMonitor};
pub use port::{LinkForceSlot, NodeForceSlot, SimulationPort};
