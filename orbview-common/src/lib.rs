//! Orbview Common Library
//!
//! Shared types and utilities for the Orbview spatial layout engine:
//!
//! - [`graph`] - Node/link dataset model (`Node`, `NodeGroup`, `GraphData`)
//! - [`geometry`] - Viewport, camera pose, NDC, bounds and report types
//! - [`config`] - Engine tuning configuration (JSON5 format)
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;

// Re-export commonly used types at the crate root
pub use config::{
    CameraConfig, EngineConfig, ForceConfig, LogFormat, LoggingConfig, MonitorConfig, OrbitConfig,
    SeparationConfig, VisibilityConfig, default_config_path, load_config, parse_config,
};
pub use error::{Error, Result};
pub use geometry::{
    Bounds, CameraPose, Easing, FrameReport, GraphMetrics, Ndc, OverlapPair, ViewCheck, Viewport,
    lerp_pose, node_world_radius,
};
pub use graph::{GraphData, Link, Node, NodeGroup, NodeId};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
