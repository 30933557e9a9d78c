//! Engine configuration.
//!
//! One canonical tuning set lives in the `Default` impls below; a JSON5
//! config file can override individual values. Every section uses
//! container-level serde defaults so partial files stay valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::graph::NodeGroup;

/// Initial orbital placement tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Orbit radius of category nodes around the center.
    pub category_radius: f32,
    /// Orbit radius of subcategory nodes around their category.
    pub subcategory_radius: f32,
    /// Orbit radius of cluster nodes around their subcategory.
    pub cluster_radius: f32,
    /// Orbit radius of item nodes around their cluster.
    pub item_radius: f32,
    /// Radial jitter strength: radii fall in `[0.9, 0.9 + jitter] × base`.
    pub jitter: f32,
    /// Angular offset of the first child in every spiral.
    pub base_angle: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            category_radius: 320.0,    // First shell sits well clear of the center body
            subcategory_radius: 160.0, // Each deeper shell halves, roughly
            cluster_radius: 90.0,
            item_radius: 50.0,
            jitter: 0.2, // Radii within [0.9, 1.1] of the base
            base_angle: 0.0,
        }
    }
}

impl OrbitConfig {
    /// Base orbit radius for a hierarchy level, before viewport scaling.
    pub fn radius_for(&self, group: NodeGroup) -> f32 {
        match group {
            NodeGroup::Center => 0.0,
            NodeGroup::Category => self.category_radius,
            NodeGroup::Subcategory => self.subcategory_radius,
            NodeGroup::Cluster => self.cluster_radius,
            NodeGroup::Item => self.item_radius,
        }
    }
}

/// Pairwise minimum-separation tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    /// Minimum distance between any two unpinned nodes.
    pub min_distance: f32,
    /// Relaxation passes per call. Bounds total displacement.
    pub passes: usize,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            min_distance: 30.0,
            passes: 4,
        }
    }
}

/// View-axis and occlusion heuristics tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Nodes closer than this to the default view axis get pushed outward.
    pub axis_clearance: f32,
    /// Perpendicular offset per depth rank during de-stacking.
    pub destack_step: f32,
    /// Projected XY distance under which two nodes count as stacked.
    pub destack_threshold: f32,
    /// Reduced separation threshold applied after de-stacking.
    pub destack_min_distance: f32,
    /// Half-width of the occlusion cone behind the center, as a ratio of
    /// depth past the center.
    pub cone_ratio: f32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            axis_clearance: 40.0,
            destack_step: 4.0,
            destack_threshold: 24.0,
            destack_min_distance: 18.0,
            cone_ratio: 0.30,
        }
    }
}

/// Force-parameter derivation tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Base charge strength (negative = repulsion).
    pub charge_base: f32,
    /// Charge multiplier applied on small viewports.
    pub small_viewport_damping: f32,
    /// Base link target distance before size and hierarchy scaling.
    pub link_distance_base: f32,
    /// Extra link distance per unit of endpoint size (square-rooted).
    pub size_distance_gain: f32,
    /// Link-distance boost for category/subcategory edges.
    pub hierarchy_boost: f32,
    /// Collision radius padding factor.
    pub collision_padding: f32,
    /// Base world radius of a rendered node at weight 1.
    pub node_radius: f32,
    /// Strength of the radial anchor pulling groups to their band.
    pub radial_strength: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            charge_base: -120.0,
            small_viewport_damping: 0.6,
            link_distance_base: 60.0,
            size_distance_gain: 6.0,
            hierarchy_boost: 1.6,
            collision_padding: 1.25,
            node_radius: 8.0,
            radial_strength: 0.05,
        }
    }
}

/// Camera framing tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Fixed vertical field of view, degrees.
    pub fov_deg: f32,
    /// Target fill fraction of the frustum; lower = more margin.
    pub fill_fraction: f32,
    /// Device minimum camera distance.
    pub min_distance: f32,
    /// Device maximum camera distance.
    pub max_distance: f32,
    /// Distance multiplier on portrait viewports.
    pub portrait_boost: f32,
    /// Distance multiplier on ultra-wide viewports.
    pub ultrawide_trim: f32,
    /// Parallax offset direction from the centroid (normalized at use).
    pub offset_ratios: [f32; 3],
    /// Default framing animation duration, milliseconds.
    pub animate_ms: u64,
    /// Duration of targeted monitor nudges, milliseconds.
    pub nudge_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 50.0,
            fill_fraction: 0.9,
            min_distance: 180.0,
            max_distance: 5000.0,
            portrait_boost: 1.25,
            ultrawide_trim: 0.92,
            offset_ratios: [0.22, 0.16, 1.0],
            animate_ms: 800,
            nudge_ms: 300,
        }
    }
}

/// Realtime view monitor tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Check interval, milliseconds.
    pub interval_ms: u64,
    /// Cooldown after an adjustment, milliseconds.
    pub cooldown_ms: u64,
    /// Extended pause after the consecutive-adjustment cap, milliseconds.
    pub extended_cooldown_ms: u64,
    /// Off-screen fraction above which a correction is issued.
    pub off_screen_threshold: f32,
    /// Off-screen fraction treated as severe (full reframe at once).
    pub severe_off_screen: f32,
    /// Projected overlap ratio above which a correction is issued.
    pub overlap_threshold: f32,
    /// Overlap ratio treated as severe.
    pub severe_overlap: f32,
    /// NDC visibility margin used for the off-screen test.
    pub margin: f32,
    /// Cap on consecutive adjustments before the extended pause.
    pub max_consecutive: u32,
    /// Node-count budget for the O(n²) projected-overlap scan.
    pub sample_budget: usize,
    /// Base world radius used to estimate on-screen node footprints.
    pub node_radius: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 800,
            cooldown_ms: 2000,
            extended_cooldown_ms: 8000,
            off_screen_threshold: 0.12,
            severe_off_screen: 0.35,
            overlap_threshold: 0.45,
            severe_overlap: 0.75,
            margin: 0.92,
            max_consecutive: 4,
            sample_budget: 64,
            node_radius: 8.0,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Log output format: "text" or "json".
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// RNG seed for reproducible layouts. Absent = seeded from the OS.
    pub seed: Option<u64>,
    /// Resize coalescing window, milliseconds.
    pub resize_debounce_ms: Option<u64>,
    pub orbit: OrbitConfig,
    pub separation: SeparationConfig,
    pub visibility: VisibilityConfig,
    pub forces: ForceConfig,
    pub camera: CameraConfig,
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Resize coalescing window with the reference default applied.
    pub fn resize_debounce_ms(&self) -> u64 {
        self.resize_debounce_ms.unwrap_or(200)
    }
}

/// Load a configuration file in JSON5 format.
pub fn load_config<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    json5::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Load a configuration from a JSON5 string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}

/// Default config file location under the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("orbview").join("config.json5"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config: EngineConfig = parse_config("{}").unwrap();
        assert_eq!(config.orbit.category_radius, 320.0);
        assert_eq!(config.separation.passes, 4);
        assert_eq!(config.camera.fov_deg, 50.0);
        assert_eq!(config.monitor.max_consecutive, 4);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.resize_debounce_ms(), 200);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_override() {
        let json5 = r#"
        {
            seed: 7,
            orbit: {
                jitter: 0.0,
            },
            monitor: {
                interval_ms: 500,
            },
            logging: {
                level: "debug",
                format: "json",
            },
        }
        "#;

        let config: EngineConfig = parse_config(json5).unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.orbit.jitter, 0.0);
        // Untouched fields in an overridden section keep their defaults.
        assert_eq!(config.orbit.category_radius, 320.0);
        assert_eq!(config.monitor.interval_ms, 500);
        assert_eq!(config.monitor.cooldown_ms, 2000);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_radius_for_levels() {
        let orbit = OrbitConfig::default();
        assert_eq!(orbit.radius_for(NodeGroup::Center), 0.0);
        assert!(orbit.radius_for(NodeGroup::Category) > orbit.radius_for(NodeGroup::Subcategory));
        assert!(orbit.radius_for(NodeGroup::Cluster) > orbit.radius_for(NodeGroup::Item));
    }
}
