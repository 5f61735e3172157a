use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Camera home pose and lens, restored whenever a show is disposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 10.0],
            target: [0.0, 0.0, 0.0],
            fov: 35.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

/// Host-level settings for a reel runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Nominal step in seconds when the host drives a fixed timestep (default: 1/60).
    pub fixed_dt: f32,
    /// Capacity reserved for packed render instances (default: 4096).
    pub max_instances: usize,
    pub camera: CameraConfig,
    /// Show activated on start. Empty means the first registered show.
    pub default_show: String,
    /// Base seed mixed with each show's id for its RNG.
    pub seed: u64,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_instances: 4096,
            camera: CameraConfig::default(),
            default_show: String::new(),
            seed: 42,
        }
    }
}

impl ReelConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
