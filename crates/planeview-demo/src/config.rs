//! Runtime configuration for the demo.

use std::path::PathBuf;

use planeview_core::ProjectionMode;

/// Default output image path.
const DEFAULT_OUTPUT: &str = "planeview-demo.png";
/// Default edge length of the synthetic images.
const DEFAULT_SIZE: usize = 256;

/// Runtime configuration for the Planeview demo.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Where the projected raster is written.
    pub output: PathBuf,
    /// Width and height of the synthetic input images.
    pub size: usize,
    /// How the result is displayed.
    pub mode: ProjectionMode,
    /// Optional calculator settings JSON file.
    pub settings_path: Option<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            output: std::env::var("PLANEVIEW_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT)),
            size: std::env::var("PLANEVIEW_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&s| s > 0)
                .unwrap_or(DEFAULT_SIZE),
            mode: std::env::var("PLANEVIEW_MODE")
                .ok()
                .and_then(|s| serde_json::from_value(serde_json::Value::String(s)).ok())
                .unwrap_or(ProjectionMode::Composite),
            settings_path: std::env::var("PLANEVIEW_SETTINGS").ok().map(PathBuf::from),
        }
    }
}
