//! Stage Configuration
//!
//! Every tunable of the stage lives here: animation scheduling constants,
//! billboard layout rules, the panel list and the dropdown action table.
//! All sections deserialize with defaults, so a JSON file only needs the
//! keys it wants to change:
//!
//! ```json
//! {
//!   "director": { "face_clip_index": 2, "min_interval_ms": 2000 },
//!   "panels": [
//!     { "label": "Portfolio", "url": "https://example.com" },
//!     { "label": "Links", "menu": [ { "label": "Music", "action": "music" } ] }
//!   ],
//!   "actions": { "music": "https://example.com/music" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StageError};

/// Animation director tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorSettings {
    /// Index of the clip whose morph tracks drive the face. `None` disables
    /// face animation and treats every clip as a body clip.
    pub face_clip_index: Option<usize>,
    /// Default crossfade length in seconds.
    pub crossfade_duration: f32,
    /// Scheduler interval bounds in milliseconds (inclusive).
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    /// Ping-pong window as fractions of the clip duration.
    pub forward_at: f32,
    pub reverse_at: f32,
    /// Random seek window for transitions, as fractions of the duration.
    pub random_start_min: f32,
    pub random_start_max: f32,
    /// Fixed RNG seed; random when absent.
    pub seed: Option<u64>,
}

impl Default for DirectorSettings {
    fn default() -> Self {
        Self {
            face_clip_index: Some(4),
            crossfade_duration: 0.5,
            min_interval_ms: 3000,
            max_interval_ms: 6000,
            forward_at: 0.1,
            reverse_at: 0.9,
            random_start_min: 0.1,
            random_start_max: 0.75,
            seed: None,
        }
    }
}

/// Billboard layout rules. Lengths are world units, widths are CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Viewports narrower than this use the stacked mobile layout.
    pub mobile_breakpoint: f32,
    pub mobile_scale: f32,
    pub desktop_scale: f32,
    /// Width at which panels reach their full scale.
    pub reference_width: f32,

    pub mobile_spacing: f32,
    pub mobile_lift: f32,
    pub mobile_forward: f32,

    pub desktop_spacing: f32,
    pub desktop_spacing_cap: f32,
    pub desktop_lift: f32,

    /// Unscaled panel quad size.
    pub panel_width: f32,
    pub panel_height: f32,

    /// Dropdown children hang below their parent at this pitch (times scale).
    pub dropdown_spacing: f32,
    pub dropdown_forward: f32,

    /// Head anchor sits this far above the top of the model bounds' half height.
    pub head_clearance: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 568.0,
            mobile_scale: 1.8,
            desktop_scale: 1.0,
            reference_width: 1000.0,
            mobile_spacing: 0.9,
            mobile_lift: 0.7,
            mobile_forward: 0.2,
            desktop_spacing: 1.2,
            desktop_spacing_cap: 1.2,
            desktop_lift: 0.5,
            panel_width: 1.0,
            panel_height: 0.5,
            dropdown_spacing: 0.6,
            dropdown_forward: 0.05,
            head_clearance: 0.5,
        }
    }
}

/// Responsive camera placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub base_width: f32,
    pub base_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Orbit zoom limits relative to the computed distance.
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.01,
            far: 10000.0,
            base_width: 1920.0,
            base_distance: 5.0,
            min_distance: 2.5,
            max_distance: 5.5,
            zoom_in_factor: 0.6,
            zoom_out_factor: 1.5,
        }
    }
}

/// One entry of a panel's dropdown menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    /// Key into [`StageConfig::actions`].
    pub action: String,
}

/// What activating a panel does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelTarget {
    Url(String),
    Menu(Vec<MenuItem>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub label: String,
    #[serde(flatten)]
    pub target: PanelTarget,
}

impl PanelConfig {
    #[must_use]
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: PanelTarget::Url(url.into()),
        }
    }

    #[must_use]
    pub fn menu(label: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            label: label.into(),
            target: PanelTarget::Menu(items),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub director: DirectorSettings,
    pub layout: LayoutSettings,
    pub camera: CameraSettings,
    pub panels: Vec<PanelConfig>,
    /// Dropdown action id -> URL.
    pub actions: BTreeMap<String, String>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            director: DirectorSettings::default(),
            layout: LayoutSettings::default(),
            camera: CameraSettings::default(),
            panels: vec![
                PanelConfig::url("Ambiguous", "https://www.instagram.com/ambig_art/"),
                PanelConfig::url("Portfolio", "https://manifold.gallery/noah"),
                PanelConfig::url(
                    "Music",
                    "https://open.spotify.com/artist/3MvKEZQDRekYz5G9UBldff?si=B5c-uHGARW2HEBpjVJovew",
                ),
            ],
            actions: BTreeMap::new(),
        }
    }
}

impl StageConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: StageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                StageError::AssetNotFound(path.display().to_string())
            } else {
                StageError::IoError(err)
            }
        })?;
        Self::from_json_str(&text)
    }

    /// Rejects values the director or layout cannot work with.
    pub fn validate(&self) -> Result<()> {
        let d = &self.director;
        if d.min_interval_ms > d.max_interval_ms {
            return Err(StageError::InvalidConfig(format!(
                "min_interval_ms ({}) exceeds max_interval_ms ({})",
                d.min_interval_ms, d.max_interval_ms
            )));
        }
        if !(0.0..=1.0).contains(&d.forward_at)
            || !(0.0..=1.0).contains(&d.reverse_at)
            || d.forward_at >= d.reverse_at
        {
            return Err(StageError::InvalidConfig(format!(
                "ping-pong window [{}, {}] must satisfy 0 <= forward_at < reverse_at <= 1",
                d.forward_at, d.reverse_at
            )));
        }
        if !(0.0..=1.0).contains(&d.random_start_min)
            || !(0.0..=1.0).contains(&d.random_start_max)
            || d.random_start_min > d.random_start_max
        {
            return Err(StageError::InvalidConfig(format!(
                "random start window [{}, {}] must lie within [0, 1]",
                d.random_start_min, d.random_start_max
            )));
        }
        if d.crossfade_duration < 0.0 || !d.crossfade_duration.is_finite() {
            return Err(StageError::InvalidConfig(
                "crossfade_duration must be a finite, non-negative number".to_string(),
            ));
        }
        if self.layout.mobile_breakpoint <= 0.0 || self.layout.reference_width <= 0.0 {
            return Err(StageError::InvalidConfig(
                "layout widths must be positive".to_string(),
            ));
        }
        for panel in &self.panels {
            if let PanelTarget::Menu(items) = &panel.target
                && items.is_empty()
            {
                return Err(StageError::InvalidConfig(format!(
                    "panel '{}' has an empty menu",
                    panel.label
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_scene() {
        let config = StageConfig::default();
        assert_eq!(config.director.face_clip_index, Some(4));
        assert_eq!(config.director.min_interval_ms, 3000);
        assert_eq!(config.director.max_interval_ms, 6000);
        assert_eq!(config.panels.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StageConfig::from_json_str(
            r#"{
                "director": { "face_clip_index": null, "seed": 7 },
                "panels": [
                    { "label": "Site", "url": "https://example.com" },
                    { "label": "Links", "menu": [ { "label": "Music", "action": "music" } ] }
                ],
                "actions": { "music": "https://example.com/music" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.director.face_clip_index, None);
        assert_eq!(config.director.seed, Some(7));
        assert!((config.director.crossfade_duration - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.panels[0].target, PanelTarget::Url("https://example.com".into()));
        assert!(matches!(&config.panels[1].target, PanelTarget::Menu(items) if items.len() == 1));
        assert_eq!(config.actions.get("music").map(String::as_str), Some("https://example.com/music"));
    }

    #[test]
    fn inverted_interval_is_rejected() {
        let result = StageConfig::from_json_str(
            r#"{ "director": { "min_interval_ms": 5000, "max_interval_ms": 1000 } }"#,
        );
        assert!(matches!(result, Err(StageError::InvalidConfig(_))));
    }

    #[test]
    fn empty_menu_is_rejected() {
        let mut config = StageConfig::default();
        config.panels.push(PanelConfig::menu("Empty", Vec::new()));
        assert!(matches!(config.validate(), Err(StageError::InvalidConfig(_))));
    }
}
