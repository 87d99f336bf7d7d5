//! Task configuration.
//!
//! One immutable [`TaskConfig`] replaces the arena geometry and timing
//! constants. Every field has a default, so a config file only needs the
//! values it changes.

use crate::errors::ConfigError;
use crate::mapping::VisualMapping;
use motex_core::{Condition, Point, Target};
use motex_kinematics::{KinematicsConfig, QualityThresholds, TargetZone};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    /// Side of the square arena.
    pub game_size_px: f64,
    /// Diameter of a target circle.
    pub target_size_px: f64,
    /// Radius of the center zone.
    pub center_threshold_px: f64,
    /// Gap between a target and the arena edge.
    pub edge_buffer_px: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            game_size_px: 350.0,
            target_size_px: 30.0,
            center_threshold_px: 10.0,
            edge_buffer_px: 10.0,
        }
    }
}

impl Geometry {
    pub fn center(&self) -> Point {
        let half = self.game_size_px / 2.0;
        Point::new(half, half)
    }

    pub fn target_radius(&self) -> f64 {
        self.target_size_px / 2.0
    }

    /// Center of a target circle, inset from its edge by the buffer.
    pub fn target_center(&self, target: Target) -> Point {
        let half = self.game_size_px / 2.0;
        let near = self.edge_buffer_px + self.target_radius();
        let far = self.game_size_px - near;
        match target {
            Target::Top => Point::new(half, near),
            Target::Bottom => Point::new(half, far),
            Target::Left => Point::new(near, half),
            Target::Right => Point::new(far, half),
        }
    }

    pub fn target_zone(&self, target: Target) -> TargetZone {
        TargetZone {
            center: self.target_center(target),
            radius: self.target_radius(),
        }
    }

    pub fn in_center(&self, p: Point) -> bool {
        p.within(&self.center(), self.center_threshold_px)
    }

    pub fn in_target(&self, target: Target, p: Point) -> bool {
        p.within(&self.target_center(target), self.target_radius())
    }

    /// Inside the closed playable square `[0, game_size]²`.
    pub fn in_bounds(&self, p: Point) -> bool {
        (0.0..=self.game_size_px).contains(&p.x) && (0.0..=self.game_size_px).contains(&p.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub center_hold_ms: u64,
    pub target_delay_ms: u64,
    pub target_hold_ms: u64,
    pub sampling_interval_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            center_hold_ms: 2000,
            target_delay_ms: 200,
            target_hold_ms: 500,
            sampling_interval_ms: 10,
        }
    }
}

impl Timing {
    pub fn center_hold(&self) -> Duration {
        Duration::from_millis(self.center_hold_ms)
    }

    pub fn target_delay(&self) -> Duration {
        Duration::from_millis(self.target_delay_ms)
    }

    pub fn target_hold(&self) -> Duration {
        Duration::from_millis(self.target_hold_ms)
    }

    pub fn sampling_interval(&self) -> Duration {
        Duration::from_millis(self.sampling_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub trials_per_condition: usize,
    pub conditions: Vec<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            trials_per_condition: 20,
            conditions: Condition::SUPPORTED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingSettings {
    /// Transform incoming pointer positions per condition. Off when the
    /// pointer source already delivers task-space coordinates.
    pub apply_visual_mapping: bool,
    /// Translation origin for decoupled conditions; `(0, game_size)` when unset.
    pub decoupled_origin: Option<Point>,
}

impl Default for MappingSettings {
    fn default() -> Self {
        Self {
            apply_visual_mapping: true,
            decoupled_origin: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub geometry: Geometry,
    pub timing: Timing,
    pub session: SessionSettings,
    pub mapping: MappingSettings,
    pub kinematics: KinematicsConfig,
    pub quality: QualityThresholds,
}

impl TaskConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.geometry;
        positive("game_size_px", g.game_size_px)?;
        positive("target_size_px", g.target_size_px)?;
        positive("center_threshold_px", g.center_threshold_px)?;
        if g.edge_buffer_px < 0.0 || !g.edge_buffer_px.is_finite() {
            return Err(ConfigError::NonPositive {
                field: "edge_buffer_px",
                value: g.edge_buffer_px,
            });
        }
        if g.center_threshold_px * 2.0 >= g.game_size_px {
            return Err(ConfigError::CenterZone {
                threshold: g.center_threshold_px,
            });
        }

        let t = &self.timing;
        positive("center_hold_ms", t.center_hold_ms as f64)?;
        positive("target_delay_ms", t.target_delay_ms as f64)?;
        positive("target_hold_ms", t.target_hold_ms as f64)?;
        positive("sampling_interval_ms", t.sampling_interval_ms as f64)?;

        if self.session.trials_per_condition == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        self.conditions()?;
        self.kinematics.validate()?;
        Ok(())
    }

    /// The configured conditions, parsed, in order.
    pub fn conditions(&self) -> Result<Vec<Condition>, ConfigError> {
        if self.session.conditions.is_empty() {
            return Err(ConfigError::NoConditions);
        }
        self.session
            .conditions
            .iter()
            .map(|name| name.parse::<Condition>().map_err(ConfigError::from))
            .collect()
    }

    pub fn decoupled_origin(&self) -> Point {
        self.mapping
            .decoupled_origin
            .unwrap_or(Point::new(0.0, self.geometry.game_size_px))
    }

    /// Pointer transform for `condition`; identity when mapping is off.
    pub fn mapping_for(&self, condition: &Condition) -> VisualMapping {
        if !self.mapping.apply_visual_mapping {
            return VisualMapping::identity(self.geometry.game_size_px);
        }
        VisualMapping::for_condition(
            condition,
            self.geometry.game_size_px,
            self.decoupled_origin(),
        )
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
