use motex_core::UnitConverter;
use serde::{Deserialize, Serialize};

/// Derived measures of one sealed trial.
///
/// Pixel-domain values: lengths px, times ms, velocities px/ms,
/// accelerations px/ms². `None` marks a value that cannot be derived from the
/// path (too few samples, no detectable movement, first trial of a condition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub sample_count: usize,
    pub reaction_time_ms: Option<f64>,
    pub movement_time_ms: Option<f64>,
    pub ballistic_movement_time_ms: Option<f64>,
    pub peak_velocity: Option<f64>,
    pub time_to_peak_velocity_ms: Option<f64>,
    pub average_velocity: Option<f64>,
    pub average_acceleration: Option<f64>,
    pub path_length: f64,
    pub ballistic_path_length: Option<f64>,
    pub directness_ratio: f64,
    pub movement_variability: Option<f64>,
    pub endpoint_error: Option<f64>,
    pub absolute_error: Option<f64>,
    pub variable_error: Option<f64>,
    pub movement_units: Option<u32>,
    pub corrective_movements: Option<u32>,
    pub direction_reversals: Option<u32>,
    pub percentage_direction_reversals: Option<f64>,
    pub time_in_target_ms: Option<f64>,
    /// Millimetre-domain copies, present only with a calibration.
    pub physical: Option<PhysicalMetrics>,
}

/// Lengths in mm, velocities in mm/s, accelerations in mm/s².
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalMetrics {
    pub pixels_per_mm: f64,
    pub path_length_mm: f64,
    pub ballistic_path_length_mm: Option<f64>,
    pub movement_variability_mm: Option<f64>,
    pub endpoint_error_mm: Option<f64>,
    pub absolute_error_mm: Option<f64>,
    pub variable_error_mm: Option<f64>,
    pub peak_velocity_mm_s: Option<f64>,
    pub average_velocity_mm_s: Option<f64>,
    pub average_acceleration_mm_s2: Option<f64>,
}

impl PhysicalMetrics {
    pub fn from_pixels(metrics: &Metrics, converter: &UnitConverter) -> Self {
        let mm = |v: Option<f64>| v.map(|px| converter.px_to_mm(px));
        Self {
            pixels_per_mm: converter.pixels_per_mm(),
            path_length_mm: converter.px_to_mm(metrics.path_length),
            ballistic_path_length_mm: mm(metrics.ballistic_path_length),
            movement_variability_mm: mm(metrics.movement_variability),
            endpoint_error_mm: mm(metrics.endpoint_error),
            absolute_error_mm: mm(metrics.absolute_error),
            variable_error_mm: mm(metrics.variable_error),
            peak_velocity_mm_s: metrics
                .peak_velocity
                .map(|v| converter.px_per_ms_to_mm_per_s(v)),
            average_velocity_mm_s: metrics
                .average_velocity
                .map(|v| converter.px_per_ms_to_mm_per_s(v)),
            average_acceleration_mm_s2: metrics
                .average_acceleration
                .map(|a| converter.px_per_ms2_to_mm_per_s2(a)),
        }
    }
}

impl Metrics {
    /// Metrics of a path with no samples at all.
    pub fn empty() -> Self {
        Self {
            sample_count: 0,
            reaction_time_ms: None,
            movement_time_ms: None,
            ballistic_movement_time_ms: None,
            peak_velocity: None,
            time_to_peak_velocity_ms: None,
            average_velocity: None,
            average_acceleration: None,
            path_length: 0.0,
            ballistic_path_length: None,
            directness_ratio: 1.0,
            movement_variability: None,
            endpoint_error: None,
            absolute_error: None,
            variable_error: None,
            movement_units: None,
            corrective_movements: None,
            direction_reversals: None,
            percentage_direction_reversals: None,
            time_in_target_ms: None,
            physical: None,
        }
    }

    pub fn has_movement(&self) -> bool {
        self.reaction_time_ms.is_some()
    }

    /// One-line digest for live display.
    pub fn summary_line(&self) -> String {
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        format!(
            "RT {} ms, MT {} ms, peak {} px/ms, path {:.2} px, directness {:.3}, units {}",
            fmt(self.reaction_time_ms),
            fmt(self.movement_time_ms),
            fmt(self.peak_velocity),
            self.path_length,
            self.directness_ratio,
            self.movement_units
                .map_or_else(|| "-".to_string(), |u| u.to_string()),
        )
    }
}
