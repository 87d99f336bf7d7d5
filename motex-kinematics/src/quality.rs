//! Trial validity and quality scoring.
//!
//! A trial is invalid when its reaction time, movement time or directness
//! falls outside physiological bounds; valid trials get a weighted score in
//! `[0, 1]`.

use crate::metrics::Metrics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub min_reaction_time_ms: f64,
    pub max_reaction_time_ms: f64,
    pub good_reaction_time_ms: f64,
    pub min_movement_time_ms: f64,
    pub max_movement_time_ms: f64,
    pub good_movement_time_ms: f64,
    pub min_directness: f64,
    pub good_directness: f64,
    pub max_movement_units: u32,
    pub max_corrections: u32,
    pub reaction_time_weight: f64,
    pub movement_time_weight: f64,
    pub directness_weight: f64,
    pub smoothness_weight: f64,
    pub corrections_weight: f64,
    /// Score at or above which a trial counts as high quality
    pub high_quality_score: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_reaction_time_ms: 100.0,
            max_reaction_time_ms: 1000.0,
            good_reaction_time_ms: 150.0,
            min_movement_time_ms: 200.0,
            max_movement_time_ms: 3000.0,
            good_movement_time_ms: 1500.0,
            min_directness: 0.5,
            good_directness: 0.8,
            max_movement_units: 10,
            max_corrections: 5,
            reaction_time_weight: 0.3,
            movement_time_weight: 0.3,
            directness_weight: 0.2,
            smoothness_weight: 0.1,
            corrections_weight: 0.1,
            high_quality_score: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub valid: bool,
    pub score: f64,
    pub issues: Vec<String>,
}

impl QualityThresholds {
    pub fn assess(&self, metrics: &Metrics) -> QualityAssessment {
        let mut valid = true;
        let mut issues = Vec::new();

        let rt_score = match metrics.reaction_time_ms {
            None => {
                valid = false;
                issues.push("No movement onset detected".to_string());
                0.0
            }
            Some(rt) if rt < self.min_reaction_time_ms => {
                valid = false;
                issues.push(format!("Reaction time too fast: {rt:.1}ms"));
                0.0
            }
            Some(rt) if rt > self.max_reaction_time_ms => {
                valid = false;
                issues.push(format!("Reaction time too slow: {rt:.1}ms"));
                0.0
            }
            Some(rt) => falloff(
                rt,
                self.good_reaction_time_ms,
                self.max_reaction_time_ms,
            ),
        };

        let mt_score = match metrics.movement_time_ms {
            None => 0.0,
            Some(mt) if mt < self.min_movement_time_ms => {
                valid = false;
                issues.push(format!("Movement time too fast: {mt:.1}ms"));
                0.0
            }
            Some(mt) if mt > self.max_movement_time_ms => {
                valid = false;
                issues.push(format!("Movement time too slow: {mt:.1}ms"));
                0.0
            }
            Some(mt) => falloff(
                mt,
                self.good_movement_time_ms,
                self.max_movement_time_ms,
            ),
        };

        let directness = metrics.directness_ratio;
        let directness_score = if directness < self.min_directness {
            valid = false;
            issues.push(format!("Path too indirect: {directness:.3}"));
            0.0
        } else {
            ((directness - self.min_directness) / (self.good_directness - self.min_directness))
                .clamp(0.0, 1.0)
        };

        let units = metrics.movement_units.unwrap_or(1);
        let smoothness_score = if units > self.max_movement_units {
            issues.push(format!("Jerky movement: {units} units"));
            (1.0 - (units - self.max_movement_units) as f64 / 10.0).max(0.0)
        } else {
            1.0
        };

        let corrections = metrics.corrective_movements.unwrap_or(0);
        let corrections_score = if corrections > self.max_corrections {
            issues.push(format!("Many corrections: {corrections}"));
            (1.0 - (corrections - self.max_corrections) as f64 / 5.0).max(0.0)
        } else {
            1.0
        };

        let score = if valid {
            rt_score * self.reaction_time_weight
                + mt_score * self.movement_time_weight
                + directness_score * self.directness_weight
                + smoothness_score * self.smoothness_weight
                + corrections_score * self.corrections_weight
        } else {
            0.0
        };

        QualityAssessment {
            valid,
            score,
            issues,
        }
    }
}

/// 1 at or below `good`, falling linearly to 0 at `max`.
fn falloff(value: f64, good: f64, max: f64) -> f64 {
    (1.0 - (value - good) / (max - good)).clamp(0.0, 1.0)
}

/// Aggregate over a session's assessed trials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionQuality {
    pub total_trials: usize,
    pub valid_trials: usize,
    pub high_quality_trials: usize,
    pub mean_quality_score: f64,
}

impl SessionQuality {
    pub fn from_assessments<'a, I>(assessments: I, thresholds: &QualityThresholds) -> Self
    where
        I: IntoIterator<Item = &'a QualityAssessment>,
    {
        let mut summary = Self::default();
        let mut score_sum = 0.0;
        for a in assessments {
            summary.total_trials += 1;
            if a.valid {
                summary.valid_trials += 1;
                score_sum += a.score;
                if a.score >= thresholds.high_quality_score {
                    summary.high_quality_trials += 1;
                }
            }
        }
        if summary.valid_trials > 0 {
            summary.mean_quality_score = score_sum / summary.valid_trials as f64;
        }
        summary
    }
}
