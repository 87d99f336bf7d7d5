use motex_core::{Condition, Path, Target, TrialOutcome};
use motex_kinematics::{Metrics, QualityAssessment, TargetZone};
use motex_timing::SamplingStats;
use serde::{Deserialize, Serialize};

/// What the state machine hands out when a trial ends.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedTrial {
    pub index: usize,
    pub target: Target,
    pub outcome: TrialOutcome,
    pub path: Path,
    pub dropped_samples: usize,
    pub sampling: SamplingStats,
}

/// One attempted trial as kept by the session.
///
/// `metrics` and `quality` are only present for sealed trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub index: usize,
    pub condition: Condition,
    pub target: Target,
    pub target_zone: TargetZone,
    pub outcome: TrialOutcome,
    pub path: Path,
    pub metrics: Option<Metrics>,
    pub quality: Option<QualityAssessment>,
    pub dropped_samples: usize,
}

impl TrialRecord {
    pub fn is_sealed(&self) -> bool {
        self.outcome == TrialOutcome::Sealed
    }

    pub fn movement_mode(&self) -> &'static str {
        self.condition.movement_mode()
    }

    pub fn summary(&self) -> TrialSummary {
        TrialSummary {
            index: self.index,
            condition: self.condition.name.clone(),
            target: self.target,
            outcome: self.outcome,
            samples: self.path.len(),
            line: self
                .metrics
                .as_ref()
                .map_or_else(|| "aborted".to_string(), Metrics::summary_line),
        }
    }
}

/// Per-trial digest for a live view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub index: usize,
    pub condition: String,
    pub target: Target,
    pub outcome: TrialOutcome,
    pub samples: usize,
    pub line: String,
}

impl std::fmt::Display for TrialSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "trial {} [{} -> {}] {} samples: {}",
            self.index, self.condition, self.target, self.samples, self.line
        )
    }
}
