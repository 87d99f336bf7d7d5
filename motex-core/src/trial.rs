use serde::{Deserialize, Serialize};

/// Trial state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrialPhase {
    #[default]
    Idle,
    Dwelling,
    Cueing,
    Acquiring,
    HoldingTarget,
    Sealed,
    Aborted,
}

impl TrialPhase {
    /// States during which the open path accepts samples.
    pub fn is_recording(&self) -> bool {
        matches!(self, TrialPhase::Acquiring | TrialPhase::HoldingTarget)
    }
}

/// How a trial ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialOutcome {
    Sealed,
    Aborted,
}

impl TrialOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialOutcome::Sealed => "sealed",
            TrialOutcome::Aborted => "aborted",
        }
    }
}
