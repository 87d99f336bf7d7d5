use crate::errors::SessionError;
use motex_core::{Condition, DeviceType};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum SequencerStep {
    /// Still in the same condition.
    Continue { completed: usize, required: usize },
    Advanced { from: Condition, to: Condition },
    Complete,
}

/// Walks the eligible conditions in order, `trials_per_condition` sealed
/// trials each. Aborted trials never count.
#[derive(Debug, Clone)]
pub struct ConditionSequencer {
    conditions: Vec<Condition>,
    trials_per_condition: usize,
    current: usize,
    completed_in_condition: usize,
    aborted_in_condition: usize,
    complete: bool,
}

impl ConditionSequencer {
    /// Keeps the conditions `device` can run.
    pub fn new(
        conditions: Vec<Condition>,
        trials_per_condition: usize,
        device: DeviceType,
    ) -> Result<Self, SessionError> {
        let configured = conditions.len();
        let conditions: Vec<_> = conditions
            .into_iter()
            .filter(|c| c.is_available_on(device))
            .collect();
        if conditions.is_empty() {
            return Err(SessionError::NoEligibleConditions(device));
        }
        if trials_per_condition == 0 {
            return Err(crate::errors::ConfigError::ZeroTrials.into());
        }
        debug!(
            %device,
            eligible = conditions.len(),
            skipped = configured - conditions.len(),
            "conditions filtered"
        );
        Ok(Self {
            conditions,
            trials_per_condition,
            current: 0,
            completed_in_condition: 0,
            aborted_in_condition: 0,
            complete: false,
        })
    }

    /// Active condition, `None` once the session is complete.
    pub fn current(&self) -> Option<&Condition> {
        if self.complete {
            None
        } else {
            self.conditions.get(self.current)
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn condition_index(&self) -> usize {
        self.current
    }

    pub fn trials_per_condition(&self) -> usize {
        self.trials_per_condition
    }

    pub fn completed_in_condition(&self) -> usize {
        self.completed_in_condition
    }

    pub fn aborted_in_condition(&self) -> usize {
        self.aborted_in_condition
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Sealed trials so far and the total the session needs.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.conditions.len() * self.trials_per_condition;
        if self.complete {
            return (total, total);
        }
        (
            self.current * self.trials_per_condition + self.completed_in_condition,
            total,
        )
    }

    /// Condition that takes over if the next sealed trial finishes the
    /// current one. `None` while more trials are needed or on the last one.
    pub fn next_on_seal(&self) -> Option<&Condition> {
        if self.complete || self.completed_in_condition + 1 < self.trials_per_condition {
            return None;
        }
        self.conditions.get(self.current + 1)
    }

    pub fn record_sealed(&mut self) -> SequencerStep {
        if self.complete {
            return SequencerStep::Complete;
        }
        self.completed_in_condition += 1;
        if self.completed_in_condition < self.trials_per_condition {
            return SequencerStep::Continue {
                completed: self.completed_in_condition,
                required: self.trials_per_condition,
            };
        }

        self.completed_in_condition = 0;
        self.aborted_in_condition = 0;
        if self.current + 1 < self.conditions.len() {
            let from = self.conditions[self.current].clone();
            self.current += 1;
            let to = self.conditions[self.current].clone();
            info!(from = %from, to = %to, "condition complete");
            SequencerStep::Advanced { from, to }
        } else {
            self.complete = true;
            info!("all conditions complete");
            SequencerStep::Complete
        }
    }

    /// Counted for reporting only; progress is unchanged.
    pub fn record_aborted(&mut self) {
        if !self.complete {
            self.aborted_in_condition += 1;
        }
    }
}
