//! Session aggregator.
//!
//! Drives phase progression, forwards pointer input to the trial state
//! machine during the task, and turns finished trials into records.

use crate::config::TaskConfig;
use crate::errors::SessionError;
use crate::sequencer::{ConditionSequencer, SequencerStep};
use crate::state::{TrialEvent, TrialStateMachine};
use crate::trial::{FinishedTrial, TrialRecord, TrialSummary};
use motex_core::{Condition, DeviceType, Phase, SessionPhase, TrialOutcome, UnitConverter};
use motex_kinematics::{KinematicExtractor, SessionQuality};
use motex_timing::TimerId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub device: DeviceType,
}

impl Participant {
    pub fn new(id: impl Into<String>, device: DeviceType) -> Self {
        Self {
            id: id.into(),
            device,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Progress inside a trial.
    Trial(TrialEvent),
    TrialRecorded(TrialSummary),
    ConditionChanged { from: String, to: String },
    TaskComplete,
}

pub struct Session<R: Rng, P: Phase = SessionPhase> {
    phase: P,
    config: TaskConfig,
    conditions: Vec<Condition>,
    participant: Option<Participant>,
    converter: Option<UnitConverter>,
    sequencer: Option<ConditionSequencer>,
    machine: TrialStateMachine<R>,
    extractor: KinematicExtractor,
    records: Vec<TrialRecord>,
}

impl<R: Rng, P: Phase> Session<R, P> {
    /// Validates the configuration; nothing runs until the participant is
    /// registered.
    pub fn new(config: TaskConfig, rng: R) -> Result<Self, SessionError> {
        config.validate()?;
        let conditions = config.conditions()?;
        let extractor = KinematicExtractor::new(config.kinematics.clone());
        let machine = TrialStateMachine::new(config.clone(), rng);
        Ok(Self {
            phase: P::default(),
            config,
            conditions,
            participant: None,
            converter: None,
            sequencer: None,
            machine,
            extractor,
            records: Vec::new(),
        })
    }

    pub fn advance_phase(&mut self) -> bool {
        match self.phase.next() {
            Some(next) => {
                debug!(from = ?self.phase, to = ?next, "session phase");
                self.phase = next;
                true
            }
            None => false,
        }
    }

    pub fn register(&mut self, participant: Participant) -> Result<(), SessionError> {
        self.expect_phase(self.phase.is_intake(), "register a participant")?;
        let id = participant.id.trim();
        if id.is_empty() {
            return Err(SessionError::EmptyParticipantId);
        }
        let sequencer = ConditionSequencer::new(
            self.conditions.clone(),
            self.config.session.trials_per_condition,
            participant.device,
        )?;
        if let Some(first) = sequencer.current() {
            // no pointer has been seen yet, so nothing is re-evaluated
            let _ = self.machine.set_mapping(self.config.mapping_for(first));
        }
        info!(
            participant = id,
            device = %participant.device,
            conditions = sequencer.conditions().len(),
            "participant registered"
        );
        self.participant = Some(Participant::new(id, participant.device));
        self.sequencer = Some(sequencer);
        self.queue_next_mapping();
        self.advance_phase();
        Ok(())
    }

    pub fn calibrate(&mut self, converter: UnitConverter) -> Result<(), SessionError> {
        self.expect_phase(self.phase.requires_calibration(), "calibrate")?;
        info!(pixels_per_mm = converter.pixels_per_mm(), "calibrated");
        self.converter = Some(converter);
        self.start_task();
        Ok(())
    }

    /// Runs the task in pixel units only.
    pub fn skip_calibration(&mut self) -> Result<(), SessionError> {
        self.expect_phase(self.phase.requires_calibration(), "skip calibration")?;
        warn!("no calibration, physical units unavailable");
        self.start_task();
        Ok(())
    }

    fn start_task(&mut self) {
        self.extractor.reset();
        self.records.clear();
        self.advance_phase();
        info!("task started");
    }

    fn expect_phase(&self, ok: bool, action: &'static str) -> Result<(), SessionError> {
        if ok {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                action,
                phase: format!("{:?}", self.phase),
            })
        }
    }

    pub fn on_pointer(&mut self, x: f64, y: f64, now_ns: u64) -> Vec<SessionEvent> {
        if !self.phase.allows_input() {
            trace!(phase = ?self.phase, "pointer ignored");
            return Vec::new();
        }
        let events = self.machine.on_pointer(x, y, now_ns);
        self.absorb(events)
    }

    pub fn on_leave(&mut self, now_ns: u64) -> Vec<SessionEvent> {
        if !self.phase.allows_input() {
            return Vec::new();
        }
        let events = self.machine.on_leave(now_ns);
        self.absorb(events)
    }

    pub fn advance(&mut self, now_ns: u64) -> Vec<SessionEvent> {
        if !self.phase.allows_input() {
            return Vec::new();
        }
        let events = self.machine.advance(now_ns);
        self.absorb(events)
    }

    pub fn fire_timer(&mut self, id: TimerId, now_ns: u64) -> Vec<SessionEvent> {
        if !self.phase.allows_input() {
            return Vec::new();
        }
        let events = self.machine.fire_timer(id, now_ns);
        self.absorb(events)
    }

    fn absorb(&mut self, events: Vec<TrialEvent>) -> Vec<SessionEvent> {
        let mut out = Vec::with_capacity(events.len());
        for event in events {
            if self.phase.is_complete() {
                break;
            }
            match event {
                TrialEvent::Sealed(trial) => self.record_sealed(trial, &mut out),
                TrialEvent::Aborted(trial) => self.record_aborted(trial, &mut out),
                other => out.push(SessionEvent::Trial(other)),
            }
        }
        out
    }

    fn record_sealed(&mut self, trial: FinishedTrial, out: &mut Vec<SessionEvent>) {
        let Some(condition) = self
            .sequencer
            .as_ref()
            .and_then(|s| s.current())
            .cloned()
        else {
            warn!(index = trial.index, "sealed trial with no active condition");
            return;
        };

        debug!(
            index = trial.index,
            median_interval_ms = trial.sampling.median_interval_ms,
            rate_hz = trial.sampling.effective_rate_hz,
            dropped = trial.dropped_samples,
            "trial sampling"
        );
        let zone = self.config.geometry.target_zone(trial.target);
        let metrics = self.extractor.extract(
            &condition.name,
            &trial.path,
            &zone,
            self.converter.as_ref(),
        );
        let quality = self.config.quality.assess(&metrics);
        if !quality.valid {
            debug!(index = trial.index, issues = ?quality.issues, "trial flagged");
        }
        let record = TrialRecord {
            index: trial.index,
            condition,
            target: trial.target,
            target_zone: zone,
            outcome: TrialOutcome::Sealed,
            path: trial.path,
            metrics: Some(metrics),
            quality: Some(quality),
            dropped_samples: trial.dropped_samples,
        };
        out.push(SessionEvent::TrialRecorded(record.summary()));
        self.records.push(record);

        let Some(step) = self.sequencer.as_mut().map(ConditionSequencer::record_sealed) else {
            return;
        };
        match step {
            SequencerStep::Continue {
                completed,
                required,
            } => {
                debug!(completed, required, "condition progress");
                self.queue_next_mapping();
            }
            SequencerStep::Advanced { from, to } => {
                // the machine switched to `to`'s mapping when the trial sealed
                self.queue_next_mapping();
                out.push(SessionEvent::ConditionChanged {
                    from: from.name,
                    to: to.name,
                });
            }
            SequencerStep::Complete => {
                self.machine.halt();
                self.advance_phase();
                info!(trials = self.records.len(), "task complete");
                out.push(SessionEvent::TaskComplete);
            }
        }
    }

    /// Hands the machine the mapping to switch to if the next seal ends the
    /// current condition.
    fn queue_next_mapping(&mut self) {
        let next = self
            .sequencer
            .as_ref()
            .and_then(ConditionSequencer::next_on_seal)
            .map(|c| self.config.mapping_for(c));
        self.machine.queue_mapping(next);
    }

    fn record_aborted(&mut self, trial: FinishedTrial, out: &mut Vec<SessionEvent>) {
        let Some(sequencer) = self.sequencer.as_mut() else {
            return;
        };
        let Some(condition) = sequencer.current().cloned() else {
            return;
        };
        sequencer.record_aborted();
        let record = TrialRecord {
            index: trial.index,
            condition,
            target: trial.target,
            target_zone: self.config.geometry.target_zone(trial.target),
            outcome: TrialOutcome::Aborted,
            path: trial.path,
            metrics: None,
            quality: None,
            dropped_samples: trial.dropped_samples,
        };
        out.push(SessionEvent::TrialRecorded(record.summary()));
        self.records.push(record);
    }

    pub fn phase(&self) -> P {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase.is_complete()
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn participant(&self) -> Option<&Participant> {
        self.participant.as_ref()
    }

    pub fn converter(&self) -> Option<&UnitConverter> {
        self.converter.as_ref()
    }

    pub fn machine(&self) -> &TrialStateMachine<R> {
        &self.machine
    }

    pub fn current_condition(&self) -> Option<&Condition> {
        self.sequencer.as_ref().and_then(|s| s.current())
    }

    /// Sealed trials so far and the number required.
    pub fn progress(&self) -> (usize, usize) {
        self.sequencer
            .as_ref()
            .map_or((0, 0), ConditionSequencer::progress)
    }

    /// Every attempted trial, aborted ones included, in order.
    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn sealed_records(&self) -> impl Iterator<Item = &TrialRecord> {
        self.records.iter().filter(|r| r.is_sealed())
    }

    pub fn aborted_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_sealed()).count()
    }

    pub fn latest_summary(&self) -> Option<TrialSummary> {
        self.records.last().map(TrialRecord::summary)
    }

    pub fn quality_report(&self) -> SessionQuality {
        SessionQuality::from_assessments(
            self.records.iter().filter_map(|r| r.quality.as_ref()),
            &self.config.quality,
        )
    }
}
