//! Trial state machine.
//!
//! `Idle → Dwelling → Cueing → Acquiring ⇄ HoldingTarget → Sealed`, with
//! `Aborted` reachable from the two recording states. Every wait is a one-shot
//! timer owned by the machine; leaving a state cancels its timer, and a timer
//! that fires with an id the machine no longer holds is ignored.
//!
//! Nothing here reads a clock. Callers pass `now_ns` with every trigger and
//! each due timer is applied at its own due time before the trigger itself.

use crate::config::TaskConfig;
use crate::mapping::VisualMapping;
use crate::recorder::PathRecorder;
use crate::trial::FinishedTrial;
use motex_core::{Point, Target, TrialOutcome, TrialPhase};
use motex_timing::{Scheduler, TimerId};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Dwell,
    Cue,
    Hold,
    Sample,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrialEvent {
    DwellStarted,
    DwellBroken,
    TargetCued { index: usize, target: Target },
    AcquisitionStarted { index: usize },
    TargetEntered,
    TargetExited,
    Sealed(FinishedTrial),
    Aborted(FinishedTrial),
}

#[derive(Debug, Default)]
struct Timers {
    dwell: Option<TimerId>,
    cue: Option<TimerId>,
    hold: Option<TimerId>,
    sample: Option<TimerId>,
}

impl Timers {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerId> {
        match kind {
            TimerKind::Dwell => &mut self.dwell,
            TimerKind::Cue => &mut self.cue,
            TimerKind::Hold => &mut self.hold,
            TimerKind::Sample => &mut self.sample,
        }
    }

    fn get(&self, kind: TimerKind) -> Option<TimerId> {
        match kind {
            TimerKind::Dwell => self.dwell,
            TimerKind::Cue => self.cue,
            TimerKind::Hold => self.hold,
            TimerKind::Sample => self.sample,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveTrial {
    index: usize,
    target: Target,
}

pub struct TrialStateMachine<R: Rng> {
    config: TaskConfig,
    mapping: VisualMapping,
    mapping_on_seal: Option<VisualMapping>,
    rng: R,
    phase: TrialPhase,
    scheduler: Scheduler<TimerKind>,
    timers: Timers,
    recorder: PathRecorder,
    raw_pointer: Option<Point>,
    pointer: Option<Point>,
    active: Option<ActiveTrial>,
    trials_started: usize,
    clock_ns: u64,
}

impl<R: Rng> TrialStateMachine<R> {
    pub fn new(config: TaskConfig, rng: R) -> Self {
        let mapping = VisualMapping::identity(config.geometry.game_size_px);
        Self {
            config,
            mapping,
            mapping_on_seal: None,
            rng,
            phase: TrialPhase::Idle,
            scheduler: Scheduler::new(),
            timers: Timers::default(),
            recorder: PathRecorder::new(),
            raw_pointer: None,
            pointer: None,
            active: None,
            trials_started: 0,
            clock_ns: 0,
        }
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Replaces the pointer transform and re-maps the latest raw position.
    ///
    /// Between trials the center test is re-run on the re-mapped position, so
    /// a dwell never rests on where the pointer appeared under the previous
    /// transform.
    pub fn set_mapping(&mut self, mapping: VisualMapping) -> Vec<TrialEvent> {
        let mut events = Vec::new();
        self.remap(mapping);
        let between_trials = matches!(self.phase, TrialPhase::Idle | TrialPhase::Dwelling);
        if let Some(p) = self.pointer.filter(|_| between_trials) {
            self.evaluate(p, self.clock_ns, &mut events);
        }
        events
    }

    /// Transform to switch to when the current trial seals, before the
    /// center is re-checked for the next one. `None` keeps the current one.
    pub fn queue_mapping(&mut self, mapping: Option<VisualMapping>) {
        self.mapping_on_seal = mapping;
    }

    pub fn mapping(&self) -> &VisualMapping {
        &self.mapping
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    /// Target of the trial being cued or acquired.
    pub fn target(&self) -> Option<Target> {
        self.active.map(|a| a.target)
    }

    /// Latest pointer position in task space, after mapping.
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Trials that reached the cue, sealed or not.
    pub fn trials_started(&self) -> usize {
        self.trials_started
    }

    pub fn recorded_samples(&self) -> usize {
        self.recorder.len()
    }

    pub fn pending_timer(&self, kind: TimerKind) -> Option<TimerId> {
        self.timers.get(kind)
    }

    pub fn armed_timers(&self) -> usize {
        self.scheduler.armed_count()
    }

    /// When the next timer falls due, for callers that sleep between triggers.
    pub fn next_deadline_ns(&self) -> Option<u64> {
        self.scheduler.next_due_ns()
    }

    pub fn on_pointer(&mut self, x: f64, y: f64, now_ns: u64) -> Vec<TrialEvent> {
        let mut events = self.advance(now_ns);
        let now_ns = self.clock_ns;
        let raw = Point::new(x, y);
        let p = self.mapping.apply(raw);
        trace!(x = p.x, y = p.y, now_ns, "pointer");
        self.raw_pointer = Some(raw);
        self.pointer = Some(p);
        self.evaluate(p, now_ns, &mut events);
        events
    }

    /// The pointer left the surface or the window.
    pub fn on_leave(&mut self, now_ns: u64) -> Vec<TrialEvent> {
        let mut events = self.advance(now_ns);
        let now_ns = self.clock_ns;
        self.raw_pointer = None;
        self.pointer = None;
        match self.phase {
            TrialPhase::Dwelling => self.break_dwell(&mut events),
            TrialPhase::Acquiring | TrialPhase::HoldingTarget => {
                self.abort(now_ns, "pointer left", &mut events)
            }
            _ => {}
        }
        events
    }

    /// Fires every timer due at or before `now_ns`, earliest first.
    pub fn advance(&mut self, now_ns: u64) -> Vec<TrialEvent> {
        let mut events = Vec::new();
        while let Some(timer) = self.scheduler.pop_due(now_ns) {
            self.clock_ns = self.clock_ns.max(timer.due_ns);
            self.dispatch(timer.kind, timer.id, timer.due_ns, &mut events);
        }
        self.clock_ns = self.clock_ns.max(now_ns);
        events
    }

    /// Delivers one timer from an external scheduler. Cancelled or already
    /// fired ids are no-ops.
    pub fn fire_timer(&mut self, id: TimerId, now_ns: u64) -> Vec<TrialEvent> {
        let mut events = Vec::new();
        match self.scheduler.take(id) {
            Some(timer) => {
                self.clock_ns = self.clock_ns.max(now_ns);
                self.dispatch(timer.kind, id, self.clock_ns, &mut events);
            }
            None => debug!(id = id.raw(), "stale timer ignored"),
        }
        events
    }

    /// Cancels every timer and drops any open path without emitting a trial.
    pub fn halt(&mut self) {
        for kind in [
            TimerKind::Dwell,
            TimerKind::Cue,
            TimerKind::Hold,
            TimerKind::Sample,
        ] {
            self.cancel(kind);
        }
        self.recorder.discard();
        self.active = None;
        self.mapping_on_seal = None;
        self.phase = TrialPhase::Idle;
        debug!("state machine halted");
    }

    fn dispatch(&mut self, kind: TimerKind, id: TimerId, at_ns: u64, events: &mut Vec<TrialEvent>) {
        let slot = self.timers.slot(kind);
        if *slot != Some(id) {
            debug!(?kind, id = id.raw(), "stale timer ignored");
            return;
        }
        *slot = None;

        match (kind, self.phase) {
            (TimerKind::Dwell, TrialPhase::Dwelling) => self.cue(at_ns, events),
            (TimerKind::Cue, TrialPhase::Cueing) => self.start_acquisition(at_ns, events),
            (TimerKind::Sample, TrialPhase::Acquiring | TrialPhase::HoldingTarget) => {
                self.tick(at_ns)
            }
            (TimerKind::Hold, TrialPhase::HoldingTarget) => self.seal(at_ns, events),
            (kind, phase) => warn!(?kind, ?phase, "timer fired outside its state"),
        }
    }

    fn evaluate(&mut self, p: Point, now_ns: u64, events: &mut Vec<TrialEvent>) {
        let geometry = &self.config.geometry;
        let in_center = geometry.in_center(p);
        let in_bounds = geometry.in_bounds(p);
        let in_target = self
            .active
            .is_some_and(|a| geometry.in_target(a.target, p));

        match self.phase {
            TrialPhase::Idle | TrialPhase::Sealed | TrialPhase::Aborted => {
                if in_center {
                    self.start_dwell(now_ns, events);
                }
            }
            TrialPhase::Dwelling => {
                if !in_center {
                    self.break_dwell(events);
                }
            }
            TrialPhase::Cueing => {}
            TrialPhase::Acquiring => {
                if !in_bounds {
                    self.abort(now_ns, "pointer out of bounds", events);
                } else if in_target {
                    self.enter_hold(now_ns, events);
                }
            }
            TrialPhase::HoldingTarget => {
                if !in_bounds {
                    self.abort(now_ns, "pointer out of bounds", events);
                } else if !in_target {
                    self.cancel(TimerKind::Hold);
                    self.phase = TrialPhase::Acquiring;
                    debug!(now_ns, "left target before hold elapsed");
                    events.push(TrialEvent::TargetExited);
                }
            }
        }
    }

    fn start_dwell(&mut self, now_ns: u64, events: &mut Vec<TrialEvent>) {
        let hold = self.config.timing.center_hold();
        self.arm(TimerKind::Dwell, now_ns, hold);
        self.phase = TrialPhase::Dwelling;
        debug!(now_ns, "dwell started");
        events.push(TrialEvent::DwellStarted);
    }

    fn break_dwell(&mut self, events: &mut Vec<TrialEvent>) {
        self.cancel(TimerKind::Dwell);
        self.phase = TrialPhase::Idle;
        debug!("dwell broken");
        events.push(TrialEvent::DwellBroken);
    }

    fn cue(&mut self, at_ns: u64, events: &mut Vec<TrialEvent>) {
        let target = Target::ALL[self.rng.random_range(0..Target::ALL.len())];
        let index = self.trials_started;
        self.trials_started += 1;
        self.active = Some(ActiveTrial { index, target });
        let delay = self.config.timing.target_delay();
        self.arm(TimerKind::Cue, at_ns, delay);
        self.phase = TrialPhase::Cueing;
        info!(index, %target, "target cued");
        events.push(TrialEvent::TargetCued { index, target });
    }

    fn start_acquisition(&mut self, at_ns: u64, events: &mut Vec<TrialEvent>) {
        let index = self.active.map_or(self.trials_started, |a| a.index);
        self.recorder.open(at_ns);
        self.phase = TrialPhase::Acquiring;
        events.push(TrialEvent::AcquisitionStarted { index });

        let Some(p) = self.pointer else {
            self.abort(at_ns, "no pointer at acquisition start", events);
            return;
        };
        self.recorder.record(p, at_ns);
        let interval = self.config.timing.sampling_interval();
        self.arm(TimerKind::Sample, at_ns, interval);
        debug!(index, at_ns, "acquisition started");
        self.evaluate(p, at_ns, events);
    }

    fn tick(&mut self, at_ns: u64) {
        if let Some(p) = self.pointer {
            self.recorder.record(p, at_ns);
        }
        let interval = self.config.timing.sampling_interval();
        self.arm(TimerKind::Sample, at_ns, interval);
    }

    fn enter_hold(&mut self, now_ns: u64, events: &mut Vec<TrialEvent>) {
        let hold = self.config.timing.target_hold();
        self.arm(TimerKind::Hold, now_ns, hold);
        self.phase = TrialPhase::HoldingTarget;
        debug!(now_ns, "target entered");
        events.push(TrialEvent::TargetEntered);
    }

    fn seal(&mut self, at_ns: u64, events: &mut Vec<TrialEvent>) {
        self.cancel(TimerKind::Sample);
        self.phase = TrialPhase::Sealed;
        if let Some(trial) = self.finish(TrialOutcome::Sealed) {
            info!(
                index = trial.index,
                samples = trial.path.len(),
                "trial sealed"
            );
            events.push(TrialEvent::Sealed(trial));
        }
        if let Some(next) = self.mapping_on_seal.take() {
            self.remap(next);
        }
        self.reset(at_ns, events);
    }

    fn abort(&mut self, at_ns: u64, reason: &'static str, events: &mut Vec<TrialEvent>) {
        self.cancel(TimerKind::Hold);
        self.cancel(TimerKind::Sample);
        self.phase = TrialPhase::Aborted;
        if let Some(trial) = self.finish(TrialOutcome::Aborted) {
            warn!(index = trial.index, reason, "trial aborted");
            events.push(TrialEvent::Aborted(trial));
        }
        self.reset(at_ns, events);
    }

    fn finish(&mut self, outcome: TrialOutcome) -> Option<FinishedTrial> {
        let Some(active) = self.active.take() else {
            warn!(?outcome, "no active trial to finish");
            self.recorder.discard();
            return None;
        };
        let sampling = self.recorder.sampling_stats();
        let dropped_samples = self.recorder.dropped();
        Some(FinishedTrial {
            index: active.index,
            target: active.target,
            outcome,
            path: self.recorder.freeze(),
            dropped_samples,
            sampling,
        })
    }

    fn remap(&mut self, mapping: VisualMapping) {
        debug!(?mapping, "visual mapping changed");
        self.mapping = mapping;
        self.pointer = self.raw_pointer.map(|raw| mapping.apply(raw));
    }

    /// Back to `Idle`, then re-run the zone tests on the latest pointer.
    fn reset(&mut self, at_ns: u64, events: &mut Vec<TrialEvent>) {
        self.phase = TrialPhase::Idle;
        if let Some(p) = self.pointer {
            self.evaluate(p, at_ns, events);
        }
    }

    fn arm(&mut self, kind: TimerKind, at_ns: u64, delay: Duration) {
        self.cancel(kind);
        let id = self.scheduler.schedule(kind, at_ns, delay);
        *self.timers.slot(kind) = Some(id);
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(id) = self.timers.slot(kind).take() {
            self.scheduler.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motex_core::Condition;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const MS: u64 = 1_000_000;

    fn machine() -> TrialStateMachine<StdRng> {
        TrialStateMachine::new(TaskConfig::default(), StdRng::seed_from_u64(7))
    }

    /// Dwell and cue, leaving the machine in `Acquiring` at 2200 ms.
    fn acquiring() -> TrialStateMachine<StdRng> {
        let mut m = machine();
        m.on_pointer(175.0, 175.0, 0);
        m.advance(2_200 * MS);
        assert_eq!(m.phase(), TrialPhase::Acquiring);
        m
    }

    fn target_point(m: &TrialStateMachine<StdRng>) -> Point {
        let target = m.target().unwrap();
        m.config().geometry.target_center(target)
    }

    #[test]
    fn early_exit_from_center_never_cues() {
        let mut m = machine();
        assert_eq!(m.on_pointer(175.0, 175.0, 0), [TrialEvent::DwellStarted]);
        assert_eq!(m.phase(), TrialPhase::Dwelling);

        assert_eq!(m.on_pointer(200.0, 175.0, 1_500 * MS), [TrialEvent::DwellBroken]);
        assert!(m.advance(10_000 * MS).is_empty());
        assert_eq!(m.phase(), TrialPhase::Idle);
        assert_eq!(m.armed_timers(), 0);
        assert_eq!(m.trials_started(), 0);
    }

    #[test]
    fn dwell_then_cue_then_acquire() {
        let mut m = machine();
        m.on_pointer(175.0, 175.0, 0);
        assert!(m.advance(1_999 * MS).is_empty());

        let events = m.advance(2_000 * MS);
        assert!(matches!(events[..], [TrialEvent::TargetCued { index: 0, .. }]));
        assert_eq!(m.phase(), TrialPhase::Cueing);

        let events = m.advance(2_200 * MS);
        assert_eq!(events, [TrialEvent::AcquisitionStarted { index: 0 }]);
        assert_eq!(m.recorded_samples(), 1);
        assert!(m.pending_timer(TimerKind::Sample).is_some());
        assert_eq!(m.armed_timers(), 1);
    }

    #[test]
    fn stale_dwell_timer_is_a_no_op() {
        let mut m = machine();
        m.on_pointer(175.0, 175.0, 0);
        let id = m.pending_timer(TimerKind::Dwell).unwrap();
        m.on_pointer(0.0, 0.0, 100 * MS);
        assert!(m.fire_timer(id, 2_000 * MS).is_empty());
        assert_eq!(m.phase(), TrialPhase::Idle);
    }

    #[test]
    fn external_scheduler_can_drive_timers() {
        let mut m = machine();
        m.on_pointer(175.0, 175.0, 0);
        let id = m.pending_timer(TimerKind::Dwell).unwrap();
        let events = m.fire_timer(id, 2_000 * MS);
        assert!(matches!(events[..], [TrialEvent::TargetCued { .. }]));
        // a second delivery of the same id does nothing
        assert!(m.fire_timer(id, 2_001 * MS).is_empty());
        assert_eq!(m.phase(), TrialPhase::Cueing);
    }

    #[test]
    fn leaving_target_early_cancels_hold() {
        let mut m = acquiring();
        let t = target_point(&m);
        assert_eq!(m.on_pointer(t.x, t.y, 2_400 * MS), [TrialEvent::TargetEntered]);
        let hold = m.pending_timer(TimerKind::Hold).unwrap();

        let events = m.on_pointer(175.0, 175.0, 2_600 * MS);
        assert_eq!(events, [TrialEvent::TargetExited]);
        assert_eq!(m.phase(), TrialPhase::Acquiring);
        assert!(m.pending_timer(TimerKind::Hold).is_none());
        assert!(m.fire_timer(hold, 2_900 * MS).is_empty());

        let events = m.advance(5_000 * MS);
        assert!(events.iter().all(|e| !matches!(e, TrialEvent::Sealed(_))));
        assert_eq!(m.phase(), TrialPhase::Acquiring);
    }

    #[test]
    fn hold_elapses_and_seals_on_the_tick_grid() {
        let mut m = acquiring();
        let t = target_point(&m);
        m.on_pointer(t.x, t.y, 2_300 * MS);

        let events = m.advance(2_800 * MS);
        let sealed = match events.as_slice() {
            [TrialEvent::Sealed(trial)] => trial,
            other => panic!("expected seal, got {other:?}"),
        };
        assert_eq!(sealed.outcome, TrialOutcome::Sealed);
        // t = 0 plus ticks every 10 ms up to 590 ms; the hold wins the 600 ms tie
        assert_eq!(sealed.path.len(), 60);
        assert_eq!(sealed.path.last().unwrap().t, 590.0);
        assert_eq!(sealed.path.last().unwrap().position(), t);
        assert!(sealed.path.is_strictly_increasing());

        assert_eq!(m.phase(), TrialPhase::Idle);
        assert_eq!(m.armed_timers(), 0);
        assert!(m.target().is_none());
    }

    #[test]
    fn out_of_bounds_aborts_and_cancels_everything() {
        let mut m = acquiring();
        let t = target_point(&m);
        m.on_pointer(t.x, t.y, 2_300 * MS);
        let events = m.on_pointer(-1.0, t.y, 2_400 * MS);
        let aborted = match events.as_slice() {
            [TrialEvent::Aborted(trial)] => trial,
            other => panic!("expected abort, got {other:?}"),
        };
        assert_eq!(aborted.outcome, TrialOutcome::Aborted);
        assert!(!aborted.path.is_empty());
        assert_eq!(m.phase(), TrialPhase::Idle);
        assert_eq!(m.armed_timers(), 0);
    }

    #[test]
    fn leave_event_aborts_a_recording_trial() {
        let mut m = acquiring();
        let events = m.on_leave(2_250 * MS);
        assert!(matches!(events[..], [TrialEvent::Aborted(_)]));
        assert!(m.pointer().is_none());
        assert_eq!(m.armed_timers(), 0);
    }

    #[test]
    fn leave_while_dwelling_breaks_the_dwell() {
        let mut m = machine();
        m.on_pointer(175.0, 175.0, 0);
        assert_eq!(m.on_leave(MS), [TrialEvent::DwellBroken]);
        assert_eq!(m.armed_timers(), 0);
    }

    #[test]
    fn resting_pointer_restarts_dwell_after_seal() {
        let mut config = TaskConfig::default();
        // targets large enough to cover the center zone
        config.geometry.target_size_px = 300.0;
        let mut m = TrialStateMachine::new(config, StdRng::seed_from_u64(1));
        m.on_pointer(175.0, 175.0, 0);

        let events = m.advance(2_200 * MS);
        assert!(events.contains(&TrialEvent::TargetEntered));
        let events = m.advance(2_700 * MS);
        assert!(matches!(events[0], TrialEvent::Sealed(_)));
        assert_eq!(events[1], TrialEvent::DwellStarted);
        assert_eq!(m.phase(), TrialPhase::Dwelling);
    }

    #[test]
    fn timers_fire_at_their_own_due_times() {
        let mut m = machine();
        m.on_pointer(175.0, 175.0, 0);
        let events = m.advance(3_200 * MS);
        assert!(matches!(
            events[..],
            [TrialEvent::TargetCued { .. }, TrialEvent::AcquisitionStarted { .. }]
        ));
        // 2200 ms start, ticks through 3200 ms
        assert_eq!(m.recorded_samples(), 101);
    }

    #[test]
    fn mirror_mapping_applies_before_zone_tests() {
        let mut m = acquiring();
        let events = m.set_mapping(VisualMapping::for_condition(
            &Condition::mirror(),
            350.0,
            Point::new(0.0, 350.0),
        ));
        // mid-trial the pointer is re-mapped but no zone transition runs
        assert!(events.is_empty());
        assert_eq!(m.pointer(), Some(Point::new(175.0, 175.0)));
        let t = target_point(&m);
        // raw position opposite the target lands on it after mirroring
        let events = m.on_pointer(350.0 - t.x, 350.0 - t.y, 2_300 * MS);
        assert_eq!(events, [TrialEvent::TargetEntered]);
        assert_eq!(m.pointer(), Some(t));
    }

    #[test]
    fn new_mapping_between_trials_rechecks_the_center() {
        let mut m = acquiring();
        let t = target_point(&m);
        m.on_pointer(t.x, t.y, 2_300 * MS);
        m.advance(2_800 * MS);
        assert_eq!(m.phase(), TrialPhase::Idle);

        // an offset that carries the resting target position onto the center
        let origin = Point::new(t.x - 175.0, t.y - 175.0);
        let events = m.set_mapping(VisualMapping::for_condition(
            &Condition::decoupled(),
            350.0,
            origin,
        ));
        assert_eq!(events, [TrialEvent::DwellStarted]);
        assert_eq!(m.phase(), TrialPhase::Dwelling);
        assert_eq!(m.pointer(), Some(Point::new(175.0, 175.0)));

        let events = m.advance(4_800 * MS);
        assert!(matches!(events[..], [TrialEvent::TargetCued { index: 1, .. }]));
    }

    #[test]
    fn queued_mapping_applies_before_the_post_seal_center_check() {
        let mut m = acquiring();
        let t = target_point(&m);
        let origin = Point::new(t.x - 175.0, t.y - 175.0);
        let decoupled = VisualMapping::for_condition(&Condition::decoupled(), 350.0, origin);
        m.queue_mapping(Some(decoupled));
        m.on_pointer(t.x, t.y, 2_300 * MS);

        // seal and the dwell it opens come out of the same advance
        let events = m.advance(4_800 * MS);
        assert!(matches!(
            events[..],
            [
                TrialEvent::Sealed(_),
                TrialEvent::DwellStarted,
                TrialEvent::TargetCued { index: 1, .. }
            ]
        ));
        assert_eq!(m.mapping(), &decoupled);
        assert_eq!(m.pointer(), Some(Point::new(175.0, 175.0)));
    }

    #[test]
    fn queued_mapping_waits_for_a_seal() {
        let mut m = acquiring();
        let mirror = VisualMapping::for_condition(&Condition::mirror(), 350.0, Point::new(0.0, 350.0));
        m.queue_mapping(Some(mirror));
        m.on_leave(2_300 * MS);
        assert!(m.mapping().is_identity());

        m.on_pointer(175.0, 175.0, 2_400 * MS);
        m.advance(4_600 * MS);
        let t = target_point(&m);
        m.on_pointer(t.x, t.y, 4_700 * MS);
        m.advance(5_200 * MS);
        assert_eq!(m.mapping(), &mirror);
        // the resting target position now shows on the opposite side
        assert_eq!(m.pointer(), Some(Point::new(350.0 - t.x, 350.0 - t.y)));
    }

    #[test]
    fn new_mapping_breaks_a_dwell_it_moves_off_center() {
        let mut m = machine();
        m.on_pointer(175.0, 175.0, 0);
        m.advance(500 * MS);
        assert_eq!(m.phase(), TrialPhase::Dwelling);

        let events = m.set_mapping(VisualMapping::for_condition(
            &Condition::decoupled(),
            350.0,
            Point::new(0.0, 350.0),
        ));
        assert_eq!(events, [TrialEvent::DwellBroken]);
        assert_eq!(m.pointer(), Some(Point::new(175.0, -175.0)));
        assert_eq!(m.armed_timers(), 0);
        assert!(m.advance(5_000 * MS).is_empty());
        assert_eq!(m.trials_started(), 0);
    }

    #[test]
    fn seeded_rng_gives_reproducible_targets() {
        let run = |seed| {
            let mut m = TrialStateMachine::new(TaskConfig::default(), StdRng::seed_from_u64(seed));
            let mut targets = Vec::new();
            let mut now = 0;
            for _ in 0..8 {
                m.on_pointer(175.0, 175.0, now);
                now += 2_200 * MS;
                m.advance(now);
                targets.push(m.target().unwrap());
                m.on_leave(now);
            }
            targets
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn halt_clears_timers_and_path() {
        let mut m = acquiring();
        m.halt();
        assert_eq!(m.armed_timers(), 0);
        assert_eq!(m.phase(), TrialPhase::Idle);
        assert_eq!(m.recorded_samples(), 0);
    }
}
