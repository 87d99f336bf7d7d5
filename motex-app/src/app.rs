use crate::source::{PointerInput, PointerSource};
use anyhow::{Context, Result};
use motex_core::UnitConverter;
use motex_experiment::{Participant, Session, SessionEvent, TaskConfig, TimerKind, TrialEvent};
use motex_export::{ExportOptions, SessionExport, default_file_name, write_csv, write_json};
use motex_timing::{SamplingStats, Timer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Drives one session from a pointer source.
///
/// Input timestamps are replayed against `timer`: a [`motex_timing::ManualTimer`]
/// jumps straight to each timestamp, a [`motex_timing::HighPrecisionTimer`]
/// sleeps until it.
pub struct App<T: Timer<Timestamp = u64>> {
    session: Session<StdRng>,
    timer: T,
}

#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub inputs: usize,
    pub last_input_ns: u64,
    pub pacing: SamplingStats,
}

impl<T: Timer<Timestamp = u64>> App<T> {
    pub fn new(config: TaskConfig, seed: u64, timer: T) -> Result<Self> {
        let session = Session::new(config, StdRng::seed_from_u64(seed))
            .context("Invalid task configuration")?;
        Ok(Self { session, timer })
    }

    pub fn session(&self) -> &Session<StdRng> {
        &self.session
    }

    pub fn start(&mut self, participant: Participant, calibration: Option<UnitConverter>) -> Result<()> {
        self.session.register(participant)?;
        match calibration {
            Some(converter) => self.session.calibrate(converter)?,
            None => self.session.skip_calibration()?,
        }
        Ok(())
    }

    pub fn run(&mut self, source: &mut impl PointerSource) -> Result<RunStats> {
        let origin = self.timer.now();
        let mut stats = RunStats::default();
        let mut previous: Option<u64> = None;

        while let Some(input) = source.next_input(&self.session) {
            let t_ns = input.t_ns();
            let due = origin + t_ns;
            let now = self.timer.now();
            if due > now {
                self.timer.sleep(Duration::from_nanos(due - now));
            }
            let delivered = self.timer.now();
            if let Some(prev) = previous {
                self.timer
                    .record_interval(Duration::from_nanos(delivered.saturating_sub(prev)));
            }
            previous = Some(delivered);

            let events = match input {
                PointerInput::Move { t_ns, x, y } => self.session.on_pointer(x, y, t_ns),
                PointerInput::Leave { t_ns } => self.session.on_leave(t_ns),
            };
            stats.inputs += 1;
            stats.last_input_ns = stats.last_input_ns.max(t_ns);
            log_events(&events);

            if self.session.is_complete() {
                break;
            }
        }
        self.settle(origin);

        if !self.session.is_complete() {
            let (done, total) = self.session.progress();
            warn!(done, total, "input ended before the task was complete");
        }
        stats.pacing = self.timer.sampling_stats();
        Ok(stats)
    }

    /// Runs out the dwell, cue and hold timers still pending once input
    /// stops, so a trace that ends with the pointer at rest still finishes
    /// its trial. The sample tick re-arms itself and is not waited on.
    fn settle(&mut self, origin: u64) {
        loop {
            if self.session.is_complete() {
                return;
            }
            let machine = self.session.machine();
            let waiting = [TimerKind::Dwell, TimerKind::Cue, TimerKind::Hold]
                .into_iter()
                .any(|kind| machine.pending_timer(kind).is_some());
            let Some(due_ns) = machine.next_deadline_ns().filter(|_| waiting) else {
                return;
            };
            let now = self.timer.now();
            if origin + due_ns > now {
                self.timer.sleep(Duration::from_nanos(origin + due_ns - now));
            }
            log_events(&self.session.advance(due_ns));
        }
    }

    /// Writes the CSV and JSON artifacts into `dir` and returns their paths.
    pub fn export(&self, dir: &Path, options: &ExportOptions) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        let export = SessionExport::from_session(&self.session);
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        let csv_path = dir.join(default_file_name(export.participant_id, stamp, "csv"));
        write_csv(&csv_path, &export, options).context("Failed to export CSV")?;
        let json_path = dir.join(default_file_name(export.participant_id, stamp, "json"));
        write_json(&json_path, &export, options).context("Failed to export JSON")?;

        info!(csv = %csv_path.display(), json = %json_path.display(), "artifacts written");
        Ok(vec![csv_path, json_path])
    }

    pub fn print_report(&self, stats: &RunStats) {
        let s = &self.session;
        let quality = s.quality_report();
        let (done, total) = s.progress();
        let sealed = s.sealed_records().count();

        println!("=== MOTEX SESSION REPORT ===");
        if let Some(p) = s.participant() {
            println!("Participant: {} ({})", p.id, p.device);
        }
        match s.converter() {
            Some(c) => println!("Calibration: {:.3} px/mm", c.pixels_per_mm()),
            None => println!("Calibration: none (pixel units)"),
        }
        println!(
            "Trials: {} sealed, {} aborted, progress {}/{}{}",
            sealed,
            s.aborted_count(),
            done,
            total,
            if s.is_complete() { " (complete)" } else { "" }
        );
        println!(
            "Quality: {}/{} valid, {} high quality, mean score {:.3}",
            quality.valid_trials,
            quality.total_trials,
            quality.high_quality_trials,
            quality.mean_quality_score
        );
        println!(
            "Input: {} events over {:.1} s, median interval {:.2} ms, jitter {:.3} ms",
            stats.inputs,
            stats.last_input_ns as f64 / 1e9,
            stats.pacing.median_interval_ms,
            stats.pacing.jitter_ms
        );
        let dropped: usize = s.records().iter().map(|r| r.dropped_samples).sum();
        if dropped > 0 {
            println!("Dropped samples: {dropped}");
        }
    }
}

fn log_events(events: &[SessionEvent]) {
    for event in events {
        match event {
            SessionEvent::TrialRecorded(summary) => info!("{summary}"),
            SessionEvent::ConditionChanged { from, to } => {
                info!(%from, %to, "next condition")
            }
            SessionEvent::TaskComplete => info!("task complete"),
            SessionEvent::Trial(TrialEvent::TargetCued { index, target }) => {
                debug!(index, %target, "cue")
            }
            SessionEvent::Trial(other) => debug!(?other, "trial event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticParticipant;
    use crate::trace::Trace;
    use motex_core::{DeviceType, SessionPhase, Target, TrialOutcome, TrialPhase};
    use motex_timing::ManualTimer;
    use rand::Rng;

    fn small_config(trials: usize) -> TaskConfig {
        let mut config = TaskConfig::default();
        config.session.trials_per_condition = trials;
        config
    }

    #[test]
    fn simulated_session_runs_to_completion() {
        let mut app = App::new(small_config(2), 5, ManualTimer::new()).unwrap();
        app.start(
            Participant::new("SIM", DeviceType::Touchscreen),
            Some(UnitConverter::new(3.78).unwrap()),
        )
        .unwrap();

        let mut participant = SyntheticParticipant::new(5, 8, 0.0).unwrap();
        let stats = app.run(&mut participant).unwrap();

        let session = app.session();
        assert!(session.is_complete());
        assert_eq!(session.phase(), SessionPhase::Complete);
        assert_eq!(session.sealed_records().count(), 8);
        assert_eq!(session.aborted_count(), 0);
        assert!(stats.inputs > 0);
        assert!((stats.pacing.median_interval_ms - 8.0).abs() < 1e-9);
        for record in session.sealed_records() {
            let metrics = record.metrics.as_ref().unwrap();
            assert!(metrics.has_movement());
            assert!(metrics.endpoint_error.unwrap() < 15.0);
        }
    }

    #[test]
    fn abandoned_reaches_are_recorded_as_aborts() {
        let mut app = App::new(small_config(3), 2, ManualTimer::new()).unwrap();
        app.start(Participant::new("SIM", DeviceType::Mouse), None)
            .unwrap();
        let mut participant = SyntheticParticipant::new(2, 8, 0.3).unwrap();
        app.run(&mut participant).unwrap();

        let session = app.session();
        assert!(session.is_complete());
        assert_eq!(session.sealed_records().count(), 6);
        assert!(
            session
                .records()
                .iter()
                .filter(|r| r.outcome == TrialOutcome::Aborted)
                .all(|r| r.metrics.is_none())
        );
    }

    #[test]
    fn trace_replay_feeds_the_session() {
        let trace = Trace::parse(
            r#"{"events": [
                {"kind": "move", "t_ms": 0, "x": 175, "y": 175},
                {"kind": "move", "t_ms": 2300, "x": 176, "y": 175},
                {"kind": "leave", "t_ms": 2350}
            ]}"#,
        )
        .unwrap();
        let mut app = App::new(small_config(2), 1, ManualTimer::new()).unwrap();
        app.start(Participant::new("P01", DeviceType::Mouse), None)
            .unwrap();
        let stats = app.run(&mut trace.into_source()).unwrap();

        assert_eq!(stats.inputs, 3);
        let records = app.session().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, TrialOutcome::Aborted);
        // t = 0 at 2200 ms, ticks through 2350 ms
        assert_eq!(records[0].path.len(), 16);
    }

    #[test]
    fn trace_ending_inside_the_target_still_seals() {
        let config = small_config(1);
        let first = Target::ALL[StdRng::seed_from_u64(1).random_range(0..Target::ALL.len())];
        let goal = config.geometry.target_center(first);
        let trace = Trace::parse(&format!(
            r#"{{"events": [
                {{"kind": "move", "t_ms": 0, "x": 175, "y": 175}},
                {{"kind": "move", "t_ms": 2400, "x": {}, "y": {}}}
            ]}}"#,
            goal.x, goal.y
        ))
        .unwrap();
        let mut app = App::new(config, 1, ManualTimer::new()).unwrap();
        app.start(Participant::new("P01", DeviceType::Mouse), None)
            .unwrap();
        let stats = app.run(&mut trace.into_source()).unwrap();

        assert_eq!(stats.inputs, 2);
        let session = app.session();
        let records = session.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, TrialOutcome::Sealed);
        assert_eq!(records[0].target, first);
        // hold set at 2400 ms wins the 2900 ms tie with the sample tick
        assert_eq!(records[0].path.len(), 70);
        assert_eq!(session.progress(), (1, 2));
        assert_eq!(session.current_condition().unwrap().name, "mirror");
        assert_eq!(session.machine().armed_timers(), 0);
    }

    #[test]
    fn pending_dwell_runs_into_the_next_trial() {
        let trace = Trace::parse(
            r#"{"events": [{"kind": "move", "t_ms": 0, "x": 175, "y": 175}]}"#,
        )
        .unwrap();
        let mut app = App::new(small_config(1), 1, ManualTimer::new()).unwrap();
        app.start(Participant::new("P01", DeviceType::Mouse), None)
            .unwrap();
        app.run(&mut trace.into_source()).unwrap();

        // dwell and cue fire, then acquisition waits on a pointer that never moves
        let machine = app.session().machine();
        assert_eq!(machine.phase(), TrialPhase::Acquiring);
        assert_eq!(machine.trials_started(), 1);
        assert!(machine.pending_timer(TimerKind::Sample).is_some());
        assert!(app.session().records().is_empty());
    }
}
