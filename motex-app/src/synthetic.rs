//! Synthetic participant.
//!
//! Rests in the center until a target is cued, waits out a reaction time,
//! then makes a minimum-jerk reach that lands near the target center. Some
//! reaches overshoot and end with a short corrective movement; a few are
//! abandoned by lifting off the surface.

use crate::source::{PointerInput, PointerSource};
use anyhow::{Result, ensure};
use motex_core::{Point, Target, TrialPhase};
use motex_experiment::{Geometry, Session};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use tracing::debug;

const NS_PER_MS: f64 = 1_000_000.0;
/// Simulated time after which the participant gives up.
const MAX_SESSION_NS: u64 = 6 * 3600 * 1_000_000_000;
/// Speed of the unrecorded return to the center, px/ms.
const RETURN_SPEED: f64 = 0.6;

fn ms(v: f64) -> u64 {
    (v * NS_PER_MS).round() as u64
}

/// `10τ³ - 15τ⁴ + 6τ⁵`
fn minimum_jerk(tau: f64) -> f64 {
    let tau = tau.clamp(0.0, 1.0);
    tau.powi(3) * (10.0 - 15.0 * tau + 6.0 * tau * tau)
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    from: Point,
    to: Point,
    start_ns: u64,
    duration_ns: u64,
}

impl Segment {
    fn at(&self, t_ns: u64) -> Point {
        let tau = t_ns.saturating_sub(self.start_ns) as f64 / self.duration_ns.max(1) as f64;
        let s = minimum_jerk(tau);
        Point::new(
            self.from.x + (self.to.x - self.from.x) * s,
            self.from.y + (self.to.y - self.from.y) * s,
        )
    }
}

#[derive(Debug, Clone)]
struct Reach {
    trial: usize,
    segments: Vec<Segment>,
    leave_at_ns: Option<u64>,
}

impl Reach {
    /// `None` before the first segment starts.
    fn position_at(&self, t_ns: u64) -> Option<Point> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.start_ns <= t_ns)
            .map(|s| s.at(t_ns))
    }
}

pub struct SyntheticParticipant {
    rng: StdRng,
    step_ns: u64,
    now_ns: u64,
    position: Point,
    on_surface: bool,
    abort_rate: f64,
    reach: Option<Reach>,
}

impl SyntheticParticipant {
    pub fn new(seed: u64, step_ms: u64, abort_rate: f64) -> Result<Self> {
        ensure!(step_ms > 0, "pointer step must be at least 1 ms");
        ensure!(
            (0.0..=1.0).contains(&abort_rate),
            "abort rate must be within [0, 1], got {abort_rate}"
        );
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            step_ns: step_ms * 1_000_000,
            now_ns: 0,
            position: Point::new(0.0, 0.0),
            on_surface: true,
            abort_rate,
            reach: None,
        })
    }

    fn jitter(&mut self, p: Point, amplitude: f64) -> Point {
        Point::new(
            p.x + self.rng.random_range(-amplitude..=amplitude),
            p.y + self.rng.random_range(-amplitude..=amplitude),
        )
    }

    fn plan_reach(&mut self, trial: usize, target: Target, geometry: &Geometry, delay_ms: u64) -> Reach {
        let reaction_ms = self.rng.random_range(180.0..380.0);
        let duration_ms = self.rng.random_range(450.0..900.0);

        let goal = geometry.target_center(target);
        let miss = self.rng.random_range(0.0..geometry.target_radius() * 0.4);
        let angle = self.rng.random_range(0.0..TAU);
        let end = Point::new(goal.x + miss * angle.cos(), goal.y + miss * angle.sin());

        let from = self.position;
        let start_ns = self.now_ns + ms(delay_ms as f64 + reaction_ms);
        let duration_ns = ms(duration_ms);

        let segments = if self.rng.random_bool(0.25) {
            let length = from.distance(&end).max(f64::EPSILON);
            let overshoot = self.rng.random_range(6.0..14.0);
            let over = Point::new(
                end.x + (end.x - from.x) / length * overshoot,
                end.y + (end.y - from.y) / length * overshoot,
            );
            let correction_start = start_ns + duration_ns + ms(40.0);
            vec![
                Segment {
                    from,
                    to: over,
                    start_ns,
                    duration_ns,
                },
                Segment {
                    from: over,
                    to: end,
                    start_ns: correction_start,
                    duration_ns: ms(180.0),
                },
            ]
        } else {
            vec![Segment {
                from,
                to: end,
                start_ns,
                duration_ns,
            }]
        };

        let leave_at_ns = self
            .rng
            .random_bool(self.abort_rate)
            .then(|| start_ns + duration_ns / 2);
        debug!(
            trial,
            %target,
            reaction_ms,
            duration_ms,
            corrective = segments.len() > 1,
            abandons = leave_at_ns.is_some(),
            "reach planned"
        );
        Reach {
            trial,
            segments,
            leave_at_ns,
        }
    }
}

impl PointerSource for SyntheticParticipant {
    fn next_input(&mut self, session: &Session<StdRng>) -> Option<PointerInput> {
        if session.is_complete() || self.now_ns >= MAX_SESSION_NS {
            return None;
        }
        let condition = session.current_condition()?;
        let config = session.config();
        let mapping = config.mapping_for(condition);
        let machine = session.machine();

        self.now_ns += self.step_ns;
        let now = self.now_ns;

        let cued = matches!(
            machine.phase(),
            TrialPhase::Cueing | TrialPhase::Acquiring | TrialPhase::HoldingTarget
        );
        let next = match machine.target().filter(|_| cued) {
            Some(target) => {
                let trial = machine.trials_started().saturating_sub(1);
                if self.reach.as_ref().is_none_or(|r| r.trial != trial) {
                    let reach = self.plan_reach(
                        trial,
                        target,
                        &config.geometry,
                        config.timing.target_delay_ms,
                    );
                    self.reach = Some(reach);
                }
                let reach = self.reach.as_ref()?;
                if self.on_surface && reach.leave_at_ns.is_some_and(|t| now >= t) {
                    self.on_surface = false;
                    return Some(PointerInput::Leave { t_ns: now });
                }
                reach.position_at(now).unwrap_or(self.position)
            }
            None => {
                self.on_surface = true;
                let center = config.geometry.center();
                let gap = self.position.distance(&center);
                let stride = RETURN_SPEED * self.step_ns as f64 / NS_PER_MS;
                if gap > stride {
                    let f = stride / gap;
                    Point::new(
                        self.position.x + (center.x - self.position.x) * f,
                        self.position.y + (center.y - self.position.y) * f,
                    )
                } else {
                    self.jitter(center, 1.0)
                }
            }
        };

        self.position = next;
        let raw = mapping.invert(next);
        Some(PointerInput::Move {
            t_ns: now,
            x: raw.x,
            y: raw.y,
        })
    }
}
