use crate::config::KinematicsConfig;
use crate::history::EndpointHistory;
use crate::metrics::{Metrics, PhysicalMetrics};
use crate::profile::VelocityProfile;
use motex_core::{Path, Point, UnitConverter};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Circular target region used for endpoint error and in-target time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetZone {
    pub center: Point,
    pub radius: f64,
}

/// Turns sealed paths into [`Metrics`], one call per trial.
///
/// Owns the per-condition endpoint history, so variable error accumulates
/// across calls until [`KinematicExtractor::reset`].
#[derive(Debug, Clone, Default)]
pub struct KinematicExtractor {
    config: KinematicsConfig,
    history: EndpointHistory,
}

impl KinematicExtractor {
    pub fn new(config: KinematicsConfig) -> Self {
        Self {
            config,
            history: EndpointHistory::new(),
        }
    }

    pub fn config(&self) -> &KinematicsConfig {
        &self.config
    }

    pub fn history(&self) -> &EndpointHistory {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn extract(
        &mut self,
        condition: &str,
        path: &Path,
        zone: &TargetZone,
        converter: Option<&UnitConverter>,
    ) -> Metrics {
        let mut metrics = analyze(path, zone, &self.config);
        if let Some(last) = path.last() {
            metrics.variable_error = self.history.record(condition, last.position());
        }
        if let Some(converter) = converter {
            metrics.physical = Some(PhysicalMetrics::from_pixels(&metrics, converter));
        }
        debug!(condition, samples = path.len(), "{}", metrics.summary_line());
        metrics
    }
}

/// Per-trial metrics that depend on nothing but the path and target.
/// `variable_error` and `physical` are left empty.
pub fn analyze(path: &Path, zone: &TargetZone, config: &KinematicsConfig) -> Metrics {
    let samples = path.samples();
    let n = samples.len();

    let mut metrics = Metrics::empty();
    metrics.sample_count = n;
    if n == 0 {
        return metrics;
    }

    let last = samples[n - 1];
    let endpoint_error = last.position().distance(&zone.center);
    metrics.endpoint_error = Some(endpoint_error);
    metrics.absolute_error = Some(endpoint_error);
    metrics.movement_variability = Some(movement_variability(path));

    if n < 2 {
        return metrics;
    }

    let path_length: f64 = samples
        .windows(2)
        .map(|w| w[0].position().distance(&w[1].position()))
        .sum();
    metrics.path_length = path_length;
    metrics.directness_ratio = if path_length > 0.0 {
        samples[0].position().distance(&last.position()) / path_length
    } else {
        1.0
    };

    let profile = VelocityProfile::from_path(path);
    if profile.skipped_pairs > 0 {
        warn!(
            skipped = profile.skipped_pairs,
            "non-positive sample intervals skipped"
        );
    }

    let reversals = profile.direction_reversals();
    metrics.direction_reversals = Some(reversals);
    metrics.percentage_direction_reversals = Some(100.0 * reversals as f64 / n as f64);
    metrics.time_in_target_ms = Some(
        profile
            .velocities
            .iter()
            .filter(|v| samples[v.index].position().within(&zone.center, zone.radius))
            .map(|v| v.dt)
            .sum(),
    );

    let Some(peak) = profile.peak().copied() else {
        return metrics;
    };
    metrics.peak_velocity = Some(peak.velocity);
    metrics.time_to_peak_velocity_ms = Some(samples[peak.index].t);
    metrics.average_velocity = Some(
        profile.velocities.iter().map(|v| v.velocity).sum::<f64>()
            / profile.velocities.len() as f64,
    );
    if !profile.accelerations.is_empty() {
        metrics.average_acceleration = Some(
            profile
                .accelerations
                .iter()
                .map(|a| a.acceleration)
                .sum::<f64>()
                / profile.accelerations.len() as f64,
        );
    }
    let boundaries = profile.submovement_boundaries();
    metrics.movement_units = Some(1 + boundaries);
    metrics.corrective_movements = Some(boundaries);

    let threshold = config.onset.threshold(peak.velocity);
    let Some(onset) = profile
        .velocities
        .iter()
        .find(|v| v.velocity > threshold)
        .map(|v| v.index)
    else {
        return metrics;
    };

    let ballistic_end = profile
        .velocities
        .iter()
        .find(|v| v.index > onset && v.velocity < config.stopping_threshold_px_per_ms)
        .map_or(n - 1, |v| v.index);

    let reaction_time = samples[onset].t;
    metrics.reaction_time_ms = Some(reaction_time);
    metrics.movement_time_ms = Some(last.t - reaction_time);
    metrics.ballistic_movement_time_ms = Some(samples[ballistic_end].t - reaction_time);
    metrics.ballistic_path_length = Some(
        samples[onset..=ballistic_end]
            .windows(2)
            .map(|w| w[0].position().distance(&w[1].position()))
            .sum(),
    );

    metrics
}

fn movement_variability(path: &Path) -> f64 {
    let n = path.len() as f64;
    let cx = path.iter().map(|s| s.x).sum::<f64>() / n;
    let cy = path.iter().map(|s| s.y).sum::<f64>() / n;
    let centroid = Point::new(cx, cy);
    path.iter()
        .map(|s| s.position().distance(&centroid))
        .sum::<f64>()
        / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OnsetPolicy;
    use motex_core::Sample;

    fn path(points: &[(f64, f64, f64)]) -> Path {
        Path::from(
            points
                .iter()
                .map(|&(x, y, t)| Sample::new(x, y, t))
                .collect::<Vec<_>>(),
        )
    }

    fn zone(x: f64, y: f64) -> TargetZone {
        TargetZone {
            center: Point::new(x, y),
            radius: 15.0,
        }
    }

    #[test]
    fn straight_constant_speed_reach() {
        let p = path(&[(0.0, 0.0, 0.0), (5.0, 0.0, 10.0), (10.0, 0.0, 20.0)]);
        let m = analyze(&p, &zone(10.0, 0.0), &KinematicsConfig::default());
        assert!((m.directness_ratio - 1.0).abs() < 1e-12);
        assert_eq!(m.movement_units, Some(1));
        assert_eq!(m.corrective_movements, Some(0));
        assert_eq!(m.path_length, 10.0);
        assert_eq!(m.peak_velocity, Some(0.5));
        assert_eq!(m.reaction_time_ms, Some(10.0));
        assert_eq!(m.movement_time_ms, Some(10.0));
        assert_eq!(m.endpoint_error, Some(0.0));
        assert_eq!(m.direction_reversals, Some(0));
    }

    #[test]
    fn right_angle_path_directness() {
        let p = path(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0), (10.0, 10.0, 20.0)]);
        let m = analyze(&p, &zone(10.0, 10.0), &KinematicsConfig::default());
        assert_eq!(m.path_length, 20.0);
        assert!((m.directness_ratio - 200f64.sqrt() / 20.0).abs() < 1e-12);
        assert!((m.directness_ratio - 0.707).abs() < 1e-3);
    }

    #[test]
    fn alternating_path_reversals() {
        let p = path(&[
            (0.0, 0.0, 0.0),
            (10.0, 0.0, 10.0),
            (0.0, 0.0, 20.0),
            (10.0, 0.0, 30.0),
            (0.0, 0.0, 40.0),
        ]);
        let m = analyze(&p, &zone(0.0, 0.0), &KinematicsConfig::default());
        assert_eq!(m.direction_reversals, Some(3));
        assert_eq!(m.percentage_direction_reversals, Some(60.0));
    }

    #[test]
    fn degenerate_paths_leave_timing_absent() {
        let config = KinematicsConfig::default();
        let empty = analyze(&Path::default(), &zone(0.0, 0.0), &config);
        assert_eq!(empty.directness_ratio, 1.0);
        assert_eq!(empty.endpoint_error, None);

        let single = analyze(&path(&[(3.0, 4.0, 0.0)]), &zone(0.0, 0.0), &config);
        assert_eq!(single.directness_ratio, 1.0);
        assert_eq!(single.endpoint_error, Some(5.0));
        assert_eq!(single.movement_variability, Some(0.0));
        assert_eq!(single.reaction_time_ms, None);
        assert_eq!(single.peak_velocity, None);
        assert_eq!(single.movement_units, None);
        assert_eq!(single.direction_reversals, None);
    }

    #[test]
    fn stationary_path_has_no_onset() {
        let p = path(&[(5.0, 5.0, 0.0), (5.0, 5.0, 10.0), (5.0, 5.0, 20.0)]);
        let m = analyze(&p, &zone(5.0, 5.0), &KinematicsConfig::default());
        assert_eq!(m.directness_ratio, 1.0);
        assert_eq!(m.peak_velocity, Some(0.0));
        assert_eq!(m.reaction_time_ms, None);
        assert_eq!(m.movement_time_ms, None);
        assert_eq!(m.time_in_target_ms, Some(20.0));
    }

    #[test]
    fn onset_policies_disagree_on_reaction_time() {
        // speeds: 0.025, 0.075, 1.0, 1.0, 0.0
        let p = path(&[
            (0.0, 0.0, 0.0),
            (0.25, 0.0, 10.0),
            (1.0, 0.0, 20.0),
            (11.0, 0.0, 30.0),
            (21.0, 0.0, 40.0),
            (21.0, 0.0, 50.0),
        ]);
        let target = zone(21.0, 0.0);

        let relative = analyze(&p, &target, &KinematicsConfig::default());
        // 10 % of 1.0 is 0.1; the first pair strictly faster is index 3
        assert_eq!(relative.reaction_time_ms, Some(30.0));

        let absolute = KinematicsConfig {
            onset: OnsetPolicy::DEFAULT_ABSOLUTE,
            ..KinematicsConfig::default()
        };
        let absolute = analyze(&p, &target, &absolute);
        assert_eq!(absolute.reaction_time_ms, Some(20.0));
        assert_eq!(absolute.movement_time_ms, Some(30.0));
        // stops at the zero-speed pair ending at index 5
        assert_eq!(absolute.ballistic_movement_time_ms, Some(30.0));
        assert!((absolute.ballistic_path_length.unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn ballistic_phase_ends_below_stopping_threshold() {
        // fast, fast, stop, slow correction
        let p = path(&[
            (0.0, 0.0, 0.0),
            (10.0, 0.0, 10.0),
            (20.0, 0.0, 20.0),
            (20.0, 0.0, 30.0),
            (22.0, 0.0, 40.0),
        ]);
        let m = analyze(&p, &zone(22.0, 0.0), &KinematicsConfig::default());
        assert_eq!(m.reaction_time_ms, Some(10.0));
        assert_eq!(m.ballistic_movement_time_ms, Some(20.0));
        assert_eq!(m.ballistic_path_length, Some(10.0));
        assert_eq!(m.movement_time_ms, Some(30.0));
        assert_eq!(m.movement_units, Some(2));
        assert_eq!(m.corrective_movements, Some(1));
    }

    #[test]
    fn extractor_accumulates_variable_error_per_condition() {
        let mut extractor = KinematicExtractor::default();
        let target = zone(10.0, 0.0);
        let converter = UnitConverter::new(2.0).unwrap();

        let first = extractor.extract(
            "regular",
            &path(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0)]),
            &target,
            Some(&converter),
        );
        assert_eq!(first.variable_error, None);
        assert_eq!(first.physical.as_ref().unwrap().variable_error_mm, None);

        let second = extractor.extract(
            "regular",
            &path(&[(0.0, 0.0, 0.0), (10.0, 4.0, 10.0)]),
            &target,
            Some(&converter),
        );
        assert_eq!(second.variable_error, Some(2.0));
        assert_eq!(second.physical.as_ref().unwrap().variable_error_mm, Some(1.0));

        let other = extractor.extract(
            "mirror",
            &path(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0)]),
            &target,
            None,
        );
        assert_eq!(other.variable_error, None);
        assert!(other.physical.is_none());

        extractor.reset();
        assert!(extractor.history().endpoints("regular").is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_path() -> impl Strategy<Value = Path> {
            prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0, 0.5f64..40.0), 2..60)
                .prop_map(|steps| {
                    let mut t = 0.0;
                    Path::from(
                        steps
                            .into_iter()
                            .map(|(x, y, dt)| {
                                t += dt;
                                Sample::new(x, y, t)
                            })
                            .collect::<Vec<_>>(),
                    )
                })
        }

        proptest! {
            #[test]
            fn directness_is_a_ratio(p in arb_path()) {
                let m = analyze(&p, &zone(0.0, 0.0), &KinematicsConfig::default());
                let first = p.first().unwrap().position();
                let last = p.last().unwrap().position();
                prop_assert!(m.path_length + 1e-9 >= first.distance(&last));
                prop_assert!(m.directness_ratio > 0.0 || m.path_length == 0.0 || first.distance(&last) == 0.0);
                prop_assert!(m.directness_ratio <= 1.0 + 1e-9);
            }

            #[test]
            fn timing_is_consistent(p in arb_path()) {
                let m = analyze(&p, &zone(0.0, 0.0), &KinematicsConfig::default());
                if let (Some(rt), Some(mt), Some(bt)) =
                    (m.reaction_time_ms, m.movement_time_ms, m.ballistic_movement_time_ms)
                {
                    prop_assert!(rt > 0.0);
                    prop_assert!(mt >= 0.0);
                    prop_assert!(bt >= 0.0 && bt <= mt);
                    prop_assert!(m.ballistic_path_length.unwrap() <= m.path_length + 1e-9);
                }
                prop_assert_eq!(m.movement_units.map(|u| u - 1), m.corrective_movements);
            }
        }
    }
}
