//! Velocity and acceleration series derived from consecutive samples.

use motex_core::{Path, Point};
use serde::{Deserialize, Serialize};

/// Velocity over the sample pair `(index - 1, index)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityPoint {
    /// Index of the later sample of the pair
    pub index: usize,
    /// Pair interval (ms)
    pub dt: f64,
    /// Pair distance (px)
    pub distance: f64,
    /// Speed (px/ms)
    pub velocity: f64,
    pub vx: f64,
    pub vy: f64,
}

/// Change of speed between two consecutive velocity points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationPoint {
    /// Sample index of the later velocity point
    pub index: usize,
    /// px/ms²
    pub acceleration: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VelocityProfile {
    pub velocities: Vec<VelocityPoint>,
    pub accelerations: Vec<AccelerationPoint>,
    /// Pairs dropped because their interval was not positive
    pub skipped_pairs: usize,
}

impl VelocityProfile {
    pub fn from_path(path: &Path) -> Self {
        let samples = path.samples();
        let mut velocities = Vec::with_capacity(samples.len().saturating_sub(1));
        let mut skipped_pairs = 0;

        for (i, pair) in samples.windows(2).enumerate() {
            let (a, b) = (&pair[0], &pair[1]);
            let dt = b.t - a.t;
            if !(dt > 0.0) {
                skipped_pairs += 1;
                continue;
            }
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            let distance = (dx * dx + dy * dy).sqrt();
            velocities.push(VelocityPoint {
                index: i + 1,
                dt,
                distance,
                velocity: distance / dt,
                vx: dx / dt,
                vy: dy / dt,
            });
        }

        let accelerations = velocities
            .windows(2)
            .map(|w| AccelerationPoint {
                index: w[1].index,
                acceleration: (w[1].velocity - w[0].velocity) / w[1].dt,
            })
            .collect();

        Self {
            velocities,
            accelerations,
            skipped_pairs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }

    /// Fastest pair; the first one wins on ties.
    pub fn peak(&self) -> Option<&VelocityPoint> {
        self.velocities.iter().fold(None, |best, v| match best {
            Some(b) if b.velocity >= v.velocity => Some(b),
            _ => Some(v),
        })
    }

    pub fn velocity_at(&self, sample_index: usize) -> Option<f64> {
        self.velocities
            .iter()
            .find(|v| v.index == sample_index)
            .map(|v| v.velocity)
    }

    pub fn acceleration_at(&self, sample_index: usize) -> Option<f64> {
        self.accelerations
            .iter()
            .find(|a| a.index == sample_index)
            .map(|a| a.acceleration)
    }

    /// Local velocity minima: acceleration turning from negative to positive.
    pub fn submovement_boundaries(&self) -> u32 {
        self.accelerations
            .windows(2)
            .filter(|w| w[0].acceleration < 0.0 && w[1].acceleration > 0.0)
            .count() as u32
    }

    /// Consecutive velocity pairs where the x or y component flips sign.
    pub fn direction_reversals(&self) -> u32 {
        self.velocities
            .windows(2)
            .filter(|w| w[0].vx * w[1].vx < 0.0 || w[0].vy * w[1].vy < 0.0)
            .count() as u32
    }
}

/// Per-sample kinematics as written to the raw path dump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleKinematics {
    pub t: f64,
    pub x: f64,
    pub y: f64,
    pub velocity: Option<f64>,
    pub acceleration: Option<f64>,
    pub distance_to_target: f64,
    pub in_target: bool,
}

pub fn sample_series(path: &Path, target_center: Point, target_radius: f64) -> Vec<SampleKinematics> {
    let profile = VelocityProfile::from_path(path);
    let mut velocities = profile.velocities.iter().peekable();
    let mut accelerations = profile.accelerations.iter().peekable();

    path.iter()
        .enumerate()
        .map(|(i, s)| {
            let velocity = velocities.next_if(|v| v.index == i).map(|v| v.velocity);
            let acceleration = accelerations
                .next_if(|a| a.index == i)
                .map(|a| a.acceleration);
            let distance_to_target = s.position().distance(&target_center);
            SampleKinematics {
                t: s.t,
                x: s.x,
                y: s.y,
                velocity,
                acceleration,
                distance_to_target,
                in_target: distance_to_target < target_radius,
            }
        })
        .collect()
}
