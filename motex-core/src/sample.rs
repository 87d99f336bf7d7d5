use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// One pointer observation; `t` is milliseconds since the trial clock started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub t: f64,
}

impl Sample {
    pub const fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A frozen trial trajectory.
///
/// A `Path` only exposes read access; the recorder builds it sample by sample
/// and hands it over by value once the trial is sealed or aborted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    samples: Vec<Sample>,
}

impl Path {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Time between first and last sample, 0 for paths shorter than two samples.
    pub fn duration_ms(&self) -> f64 {
        match (self.first(), self.last()) {
            (Some(a), Some(b)) => b.t - a.t,
            _ => 0.0,
        }
    }

    /// True when every timestamp is strictly greater than the previous one.
    pub fn is_strictly_increasing(&self) -> bool {
        self.samples.windows(2).all(|w| w[1].t > w[0].t)
    }
}

impl From<Vec<Sample>> for Path {
    fn from(samples: Vec<Sample>) -> Self {
        Self { samples }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
