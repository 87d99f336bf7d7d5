//! Owns the single open path of a trial.

use motex_core::{Path, Point, Sample};
use motex_timing::SamplingStats;
use tracing::{debug, warn};

const NS_PER_MS: f64 = 1_000_000.0;

#[derive(Debug, Clone, Default)]
pub struct PathRecorder {
    origin_ns: Option<u64>,
    samples: Vec<Sample>,
    dropped: usize,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.origin_ns.is_some()
    }

    /// Starts a fresh path whose clock reads 0 at `start_ns`. Anything still
    /// open is discarded.
    pub fn open(&mut self, start_ns: u64) {
        if self.is_open() {
            warn!(samples = self.samples.len(), "discarding unsealed path");
        }
        self.origin_ns = Some(start_ns);
        self.samples.clear();
        self.dropped = 0;
        debug!(start_ns, "path opened");
    }

    /// Trial-relative time in ms, `None` while closed or before the origin.
    pub fn elapsed_ms(&self, now_ns: u64) -> Option<f64> {
        let origin = self.origin_ns?;
        now_ns.checked_sub(origin).map(|d| d as f64 / NS_PER_MS)
    }

    /// Appends a sample. Returns false when the recorder is closed or the
    /// timestamp does not advance past the previous sample.
    pub fn record(&mut self, position: Point, now_ns: u64) -> bool {
        let Some(t) = self.elapsed_ms(now_ns) else {
            return false;
        };
        if let Some(last) = self.samples.last() {
            if t <= last.t {
                self.dropped += 1;
                warn!(t, last = last.t, "dropping non-increasing sample");
                return false;
            }
        }
        self.samples.push(Sample::new(position.x, position.y, t));
        true
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn sampling_stats(&self) -> SamplingStats {
        SamplingStats::from_intervals_ms(self.samples.windows(2).map(|w| w[1].t - w[0].t))
    }

    /// Closes the recorder and hands the path out by value.
    pub fn freeze(&mut self) -> Path {
        self.origin_ns = None;
        let path = Path::from(std::mem::take(&mut self.samples));
        debug!(samples = path.len(), dropped = self.dropped, "path frozen");
        path
    }

    pub fn discard(&mut self) {
        self.origin_ns = None;
        self.samples.clear();
    }
}
