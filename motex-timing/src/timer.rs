use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Trait for session clocks
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn sleep(&self, d: Duration);
    fn record_interval(&mut self, d: Duration);
    fn sampling_stats(&self) -> SamplingStats;
}

/// Summary of the spacing between consecutive ticks or samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplingStats {
    pub count: usize,
    pub average_interval_ms: f64,
    pub median_interval_ms: f64,
    pub jitter_ms: f64,
    pub min_interval_ms: f64,
    pub max_interval_ms: f64,
    pub effective_rate_hz: f64,
}

impl SamplingStats {
    pub fn from_intervals_ms<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut times: Vec<f64> = intervals.into_iter().filter(|d| d.is_finite()).collect();
        if times.is_empty() {
            return Self::default();
        }
        times.sort_by(f64::total_cmp);
        let n = times.len() as f64;
        let avg = times.iter().sum::<f64>() / n;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / n;
        let median = times[times.len() / 2];
        Self {
            count: times.len(),
            average_interval_ms: avg,
            median_interval_ms: median,
            jitter_ms: var.sqrt(),
            min_interval_ms: times[0],
            max_interval_ms: times[times.len() - 1],
            effective_rate_hz: if median > 0.0 { 1000.0 / median } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
    pub intervals: Vec<Duration>,
    pub max_samples: usize,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
    fn record_interval(&mut self, d: Duration) {
        if self.intervals.len() >= self.max_samples {
            self.intervals.remove(0);
        }
        self.intervals.push(d);
    }
    fn sampling_stats(&self) -> SamplingStats {
        SamplingStats::from_intervals_ms(self.intervals.iter().map(|d| d.as_secs_f64() * 1e3))
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            intervals: Vec::with_capacity(1000),
            max_samples: 1000,
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{CLOCK_MONOTONIC, clock_nanosleep, timespec};

        let req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };

        // SAFETY: `req` is a valid timespec and a null remainder pointer is allowed.
        unsafe {
            clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
    intervals: Vec<Duration>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) -> u64 {
        self.now_ns
            .fetch_add(d.as_nanos() as u64, Ordering::SeqCst)
            + d.as_nanos() as u64
    }

    /// Moves the clock to `ts`; earlier values are ignored.
    pub fn set(&self, ts: u64) {
        self.now_ns.fetch_max(ts, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
    fn record_interval(&mut self, d: Duration) {
        self.intervals.push(d);
    }
    fn sampling_stats(&self) -> SamplingStats {
        SamplingStats::from_intervals_ms(self.intervals.iter().map(|d| d.as_secs_f64() * 1e3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_uniform_ticks() {
        let stats = SamplingStats::from_intervals_ms([10.0, 10.0, 10.0, 10.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.median_interval_ms, 10.0);
        assert_eq!(stats.jitter_ms, 0.0);
        assert!((stats.effective_rate_hz - 100.0).abs() < 1e-9);
    }

    #[test]
    fn stats_use_median_for_rate() {
        let stats = SamplingStats::from_intervals_ms([8.0, 40.0, 10.0]);
        assert_eq!(stats.median_interval_ms, 10.0);
        assert_eq!(stats.min_interval_ms, 8.0);
        assert_eq!(stats.max_interval_ms, 40.0);
    }

    #[test]
    fn empty_stats_are_zero() {
        assert_eq!(SamplingStats::from_intervals_ms([]), SamplingStats::default());
    }

    #[test]
    fn manual_timer_clones_share_time() {
        let timer = ManualTimer::new();
        let view = timer.clone();
        timer.advance(Duration::from_millis(5));
        assert_eq!(view.now(), 5_000_000);
        view.set(1_000);
        assert_eq!(timer.now(), 5_000_000);
        assert_eq!(timer.elapsed(1_000_000), Duration::from_millis(4));
    }

    #[test]
    fn high_precision_sleep_waits() {
        let timer = HighPrecisionTimer::new();
        let before = timer.now();
        timer.sleep(Duration::from_millis(2));
        assert!(timer.elapsed(before) >= Duration::from_millis(2));
    }
}
