pub mod schedule;
pub mod timer;

pub use schedule::{ScheduledTimer, Scheduler, TimerId};
pub use timer::{HighPrecisionTimer, ManualTimer, SamplingStats, Timer};
