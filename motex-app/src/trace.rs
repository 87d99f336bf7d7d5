//! Recorded pointer traces.
//!
//! ```json
//! {
//!   "participant": "P01",
//!   "device": "mouse",
//!   "pixels_per_mm": 3.78,
//!   "events": [
//!     {"kind": "move", "t_ms": 0.0, "x": 175.0, "y": 175.0},
//!     {"kind": "leave", "t_ms": 2500.0}
//!   ]
//! }
//! ```
//!
//! Coordinates are raw device positions; the session applies the condition
//! mapping.

use crate::source::{PointerInput, PointerSource};
use anyhow::{Context, Result};
use motex_core::DeviceType;
use motex_experiment::Session;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub participant: Option<String>,
    #[serde(default)]
    pub device: Option<DeviceType>,
    #[serde(default)]
    pub pixels_per_mm: Option<f64>,
    pub events: Vec<TraceEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TraceEvent {
    Move { t_ms: f64, x: f64, y: f64 },
    Leave { t_ms: f64 },
}

impl TraceEvent {
    pub fn t_ms(&self) -> f64 {
        match *self {
            Self::Move { t_ms, .. } | Self::Leave { t_ms } => t_ms,
        }
    }

    fn to_input(self) -> PointerInput {
        let t_ns = (self.t_ms().max(0.0) * 1_000_000.0).round() as u64;
        match self {
            Self::Move { x, y, .. } => PointerInput::Move { t_ns, x, y },
            Self::Leave { .. } => PointerInput::Leave { t_ns },
        }
    }
}

impl Trace {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read trace {}", path.display()))?;
        let trace = Self::parse(&text)
            .with_context(|| format!("Failed to parse trace {}", path.display()))?;
        info!(events = trace.events.len(), path = %path.display(), "trace loaded");
        Ok(trace)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let trace: Self = serde_json::from_str(text)?;
        let backwards = trace
            .events
            .windows(2)
            .filter(|w| w[1].t_ms() < w[0].t_ms())
            .count();
        if backwards > 0 {
            warn!(backwards, "trace timestamps go backwards; late events apply at the latest time seen");
        }
        Ok(trace)
    }

    pub fn into_source(self) -> TraceSource {
        TraceSource {
            events: self.events.into_iter(),
        }
    }
}

pub struct TraceSource {
    events: std::vec::IntoIter<TraceEvent>,
}

impl PointerSource for TraceSource {
    fn next_input(&mut self, _session: &Session<StdRng>) -> Option<PointerInput> {
        self.events.next().map(TraceEvent::to_input)
    }
}
