use motex_core::Point;
use std::collections::HashMap;

/// Endpoints of sealed trials, grouped by condition name.
///
/// Backs the variable-error statistic. Lives for one session and is only
/// mutated by the extractor.
#[derive(Debug, Clone, Default)]
pub struct EndpointHistory {
    by_condition: HashMap<String, Vec<Point>>,
}

impl EndpointHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an endpoint and returns the condition's variable error afterwards.
    pub fn record(&mut self, condition: &str, endpoint: Point) -> Option<f64> {
        let endpoints = self.by_condition.entry(condition.to_string()).or_default();
        endpoints.push(endpoint);
        radial_std_dev(endpoints)
    }

    pub fn variable_error(&self, condition: &str) -> Option<f64> {
        self.by_condition
            .get(condition)
            .and_then(|e| radial_std_dev(e))
    }

    pub fn endpoints(&self, condition: &str) -> &[Point] {
        self.by_condition
            .get(condition)
            .map_or(&[], |e| e.as_slice())
    }

    pub fn clear(&mut self) {
        self.by_condition.clear();
    }
}

/// Population standard deviation of 2-D points about their mean,
/// `sqrt(mean(|p - mean|²))`. Needs at least two points.
fn radial_std_dev(points: &[Point]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let my = points.iter().map(|p| p.y).sum::<f64>() / n;
    let var = points
        .iter()
        .map(|p| (p.x - mx).powi(2) + (p.y - my).powi(2))
        .sum::<f64>()
        / n;
    Some(var.sqrt())
}
