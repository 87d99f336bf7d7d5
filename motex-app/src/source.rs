use motex_experiment::Session;
use rand::rngs::StdRng;

/// One pointer trigger, timestamped from the start of the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Move { t_ns: u64, x: f64, y: f64 },
    Leave { t_ns: u64 },
}

impl PointerInput {
    pub fn t_ns(&self) -> u64 {
        match *self {
            Self::Move { t_ns, .. } | Self::Leave { t_ns } => t_ns,
        }
    }
}

/// Something that feeds pointer input to a session. Sources may look at the
/// session to react to what is on screen.
pub trait PointerSource {
    fn next_input(&mut self, session: &Session<StdRng>) -> Option<PointerInput>;
}
