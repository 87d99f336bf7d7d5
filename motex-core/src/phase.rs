/// Defines session phases and behavior
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    fn allows_input(&self) -> bool;
    fn requires_calibration(&self) -> bool;
    fn next(&self) -> Option<Self>;

    fn is_intake(&self) -> bool {
        false
    }
    fn is_task(&self) -> bool {
        false
    }
    fn is_complete(&self) -> bool {
        false
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Intake,
    Calibration,
    Task,
    Complete,
}

impl Phase for SessionPhase {
    fn allows_input(&self) -> bool {
        matches!(self, Self::Task)
    }
    fn requires_calibration(&self) -> bool {
        matches!(self, Self::Calibration)
    }
    fn next(&self) -> Option<Self> {
        use SessionPhase::*;
        Some(match self {
            Intake => Calibration,
            Calibration => Task,
            Task => Complete,
            Complete => return None,
        })
    }

    fn is_intake(&self) -> bool {
        matches!(self, SessionPhase::Intake)
    }

    fn is_task(&self) -> bool {
        matches!(self, SessionPhase::Task)
    }

    fn is_complete(&self) -> bool {
        matches!(self, SessionPhase::Complete)
    }
}
