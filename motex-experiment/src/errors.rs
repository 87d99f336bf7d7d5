use motex_core::{CoreError, DeviceType};
use motex_kinematics::KinematicsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("trials per condition must be at least 1")]
    ZeroTrials,

    #[error("condition list is empty")]
    NoConditions,

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("center threshold ({threshold} px) must leave the center zone inside the arena")]
    CenterZone { threshold: f64 },

    #[error(transparent)]
    Condition(#[from] CoreError),

    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("participant id must not be empty")]
    EmptyParticipantId,

    #[error("no configured condition can run on a {0}")]
    NoEligibleConditions(DeviceType),

    #[error("cannot {action} during the {phase} phase")]
    WrongPhase { action: &'static str, phase: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SessionError::WrongPhase {
            action: "calibrate",
            phase: "Task".to_string(),
        };
        assert_eq!(err.to_string(), "cannot calibrate during the Task phase");
        let err = SessionError::from(ConfigError::ZeroTrials);
        assert!(err.to_string().contains("at least 1"));
    }
}
