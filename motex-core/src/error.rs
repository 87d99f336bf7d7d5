use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("calibration must be positive and finite, got {0} px/mm")]
    InvalidCalibration(f64),

    #[error("unsupported condition: {0}")]
    UnknownCondition(String),

    #[error("unknown target: {0}")]
    UnknownTarget(String),

    #[error("unknown input device: {0}")]
    UnknownDevice(String),
}
