use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KinematicsError {
    #[error("relative onset fraction must be in (0, 1], got {0}")]
    OnsetFraction(f64),

    #[error("absolute onset threshold must be non-negative, got {0} px/ms")]
    OnsetThreshold(f64),

    #[error("stopping threshold must be non-negative, got {0} px/ms")]
    StoppingThreshold(f64),
}

/// How movement onset is detected.
///
/// `Relative` compares each pair velocity against a fraction of the path's
/// own peak; `Absolute` against a fixed speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum OnsetPolicy {
    Absolute { threshold_px_per_ms: f64 },
    Relative { fraction: f64 },
}

impl Default for OnsetPolicy {
    fn default() -> Self {
        OnsetPolicy::Relative { fraction: 0.10 }
    }
}

impl OnsetPolicy {
    /// 50 px/s, the usual fixed onset speed.
    pub const DEFAULT_ABSOLUTE: OnsetPolicy = OnsetPolicy::Absolute {
        threshold_px_per_ms: 0.05,
    };

    pub fn threshold(&self, peak_velocity: f64) -> f64 {
        match *self {
            OnsetPolicy::Absolute { threshold_px_per_ms } => threshold_px_per_ms,
            OnsetPolicy::Relative { fraction } => peak_velocity * fraction,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OnsetPolicy::Absolute { .. } => "absolute",
            OnsetPolicy::Relative { .. } => "relative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    pub onset: OnsetPolicy,
    /// Speed under which the ballistic phase is considered finished.
    pub stopping_threshold_px_per_ms: f64,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            onset: OnsetPolicy::default(),
            stopping_threshold_px_per_ms: 0.01,
        }
    }
}

impl KinematicsConfig {
    pub fn validate(&self) -> Result<(), KinematicsError> {
        match self.onset {
            OnsetPolicy::Relative { fraction } if !(fraction > 0.0 && fraction <= 1.0) => {
                return Err(KinematicsError::OnsetFraction(fraction));
            }
            OnsetPolicy::Absolute { threshold_px_per_ms }
                if !(threshold_px_per_ms >= 0.0 && threshold_px_per_ms.is_finite()) =>
            {
                return Err(KinematicsError::OnsetThreshold(threshold_px_per_ms));
            }
            _ => {}
        }
        if !(self.stopping_threshold_px_per_ms >= 0.0
            && self.stopping_threshold_px_per_ms.is_finite())
        {
            return Err(KinematicsError::StoppingThreshold(
                self.stopping_threshold_px_per_ms,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_threshold_scales_with_peak() {
        let policy = OnsetPolicy::default();
        assert!((policy.threshold(2.0) - 0.2).abs() < 1e-12);
        assert_eq!(OnsetPolicy::DEFAULT_ABSOLUTE.threshold(100.0), 0.05);
    }

    #[test]
    fn validation_rejects_out_of_range() {
        let mut config = KinematicsConfig::default();
        assert!(config.validate().is_ok());

        config.onset = OnsetPolicy::Relative { fraction: 0.0 };
        assert_eq!(config.validate(), Err(KinematicsError::OnsetFraction(0.0)));

        config.onset = OnsetPolicy::Absolute {
            threshold_px_per_ms: -1.0,
        };
        assert!(config.validate().is_err());

        config.onset = OnsetPolicy::default();
        config.stopping_threshold_px_per_ms = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn onset_policy_reads_from_tagged_json() {
        let json = r#"{"onset":{"policy":"absolute","threshold_px_per_ms":0.2}}"#;
        let config: KinematicsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.onset,
            OnsetPolicy::Absolute {
                threshold_px_per_ms: 0.2
            }
        );
        assert_eq!(config.stopping_threshold_px_per_ms, 0.01);
    }
}
