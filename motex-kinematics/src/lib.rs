//! Kinematic feature extraction for center-out reaching trials.
//!
//! Paths come in as frozen [`motex_core::Path`]s in pixel space with
//! millisecond timestamps; velocities are px/ms and accelerations px/ms².

pub mod config;
pub mod extractor;
pub mod history;
pub mod metrics;
pub mod profile;
pub mod quality;

pub use config::{KinematicsConfig, KinematicsError, OnsetPolicy};
pub use extractor::{KinematicExtractor, TargetZone, analyze};
pub use history::EndpointHistory;
pub use metrics::{Metrics, PhysicalMetrics};
pub use profile::{AccelerationPoint, SampleKinematics, VelocityPoint, VelocityProfile, sample_series};
pub use quality::{QualityAssessment, QualityThresholds, SessionQuality};
