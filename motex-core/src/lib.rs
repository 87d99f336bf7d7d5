pub mod condition;
pub mod error;
pub mod geometry;
pub mod phase;
pub mod sample;
pub mod target;
pub mod trial;
pub mod units;

pub use condition::{Condition, DeviceCapability, DeviceType};
pub use error::CoreError;
pub use geometry::Point;
pub use phase::{Phase, SessionPhase};
pub use sample::{Path, Sample};
pub use target::Target;
pub use trial::{TrialOutcome, TrialPhase};
pub use units::{CREDIT_CARD_LENGTH_MM, UnitConverter};
