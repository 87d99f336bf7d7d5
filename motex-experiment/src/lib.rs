pub mod config;
pub mod errors;
pub mod mapping;
pub mod recorder;
pub mod sequencer;
pub mod session;
pub mod state;
pub mod trial;

pub use config::{Geometry, MappingSettings, SessionSettings, TaskConfig, Timing};
pub use errors::{ConfigError, SessionError};
pub use mapping::VisualMapping;
pub use recorder::PathRecorder;
pub use sequencer::{ConditionSequencer, SequencerStep};
pub use session::{Participant, Session, SessionEvent};
pub use state::{TimerKind, TrialEvent, TrialStateMachine};
pub use trial::{FinishedTrial, TrialRecord, TrialSummary};
