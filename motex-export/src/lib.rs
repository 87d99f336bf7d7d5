//! Session artifacts: the CSV report researchers download and a JSON dump of
//! every trial record.

pub mod artifact;
pub mod error;
pub mod json;
pub mod units;

pub use artifact::{RAW_PATH_MARKER, raw_path_header, summary_header, to_csv, write_csv};
pub use error::ExportError;
pub use json::{SessionDump, to_json, write_json};
pub use units::Units;

use motex_core::{DeviceType, UnitConverter};
use motex_experiment::{Session, TrialRecord};
use rand::Rng;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Also write aborted trials, with empty metric fields.
    pub include_aborted: bool,
}

/// Everything an exporter reads from a finished session.
#[derive(Debug, Clone, Copy)]
pub struct SessionExport<'a> {
    pub participant_id: &'a str,
    pub device: Option<DeviceType>,
    pub converter: Option<&'a UnitConverter>,
    pub records: &'a [TrialRecord],
}

impl<'a> SessionExport<'a> {
    pub fn from_session<R: Rng, P: motex_core::Phase>(session: &'a Session<R, P>) -> Self {
        let participant = session.participant();
        Self {
            participant_id: participant.map_or("", |p| p.id.as_str()),
            device: participant.map(|p| p.device),
            converter: session.converter(),
            records: session.records(),
        }
    }

    pub fn units(&self) -> Units {
        Units::from_converter(self.converter)
    }

    /// Records that go into the artifact under `options`, in trial order.
    pub fn selected(&self, options: &ExportOptions) -> impl Iterator<Item = &'a TrialRecord> {
        let include_aborted = options.include_aborted;
        self.records
            .iter()
            .filter(move |r| include_aborted || r.is_sealed())
    }
}

/// `motor_task_<participant>_<unix ms>.<extension>`
pub fn default_file_name(participant_id: &str, unix_ms: u128, extension: &str) -> String {
    let safe: String = participant_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("motor_task_{safe}_{unix_ms}.{extension}")
}
