use crate::error::ExportError;
use crate::{ExportOptions, SessionExport};
use motex_core::DeviceType;
use motex_experiment::TrialRecord;
use serde::Serialize;
use std::path::Path as FsPath;
use tracing::info;

/// Full-fidelity dump of the session's trial records.
#[derive(Debug, Serialize)]
pub struct SessionDump<'a> {
    pub participant_id: &'a str,
    pub device: Option<DeviceType>,
    pub pixels_per_mm: Option<f64>,
    pub trials: Vec<&'a TrialRecord>,
}

impl<'a> SessionDump<'a> {
    pub fn new(export: &SessionExport<'a>, options: &ExportOptions) -> Self {
        Self {
            participant_id: export.participant_id,
            device: export.device,
            pixels_per_mm: export.converter.map(|c| c.pixels_per_mm()),
            trials: export.selected(options).collect(),
        }
    }
}

pub fn to_json(export: &SessionExport<'_>, options: &ExportOptions) -> Result<String, ExportError> {
    let dump = SessionDump::new(export, options);
    let text = serde_json::to_string_pretty(&dump)?;
    info!(trials = dump.trials.len(), "JSON export built");
    Ok(text)
}

pub fn write_json(
    path: impl AsRef<FsPath>,
    export: &SessionExport<'_>,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let text = to_json(export, options)?;
    std::fs::write(path, text).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
