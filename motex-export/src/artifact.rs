//! CSV artifact.
//!
//! Layout: participant metadata, the summary table (one row per trial), a
//! `Raw Path Data:` line, then one block per trial with its samples. Blocks
//! are separated by a blank line. Magnitudes carry 2 decimals, ratios 3,
//! counts none; a value that could not be derived is an empty field.

use crate::error::ExportError;
use crate::units::Units;
use crate::{ExportOptions, SessionExport};
use motex_experiment::TrialRecord;
use motex_kinematics::{Metrics, sample_series};
use std::path::Path as FsPath;
use tracing::info;

pub const RAW_PATH_MARKER: &str = "Raw Path Data:";

/// Metric columns between the trial identification and the quality columns.
const METRIC_COLUMNS: usize = 19;

pub fn summary_header(units: Units) -> Vec<String> {
    let l = units.length_label();
    let v = units.velocity_label();
    let a = units.acceleration_label();
    vec![
        "Trial".to_string(),
        "Condition".to_string(),
        "Movement Mode".to_string(),
        "Target Position".to_string(),
        "Outcome".to_string(),
        "Samples".to_string(),
        "Reaction Time (ms)".to_string(),
        "Movement Time (ms)".to_string(),
        "Ballistic Movement Time (ms)".to_string(),
        format!("Peak Velocity ({v})"),
        "Time to Peak Velocity (ms)".to_string(),
        format!("Average Velocity ({v})"),
        format!("Average Acceleration ({a})"),
        format!("Path Length ({l})"),
        format!("Ballistic Path Length ({l})"),
        "Directness Ratio".to_string(),
        format!("Movement Variability ({l})"),
        format!("Endpoint Error ({l})"),
        format!("Absolute Error ({l})"),
        format!("Variable Error ({l})"),
        "Movement Units".to_string(),
        "Corrective Movements".to_string(),
        "Direction Reversals".to_string(),
        "Direction Reversals (%)".to_string(),
        "Time in Target (ms)".to_string(),
        "Quality Score".to_string(),
        "Valid".to_string(),
    ]
}

pub fn raw_path_header(units: Units) -> Vec<String> {
    let l = units.length_label();
    vec![
        "Time (ms)".to_string(),
        format!("X ({l})"),
        format!("Y ({l})"),
        format!("Velocity ({})", units.velocity_label()),
        format!("Acceleration ({})", units.acceleration_label()),
        format!("Distance to Target ({l})"),
        "In Target".to_string(),
    ]
}

fn fixed(value: Option<f64>, places: usize) -> String {
    value.map_or_else(String::new, |v| format!("{v:.places$}"))
}

fn count(value: Option<u32>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

fn metric_fields(m: &Metrics, units: Units) -> Vec<String> {
    let len = |v: Option<f64>| fixed(v.map(|px| units.length(px)), 2);
    let vel = |v: Option<f64>| fixed(v.map(|x| units.velocity(x)), 2);
    let acc = |v: Option<f64>| fixed(v.map(|x| units.acceleration(x)), 2);
    vec![
        fixed(m.reaction_time_ms, 2),
        fixed(m.movement_time_ms, 2),
        fixed(m.ballistic_movement_time_ms, 2),
        vel(m.peak_velocity),
        fixed(m.time_to_peak_velocity_ms, 2),
        vel(m.average_velocity),
        acc(m.average_acceleration),
        len(Some(m.path_length)),
        len(m.ballistic_path_length),
        fixed(Some(m.directness_ratio), 3),
        len(m.movement_variability),
        len(m.endpoint_error),
        len(m.absolute_error),
        len(m.variable_error),
        count(m.movement_units),
        count(m.corrective_movements),
        count(m.direction_reversals),
        fixed(m.percentage_direction_reversals, 2),
        fixed(m.time_in_target_ms, 2),
    ]
}

fn summary_row(record: &TrialRecord, units: Units) -> Vec<String> {
    let mut row = vec![
        (record.index + 1).to_string(),
        record.condition.name.clone(),
        record.movement_mode().to_string(),
        record.target.to_string(),
        record.outcome.as_str().to_string(),
        record.path.len().to_string(),
    ];
    match &record.metrics {
        Some(m) => row.extend(metric_fields(m, units)),
        None => row.extend(std::iter::repeat_n(String::new(), METRIC_COLUMNS)),
    }
    match &record.quality {
        Some(q) => {
            row.push(fixed(Some(q.score), 3));
            row.push(flag(q.valid));
        }
        None => row.extend([String::new(), String::new()]),
    }
    row
}

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn raw_path_block(record: &TrialRecord, units: Units) -> Result<String, ExportError> {
    let mut w = writer();
    w.write_record([format!("Trial {} Path Data", record.index + 1)])?;
    w.write_record(raw_path_header(units))?;
    let zone = &record.target_zone;
    for s in sample_series(&record.path, zone.center, zone.radius) {
        w.write_record([
            fixed(Some(s.t), 2),
            fixed(Some(units.length(s.x)), 2),
            fixed(Some(units.length(s.y)), 2),
            fixed(s.velocity.map(|v| units.velocity(v)), 2),
            fixed(s.acceleration.map(|a| units.acceleration(a)), 2),
            fixed(Some(units.length(s.distance_to_target)), 2),
            flag(s.in_target),
        ])?;
    }
    finish(w)
}

pub fn to_csv(export: &SessionExport<'_>, options: &ExportOptions) -> Result<String, ExportError> {
    let units = export.units();

    let mut head = writer();
    head.write_record(["Participant ID", export.participant_id])?;
    head.write_record(["Device", export.device.map_or("", |d| d.as_str())])?;
    head.write_record([
        "Pixels per mm".to_string(),
        fixed(export.converter.map(|c| c.pixels_per_mm()), 3),
    ])?;
    head.write_record(summary_header(units))?;
    let mut rows = 0;
    for record in export.selected(options) {
        head.write_record(summary_row(record, units))?;
        rows += 1;
    }

    let blocks = export
        .selected(options)
        .map(|r| raw_path_block(r, units))
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = finish(head)?;
    out.push('\n');
    out.push_str(RAW_PATH_MARKER);
    out.push('\n');
    out.push_str(&blocks.join("\n"));

    info!(
        rows,
        units = units.length_label(),
        include_aborted = options.include_aborted,
        "CSV export built"
    );
    Ok(out)
}

pub fn write_csv(
    path: impl AsRef<FsPath>,
    export: &SessionExport<'_>,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let text = to_csv(export, options)?;
    std::fs::write(path, text).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
