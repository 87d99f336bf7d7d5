//! motex: center-out reaching task driver.
//!
//! Replays recorded pointer traces or a synthetic participant through a task
//! session and writes the CSV and JSON artifacts.

mod app;
mod cli;
mod source;
mod synthetic;
mod trace;

use anyhow::{Context, Result};
use app::App;
use cli::{Cli, Commands, OutputArgs, SessionArgs};
use motex_core::{CREDIT_CARD_LENGTH_MM, DeviceType, UnitConverter};
use motex_experiment::{Participant, TaskConfig};
use motex_export::ExportOptions;
use motex_timing::{HighPrecisionTimer, ManualTimer, Timer};
use source::PointerSource;
use synthetic::SyntheticParticipant;
use trace::Trace;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let base = match &cli.config {
        Some(path) => TaskConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TaskConfig::default(),
    };

    match cli.command {
        Commands::Run {
            trace,
            session,
            output,
        } => {
            let trace = Trace::load(&trace)?;
            let participant = Participant::new(
                session
                    .participant
                    .clone()
                    .or_else(|| trace.participant.clone())
                    .unwrap_or_else(|| "P00".to_string()),
                session.device.or(trace.device).unwrap_or(DeviceType::Mouse),
            );
            let calibration = calibration(&session, trace.pixels_per_mm)?;
            let mut source = trace.into_source();
            launch(base, &session, &output, participant, calibration, &mut source)
        }
        Commands::Simulate {
            session,
            output,
            abort_rate,
            step_ms,
        } => {
            let participant = Participant::new(
                session.participant.clone().unwrap_or_else(|| "SIM01".to_string()),
                session.device.unwrap_or(DeviceType::Touchscreen),
            );
            let calibration = calibration(&session, None)?;
            let mut source = SyntheticParticipant::new(session.seed, step_ms, abort_rate)?;
            launch(base, &session, &output, participant, calibration, &mut source)
        }
    }
}

fn calibration(args: &SessionArgs, recorded: Option<f64>) -> Result<Option<UnitConverter>> {
    let converter = if let Some(ppm) = args.pixels_per_mm {
        Some(UnitConverter::new(ppm)?)
    } else if let Some(px) = args.card_px {
        Some(UnitConverter::from_reference(px, CREDIT_CARD_LENGTH_MM)?)
    } else if let Some(ppm) = recorded {
        Some(UnitConverter::new(ppm)?)
    } else {
        None
    };
    Ok(converter)
}

fn launch(
    mut config: TaskConfig,
    args: &SessionArgs,
    output: &OutputArgs,
    participant: Participant,
    calibration: Option<UnitConverter>,
    source: &mut impl PointerSource,
) -> Result<()> {
    if let Some(trials) = args.trials {
        config.session.trials_per_condition = trials;
    }
    info!(
        participant = %participant.id,
        device = %participant.device,
        seed = args.seed,
        realtime = args.realtime,
        "starting session"
    );
    if args.realtime {
        let app = App::new(config, args.seed, HighPrecisionTimer::new())?;
        execute(app, output, participant, calibration, source)
    } else {
        let app = App::new(config, args.seed, ManualTimer::new())?;
        execute(app, output, participant, calibration, source)
    }
}

fn execute<T: Timer<Timestamp = u64>>(
    mut app: App<T>,
    output: &OutputArgs,
    participant: Participant,
    calibration: Option<UnitConverter>,
    source: &mut impl PointerSource,
) -> Result<()> {
    app.start(participant, calibration)?;
    let stats = app.run(source)?;
    let options = ExportOptions {
        include_aborted: output.include_aborted,
    };
    let written = app.export(&output.out, &options)?;
    app.print_report(&stats);
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
