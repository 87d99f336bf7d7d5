//! Command-line interface

use clap::{Args, Parser, Subcommand};
use motex_core::DeviceType;
use std::path::PathBuf;

/// Center-out reaching task: trace replay and simulated sessions
#[derive(Parser, Debug)]
#[command(name = "motex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Task config file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded pointer trace through a session
    Run {
        /// Trace file (JSON)
        #[arg(short, long)]
        trace: PathBuf,

        #[command(flatten)]
        session: SessionArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run a session against a synthetic participant
    Simulate {
        #[command(flatten)]
        session: SessionArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Probability that a reach is abandoned mid-movement
        #[arg(long, default_value = "0.05")]
        abort_rate: f64,

        /// Pointer update interval in ms
        #[arg(long, default_value = "8")]
        step_ms: u64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Participant id
    #[arg(short, long)]
    pub participant: Option<String>,

    /// Input device: mouse, trackpad or touchscreen
    #[arg(short, long)]
    pub device: Option<DeviceType>,

    /// Calibration as pixels per millimetre
    #[arg(long, conflicts_with = "card_px")]
    pub pixels_per_mm: Option<f64>,

    /// Calibration from the on-screen length of a credit card's long edge
    #[arg(long)]
    pub card_px: Option<f64>,

    /// Override trials per condition
    #[arg(long)]
    pub trials: Option<usize>,

    /// Seed for target selection
    #[arg(long, default_value = "1")]
    pub seed: u64,

    /// Pace input against the wall clock
    #[arg(long)]
    pub realtime: bool,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Directory for the CSV and JSON artifacts
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Include aborted trials in the artifacts
    #[arg(long)]
    pub include_aborted: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
