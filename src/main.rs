use anyhow::Context;
use clap::Parser;
use std::fs;

use tsch_scheduling::domain::simulator::log_sink::LogSink;
use tsch_scheduling::domain::utils::statistics::StatsCollector;
use tsch_scheduling::{logger, run_from_config_file};

/// Computes a TSCH schedule for a convergecast tree and replays it in the time-slotted simulator.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Experiment configuration (JSON)
    #[arg(short, long)]
    config: String,

    /// Per-window statistics, `;`-separated; stdout when omitted
    #[arg(short, long)]
    stats_out: Option<String>,

    /// Writes the computed schedule as JSON
    #[arg(long)]
    schedule_out: Option<String>,

    /// Writes the run summaries, including the final hopping state, as JSON
    #[arg(long)]
    report_out: Option<String>,
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    let report = run_from_config_file(&args.config).with_context(|| format!("experiment '{}' failed", args.config))?;

    log::info!(
        "{} produced a slotframe of {} slots with {} transmissions.",
        report.algorithm,
        report.schedule.slotframe_length(),
        report.schedule.num_transmissions()
    );

    if let Some(path) = &args.schedule_out {
        let json = serde_json::to_string_pretty(&report.schedule)?;
        fs::write(path, json).with_context(|| format!("could not write schedule to '{}'", path))?;
        log::info!("Schedule written to '{}'.", path);
    }

    if report.runs.is_empty() {
        log::info!("Simulation disabled, nothing to replay.");
        return Ok(());
    }

    if let Some(path) = &args.report_out {
        fs::write(path, report.run_reports_json()?).with_context(|| format!("could not write run reports to '{}'", path))?;
        log::info!("Run reports written to '{}'.", path);
    }

    let mut collector = StatsCollector::init(args.stats_out.clone())?;
    for run in &report.runs {
        for record in &run.records {
            collector.record(record)?;
        }
    }
    collector.finish()?;

    Ok(())
}
