use serde::Serialize;

use crate::domain::fhss::fhss_type::FhssType;
use crate::domain::fhss::policy::{ChannelHoppingPolicy, FhssFinalState};
use crate::domain::schedule::transmission::ChannelAssignment;
use crate::domain::schedule::tsch_schedule::Schedule;
use crate::domain::simulator::draws::ReceptionDraws;
use crate::domain::simulator::log_record::{DeliveryCount, LogRecord, WindowAccumulator};
use crate::domain::simulator::log_sink::LogSink;
use crate::domain::simulator::simulation_config::{SimulationConfig, SimulationMode};
use crate::domain::simulator::trace::{LinkTrace, TraceSet};
use crate::domain::utils::id::ChannelId;
use crate::domain::utils::statistics::ANALYTICS_TARGET;
use crate::error::{Error, Result};

/// Summary of a finished simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub fhss_type: Option<FhssType>,
    pub slots_simulated: u64,
    pub draws_consumed: u64,
    pub windows: u64,
    pub total: DeliveryCount,
    pub delivered_to_sink: u64,

    /// `None` when no hopping policy took part in the run.
    pub fhss_state: Option<FhssFinalState>,
}

/// Replays a schedule over `timeslots_per_file * max_files` slots.
///
/// The slotframe repeats with period `slotframe_length`. Each active
/// transmission consumes exactly one reception draw, cells with a channel
/// offset are resolved by the hopping policy first, and the outcome is
/// reported back to the policy before the next transmission is handled.
pub struct ScheduleSimulator<'a> {
    schedule: &'a Schedule,
    config: &'a SimulationConfig,
    draws: &'a ReceptionDraws,
    traces: Option<&'a TraceSet>,
    policy: Option<Box<dyn ChannelHoppingPolicy + 'a>>,
    num_channels: usize,
}

impl<'a> ScheduleSimulator<'a> {
    pub fn new(schedule: &'a Schedule, config: &'a SimulationConfig, draws: &'a ReceptionDraws, num_channels: usize) -> Self {
        ScheduleSimulator { schedule, config, draws, traces: None, policy: None, num_channels }
    }

    /// Trace files used for `TraceReplay` and handed to the policy at every file boundary.
    pub fn traces(mut self, traces: &'a TraceSet) -> Self {
        self.traces = Some(traces);
        self
    }

    pub fn policy(mut self, policy: Box<dyn ChannelHoppingPolicy + 'a>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Exact number of draws the horizon consumes.
    pub fn required_draws(&self) -> u64 {
        let Some(horizon) = self.config.horizon() else {
            return u64::MAX;
        };
        let length = self.schedule.slotframe_length() as u64;
        if length == 0 {
            return 0;
        }

        let per_frame = self.schedule.num_transmissions() as u64;
        let full_frames = horizon / length;
        let tail: u64 = self.schedule.slots().iter().take((horizon % length) as usize).map(|slot| slot.len() as u64).sum();

        full_frames.saturating_mul(per_frame).saturating_add(tail)
    }

    fn check_inputs(&self) -> Result<()> {
        self.config.validate()?;

        let required = self.required_draws();
        if (self.draws.len() as u64) < required {
            return Err(Error::InsufficientRandomness { required, available: self.draws.len() as u64 });
        }

        let has_hopping_cells = self.schedule.transmissions().any(|(_, t)| !t.channel.is_resolved());
        if has_hopping_cells && self.policy.is_none() {
            return Err(Error::InvalidConfiguration(format!("{} schedules channel offsets but no hopping policy was given", self.schedule.algorithm())));
        }

        if self.config.mode == SimulationMode::TraceReplay {
            let available = self.traces.map(TraceSet::len).unwrap_or(0);
            if available < self.config.max_files {
                return Err(Error::InconsistentInput(format!(
                    "trace replay needs {} trace files, only {} were loaded",
                    self.config.max_files, available
                )));
            }
        }

        Ok(())
    }

    pub fn run(&mut self, sink: &mut dyn LogSink) -> Result<SimulationReport> {
        self.check_inputs()?;

        let horizon = self.config.horizon().unwrap_or(0);
        let slotframe_length = self.schedule.slotframe_length() as u64;
        let fhss_type = self.policy.as_ref().map(|policy| policy.fhss_type());
        let sink_node = self.schedule.rules().sink;

        let mut cursor = self.draws.cursor();
        let mut window = WindowAccumulator::new(sink_node, self.num_channels, 0);
        let mut window_index: u64 = 0;
        let mut total = DeliveryCount::default();
        let mut delivered_to_sink: u64 = 0;
        let empty_trace = LinkTrace::default();
        let mut trace: &LinkTrace = &empty_trace;

        log::info!(
            "Simulating {} over {} slots ({} files of {} slots) with FHSS {}.",
            self.schedule.algorithm(),
            horizon,
            self.config.max_files,
            self.config.timeslots_per_file,
            fhss_type.map(|t| t.as_str()).unwrap_or("none")
        );

        for asn in 0..horizon {
            let file_index = (asn / self.config.timeslots_per_file) as usize;

            // 1. Trace file boundary
            if asn % self.config.timeslots_per_file == 0 {
                if let Some(next) = self.traces.and_then(|traces| traces.file(file_index)) {
                    trace = next;
                    if let Some(policy) = self.policy.as_mut() {
                        policy.on_trace_file(trace);
                    }
                }
            }

            // 2. Active transmissions of this slot
            let slot = if slotframe_length == 0 { None } else { self.schedule.slot((asn % slotframe_length) as usize) };

            for transmission in slot.map(|slot| slot.transmissions.as_slice()).unwrap_or(&[]) {
                let link = transmission.link();
                let channel: ChannelId = match (transmission.channel, self.policy.as_mut()) {
                    (ChannelAssignment::Fixed { channel }, _) => channel,
                    (ChannelAssignment::Hopping { offset }, Some(policy)) => policy.select_channel(asn, link, offset),
                    (ChannelAssignment::Hopping { .. }, None) => {
                        return Err(Error::InvalidConfiguration("no hopping policy for a channel offset".to_string()));
                    }
                };

                let draw = cursor.next()?;
                let probability = match self.config.mode {
                    SimulationMode::ScheduleExecution => self.config.pkt_prob as f64,
                    SimulationMode::TraceReplay => 100.0 * trace.prr(transmission.sender, transmission.receiver, channel),
                };
                let delivered = (draw as f64) < probability;

                if !transmission.channel.is_resolved() {
                    if let Some(policy) = self.policy.as_mut() {
                        policy.report(asn, link, channel, delivered);
                    }
                }

                window.record(transmission.sender, transmission.receiver, channel, delivered);
            }
            window.close_slot();

            // 3. Log window
            if (asn + 1) % self.config.timeslots_log == 0 {
                let record = window.flush(fhss_type, window_index, file_index + 1);
                self.emit(&record, sink, &mut total, &mut delivered_to_sink)?;
                window_index += 1;
            }
        }

        if !window.is_empty() {
            let last_file = horizon.saturating_sub(1) / self.config.timeslots_per_file + 1;
            let record = window.flush(fhss_type, window_index, last_file as usize);
            self.emit(&record, sink, &mut total, &mut delivered_to_sink)?;
            window_index += 1;
        }

        let report = SimulationReport {
            fhss_type,
            slots_simulated: horizon,
            draws_consumed: cursor.consumed() as u64,
            windows: window_index,
            total,
            delivered_to_sink,
            fhss_state: self.policy.as_ref().map(|policy| policy.final_state()),
        };

        tracing::info!(
            target: ANALYTICS_TARGET,
            LogDescription = "Simulation finished",
            Algorithm = %self.schedule.algorithm(),
            FhssType = fhss_type.map(|t| t.as_str()).unwrap_or("none"),
            Slots = report.slots_simulated,
            Attempted = report.total.attempted,
            Delivered = report.total.delivered,
            DeliveredToSink = report.delivered_to_sink,
        );

        Ok(report)
    }

    fn emit(&self, record: &LogRecord, sink: &mut dyn LogSink, total: &mut DeliveryCount, delivered_to_sink: &mut u64) -> Result<()> {
        total.add(&record.total);
        *delivered_to_sink += record.delivered_to_sink;

        tracing::info!(
            target: ANALYTICS_TARGET,
            LogDescription = "Log window flushed",
            FhssType = record.fhss_type.map(|t| t.as_str()).unwrap_or("none"),
            Window = record.window,
            FirstSlot = record.first_slot,
            LastSlot = record.last_slot,
            Attempted = record.total.attempted,
            Delivered = record.total.delivered,
            DeliveredToSink = record.delivered_to_sink,
        );

        sink.record(record)
    }
}
