pub mod branch_and_bound;

use crate::domain::network::tree::TreeEdge;
use crate::domain::schedule::transmission::Transmission;
use crate::domain::schedule::tsch_schedule::Schedule;
use crate::domain::scheduler::mcc::branch_and_bound::EdgeColoring;
use crate::domain::scheduler::scheduler_trait::TschScheduler;
use crate::domain::scheduler::scheduler_type::SchedulerType;
use crate::domain::scheduler::scheduling_context::SchedulingContext;
use crate::domain::utils::id::ChannelId;
use crate::error::{Error, Result};

/// Upper bound on the cells a rate-adaptive link receives per slotframe.
pub const MAX_REPETITIONS: usize = 16;

/// Switches selecting the member of the MCC family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MccOptions {
    /// Exact minimum-length search instead of greedy first fit (single channel only).
    pub optimal: bool,

    /// Pick the channel per edge from the ETX ranking instead of the configured channel.
    pub channel_quality_aware: bool,

    /// Grant `ceil(ETX)` cells per link instead of one.
    pub rate_adaptive: bool,
}

/**
 * Multi-channel conflict-aware scheduling (ICRA, CQAA, CQARA).
 *
 * Tree edges are processed in the shared priority order (shallower edges
 * first, then lower sender id). The single-channel variants pin every cell
 * to the configured channel; the quality-aware variants choose, per edge,
 * the earliest slot and within it the cheapest connected channel.
 *
 * A configured slotframe bound is hard: an edge that fits nowhere inside it
 * is reported as `UnschedulableEdge`.
 */
pub struct MccScheduler {
    algorithm: SchedulerType,
    options: MccOptions,
}

impl MccScheduler {
    pub fn new(algorithm: SchedulerType, options: MccOptions) -> Self {
        MccScheduler { algorithm, options }
    }

    fn unschedulable(edge: &TreeEdge, ctx: &SchedulingContext) -> Error {
        Error::UnschedulableEdge { sender: edge.sender, receiver: edge.receiver, slotframe_length: ctx.slotframe_bound.unwrap_or(0) }
    }

    /// Greedy first fit on one channel: every edge goes to the earliest slot without conflict.
    fn schedule_single_channel(&self, ctx: &SchedulingContext, channel: ChannelId) -> Result<Schedule> {
        let mut schedule = Schedule::new(self.algorithm, ctx.placement_rules(self.algorithm), ctx.slotframe_bound);

        for edge in ctx.tree.edges() {
            if !ctx.graph.is_connected(edge.sender, edge.receiver, channel) {
                log::warn!("Tree edge {} -> {} is not connected on channel {}, scheduling it anyway.", edge.sender, edge.receiver, channel);
            }

            let transmission = Transmission::fixed(edge.sender, edge.receiver, channel);
            let index = schedule.first_fit(&transmission, ctx.graph, 0).ok_or_else(|| Self::unschedulable(&edge, ctx))?;
            schedule.place(index, transmission);
        }

        Ok(schedule)
    }

    /// Exact minimum-length single-channel schedule.
    fn schedule_optimal(&self, ctx: &SchedulingContext, channel: ChannelId) -> Result<Schedule> {
        let edges = ctx.tree.edges();
        let transmissions: Vec<Transmission> = edges.iter().map(|edge| Transmission::fixed(edge.sender, edge.receiver, channel)).collect();
        let rules = ctx.placement_rules(self.algorithm);

        let coloring = EdgeColoring::new(&transmissions, ctx.graph, &rules).search_limit(ctx.optimal_search_limit).solve();

        if !coloring.proven_optimal {
            log::warn!(
                "Optimal search for {} stopped after {} nodes, returning the best schedule found ({} slots, lower bound {}).",
                self.algorithm,
                coloring.explored,
                coloring.num_colors,
                coloring.lower_bound
            );
        } else {
            log::debug!("Optimal search for {} finished after {} nodes with {} slots.", self.algorithm, coloring.explored, coloring.num_colors);
        }

        let mut schedule = Schedule::new(self.algorithm, rules, ctx.slotframe_bound);

        for ((edge, transmission), slot) in edges.iter().zip(transmissions).zip(coloring.colors) {
            if !schedule.place(slot, transmission) {
                return Err(Self::unschedulable(edge, ctx));
            }
        }

        Ok(schedule)
    }

    /// Channel-quality-aware placement, optionally with ETX-proportional repetitions.
    fn schedule_quality_aware(&self, ctx: &SchedulingContext) -> Result<Schedule> {
        let mut schedule = Schedule::new(self.algorithm, ctx.placement_rules(self.algorithm), ctx.slotframe_bound);
        let edges = ctx.tree.edges();

        // 1. Rank the channels of every edge and derive its demand
        let mut demands: Vec<(TreeEdge, Vec<ChannelId>, usize)> = Vec::with_capacity(edges.len());

        for edge in edges {
            let mut channels = ctx.graph.ranked_channels(edge.sender, edge.receiver);

            if channels.is_empty() {
                channels = match ctx.graph.best_channel(edge.sender, edge.receiver) {
                    Some(channel) => vec![channel],
                    None => {
                        log::warn!("Tree edge {} -> {} has no measured channel, falling back to channel order.", edge.sender, edge.receiver);
                        ctx.network.channels().collect()
                    }
                };
            }

            let repetitions = if self.options.rate_adaptive {
                let best_etx = channels.first().map(|channel| ctx.graph.etx(edge.sender, edge.receiver, *channel)).unwrap_or(f64::INFINITY);
                repetitions_for(best_etx)
            } else {
                1
            };

            demands.push((edge, channels, repetitions));
        }

        // 2. Place in rounds so every link gets its first cell before any repetition
        let rounds = demands.iter().map(|(_, _, repetitions)| *repetitions).max().unwrap_or(0);

        for round in 0..rounds {
            for (edge, channels, repetitions) in demands.iter() {
                if round >= *repetitions {
                    continue;
                }

                let (index, transmission) = Self::earliest_cell(&schedule, ctx, edge, channels).ok_or_else(|| Self::unschedulable(edge, ctx))?;
                schedule.place(index, transmission);
            }
        }

        Ok(schedule)
    }

    /// Earliest slot that hosts the edge on one of its channels, preferring cheaper channels within a slot.
    fn earliest_cell(schedule: &Schedule, ctx: &SchedulingContext, edge: &TreeEdge, channels: &[ChannelId]) -> Option<(usize, Transmission)> {
        // A fresh slot at the end always fits, unless it lies beyond the bound
        for index in 0..=schedule.slotframe_length() {
            for channel in channels {
                let transmission = Transmission::fixed(edge.sender, edge.receiver, *channel);
                if schedule.fits(index, &transmission, ctx.graph) {
                    return Some((index, transmission));
                }
            }
        }
        None
    }
}

/// Cells granted to a link with the given ETX.
pub fn repetitions_for(etx: f64) -> usize {
    if !etx.is_finite() {
        return MAX_REPETITIONS;
    }
    (etx.ceil() as usize).clamp(1, MAX_REPETITIONS)
}

impl TschScheduler for MccScheduler {
    fn schedule(&self, ctx: &SchedulingContext) -> Result<Schedule> {
        ctx.validate(self.algorithm)?;

        let schedule = if self.options.channel_quality_aware {
            self.schedule_quality_aware(ctx)?
        } else {
            let channel = ctx.channel.ok_or_else(|| Error::InvalidConfiguration(format!("{} needs a fixed channel", self.algorithm)))?;
            if self.options.optimal { self.schedule_optimal(ctx, channel)? } else { self.schedule_single_channel(ctx, channel)? }
        };

        log::info!(
            "{} scheduled {} cells for {} tree edges in a slotframe of {} slots.",
            self.algorithm,
            schedule.num_transmissions(),
            ctx.tree.len().saturating_sub(1),
            schedule.slotframe_length()
        );

        Ok(schedule)
    }
}
