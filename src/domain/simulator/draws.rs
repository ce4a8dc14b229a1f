use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::schedule::tsch_schedule::Schedule;
use crate::domain::simulator::simulation_config::SimulationConfig;
use crate::error::{Error, Result};

/// Pre-generated uniform samples in `0..100` deciding every reception.
///
/// Generated once per run before the simulation loop and shared read-only
/// by every policy run on the same schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceptionDraws {
    values: Vec<u8>,
}

impl ReceptionDraws {
    /// Generates `len` draws; without a seed the generator is seeded from OS entropy.
    pub fn generate(len: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        ReceptionDraws { values: (0..len).map(|_| rng.random_range(0..100u8)).collect() }
    }

    /// Enough draws for `schedule` over the configured horizon:
    /// `timeslots_per_file * max_files * max_transmissions_per_slot`.
    pub fn for_horizon(config: &SimulationConfig, schedule: &Schedule) -> Result<Self> {
        let draws_per_slot = schedule.max_transmissions_per_slot().max(1) as u64;
        let len = config
            .horizon()
            .and_then(|horizon| horizon.checked_mul(draws_per_slot))
            .and_then(|len| usize::try_from(len).ok())
            .ok_or_else(|| Error::InvalidConfiguration("the reception draw sequence would not fit into memory".to_string()))?;

        log::debug!("Generating {} reception draws ({} per slot).", len, draws_per_slot);

        Ok(ReceptionDraws::generate(len, config.seed))
    }

    pub fn from_values(values: Vec<u8>) -> Self {
        ReceptionDraws { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn cursor(&self) -> DrawCursor<'_> {
        DrawCursor { draws: &self.values, position: 0 }
    }
}

/// Consumes the draws strictly in order, one per (slot, transmission).
#[derive(Debug)]
pub struct DrawCursor<'a> {
    draws: &'a [u8],
    position: usize,
}

impl DrawCursor<'_> {
    pub fn next(&mut self) -> Result<u8> {
        match self.draws.get(self.position) {
            Some(value) => {
                self.position += 1;
                Ok(*value)
            }
            None => Err(Error::InsufficientRandomness { required: self.position as u64 + 1, available: self.draws.len() as u64 }),
        }
    }

    pub fn consumed(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let a = ReceptionDraws::generate(1000, Some(7));
        let b = ReceptionDraws::generate(1000, Some(7));

        assert_eq!(a, b);
        assert!(a.values().iter().all(|v| *v < 100));
    }

    #[test]
    fn test_cursor_reports_exhaustion() {
        let draws = ReceptionDraws::from_values(vec![3, 99]);
        let mut cursor = draws.cursor();

        assert_eq!(cursor.next().unwrap(), 3);
        assert_eq!(cursor.next().unwrap(), 99);
        assert!(matches!(cursor.next(), Err(Error::InsufficientRandomness { required: 3, available: 2 })));
        assert_eq!(cursor.consumed(), 2);
    }
}
