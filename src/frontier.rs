//! The exposure frontier: the growing prefix of person ids that waves may draw from.
//!
//! Each wave opens the next slice `[exposed_before, exposed_after)` of the id space and new
//! infections are drawn only from that slice, so every wave has its own restricted contact
//! pool. The slice is 10% wider than the number of infections asked for, modelling contacts
//! who were exposed but never contracted the disease.

use std::ops::Range;

/// Extra width of each newly opened slice relative to the infections it must hold.
const EXPOSURE_SLACK: f64 = 1.1;
/// Share of the remaining headroom infected by the wave that saturates the frontier.
const SATURATION_ATTACK_RATE: f64 = 0.9;

/// A wave opened on the frontier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wave {
    /// Ids that may be drawn as newly infected in this wave.
    pub eligible: Range<usize>,
    /// How many distinct ids the wave infects. Never more than `eligible.len()`.
    pub new_infections: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExposureFrontier {
    exposed_before: usize,
    exposed_after: usize,
    population_size: usize,
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn round_to_count(value: f64) -> usize {
    value.round_ties_even().max(0.0) as usize
}

impl ExposureFrontier {
    /// A frontier whose first slot is already taken by patient zero.
    #[must_use]
    pub fn new(population_size: usize) -> Self {
        ExposureFrontier {
            exposed_before: 0,
            exposed_after: population_size.min(1),
            population_size,
        }
    }

    #[must_use]
    pub fn exposed_before(&self) -> usize {
        self.exposed_before
    }

    #[must_use]
    pub fn exposed_after(&self) -> usize {
        self.exposed_after
    }

    /// True once every id has been opened to some wave.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exposed_after >= self.population_size
    }

    /// Whether a wave happens on `day`: only on multiples of the serial interval, and only while
    /// the frontier still has headroom.
    #[must_use]
    pub fn wave_due(&self, day: u64, serial_interval: u64) -> bool {
        day % serial_interval == 0 && !self.is_exhausted()
    }

    /// Advances the frontier for a wave seeded by `total_infected_ever` cases.
    ///
    /// When the advance would run past the population, the frontier is clamped to the
    /// population size and the wave infects roughly 90% of what was left instead.
    #[allow(clippy::cast_precision_loss)]
    pub fn open_next_wave(&mut self, r0: f64, total_infected_ever: usize) -> Wave {
        let mut new_infections = round_to_count(r0 * total_infected_ever as f64);
        let advance = round_to_count(new_infections as f64 * EXPOSURE_SLACK);
        let headroom = self.population_size - self.exposed_after;
        self.exposed_before = self.exposed_after;

        if advance > headroom {
            new_infections = round_to_count(headroom as f64 * SATURATION_ATTACK_RATE);
            self.exposed_after = self.population_size;
        } else {
            self.exposed_after += advance;
        }

        Wave {
            eligible: self.exposed_before..self.exposed_after,
            new_infections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_wave_from_patient_zero() {
        let mut frontier = ExposureFrontier::new(4500);
        let wave = frontier.open_next_wave(2.28, 1);
        // round(2.28) = 2 infections in round(2 * 1.1) = 2 new slots
        assert_eq!(wave.new_infections, 2);
        assert_eq!(wave.eligible, 1..3);
        assert_eq!(frontier.exposed_after(), 3);
    }

    #[test]
    fn slack_widens_pool() {
        let mut frontier = ExposureFrontier::new(4500);
        let wave = frontier.open_next_wave(2.0, 50);
        assert_eq!(wave.new_infections, 100);
        assert_eq!(wave.eligible, 1..111);
    }

    #[test]
    fn saturating_wave_is_clamped() {
        let mut frontier = ExposureFrontier::new(100);
        frontier.open_next_wave(2.0, 40); // 80 infections over 88 slots -> [1, 89)
        assert_eq!(frontier.exposed_after(), 89);

        let wave = frontier.open_next_wave(2.0, 81);
        assert_eq!(wave.eligible, 89..100);
        // round(11 * 0.9) = 10
        assert_eq!(wave.new_infections, 10);
        assert!(frontier.is_exhausted());
    }

    #[test]
    fn huge_r0_saturates_without_overflow() {
        let mut frontier = ExposureFrontier::new(4500);
        let wave = frontier.open_next_wave(1e20, 1);
        assert_eq!(wave.eligible, 1..4500);
        // round(4499 * 0.9) = 4049
        assert_eq!(wave.new_infections, 4049);
        assert!(frontier.is_exhausted());

        let wave = frontier.open_next_wave(f64::MAX, usize::MAX);
        assert!(wave.eligible.is_empty());
        assert_eq!(wave.new_infections, 0);
        assert_eq!(frontier.exposed_after(), 4500);
    }

    #[test]
    fn wave_due_respects_interval_and_exhaustion() {
        let mut frontier = ExposureFrontier::new(10);
        assert!(frontier.wave_due(0, 5));
        assert!(!frontier.wave_due(3, 5));
        assert!(frontier.wave_due(10, 5));

        frontier.open_next_wave(100.0, 1);
        assert!(frontier.is_exhausted());
        assert!(!frontier.wave_due(10, 5));
    }

    #[test]
    fn zero_r0_never_advances() {
        let mut frontier = ExposureFrontier::new(10);
        for _ in 0..5 {
            let wave = frontier.open_next_wave(0.0, 1);
            assert_eq!(wave.new_infections, 0);
            assert!(wave.eligible.is_empty());
        }
        assert_eq!(frontier.exposed_after(), 1);
    }

    #[test]
    fn frontier_is_monotone_and_bounded() {
        let mut frontier = ExposureFrontier::new(1000);
        let mut total = 1;
        let mut previous = frontier.exposed_after();
        while !frontier.is_exhausted() {
            let wave = frontier.open_next_wave(2.28, total);
            assert!(wave.new_infections <= wave.eligible.len());
            total += wave.new_infections;
            assert!(frontier.exposed_after() >= previous);
            assert!(frontier.exposed_after() <= 1000);
            previous = frontier.exposed_after();
        }
    }
}
