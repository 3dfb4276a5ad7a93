//! A calendar of pending outcomes keyed by the day they resolve on.
//!
//! Defines an `OutcomeSchedule` that stores, for each future day, the people whose infection
//! ends that day and how it ends (an [`Outcome`]). Entries are added when newly infected
//! people are classified and are removed when their day is resolved. The calendar is sparse:
//! only days that actually have outcomes occupy memory, so nothing bounds how far ahead an
//! outcome may be scheduled.
//!
//! Adding an entry is *O*(1) amortized and resolving a day is *O*(k) in the number of
//! entries resolved.

use log::trace;

use crate::error::EpiError;
use crate::hashing::{HashMap, HashSet};
use crate::parameters::{DayRange, Parameters};
use crate::people::{DiseaseStatus, PersonId};
use crate::random::RandomSource;
use crate::define_rng;

define_rng!(OutcomeRng);
define_rng!(ResolutionRng);

/// How an infection ends.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Outcome {
    MildRecovery,
    SevereRecovery,
    Death,
}

impl Outcome {
    /// The status a person takes on when this outcome resolves.
    #[must_use]
    pub fn terminal_status(self) -> DiseaseStatus {
        match self {
            Outcome::MildRecovery => DiseaseStatus::RecoveredMild,
            Outcome::SevereRecovery => DiseaseStatus::RecoveredSevere,
            Outcome::Death => DiseaseStatus::Dead,
        }
    }
}

/// The people resolving on one day, split by outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedOutcomes {
    pub mild: Vec<PersonId>,
    pub severe_recovery: Vec<PersonId>,
    pub death: Vec<PersonId>,
}

impl ResolvedOutcomes {
    #[must_use]
    pub fn len(&self) -> usize {
        self.mild.len() + self.severe_recovery.len() + self.death.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bucket_mut(&mut self, outcome: Outcome) -> &mut Vec<PersonId> {
        match outcome {
            Outcome::MildRecovery => &mut self.mild,
            Outcome::SevereRecovery => &mut self.severe_recovery,
            Outcome::Death => &mut self.death,
        }
    }

    /// Iterates over every resolved person together with their outcome.
    pub fn iter(&self) -> impl Iterator<Item = (PersonId, Outcome)> + '_ {
        let mild = self.mild.iter().map(|&p| (p, Outcome::MildRecovery));
        let severe = self
            .severe_recovery
            .iter()
            .map(|&p| (p, Outcome::SevereRecovery));
        let death = self.death.iter().map(|&p| (p, Outcome::Death));
        mild.chain(severe).chain(death)
    }
}

/// How one batch of newly infected people was split. Each id appears in exactly one list.
pub type Classification = ResolvedOutcomes;

#[derive(Clone, Debug, Default)]
pub struct OutcomeSchedule {
    days: HashMap<u64, ResolvedOutcomes>,
    // Everyone ever scheduled. A person gets exactly one outcome in their lifetime.
    scheduled: HashSet<PersonId>,
    pending: usize,
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn round_share(fraction: f64, count: usize) -> usize {
    (fraction * count as f64).round_ties_even().max(0.0) as usize
}

impl OutcomeSchedule {
    #[must_use]
    pub fn new() -> Self {
        OutcomeSchedule::default()
    }

    /// Number of people with an outcome that has not been resolved yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// The earliest day that still has outcomes waiting.
    #[must_use]
    pub fn next_resolution_day(&self) -> Option<u64> {
        self.days.keys().min().copied()
    }

    /// Adds `person` to the `outcome` bucket of `day`.
    ///
    /// # Errors
    ///
    /// `EpiError::AlreadyScheduled` if `person` was scheduled before, even if that outcome has
    /// already been resolved.
    pub fn schedule(&mut self, person: PersonId, outcome: Outcome, day: u64) -> Result<(), EpiError> {
        if !self.scheduled.insert(person) {
            return Err(EpiError::AlreadyScheduled(person));
        }
        self.days
            .entry(day)
            .or_default()
            .bucket_mut(outcome)
            .push(person);
        self.pending += 1;
        Ok(())
    }

    /// Splits `newly_infected` into mild, severe-recovery and death cases and schedules each of
    /// them on a day drawn uniformly from the matching window.
    ///
    /// `percent_mild` of the batch (rounded) is mild and the rest are severe. Of the severe
    /// cases, `round(severe_recovery_fraction * severe)` recover and everyone left over dies.
    ///
    /// # Errors
    ///
    /// `EpiError::CapacityError` if `percent_mild` asks for more people than the batch holds,
    /// which validated parameters never do; nothing is scheduled in that case.
    /// `EpiError::AlreadyScheduled` if any id was scheduled before.
    pub fn classify_and_schedule(
        &mut self,
        newly_infected: Vec<PersonId>,
        day: u64,
        parameters: &Parameters,
        random: &mut RandomSource,
    ) -> Result<Classification, EpiError> {
        let n = newly_infected.len();
        let num_mild = round_share(parameters.percent_mild, n);
        let (mild, severe) =
            random.split_without_replacement(OutcomeRng, newly_infected, num_mild)?;

        // Everyone not mild is severe, so the two shares always add up to the batch.
        let num_severe_recovery = round_share(parameters.severe_recovery_fraction(), severe.len());
        let (severe_recovery, death) =
            random.split_without_replacement(OutcomeRng, severe, num_severe_recovery)?;

        trace!(
            "day {day}: classified {n} new infections as {} mild, {} severe recovery, {} death",
            mild.len(),
            severe_recovery.len(),
            death.len()
        );

        let classification = Classification {
            mild,
            severe_recovery,
            death,
        };
        for (person, outcome) in classification.iter() {
            let window = match outcome {
                Outcome::MildRecovery => parameters.mild_recovery,
                Outcome::SevereRecovery => parameters.severe_recovery,
                Outcome::Death => parameters.severe_death,
            };
            let resolution_day = draw_resolution_day(random, day, parameters.incubation, window);
            self.schedule(person, outcome, resolution_day)?;
        }
        Ok(classification)
    }

    /// Removes and returns everything scheduled for `day`. A second call for the same day
    /// returns nothing.
    pub fn resolve(&mut self, day: u64) -> ResolvedOutcomes {
        let resolved = self.days.remove(&day).unwrap_or_default();
        self.pending -= resolved.len();
        resolved
    }
}

/// Draws a day uniformly from `[day + incubation + window.min, day + incubation + window.max)`.
/// A degenerate window (`min == max`) always gives its lower bound.
fn draw_resolution_day(random: &mut RandomSource, day: u64, incubation: u64, window: DayRange) -> u64 {
    let low = day + incubation + window.min();
    let high = day + incubation + window.max();
    if low >= high {
        low
    } else {
        random.sample_range(ResolutionRng, low..high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people(range: std::ops::Range<usize>) -> Vec<PersonId> {
        range.map(PersonId).collect()
    }

    #[test]
    fn resolve_empty_day() {
        let mut schedule = OutcomeSchedule::new();
        assert!(schedule.resolve(3).is_empty());
        assert_eq!(schedule.pending(), 0);
        assert_eq!(schedule.next_resolution_day(), None);
    }

    #[test]
    fn schedule_and_resolve() {
        let mut schedule = OutcomeSchedule::new();
        schedule.schedule(PersonId(1), Outcome::MildRecovery, 4).unwrap();
        schedule.schedule(PersonId(2), Outcome::Death, 4).unwrap();
        schedule.schedule(PersonId(3), Outcome::SevereRecovery, 9).unwrap();
        assert_eq!(schedule.pending(), 3);
        assert_eq!(schedule.next_resolution_day(), Some(4));

        let resolved = schedule.resolve(4);
        assert_eq!(resolved.mild, vec![PersonId(1)]);
        assert!(resolved.severe_recovery.is_empty());
        assert_eq!(resolved.death, vec![PersonId(2)]);
        assert_eq!(schedule.pending(), 1);
        assert_eq!(schedule.next_resolution_day(), Some(9));
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut schedule = OutcomeSchedule::new();
        schedule.schedule(PersonId(0), Outcome::MildRecovery, 12).unwrap();
        assert_eq!(schedule.resolve(12).len(), 1);
        assert!(schedule.resolve(12).is_empty());
        assert_eq!(schedule.pending(), 0);
    }

    #[test]
    fn person_is_scheduled_at_most_once() {
        let mut schedule = OutcomeSchedule::new();
        schedule.schedule(PersonId(5), Outcome::MildRecovery, 2).unwrap();
        schedule.resolve(2);
        let result = schedule.schedule(PersonId(5), Outcome::Death, 8);
        assert!(matches!(result, Err(EpiError::AlreadyScheduled(PersonId(5)))));
    }

    #[test]
    fn classification_partitions_batch() {
        let parameters = Parameters::default();
        let mut random = RandomSource::new(42);
        let mut schedule = OutcomeSchedule::new();
        let batch = people(100..200);

        let classification = schedule
            .classify_and_schedule(batch.clone(), 10, &parameters, &mut random)
            .unwrap();

        // 80 mild, round(0.83 * 20) = 17 severe recoveries, 3 deaths
        assert_eq!(classification.mild.len(), 80);
        assert_eq!(classification.severe_recovery.len(), 17);
        assert_eq!(classification.death.len(), 3);
        assert_eq!(schedule.pending(), 100);

        let mut all: Vec<PersonId> = classification.iter().map(|(p, _)| p).collect();
        all.sort_unstable();
        assert_eq!(all, batch);
    }

    #[test]
    fn resolution_days_fall_in_windows() {
        let parameters = Parameters::default();
        let mut random = RandomSource::new(7);
        let mut schedule = OutcomeSchedule::new();
        let day = 20;
        schedule
            .classify_and_schedule(people(0..500), day, &parameters, &mut random)
            .unwrap();

        let incubation = parameters.incubation;
        let mut seen = 0;
        for d in day..day + 200 {
            let resolved = schedule.resolve(d);
            for (_, outcome) in resolved.iter() {
                let window = match outcome {
                    Outcome::MildRecovery => parameters.mild_recovery,
                    Outcome::SevereRecovery => parameters.severe_recovery,
                    Outcome::Death => parameters.severe_death,
                };
                assert!(d >= day + incubation + window.min());
                assert!(d < day + incubation + window.max());
                seen += 1;
            }
        }
        assert_eq!(seen, 500);
        assert_eq!(schedule.pending(), 0);
    }

    #[test]
    fn degenerate_window_resolves_on_lower_bound() {
        let parameters = Parameters {
            mild_recovery: DayRange(7, 7),
            ..Parameters::default()
        };
        let mut random = RandomSource::new(1);
        let mut schedule = OutcomeSchedule::new();
        let classification = schedule
            .classify_and_schedule(people(0..10), 0, &parameters, &mut random)
            .unwrap();
        let resolved = schedule.resolve(parameters.incubation + 7);
        assert_eq!(resolved.mild.len(), classification.mild.len());
    }

    #[test]
    fn zero_fatality_means_no_deaths() {
        let parameters = Parameters {
            fatality_rate: 0.0,
            ..Parameters::default()
        };
        let mut random = RandomSource::new(3);
        let mut schedule = OutcomeSchedule::new();
        for (start, len) in [(0, 1), (1, 3), (4, 17), (21, 250)] {
            let classification = schedule
                .classify_and_schedule(people(start..start + len), 0, &parameters, &mut random)
                .unwrap();
            assert!(classification.death.is_empty());
        }
    }

    #[test]
    fn empty_batch_schedules_nothing() {
        let mut random = RandomSource::new(3);
        let mut schedule = OutcomeSchedule::new();
        let classification = schedule
            .classify_and_schedule(Vec::new(), 0, &Parameters::default(), &mut random)
            .unwrap();
        assert!(classification.is_empty());
        assert_eq!(schedule.pending(), 0);
    }

    fn classify(parameters: &Parameters, batch: Vec<PersonId>, seed: u64) -> Classification {
        let mut random = RandomSource::new(seed);
        OutcomeSchedule::new()
            .classify_and_schedule(batch, 0, parameters, &mut random)
            .unwrap()
    }

    #[test]
    fn even_split_never_kills_without_fatality() {
        let parameters = Parameters {
            percent_mild: 0.5,
            percent_severe: 0.5,
            fatality_rate: 0.0,
            ..Parameters::default()
        };
        parameters.validate().unwrap();
        for len in 1..40 {
            let classification = classify(&parameters, people(0..len), len as u64);
            assert!(classification.death.is_empty(), "batch of {len}");
            assert_eq!(classification.len(), len);
        }
    }

    #[test]
    fn even_split_fits_every_batch_size() {
        let parameters = Parameters {
            percent_mild: 0.5,
            percent_severe: 0.5,
            ..Parameters::default()
        };
        parameters.validate().unwrap();
        for len in 0..60 {
            let classification = classify(&parameters, people(0..len), 11);
            // round_ties_even(1.5) = 2 mild, leaving 1 severe case
            if len == 3 {
                assert_eq!(classification.mild.len(), 2);
                assert_eq!(classification.severe_recovery.len() + classification.death.len(), 1);
            }
            assert_eq!(classification.len(), len);
        }
    }

    #[test]
    fn seventy_thirty_split() {
        let parameters = Parameters {
            percent_mild: 0.7,
            percent_severe: 0.3,
            fatality_rate: 0.06,
            ..Parameters::default()
        };
        parameters.validate().unwrap();
        for len in 0..60 {
            let classification = classify(&parameters, people(0..len), 5);
            assert_eq!(classification.len(), len);
        }
        // 70 mild and 30 severe, of which round(0.8 * 30) = 24 recover
        let classification = classify(&parameters, people(0..100), 5);
        assert_eq!(classification.mild.len(), 70);
        assert_eq!(classification.severe_recovery.len(), 24);
        assert_eq!(classification.death.len(), 6);
    }

    #[test]
    fn oversized_mild_share_is_a_capacity_error() {
        // Unvalidated share that asks for more mild cases than there are people
        let parameters = Parameters {
            percent_mild: 1.5,
            ..Parameters::default()
        };
        let mut random = RandomSource::new(3);
        let mut schedule = OutcomeSchedule::new();
        let result = schedule.classify_and_schedule(people(0..5), 0, &parameters, &mut random);
        // round_ties_even(7.5) = 8
        assert!(matches!(
            result,
            Err(EpiError::CapacityError {
                requested: 8,
                available: 5
            })
        ));
        assert_eq!(schedule.pending(), 0);
    }
}
